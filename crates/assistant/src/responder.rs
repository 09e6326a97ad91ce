//! Local, keyword-driven answers built from a user's analytics payload.
//!
//! The topic is picked by substring checks applied in a fixed order; the
//! first topic whose keywords match wins. Queries that hit several topics
//! ("weekly productivity report") resolve to the earliest one.

use crate::analytics::{ProductivityInsights, RecentActivity};

/// Days covered by the recent-activity window used for daily averages.
pub const ACTIVITY_WINDOW_DAYS: u32 = 30;

const SUGGESTED_QUESTIONS: [&str; 5] = [
  "How much time did I spend on [project name]?",
  "What's my average daily productivity?",
  "Show me my weekly time report",
  "Which tasks are taking the most time?",
  "How can I improve my productivity patterns?",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
  /// Time spent, optionally on one named project.
  TimeSpent(Option<String>),
  Productivity,
  Deadlines,
  WeeklyReport,
  DailyPatterns,
  ProjectProgress,
  Overview,
}

impl Topic {
  pub fn classify(query: &str, insights: &ProductivityInsights) -> Self {
    let query = query.to_lowercase();
    let has = |needle: &str| query.contains(needle);

    if has("time") && (has("project") || has("spent")) {
      return Topic::TimeSpent(named_project(&query, insights));
    }
    if has("productive") || has("productivity") {
      return Topic::Productivity;
    }
    if has("overdue") || has("deadline") || has("behind") {
      return Topic::Deadlines;
    }
    if has("weekly") || has("report") || has("summary") {
      return Topic::WeeklyReport;
    }
    if has("average") || has("daily") || has("pattern") {
      return Topic::DailyPatterns;
    }
    if has("progress") || has("status") || has("complete") {
      return Topic::ProjectProgress;
    }

    Topic::Overview
  }
}

fn named_project(query: &str, insights: &ProductivityInsights) -> Option<String> {
  insights
    .project_hours_distribution
    .keys()
    .chain(insights.projects_worked.iter())
    .find(|name| query.contains(&name.to_lowercase()))
    .cloned()
}

/// Answer `query` from the supplied analytics without any remote call.
pub fn respond(query: &str, insights: &ProductivityInsights, activity: &RecentActivity) -> String {
  match Topic::classify(query, insights) {
    Topic::TimeSpent(Some(project)) => project_time(&project, insights),
    Topic::TimeSpent(None) => time_breakdown(insights),
    Topic::Productivity => productivity(insights),
    Topic::Deadlines => deadlines(insights),
    Topic::WeeklyReport => weekly_report(insights, activity),
    Topic::DailyPatterns => daily_patterns(insights),
    Topic::ProjectProgress => project_progress(insights),
    Topic::Overview => overview(query, insights),
  }
}

fn ratio(value: f64, total: f64) -> f64 {
  if total > 0.0 {
    value / total
  } else {
    0.0
  }
}

fn bullets(lines: &[String]) -> String {
  lines.iter().map(|line| format!("- {line}")).collect::<Vec<_>>().join("\n")
}

fn top_project(insights: &ProductivityInsights) -> &str {
  insights.most_productive_project.as_deref().unwrap_or("none yet")
}

fn project_count(insights: &ProductivityInsights) -> usize {
  insights.projects_worked.len().max(insights.project_hours_distribution.len())
}

fn insight_lines(insights: &ProductivityInsights, otherwise: &[&str]) -> String {
  if insights.insights.is_empty() {
    bullets(&otherwise.iter().map(|line| line.to_string()).collect::<Vec<_>>())
  } else {
    bullets(&insights.insights)
  }
}

fn project_time(project: &str, insights: &ProductivityInsights) -> String {
  let hours = insights.hours_for(project);
  let trend = if hours > 15.0 { "Highly active" } else { "Moderate activity" };

  format!(
    "Time analysis for {project}:\n\n\
     - Total time logged: {hours} hours\n\
     - Recent activity: {week} hours in the last week\n\
     - Sessions: {sessions} sessions with {avg} hours average\n\
     - Trend: {trend} project\n\n\
     Recommendations:\n\
     - Consider time-blocking for deep work sessions\n\
     - Track specific features or tasks for better granularity",
    week = insights.recent_week_hours,
    sessions = insights.entries_count,
    avg = insights.average_session_hours,
  )
}

fn time_breakdown(insights: &ProductivityInsights) -> String {
  let mut report = String::from("Project time breakdown:\n\n");

  for (project, hours) in &insights.project_hours_distribution {
    let share = ratio(*hours, insights.total_hours) * 100.0;
    report.push_str(&format!("- {project}: {hours} hours ({share:.1}%)\n"));
  }

  let projects = project_count(insights);
  report.push_str(&format!(
    "\nTotal tracked: {} hours across {} projects\nAverage per project: {:.1} hours",
    insights.total_hours,
    projects,
    ratio(insights.total_hours, projects as f64),
  ));

  report
}

fn productivity(insights: &ProductivityInsights) -> String {
  let avg = insights.average_session_hours;
  let week = insights.recent_week_hours;
  let efficiency = if avg > 2.5 {
    "High"
  } else if avg > 1.5 {
    "Moderate"
  } else {
    "Improving"
  };
  let weekly_trend = if week > 10.0 {
    "Strong"
  } else if week > 5.0 {
    "Steady"
  } else {
    "Light"
  };
  let consistency = if insights.entries_count > 10 { "Excellent" } else { "Good" };

  format!(
    "Your productivity analysis:\n\n\
     Current metrics:\n\
     - Total time tracked: {total} hours\n\
     - Session count: {sessions} sessions\n\
     - Average session: {avg} hours\n\
     - Weekly activity: {week} hours\n\
     - Efficiency rating: {efficiency}\n\n\
     Performance indicators:\n\
     - Weekly trend: {weekly_trend}\n\
     - Most productive project: {top}\n\
     - Session consistency: {consistency}\n\n\
     Key insights:\n{lines}\n\n\
     Next steps:\n\
     - {session_tip}\n\
     - {weekly_tip}",
    total = insights.total_hours,
    sessions = insights.entries_count,
    top = top_project(insights),
    lines = insight_lines(
      insights,
      &["Maintain your current tracking habits", "Focus on your most productive time slots"]
    ),
    session_tip = if avg < 2.0 {
      "Try longer focused sessions for deeper work"
    } else {
      "Your session length is optimal"
    },
    weekly_tip = if week < 15.0 {
      "Consider increasing weekly time goals"
    } else {
      "Great weekly consistency!"
    },
  )
}

fn deadlines(insights: &ProductivityInsights) -> String {
  let top = top_project(insights);

  format!(
    "Deadline and priority analysis:\n\n\
     Current project status:\n\
     - Active projects: {count}\n\
     - Projects tracked: {names}\n\n\
     Based on your time tracking data:\n\
     - Most time allocated: {top} ({top_hours} hours)\n\
     - Recent focus: {week} hours in last week\n\
     - Session frequency: {sessions} total sessions\n\n\
     Areas of attention:\n\
     - Projects with less than 20% time allocation may need more focus\n\
     - Ensure regular time logging for all active projects\n\n\
     Recommendations:\n\
     - Set specific deadlines for each project\n\
     - Allocate time blocks for each project daily\n\
     - Review project priorities weekly",
    count = project_count(insights),
    names = if insights.projects_worked.is_empty() {
      "none yet".to_string()
    } else {
      insights.projects_worked.join(", ")
    },
    top_hours = insights.hours_for(top),
    week = insights.recent_week_hours,
    sessions = insights.entries_count,
  )
}

fn weekly_report(insights: &ProductivityInsights, activity: &RecentActivity) -> String {
  let mut report = String::from("Weekly time report (last 7 days):\n\n");
  let recent_days: Vec<_> = activity.daily_summaries.iter().take(7).collect();

  let week_hours = if recent_days.is_empty() {
    report.push_str(&format!("Recent activity: {} hours tracked\n", insights.recent_week_hours));
    insights.recent_week_hours
  } else {
    for day in &recent_days {
      let projects = if day.projects.is_empty() {
        "Various projects".to_string()
      } else {
        day.projects.join(", ")
      };
      report.push_str(&format!(
        "{}: {}h across {} session(s)\n  {}\n",
        day.date, day.total_hours, day.entries_count, projects
      ));
    }
    recent_days.iter().map(|day| day.total_hours).sum()
  };

  let verdict = if week_hours >= 20.0 {
    "Strong weekly output"
  } else if week_hours >= 10.0 {
    "Good progress"
  } else {
    "Consider increasing weekly goals"
  };

  report.push_str(&format!(
    "\nWeek summary:\n\
     - Total hours: {week_hours} hours\n\
     - Daily average: {daily:.1} hours\n\
     - Most active project: {top}\n\
     - Session average: {avg} hours\n\n\
     Performance vs goals:\n\
     - {verdict}\n\
     - Project distribution: {active} active projects\n\n\
     Next week focus:\n\
     - Continue momentum on {top}\n\
     - Target: {target} hours",
    daily = week_hours / 7.0,
    top = top_project(insights),
    avg = insights.average_session_hours,
    active = insights.project_hours_distribution.len(),
    target = (week_hours * 1.1).ceil(),
  ));

  report
}

fn daily_patterns(insights: &ProductivityInsights) -> String {
  let window = f64::from(ACTIVITY_WINDOW_DAYS);
  let daily_avg = insights.total_hours / window;
  let sessions_per_day = insights.entries_count as f64 / window;
  let avg = insights.average_session_hours;
  let week = insights.recent_week_hours;

  let consistency = match insights.entries_count {
    n if n > 15 => "Excellent",
    n if n > 10 => "Good",
    _ => "Building momentum",
  };
  let benchmark = if daily_avg > 6.0 {
    "above"
  } else if daily_avg > 4.0 {
    "at"
  } else {
    "below"
  };
  let week_strength = if week > 15.0 {
    "strong"
  } else if week > 10.0 {
    "steady"
  } else {
    "light"
  };

  format!(
    "Your daily productivity patterns:\n\n\
     Time metrics:\n\
     - Daily average: {daily_avg:.1} hours\n\
     - Session average: {avg} hours\n\
     - Sessions per day: {sessions_per_day:.1}\n\
     - Weekly total: {week} hours\n\n\
     Work patterns:\n\
     - Most productive project: {top}\n\
     - Tracking window: ~{ACTIVITY_WINDOW_DAYS} days analyzed\n\
     - Consistency score: {consistency}\n\n\
     Pattern insights:\n\
     - Your {avg}-hour sessions are {session_fit}\n\
     - {daily_avg:.1} hours daily puts you {benchmark} typical productivity benchmarks\n\
     - Recent week shows {week_strength} activity\n\n\
     Optimization tips:\n\
     - {session_tip}\n\
     - {daily_tip}",
    top = top_project(insights),
    session_fit = if avg > 2.0 { "ideal for deep work" } else { "good for focused tasks" },
    session_tip = if avg < 2.0 {
      "Try extending sessions to 2-3 hours for better flow"
    } else {
      "Your session length is optimal for sustained focus"
    },
    daily_tip = if daily_avg < 4.0 {
      "Consider setting a daily minimum of 4-5 hours"
    } else {
      "Maintain your current daily rhythm"
    },
  )
}

fn project_progress(insights: &ProductivityInsights) -> String {
  let count = project_count(insights);
  let even_share = ratio(insights.total_hours, insights.projects_worked.len() as f64);

  let statuses: Vec<String> = insights
    .projects_worked
    .iter()
    .map(|project| {
      let hours = insights
        .project_hours_distribution
        .get(project)
        .copied()
        .unwrap_or(even_share);
      let status = if hours > 15.0 {
        "High Priority"
      } else if hours > 8.0 {
        "Active"
      } else {
        "Needs Attention"
      };
      format!("{project}: {hours}h tracked ({status})")
    })
    .collect();

  format!(
    "Project progress overview:\n\n\
     Active projects:\n{statuses}\n\n\
     Overall portfolio health:\n\
     - Total hours invested: {total} hours\n\
     - Project count: {count} active projects\n\
     - Average per project: {per_project:.1} hours\n\
     - Recent momentum: {week} hours this week\n\n\
     Focus recommendations:\n\
     - Primary focus: {top} (your most active project)\n\
     - Projects with <10 hours need more attention\n\
     - Session quality: {avg} hours average is {quality} for deep work",
    statuses = if statuses.is_empty() {
      "- No tracked projects yet".to_string()
    } else {
      bullets(&statuses)
    },
    total = insights.total_hours,
    per_project = ratio(insights.total_hours, count as f64),
    week = insights.recent_week_hours,
    top = top_project(insights),
    avg = insights.average_session_hours,
    quality = if insights.average_session_hours > 2.0 { "excellent" } else { "good" },
  )
}

fn overview(query: &str, insights: &ProductivityInsights) -> String {
  format!(
    "Analysis for: \"{query}\"\n\n\
     Your current summary:\n\
     - Total time logged: {total} hours\n\
     - Active projects: {names}\n\
     - Recent activity: {week} hours this week\n\
     - Session pattern: {sessions} sessions averaging {avg} hours\n\n\
     Key insights:\n{lines}\n\n\
     What I can help you analyze:\n{questions}",
    total = insights.total_hours,
    names = if insights.projects_worked.is_empty() {
      "none yet".to_string()
    } else {
      insights.projects_worked.join(", ")
    },
    week = insights.recent_week_hours,
    sessions = insights.entries_count,
    avg = insights.average_session_hours,
    lines = insight_lines(insights, &["Start tracking your time to see productivity insights"]),
    questions = bullets(&SUGGESTED_QUESTIONS.iter().map(|q| format!("\"{q}\"")).collect::<Vec<_>>()),
  )
}
