use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AssistantError, AssistantResult};

/// Identifier the analytics backend resolves to its first active user.
pub const DEMO_USER_ID: &str = "demo";

const SUBSTITUTED_MESSAGE: &str = "Showing demo data - insights for this account are unavailable";

/// Aggregate time-tracking figures for one user.
///
/// Every field tolerates being absent in the payload: numbers become zero,
/// collections become empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductivityInsights {
  pub message: Option<String>,
  pub total_hours: f64,
  pub entries_count: u64,
  pub average_session_hours: f64,
  pub projects_worked: Vec<String>,
  pub project_hours_distribution: BTreeMap<String, f64>,
  pub most_productive_project: Option<String>,
  pub recent_week_hours: f64,
  pub insights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeEntrySummary {
  pub date: String,
  pub duration_hours: f64,
  pub project_name: String,
  pub task_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailySummary {
  pub date: String,
  pub total_hours: f64,
  pub entries_count: u64,
  pub projects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentActivity {
  pub time_entries: Vec<TimeEntrySummary>,
  pub daily_summaries: Vec<DailySummary>,
  pub period: Option<String>,
}

/// Where an insights payload came from, judged by its `message` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
  Live,
  NoData,
  Fallback,
}

impl DataSource {
  pub fn describe(self) -> &'static str {
    match self {
      DataSource::Live => "live database data",
      DataSource::NoData => "no data yet, start tracking!",
      DataSource::Fallback => "demo data (analytics backend unavailable)",
    }
  }
}

impl ProductivityInsights {
  pub fn data_source(&self) -> DataSource {
    match self.message.as_deref() {
      Some(msg) if msg.contains("fallback") || msg.contains("demo data") => DataSource::Fallback,
      Some(msg) if msg.contains("No time tracking data") => DataSource::NoData,
      _ => DataSource::Live,
    }
  }

  /// Hours logged on `project`, or zero if it never appears.
  pub fn hours_for(&self, project: &str) -> f64 {
    self.project_hours_distribution.get(project).copied().unwrap_or_default()
  }

  /// Demo figures served when the analytics backend cannot be reached.
  pub fn fallback() -> Self {
    let distribution = [
      ("TimeTrack Development", 18.0),
      ("Portfolio Website", 10.5),
      ("Client Project Alpha", 9.0),
    ];

    Self {
      message: Some("Using fallback data - backend unavailable".to_string()),
      total_hours: 37.5,
      entries_count: 15,
      average_session_hours: 2.5,
      projects_worked: distribution.iter().map(|(name, _)| name.to_string()).collect(),
      project_hours_distribution: distribution
        .iter()
        .map(|(name, hours)| (name.to_string(), *hours))
        .collect(),
      most_productive_project: Some("TimeTrack Development".to_string()),
      recent_week_hours: 12.0,
      insights: vec![
        "You've spent the most time on 'TimeTrack Development' with 18.0 hours".to_string(),
        "In the last 7 days, you've logged 12.0 hours".to_string(),
        "Your average session length is 2.5 hours".to_string(),
      ],
    }
  }
}

impl RecentActivity {
  pub fn fallback() -> Self {
    let days = [
      ("2025-08-05", 3.5, "TimeTrack Development", "AI Chatbot Integration"),
      ("2025-08-04", 2.0, "TimeTrack Development", "Testing chatbot responses"),
      ("2025-08-03", 4.0, "TimeTrack Development", "Database schema setup"),
      ("2025-08-02", 2.5, "Portfolio Website", "Homepage wireframe design"),
      ("2025-08-01", 1.5, "TimeTrack Development", "AI model configuration"),
    ];

    Self {
      time_entries: days
        .iter()
        .map(|(date, hours, project, task)| TimeEntrySummary {
          date: date.to_string(),
          duration_hours: *hours,
          project_name: project.to_string(),
          task_name: task.to_string(),
        })
        .collect(),
      daily_summaries: days
        .iter()
        .map(|(date, hours, project, _)| DailySummary {
          date: date.to_string(),
          total_hours: *hours,
          entries_count: 1,
          projects: vec![project.to_string()],
        })
        .collect(),
      period: Some("Last 30 days (fallback data)".to_string()),
    }
  }

  /// Sum of hours over all reported days.
  pub fn total_hours(&self) -> f64 {
    self.daily_summaries.iter().map(|day| day.total_hours).sum()
  }
}

/// Read-only access to per-user time-tracking analytics.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
  async fn insights(&self, user_id: &str) -> AssistantResult<ProductivityInsights>;

  async fn recent_activity(&self, user_id: &str, days: u32) -> AssistantResult<RecentActivity>;
}

/// Analytics served by the time-tracking backend over HTTP.
pub struct HttpAnalytics {
  client: reqwest::Client,
  base_url: String,
}

impl HttpAnalytics {
  pub fn new(base_url: &str) -> Self {
    Self::with_client(reqwest::Client::new(), base_url)
  }

  pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
    Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
    }
  }

  fn insights_url(&self, user_id: &str) -> String {
    format!("{}/analytics/productivity-insights/{}", self.base_url, user_id)
  }

  fn activity_url(&self, user_id: &str, days: u32) -> String {
    format!("{}/analytics/recent-activity/{}?days={}", self.base_url, user_id, days)
  }

  async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> AssistantResult<T> {
    let response = self.client.get(url).send().await?;
    let status = response.status();

    debug!("Analytics backend answered {} for {}", status, url);

    if !status.is_success() {
      return Err(AssistantError::UnexpectedStatus {
        url: url.to_string(),
        status: status.as_u16(),
      });
    }

    Ok(response.json::<T>().await?)
  }
}

#[async_trait]
impl AnalyticsSource for HttpAnalytics {
  async fn insights(&self, user_id: &str) -> AssistantResult<ProductivityInsights> {
    match self.get_json(&self.insights_url(user_id)).await {
      Err(AssistantError::UnexpectedStatus { status, .. }) if user_id != DEMO_USER_ID => {
        warn!("Insights for user {} failed with status {}, trying demo user", user_id, status);
        let mut insights: ProductivityInsights = self.get_json(&self.insights_url(DEMO_USER_ID)).await?;
        // Never present another account's figures as the caller's own.
        insights.message = Some(SUBSTITUTED_MESSAGE.to_string());
        Ok(insights)
      },
      other => other,
    }
  }

  async fn recent_activity(&self, user_id: &str, days: u32) -> AssistantResult<RecentActivity> {
    self.get_json(&self.activity_url(user_id, days)).await
  }
}
