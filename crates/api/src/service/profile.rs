use serde::Serialize;
use timetrack_assistant::{
  analytics::{AnalyticsSource, DataSource},
  responder::ACTIVITY_WINDOW_DAYS,
};
use tracing::warn;
use utoipa::ToSchema;

use crate::{
  entities::{project::Project, user::User},
  error::ApiResult,
  service::projects::ProjectDirectory,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
  pub total_projects: usize,
  pub completed_projects: usize,
  pub average_progress: u8,
  pub total_hours: f64,
  pub entries_count: u64,
  pub weekly_hours: f64,
  pub monthly_hours: f64,
  pub current_streak: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Profile {
  pub user: User,
  pub stats: ProfileStats,
}

/// Builds the profile view for `user`. Analytics outages, and demo payloads
/// standing in for this account, zero the time-based figures instead of
/// failing the request.
pub async fn build(projects: &ProjectDirectory, analytics: &dyn AnalyticsSource, user: User) -> ApiResult<Profile> {
  let owned = projects.projects_by_user(user.id).await?;
  let mut stats = project_stats(&owned);

  let user_id = user.id.to_string();

  match analytics.insights(&user_id).await {
    Ok(insights) if insights.data_source() == DataSource::Fallback => {
      warn!("Ignoring demo insights in profile of user {}", user_id);
    },
    Ok(insights) => {
      stats.total_hours = insights.total_hours;
      stats.entries_count = insights.entries_count;
      stats.weekly_hours = insights.recent_week_hours;
      stats.current_streak = streak_from_week(insights.recent_week_hours);
    },
    Err(err) => warn!("No insights for profile of user {}: {}", user_id, err),
  }

  match analytics.recent_activity(&user_id, ACTIVITY_WINDOW_DAYS).await {
    Ok(activity) => stats.monthly_hours = activity.total_hours(),
    Err(err) => warn!("No recent activity for profile of user {}: {}", user_id, err),
  }

  Ok(Profile { user, stats })
}

fn project_stats(projects: &[Project]) -> ProfileStats {
  let total: u32 = projects.iter().map(|p| u32::from(p.progress)).sum();
  let average = match projects.len() {
    0 => 0,
    n => (f64::from(total) / n as f64).round() as u8,
  };

  ProfileStats {
    total_projects: projects.len(),
    completed_projects: projects.iter().filter(|p| p.is_complete()).count(),
    average_progress: average,
    ..Default::default()
  }
}

/// Rough streak estimate: one day per two hours logged this week.
fn streak_from_week(recent_week_hours: f64) -> u32 {
  if recent_week_hours > 0.0 {
    (recent_week_hours / 2.0).floor() as u32
  } else {
    0
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use async_trait::async_trait;
  use chrono::Utc;
  use timetrack_assistant::{
    analytics::{DailySummary, ProductivityInsights, RecentActivity},
    error::{AssistantError, AssistantResult},
  };
  use uuid::Uuid;

  use super::*;
  use crate::{entities::project::ProjectData, store::RecordStore};

  struct Fixed;

  #[async_trait]
  impl AnalyticsSource for Fixed {
    async fn insights(&self, _user_id: &str) -> AssistantResult<ProductivityInsights> {
      Ok(ProductivityInsights {
        total_hours: 40.0,
        entries_count: 12,
        recent_week_hours: 9.5,
        ..Default::default()
      })
    }

    async fn recent_activity(&self, _user_id: &str, _days: u32) -> AssistantResult<RecentActivity> {
      Ok(RecentActivity {
        daily_summaries: vec![
          DailySummary {
            total_hours: 3.0,
            ..Default::default()
          },
          DailySummary {
            total_hours: 4.5,
            ..Default::default()
          },
        ],
        ..Default::default()
      })
    }
  }

  struct Down;

  #[async_trait]
  impl AnalyticsSource for Down {
    async fn insights(&self, _user_id: &str) -> AssistantResult<ProductivityInsights> {
      Err(AssistantError::EmptyCompletion)
    }

    async fn recent_activity(&self, _user_id: &str, _days: u32) -> AssistantResult<RecentActivity> {
      Err(AssistantError::EmptyCompletion)
    }
  }

  struct Substituted;

  #[async_trait]
  impl AnalyticsSource for Substituted {
    async fn insights(&self, _user_id: &str) -> AssistantResult<ProductivityInsights> {
      Ok(ProductivityInsights {
        message: Some("Showing demo data - insights for this account are unavailable".to_string()),
        total_hours: 99.0,
        recent_week_hours: 20.0,
        ..Default::default()
      })
    }

    async fn recent_activity(&self, _user_id: &str, _days: u32) -> AssistantResult<RecentActivity> {
      Ok(RecentActivity::default())
    }
  }

  fn user() -> User {
    User {
      id: Uuid::new_v4(),
      email: "ada@example.com".to_string(),
      name: "Ada".to_string(),
      created_at: Utc::now(),
    }
  }

  fn project(progress: u8) -> ProjectData {
    ProjectData {
      name: "Alpha".to_string(),
      description: String::new(),
      start_date: "2025-01-01".parse().unwrap(),
      end_date: "2025-02-01".parse().unwrap(),
      requirements: String::new(),
      progress,
    }
  }

  #[tokio::test]
  async fn combines_projects_and_analytics() {
    let projects = ProjectDirectory::new(RecordStore::in_memory());
    let user = user();
    projects.create(project(100), user.id).await.unwrap();
    projects.create(project(25), user.id).await.unwrap();
    projects.create(project(0), Uuid::new_v4()).await.unwrap();

    let analytics: Arc<dyn AnalyticsSource> = Arc::new(Fixed);
    let profile = build(&projects, analytics.as_ref(), user.clone()).await.unwrap();

    assert_eq!(profile.user, user);
    assert_eq!(
      profile.stats,
      ProfileStats {
        total_projects: 2,
        completed_projects: 1,
        average_progress: 63,
        total_hours: 40.0,
        entries_count: 12,
        weekly_hours: 9.5,
        monthly_hours: 7.5,
        current_streak: 4,
      }
    );
  }

  #[tokio::test]
  async fn analytics_outage_zeroes_time_figures() {
    let projects = ProjectDirectory::new(RecordStore::in_memory());
    let user = user();
    projects.create(project(40), user.id).await.unwrap();

    let profile = build(&projects, &Down, user).await.unwrap();

    assert_eq!(profile.stats.total_projects, 1);
    assert_eq!(profile.stats.average_progress, 40);
    assert_eq!(profile.stats.total_hours, 0.0);
    assert_eq!(profile.stats.current_streak, 0);
  }

  #[tokio::test]
  async fn demo_insights_are_not_shown_as_own() {
    let projects = ProjectDirectory::new(RecordStore::in_memory());

    let profile = build(&projects, &Substituted, user()).await.unwrap();

    assert_eq!(profile.stats.total_hours, 0.0);
    assert_eq!(profile.stats.weekly_hours, 0.0);
    assert_eq!(profile.stats.current_streak, 0);
  }

  #[test]
  fn empty_project_list_has_zero_average() {
    assert_eq!(project_stats(&[]).average_progress, 0);
  }
}
