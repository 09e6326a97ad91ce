//! Natural-language answers about a user's tracked time.
//!
//! [`Assistant`] fetches analytics for the asking user, then answers with the
//! remote language model when one is configured and falls back to the local
//! keyword responder otherwise.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use analytics::{AnalyticsSource, DataSource, ProductivityInsights, RecentActivity};
use remote::RemoteModel;
use responder::ACTIVITY_WINDOW_DAYS;

pub mod analytics;
pub mod error;
pub mod remote;
pub mod responder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponderKind {
  Remote,
  RuleBased,
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
  pub answer: String,
  pub source: DataSource,
  pub responder: ResponderKind,
}

pub struct Assistant {
  analytics: Arc<dyn AnalyticsSource>,
  remote: Option<RemoteModel>,
}

impl Assistant {
  pub fn new(analytics: Arc<dyn AnalyticsSource>, remote: Option<RemoteModel>) -> Self {
    Self { analytics, remote }
  }

  pub fn analytics(&self) -> &Arc<dyn AnalyticsSource> {
    &self.analytics
  }

  pub async fn ask(&self, user_id: &str, query: &str) -> Answer {
    let (insights, activity) = self.gather(user_id).await;
    let source = insights.data_source();

    let (text, responder) = match &self.remote {
      Some(model) => match model.ask(query, &insights, &activity).await {
        Ok(text) => (text, ResponderKind::Remote),
        Err(err) => {
          warn!("Remote model failed, answering locally: {}", err);
          (responder::respond(query, &insights, &activity), ResponderKind::RuleBased)
        },
      },
      None => (responder::respond(query, &insights, &activity), ResponderKind::RuleBased),
    };

    info!("Answered question for user {} via {:?} ({:?})", user_id, responder, source);

    Answer {
      answer: format!("{text}\n\nData source: {}", source.describe()),
      source,
      responder,
    }
  }

  async fn gather(&self, user_id: &str) -> (ProductivityInsights, RecentActivity) {
    let insights = self.analytics.insights(user_id).await.unwrap_or_else(|err| {
      warn!("Falling back to demo insights for user {}: {}", user_id, err);
      ProductivityInsights::fallback()
    });

    let activity = self
      .analytics
      .recent_activity(user_id, ACTIVITY_WINDOW_DAYS)
      .await
      .unwrap_or_else(|err| {
        warn!("Falling back to demo activity for user {}: {}", user_id, err);
        RecentActivity::fallback()
      });

    (insights, activity)
  }
}
