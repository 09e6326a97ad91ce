use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  analytics::{ProductivityInsights, RecentActivity},
  error::{AssistantError, AssistantResult},
};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are ACE, a time-tracking assistant. Answer the user's question using only \
the analytics below. Be concise, quote numbers exactly, and say so when the data does not cover the question.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
  role: String,
  #[serde(default)]
  content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ChatMessage,
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct RemoteModel {
  client: reqwest::Client,
  base_url: String,
  api_key: SecretString,
  model: String,
}

impl RemoteModel {
  pub fn new(base_url: &str, api_key: SecretString, model: Option<String>) -> Self {
    Self::with_client(reqwest::Client::new(), base_url, api_key, model)
  }

  pub fn with_client(client: reqwest::Client, base_url: &str, api_key: SecretString, model: Option<String>) -> Self {
    Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key,
      model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
    }
  }

  pub async fn ask(
    &self,
    query: &str,
    insights: &ProductivityInsights,
    activity: &RecentActivity,
  ) -> AssistantResult<String> {
    let url = format!("{}/chat/completions", self.base_url);
    let request = ChatRequest {
      model: &self.model,
      messages: vec![
        ChatMessage {
          role: "system".to_string(),
          content: Some(system_prompt(insights, activity)?),
        },
        ChatMessage {
          role: "user".to_string(),
          content: Some(query.to_string()),
        },
      ],
    };

    debug!("Sending question to {} using model {}", url, self.model);

    let response = self
      .client
      .post(&url)
      .bearer_auth(self.api_key.expose_secret())
      .json(&request)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(AssistantError::UnexpectedStatus {
        url,
        status: status.as_u16(),
      });
    }

    let body: ChatResponse = response.json().await?;
    body
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .filter(|content| !content.trim().is_empty())
      .ok_or(AssistantError::EmptyCompletion)
  }
}

fn system_prompt(insights: &ProductivityInsights, activity: &RecentActivity) -> AssistantResult<String> {
  Ok(format!(
    "{SYSTEM_PROMPT}\n\nProductivity insights:\n{}\n\nRecent activity:\n{}",
    serde_json::to_string_pretty(insights)?,
    serde_json::to_string_pretty(activity)?,
  ))
}
