pub type AssistantResult<T = ()> = Result<T, AssistantError>;

#[derive(thiserror::Error, Debug)]
pub enum AssistantError {
  #[error("Request to upstream failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Upstream `{url}` answered with status {status}")]
  UnexpectedStatus { url: String, status: u16 },

  #[error("Failed to encode analytics payload: {0}")]
  Encode(#[from] serde_json::Error),

  #[error("Language model returned an empty completion")]
  EmptyCompletion,
}
