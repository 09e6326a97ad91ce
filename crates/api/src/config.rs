use std::env;

use anyhow::{Context, Result};
use secrecy::SecretString;

const DEFAULT_JWT_MAXAGE_MINUTES: i64 = 24 * 60;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_ANALYTICS_URL: &str = "http://localhost:8000";

/// Language model endpoint used by the assistant when configured.
#[derive(Debug)]
pub struct ModelConfig {
  pub url: String,
  pub api_key: SecretString,
  pub model: Option<String>,
}

#[derive(Debug)]
pub struct AppConfig {
  pub host: String,
  pub port: u16,
  pub database_url: String,
  pub jwt_secret: SecretString,
  pub jwt_maxage_minutes: i64,
  pub cors_origin: String,
  pub analytics_url: String,
  pub model: Option<ModelConfig>,
}

impl AppConfig {
  /// Reads configuration from the process environment.
  pub fn from_env() -> Result<Self> {
    Self::from_lookup(|key| env::var(key).ok())
  }

  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let required = |key: &str| lookup(key).with_context(|| format!("{key} is not set in .env file"));

    let port = required("PORT")?
      .parse::<u16>()
      .context("PORT must be a valid port number")?;

    let jwt_maxage_minutes = match lookup("JWT_MAXAGE") {
      Some(value) => value.parse::<i64>().context("JWT_MAXAGE must be a number of minutes")?,
      None => DEFAULT_JWT_MAXAGE_MINUTES,
    };

    let model = match (lookup("ASSISTANT_MODEL_URL"), lookup("ASSISTANT_MODEL_KEY")) {
      (Some(url), Some(api_key)) => Some(ModelConfig {
        url,
        api_key: SecretString::from(api_key),
        model: lookup("ASSISTANT_MODEL"),
      }),
      _ => None,
    };

    Ok(Self {
      host: required("HOST")?,
      port,
      database_url: required("DATABASE_URL")?,
      jwt_secret: SecretString::from(required("JWT_SECRET")?),
      jwt_maxage_minutes,
      cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
      analytics_url: lookup("ANALYTICS_URL").unwrap_or_else(|| DEFAULT_ANALYTICS_URL.to_string()),
      model,
    })
  }

  pub fn server_url(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn config(pairs: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
  }

  const REQUIRED: [(&str, &str); 4] = [
    ("HOST", "127.0.0.1"),
    ("PORT", "8080"),
    ("DATABASE_URL", "sqlite://timetrack.db"),
    ("JWT_SECRET", "secret"),
  ];

  #[test]
  fn defaults_fill_optional_values() {
    let config = config(&REQUIRED).unwrap();

    assert_eq!(config.server_url(), "127.0.0.1:8080");
    assert_eq!(config.jwt_maxage_minutes, 1440);
    assert_eq!(config.cors_origin, "http://localhost:3000");
    assert_eq!(config.analytics_url, "http://localhost:8000");
    assert!(config.model.is_none());
  }

  #[test]
  fn model_needs_url_and_key() {
    let mut pairs = REQUIRED.to_vec();
    pairs.push(("ASSISTANT_MODEL_URL", "https://api.example.com/v1"));
    assert!(config(&pairs).unwrap().model.is_none());

    pairs.push(("ASSISTANT_MODEL_KEY", "key"));
    let model = config(&pairs).unwrap().model.unwrap();
    assert_eq!(model.url, "https://api.example.com/v1");
    assert!(model.model.is_none());
  }

  #[test]
  fn missing_required_value_is_named() {
    let err = config(&REQUIRED[..3]).unwrap_err();

    assert!(err.to_string().contains("JWT_SECRET"));
  }

  #[test]
  fn bad_port_is_rejected() {
    let mut pairs = REQUIRED.to_vec();
    pairs[1] = ("PORT", "eighty");

    assert!(config(&pairs).is_err());
  }
}
