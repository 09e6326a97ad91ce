use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stored account, including the password hash. Never leaves the service layer.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserRecord {
  pub id: Uuid,
  pub email: String,
  pub name: String,
  pub password_hash: String,
  pub created_at: DateTime<Utc>,
}

/// Account data safe to hand to callers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: Uuid,
  pub email: String,
  pub name: String,
  pub created_at: DateTime<Utc>,
}

impl From<&UserRecord> for User {
  fn from(record: &UserRecord) -> Self {
    Self {
      id: record.id,
      email: record.email.clone(),
      name: record.name.clone(),
      created_at: record.created_at,
    }
  }
}
