use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::validate_not_blank;

/// A user-owned project as kept in the projects collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub id: Uuid,
  pub name: String,
  pub description: String,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  pub requirements: String,
  /// Completion percentage, 0 to 100.
  pub progress: u8,
  pub created_at: DateTime<Utc>,
  pub user_id: Uuid,
}

/// The caller-supplied, mutable part of a project.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_schedule"))]
pub struct ProjectData {
  #[validate(custom(function = "validate_not_blank"))]
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  #[serde(default)]
  pub requirements: String,
  #[serde(default)]
  #[validate(range(max = 100))]
  pub progress: u8,
}

pub type CreateProjectData = ProjectData;
pub type UpdateProjectData = ProjectData;

fn validate_schedule(data: &ProjectData) -> Result<(), ValidationError> {
  if data.end_date <= data.start_date {
    return Err(ValidationError::new("end_date_before_start_date"));
  }

  Ok(())
}

impl ProjectData {
  /// Strips surrounding whitespace from the free-text fields.
  pub fn trimmed(self) -> Self {
    Self {
      name: self.name.trim().to_string(),
      description: self.description.trim().to_string(),
      requirements: self.requirements.trim().to_string(),
      ..self
    }
  }
}

impl Project {
  pub fn new(data: CreateProjectData, user_id: Uuid) -> Self {
    Self {
      id: Uuid::new_v4(),
      name: data.name,
      description: data.description,
      start_date: data.start_date,
      end_date: data.end_date,
      requirements: data.requirements,
      progress: data.progress,
      created_at: Utc::now(),
      user_id,
    }
  }

  /// Replaces every mutable field; identity, owner and creation time stay.
  pub fn apply(&mut self, data: UpdateProjectData) {
    self.name = data.name;
    self.description = data.description;
    self.start_date = data.start_date;
    self.end_date = data.end_date;
    self.requirements = data.requirements;
    self.progress = data.progress;
  }

  pub fn is_owned_by(&self, user_id: Uuid) -> bool {
    self.user_id == user_id
  }

  pub fn is_complete(&self) -> bool {
    self.progress >= 100
  }
}
