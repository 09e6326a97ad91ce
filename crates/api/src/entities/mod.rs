use validator::ValidationError;

pub mod project;
pub mod user;

/// Rejects text that is empty once surrounding whitespace is ignored.
pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError::new("blank").with_message("must not be blank".into()));
  }

  Ok(())
}
