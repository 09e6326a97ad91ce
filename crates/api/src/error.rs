use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

pub type ApiResult<T = ()> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Invalid credentials")]
  InvalidCredentials(),
  #[error("{0}")]
  Unauthorized(String),
  #[error("User with email `{0}` already exists")]
  UserAlreadyExist(String),
  #[error("Entity `{0}` is not found")]
  ResourceNotFound(String),
  #[error("Storage error: {0}")]
  Storage(#[from] StoreError),
  #[error(transparent)]
  JsonRejection(JsonRejection),
  #[error(transparent)]
  InvalidInputError(#[from] validator::ValidationErrors),
  #[error("an internal server error occurred")]
  Anyhow(#[from] anyhow::Error),
}

impl ApiError {
  pub fn response(self) -> (StatusCode, AppResponseError) {
    use ApiError::*;
    let message = self.to_string();

    let (kind, code, details, status_code) = match self {
      JsonRejection(rejection) => (
        "INVALID_INPUT_ERROR".to_string(),
        None,
        vec![(rejection.status().to_string(), vec![rejection.body_text()])],
        StatusCode::BAD_REQUEST,
      ),
      InvalidInputError(err) => (
        "INVALID_INPUT_ERROR".to_string(),
        None,
        err
          .field_errors()
          .into_iter()
          .map(|(p, e)| {
            (
              p.to_string(),
              e.iter().map(|err| err.code.to_string()).collect::<Vec<String>>(),
            )
          })
          .collect(),
        StatusCode::BAD_REQUEST,
      ),
      Storage(ref e) => {
        tracing::error!("Storage error: {:?}", e);

        (
          "INTERNAL_SERVER_ERROR".to_string(),
          None,
          vec![],
          StatusCode::INTERNAL_SERVER_ERROR,
        )
      },
      UserAlreadyExist(_) => ("USER_ALREADY_EXISTS".to_string(), None, vec![], StatusCode::CONFLICT),
      ResourceNotFound(_) => ("RESOURCE_NOT_FOUND".to_string(), None, vec![], StatusCode::NOT_FOUND),
      InvalidCredentials() => (
        "INVALID_CREDENTIALS".to_string(),
        None,
        vec![],
        StatusCode::UNAUTHORIZED,
      ),
      Unauthorized(_) => ("UNAUTHORIZED".to_string(), None, vec![], StatusCode::UNAUTHORIZED),
      Anyhow(ref e) => {
        tracing::error!("Generic error: {:?}", e);

        (
          "INTERNAL_SERVER_ERROR".to_string(),
          None,
          vec![],
          StatusCode::INTERNAL_SERVER_ERROR,
        )
      },
    };

    (status_code, AppResponseError::new(kind, message, code, details))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status_code, body) = self.response();
    (status_code, Json(body)).into_response()
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::JsonRejection(rejection)
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppResponseError {
  pub kind: String,
  pub error_message: String,
  pub code: Option<i32>,
  pub details: Vec<(String, Vec<String>)>,
}

impl AppResponseError {
  pub fn new(
    kind: impl Into<String>,
    message: impl Into<String>,
    code: Option<i32>,
    details: Vec<(String, Vec<String>)>,
  ) -> Self {
    Self {
      kind: kind.into(),
      error_message: message.into(),
      code,
      details,
    }
  }
}
