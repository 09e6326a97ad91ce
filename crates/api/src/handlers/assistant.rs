use axum::{extract::State, middleware::from_fn_with_state, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use validator::Validate;

use crate::{entities::user::User, error::ApiResult, AppJson, AppState};

use super::auth::auth_guard;

const ASSISTANT_TAG: &str = "assistant";

pub fn init_assistant_routes(state: AppState) -> OpenApiRouter<AppState> {
  OpenApiRouter::new()
    .routes(routes!(ask))
    .layer(from_fn_with_state(state, auth_guard))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AskRequest {
  #[validate(length(min = 1, max = 2000))]
  query: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AskResponse {
  answer: String,
}

#[utoipa::path(
  post,
  path = "",
  tag = ASSISTANT_TAG,
  request_body = AskRequest,
  responses(
    (status = 200, description = "Answer built from the user's analytics", body = AskResponse),
    (status = 400, description = "Empty or oversized question"),
    (status = 401, description = "Unauthorized")
  )
)]
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
async fn ask(
  State(state): State<AppState>,
  Extension(user): Extension<User>,
  AppJson(input): AppJson<AskRequest>,
) -> ApiResult<Json<AskResponse>> {
  input.validate()?;

  debug!("Question from user: {:?}", input.query);

  let answer = state.assistant.ask(&user.id.to_string(), &input.query).await;

  Ok(Json(AskResponse { answer: answer.answer }))
}
