use axum::{
  extract::State,
  http::{header, StatusCode},
  middleware::from_fn_with_state,
  response::IntoResponse,
  Extension, Json,
};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_cookies::{
  cookie::{time::Duration, SameSite},
  Cookie,
};
use tracing::{debug, instrument};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use validator::Validate;

use crate::{
  entities::{user::User, validate_not_blank},
  error::ApiResult,
  handlers::auth::{encode_jwt, AUTH_COOKIE_NAME},
  service::{profile, profile::Profile, users},
  AppJson, AppState,
};

use super::auth::auth_guard;

const AUTH_TAG: &str = "auth";
const USERS_TAG: &str = "users";

pub fn init_auth_routes() -> OpenApiRouter<AppState> {
  OpenApiRouter::new()
    .routes(routes!(signup))
    .routes(routes!(login))
    .routes(routes!(logout))
}

pub fn init_users_routes(state: AppState) -> OpenApiRouter<AppState> {
  OpenApiRouter::new()
    .routes(routes!(get_me))
    .routes(routes!(get_profile))
    .layer(from_fn_with_state(state, auth_guard))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
  #[validate(custom(function = "validate_not_blank"))]
  name: String,
  #[validate(email)]
  email: String,
  #[validate(length(min = 6))]
  password: String,
  #[validate(must_match(other = "password"))]
  confirm_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
  #[validate(email)]
  email: String,
  #[validate(length(min = 1))]
  password: String,
}

#[derive(Debug, Serialize, ToSchema)]
struct AuthResponse {
  status: String,
  token: String,
  user: User,
}

#[utoipa::path(
  post,
  path = "/signup",
  tag = AUTH_TAG,
  request_body = SignupRequest,
  responses(
    (status = 201, description = "Account created and logged in", body = AuthResponse),
    (status = 400, description = "Validation error"),
    (status = 409, description = "Email already registered")
  )
)]
#[instrument(skip(state, input))]
async fn signup(State(state): State<AppState>, AppJson(input): AppJson<SignupRequest>) -> ApiResult<impl IntoResponse> {
  input.validate()?;

  let params = users::SignupParams {
    name: input.name,
    email: input.email,
    password: SecretBox::new(Box::new(input.password)),
  };

  debug!("Register new user with params {:?}", params);

  let user = state.users.signup(params).await?;

  authenticated(&state, user, StatusCode::CREATED)
}

#[utoipa::path(
  post,
  path = "/login",
  tag = AUTH_TAG,
  request_body = LoginRequest,
  responses(
    (status = 200, description = "Login successful", body = AuthResponse),
    (status = 401, description = "Invalid credentials"),
    (status = 400, description = "Validation error")
  )
)]
#[instrument(skip(state, input))]
async fn login(State(state): State<AppState>, AppJson(input): AppJson<LoginRequest>) -> ApiResult<impl IntoResponse> {
  input.validate()?;

  let params = users::LoginParams {
    email: input.email,
    password: SecretBox::new(Box::new(input.password)),
  };

  debug!("Try login user with params {:?}", params);

  let user = state.users.login(params).await?;

  authenticated(&state, user, StatusCode::OK)
}

#[utoipa::path(
  post,
  path = "/logout",
  tag = AUTH_TAG,
  responses(
    (status = 200, description = "Logout successful")
  )
)]
async fn logout() -> impl IntoResponse {
  let cookie = build_auth_cookie(String::new(), Duration::hours(-1));

  (
    [(header::SET_COOKIE, cookie.to_string())],
    Json(json!({"status": "success"})),
  )
}

#[utoipa::path(
  get,
  path = "/me",
  tag = USERS_TAG,
  responses(
    (status = OK, description = "Return current logged user", body = User),
    (status = 401, description = "Unauthorized")
  )
)]
async fn get_me(Extension(user): Extension<User>) -> ApiResult<Json<User>> {
  Ok(Json(user))
}

#[utoipa::path(
  get,
  path = "/me/profile",
  tag = USERS_TAG,
  responses(
    (status = OK, description = "Current user with project and time statistics", body = Profile),
    (status = 401, description = "Unauthorized")
  )
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn get_profile(State(state): State<AppState>, Extension(user): Extension<User>) -> ApiResult<Json<Profile>> {
  let profile = profile::build(&state.projects, state.assistant.analytics().as_ref(), user).await?;

  Ok(Json(profile))
}

fn authenticated(state: &AppState, user: User, status: StatusCode) -> ApiResult<impl IntoResponse> {
  let token = encode_jwt(&state.keys, state.jwt_maxage_minutes, user.id)?;
  let cookie = build_auth_cookie(token.clone(), Duration::minutes(state.jwt_maxage_minutes));

  let response = AuthResponse {
    status: "success".to_string(),
    token,
    user,
  };

  Ok((status, [(header::SET_COOKIE, cookie.to_string())], Json(response)))
}

fn build_auth_cookie(token: String, max_age: Duration) -> Cookie<'static> {
  Cookie::build((AUTH_COOKIE_NAME, token))
    .path("/")
    .max_age(max_age)
    .same_site(SameSite::Lax)
    .http_only(true)
    .build()
}
