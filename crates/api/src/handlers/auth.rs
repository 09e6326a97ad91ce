use axum::{
  extract::{Request, State},
  http::header,
  middleware::Next,
  response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{error::ApiError, AppState};

pub const AUTH_COOKIE_NAME: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  pub sub: String, // User associated with token
  pub iat: usize,  // Issued at time of the token
  pub exp: usize,  // Expiry time of the token
}

pub struct Keys {
  pub encoding: EncodingKey,
  pub decoding: DecodingKey,
}

impl Keys {
  pub fn new(secret: &[u8]) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
    }
  }
}

pub fn encode_jwt(keys: &Keys, maxage_minutes: i64, user_id: Uuid) -> Result<String, ApiError> {
  let now = chrono::Utc::now();
  let iat = now.timestamp() as usize;
  let exp = (now + chrono::Duration::minutes(maxage_minutes)).timestamp() as usize;
  let claims: Claims = Claims {
    sub: user_id.to_string(),
    exp,
    iat,
  };

  encode(&Header::default(), &claims, &keys.encoding)
    .map_err(|_| ApiError::Anyhow(anyhow::anyhow!("Can't encode token")))
}

fn decode_jwt(keys: &Keys, token: &str) -> Result<Uuid, ApiError> {
  let claims = decode::<Claims>(token, &keys.decoding, &Validation::default())
    .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))?
    .claims;

  Uuid::parse_str(&claims.sub).map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))
}

/// Resolves the caller from the `token` cookie or a bearer header and puts
/// the [`crate::entities::user::User`] into request extensions.
pub async fn auth_guard(
  cookie_jar: CookieJar,
  State(state): State<AppState>,
  mut req: Request,
  next: Next,
) -> Result<impl IntoResponse, ApiError> {
  let token = cookie_jar
    .get(AUTH_COOKIE_NAME)
    .map(|cookie| cookie.value().to_string())
    .filter(|token| !token.is_empty())
    .or_else(|| {
      req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_value| {
          auth_value
            .strip_prefix("Bearer ")
            .map(|auth_value| auth_value.to_owned())
        })
    });

  let token =
    token.ok_or_else(|| ApiError::Unauthorized("You are not logged in, please provide token".to_string()))?;

  let user_id = decode_jwt(&state.keys, &token)?;

  let user = state
    .users
    .find_by_id(user_id)
    .await?
    .ok_or_else(|| ApiError::Unauthorized("The user belonging to this token no longer exists".to_string()))?;

  debug!("Authenticated request for user {}", user.id);

  req.extensions_mut().insert(user);
  Ok(next.run(req).await)
}
