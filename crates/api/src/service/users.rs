use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use chrono::Utc;
use rand_core::OsRng;
use secrecy::{ExposeSecret, SecretBox};
use tokio::task;
use tracing::{error, info};
use uuid::Uuid;

use crate::entities::user::{User, UserRecord};
use crate::error::{ApiError, ApiResult};
use crate::store::{Change, RecordStore};

pub const USERS_COLLECTION: &str = "timetrack_users";

#[derive(Debug)]
pub struct SignupParams {
  pub name: String,
  pub email: String,
  pub password: SecretBox<String>,
}

#[derive(Debug)]
pub struct LoginParams {
  pub email: String,
  pub password: SecretBox<String>,
}

/// Accounts keyed by lower-cased email.
#[derive(Clone)]
pub struct UserDirectory {
  store: RecordStore,
}

impl UserDirectory {
  pub fn new(store: RecordStore) -> Self {
    Self { store }
  }

  pub async fn signup(&self, mut params: SignupParams) -> ApiResult<User> {
    let email = normalize_email(&params.email);
    let password = std::mem::take(&mut params.password);
    let password_hash = hash_password(password).await?;

    let record = UserRecord {
      id: Uuid::new_v4(),
      email: email.clone(),
      name: params.name.trim().to_string(),
      password_hash,
      created_at: Utc::now(),
    };

    let created = self
      .store
      .modify(USERS_COLLECTION, move |users: &mut Vec<UserRecord>| {
        if users.iter().any(|u| u.email == record.email) {
          return Change::Discard(Err(ApiError::UserAlreadyExist(email)));
        }

        let user = User::from(&record);
        users.push(record);
        Change::Persist(Ok(user))
      })
      .await??;

    info!("Registered user {}", created.id);

    Ok(created)
  }

  /// Unknown email and wrong password fail the same way.
  pub async fn login(&self, params: LoginParams) -> ApiResult<User> {
    let email = normalize_email(&params.email);
    let users: Vec<UserRecord> = self.store.load(USERS_COLLECTION).await?;

    let record = users
      .into_iter()
      .find(|u| u.email == email)
      .ok_or(ApiError::InvalidCredentials())?;

    verify_password(SecretBox::new(Box::new(record.password_hash.clone())), params.password).await?;

    Ok(User::from(&record))
  }

  pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<User>> {
    let users: Vec<UserRecord> = self.store.load(USERS_COLLECTION).await?;

    Ok(users.iter().find(|u| u.id == id).map(User::from))
  }
}

fn normalize_email(email: &str) -> String {
  email.trim().to_ascii_lowercase()
}

async fn hash_password(password: SecretBox<String>) -> ApiResult<String> {
  task::spawn_blocking(move || {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(15000, 2, 1, None).map_err(|err| anyhow::anyhow!("invalid argon2 params: {err}"))?;
    let argon2_config = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    argon2_config
      .hash_password(password.expose_secret().as_bytes(), &salt)
      .map_err(|err| {
        error!("Failed to hash password: {}", err);
        ApiError::InvalidCredentials()
      })
      .map(|hash| hash.to_string())
  })
  .await
  .context("panic in hash_password()")?
}

async fn verify_password(
  expected_password_hash: SecretBox<String>,
  password_candidate: SecretBox<String>,
) -> ApiResult<()> {
  task::spawn_blocking(move || {
    let parsed_hash = PasswordHash::new(expected_password_hash.expose_secret()).map_err(|err| {
      info!("Failed to parse password hash: {}", err);
      ApiError::InvalidCredentials()
    })?;

    Argon2::default()
      .verify_password(password_candidate.expose_secret().as_bytes(), &parsed_hash)
      .map_err(|_| ApiError::InvalidCredentials())
  })
  .await
  .context("panic in verify_password()")?
}
