use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
  sqlite::{SqliteConnectOptions, SqlitePoolOptions},
  SqlitePool,
};
use tracing::info;

use super::{StorageBackend, StoreResult};

const CREATE_COLLECTIONS_TABLE: &str = r#"
  CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY NOT NULL,
    payload TEXT NOT NULL,
    updated_at TEXT NOT NULL
  )
"#;
const READ_COLLECTION: &str = "SELECT payload FROM collections WHERE name = ?1";
const WRITE_COLLECTION: &str = r#"
  INSERT INTO collections (name, payload, updated_at)
  VALUES (?1, ?2, ?3)
  ON CONFLICT(name) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at
"#;

/// Collections kept as rows of a single SQLite table.
pub struct SqliteBackend {
  pool: SqlitePool,
}

impl SqliteBackend {
  /// Opens (creating if missing) the database at `url`.
  pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
      .max_connections(max_connections)
      .connect_with(options)
      .await?;

    Self::from_pool(pool).await
  }

  pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
    sqlx::query(CREATE_COLLECTIONS_TABLE).execute(&pool).await?;

    info!("Collections table is ready");

    Ok(Self { pool })
  }

  pub async fn close(&self) {
    self.pool.close().await;
  }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
  async fn read(&self, collection: &str) -> StoreResult<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as(READ_COLLECTION)
      .bind(collection)
      .fetch_optional(&self.pool)
      .await?;

    Ok(row.map(|(payload,)| payload))
  }

  async fn write(&self, collection: &str, payload: String) -> StoreResult<()> {
    sqlx::query(WRITE_COLLECTION)
      .bind(collection)
      .bind(payload)
      .bind(Utc::now())
      .execute(&self.pool)
      .await?;

    Ok(())
  }

  async fn ping(&self) -> StoreResult<()> {
    sqlx::query("SELECT 1").execute(&self.pool).await?;
    Ok(())
  }
}
