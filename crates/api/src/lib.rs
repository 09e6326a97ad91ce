use std::sync::Arc;

use axum::{
  extract::{FromRequest, State},
  http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method, StatusCode,
  },
  response::IntoResponse,
  routing::get,
  Json, Router,
};
use error::ApiError;
use serde_json::json;
use timetrack_assistant::Assistant;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use handlers::{
  assistant::init_assistant_routes, auth::Keys, projects::init_projects_routes, users::init_auth_routes,
  users::init_users_routes,
};
use service::{projects::ProjectDirectory, users::UserDirectory};
use store::RecordStore;

pub mod config;
pub mod entities;
pub mod error;
mod handlers;
pub mod service;
pub mod store;

const TIMETRACK_TAG: &str = "timetrack";

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
struct AppJson<T>(T);

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
  pub store: RecordStore,
  pub projects: ProjectDirectory,
  pub users: UserDirectory,
  pub assistant: Arc<Assistant>,
  keys: Arc<Keys>,
  jwt_maxage_minutes: i64,
}

impl AppState {
  pub fn new(store: RecordStore, assistant: Assistant, jwt_secret: &[u8], jwt_maxage_minutes: i64) -> Self {
    Self {
      projects: ProjectDirectory::new(store.clone()),
      users: UserDirectory::new(store.clone()),
      store,
      assistant: Arc::new(assistant),
      keys: Arc::new(Keys::new(jwt_secret)),
      jwt_maxage_minutes,
    }
  }
}

/// Handle health check requests; an unreachable store answers 503.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
  match state.store.ping().await {
    Ok(_) => (
      StatusCode::OK,
      Json(json!({
        "code": "200",
        "success": true,
      })),
    ),
    Err(err) => {
      warn!("Health check failed: {}", err);

      (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
          "code": "503",
          "success": false,
        })),
      )
    },
  }
}

/// Assembles every route, the OpenAPI document and Swagger UI.
pub fn router(state: AppState) -> Router {
  #[derive(OpenApi)]
  #[openapi(
    tags(
      (name = TIMETRACK_TAG, description = "Time tracking dashboard API")
    )
  )]
  struct ApiDoc;

  let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
    .route("/health", get(health_handler))
    .nest("/api/auth", init_auth_routes())
    .nest("/api/users", init_users_routes(state.clone()))
    .nest("/api/projects", init_projects_routes(state.clone()))
    .nest("/api/ask", init_assistant_routes(state.clone()))
    .layer(CookieManagerLayer::new())
    .with_state(state)
    .split_for_parts();

  router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
}

pub async fn run(state: AppState, server_url: &str, cors_origin: &str, cancel_token: CancellationToken) -> anyhow::Result<()> {
  // Initialize cors settings
  let cors = CorsLayer::new()
    .allow_origin(cors_origin.parse::<HeaderValue>()?)
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_credentials(true)
    .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

  let router = router(state).layer(cors);

  info!("Starting api server on {}...", server_url);

  let listener = TcpListener::bind(server_url).await?;
  axum::serve(listener, router.into_make_service())
    .with_graceful_shutdown(Box::pin(async move { cancel_token.cancelled().await }))
    .await?;

  info!("Stopped api server");

  Ok(())
}
