use std::sync::Arc;

use async_trait::async_trait;
use axum::{
  body::Body,
  http::{header, Method, Request, StatusCode},
  Router,
};
use serde_json::{json, Value};
use timetrack_api::{
  router,
  store::{RecordStore, SqliteBackend},
  AppState,
};
use timetrack_assistant::{
  analytics::{AnalyticsSource, ProductivityInsights, RecentActivity},
  error::AssistantResult,
  Assistant,
};
use tower::ServiceExt;

struct StaticAnalytics;

#[async_trait]
impl AnalyticsSource for StaticAnalytics {
  async fn insights(&self, _user_id: &str) -> AssistantResult<ProductivityInsights> {
    Ok(ProductivityInsights {
      total_hours: 20.0,
      entries_count: 8,
      average_session_hours: 2.5,
      recent_week_hours: 6.0,
      ..Default::default()
    })
  }

  async fn recent_activity(&self, _user_id: &str, _days: u32) -> AssistantResult<RecentActivity> {
    Ok(RecentActivity::default())
  }
}

fn app() -> Router {
  let assistant = Assistant::new(Arc::new(StaticAnalytics), None);
  router(AppState::new(RecordStore::in_memory(), assistant, b"test-secret", 60))
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }

  let request = match body {
    Some(body) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(serde_json::to_vec(&body).unwrap()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
  };

  (status, value)
}

async fn signup(app: &Router, email: &str) -> String {
  let (status, body) = call(
    app,
    Method::POST,
    "/api/auth/signup",
    None,
    Some(json!({
      "name": "Ada",
      "email": email,
      "password": "hunter22",
      "confirmPassword": "hunter22"
    })),
  )
  .await;

  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["token"].as_str().unwrap().to_string()
}

fn alpha(progress: u8) -> Value {
  json!({
    "name": "Alpha",
    "startDate": "2025-01-01",
    "endDate": "2025-02-01",
    "progress": progress
  })
}

#[tokio::test]
async fn project_lifecycle_over_http() {
  let app = app();
  let token = signup(&app, "ada@example.com").await;

  let (status, created) = call(&app, Method::POST, "/api/projects", Some(&token), Some(alpha(0))).await;
  assert_eq!(status, StatusCode::CREATED, "{created}");
  let id = created["id"].as_str().unwrap().to_string();
  assert_eq!(created["progress"], 0);
  assert_eq!(created["description"], "");

  let (status, listed) = call(&app, Method::GET, "/api/projects", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed.as_array().unwrap().len(), 1);
  assert_eq!(listed[0]["id"], id.as_str());

  let (status, updated) = call(&app, Method::PUT, &format!("/api/projects/{id}"), Some(&token), Some(alpha(50))).await;
  assert_eq!(status, StatusCode::OK, "{updated}");
  assert_eq!(updated["progress"], 50);
  assert_eq!(updated["createdAt"], created["createdAt"]);
  assert_eq!(updated["userId"], created["userId"]);

  let (_, listed) = call(&app, Method::GET, "/api/projects", Some(&token), None).await;
  assert_eq!(listed[0]["progress"], 50);

  let (status, _) = call(&app, Method::DELETE, &format!("/api/projects/{id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, body) = call(&app, Method::DELETE, &format!("/api/projects/{id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["kind"], "RESOURCE_NOT_FOUND");

  let (_, listed) = call(&app, Method::GET, "/api/projects", Some(&token), None).await;
  assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn projects_are_isolated_between_users() {
  let app = app();
  let owner = signup(&app, "owner@example.com").await;
  let intruder = signup(&app, "intruder@example.com").await;

  let (_, created) = call(&app, Method::POST, "/api/projects", Some(&owner), Some(alpha(10))).await;
  let uri = format!("/api/projects/{}", created["id"].as_str().unwrap());

  let (_, listed) = call(&app, Method::GET, "/api/projects", Some(&intruder), None).await;
  assert!(listed.as_array().unwrap().is_empty());

  let (status, _) = call(&app, Method::PUT, &uri, Some(&intruder), Some(alpha(99))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = call(&app, Method::DELETE, &uri, Some(&intruder), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, listed) = call(&app, Method::GET, "/api/projects", Some(&owner), None).await;
  assert_eq!(listed[0]["progress"], 10);
}

#[tokio::test]
async fn invalid_project_is_rejected() {
  let app = app();
  let token = signup(&app, "ada@example.com").await;

  let inverted = json!({
    "name": "Alpha",
    "startDate": "2025-02-01",
    "endDate": "2025-01-01"
  });
  let (status, body) = call(&app, Method::POST, "/api/projects", Some(&token), Some(inverted)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["kind"], "INVALID_INPUT_ERROR");

  let (status, _) = call(&app, Method::POST, "/api/projects", Some(&token), Some(alpha(101))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
  let app = app();

  let (status, body) = call(&app, Method::GET, "/api/projects", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["kind"], "UNAUTHORIZED");

  let (status, _) = call(&app, Method::GET, "/api/users/me", Some("not-a-token"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_and_duplicate_signup() {
  let app = app();
  signup(&app, "ada@example.com").await;

  let (status, body) = call(
    &app,
    Method::POST,
    "/api/auth/signup",
    None,
    Some(json!({
      "name": "Ada",
      "email": "ADA@example.com",
      "password": "hunter22",
      "confirmPassword": "hunter22"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT, "{body}");

  let (status, _) = call(
    &app,
    Method::POST,
    "/api/auth/login",
    None,
    Some(json!({"email": "ada@example.com", "password": "wrong-one"})),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, body) = call(
    &app,
    Method::POST,
    "/api/auth/login",
    None,
    Some(json!({"email": "ada@example.com", "password": "hunter22"})),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["user"]["email"], "ada@example.com");
  assert!(body["user"].get("passwordHash").is_none());

  let token = body["token"].as_str().unwrap();
  let (status, me) = call(&app, Method::GET, "/api/users/me", Some(token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(me["name"], "Ada");
}

#[tokio::test]
async fn mismatched_confirmation_is_rejected() {
  let app = app();

  let (status, _) = call(
    &app,
    Method::POST,
    "/api/auth/signup",
    None,
    Some(json!({
      "name": "Ada",
      "email": "ada@example.com",
      "password": "hunter22",
      "confirmPassword": "hunter23"
    })),
  )
  .await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_and_assistant_use_analytics() {
  let app = app();
  let token = signup(&app, "ada@example.com").await;
  call(&app, Method::POST, "/api/projects", Some(&token), Some(alpha(100))).await;

  let (status, profile) = call(&app, Method::GET, "/api/users/me/profile", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK, "{profile}");
  assert_eq!(profile["stats"]["totalProjects"], 1);
  assert_eq!(profile["stats"]["completedProjects"], 1);
  assert_eq!(profile["stats"]["totalHours"], 20.0);
  assert_eq!(profile["stats"]["currentStreak"], 3);

  let (status, answer) = call(
    &app,
    Method::POST,
    "/api/ask",
    Some(&token),
    Some(json!({"query": "How productive was I?"})),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{answer}");
  let text = answer["answer"].as_str().unwrap();
  assert!(text.contains("Total time tracked: 20 hours"));
  assert!(text.contains("Efficiency rating: Moderate"));
  assert!(text.ends_with("Data source: live database data"));
}

#[tokio::test]
async fn health_reports_success() {
  let app = app();

  let (status, body) = call(&app, Method::GET, "/health", None, None).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);
}

#[tokio::test]
async fn blank_names_are_rejected() {
  let app = app();
  let token = signup(&app, "ada@example.com").await;

  let blank = json!({
    "name": "   ",
    "startDate": "2025-01-01",
    "endDate": "2025-02-01"
  });
  let (status, body) = call(&app, Method::POST, "/api/projects", Some(&token), Some(blank)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
  assert_eq!(body["kind"], "INVALID_INPUT_ERROR");

  let (_, listed) = call(&app, Method::GET, "/api/projects", Some(&token), None).await;
  assert_eq!(listed, json!([]));

  let (status, _) = call(
    &app,
    Method::POST,
    "/api/auth/signup",
    None,
    Some(json!({
      "name": "  ",
      "email": "blank@example.com",
      "password": "hunter22",
      "confirmPassword": "hunter22"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn project_text_is_stored_trimmed() {
  let app = app();
  let token = signup(&app, "ada@example.com").await;

  let padded = json!({
    "name": "  Alpha  ",
    "description": " first pass ",
    "startDate": "2025-01-01",
    "endDate": "2025-02-01"
  });
  let (status, created) = call(&app, Method::POST, "/api/projects", Some(&token), Some(padded)).await;
  assert_eq!(status, StatusCode::CREATED, "{created}");
  assert_eq!(created["name"], "Alpha");
  assert_eq!(created["description"], "first pass");
}

#[tokio::test]
async fn health_reports_unavailable_store() {
  let backend = Arc::new(SqliteBackend::connect("sqlite::memory:", 1).await.unwrap());
  let assistant = Assistant::new(Arc::new(StaticAnalytics), None);
  let app = router(AppState::new(RecordStore::new(backend.clone()), assistant, b"test-secret", 60));
  backend.close().await;

  let (status, body) = call(&app, Method::GET, "/health", None, None).await;

  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert_eq!(body["success"], false);
}

#[tokio::test]
async fn openapi_lists_collection_routes_without_trailing_slash() {
  let app = app();

  let (status, doc) = call(&app, Method::GET, "/api-docs/openapi.json", None, None).await;

  assert_eq!(status, StatusCode::OK);
  let paths = doc["paths"].as_object().unwrap();
  assert!(paths.contains_key("/api/projects"));
  assert!(paths.contains_key("/api/ask"));
  assert!(!paths.contains_key("/api/projects/"));
  assert!(paths.contains_key("/api/projects/{id}"));
}
