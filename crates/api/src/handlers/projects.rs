use axum::{
  extract::{Path, State},
  http::StatusCode,
  middleware::from_fn_with_state,
  Extension, Json,
};
use tracing::{debug, instrument};
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

use crate::{
  entities::{
    project::{Project, ProjectData},
    user::User,
  },
  error::{ApiError, ApiResult},
  AppJson, AppState,
};

use super::auth::auth_guard;

const PROJECTS_TAG: &str = "projects";

pub fn init_projects_routes(state: AppState) -> OpenApiRouter<AppState> {
  OpenApiRouter::new()
    .routes(routes!(list_projects, create_project))
    .routes(routes!(update_project, delete_project))
    .layer(from_fn_with_state(state, auth_guard))
}

#[utoipa::path(
  get,
  path = "",
  tag = PROJECTS_TAG,
  responses(
    (status = 200, description = "Projects of the current user", body = [Project]),
    (status = 401, description = "Unauthorized")
  )
)]
#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn list_projects(State(state): State<AppState>, Extension(user): Extension<User>) -> ApiResult<Json<Vec<Project>>> {
  let projects = state.projects.projects_by_user(user.id).await?;

  Ok(Json(projects))
}

#[utoipa::path(
  post,
  path = "",
  tag = PROJECTS_TAG,
  request_body = ProjectData,
  responses(
    (status = 201, description = "Project created successfully", body = Project),
    (status = 400, description = "Validation error")
  )
)]
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
async fn create_project(
  State(state): State<AppState>,
  Extension(user): Extension<User>,
  AppJson(input): AppJson<ProjectData>,
) -> ApiResult<(StatusCode, Json<Project>)> {
  debug!("Create project with request: {:?}", input);

  let project = state.projects.create(input, user.id).await?;

  Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
  put,
  path = "/{id}",
  tag = PROJECTS_TAG,
  request_body = ProjectData,
  params(
    ("id" = Uuid, Path, description = "Project id")
  ),
  responses(
    (status = 200, description = "Project updated successfully", body = Project),
    (status = 400, description = "Validation error"),
    (status = 404, description = "No such project for the current user")
  )
)]
#[instrument(skip(state, user, input), fields(project_id = %id, user_id = %user.id))]
async fn update_project(
  State(state): State<AppState>,
  Extension(user): Extension<User>,
  Path(id): Path<Uuid>,
  AppJson(input): AppJson<ProjectData>,
) -> ApiResult<Json<Project>> {
  debug!("Update project with id {} and params {:?}", id, input);

  state
    .projects
    .update(id, input, user.id)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::ResourceNotFound(id.to_string()))
}

#[utoipa::path(
  delete,
  path = "/{id}",
  tag = PROJECTS_TAG,
  params(
    ("id" = Uuid, Path, description = "Project id")
  ),
  responses(
    (status = 204, description = "Project successfully deleted"),
    (status = 404, description = "No such project for the current user")
  )
)]
#[instrument(skip(state, user), fields(project_id = %id, user_id = %user.id))]
async fn delete_project(
  State(state): State<AppState>,
  Extension(user): Extension<User>,
  Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
  debug!("Remove project with id {}", id);

  if state.projects.delete(id, user.id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::ResourceNotFound(id.to_string()))
  }
}
