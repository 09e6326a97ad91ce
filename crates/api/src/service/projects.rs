use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::{
  entities::project::{CreateProjectData, Project, UpdateProjectData},
  error::ApiResult,
  store::{Change, RecordStore},
};

pub const PROJECTS_COLLECTION: &str = "timetrack_projects";

/// User-scoped CRUD over the projects collection.
///
/// Every lookup matches on both project id and owner, so a project is
/// invisible to, and cannot be changed by, any other user.
#[derive(Clone)]
pub struct ProjectDirectory {
  store: RecordStore,
}

impl ProjectDirectory {
  pub fn new(store: RecordStore) -> Self {
    Self { store }
  }

  /// Projects owned by `user_id`, in storage order.
  pub async fn projects_by_user(&self, user_id: Uuid) -> ApiResult<Vec<Project>> {
    let projects: Vec<Project> = self.store.load(PROJECTS_COLLECTION).await?;

    Ok(projects.into_iter().filter(|p| p.is_owned_by(user_id)).collect())
  }

  /// Trims and validates `data`, assigns a fresh id and creation time, and
  /// appends it.
  pub async fn create(&self, data: CreateProjectData, user_id: Uuid) -> ApiResult<Project> {
    let data = data.trimmed();
    data.validate()?;

    let project = Project::new(data, user_id);
    let created = project.clone();

    self
      .store
      .modify(PROJECTS_COLLECTION, move |projects: &mut Vec<Project>| {
        projects.push(project);
        Change::Persist(())
      })
      .await?;

    info!("Created project {} for user {}", created.id, user_id);

    Ok(created)
  }

  /// Returns `None` when no project with `id` belongs to `user_id`.
  pub async fn update(&self, id: Uuid, data: UpdateProjectData, user_id: Uuid) -> ApiResult<Option<Project>> {
    let data = data.trimmed();
    data.validate()?;

    let updated = self
      .store
      .modify(PROJECTS_COLLECTION, move |projects: &mut Vec<Project>| {
        match projects.iter_mut().find(|p| p.id == id && p.is_owned_by(user_id)) {
          Some(project) => {
            project.apply(data);
            Change::Persist(Some(project.clone()))
          },
          None => Change::Discard(None),
        }
      })
      .await?;

    debug!("Update of project {} by user {} found={}", id, user_id, updated.is_some());

    Ok(updated)
  }

  /// Returns whether a project was removed; storage is written only if so.
  pub async fn delete(&self, id: Uuid, user_id: Uuid) -> ApiResult<bool> {
    let removed = self
      .store
      .modify(PROJECTS_COLLECTION, |projects: &mut Vec<Project>| {
        let before = projects.len();
        projects.retain(|p| !(p.id == id && p.is_owned_by(user_id)));

        if projects.len() == before {
          Change::Discard(false)
        } else {
          Change::Persist(true)
        }
      })
      .await?;

    debug!("Delete of project {} by user {} removed={}", id, user_id, removed);

    Ok(removed)
  }
}
