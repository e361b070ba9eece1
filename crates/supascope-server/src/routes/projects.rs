//! Project listing and the local project registry.
//!
//! Two distinct record shapes meet here and are deliberately kept apart:
//! provider-returned projects ([`supascope_provider::Project`]) and
//! user-entered records ([`LocalProject`], a plain key-value insert).

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use supascope_provider::Project;

use crate::auth::SessionIdentity;
use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Response body for `GET /projects`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectsResponse {
    pub projects: Vec<Project>,
}

/// A user-entered project record.
#[derive(Clone, Serialize)]
pub struct LocalProject {
    pub id: String,
    pub project_name: String,
    #[serde(skip_serializing)]
    pub api_key: String,
}

// The api_key is a user secret; keep it out of Debug output.
impl std::fmt::Debug for LocalProject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalProject")
            .field("id", &self.id)
            .field("project_name", &self.project_name)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Request body for `POST /projects`.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub id: Option<String>,
    pub project_name: String,
    pub api_key: String,
}

/// Response body for `POST /projects`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProjectResponse {
    pub id: String,
    pub project_name: String,
}

/// `GET /projects` — the connected account's projects.
pub async fn list_projects_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> Result<Json<ProjectsResponse>> {
    let projects = state.provider.list_projects(&identity.access_token).await?;
    Ok(Json(ProjectsResponse { projects }))
}

/// `POST /projects` — store a user-entered project record.
///
/// Presence checks only; a key-value insert is the extent of persistence.
pub async fn create_project_handler(
    State(state): State<AppState>,
    Extension(_identity): Extension<SessionIdentity>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<CreateProjectResponse>)> {
    if request.project_name.trim().is_empty() {
        return Err(ServerError::InvalidRequest(
            "project_name is required".to_string(),
        ));
    }
    if request.api_key.trim().is_empty() {
        return Err(ServerError::InvalidRequest(
            "api_key is required".to_string(),
        ));
    }

    let record = LocalProject {
        id: request.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        project_name: request.project_name,
        api_key: request.api_key,
    };

    let response = CreateProjectResponse {
        id: record.id.clone(),
        project_name: record.project_name.clone(),
    };

    let mut registry = state.registry.write().await;
    registry.insert(record.id.clone(), record);

    Ok((StatusCode::CREATED, Json(response)))
}
