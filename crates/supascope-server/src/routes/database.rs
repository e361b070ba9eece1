//! Per-project database introspection: PITR status and ad-hoc SQL.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use supascope_provider::PitrStatus;

use crate::auth::SessionIdentity;
use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Request body for `POST /projects/{ref}/database/query`.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

/// Response body for `POST /projects/{ref}/database/query`.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub data: serde_json::Value,
}

/// `GET /projects/{ref}/pitr-status` — point-in-time-recovery status.
pub async fn pitr_status_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(project_ref): Path<String>,
) -> Result<Json<PitrStatus>> {
    let status = state
        .provider
        .pitr_status(&project_ref, &identity.access_token)
        .await?;
    Ok(Json(status))
}

/// `POST /projects/{ref}/database/query` — run a SQL query.
pub async fn run_query_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(project_ref): Path<String>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    if request.query.trim().is_empty() {
        return Err(ServerError::InvalidRequest(
            "SQL query is required".to_string(),
        ));
    }

    let data = state
        .provider
        .run_query(&project_ref, &request.query, &identity.access_token)
        .await?;

    Ok(Json(QueryResponse { data }))
}
