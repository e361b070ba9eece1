//! Organization and member aggregation.

use axum::{Extension, Json, extract::State};

use supascope_provider::OrganizationDetail;

use crate::auth::SessionIdentity;
use crate::error::Result;
use crate::state::AppState;

/// `GET /organizations` — every organization with its members.
///
/// Members carry the `mfa_enabled` flag compliance review looks at, so the
/// aggregate is all-or-nothing: one failed member fetch fails the request.
pub async fn list_organizations_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> Result<Json<Vec<OrganizationDetail>>> {
    let details = state
        .provider
        .organizations_with_members(&identity.access_token)
        .await?;
    Ok(Json(details))
}
