//! Decoded shapes of management API payloads.
//!
//! Upstream responses are decoded into these types at the proxy boundary so
//! the rest of the system never handles loose JSON. Unknown fields are
//! ignored; missing required fields are a decode error, not a panic.

use serde::{Deserialize, Serialize};

/// A project as returned by `GET /projects`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub organization_id: String,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// An organization as returned by `GET /organizations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// An organization member, flattened to the fields compliance review needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role_name: String,
    #[serde(default)]
    pub mfa_enabled: bool,
}

/// One organization together with its member list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationDetail {
    pub organization: Organization,
    pub members: Vec<Member>,
}

/// Backups payload from `GET /projects/{ref}/database/backups`.
///
/// Only `pitr_enabled` is interpreted; the remainder is carried through
/// untouched for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupsStatus {
    pub pitr_enabled: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Point-in-time-recovery status for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitrStatus {
    pub project_ref: String,
    pub pitr_enabled: bool,
    pub data: BackupsStatus,
}
