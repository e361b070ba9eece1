//! Typed client for the Supabase management API.
//!
//! Every call is an authenticated pass-through: the caller supplies the
//! session's access token, the client attaches it as a bearer credential
//! and decodes the response into the types in [`types`] at the boundary.
//!
//! # Components
//!
//! - [`client`] — [`ManagementClient`]: projects, organizations, members
//!   (concurrent fan-out), PITR status, SQL query execution
//! - [`types`] — decoded upstream payload shapes

pub mod client;
pub mod error;
pub mod types;

pub use client::{ManagementClient, SUPABASE_API_URL};
pub use error::{ProviderError, Result};
pub use types::{BackupsStatus, Member, Organization, OrganizationDetail, PitrStatus, Project};
