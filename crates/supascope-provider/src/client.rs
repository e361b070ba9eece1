//! Management API client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::timeout;

use crate::error::{ProviderError, Result};
use crate::types::{BackupsStatus, Member, Organization, OrganizationDetail, PitrStatus, Project};

/// Supabase management API base.
pub const SUPABASE_API_URL: &str = "https://api.supabase.com/v1";

/// Time budget for the whole organization/member fan-out.
const DEFAULT_AGGREGATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Backoff before the single retry of a transient GET failure.
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Client for the Supabase management API.
///
/// Stateless apart from the connection pool; the access token is supplied
/// per call because it belongs to the request's session, not the process.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    http: reqwest::Client,
    base_url: String,
    aggregate_timeout: Duration,
}

impl ManagementClient {
    /// Client against the real management API.
    pub fn new() -> Self {
        Self::with_base_url(SUPABASE_API_URL.to_string())
    }

    /// Client against a custom base URL (tests, self-hosted).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            aggregate_timeout: DEFAULT_AGGREGATE_TIMEOUT,
        }
    }

    /// Override the fan-out time budget.
    pub fn with_aggregate_timeout(mut self, budget: Duration) -> Self {
        self.aggregate_timeout = budget;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List the account's projects.
    pub async fn list_projects(&self, token: &str) -> Result<Vec<Project>> {
        self.get_json("/projects", token).await
    }

    /// List the account's organizations.
    pub async fn list_organizations(&self, token: &str) -> Result<Vec<Organization>> {
        self.get_json("/organizations", token).await
    }

    /// List the members of one organization.
    pub async fn list_members(&self, org_id: &str, token: &str) -> Result<Vec<Member>> {
        self.get_json(&format!("/organizations/{}/members", org_id), token)
            .await
    }

    /// Every organization with its members.
    ///
    /// Member fetches run concurrently under one time budget. Any failure
    /// fails the whole aggregate: a partial member list would silently hide
    /// MFA information from compliance review.
    pub async fn organizations_with_members(&self, token: &str) -> Result<Vec<OrganizationDetail>> {
        let organizations = self.list_organizations(token).await?;

        let fetches = organizations.into_iter().map(|org| async move {
            let members = self.list_members(&org.id, token).await?;
            Ok::<_, ProviderError>(OrganizationDetail {
                organization: org,
                members,
            })
        });

        match timeout(self.aggregate_timeout, futures::future::try_join_all(fetches)).await {
            Ok(details) => details,
            Err(_) => Err(ProviderError::Timeout),
        }
    }

    /// Point-in-time-recovery status for a project.
    pub async fn pitr_status(&self, project_ref: &str, token: &str) -> Result<PitrStatus> {
        let data: BackupsStatus = self
            .get_json(&format!("/projects/{}/database/backups", project_ref), token)
            .await?;

        Ok(PitrStatus {
            project_ref: project_ref.to_string(),
            pitr_enabled: data.pitr_enabled,
            data,
        })
    }

    /// Run a SQL query against a project database.
    pub async fn run_query(
        &self,
        project_ref: &str,
        query: &str,
        token: &str,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/projects/{}/database/query", self.base_url, project_ref);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| ProviderError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::upstream(status));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("query result: {}", e)))
    }

    /// GET with typed decode. Transient failures retry once after a short
    /// backoff; GETs are idempotent so the retry is safe.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = match self.send_get(&url, token).await {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() => {
                tracing::debug!(%url, error = %e, "Transient upstream failure, retrying once");
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.send_get(&url, token)
                    .await
                    .map_err(|e| ProviderError::Unreachable(e.to_string()))?
            }
            Err(e) => return Err(ProviderError::Unreachable(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::upstream(status));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Decode(format!("{}: {}", path, e)))
    }

    async fn send_get(
        &self,
        url: &str,
        token: &str,
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        self.http.get(url).bearer_auth(token).send().await
    }
}

impl Default for ManagementClient {
    fn default() -> Self {
        Self::new()
    }
}
