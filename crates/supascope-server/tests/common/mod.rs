//! Common test utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use reqwest::redirect::Policy;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use supascope_oauth::OAuthConfig;
use supascope_server::{AppState, Server, ServerConfig};

/// Shared observer state for the mock provider.
#[derive(Default)]
pub struct MockProviderState {
    /// Number of requests the token endpoint has seen.
    pub token_requests: AtomicU32,
    /// Form parameters of the most recent token exchange.
    pub last_exchange: Mutex<Option<HashMap<String, String>>>,
    /// Authorization header of the most recent token exchange.
    pub last_auth_header: Mutex<Option<String>>,
    /// Organization whose member fetch fails with 500, if any.
    pub failing_org: Option<String>,
}

/// A mock Supabase management API plus OAuth token endpoint.
pub struct MockProvider {
    pub addr: SocketAddr,
    pub state: Arc<MockProviderState>,
}

impl MockProvider {
    pub async fn start(failing_org: Option<&str>) -> Result<Self> {
        let state = Arc::new(MockProviderState {
            failing_org: failing_org.map(str::to_string),
            ..Default::default()
        });

        let router = Router::new()
            .route("/oauth/token", post(token_endpoint))
            .route("/projects", get(list_projects))
            .route("/organizations", get(list_organizations))
            .route("/organizations/{id}/members", get(list_members))
            .route("/projects/{r}/database/backups", get(backups))
            .route("/projects/{r}/database/query", post(run_query))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Ok(Self { addr, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn token_requests(&self) -> u32 {
        self.state.token_requests.load(Ordering::SeqCst)
    }
}

async fn token_endpoint(
    State(state): State<Arc<MockProviderState>>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    state.token_requests.fetch_add(1, Ordering::SeqCst);

    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_auth_header.lock().await = auth;
    *state.last_exchange.lock().await = Some(params);

    Json(serde_json::json!({
        "access_token": "mock-access-token",
        "refresh_token": "mock-refresh-token",
        "expires_in": 3600,
        "token_type": "Bearer"
    }))
}

async fn list_projects(headers: HeaderMap) -> Result<Json<serde_json::Value>, StatusCode> {
    require_bearer(&headers)?;
    Ok(Json(serde_json::json!([
        {"id": "ref-1", "organization_id": "org-1", "name": "alpha",
         "region": "eu-west-1", "created_at": "2024-06-01T00:00:00Z"},
        {"id": "ref-2", "organization_id": "org-1", "name": "beta",
         "region": "us-east-1", "created_at": "2024-06-02T00:00:00Z"}
    ])))
}

async fn list_organizations(headers: HeaderMap) -> Result<Json<serde_json::Value>, StatusCode> {
    require_bearer(&headers)?;
    Ok(Json(serde_json::json!([
        {"id": "org-1", "name": "One"},
        {"id": "org-2", "name": "Two"},
        {"id": "org-3", "name": "Three"}
    ])))
}

async fn list_members(
    State(state): State<Arc<MockProviderState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    require_bearer(&headers)?;
    if state.failing_org.as_deref() == Some(id.as_str()) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(serde_json::json!([
        {"user_id": format!("{}-u1", id), "user_name": "Alice",
         "email": "alice@example.com", "role_name": "Owner", "mfa_enabled": true},
        {"user_id": format!("{}-u2", id), "user_name": "Bob",
         "email": "bob@example.com", "role_name": "Developer", "mfa_enabled": false}
    ])))
}

async fn backups(headers: HeaderMap) -> Result<Json<serde_json::Value>, StatusCode> {
    require_bearer(&headers)?;
    Ok(Json(serde_json::json!({
        "pitr_enabled": false,
        "walg_enabled": false,
        "region": "eu-west-1",
        "backups": []
    })))
}

async fn run_query(
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    require_bearer(&headers)?;
    if body.get("query").and_then(|q| q.as_str()).is_none() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(serde_json::json!([{"count": 42}])))
}

fn require_bearer(headers: &HeaderMap) -> Result<(), StatusCode> {
    let ok = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer ") && v.len() > "Bearer ".len());
    if ok { Ok(()) } else { Err(StatusCode::UNAUTHORIZED) }
}

/// A running supascope server wired to a mock provider.
pub struct TestHarness {
    pub addr: SocketAddr,
    pub provider: MockProvider,
    /// Cookie-keeping client that does not follow redirects.
    pub client: reqwest::Client,
    pub redirect_uri: String,
}

impl TestHarness {
    pub async fn start() -> Result<Self> {
        Self::start_with_failing_org(None).await
    }

    pub async fn start_with_failing_org(failing_org: Option<&str>) -> Result<Self> {
        let provider = MockProvider::start(failing_org).await?;

        let addr = find_available_port().await?;
        let redirect_uri = format!("http://{}/callback", addr);

        let oauth = OAuthConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            authorize_url: format!("{}/oauth/authorize", provider.base_url()),
            token_url: format!("{}/oauth/token", provider.base_url()),
            redirect_uri: redirect_uri.clone(),
            scope: "all".to_string(),
        };

        let config = ServerConfig::new(oauth)
            .with_bind_address(addr)
            .with_api_base_url(provider.base_url())
            .with_secure_cookies(false);

        let server = Server::from_state(AppState::new(config));
        let addr = server
            .run_with_shutdown(std::future::pending::<()>())
            .await?;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            addr,
            provider,
            client,
            redirect_uri,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Run `/login` and return the `state` and `code_challenge` from the
    /// authorization URL the server redirected to.
    pub async fn login(&self) -> Result<(String, String)> {
        let response = self.client.get(self.url("/login")).send().await?;
        assert_eq!(response.status(), 302);

        let location = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .expect("login must redirect")
            .to_string();

        let url = url::Url::parse(&location)?;
        let mut state = None;
        let mut challenge = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "state" => state = Some(value.to_string()),
                "code_challenge" => challenge = Some(value.to_string()),
                _ => {}
            }
        }

        Ok((state.expect("state param"), challenge.expect("challenge param")))
    }

    /// Complete a full connect: login plus callback with a matching state.
    pub async fn connect(&self) -> Result<()> {
        let (state, _challenge) = self.login().await?;
        let response = self
            .client
            .get(self.url(&format!("/callback?code=test-code&state={}", state)))
            .send()
            .await?;
        assert_eq!(response.status(), 302);
        Ok(())
    }
}

/// Find an available port by briefly binding to port 0.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}
