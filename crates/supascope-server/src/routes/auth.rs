//! OAuth connect flow: `/login`, `/callback`, `/logout`.

use axum::{
    Extension,
    extract::{Query, State},
    http::{StatusCode, header::LOCATION},
    response::Response,
};
use serde::Deserialize;
use tower_cookies::Cookies;
use uuid::Uuid;

use supascope_oauth::{OAuthAttempt, PkceChallenge, build_authorization_url, exchange_code, generate_state};

use crate::auth::{
    ATTEMPT_COOKIE, SessionIdentity, attempt_cookie, constant_time_eq, removal_cookie,
    session_cookie,
};
use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Query parameters on the provider's redirect back.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// `GET /login` — start an authorization attempt.
///
/// Mints a PKCE pair and a state correlator, parks the verifier server-side
/// under a fresh attempt id, hands the attempt id to the browser in an
/// HttpOnly cookie, and redirects to the provider.
pub async fn login_handler(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    let pkce = PkceChallenge::generate();
    let csrf_state = generate_state();
    let attempt_id = Uuid::new_v4().to_string();

    state
        .attempts
        .put(
            &attempt_id,
            OAuthAttempt {
                verifier: pkce.verifier.clone(),
                state: csrf_state.clone(),
            },
            state.config.attempt_ttl,
        )
        .await?;

    cookies.add(attempt_cookie(
        attempt_id.clone(),
        state.config.secure_cookies,
        state.config.attempt_ttl,
    ));

    let url = build_authorization_url(&state.config.oauth, &pkce.challenge, &csrf_state);

    tracing::info!(attempt_id, "Starting Supabase authorization");
    found(&url)
}

/// `GET /callback` — complete the authorization attempt.
///
/// The attempt is consumed before the state comparison, not after: an
/// attempt gets exactly one callback, pass or fail, so a forged state
/// also burns the stored verifier and a replayed callback finds nothing.
/// Either way a mismatched state never reaches the token endpoint. The
/// exchange itself is never retried.
pub async fn callback_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    let code = match params.code.as_deref() {
        Some(code) if !code.is_empty() => code,
        _ => {
            return Err(ServerError::InvalidRequest(
                "authorization code not provided".to_string(),
            ));
        }
    };

    let attempt_id = cookies
        .get(ATTEMPT_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(ServerError::VerifierNotFound)?;

    let attempt = state
        .attempts
        .take(&attempt_id)
        .await?
        .ok_or(ServerError::VerifierNotFound)?;

    // The state echoed by the provider must match the one issued for this
    // attempt; otherwise the callback was not initiated by us.
    match params.state.as_deref() {
        Some(echoed) if constant_time_eq(echoed, &attempt.state) => {}
        _ => return Err(ServerError::InvalidFlowState),
    }

    let tokens = exchange_code(&state.http, &state.config.oauth, code, &attempt.verifier).await?;
    let expires_in = tokens.expires_in;

    let session_id = Uuid::new_v4().to_string();
    state
        .sessions
        .put(
            &session_id,
            tokens,
            std::time::Duration::from_secs(expires_in),
        )
        .await?;

    cookies.remove(removal_cookie(ATTEMPT_COOKIE));
    cookies.add(session_cookie(
        session_id,
        state.config.secure_cookies,
        expires_in,
    ));

    tracing::info!("Supabase account connected");
    found(&state.config.dashboard_path)
}

/// `POST /logout` — drop the server-side session and clear the cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Extension(identity): Extension<SessionIdentity>,
) -> Result<StatusCode> {
    state.sessions.delete(&identity.session_id).await?;
    cookies.remove(removal_cookie(crate::auth::SESSION_COOKIE));

    tracing::info!("Session terminated");
    Ok(StatusCode::NO_CONTENT)
}

/// 302 redirect. Token values never appear in the location.
fn found(location: &str) -> Result<Response> {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(LOCATION, location)
        .body(axum::body::Body::empty())
        .map_err(|e| ServerError::Internal(format!("failed to build redirect: {}", e)))
}
