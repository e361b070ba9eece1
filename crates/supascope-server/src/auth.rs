//! Cookie-session authentication middleware.
//!
//! The browser only ever holds an opaque session id in an HttpOnly cookie;
//! the token set it refers to lives in the server-side session store. The
//! middleware resolves the cookie to a [`SessionIdentity`] and injects it
//! into request extensions.
//!
//! # Security
//!
//! OAuth `state` comparison uses constant-time comparison to prevent
//! timing attacks.

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tower_cookies::{Cookie, Cookies, cookie::SameSite, cookie::time};

use crate::error::ServerError;
use crate::state::AppState;

/// Cookie carrying the opaque session id after a successful connect.
pub const SESSION_COOKIE: &str = "supascope_session";

/// Cookie correlating the callback with the attempt that initiated it.
pub const ATTEMPT_COOKIE: &str = "supascope_oauth_attempt";

/// Authenticated session resolved from the session cookie.
#[derive(Clone)]
pub struct SessionIdentity {
    pub session_id: String,
    pub access_token: String,
}

impl std::fmt::Debug for SessionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIdentity")
            .field("session_id", &self.session_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Compare two strings in constant time.
///
/// Strings of different lengths still run a comparison so timing does not
/// leak how far a prefix matched.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    if a_bytes.len() == b_bytes.len() {
        a_bytes.ct_eq(b_bytes).into()
    } else {
        let _ = a_bytes.ct_eq(a_bytes);
        false
    }
}

/// Session authentication middleware.
///
/// Resolves the session cookie against the token store and injects the
/// [`SessionIdentity`] into request extensions. Requests without a live
/// session are rejected with 401.
pub async fn session_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let session_id = cookies
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ServerError::Unauthorized("no session".to_string()))?;

    let tokens = state
        .sessions
        .get(&session_id)
        .await?
        .ok_or_else(|| ServerError::Unauthorized("session expired".to_string()))?;

    request.extensions_mut().insert(SessionIdentity {
        session_id,
        access_token: tokens.access_token,
    });

    Ok(next.run(request).await)
}

/// Build the attempt cookie set at `/login`.
///
/// SameSite is Lax, not Strict: the callback arrives as a cross-site
/// top-level navigation from the provider and a Strict cookie would not
/// accompany it.
pub fn attempt_cookie(attempt_id: String, secure: bool, ttl: std::time::Duration) -> Cookie<'static> {
    let mut cookie = Cookie::new(ATTEMPT_COOKIE, attempt_id);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(ttl.as_secs() as i64));
    cookie
}

/// Build the session cookie set by the callback. Expiry matches the
/// provider-issued `expires_in`.
pub fn session_cookie(session_id: String, secure: bool, expires_in: u64) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(expires_in as i64));
    cookie
}

/// A cookie that removes `name` when added to the response.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}
