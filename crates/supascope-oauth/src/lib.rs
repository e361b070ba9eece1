//! OAuth 2.0 authorization-code flow with PKCE for Supabase account connection.
//!
//! Implements the protocol half of the "connect Supabase" feature: a PKCE
//! verifier/challenge pair is minted per authorization attempt, the verifier
//! is parked server-side until the provider redirects back, and the
//! authorization code is exchanged for tokens that never leave the server.
//!
//! # Components
//!
//! - [`pkce`] — verifier/challenge generation and the CSRF state correlator
//! - [`flow`] — authorization URL construction, token exchange and refresh
//! - [`store`] — TTL'd session storage for attempts and token sets

pub mod error;
pub mod flow;
pub mod pkce;
pub mod store;

pub use error::{OAuthError, Result};
pub use flow::{OAuthAttempt, OAuthConfig, TokenSet, build_authorization_url, exchange_code, refresh_tokens};
pub use pkce::{PkceChallenge, challenge_for, generate_state};
pub use store::{MemoryStore, SessionStore, SharedStore};
