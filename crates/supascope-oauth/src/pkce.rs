//! PKCE verifier/challenge generation (RFC 7636, S256 method).

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Bytes of entropy behind each verifier and state value.
const ENTROPY_BYTES: usize = 32;

/// PKCE code verifier and challenge pair.
///
/// The challenge is a pure function of the verifier; the verifier is only
/// ever sent to the provider at token-exchange time, the challenge only at
/// authorization time.
#[derive(Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

impl PkceChallenge {
    /// Generate a new PKCE pair from the OS RNG.
    pub fn generate() -> Self {
        let mut verifier_bytes = [0u8; ENTROPY_BYTES];
        rand::rng().fill_bytes(&mut verifier_bytes);
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);
        let challenge = challenge_for(&verifier);

        Self {
            verifier,
            challenge,
        }
    }
}

// The verifier is a secret; keep it out of Debug output.
impl std::fmt::Debug for PkceChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceChallenge")
            .field("verifier", &"<redacted>")
            .field("challenge", &self.challenge)
            .finish()
    }
}

/// Derive the S256 challenge for a verifier: `base64url(sha256(verifier))`, no padding.
pub fn challenge_for(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Generate a random state string for CSRF protection.
pub fn generate_state() -> String {
    let mut state_bytes = [0u8; ENTROPY_BYTES];
    rand::rng().fill_bytes(&mut state_bytes);
    URL_SAFE_NO_PAD.encode(state_bytes)
}
