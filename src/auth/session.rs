use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The payload carried by a session token. `ver` must still match the
/// user's stored token_version when the token is presented.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: i64,
    pub ver: i64,
    pub exp: usize,
}

/// Issues and verifies signed, time-limited session tokens. The rest of
/// the application treats tokens as opaque strings.
pub struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    max_age_seconds: i64,
}

impl SessionSigner {
    #[must_use]
    pub fn new(secret: &str, max_age_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            max_age_seconds,
        }
    }

    pub fn issue(&self, user_id: i64, token_version: i64) -> Result<String> {
        let exp = (Utc::now() + Duration::seconds(self.max_age_seconds)).timestamp() as usize;
        let claims = SessionClaims {
            sub: user_id,
            ver: token_version,
            exp,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| Error::Config(format!("failed to sign session token: {e}")))
    }

    /// Decodes and verifies a token. Expired or tampered tokens yield None;
    /// the caller must still compare `ver` against the stored user.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_verify_roundtrip() {
        let signer = SessionSigner::new("test-secret", 3600);
        let token = signer.issue(42, 3).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.ver, 3);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let signer = SessionSigner::new("test-secret", 3600);
        let other = SessionSigner::new("other-secret", 3600);
        let token = signer.issue(42, 1).unwrap();

        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn test_verify_rejects_expired() {
        // Past the default validation leeway.
        let signer = SessionSigner::new("test-secret", -300);
        let token = signer.issue(42, 1).unwrap();

        assert!(signer.verify(&token).is_none());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let signer = SessionSigner::new("test-secret", 3600);
        assert!(signer.verify("not-a-token").is_none());
    }
}
