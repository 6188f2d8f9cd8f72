//! # Token Module
//!
//! Inspection of the backend's JWT access token.
//!
//! The client never verifies signatures: the payload is decoded only to show
//! who is logged in and to hide manager tooling from regular users. The
//! backend re-checks everything on each request.

use crate::OakhurstError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Claims the backend places in the access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub is_manager: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Name to greet the user with: `username`, falling back to `sub`.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.username
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.sub.as_deref().filter(|s| !s.is_empty()))
    }

    /// Whether the token carries the manager role flag.
    #[must_use]
    pub fn is_manager(&self) -> bool {
        self.is_manager.is_some_and(|flag| flag != 0)
    }

    /// Whether the token has expired at `now` (seconds since the Unix epoch).
    /// Tokens without `exp` never expire on the client side.
    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now)
    }
}

/// Decode the payload segment of a JWT.
pub fn decode_claims(token: &str) -> Result<TokenClaims, OakhurstError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(OakhurstError::InvalidToken(
            "expected three dot-separated segments".to_string(),
        ));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| OakhurstError::InvalidToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| OakhurstError::InvalidToken(format!("payload is not a claims object: {e}")))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{header}.{body}.c2lnbmF0dXJl")
    }

    #[test]
    fn decodes_backend_claims() {
        let token = token_with(
            r#"{"sub":"ana@example.com","user_id":7,"is_manager":1,"username":"ana","exp":1700000000}"#,
        );
        let claims = decode_claims(&token).expect("decode");
        assert_eq!(claims.username.as_deref(), Some("ana"));
        assert_eq!(claims.user_id, Some(7));
        assert!(claims.is_manager());
        assert!(claims.is_expired(1_700_000_000));
        assert!(!claims.is_expired(1_699_999_999));
    }

    #[test]
    fn display_name_falls_back_to_subject() {
        let claims = decode_claims(&token_with(r#"{"sub":"bo@example.com"}"#)).expect("decode");
        assert_eq!(claims.display_name(), Some("bo@example.com"));
        assert!(!claims.is_manager());
        assert!(!claims.is_expired(i64::MAX));
    }

    #[test]
    fn padded_payload_is_accepted() {
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        let body = base64::engine::general_purpose::URL_SAFE.encode(br#"{"username":"x"}"#);
        let token = format!("{header}.{body}.sig");
        assert_eq!(
            decode_claims(&token).expect("decode").username.as_deref(),
            Some("x")
        );
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(decode_claims("").is_err());
        assert!(decode_claims("a.b").is_err());
        assert!(decode_claims("a.b.c.d").is_err());
        assert!(decode_claims("a.!!!.c").is_err());
        assert!(decode_claims(&token_with("[1,2,3]")).is_err());
    }

    #[test]
    fn manager_flag_zero_is_not_manager() {
        let claims = decode_claims(&token_with(r#"{"is_manager":0}"#)).expect("decode");
        assert!(!claims.is_manager());
    }
}
