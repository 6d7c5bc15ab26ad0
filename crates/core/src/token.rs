//! Signed bearer credentials.
//!
//! The identity service issues HS256 tokens asserting a subject id and role;
//! the order service verifies them with the same shared secret. Verification is
//! a pure function of the token, the secret and the clock.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// Scheme prefix of an `Authorization` header carrying a credential.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Errors from issuing or verifying a credential.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// No credential was presented.
    #[error("no token provided")]
    Missing,

    /// The credential is malformed, expired, or its signature does not match.
    #[error("invalid or expired token")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// Signing failed.
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Identity claims carried by a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the identity the token was issued to.
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub role: Role,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    /// Claims for `user_id` valid for `ttl` from now.
    #[must_use]
    pub fn new(user_id: UserId, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("algorithm", &Algorithm::HS256)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenKeys {
    /// Derive keys from the process-wide signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Sign a set of claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if the claims cannot be encoded.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    /// Issue a credential for an identity, valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if the claims cannot be encoded.
    pub fn issue(&self, user_id: UserId, role: Role, ttl: Duration) -> Result<String, TokenError> {
        self.sign(&Claims::new(user_id, role, ttl))
    }

    /// Verify a credential and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Missing`] when `token` is absent or blank, and
    /// [`TokenError::Invalid`] when it is malformed, expired, or signed with a
    /// different secret.
    pub fn verify(&self, token: Option<&str>) -> Result<Claims, TokenError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(TokenError::Missing)?;

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

/// Extract the token from an `Authorization` header value.
///
/// Values without the `Bearer ` scheme are taken as the raw token, matching
/// clients that send the bare credential.
#[must_use]
pub fn bearer_token(header: &str) -> &str {
    header.strip_prefix(BEARER_PREFIX).unwrap_or(header).trim()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keys(secret: &str) -> TokenKeys {
        TokenKeys::new(&SecretString::from(secret.to_owned()))
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = keys("k8#Lq2!vZp9@Wm4$Rt7&Yc1^Nb6*Hs3%");
        let token = keys
            .issue(UserId::new(5), Role::Admin, Duration::hours(24))
            .unwrap();

        let claims = keys.verify(Some(&token)).unwrap();
        assert_eq!(claims.user_id, UserId::new(5));
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_missing_token() {
        let keys = keys("k8#Lq2!vZp9@Wm4$Rt7&Yc1^Nb6*Hs3%");
        assert!(matches!(keys.verify(None), Err(TokenError::Missing)));
        assert!(matches!(keys.verify(Some("  ")), Err(TokenError::Missing)));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = keys("first-Qz8!xT2@pL5#")
            .issue(UserId::new(1), Role::User, Duration::hours(1))
            .unwrap();
        let result = keys("second-Mw3$rK9&vB1*").verify(Some(&token));
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let keys = keys("k8#Lq2!vZp9@Wm4$Rt7&Yc1^Nb6*Hs3%");
        let token = keys
            .issue(UserId::new(1), Role::User, Duration::hours(-1))
            .unwrap();
        assert!(matches!(
            keys.verify(Some(&token)),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let keys = keys("k8#Lq2!vZp9@Wm4$Rt7&Yc1^Nb6*Hs3%");
        assert!(matches!(
            keys.verify(Some("not.a.jwt")),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), "abc.def");
        assert_eq!(bearer_token("abc.def"), "abc.def");
    }

    #[test]
    fn test_claims_wire_names() {
        let claims = Claims {
            user_id: UserId::new(9),
            role: Role::User,
            iat: 1,
            exp: 2,
        };
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["userId"], 9);
        assert_eq!(value["role"], "user");
    }
}
