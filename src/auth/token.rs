use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::user::Principal;
use crate::constants::TOKEN_VALIDITY_SECS;
use crate::error::{AuthFailure, PostboardError, Result};

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id
    #[serde(rename = "id")]
    pub subject_id: i64,
    /// Principal email at issuance
    #[serde(rename = "email")]
    pub subject_email: String,
    /// Issued at (as UTC timestamp)
    pub iat: i64,
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a principal issued at `issued_at`
    pub fn for_principal(principal: &Principal, issued_at: i64, validity_secs: i64) -> Self {
        Self {
            subject_id: principal.id,
            subject_email: principal.email.clone(),
            iat: issued_at,
            exp: issued_at + validity_secs,
        }
    }
}

/// Issues and decodes HS256 bearer tokens with a secret fixed at construction
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity_secs: i64,
}

impl TokenManager {
    /// Creates a token manager issuing one-hour tokens
    pub fn new(secret: &str) -> Self {
        Self::with_validity(secret, TOKEN_VALIDITY_SECS)
    }

    /// Creates a token manager with a custom validity window
    pub fn with_validity(secret: &str, validity_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; a token is dead the second after exp
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity_secs,
        }
    }

    pub fn validity_secs(&self) -> i64 {
        self.validity_secs
    }

    /// Mints a token for the principal, valid from now
    pub fn issue(&self, principal: &Principal) -> Result<String> {
        self.issue_at(principal, Utc::now().timestamp())
    }

    /// Mints a token as if issued at `issued_at`
    pub fn issue_at(&self, principal: &Principal, issued_at: i64) -> Result<String> {
        let claims = Claims::for_principal(principal, issued_at, self.validity_secs);
        self.sign(&claims)
    }

    /// Signs arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| PostboardError::StoreFailure(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature then expiry, returning the embedded claims.
    ///
    /// The signature is checked first, so a tampered expired token reports
    /// `InvalidSignature` rather than `Expired`.
    pub fn decode(&self, token: &str) -> std::result::Result<Claims, AuthFailure> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthFailure::Expired,
                _ => {
                    log::debug!("Token rejected: {}", e);
                    AuthFailure::InvalidSignature
                }
            })
    }
}

/// Extracts bearer token from an Authorization header value
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-signing-key-0123456789abcdef";

    fn principal() -> Principal {
        Principal {
            id: 1,
            email: "a@x.com".to_string(),
            name: "A".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_decode() {
        let manager = TokenManager::new(SECRET);
        let token = manager.issue(&principal()).unwrap();

        let claims = manager.decode(&token).unwrap();
        assert_eq!(claims.subject_id, 1);
        assert_eq!(claims.subject_email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, TOKEN_VALIDITY_SECS);
    }

    #[test]
    fn test_payload_uses_wire_field_names() {
        let claims = Claims::for_principal(&principal(), 1_000, 3_600);
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["iat"], 1_000);
        assert_eq!(json["exp"], 4_600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = TokenManager::new(SECRET);
        let two_hours_ago = Utc::now().timestamp() - 7_200;
        let token = manager.issue_at(&principal(), two_hours_ago).unwrap();

        assert_eq!(manager.decode(&token), Err(AuthFailure::Expired));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenManager::new(SECRET);
        let other = TokenManager::new("another-signing-key-0123456789abcdef");
        let token = issuer.issue(&principal()).unwrap();

        assert_eq!(other.decode(&token), Err(AuthFailure::InvalidSignature));
    }

    #[test]
    fn test_garbage_rejected() {
        let manager = TokenManager::new(SECRET);
        assert_eq!(manager.decode("invalid.token.here"), Err(AuthFailure::InvalidSignature));
        assert_eq!(manager.decode(""), Err(AuthFailure::InvalidSignature));
    }

    #[test]
    fn test_expiry_boundary_has_no_leeway() {
        let manager = TokenManager::with_validity(SECRET, 60);
        let now = Utc::now().timestamp();

        // exp == now is still valid
        let last_second = manager.issue_at(&principal(), now - 60).unwrap();
        assert!(manager.decode(&last_second).is_ok());

        // one second past exp is not
        let just_expired = manager.issue_at(&principal(), now - 61).unwrap();
        assert_eq!(manager.decode(&just_expired), Err(AuthFailure::Expired));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_bearer_token("abc.def.ghi"), None);
    }
}
