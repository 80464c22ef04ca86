//! JWT token validation for the chat gateway
//!
//! Tokens carry the user identity in the `sub` claim. The messaging
//! coordinator only accepts a connection when the token's subject matches
//! the claimed user id; issuing real tokens is the external auth
//! collaborator's job, with a dev-mode mint for local development.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::types::EcotrackError;

/// Secret used when running in dev mode
const DEV_SECRET: &str = "dev-only-insecure-secret";

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User identity
    pub sub: String,
    /// Expiry (seconds since epoch)
    pub exp: usize,
    /// Issued-at (seconds since epoch)
    pub iat: usize,
}

/// Result of verifying a token
#[derive(Debug)]
pub struct TokenValidationResult {
    pub valid: bool,
    pub claims: Option<Claims>,
    pub error: Option<String>,
}

/// HS256 token validator
#[derive(Clone)]
pub struct JwtValidator {
    secret: String,
    expiry_seconds: u64,
}

impl JwtValidator {
    pub fn new(secret: String, expiry_seconds: u64) -> Result<Self, EcotrackError> {
        if secret.is_empty() {
            return Err(EcotrackError::Auth("JWT secret must not be empty".to_string()));
        }
        Ok(Self {
            secret,
            expiry_seconds,
        })
    }

    /// Validator with the fixed dev-mode secret
    pub fn new_dev() -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            expiry_seconds: 3600,
        }
    }

    /// Issue a token for a user id
    pub fn issue_token(&self, user_id: &str) -> Result<String, EcotrackError> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + self.expiry_seconds as usize,
            iat: now,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| EcotrackError::Auth(format!("Failed to issue token: {e}")))
    }

    /// Verify a token and return its claims
    pub fn verify_token(&self, token: &str) -> TokenValidationResult {
        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(data) => TokenValidationResult {
                valid: true,
                claims: Some(data.claims),
                error: None,
            },
            Err(e) => TokenValidationResult {
                valid: false,
                claims: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Extract a bearer token from an Authorization header value
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<&str> {
    auth_header?.strip_prefix("Bearer ")
}

/// Extract a `token` parameter from a query string
pub fn extract_token_from_query(query: Option<&str>) -> Option<String> {
    let query = query?;
    for param in query.split('&') {
        if let Some((key, value)) = param.split_once('=') {
            if key == "token" {
                return Some(value.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let jwt = JwtValidator::new_dev();
        let token = jwt.issue_token("alice").unwrap();

        let result = jwt.verify_token(&token);
        assert!(result.valid);
        assert_eq!(result.claims.unwrap().sub, "alice");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtValidator::new("secret-a".to_string(), 3600).unwrap();
        let verifier = JwtValidator::new("secret-b".to_string(), 3600).unwrap();

        let token = issuer.issue_token("alice").unwrap();
        let result = verifier.verify_token(&token);
        assert!(!result.valid);
        assert!(result.claims.is_none());
        assert!(result.error.is_some());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let jwt = JwtValidator::new_dev();
        let result = jwt.verify_token("not-a-token");
        assert!(!result.valid);
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(JwtValidator::new(String::new(), 3600).is_err());
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(
            extract_token_from_header(Some("Bearer abc.def.ghi")),
            Some("abc.def.ghi")
        );
        assert_eq!(extract_token_from_header(Some("Basic xyz")), None);
        assert_eq!(extract_token_from_header(None), None);
    }

    #[test]
    fn test_extract_token_from_query() {
        assert_eq!(
            extract_token_from_query(Some("user_id=alice&token=abc")),
            Some("abc".to_string())
        );
        assert_eq!(extract_token_from_query(Some("user_id=alice")), None);
        assert_eq!(extract_token_from_query(None), None);
    }
}
