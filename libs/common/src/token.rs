//! Access token claims and verification
//!
//! Tokens are RS256-signed JWTs. The auth service signs them with its private
//! key; every service that accepts bearer tokens verifies them with the
//! matching public key through [`TokenVerifier`].

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::role::RoleSet;

/// Clock skew tolerated when checking `exp`, in seconds
pub const VALIDATION_LEEWAY_SECS: u64 = 60;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Username at the time the token was issued
    pub username: String,
    /// User roles
    pub roles: RoleSet,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
    /// Unique token identifier, used for revocation
    pub jti: Uuid,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// Errors raised while loading keys or verifying tokens
#[derive(Error, Debug)]
pub enum TokenError {
    /// Key material could not be found or read
    #[error("Key unavailable: {0}")]
    KeyUnavailable(String),

    /// Key material is not a valid RSA PEM
    #[error("Invalid key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    /// Signature, expiry or payload check failed
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// A valid token of the wrong type was presented
    #[error("Expected a {expected:?} token")]
    WrongType { expected: TokenType },
}

/// Read a PEM key from an environment variable
///
/// The variable holds either the PEM text itself or a path to a PEM file.
/// Relative paths are tried against the working directory first, then
/// against `JWT_KEY_DIR` when it is set.
pub fn read_pem_from_env(var: &str) -> Result<String, TokenError> {
    let value = std::env::var(var)
        .map_err(|_| TokenError::KeyUnavailable(format!("{} environment variable not set", var)))?;

    if value.starts_with("-----BEGIN") {
        return Ok(value);
    }

    std::fs::read_to_string(&value)
        .or_else(|err| match std::env::var("JWT_KEY_DIR") {
            Ok(dir) => std::fs::read_to_string(std::path::Path::new(&dir).join(&value)),
            Err(_) => Err(err),
        })
        .map(|pem| pem.trim().to_string())
        .map_err(|e| TokenError::KeyUnavailable(format!("Failed to read key file {}: {}", value, e)))
}

/// Verifies RS256 tokens against a public key
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier from a PEM-encoded RSA public key
    pub fn from_rsa_pem(public_key: &str) -> Result<Self, TokenError> {
        let decoding_key =
            DecodingKey::from_rsa_pem(public_key.as_bytes()).map_err(TokenError::InvalidKey)?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.leeway = VALIDATION_LEEWAY_SECS;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Create a verifier from the `JWT_PUBLIC_KEY` environment variable
    pub fn from_env() -> Result<Self, TokenError> {
        let public_key = read_pem_from_env("JWT_PUBLIC_KEY")?;
        Self::from_rsa_pem(&public_key)
    }

    /// Validate a token of any type and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Validate a token and require it to be of the given type
    pub fn verify_as(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongType { expected });
        }
        Ok(claims)
    }
}
