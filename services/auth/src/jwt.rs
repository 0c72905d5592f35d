//! JWT service for token generation and validation
//!
//! Tokens are signed with RS256. Revocation lives in
//! [`common::revocation`] so the API service sees it too.

use anyhow::{Context, Result};
use common::token::{Claims, TokenType, TokenVerifier, read_pem_from_env};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, get_current_timestamp};
use uuid::Uuid;

use crate::models::User;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Private key for signing tokens
    pub private_key: String,
    /// Public key for verifying tokens
    pub public_key: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PRIVATE_KEY`: Private key for signing tokens (PEM format) or path to private key file
    /// - `JWT_PUBLIC_KEY`: Public key for verifying tokens (PEM format) or path to public key file
    /// - `JWT_KEY_DIR`: Directory that relative key paths are resolved against (optional)
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let private_key = read_pem_from_env("JWT_PRIVATE_KEY")?;
        let public_key = read_pem_from_env("JWT_PUBLIC_KEY")?;

        // 15 minutes
        let access_token_expiry = expiry_from_env("JWT_ACCESS_TOKEN_EXPIRY", 900)?;
        // 7 days
        let refresh_token_expiry = expiry_from_env("JWT_REFRESH_TOKEN_EXPIRY", 604800)?;

        Ok(JwtConfig {
            private_key,
            public_key,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

fn expiry_from_env(var: &str, default: u64) -> Result<u64> {
    let seconds = match std::env::var(var) {
        Ok(value) => value
            .parse::<u64>()
            .with_context(|| format!("{} must be a number of seconds, got {:?}", var, value))?,
        Err(_) => default,
    };

    if seconds == 0 {
        anyhow::bail!("{} must be greater than zero", var);
    }

    Ok(seconds)
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    verifier: TokenVerifier,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())?;
        let verifier = TokenVerifier::from_rsa_pem(&config.public_key)?;

        Ok(JwtService {
            encoding_key,
            verifier,
            config,
        })
    }

    fn sign(&self, user: &User, token_type: TokenType, lifetime: u64) -> Result<String> {
        let now = get_current_timestamp();

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            roles: user.roles.clone(),
            iat: now,
            exp: now + lifetime,
            token_type,
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        self.sign(user, TokenType::Access, self.config.access_token_expiry)
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user: &User) -> Result<String> {
        self.sign(user, TokenType::Refresh, self.config.refresh_token_expiry)
    }

    /// Validate a token of the expected type and return the claims
    pub fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims> {
        Ok(self.verifier.verify_as(token, expected)?)
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Get the refresh token expiry time
    pub fn refresh_token_expiry(&self) -> u64 {
        self.config.refresh_token_expiry
    }
}
