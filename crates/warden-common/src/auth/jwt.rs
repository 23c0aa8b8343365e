//! Access token codec
//!
//! Issues and validates HS256 access tokens using the `jsonwebtoken` crate,
//! and mints opaque refresh token values.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::Role;

/// Issuer stamped into every access token
pub const TOKEN_ISSUER: &str = "warden";

/// Identity carried by an access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: Uuid,
    pub role: Role,
}

/// Full JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity ID
    pub id: Uuid,
    /// Role at issuance time
    pub role: Role,
    pub iss: String,
    /// Subject, equal to `id`
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    /// The identity part of the payload
    #[must_use]
    pub fn token_claims(&self) -> TokenClaims {
        TokenClaims {
            id: self.id,
            role: self.role,
        }
    }

    /// Expired when `exp` is at or before `now`
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}

/// Token codec failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token signing is not configured: {0}")]
    Config(String),

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Only an expired token may be renewed
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Failures caused by the server rather than the presented token
    #[must_use]
    pub fn is_server_fault(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Encoding(_))
    }
}

/// Signs and verifies access tokens
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    has_secret: bool,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl TokenCodec {
    /// Create a codec with the given secret and lifetimes in seconds
    #[must_use]
    pub fn new(secret: &str, access_token_expiry: i64, refresh_token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            has_secret: !secret.is_empty(),
            access_token_expiry,
            refresh_token_expiry,
        }
    }

    /// Access token lifetime in seconds
    #[must_use]
    pub fn access_lifetime(&self) -> i64 {
        self.access_token_expiry
    }

    /// Refresh token lifetime in seconds
    #[must_use]
    pub fn refresh_lifetime(&self) -> i64 {
        self.refresh_token_expiry
    }

    /// Sign a new access token for the given identity
    ///
    /// # Errors
    /// `TokenError::Config` if no signing secret is configured
    pub fn issue(&self, claims: TokenClaims) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        self.encode_claims(&Claims {
            id: claims.id,
            role: claims.role,
            iss: TOKEN_ISSUER.to_string(),
            sub: claims.id.to_string(),
            iat: now,
            nbf: now,
            exp: now.saturating_add(self.access_token_expiry),
        })
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        if !self.has_secret {
            return Err(TokenError::Config("signing secret is empty".to_string()));
        }

        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify signature, algorithm, issuer and time claims
    ///
    /// # Errors
    /// `Expired` when `exp <= now`, `InvalidSignature` on signature or
    /// algorithm mismatch, `Malformed` otherwise
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        if !self.has_secret {
            return Err(TokenError::Config("signing secret is empty".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        validation.leeway = 0;
        // exp is checked below so that exp == now counts as expired
        validation.validate_exp = false;
        validation.validate_nbf = true;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed,
            })?;

        if claims.is_expired_at(Utc::now().timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Decode the payload without verifying anything.
    /// Never use the result for authorization.
    ///
    /// # Errors
    /// `TokenError::Malformed` if the token cannot be parsed
    pub fn extract_unverified(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.set_required_spec_claims::<&str>(&[]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Malformed)
    }

    /// Mint an opaque, time-sortable refresh token value
    #[must_use]
    pub fn generate_refresh_token(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish_non_exhaustive()
    }
}
