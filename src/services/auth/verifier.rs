//! Token verification capability.
//!
//! The identity middleware only knows this trait; the provider (Clerk) lives
//! behind it and can be swapped or stubbed in tests.

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

use crate::services::auth::identity::IdentityPayload;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("malformed token")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("invalid token issuer")]
    InvalidIssuer,
    #[error("invalid token audience")]
    InvalidAudience,
    #[error("unsupported token algorithm")]
    InvalidAlgorithm,
    #[error("no matching verification key")]
    NoMatchingKey,
    #[error("verification key error: {0}")]
    Key(String),
    #[error("jwks fetch failed: {0}")]
    KeyFetch(String),
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::InvalidAudience => Self::InvalidAudience,
            ErrorKind::InvalidAlgorithm => Self::InvalidAlgorithm,
            _ => Self::Malformed,
        }
    }
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    // Verify a raw bearer token and return its claims.
    async fn verify(&self, token: &str) -> Result<IdentityPayload, VerifyError>;
}
