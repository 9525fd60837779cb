use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

use crate::services::auth::{
    identity::IdentityPayload,
    jwks::JwksCache,
    verifier::{TokenVerifier, VerifyError},
};

enum KeySource {
    // CLERK_JWT_KEY: PEM public key, no network
    Static(DecodingKey),
    // CLERK_SECRET_KEY: keys from the Clerk backend API
    Jwks(JwksCache),
}

/// Clerk session-token verifier.
///
/// Checks signature, `exp`/`nbf` (with leeway), `iss`, and `aud` when an
/// audience is configured. The subject is NOT required here; the access guard
/// decides what to do with a token that has none.
pub struct ClerkVerifier {
    keys: KeySource,
    issuer: String,
    audience: Option<String>,
    leeway_seconds: u64,
}

impl std::fmt::Debug for ClerkVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys = match &self.keys {
            KeySource::Static(_) => "pem",
            KeySource::Jwks(_) => "jwks",
        };
        f.debug_struct("ClerkVerifier")
            .field("keys", &keys)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl ClerkVerifier {
    pub fn with_pem(
        public_key_pem: &str,
        issuer: impl Into<String>,
        audience: Option<String>,
        leeway_seconds: u64,
    ) -> Result<Self, VerifyError> {
        let key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| VerifyError::Key(format!("invalid rsa public key pem: {}", e)))?;

        Ok(Self {
            keys: KeySource::Static(key),
            issuer: issuer.into(),
            audience,
            leeway_seconds,
        })
    }

    pub fn with_jwks(
        jwks: JwksCache,
        issuer: impl Into<String>,
        audience: Option<String>,
        leeway_seconds: u64,
    ) -> Self {
        Self {
            keys: KeySource::Jwks(jwks),
            issuer: issuer.into(),
            audience,
            leeway_seconds,
        }
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = self.leeway_seconds;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        validation
    }
}

#[async_trait]
impl TokenVerifier for ClerkVerifier {
    async fn verify(&self, token: &str) -> Result<IdentityPayload, VerifyError> {
        let header = decode_header(token).map_err(|_| VerifyError::Malformed)?;

        let data = match &self.keys {
            KeySource::Static(key) => {
                decode::<IdentityPayload>(token, key, &self.validation(Algorithm::RS256))?
            }
            KeySource::Jwks(jwks) => {
                let (key, algorithm) = jwks.decoding_key(header.kid.as_deref()).await?;
                decode::<IdentityPayload>(token, &key, &self.validation(algorithm))?
            }
        };

        Ok(data.claims)
    }
}
