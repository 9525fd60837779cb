/// Factory: build the `TokenVerifier` from application `Config`.
///
/// A PEM key (`CLERK_JWT_KEY`) wins over JWKS because it needs no network.
use std::{sync::Arc, time::Duration};

use crate::config::ClerkConfig;
use crate::services::auth::{ClerkVerifier, JwksCache, TokenVerifier, VerifyError};

pub fn build_token_verifier(clerk: &ClerkConfig) -> Result<Arc<dyn TokenVerifier>, VerifyError> {
    if let Some(pem) = &clerk.jwt_key_pem {
        let verifier = ClerkVerifier::with_pem(
            pem,
            clerk.issuer.clone(),
            clerk.audience.clone(),
            clerk.leeway_seconds,
        )?;
        tracing::info!(issuer = %clerk.issuer, "verifying clerk tokens with static pem key");
        return Ok(Arc::new(verifier));
    }

    let secret_key = clerk
        .secret_key
        .as_deref()
        .ok_or_else(|| VerifyError::Key("no clerk key material configured".to_string()))?;

    let jwks = JwksCache::new(
        &clerk.api_url,
        secret_key,
        Duration::from_secs(clerk.jwks_cache_ttl_seconds),
    )?;
    tracing::info!(
        issuer = %clerk.issuer,
        jwks_url = %jwks.jwks_url(),
        "verifying clerk tokens with jwks"
    );

    Ok(Arc::new(ClerkVerifier::with_jwks(
        jwks,
        clerk.issuer.clone(),
        clerk.audience.clone(),
        clerk.leeway_seconds,
    )))
}
