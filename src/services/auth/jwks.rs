//! Clerk JWKS fetching and caching.
//!
//! Keys come from `GET {CLERK_API_URL}/v1/jwks` authorised with the secret key.
//! - Keys are cached for a configurable TTL.
//! - An unknown `kid` forces a refetch (key rotation), at most once per
//!   `MIN_REFETCH_INTERVAL`; inside that window the cached set answers.
//! - Concurrent refreshes are collapsed into one upstream request.
//! - If a refetch fails, the stale set keeps being used.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::{Mutex, RwLock};
use url::Url;

use crate::services::auth::verifier::VerifyError;

const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Default)]
struct CacheState {
    // keys + time of the last successful fetch (TTL)
    keys: Option<(JwkSet, Instant)>,
    // last upstream attempt, successful or not (refetch interval)
    attempted_at: Option<Instant>,
}

#[derive(Clone)]
pub struct JwksCache {
    jwks_url: Url,
    secret_key: String,
    cache_ttl: Duration,
    min_refetch_interval: Duration,
    cache: Arc<RwLock<CacheState>>,
    refresh: Arc<Mutex<()>>,
    client: reqwest::Client,
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the secret key
        f.debug_struct("JwksCache")
            .field("jwks_url", &self.jwks_url.as_str())
            .field("cache_ttl", &self.cache_ttl)
            .field("min_refetch_interval", &self.min_refetch_interval)
            .finish()
    }
}

impl JwksCache {
    pub fn new(
        api_url: &Url,
        secret_key: impl Into<String>,
        cache_ttl: Duration,
    ) -> Result<Self, VerifyError> {
        let jwks_url = api_url
            .join("v1/jwks")
            .map_err(|e| VerifyError::Key(format!("invalid jwks url: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| VerifyError::Key(format!("http client: {}", e)))?;

        Ok(Self {
            jwks_url,
            secret_key: secret_key.into(),
            cache_ttl,
            min_refetch_interval: MIN_REFETCH_INTERVAL,
            cache: Arc::new(RwLock::new(CacheState::default())),
            refresh: Arc::new(Mutex::new(())),
            client,
        })
    }

    pub fn jwks_url(&self) -> &Url {
        &self.jwks_url
    }

    /// Decoding key + algorithm for a token header's `kid` (any usable key when absent).
    pub async fn decoding_key(
        &self,
        kid: Option<&str>,
    ) -> Result<(DecodingKey, Algorithm), VerifyError> {
        let jwks = self.current(false).await?;
        match select_key(&jwks, kid) {
            Err(VerifyError::NoMatchingKey) if kid.is_some() => {
                let jwks = self.current(true).await?;
                select_key(&jwks, kid)
            }
            other => other,
        }
    }

    async fn current(&self, force: bool) -> Result<JwkSet, VerifyError> {
        if let Some(cached) = self.cached(force).await {
            return cached;
        }

        // one upstream request at a time; whoever waited re-checks the cache first
        let _refresh = self.refresh.lock().await;
        if let Some(cached) = self.cached(force).await {
            return cached;
        }

        let fetched = self.fetch().await;
        let now = Instant::now();
        let mut cache = self.cache.write().await;
        cache.attempted_at = Some(now);
        match fetched {
            Ok(jwks) => {
                cache.keys = Some((jwks.clone(), now));
                Ok(jwks)
            }
            Err(err) => match &cache.keys {
                Some((jwks, _)) => {
                    tracing::warn!(error = %err, "jwks refresh failed, using cached keys");
                    Ok(jwks.clone())
                }
                None => Err(err),
            },
        }
    }

    // Answer from the cache when no upstream request is due:
    // - within the refetch interval of the last attempt, whatever it returned
    // - otherwise, for normal lookups, while the keys are within their TTL
    async fn cached(&self, force: bool) -> Option<Result<JwkSet, VerifyError>> {
        let cache = self.cache.read().await;

        let recently_attempted = cache
            .attempted_at
            .is_some_and(|at| at.elapsed() < self.min_refetch_interval);

        match &cache.keys {
            Some((jwks, fetched_at))
                if recently_attempted || (!force && fetched_at.elapsed() < self.cache_ttl) =>
            {
                Some(Ok(jwks.clone()))
            }
            None if recently_attempted => Some(Err(VerifyError::KeyFetch(
                "jwks unavailable, retrying later".to_string(),
            ))),
            _ => None,
        }
    }

    async fn fetch(&self) -> Result<JwkSet, VerifyError> {
        let response = self
            .client
            .get(self.jwks_url.clone())
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| VerifyError::KeyFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VerifyError::KeyFetch(format!(
                "HTTP {} from jwks endpoint",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| VerifyError::KeyFetch(e.to_string()))?;

        tracing::debug!(keys = jwks.keys.len(), "fetched clerk jwks");
        Ok(jwks)
    }

    #[cfg(test)]
    pub(crate) fn with_min_refetch_interval(mut self, interval: Duration) -> Self {
        self.min_refetch_interval = interval;
        self
    }

    #[cfg(test)]
    pub(crate) async fn prime(&self, jwks: JwkSet) {
        let now = Instant::now();
        let mut cache = self.cache.write().await;
        cache.keys = Some((jwks, now));
        cache.attempted_at = Some(now);
    }
}

fn select_key(jwks: &JwkSet, kid: Option<&str>) -> Result<(DecodingKey, Algorithm), VerifyError> {
    match kid {
        Some(kid) => {
            let jwk = jwks.find(kid).ok_or(VerifyError::NoMatchingKey)?;
            jwk_to_decoding_key(jwk)
        }
        None => jwks
            .keys
            .iter()
            .find_map(|jwk| jwk_to_decoding_key(jwk).ok())
            .ok_or(VerifyError::NoMatchingKey),
    }
}

fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), VerifyError> {
    let algorithm = match (&jwk.algorithm, jwk.common.key_algorithm.as_ref()) {
        (AlgorithmParameters::RSA(_), Some(KeyAlgorithm::RS384)) => Algorithm::RS384,
        (AlgorithmParameters::RSA(_), Some(KeyAlgorithm::RS512)) => Algorithm::RS512,
        (AlgorithmParameters::RSA(_), _) => Algorithm::RS256,
        (AlgorithmParameters::EllipticCurve(_), Some(KeyAlgorithm::ES384)) => Algorithm::ES384,
        (AlgorithmParameters::EllipticCurve(_), _) => Algorithm::ES256,
        (AlgorithmParameters::OctetKeyPair(_), _) => Algorithm::EdDSA,
        _ => return Err(VerifyError::Key("unsupported key type in jwks".to_string())),
    };

    let key = DecodingKey::from_jwk(jwk).map_err(|e| VerifyError::Key(e.to_string()))?;
    Ok((key, algorithm))
}
