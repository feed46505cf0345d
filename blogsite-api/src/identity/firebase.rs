//! Verification of Firebase Authentication ID tokens.
//!
//! See <https://firebase.google.com/docs/auth/admin/verify-id-tokens#verify_id_tokens_using_a_third-party_jwt_library>

use crate::identity::{CredentialError, TokenVerifier, VerifyError};
use async_trait::async_trait;
use blogsite_common::model::auth::{IdTokenClaims, Identity};
use headers::{CacheControl, HeaderMapExt};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header, jwk::JwkSet};
use time::{Duration, UtcDateTime};
use tokio::sync::RwLock;
use tracing::debug;

pub const FIREBASE_KEYS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
pub const DEFAULT_KEY_TTL: Duration = Duration::hours(1);
pub const ISSUED_AT_LEEWAY: Duration = Duration::seconds(60);
/// An unknown `kid` triggers no fetch if the keys are younger than this.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::seconds(60);

enum KeySource {
    Remote { http: reqwest::Client, url: String },
    Fixed,
}

struct CachedKeys {
    keys: JwkSet,
    /// `None` for keys that were never fetched.
    fetched_at: Option<UtcDateTime>,
    /// `None` for keys that never go stale.
    expires_at: Option<UtcDateTime>,
}

impl CachedKeys {
    fn is_fresh(&self) -> bool {
        self.expires_at
            .is_none_or(|expires_at| UtcDateTime::now() < expires_at)
    }

    fn fetched_recently(&self) -> bool {
        self.is_fresh()
            && self
                .fetched_at
                .is_some_and(|fetched_at| UtcDateTime::now() < fetched_at + MIN_REFRESH_INTERVAL)
    }

    fn key(&self, kid: &str) -> Result<Option<DecodingKey>, CredentialError> {
        self.keys
            .find(kid)
            .map(DecodingKey::from_jwk)
            .transpose()
            .map_err(CredentialError::from)
    }
}

pub struct FirebaseVerifier {
    project_id: String,
    source: KeySource,
    keys: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    /// A verifier for tokens of `project_id`, fetching keys from Google.
    pub fn new(project_id: String, timeout: std::time::Duration) -> Result<Self, reqwest::Error> {
        Self::with_keys_url(project_id, FIREBASE_KEYS_URL.to_owned(), timeout)
    }

    pub fn with_keys_url(
        project_id: String,
        url: String,
        timeout: std::time::Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            project_id,
            source: KeySource::Remote { http, url },
            keys: RwLock::new(None),
        })
    }

    /// A verifier that only ever trusts `keys`.
    #[must_use]
    pub fn with_fixed_keys(project_id: String, keys: JwkSet) -> Self {
        Self {
            project_id,
            source: KeySource::Fixed,
            keys: RwLock::new(Some(CachedKeys {
                keys,
                fetched_at: None,
                expires_at: None,
            })),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{}", self.project_id)]);
        validation.set_required_spec_claims(&["exp", "iat", "aud", "iss", "sub"]);
        validation
    }

    async fn cached_key(&self, kid: &str) -> Result<Option<DecodingKey>, CredentialError> {
        match self.keys.read().await.as_ref() {
            Some(cached) if cached.is_fresh() => cached.key(kid),
            _ => Ok(None),
        }
    }

    /// Looks `kid` up in the cache, refreshing it at most once per [`MIN_REFRESH_INTERVAL`].
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, VerifyError> {
        if let Some(key) = self.cached_key(kid).await? {
            return Ok(key);
        }

        let KeySource::Remote { http, url } = &self.source else {
            return Err(CredentialError::UnknownKeyId(kid.to_owned()).into());
        };

        // Held across the fetch so that concurrent misses wait for one refresh.
        let mut keys = self.keys.write().await;
        if !keys.as_ref().is_some_and(CachedKeys::fetched_recently) {
            *keys = Some(fetch_keys(http, url).await?);
        }

        keys.as_ref()
            .map(|cached| cached.key(kid))
            .transpose()?
            .flatten()
            .ok_or_else(|| CredentialError::UnknownKeyId(kid.to_owned()).into())
    }
}

async fn fetch_keys(http: &reqwest::Client, url: &str) -> Result<CachedKeys, VerifyError> {
    let response = http.get(url).send().await?;
    if !response.status().is_success() {
        return Err(VerifyError::KeyFetchStatus(response.status()));
    }

    let ttl = response
        .headers()
        .typed_get::<CacheControl>()
        .and_then(|cache_control| cache_control.max_age())
        .and_then(|max_age| Duration::try_from(max_age).ok())
        .unwrap_or(DEFAULT_KEY_TTL);
    let keys: JwkSet = response.json().await?;

    debug!(count = keys.keys.len(), %ttl, "Refreshed identity provider signing keys");

    let now = UtcDateTime::now();
    Ok(CachedKeys {
        keys,
        fetched_at: Some(now),
        expires_at: Some(now + ttl),
    })
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let header = decode_header(token).map_err(CredentialError::from)?;
        if header.alg != Algorithm::RS256 {
            return Err(CredentialError::Algorithm(header.alg).into());
        }
        let kid = header.kid.ok_or(CredentialError::MissingKeyId)?;

        let key = self.decoding_key(&kid).await?;
        let claims = decode::<IdTokenClaims>(token, &key, &self.validation())
            .map_err(CredentialError::from)?
            .claims;

        if claims.iat > (UtcDateTime::now() + ISSUED_AT_LEEWAY).unix_timestamp() {
            return Err(CredentialError::IssuedInFuture.into());
        }

        Identity::try_from(claims).map_err(|err| CredentialError::from(err).into())
    }
}
