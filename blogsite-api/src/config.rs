use base64::{Engine, prelude::BASE64_STANDARD};
use serde::Deserialize;
use std::{
    fmt::{Debug, Formatter},
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Set MONGODB_URI, or all of DB_USER, DB_PASSWORD and DB_HOST")]
    MissingStoreCredentials,
    #[error("FB_SERVICE_KEY is not valid base64: {0}")]
    ServiceKeyEncoding(#[from] base64::DecodeError),
    #[error("FB_SERVICE_KEY does not hold a service account: {0}")]
    ServiceKeyJson(#[from] serde_json::Error),
}

/// Process configuration, read from the environment.
#[derive(Clone, Eq, PartialEq, Hash, Deserialize)]
pub struct Env {
    #[serde(default = "default_server_address")]
    pub server_address: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    pub mongodb_uri: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_host: Option<String>,
    #[serde(default = "default_db_name")]
    pub db_name: String,
    /// Base64 of the identity provider's service account JSON.
    pub fb_service_key: String,
    #[serde(default = "default_timeout_ms")]
    pub store_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub identity_timeout_ms: u64,
}

fn default_server_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

fn default_db_name() -> String {
    "blog-website".to_owned()
}

fn default_timeout_ms() -> u64 {
    5000
}

#[derive(Deserialize)]
struct ServiceAccount {
    project_id: String,
}

impl Env {
    pub fn mongodb_uri(&self) -> Result<String, ConfigError> {
        if let Some(uri) = &self.mongodb_uri {
            return Ok(uri.clone());
        }

        let (Some(user), Some(password), Some(host)) =
            (&self.db_user, &self.db_password, &self.db_host)
        else {
            return Err(ConfigError::MissingStoreCredentials);
        };

        Ok(format!(
            "mongodb+srv://{}:{}@{host}/?retryWrites=true&w=majority",
            urlencoding::encode(user),
            urlencoding::encode(password),
        ))
    }

    /// The project the identity provider issues tokens for.
    pub fn project_id(&self) -> Result<String, ConfigError> {
        let decoded = BASE64_STANDARD.decode(self.fb_service_key.trim())?;
        let service_account: ServiceAccount = serde_json::from_slice(&decoded)?;
        Ok(service_account.project_id)
    }

    #[must_use]
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    #[must_use]
    pub fn identity_timeout(&self) -> Duration {
        Duration::from_millis(self.identity_timeout_ms)
    }
}

impl Debug for Env {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("server_address", &self.server_address)
            .field("port", &self.port)
            .field("mongodb_uri", &self.mongodb_uri.as_ref().map(|_| "[redacted]"))
            .field("db_user", &self.db_user)
            .field("db_password", &self.db_password.as_ref().map(|_| "[redacted]"))
            .field("db_host", &self.db_host)
            .field("db_name", &self.db_name)
            .field("fb_service_key", &"[redacted]")
            .field("store_timeout_ms", &self.store_timeout_ms)
            .field("identity_timeout_ms", &self.identity_timeout_ms)
            .finish()
    }
}
