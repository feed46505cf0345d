use async_trait::async_trait;
use blogsite_common::model::auth::{Identity, IdentityClaimsError};
use jsonwebtoken::Algorithm;
use reqwest::StatusCode;
use thiserror::Error;

pub mod firebase;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Token could not be decoded or validated: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Token is signed with {0:?}, expected RS256")]
    Algorithm(Algorithm),
    #[error("Token header names no signing key")]
    MissingKeyId,
    #[error("No signing key with id {0:?}")]
    UnknownKeyId(String),
    #[error("Token was issued in the future")]
    IssuedInFuture,
    #[error(transparent)]
    Claims(#[from] IdentityClaimsError),
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Credential rejected: {0}")]
    InvalidCredential(#[from] CredentialError),
    #[error("Fetching signing keys failed: {0}")]
    KeyFetch(reqwest::Error),
    #[error("Signing key endpoint answered {0}")]
    KeyFetchStatus(StatusCode),
    #[error("Signing key endpoint did not answer in time")]
    Timeout,
}

impl From<reqwest::Error> for VerifyError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Timeout
        } else {
            Self::KeyFetch(value)
        }
    }
}

/// Turns the credential of a bearer header into the identity it was issued to.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError>;
}
