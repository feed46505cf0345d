use crate::{
    identity::TokenVerifier,
    server::{Result, ServerError},
};
use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::TypedHeader;
use blogsite_common::model::{auth::Identity, post::Post, user::Email};
use headers::{Authorization, authorization::Bearer};
use std::sync::Arc;
use tracing::debug;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// The caller, as proven by the bearer credential of the request.
///
/// Extracting this rejects requests without a valid credential. Extract
/// `Option<AuthenticatedIdentity>` where anonymous callers are allowed; a
/// credential that is present but invalid is still rejected there.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct AuthenticatedIdentity {
    identity: Identity,
}

impl AuthenticatedIdentity {
    #[must_use]
    pub fn email(&self) -> &Email {
        &self.identity.email
    }

    #[must_use]
    pub fn into_email(self) -> Email {
        self.identity.email
    }

    /// Requests naming another user's email are forbidden.
    pub fn ensure_is(&self, email: &str) -> Result<()> {
        if *self.email() == *email {
            Ok(())
        } else {
            Err(ServerError::NotOwner(email.to_owned()))
        }
    }

    /// Posts without a recorded owner belong to nobody.
    pub fn ensure_owns(&self, post: &Post) -> Result<()> {
        if post.email.as_ref() == Some(self.email()) {
            Ok(())
        } else {
            Err(ServerError::NotPostOwner(post.id))
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedIdentity
where
    Arc<dyn TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            <AuthorizationHeader as FromRequestParts<S>>::from_request_parts(parts, state)
                .await
                .map_err(ServerError::InvalidAuthorizationHeader)?;

        let identity = Arc::<dyn TokenVerifier>::from_ref(state)
            .verify(bearer.token())
            .await?;

        debug!(uid = %identity.uid, email = %identity.email, "Authenticated request");

        Ok(Self { identity })
    }
}

impl<S> OptionalFromRequestParts<S> for AuthenticatedIdentity
where
    Arc<dyn TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }

        <Self as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
