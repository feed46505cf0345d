use crate::identity::{TokenVerifier, VerifyError};
use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use blogsite_common::model::{Id, InvalidIdError, post::PostMarker};
use blogsite_db::store::{DbError, Store};
use json::Json;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

mod auth;
mod compose;
mod json;
mod query;
mod routes;
#[cfg(test)]
mod test_util;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub store: Arc<dyn Store>,
    pub verifier: Arc<dyn TokenVerifier>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Query rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authorization header was missing or not a bearer token: {0}")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error(transparent)]
    Verify(#[from] VerifyError),
    #[error("Caller may not access resources of {0:?}")]
    NotOwner(String),
    #[error("Caller does not own post {0}")]
    NotPostOwner(Id<PostMarker>),
    #[error(transparent)]
    InvalidId(#[from] InvalidIdError),
    #[error("Wishlist entry names no owner")]
    MissingWishlistOwner,
    #[error(transparent)]
    Database(#[from] DbError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidAuthorizationHeader(_)
            | ServerError::Verify(VerifyError::InvalidCredential(_)) => StatusCode::UNAUTHORIZED,
            ServerError::NotOwner(_) | ServerError::NotPostOwner(_) => StatusCode::FORBIDDEN,
            ServerError::PathRejection(_)
            | ServerError::QueryRejection(_)
            | ServerError::JsonRejection(_)
            | ServerError::InvalidId(_)
            | ServerError::MissingWishlistOwner
            | ServerError::Database(DbError::Encode(_)) => StatusCode::BAD_REQUEST,
            ServerError::Verify(VerifyError::KeyFetch(_) | VerifyError::KeyFetchStatus(_))
            | ServerError::Database(DbError::Mongo(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Verify(VerifyError::Timeout)
            | ServerError::Database(DbError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ServerError::JsonResponse(_)
            | ServerError::Database(DbError::Data(_) | DbError::UnexpectedId) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// The text a client sees. Details stay in the log.
fn public_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => "Unauthorized access",
        StatusCode::FORBIDDEN => "forbidden access",
        StatusCode::BAD_REQUEST => "Invalid request",
        StatusCode::NOT_FOUND => "Not found",
        StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable",
        StatusCode::GATEWAY_TIMEOUT => "Upstream service timed out",
        _ => "Internal server error",
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
struct ErrorResponse {
    status: u16,
    message: &'static str,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
            message: public_message(status),
        };
        (status, Json(error_response)).into_response()
    }
}
