use crate::{
    identity::{CredentialError, TokenVerifier, VerifyError},
    server::{self, ServerState},
};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
};
use blogsite_common::model::{
    Id,
    ack::{InsertAck, UpdateAck},
    auth::Identity,
    comment::{Comment, CommentMarker, NewComment},
    post::{NewPost, Post, PostFilter, PostMarker},
    user::Email,
    wishlist::{NewWishlistEntry, WishlistEntry, WishlistMarker},
};
use blogsite_db::{
    memory::MemoryStore,
    store::{self, DbError, Store},
};
use jsonwebtoken::errors::ErrorKind;
use serde_json::Value;
use std::{io, sync::Arc, time::Duration};
use tower::ServiceExt;

pub const ALICE: &str = "alice@x.com";
pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB: &str = "bob@x.com";
pub const BOB_TOKEN: &str = "bob-token";

/// Knows two fixed tokens, one for [`ALICE`] and one for [`BOB`].
#[derive(Debug, Default)]
pub struct StaticVerifier;

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let (uid, email) = match token {
            ALICE_TOKEN => ("alice", ALICE),
            BOB_TOKEN => ("bob", BOB),
            _ => return Err(CredentialError::Jwt(ErrorKind::InvalidToken.into()).into()),
        };

        Ok(Identity {
            uid: uid.to_owned(),
            email: Email::new(email.to_owned()).unwrap(),
        })
    }
}

/// A store whose every operation fails the same way.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FailingStore {
    TimingOut,
    Unreachable,
}

impl FailingStore {
    fn error(self) -> DbError {
        match self {
            FailingStore::TimingOut => DbError::Timeout(Duration::from_secs(5)),
            FailingStore::Unreachable => {
                DbError::Mongo(io::Error::from(io::ErrorKind::ConnectionRefused).into())
            }
        }
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn insert_post(&self, _: &NewPost) -> store::Result<InsertAck<PostMarker>> {
        Err(self.error())
    }

    async fn fetch_posts(&self, _: &PostFilter, _: Option<usize>) -> store::Result<Vec<Post>> {
        Err(self.error())
    }

    async fn fetch_post(&self, _: Id<PostMarker>) -> store::Result<Option<Post>> {
        Err(self.error())
    }

    async fn replace_post(
        &self,
        _: Id<PostMarker>,
        _: &NewPost,
    ) -> store::Result<UpdateAck<PostMarker>> {
        Err(self.error())
    }

    async fn insert_wishlist_entry(
        &self,
        _: &NewWishlistEntry,
    ) -> store::Result<InsertAck<WishlistMarker>> {
        Err(self.error())
    }

    async fn fetch_wishlist(&self, _: &Email) -> store::Result<Vec<WishlistEntry>> {
        Err(self.error())
    }

    async fn insert_comment(&self, _: &NewComment) -> store::Result<InsertAck<CommentMarker>> {
        Err(self.error())
    }

    async fn fetch_comments(&self, _: Id<PostMarker>) -> store::Result<Vec<Comment>> {
        Err(self.error())
    }
}

/// The full router over a store, a fresh [`MemoryStore`] unless given one.
pub struct TestApp<S = MemoryStore> {
    pub store: Arc<S>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl<S: Store + 'static> TestApp<S> {
    pub fn with_store(store: S) -> Self {
        let store = Arc::new(store);
        let state = ServerState {
            store: store.clone(),
            verifier: Arc::new(StaticVerifier),
        };

        Self {
            store,
            router: server::routes().with_state(state),
        }
    }

    /// Sends one request. Bodies that are not JSON come back as a JSON string.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }
}
