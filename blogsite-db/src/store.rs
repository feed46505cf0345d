use async_trait::async_trait;
use blogsite_common::model::{
    Id,
    ack::{InsertAck, UpdateAck},
    comment::{Comment, CommentMarker, NewComment},
    post::{NewPost, Post, PostFilter, PostMarker},
    user::Email,
    wishlist::{NewWishlistEntry, WishlistEntry, WishlistMarker},
};
use crate::record::RecordError;
use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("A document in the store was invalid: {0}")]
    Data(#[from] RecordError),
    #[error("A document could not be encoded for the store: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),
    #[error("The store returned an id that is not an object id")]
    UnexpectedId,
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[error("Store operation did not finish within {0:?}")]
    Timeout(Duration),
}

/// The three collections the service works on. Every call is a single round trip with
/// no transaction spanning several of them.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_post(&self, post: &NewPost) -> Result<InsertAck<PostMarker>>;

    /// Posts matching `filter` in the store's natural order, at most `limit` if given.
    async fn fetch_posts(&self, filter: &PostFilter, limit: Option<usize>) -> Result<Vec<Post>>;

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>>;

    /// Replaces the whole post, creating it under `post_id` if there is none.
    async fn replace_post(
        &self,
        post_id: Id<PostMarker>,
        post: &NewPost,
    ) -> Result<UpdateAck<PostMarker>>;

    async fn insert_wishlist_entry(
        &self,
        entry: &NewWishlistEntry,
    ) -> Result<InsertAck<WishlistMarker>>;

    async fn fetch_wishlist(&self, user_email: &Email) -> Result<Vec<WishlistEntry>>;

    async fn insert_comment(&self, comment: &NewComment) -> Result<InsertAck<CommentMarker>>;

    async fn fetch_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<Comment>>;
}
