use crate::server::{
    Result, ServerError, ServerRouter, ServerState, auth::AuthenticatedIdentity,
    compose::compose_wishlist, json::Json,
};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use blogsite_common::model::{
    Id,
    ack::InsertAck,
    post::PostMarker,
    wishlist::{NewWishlistEntry, WishlistContent, WishlistEntry, WishlistMarker},
};
use blogsite_db::store::Store;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_post(create_wishlist_entry)
        .typed_get(my_wishlist)
}

#[derive(TypedPath, Deserialize, Debug)]
#[typed_path("/wishlist/{blog_id}", rejection(ServerError))]
struct WishlistPath {
    blog_id: Id<PostMarker>,
}

#[derive(TypedPath, Deserialize, Debug)]
#[typed_path("/myWishlist/{email}", rejection(ServerError))]
struct MyWishlistPath {
    email: String,
}

/// Open to anonymous callers. An authenticated caller always saves to their own list.
#[axum::debug_handler(state = ServerState)]
async fn create_wishlist_entry(
    WishlistPath { blog_id }: WishlistPath,
    State(store): State<Arc<dyn Store>>,
    identity: Option<AuthenticatedIdentity>,
    Json(content): Json<WishlistContent>,
) -> Result<Json<InsertAck<WishlistMarker>>> {
    let user_email = match identity {
        Some(identity) => identity.into_email(),
        None => content.user_email.ok_or(ServerError::MissingWishlistOwner)?,
    };

    let entry = NewWishlistEntry::new(blog_id, user_email, content.extra);
    let ack = store.insert_wishlist_entry(&entry).await?;

    info!(
        entry_id = %ack.inserted_id,
        %blog_id,
        user_email = %entry.user_email,
        "Created wishlist entry"
    );

    Ok(Json(ack))
}

#[axum::debug_handler(state = ServerState)]
async fn my_wishlist(
    MyWishlistPath { email }: MyWishlistPath,
    State(store): State<Arc<dyn Store>>,
    identity: AuthenticatedIdentity,
) -> Result<Json<Vec<WishlistEntry>>> {
    identity.ensure_is(&email)?;

    let entries = store.fetch_wishlist(identity.email()).await?;
    let entries = compose_wishlist(store.as_ref(), entries).await?;

    Ok(Json(entries))
}
