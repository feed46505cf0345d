use crate::server::{Result, ServerError, ServerRouter, ServerState, json::Json};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use blogsite_common::model::{
    Id,
    ack::InsertAck,
    comment::{Comment, CommentContent, CommentMarker, NewComment},
    post::PostMarker,
};
use blogsite_db::store::Store;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_post(create_comment)
        .typed_get(list_comments)
}

#[derive(TypedPath, Deserialize, Debug)]
#[typed_path("/comments/{blog_id}", rejection(ServerError))]
struct CommentsPath {
    blog_id: Id<PostMarker>,
}

#[axum::debug_handler(state = ServerState)]
async fn create_comment(
    CommentsPath { blog_id }: CommentsPath,
    State(store): State<Arc<dyn Store>>,
    Json(content): Json<CommentContent>,
) -> Result<Json<InsertAck<CommentMarker>>> {
    let ack = store
        .insert_comment(&NewComment::new(blog_id, content))
        .await?;

    info!(comment_id = %ack.inserted_id, %blog_id, "Created comment");

    Ok(Json(ack))
}

#[axum::debug_handler(state = ServerState)]
async fn list_comments(
    CommentsPath { blog_id }: CommentsPath,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Vec<Comment>>> {
    Ok(Json(store.fetch_comments(blog_id).await?))
}
