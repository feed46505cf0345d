use crate::server::{
    Result, ServerError, ServerRouter, ServerState, auth::AuthenticatedIdentity, json::Json,
    query::Query,
};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use blogsite_common::{
    model::{
        Id,
        ack::{InsertAck, UpdateAck},
        post::{NewPost, Post, PostContent, PostFilter, PostMarker},
    },
    ranking::{RankedPost, TOP_POSTS_LIMIT, rank_by_word_count},
};
use blogsite_db::store::Store;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// How many posts the unfiltered listing returns.
const RECENT_POSTS_LIMIT: usize = 6;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_post(create_post)
        .typed_get(list_recent_posts)
        .typed_get(get_post)
        .typed_put(update_post)
        .typed_get(search_posts)
        .typed_get(top_posts)
}

#[derive(TypedPath, Debug)]
#[typed_path("/blogs")]
struct BlogsPath;

#[derive(TypedPath, Deserialize, Debug)]
#[typed_path("/blogs/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

/// The id stays raw here so that a missing credential is reported before a malformed id.
#[derive(TypedPath, Deserialize, Debug)]
#[typed_path("/blogs/{id}", rejection(ServerError))]
struct UpdatePostPath {
    id: String,
}

#[derive(TypedPath, Debug)]
#[typed_path("/allBlogs")]
struct AllBlogsPath;

#[derive(TypedPath, Debug)]
#[typed_path("/topBlogs")]
struct TopBlogsPath;

#[derive(Clone, Eq, PartialEq, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuery {
    search_params: Option<String>,
    category: Option<String>,
}

#[axum::debug_handler(state = ServerState)]
async fn create_post(
    _: BlogsPath,
    State(store): State<Arc<dyn Store>>,
    identity: AuthenticatedIdentity,
    Json(content): Json<PostContent>,
) -> Result<Json<InsertAck<PostMarker>>> {
    let post = NewPost::new(identity.into_email(), content);
    let ack = store.insert_post(&post).await?;

    info!(post_id = %ack.inserted_id, owner = %post.owner, "Created post");

    Ok(Json(ack))
}

#[axum::debug_handler(state = ServerState)]
async fn list_recent_posts(
    _: BlogsPath,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Vec<Post>>> {
    let posts = store
        .fetch_posts(&PostFilter::default(), Some(RECENT_POSTS_LIMIT))
        .await?;

    Ok(Json(posts))
}

/// Answers `null` for an id that names no post.
#[axum::debug_handler(state = ServerState)]
async fn get_post(
    PostPath { id }: PostPath,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Option<Post>>> {
    Ok(Json(store.fetch_post(id).await?))
}

/// Replaces a post the caller owns, or creates it under the given id if there is none.
#[axum::debug_handler(state = ServerState)]
async fn update_post(
    UpdatePostPath { id }: UpdatePostPath,
    State(store): State<Arc<dyn Store>>,
    identity: AuthenticatedIdentity,
    Json(content): Json<PostContent>,
) -> Result<Json<UpdateAck<PostMarker>>> {
    let id: Id<PostMarker> = id.parse()?;

    // Not atomic with the replace below; a concurrent upsert of the same id can slip between.
    if let Some(existing) = store.fetch_post(id).await? {
        identity.ensure_owns(&existing)?;
    }

    let post = NewPost::new(identity.into_email(), content);
    let ack = store.replace_post(id, &post).await?;

    info!(
        post_id = %id,
        owner = %post.owner,
        upserted = ack.upserted_count,
        modified = ack.modified_count,
        "Updated post"
    );

    Ok(Json(ack))
}

#[axum::debug_handler(state = ServerState)]
async fn search_posts(
    _: AllBlogsPath,
    State(store): State<Arc<dyn Store>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Post>>> {
    let filter = PostFilter::new(query.search_params, query.category);
    let posts = store.fetch_posts(&filter, None).await?;

    Ok(Json(posts))
}

#[axum::debug_handler(state = ServerState)]
async fn top_posts(
    _: TopBlogsPath,
    State(store): State<Arc<dyn Store>>,
) -> Result<Json<Vec<RankedPost>>> {
    let posts = store.fetch_posts(&PostFilter::default(), None).await?;

    Ok(Json(rank_by_word_count(posts, TOP_POSTS_LIMIT)))
}
