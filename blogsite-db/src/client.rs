use crate::{
    record::{CommentRecord, PostRecord, WishlistRecord, decode_all},
    store::{DbError, Result, Store},
};
use async_trait::async_trait;
use blogsite_common::model::{
    Id,
    ack::{InsertAck, UpdateAck},
    comment::{Comment, CommentMarker, NewComment},
    post::{NewPost, Post, PostFilter, PostMarker},
    user::Email,
    wishlist::{NewWishlistEntry, WishlistEntry, WishlistMarker},
};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc, to_document},
    options::ClientOptions,
    results::InsertOneResult,
};
use std::{future::IntoFuture, time::Duration};
use tracing::debug;

pub const POSTS_COLLECTION: &str = "blogs";
pub const WISHLIST_COLLECTION: &str = "wishlist";
pub const COMMENTS_COLLECTION: &str = "comments";

/// The MongoDB-backed store. One instance is shared by every request.
#[derive(Clone, Debug)]
pub struct DbClient {
    database: Database,
    timeout: Duration,
}

impl DbClient {
    /// Parses `uri` and prepares a client. The driver connects lazily on first use.
    pub async fn connect(uri: &str, database: &str, timeout: Duration) -> Result<Self> {
        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_owned());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)?;

        Ok(Self {
            database: client.database(database),
            timeout,
        })
    }

    pub async fn ping(&self) -> Result<()> {
        self.timed(async {
            self.database.run_command(doc! { "ping": 1 }).await?;
            Ok(())
        })
        .await
    }

    async fn timed<T>(
        &self,
        operation: impl IntoFuture<Output = mongodb::error::Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| DbError::Timeout(self.timeout))?
            .map_err(DbError::from)
    }

    fn posts(&self) -> Collection<PostRecord> {
        self.database.collection(POSTS_COLLECTION)
    }

    fn documents(&self, collection: &str) -> Collection<Document> {
        self.database.collection(collection)
    }

    async fn find_documents(
        &self,
        collection: &str,
        filter: Document,
        limit: Option<usize>,
    ) -> Result<Vec<Document>> {
        self.timed(async {
            let documents = self.documents(collection);
            let mut find = documents.find(filter);
            if let Some(limit) = limit {
                find = find.limit(i64::try_from(limit).unwrap_or(i64::MAX));
            }
            find.await?.try_collect().await
        })
        .await
    }

    async fn insert<Marker>(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<InsertAck<Marker>> {
        let InsertOneResult { inserted_id, .. } = self
            .timed(self.documents(collection).insert_one(document))
            .await?;

        let inserted_id = inserted_id.as_object_id().ok_or(DbError::UnexpectedId)?;
        debug!(collection, %inserted_id, "Inserted document");

        Ok(InsertAck::new(inserted_id.into()))
    }
}

fn post_document(post: &NewPost) -> Result<Document> {
    let mut document = to_document(&post.content)?;
    document.insert("email", post.owner.get());
    Ok(document)
}

fn post_filter_document(filter: &PostFilter) -> Document {
    let mut document = Document::new();
    if let Some(title) = &filter.title_contains {
        let pattern = regex::escape(title);
        document.insert("title", doc! { "$regex": pattern, "$options": "i" });
    }
    if let Some(category) = &filter.category {
        document.insert("category", category.as_str());
    }
    document
}

#[async_trait]
impl Store for DbClient {
    async fn insert_post(&self, post: &NewPost) -> Result<InsertAck<PostMarker>> {
        self.insert(POSTS_COLLECTION, post_document(post)?).await
    }

    async fn fetch_posts(&self, filter: &PostFilter, limit: Option<usize>) -> Result<Vec<Post>> {
        let documents = self
            .find_documents(POSTS_COLLECTION, post_filter_document(filter), limit)
            .await?;

        Ok(decode_all::<PostRecord, Post>(POSTS_COLLECTION, documents))
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = self
            .timed(self.posts().find_one(doc! { "_id": post_id.object_id() }))
            .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    async fn replace_post(
        &self,
        post_id: Id<PostMarker>,
        post: &NewPost,
    ) -> Result<UpdateAck<PostMarker>> {
        let result = self
            .timed(
                self.documents(POSTS_COLLECTION)
                    .replace_one(doc! { "_id": post_id.object_id() }, post_document(post)?)
                    .upsert(true),
            )
            .await?;

        let upserted_id = result
            .upserted_id
            .map(|id| id.as_object_id().ok_or(DbError::UnexpectedId))
            .transpose()?;

        Ok(UpdateAck {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(upserted_id.is_some()),
            upserted_id: upserted_id.map(Id::from),
        })
    }

    async fn insert_wishlist_entry(
        &self,
        entry: &NewWishlistEntry,
    ) -> Result<InsertAck<WishlistMarker>> {
        let mut document = to_document(&entry.extra)?;
        document.insert("blogId", entry.blog_id.to_string());
        document.insert("userEmail", entry.user_email.get());

        self.insert(WISHLIST_COLLECTION, document).await
    }

    async fn fetch_wishlist(&self, user_email: &Email) -> Result<Vec<WishlistEntry>> {
        let documents = self
            .find_documents(
                WISHLIST_COLLECTION,
                doc! { "userEmail": user_email.get() },
                None,
            )
            .await?;

        Ok(decode_all::<WishlistRecord, WishlistEntry>(
            WISHLIST_COLLECTION,
            documents,
        ))
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<InsertAck<CommentMarker>> {
        let mut document = to_document(&comment.content)?;
        document.insert("blogId", comment.blog_id.to_string());

        self.insert(COMMENTS_COLLECTION, document).await
    }

    async fn fetch_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<Comment>> {
        let documents = self
            .find_documents(
                COMMENTS_COLLECTION,
                doc! { "blogId": post_id.to_string() },
                None,
            )
            .await?;

        Ok(decode_all::<CommentRecord, Comment>(
            COMMENTS_COLLECTION,
            documents,
        ))
    }
}
