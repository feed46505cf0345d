use crate::store::{Result, Store};
use async_trait::async_trait;
use blogsite_common::model::{
    Id,
    ack::{InsertAck, UpdateAck},
    comment::{Comment, CommentMarker, NewComment},
    post::{NewPost, Post, PostFilter, PostMarker},
    user::Email,
    wishlist::{NewWishlistEntry, WishlistEntry, WishlistMarker},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// A store held in process memory, in insertion order. Used for tests and local runs.
///
/// Counts the operations it serves so callers can check that a request never reached it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: RwLock<Vec<Post>>,
    wishlist: RwLock<Vec<WishlistEntry>>,
    comments: RwLock<Vec<Comment>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn count_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn count_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_post(&self, post: &NewPost) -> Result<InsertAck<PostMarker>> {
        self.count_write();
        let id = Id::generate();
        self.posts.write().await.push(post.clone().into_post(id));

        Ok(InsertAck::new(id))
    }

    async fn fetch_posts(&self, filter: &PostFilter, limit: Option<usize>) -> Result<Vec<Post>> {
        self.count_read();
        let posts = self
            .posts
            .read()
            .await
            .iter()
            .filter(|post| filter.matches(post))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(posts)
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        self.count_read();
        let post = self
            .posts
            .read()
            .await
            .iter()
            .find(|post| post.id == post_id)
            .cloned();

        Ok(post)
    }

    async fn replace_post(
        &self,
        post_id: Id<PostMarker>,
        post: &NewPost,
    ) -> Result<UpdateAck<PostMarker>> {
        self.count_write();
        let replacement = post.clone().into_post(post_id);
        let mut posts = self.posts.write().await;

        let ack = match posts.iter_mut().find(|post| post.id == post_id) {
            Some(existing) => {
                let modified = *existing != replacement;
                *existing = replacement;
                UpdateAck::replaced(modified)
            }
            None => {
                posts.push(replacement);
                UpdateAck::upserted(post_id)
            }
        };

        Ok(ack)
    }

    async fn insert_wishlist_entry(
        &self,
        entry: &NewWishlistEntry,
    ) -> Result<InsertAck<WishlistMarker>> {
        self.count_write();
        let id = Id::generate();
        self.wishlist.write().await.push(entry.clone().into_entry(id));

        Ok(InsertAck::new(id))
    }

    async fn fetch_wishlist(&self, user_email: &Email) -> Result<Vec<WishlistEntry>> {
        self.count_read();
        let entries = self
            .wishlist
            .read()
            .await
            .iter()
            .filter(|entry| entry.user_email == *user_email)
            .cloned()
            .collect();

        Ok(entries)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<InsertAck<CommentMarker>> {
        self.count_write();
        let id = Id::generate();
        self.comments.write().await.push(comment.clone().into_comment(id));

        Ok(InsertAck::new(id))
    }

    async fn fetch_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<Comment>> {
        self.count_read();
        let comments = self
            .comments
            .read()
            .await
            .iter()
            .filter(|comment| comment.blog_id == post_id)
            .cloned()
            .collect();

        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogsite_common::model::post::PostContent;

    fn new_post(title: &str) -> NewPost {
        NewPost::new(
            Email::new("a@x.com".to_owned()).unwrap(),
            PostContent {
                title: Some(title.to_owned()),
                ..PostContent::default()
            },
        )
    }

    #[tokio::test]
    async fn replace_upserts_under_the_given_id() {
        let store = MemoryStore::new();
        let id = Id::generate();

        let ack = store.replace_post(id, &new_post("A")).await.unwrap();
        assert_eq!(ack, UpdateAck::upserted(id));

        let ack = store.replace_post(id, &new_post("B")).await.unwrap();
        assert_eq!(ack, UpdateAck::replaced(true));

        let post = store.fetch_post(id).await.unwrap().unwrap();
        assert_eq!(post.content.title.as_deref(), Some("B"));
        assert_eq!(store.fetch_posts(&PostFilter::default(), None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fetch_posts_keeps_insertion_order_and_limit() {
        let store = MemoryStore::new();
        for title in ["1", "2", "3"] {
            store.insert_post(&new_post(title)).await.unwrap();
        }

        let posts = store
            .fetch_posts(&PostFilter::default(), Some(2))
            .await
            .unwrap();

        let titles: Vec<_> = posts
            .iter()
            .map(|post| post.content.title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, ["1", "2"]);
        assert_eq!(store.writes(), 3);
        assert_eq!(store.reads(), 1);
    }
}
