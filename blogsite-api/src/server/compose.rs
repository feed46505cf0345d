use blogsite_common::model::wishlist::WishlistEntry;
use blogsite_db::store::{DbError, Store};
use futures::{StreamExt, TryStreamExt, stream};
use tracing::debug;

/// Post lookups in flight at once while composing a wishlist.
const COMPOSE_CONCURRENCY: usize = 8;

/// Copies the display fields of each referenced post onto its wishlist entry.
///
/// Entries keep their order. An entry whose post no longer exists is returned as stored.
pub async fn compose_wishlist(
    store: &dyn Store,
    entries: Vec<WishlistEntry>,
) -> Result<Vec<WishlistEntry>, DbError> {
    stream::iter(entries)
        .map(|mut entry| async move {
            match store.fetch_post(entry.blog_id).await? {
                Some(post) => entry.enrich(&post.content),
                None => debug!(
                    entry_id = %entry.id,
                    blog_id = %entry.blog_id,
                    "Wishlist entry references a missing post"
                ),
            }
            Ok::<_, DbError>(entry)
        })
        .buffered(COMPOSE_CONCURRENCY)
        .try_collect()
        .await
}
