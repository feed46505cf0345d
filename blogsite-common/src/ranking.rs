//! Ordering posts by the length of their body.

use crate::model::post::Post;
use serde::Serialize;

/// How many posts the featured list holds.
pub const TOP_POSTS_LIMIT: usize = 10;

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPost {
    #[serde(flatten)]
    pub post: Post,
    pub word_count: usize,
}

/// Number of whitespace-delimited tokens; a missing body counts as zero.
#[must_use]
pub fn word_count(body: Option<&str>) -> usize {
    body.map_or(0, |body| body.split_whitespace().count())
}

/// Sorts by descending word count and keeps the first `limit`.
///
/// The sort is stable, so posts with equal counts stay in the order they were given.
#[must_use]
pub fn rank_by_word_count(posts: Vec<Post>, limit: usize) -> Vec<RankedPost> {
    let mut ranked: Vec<RankedPost> = posts
        .into_iter()
        .map(|post| RankedPost {
            word_count: word_count(post.content.long.as_deref()),
            post,
        })
        .collect();

    ranked.sort_by(|a, b| b.word_count.cmp(&a.word_count));
    ranked.truncate(limit);
    ranked
}
