use crate::model::{ExtraFields, Id, strip_reserved, user::Email};
use serde::{Deserialize, Serialize};

/// Keys a client may not set on a post body.
pub const RESERVED_POST_FIELDS: [&str; 3] = ["_id", "email", "wordCount"];

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Id<PostMarker>,
    /// The owner. Absent only on documents written before ownership was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(flatten)]
    pub content: PostContent,
}

/// Everything about a post the client writes.
#[derive(Clone, PartialEq, Debug, Default, Deserialize, Serialize)]
pub struct PostContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The long-form body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A post about to be written. The owner always comes from the authenticated caller.
#[derive(Clone, PartialEq, Debug)]
pub struct NewPost {
    pub owner: Email,
    pub content: PostContent,
}

impl NewPost {
    #[must_use]
    pub fn new(owner: Email, mut content: PostContent) -> Self {
        strip_reserved(&mut content.extra, &RESERVED_POST_FIELDS);
        Self { owner, content }
    }

    #[must_use]
    pub fn into_post(self, id: Id<PostMarker>) -> Post {
        Post {
            id,
            email: Some(self.owner),
            content: self.content,
        }
    }
}

/// Optional constraints for listing posts, ANDed together.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostFilter {
    /// Case-insensitive substring of the title, matched literally.
    pub title_contains: Option<String>,
    /// Exact category.
    pub category: Option<String>,
}

impl PostFilter {
    /// Builds a filter from raw query values; empty strings impose no constraint.
    #[must_use]
    pub fn new(title_contains: Option<String>, category: Option<String>) -> Self {
        Self {
            title_contains: title_contains.filter(|s| !s.is_empty()),
            category: category.filter(|s| !s.is_empty()),
        }
    }

    #[must_use]
    pub fn matches(&self, post: &Post) -> bool {
        let title_matches = self.title_contains.as_deref().is_none_or(|needle| {
            post.content
                .title
                .as_deref()
                .is_some_and(|title| title.to_lowercase().contains(&needle.to_lowercase()))
        });
        let category_matches = self
            .category
            .as_deref()
            .is_none_or(|category| post.content.category.as_deref() == Some(category));

        title_matches && category_matches
    }
}
