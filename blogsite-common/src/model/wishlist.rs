use crate::model::{
    ExtraFields, Id,
    post::{PostContent, PostMarker},
    strip_reserved,
    user::Email,
};
use serde::{Deserialize, Serialize};

/// Keys a client may not set on a wishlist body. The last four are filled in from the post.
pub const RESERVED_WISHLIST_FIELDS: [&str; 7] = [
    "_id",
    "blogId",
    "userEmail",
    "title",
    "address",
    "category",
    "name",
];

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct WishlistMarker;

#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    #[serde(rename = "_id")]
    pub id: Id<WishlistMarker>,
    /// Not checked against the posts collection; may dangle.
    pub blog_id: Id<PostMarker>,
    pub user_email: Email,
    #[serde(flatten)]
    pub summary: PostSummary,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// The post fields copied onto a wishlist entry for display.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct PostSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&PostContent> for PostSummary {
    fn from(value: &PostContent) -> Self {
        Self {
            title: value.title.clone(),
            address: value.address.clone(),
            category: value.category.clone(),
            name: value.name.clone(),
        }
    }
}

impl WishlistEntry {
    pub fn enrich(&mut self, post: &PostContent) {
        self.summary = PostSummary::from(post);
    }
}

/// The body of a wishlist creation request.
#[derive(Clone, PartialEq, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<Email>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Clone, PartialEq, Debug)]
pub struct NewWishlistEntry {
    pub blog_id: Id<PostMarker>,
    pub user_email: Email,
    pub extra: ExtraFields,
}

impl NewWishlistEntry {
    #[must_use]
    pub fn new(blog_id: Id<PostMarker>, user_email: Email, mut extra: ExtraFields) -> Self {
        strip_reserved(&mut extra, &RESERVED_WISHLIST_FIELDS);
        Self {
            blog_id,
            user_email,
            extra,
        }
    }

    #[must_use]
    pub fn into_entry(self, id: Id<WishlistMarker>) -> WishlistEntry {
        WishlistEntry {
            id,
            blog_id: self.blog_id,
            user_email: self.user_email,
            summary: PostSummary::default(),
            extra: self.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry() -> WishlistEntry {
        NewWishlistEntry::new(
            "65f1c0ffee0123456789abcd".parse().unwrap(),
            Email::new("a@x.com".to_owned()).unwrap(),
            ExtraFields::new(),
        )
        .into_entry("65f1c0ffee0123456789abce".parse().unwrap())
    }

    #[test]
    fn unenriched_entry_has_no_display_fields() {
        let value = serde_json::to_value(entry()).unwrap();

        assert_eq!(
            value,
            json!({
                "_id": "65f1c0ffee0123456789abce",
                "blogId": "65f1c0ffee0123456789abcd",
                "userEmail": "a@x.com",
            })
        );
    }

    #[test]
    fn enrich_copies_display_fields() {
        let mut entry = entry();
        let content = PostContent {
            title: Some("A".to_owned()),
            long: Some("body text".to_owned()),
            category: Some("x".to_owned()),
            name: Some("Ann".to_owned()),
            address: Some("Somewhere 1".to_owned()),
            ..PostContent::default()
        };

        entry.enrich(&content);

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["title"], json!("A"));
        assert_eq!(value["category"], json!("x"));
        assert_eq!(value["name"], json!("Ann"));
        assert_eq!(value["address"], json!("Somewhere 1"));
        assert!(value.get("long").is_none());
    }

    #[test]
    fn client_cannot_preset_display_fields() {
        let body: WishlistContent = serde_json::from_value(json!({
            "userEmail": "a@x.com",
            "title": "fake",
            "blogId": "whatever",
            "note": "read later",
        }))
        .unwrap();

        let new_entry = NewWishlistEntry::new(
            "65f1c0ffee0123456789abcd".parse().unwrap(),
            body.user_email.unwrap(),
            body.extra,
        );

        assert_eq!(new_entry.extra.len(), 1);
        assert_eq!(new_entry.extra["note"], json!("read later"));
    }
}
