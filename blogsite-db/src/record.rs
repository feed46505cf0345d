use blogsite_common::model::{
    ExtraFields, Id, InvalidIdError, ModelValidationError,
    comment::{Comment, CommentContent, RESERVED_COMMENT_FIELDS},
    post::{Post, PostContent, RESERVED_POST_FIELDS},
    user::{Email, InvalidEmailError},
    wishlist::{PostSummary, RESERVED_WISHLIST_FIELDS, WishlistEntry},
};
use mongodb::bson::{Document, oid::ObjectId};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Model(#[from] ModelValidationError),
    #[error("Document fields had an unexpected shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("Document is missing fields or has mistyped ones: {0}")]
    Document(#[from] mongodb::bson::de::Error),
}

impl From<InvalidIdError> for RecordError {
    fn from(value: InvalidIdError) -> Self {
        Self::Model(value.into())
    }
}

impl From<InvalidEmailError> for RecordError {
    fn from(value: InvalidEmailError) -> Self {
        Self::Model(value.into())
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub(crate) struct PostRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub fields: Document,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WishlistRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub blog_id: String,
    pub user_email: String,
    #[serde(flatten)]
    pub fields: Document,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub blog_id: String,
    #[serde(flatten)]
    pub fields: Document,
}

/// Converts stored fields to JSON, rendering store-specific types in relaxed extended JSON.
fn into_json_fields(fields: Document) -> ExtraFields {
    fields
        .into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect()
}

/// Decodes one stored document into a model value.
pub(crate) fn decode<R, T>(document: Document) -> Result<T, RecordError>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = RecordError>,
{
    let record: R = mongodb::bson::from_document(document)?;
    T::try_from(record)
}

/// Decodes a list of stored documents. Documents that no longer fit the model are logged
/// and left out, so one bad document does not fail the whole list.
pub(crate) fn decode_all<R, T>(collection: &str, documents: Vec<Document>) -> Vec<T>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = RecordError>,
{
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.get_object_id("_id").ok();
            decode::<R, T>(document)
                .inspect_err(|err| {
                    warn!(collection, ?id, error = %err, "Skipping undecodable document");
                })
                .ok()
        })
        .collect()
}

impl TryFrom<PostRecord> for Post {
    type Error = RecordError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        let mut fields = into_json_fields(value.fields);
        for key in RESERVED_POST_FIELDS {
            fields.remove(key);
        }
        let content: PostContent = serde_json::from_value(Value::Object(fields))?;

        Ok(Self {
            id: value.id.into(),
            email: value.email.map(Email::new).transpose()?,
            content,
        })
    }
}

impl TryFrom<WishlistRecord> for WishlistEntry {
    type Error = RecordError;

    fn try_from(value: WishlistRecord) -> Result<Self, Self::Error> {
        let mut extra = into_json_fields(value.fields);
        for key in RESERVED_WISHLIST_FIELDS {
            extra.remove(key);
        }

        Ok(Self {
            id: value.id.into(),
            blog_id: value.blog_id.parse::<Id<_>>()?,
            user_email: Email::new(value.user_email)?,
            summary: PostSummary::default(),
            extra,
        })
    }
}

impl TryFrom<CommentRecord> for Comment {
    type Error = RecordError;

    fn try_from(value: CommentRecord) -> Result<Self, Self::Error> {
        let mut fields = into_json_fields(value.fields);
        for key in RESERVED_COMMENT_FIELDS {
            fields.remove(key);
        }
        let content: CommentContent = serde_json::from_value(Value::Object(fields))?;

        Ok(Self {
            id: value.id.into(),
            blog_id: value.blog_id.parse::<Id<_>>()?,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde_json::json;

    #[test]
    fn post_record_becomes_post() {
        let id = ObjectId::new();
        let record: PostRecord = mongodb::bson::from_document(doc! {
            "_id": id,
            "title": "A",
            "long": "one two three",
            "email": "a@x.com",
            "views": 3_i32,
        })
        .unwrap();

        let post = Post::try_from(record).unwrap();

        assert_eq!(post.id.object_id(), id);
        assert_eq!(post.email.unwrap().get(), "a@x.com");
        assert_eq!(post.content.title.as_deref(), Some("A"));
        assert_eq!(post.content.extra["views"], json!(3));
    }

    #[test]
    fn post_record_without_owner_is_kept() {
        let record: PostRecord =
            mongodb::bson::from_document(doc! { "_id": ObjectId::new(), "title": "A" }).unwrap();

        assert_eq!(Post::try_from(record).unwrap().email, None);
    }

    #[test]
    fn wishlist_record_with_bad_reference_is_rejected() {
        let record: WishlistRecord = mongodb::bson::from_document(doc! {
            "_id": ObjectId::new(),
            "blogId": "not-an-id",
            "userEmail": "a@x.com",
        })
        .unwrap();

        assert!(matches!(
            WishlistEntry::try_from(record),
            Err(RecordError::Model(ModelValidationError::Id(_)))
        ));
    }

    #[test]
    fn stored_word_count_is_not_carried_into_the_post() {
        let record: PostRecord = mongodb::bson::from_document(doc! {
            "_id": ObjectId::new(),
            "title": "A",
            "wordCount": 99_i32,
        })
        .unwrap();

        assert!(!Post::try_from(record).unwrap().content.extra.contains_key("wordCount"));
    }

    #[test]
    fn undecodable_wishlist_documents_are_left_out() {
        let blog_id = ObjectId::new();
        let documents = vec![
            doc! { "_id": ObjectId::new(), "blogId": "legacy", "userEmail": "a@x.com" },
            doc! { "_id": ObjectId::new(), "blogId": blog_id.to_hex(), "userEmail": "a@x.com" },
            doc! { "_id": ObjectId::new(), "userEmail": "a@x.com" },
            doc! { "_id": ObjectId::new(), "blogId": blog_id.to_hex(), "userEmail": "nobody" },
        ];

        let entries = decode_all::<WishlistRecord, WishlistEntry>("wishlist", documents);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].blog_id.object_id(), blog_id);
    }

    #[test]
    fn undecodable_post_documents_are_left_out() {
        let documents = vec![
            doc! { "_id": ObjectId::new(), "title": "bad owner", "email": "not an email" },
            doc! { "_id": ObjectId::new(), "title": "fine", "email": "a@x.com" },
            doc! { "_id": "not-an-object-id", "title": "bad id" },
            doc! { "_id": ObjectId::new(), "title": 7_i32 },
        ];

        let posts = decode_all::<PostRecord, Post>("blogs", documents);

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].content.title.as_deref(), Some("fine"));
    }

    #[test]
    fn undecodable_comment_documents_are_left_out() {
        let blog_id = ObjectId::new().to_hex();
        let documents = vec![
            doc! { "_id": ObjectId::new(), "blogId": blog_id.as_str(), "comment": "kept" },
            doc! { "_id": ObjectId::new(), "blogId": "legacy", "comment": "dropped" },
        ];

        let comments = decode_all::<CommentRecord, Comment>("comments", documents);

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content.comment.as_deref(), Some("kept"));
    }

    #[test]
    fn single_undecodable_document_is_an_error() {
        let result = decode::<WishlistRecord, WishlistEntry>(doc! { "_id": ObjectId::new() });

        assert!(matches!(result, Err(RecordError::Document(_))));
    }

    #[test]
    fn comment_record_becomes_comment() {
        let blog_id = ObjectId::new();
        let record: CommentRecord = mongodb::bson::from_document(doc! {
            "_id": ObjectId::new(),
            "blogId": blog_id.to_hex(),
            "comment": "nice",
            "userName": "Ann",
        })
        .unwrap();

        let comment = Comment::try_from(record).unwrap();

        assert_eq!(comment.blog_id.object_id(), blog_id);
        assert_eq!(comment.content.comment.as_deref(), Some("nice"));
        assert_eq!(comment.content.user_name.as_deref(), Some("Ann"));
    }
}
