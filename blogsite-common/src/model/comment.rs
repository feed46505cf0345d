use crate::model::{ExtraFields, Id, post::PostMarker, strip_reserved};
use serde::{Deserialize, Serialize};

pub const RESERVED_COMMENT_FIELDS: [&str; 2] = ["_id", "blogId"];

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Id<CommentMarker>,
    pub blog_id: Id<PostMarker>,
    #[serde(flatten)]
    pub content: CommentContent,
}

/// The comment text and whatever the client says about its author. None of it is verified.
#[derive(Clone, PartialEq, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_photo: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Clone, PartialEq, Debug)]
pub struct NewComment {
    pub blog_id: Id<PostMarker>,
    pub content: CommentContent,
}

impl NewComment {
    #[must_use]
    pub fn new(blog_id: Id<PostMarker>, mut content: CommentContent) -> Self {
        strip_reserved(&mut content.extra, &RESERVED_COMMENT_FIELDS);
        Self { blog_id, content }
    }

    #[must_use]
    pub fn into_comment(self, id: Id<CommentMarker>) -> Comment {
        Comment {
            id,
            blog_id: self.blog_id,
            content: self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reference_comes_from_argument_not_body() {
        let blog_id: Id<PostMarker> = "65f1c0ffee0123456789abcd".parse().unwrap();
        let content: CommentContent = serde_json::from_value(json!({
            "comment": "nice",
            "userName": "Ann",
            "blogId": "65f1c0ffee0123456789ffff",
        }))
        .unwrap();

        let comment = NewComment::new(blog_id, content)
            .into_comment("65f1c0ffee0123456789abce".parse().unwrap());

        assert_eq!(
            serde_json::to_value(comment).unwrap(),
            json!({
                "_id": "65f1c0ffee0123456789abce",
                "blogId": "65f1c0ffee0123456789abcd",
                "comment": "nice",
                "userName": "Ann",
            })
        );
    }
}
