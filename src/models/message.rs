use serde::{Deserialize, Serialize};

use super::fields::{self, Rendered};
use super::{PostId, PostStatus, TermId};

/// A post on a project's message board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: PostId,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "fields::acf_map")]
    pub acf: MessageFields,
    #[serde(
        rename = "wisdm-central-message-category",
        default,
        deserialize_with = "fields::id_list"
    )]
    pub categories: Vec<TermId>,
}

impl Message {
    pub fn title(&self) -> &str {
        &self.title.rendered
    }

    pub fn project(&self) -> Option<PostId> {
        self.acf.project
    }

    pub fn category(&self) -> Option<TermId> {
        self.categories.first().copied()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageFields {
    #[serde(default, deserialize_with = "fields::opt_id")]
    pub project: Option<PostId>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageFieldsInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<PostId>,
}

/// Input for posting a message to a board.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageInput {
    pub title: String,
    pub status: PostStatus,
    pub content: String,
    pub acf: MessageFieldsInput,
    #[serde(
        rename = "wisdm-central-message-category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<TermId>,
}

/// Input for editing a message. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateMessageInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
