//! Typed request and response schemas for the host's content types.
//!
//! # Entities
//!
//! - [`Project`]: a post with members and a root todo-category ("parent list").
//! - [`Category`]: a taxonomy term. Todo-categories under a project's root are
//!   its todo lists; message-categories group messages.
//! - [`Todo`]: a post filed under one or more todo lists.
//! - [`Message`]: a post on a project's message board.
//! - [`User`]: a read-only entry of the host's user directory.
//!
//! Every entity is owned by the host. Response types deserialize leniently
//! (see [`fields`]); `Create*`/`Update*` inputs serialize exactly the keys the
//! host expects, omitting unset ones so updates stay partial.

pub mod fields;

mod category;
mod message;
mod project;
mod todo;
mod user;

pub use category::*;
pub use message::*;
pub use project::*;
pub use todo::*;
pub use user::*;

pub use fields::Rendered;

/// Id of a post (project, todo, message). Posts share one id space.
pub type PostId = u64;
/// Id of a taxonomy term (todo-category, message-category).
pub type TermId = u64;
/// Id of a directory user.
pub type UserId = u64;

/// Publication status sent with every create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Publish,
    Draft,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Draft => "draft",
        }
    }
}
