use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields::{self, completion, due_date, Rendered};
use super::{PostId, PostStatus, TermId, UserId};

/// A todo filed under a todo list.
///
/// Completion is a real `bool` here; on the wire it is the flag set
/// `["Done"]` or `[]` (see [`fields::completion`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
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
    pub acf: TodoFields,
    /// Todo lists (todo-category terms) this todo is filed under.
    #[serde(
        rename = "wisdm-central-todo-category",
        default,
        deserialize_with = "fields::id_list"
    )]
    pub lists: Vec<TermId>,
}

impl Todo {
    pub fn title(&self) -> &str {
        &self.title.rendered
    }

    pub fn is_done(&self) -> bool {
        self.acf.done
    }

    pub fn project(&self) -> Option<PostId> {
        self.acf.project()
    }

    pub fn due_on(&self) -> Option<NaiveDate> {
        self.acf.due_on
    }

    pub fn assignee(&self) -> Option<UserId> {
        self.acf.assigned_to
    }

    /// The list the todo was created in.
    pub fn list(&self) -> Option<TermId> {
        self.lists.first().copied()
    }

    pub fn is_in_list(&self, list: TermId) -> bool {
        self.lists.contains(&list)
    }
}

/// Custom fields of a todo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoFields {
    #[serde(
        default,
        deserialize_with = "fields::opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_id: Option<PostId>,
    /// Older entries store the owning project under `project`.
    #[serde(
        default,
        deserialize_with = "fields::opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub project: Option<PostId>,
    #[serde(rename = "task_complete", default, with = "completion")]
    pub done: bool,
    #[serde(default, with = "due_date")]
    pub due_on: Option<NaiveDate>,
    #[serde(default, deserialize_with = "fields::opt_id")]
    pub assigned_to: Option<UserId>,
}

impl TodoFields {
    pub fn project(&self) -> Option<PostId> {
        self.project_id.or(self.project)
    }
}

/// Custom fields sent when creating or updating a todo.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TodoFieldsInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<PostId>,
    #[serde(
        rename = "task_complete",
        skip_serializing_if = "Option::is_none",
        serialize_with = "completion::serialize_opt"
    )]
    pub done: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "due_date::serialize"
    )]
    pub due_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
}

impl TodoFieldsInput {
    /// Only the completion flag, as sent by the list page checkbox.
    pub fn completion(done: bool) -> Self {
        Self {
            done: Some(done),
            ..Default::default()
        }
    }
}

/// Input for creating a todo in a list.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTodoInput {
    pub title: String,
    pub status: PostStatus,
    pub content: String,
    pub acf: TodoFieldsInput,
    #[serde(rename = "wisdm-central-todo-category")]
    pub list: TermId,
}

/// Input for updating a todo. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTodoInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acf: Option<TodoFieldsInput>,
}
