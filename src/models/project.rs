use serde::{Deserialize, Serialize};

use super::fields::{self, Rendered};
use super::{PostId, PostStatus, TermId, UserId};

/// A project: the root of a todo-list hierarchy and a message board.
///
/// `acf.members` decides which users see the project on their home page.
/// `acf.project_parent_category` names the root todo-category whose children
/// are the project's todo lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
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
    pub acf: ProjectFields,
}

impl Project {
    pub fn name(&self) -> &str {
        &self.title.rendered
    }

    pub fn description(&self) -> &str {
        &self.content.rendered
    }

    pub fn members(&self) -> &[UserId] {
        &self.acf.members
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.acf.members.contains(&user)
    }

    /// The root todo-category ("parent list id").
    pub fn root_list(&self) -> Option<TermId> {
        self.acf.project_parent_category
    }
}

/// Custom fields of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectFields {
    /// Ordered member ids; `null` on the wire means none.
    #[serde(default, deserialize_with = "fields::id_list")]
    pub members: Vec<UserId>,
    #[serde(default, deserialize_with = "fields::opt_id")]
    pub project_parent_category: Option<TermId>,
}

/// Custom fields sent when creating or updating a project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectFieldsInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<UserId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_parent_category: Option<TermId>,
}

/// Input for creating a new project.
#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectInput {
    pub title: String,
    pub status: PostStatus,
    pub content: String,
    pub acf: ProjectFieldsInput,
}

/// Input for updating an existing project. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProjectInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acf: Option<ProjectFieldsInput>,
}
