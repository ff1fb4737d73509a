//! Content types and taxonomies registered with the host.
//!
//! The registry is built once per process and shared by the REST client and
//! the sandbox host, so both agree on REST bases, permalink slugs and which
//! taxonomy attaches to which post type.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// The resource types reachable through the host's REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    Project,
    Todo,
    TodoCategory,
    Message,
    MessageCategory,
    User,
}

impl ResourceType {
    pub const ALL: [ResourceType; 6] = [
        Self::Project,
        Self::Todo,
        Self::TodoCategory,
        Self::Message,
        Self::MessageCategory,
        Self::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Todo => "todo",
            Self::TodoCategory => "todo-category",
            Self::Message => "message",
            Self::MessageCategory => "message-category",
            Self::User => "user",
        }
    }

    /// The registered schema for this resource type.
    pub fn schema(&self) -> &'static ContentSchema {
        registry().get(*self)
    }

    /// Path segment under the REST namespace, e.g. `wdm-central-to-do`.
    pub fn rest_base(&self) -> &'static str {
        self.schema().rest_base
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the host stores a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    PostType,
    Taxonomy,
    Directory,
}

/// Declarative registration of one resource type.
#[derive(Debug, Clone)]
pub struct ContentSchema {
    pub resource: ResourceType,
    pub kind: SchemaKind,
    pub rest_base: &'static str,
    /// Permalink prefix used for entity links and archive pages.
    pub rewrite_slug: Option<&'static str>,
    /// Label shown above a listing of this resource.
    pub plural: &'static str,
    pub hierarchical: bool,
    /// For taxonomies, the post type whose entries carry its terms.
    pub object_type: Option<ResourceType>,
}

impl ContentSchema {
    pub fn is_post_type(&self) -> bool {
        self.kind == SchemaKind::PostType
    }

    pub fn is_taxonomy(&self) -> bool {
        self.kind == SchemaKind::Taxonomy
    }
}

/// The set of registered schemas.
#[derive(Debug)]
pub struct Registry {
    schemas: Vec<ContentSchema>,
}

static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::builtin();
    tracing::debug!(schemas = registry.schemas.len(), "content registry initialized");
    registry
});

/// The process-wide registry.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

impl Registry {
    fn builtin() -> Self {
        let schemas = vec![
            ContentSchema {
                resource: ResourceType::Project,
                kind: SchemaKind::PostType,
                rest_base: "wdm-central-project",
                rewrite_slug: Some("projects"),
                plural: "Projects",
                hierarchical: false,
                object_type: None,
            },
            ContentSchema {
                resource: ResourceType::Todo,
                kind: SchemaKind::PostType,
                rest_base: "wdm-central-to-do",
                rewrite_slug: Some("todo-archive"),
                plural: "ToDo",
                hierarchical: false,
                object_type: None,
            },
            ContentSchema {
                resource: ResourceType::Message,
                kind: SchemaKind::PostType,
                rest_base: "wdm-central-message",
                rewrite_slug: Some("message-board"),
                plural: "Messages",
                hierarchical: false,
                object_type: None,
            },
            ContentSchema {
                resource: ResourceType::TodoCategory,
                kind: SchemaKind::Taxonomy,
                rest_base: "wisdm-central-todo-category",
                rewrite_slug: Some("todo-lists"),
                plural: "ToDo Category",
                hierarchical: true,
                object_type: Some(ResourceType::Todo),
            },
            ContentSchema {
                resource: ResourceType::MessageCategory,
                kind: SchemaKind::Taxonomy,
                rest_base: "wisdm-central-message-category",
                rewrite_slug: Some("message-category"),
                plural: "Message Category",
                hierarchical: true,
                object_type: Some(ResourceType::Message),
            },
            ContentSchema {
                resource: ResourceType::User,
                kind: SchemaKind::Directory,
                rest_base: "users",
                rewrite_slug: Some("author"),
                plural: "Users",
                hierarchical: false,
                object_type: None,
            },
        ];
        Self { schemas }
    }

    pub fn get(&self, resource: ResourceType) -> &ContentSchema {
        // Every ResourceType variant is registered by `builtin`.
        self.schemas
            .iter()
            .find(|s| s.resource == resource)
            .unwrap_or(&self.schemas[0])
    }

    pub fn by_rest_base(&self, rest_base: &str) -> Option<&ContentSchema> {
        self.schemas.iter().find(|s| s.rest_base == rest_base)
    }

    /// The taxonomy whose terms are attached to entries of `post_type`.
    pub fn taxonomy_for(&self, post_type: ResourceType) -> Option<&ContentSchema> {
        self.schemas
            .iter()
            .find(|s| s.is_taxonomy() && s.object_type == Some(post_type))
    }

    /// Site-relative archive page of a post type, e.g. `/?post_type=wdm-central-project`.
    pub fn archive_link(&self, post_type: ResourceType) -> String {
        format!("/?post_type={}", self.get(post_type).rest_base)
    }
}
