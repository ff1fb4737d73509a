use serde::{Deserialize, Serialize};

use super::fields;
use super::TermId;

/// A term of a hierarchical taxonomy.
///
/// For todo-categories, a term with `parent == 0` is a project's root list
/// grouping; its children are the project's todo lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: TermId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "fields::opt_id")]
    pub parent: Option<TermId>,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub taxonomy: String,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_child_of(&self, parent: TermId) -> bool {
        self.parent == Some(parent)
    }
}

/// Input for creating a term. A missing parent creates a root term.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<TermId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_parent_is_root() {
        let root: Category =
            serde_json::from_value(json!({"id": 4, "name": "Diwali", "parent": 0})).unwrap();
        let child: Category =
            serde_json::from_value(json!({"id": 5, "name": "Cleaning", "parent": 4})).unwrap();

        assert!(root.is_root());
        assert!(!child.is_root());
        assert!(child.is_child_of(4));
    }
}
