use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RecordMeta;

/// Category entity - a node in the category forest.
///
/// `level` caches the ancestor chain length (0 for roots) and `path` is a
/// materialized ordering key (slash-joined slugs from the root), so listing
/// in tree order with siblings sorted by name never walks parent pointers.
/// Both are fixed at creation; the tree shape is not mutated through the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<Uuid>,
    pub level: i32,
    pub path: String,
    pub meta: RecordMeta,
}

impl Category {
    /// Create a root category.
    pub fn root(name: String, slug: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: slug.clone(),
            name,
            slug,
            parent_id: None,
            level: 0,
            meta: RecordMeta::new(),
        }
    }

    /// Create a child of `parent`, one level deeper with its path extended.
    pub fn child_of(parent: &Category, name: String, slug: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: format!("{}/{}", parent.path, slug),
            name,
            slug,
            parent_id: Some(parent.id),
            level: parent.level + 1,
            meta: RecordMeta::new(),
        }
    }
}
