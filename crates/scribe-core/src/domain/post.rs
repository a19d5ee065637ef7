use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RecordMeta;

/// Post entity - a blog post owned by exactly one author and attached to
/// exactly one category. (author_id, title) pairs are unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub body: String,
    pub thumbnail: String,
    pub likes: i32,
    pub meta: RecordMeta,
}

impl Post {
    /// Create a new post with generated ID, zero likes and fresh metadata.
    pub fn new(
        author_id: Uuid,
        category_id: Uuid,
        title: String,
        thumbnail: String,
        body: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id,
            title,
            body,
            thumbnail,
            likes: 0,
            meta: RecordMeta::new(),
        }
    }
}
