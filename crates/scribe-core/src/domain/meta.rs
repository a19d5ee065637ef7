use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record metadata shared by Category and Post: a creation timestamp set once
/// and a soft-delete marker that hides the row from listing queries without
/// removing it from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMeta {
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl RecordMeta {
    /// Fresh metadata for a record created now.
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            is_deleted: false,
        }
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_not_deleted() {
        let meta = RecordMeta::new();
        assert!(!meta.is_deleted);
        assert!(meta.created_at <= Utc::now());
    }
}
