use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - an account that can author posts.
///
/// `is_active`/`is_verified` belong to the account lifecycle: registration
/// creates an inactive, unverified account and activation flips both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new, not-yet-verified user with generated ID.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            first_name: None,
            last_name: None,
            is_active: false,
            is_verified: false,
            created_at: Utc::now(),
        }
    }

    /// Mark the account as verified and usable for login.
    pub fn activate(&mut self) {
        self.is_verified = true;
        self.is_active = true;
    }
}
