use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Post, User};
use crate::error::RepoError;

/// Exact-or-contains predicate on a text column. When both are given the
/// conditions are combined with AND.
#[derive(Debug, Clone, Default)]
pub struct TextMatch {
    pub eq: Option<String>,
    pub contains: Option<String>,
}

impl TextMatch {
    /// Whether `value` satisfies the predicate.
    pub fn matches(&self, value: &str) -> bool {
        self.eq.as_deref().is_none_or(|eq| value == eq)
            && self
                .contains
                .as_deref()
                .is_none_or(|needle| value.contains(needle))
    }
}

/// Filter predicates for category listings.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub name: Option<TextMatch>,
    pub level: Option<i32>,
    pub parent_id: Option<Uuid>,
}

/// Filter predicates for post listings. Author and category predicates match
/// against the related row's username/name.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub title: Option<TextMatch>,
    pub author_username: Option<TextMatch>,
    pub category_name: Option<TextMatch>,
}

/// Offset/limit window for a listing query. Callers ask for one row more than
/// the page size to learn whether a next page exists.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Update an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. This is a hard delete.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Category repository. Listings exclude soft-deleted rows and come back in
/// tree order (materialized path, siblings sorted by name); point lookups do
/// not filter on the soft-delete marker.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Exact-match lookup by unique name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;

    /// Filtered, paginated listing of non-deleted categories.
    async fn list(
        &self,
        filter: &CategoryFilter,
        page: PageRequest,
    ) -> Result<Vec<Category>, RepoError>;
}

/// Post repository. Listings exclude soft-deleted rows, newest first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Find a post scoped to (id AND author). Returns `None` both when the id
    /// does not exist and when it belongs to someone else.
    async fn find_owned(&self, id: Uuid, author_id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Composite exact-match lookup by (author, title).
    async fn find_by_author_and_title(
        &self,
        author_id: Uuid,
        title: &str,
    ) -> Result<Option<Post>, RepoError>;

    /// Filtered, paginated listing of non-deleted posts.
    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Vec<Post>, RepoError>;

    /// Non-deleted posts attached to a category, newest first.
    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Post>, RepoError>;
}
