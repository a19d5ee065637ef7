//! In-memory repository implementations - used when no database is
//! configured and as the backing store for schema-level tests.
//!
//! The three repositories share one store so that post listings can match on
//! the related author's username and category's name, and they enforce the
//! same unique constraints the Postgres schema declares, phrased the way
//! Postgres reports them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use scribe_core::domain::{Category, Post, User};
use scribe_core::error::RepoError;
use scribe_core::ports::{
    BaseRepository, CategoryFilter, CategoryRepository, PageRequest, PostFilter, PostRepository,
    UserRepository,
};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    posts: HashMap<Uuid, Post>,
}

/// Shared in-memory store. Clone it to hand the same maps to each repository.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unique_violation(constraint: &str) -> RepoError {
    RepoError::Constraint(format!(
        "duplicate key value violates unique constraint \"{constraint}\""
    ))
}

fn page_window<T>(mut items: Vec<T>, page: PageRequest) -> Vec<T> {
    let offset = page.offset.min(items.len() as u64) as usize;
    let mut items = items.split_off(offset);
    items.truncate(page.limit as usize);
    items
}

/// In-memory user repository.
pub struct InMemoryUserRepository {
    store: InMemoryStore,
}

impl InMemoryUserRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.inner.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut inner = self.store.inner.write().await;
        if inner
            .users
            .values()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return Err(unique_violation("users_username_key"));
        }
        if inner
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(unique_violation("users_email_key"));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut inner = self.store.inner.write().await;
        if !inner.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        inner
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

/// In-memory category repository.
pub struct InMemoryCategoryRepository {
    store: InMemoryStore,
}

impl InMemoryCategoryRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.store.inner.read().await.categories.get(&id).cloned())
    }

    async fn insert(&self, category: Category) -> Result<Category, RepoError> {
        let mut inner = self.store.inner.write().await;
        if inner
            .categories
            .values()
            .any(|c| c.name == category.name && c.id != category.id)
        {
            return Err(unique_violation("categories_name_key"));
        }
        if inner
            .categories
            .values()
            .any(|c| c.slug == category.slug && c.id != category.id)
        {
            return Err(unique_violation("categories_slug_key"));
        }
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let mut inner = self.store.inner.write().await;
        if !inner.categories.contains_key(&category.id) {
            return Err(RepoError::NotFound);
        }
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        // FK RESTRICT: a referenced category cannot be removed.
        if inner.posts.values().any(|p| p.category_id == id) {
            return Err(RepoError::Constraint(
                "update or delete on table \"categories\" violates foreign key constraint"
                    .to_string(),
            ));
        }
        inner
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner.categories.values().find(|c| c.name == name).cloned())
    }

    async fn list(
        &self,
        filter: &CategoryFilter,
        page: PageRequest,
    ) -> Result<Vec<Category>, RepoError> {
        let inner = self.store.inner.read().await;
        let mut rows: Vec<Category> = inner
            .categories
            .values()
            .filter(|c| !c.meta.is_deleted)
            .filter(|c| filter.name.as_ref().is_none_or(|m| m.matches(&c.name)))
            .filter(|c| filter.level.is_none_or(|level| c.level == level))
            .filter(|c| filter.parent_id.is_none_or(|p| c.parent_id == Some(p)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(page_window(rows, page))
    }
}

/// In-memory post repository.
pub struct InMemoryPostRepository {
    store: InMemoryStore,
}

impl InMemoryPostRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.inner.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut inner = self.store.inner.write().await;
        if inner
            .posts
            .values()
            .any(|p| p.author_id == post.author_id && p.title == post.title && p.id != post.id)
        {
            return Err(unique_violation("idx_posts_author_title"));
        }
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut inner = self.store.inner.write().await;
        if !inner.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        if inner
            .posts
            .values()
            .any(|p| p.author_id == post.author_id && p.title == post.title && p.id != post.id)
        {
            return Err(unique_violation("idx_posts_author_title"));
        }
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        inner
            .posts
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_owned(&self, id: Uuid, author_id: Uuid) -> Result<Option<Post>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .posts
            .get(&id)
            .filter(|p| p.author_id == author_id)
            .cloned())
    }

    async fn find_by_author_and_title(
        &self,
        author_id: Uuid,
        title: &str,
    ) -> Result<Option<Post>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .posts
            .values()
            .find(|p| p.author_id == author_id && p.title == title)
            .cloned())
    }

    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Vec<Post>, RepoError> {
        let inner = self.store.inner.read().await;
        let mut rows: Vec<Post> = inner
            .posts
            .values()
            .filter(|p| !p.meta.is_deleted)
            .filter(|p| filter.title.as_ref().is_none_or(|m| m.matches(&p.title)))
            .filter(|p| {
                filter.author_username.as_ref().is_none_or(|m| {
                    inner
                        .users
                        .get(&p.author_id)
                        .is_some_and(|u| m.matches(&u.username))
                })
            })
            .filter(|p| {
                filter.category_name.as_ref().is_none_or(|m| {
                    inner
                        .categories
                        .get(&p.category_id)
                        .is_some_and(|c| m.matches(&c.name))
                })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.meta.created_at.cmp(&a.meta.created_at).then(a.id.cmp(&b.id)));
        Ok(page_window(rows, page))
    }

    async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let inner = self.store.inner.read().await;
        let mut rows: Vec<Post> = inner
            .posts
            .values()
            .filter(|p| p.category_id == category_id && !p.meta.is_deleted)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.meta.created_at.cmp(&a.meta.created_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::ports::TextMatch;

    fn all() -> PageRequest {
        PageRequest {
            offset: 0,
            limit: 100,
        }
    }

    #[tokio::test]
    async fn test_duplicate_author_title_rejected() {
        let store = InMemoryStore::new();
        let posts = InMemoryPostRepository::new(store);
        let author = Uuid::new_v4();
        let category = Uuid::new_v4();

        posts
            .insert(Post::new(
                author,
                category,
                "t1".to_string(),
                "thumb".to_string(),
                "body".to_string(),
            ))
            .await
            .unwrap();

        let err = posts
            .insert(Post::new(
                author,
                category,
                "t1".to_string(),
                "thumb".to_string(),
                "other".to_string(),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, RepoError::Constraint(msg) if msg.contains("unique")));
    }

    #[tokio::test]
    async fn test_same_title_different_author_allowed() {
        let store = InMemoryStore::new();
        let posts = InMemoryPostRepository::new(store);
        let category = Uuid::new_v4();

        for _ in 0..2 {
            posts
                .insert(Post::new(
                    Uuid::new_v4(),
                    category,
                    "t1".to_string(),
                    "thumb".to_string(),
                    "body".to_string(),
                ))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_listing_skips_soft_deleted() {
        let store = InMemoryStore::new();
        let posts = InMemoryPostRepository::new(store);
        let author = Uuid::new_v4();
        let category = Uuid::new_v4();

        let mut hidden = Post::new(
            author,
            category,
            "hidden".to_string(),
            "thumb".to_string(),
            "body".to_string(),
        );
        hidden.meta.is_deleted = true;
        posts.insert(hidden).await.unwrap();

        let visible = posts.list(&PostFilter::default(), all()).await.unwrap();
        assert!(visible.is_empty());
    }

    #[tokio::test]
    async fn test_category_listing_is_tree_ordered() {
        let store = InMemoryStore::new();
        let categories = InMemoryCategoryRepository::new(store);

        let tech = Category::root("Tech".to_string(), "tech".to_string());
        let art = Category::root("Art".to_string(), "art".to_string());
        let rust = Category::child_of(&tech, "Rust".to_string(), "rust".to_string());
        categories.insert(tech).await.unwrap();
        categories.insert(art).await.unwrap();
        categories.insert(rust).await.unwrap();

        let rows = categories
            .list(&CategoryFilter::default(), all())
            .await
            .unwrap();
        let names: Vec<&str> = rows.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Art", "Tech", "Rust"]);
    }

    #[tokio::test]
    async fn test_post_filter_on_author_username() {
        let store = InMemoryStore::new();
        let users = InMemoryUserRepository::new(store.clone());
        let posts = InMemoryPostRepository::new(store);

        let ada = User::new(
            "ada".to_string(),
            "ada@example.com".to_string(),
            "hash".to_string(),
        );
        let ada_id = ada.id;
        users.insert(ada).await.unwrap();

        posts
            .insert(Post::new(
                ada_id,
                Uuid::new_v4(),
                "t1".to_string(),
                "thumb".to_string(),
                "body".to_string(),
            ))
            .await
            .unwrap();

        let filter = PostFilter {
            author_username: Some(TextMatch {
                eq: None,
                contains: Some("ad".to_string()),
            }),
            ..Default::default()
        };
        assert_eq!(posts.list(&filter, all()).await.unwrap().len(), 1);

        let filter = PostFilter {
            author_username: Some(TextMatch {
                eq: Some("bob".to_string()),
                contains: None,
            }),
            ..Default::default()
        };
        assert!(posts.list(&filter, all()).await.unwrap().is_empty());
    }
}
