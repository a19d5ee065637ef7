//! GraphQL object types over the domain entities, plus the relay connection
//! shapes used by the listing fields.
//!
//! Category exposes an explicit field allow-list; Post exposes every domain
//! field. The asymmetry is deliberate and part of the API contract.

use std::sync::Arc;

use async_graphql::{Context, ID, Object, Result, SimpleObject};
use chrono::{DateTime, Utc};

use scribe_core::domain;
use scribe_core::ports::{CategoryRepository, PostRepository, UserRepository};

use super::node::encode_global_id;
use super::repo_err;

/// A registered account.
#[derive(Clone)]
pub struct User(pub domain::User);

#[Object]
impl User {
    /// Relay global ID.
    async fn id(&self) -> ID {
        encode_global_id("User", self.0.id)
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn first_name(&self) -> Option<&str> {
        self.0.first_name.as_deref()
    }

    async fn last_name(&self) -> Option<&str> {
        self.0.last_name.as_deref()
    }

    async fn is_active(&self) -> bool {
        self.0.is_active
    }

    async fn is_verified(&self) -> bool {
        self.0.is_verified
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}

/// A node in the category tree.
#[derive(Clone)]
pub struct Category(pub domain::Category);

#[Object]
impl Category {
    /// Relay global ID.
    async fn id(&self) -> ID {
        encode_global_id("Category", self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn slug(&self) -> &str {
        &self.0.slug
    }

    /// Depth in the tree: 0 for roots.
    async fn level(&self) -> i32 {
        self.0.level
    }

    async fn parent(&self, ctx: &Context<'_>) -> Result<Option<Category>> {
        let Some(parent_id) = self.0.parent_id else {
            return Ok(None);
        };
        let categories = ctx.data_unchecked::<Arc<dyn CategoryRepository>>();
        let parent = categories.find_by_id(parent_id).await.map_err(repo_err)?;
        Ok(parent.map(Category))
    }

    /// Non-deleted posts attached to this category, newest first.
    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<Post>> {
        let posts = ctx.data_unchecked::<Arc<dyn PostRepository>>();
        let rows = posts.list_by_category(self.0.id).await.map_err(repo_err)?;
        Ok(rows.into_iter().map(Post).collect())
    }
}

/// A blog post.
#[derive(Clone)]
pub struct Post(pub domain::Post);

#[Object]
impl Post {
    /// Relay global ID.
    async fn id(&self) -> ID {
        encode_global_id("Post", self.0.id)
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let users = ctx.data_unchecked::<Arc<dyn UserRepository>>();
        let author = users.find_by_id(self.0.author_id).await.map_err(repo_err)?;
        Ok(author.map(User))
    }

    async fn category(&self, ctx: &Context<'_>) -> Result<Option<Category>> {
        let categories = ctx.data_unchecked::<Arc<dyn CategoryRepository>>();
        let category = categories
            .find_by_id(self.0.category_id)
            .await
            .map_err(repo_err)?;
        Ok(category.map(Category))
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn body(&self) -> &str {
        &self.0.body
    }

    async fn thumbnail(&self) -> &str {
        &self.0.thumbnail
    }

    async fn likes(&self) -> i32 {
        self.0.likes
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.meta.created_at
    }
}

/// Relay PageInfo.
#[derive(SimpleObject, Clone)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// Relay edge/connection pair for categories.
#[derive(SimpleObject)]
pub struct CategoryEdge {
    pub cursor: String,
    pub node: Category,
}

#[derive(SimpleObject)]
pub struct CategoryConnection {
    pub edges: Vec<CategoryEdge>,
    pub page_info: PageInfo,
}

/// Relay edge/connection pair for posts.
#[derive(SimpleObject)]
pub struct PostEdge {
    pub cursor: String,
    pub node: Post,
}

#[derive(SimpleObject)]
pub struct PostConnection {
    pub edges: Vec<PostEdge>,
    pub page_info: PageInfo,
}
