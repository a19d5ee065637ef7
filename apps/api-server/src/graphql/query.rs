//! Read-only query surface.
//!
//! Listing fields exclude soft-deleted rows and paginate with relay-style
//! cursors. Point lookups return null when the record is absent - never an
//! error - so callers can tell "found nothing" from "query failed".

use std::sync::Arc;

use async_graphql::{Context, ID, Object, Result};

use scribe_core::ports::{CategoryRepository, PageRequest, PostRepository, UserRepository};

use super::filters::{CategoryFilter, PostFilter};
use super::node::{Node, decode_global_id, encode_cursor, parse_id};
use super::types::{
    Category, CategoryConnection, CategoryEdge, PageInfo, Post, PostConnection, PostEdge, User,
};
use super::{page_bounds, repo_err};
use crate::identity::Identity;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Fetch any entity by its global ID.
    async fn node(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Node>> {
        let Some((type_name, local_id)) = decode_global_id(id.as_str()) else {
            return Ok(None);
        };

        match type_name.as_str() {
            "User" => {
                let users = ctx.data_unchecked::<Arc<dyn UserRepository>>();
                let user = users.find_by_id(local_id).await.map_err(repo_err)?;
                Ok(user.map(|u| Node::User(User(u))))
            }
            "Category" => {
                let categories = ctx.data_unchecked::<Arc<dyn CategoryRepository>>();
                let category = categories.find_by_id(local_id).await.map_err(repo_err)?;
                Ok(category.map(|c| Node::Category(Category(c))))
            }
            "Post" => {
                let posts = ctx.data_unchecked::<Arc<dyn PostRepository>>();
                let post = posts.find_by_id(local_id).await.map_err(repo_err)?;
                Ok(post.map(|p| Node::Post(Post(p))))
            }
            _ => Ok(None),
        }
    }

    /// The authenticated caller's account, or null when unauthenticated.
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(identity) = ctx.data_opt::<Identity>() else {
            return Ok(None);
        };
        let users = ctx.data_unchecked::<Arc<dyn UserRepository>>();
        let user = users.find_by_id(identity.user_id).await.map_err(repo_err)?;
        Ok(user.map(User))
    }

    /// All non-deleted categories in tree order.
    async fn all_categories(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        filter: Option<CategoryFilter>,
    ) -> Result<CategoryConnection> {
        let categories = ctx.data_unchecked::<Arc<dyn CategoryRepository>>();
        let filter = filter.unwrap_or_default().into_domain()?;
        let (offset, limit) = page_bounds(first, after)?;

        let mut rows = categories
            .list(
                &filter,
                PageRequest {
                    offset,
                    limit: limit + 1,
                },
            )
            .await
            .map_err(repo_err)?;

        let has_next_page = rows.len() as u64 > limit;
        if has_next_page {
            rows.truncate(limit as usize);
        }

        let edges: Vec<CategoryEdge> = rows
            .into_iter()
            .enumerate()
            .map(|(i, category)| CategoryEdge {
                cursor: encode_cursor(offset + i as u64),
                node: Category(category),
            })
            .collect();

        Ok(CategoryConnection {
            page_info: PageInfo {
                has_next_page,
                has_previous_page: offset > 0,
                start_cursor: edges.first().map(|e| e.cursor.clone()),
                end_cursor: edges.last().map(|e| e.cursor.clone()),
            },
            edges,
        })
    }

    /// Exact-match category lookup by unique name.
    async fn category_by_name(&self, ctx: &Context<'_>, name: String) -> Result<Option<Category>> {
        let categories = ctx.data_unchecked::<Arc<dyn CategoryRepository>>();
        let category = categories.find_by_name(&name).await.map_err(repo_err)?;
        Ok(category.map(Category))
    }

    /// All non-deleted posts, newest first.
    async fn all_posts(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        filter: Option<PostFilter>,
    ) -> Result<PostConnection> {
        let posts = ctx.data_unchecked::<Arc<dyn PostRepository>>();
        let filter = filter.unwrap_or_default().into();
        let (offset, limit) = page_bounds(first, after)?;

        let mut rows = posts
            .list(
                &filter,
                PageRequest {
                    offset,
                    limit: limit + 1,
                },
            )
            .await
            .map_err(repo_err)?;

        let has_next_page = rows.len() as u64 > limit;
        if has_next_page {
            rows.truncate(limit as usize);
        }

        let edges: Vec<PostEdge> = rows
            .into_iter()
            .enumerate()
            .map(|(i, post)| PostEdge {
                cursor: encode_cursor(offset + i as u64),
                node: Post(post),
            })
            .collect();

        Ok(PostConnection {
            page_info: PageInfo {
                has_next_page,
                has_previous_page: offset > 0,
                start_cursor: edges.first().map(|e| e.cursor.clone()),
                end_cursor: edges.last().map(|e| e.cursor.clone()),
            },
            edges,
        })
    }

    /// Composite exact-match lookup by (author, title).
    async fn post_by_name(
        &self,
        ctx: &Context<'_>,
        author: ID,
        title: String,
    ) -> Result<Option<Post>> {
        let Some(author_id) = parse_id(&author, "User") else {
            return Ok(None);
        };
        let posts = ctx.data_unchecked::<Arc<dyn PostRepository>>();
        let post = posts
            .find_by_author_and_title(author_id, &title)
            .await
            .map_err(repo_err)?;
        Ok(post.map(Post))
    }
}
