//! GraphQL filter input objects and their conversion to the repository
//! filter types.

use async_graphql::{Error, ID, InputObject, Result};

use scribe_core::ports;

use super::node::parse_id;

/// Exact-or-contains predicate on a text field.
#[derive(InputObject, Default)]
pub struct StringFilter {
    pub eq: Option<String>,
    pub contains: Option<String>,
}

impl From<StringFilter> for ports::TextMatch {
    fn from(f: StringFilter) -> Self {
        Self {
            eq: f.eq,
            contains: f.contains,
        }
    }
}

/// Category listing filter.
#[derive(InputObject, Default)]
pub struct CategoryFilter {
    pub name: Option<StringFilter>,
    /// Exact hierarchy level (0 for roots).
    pub level: Option<i32>,
    /// Exact parent category ID.
    pub parent: Option<ID>,
}

impl CategoryFilter {
    pub fn into_domain(self) -> Result<ports::CategoryFilter> {
        let parent_id = match self.parent {
            Some(id) => {
                Some(parse_id(&id, "Category").ok_or_else(|| Error::new("Invalid parent ID"))?)
            }
            None => None,
        };

        Ok(ports::CategoryFilter {
            name: self.name.map(Into::into),
            level: self.level,
            parent_id,
        })
    }
}

/// Post listing filter. Author and category predicates match the related
/// user's username and category's name.
#[derive(InputObject, Default)]
pub struct PostFilter {
    pub title: Option<StringFilter>,
    pub author_username: Option<StringFilter>,
    pub category_name: Option<StringFilter>,
}

impl From<PostFilter> for ports::PostFilter {
    fn from(f: PostFilter) -> Self {
        Self {
            title: f.title.map(Into::into),
            author_username: f.author_username.map(Into::into),
            category_name: f.category_name.map(Into::into),
        }
    }
}
