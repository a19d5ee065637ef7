//! GraphQL schema composition root.
//!
//! Wires the read-only query surface and the mutation surface into one
//! schema and hands it the port implementations from [`AppState`].

pub mod filters;
pub mod mutation;
pub mod node;
pub mod query;
pub mod types;

#[cfg(test)]
mod tests;

use async_graphql::{EmptySubscription, Error, Schema};

use scribe_core::DomainError;
use scribe_core::error::RepoError;

use crate::state::AppState;
use mutation::MutationRoot;
use query::QueryRoot;

pub type ServiceSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the executable schema from the wired application state.
pub fn build_schema(state: &AppState) -> ServiceSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state.users.clone())
        .data(state.categories.clone())
        .data(state.posts.clone())
        .data(state.tokens.clone())
        .data(state.passwords.clone())
        .data(state.mailer.clone())
        .finish()
}

/// Map a repository failure to a client-facing GraphQL error.
///
/// Constraint violations keep the store's message (uniqueness errors are part
/// of the API contract); internal failures are logged and reported
/// generically.
pub(crate) fn repo_err(e: RepoError) -> Error {
    match DomainError::from(e) {
        DomainError::Internal(msg) => {
            tracing::error!("Repository error: {}", msg);
            Error::new("Internal server error")
        }
        other => Error::new(other.to_string()),
    }
}

/// Largest and default page size for connection fields.
pub(crate) const MAX_PAGE_SIZE: u64 = 100;

/// Resolve `first`/`after` connection arguments into an offset window.
pub(crate) fn page_bounds(first: Option<i32>, after: Option<String>) -> Result<(u64, u64), Error> {
    let offset = match after {
        Some(cursor) => node::decode_cursor(&cursor)
            .ok_or_else(|| Error::new("Invalid cursor"))?
            .saturating_add(1),
        None => 0,
    };

    let limit = match first {
        Some(n) if n < 0 => {
            return Err(Error::new("Argument 'first' must be a non-negative integer"));
        }
        Some(n) => (n as u64).min(MAX_PAGE_SIZE),
        None => MAX_PAGE_SIZE,
    };

    Ok((offset, limit))
}
