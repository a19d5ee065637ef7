//! Database access - SeaORM entities, Postgres repositories and the
//! in-memory fallback used without a configured database.

mod connections;
pub mod entity;
pub mod memory;
mod postgres_base;
pub mod postgres_repo;

pub use connections::{DatabaseConfig, connect};
pub use memory::{
    InMemoryCategoryRepository, InMemoryPostRepository, InMemoryStore, InMemoryUserRepository,
};
pub use postgres_repo::{
    PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository,
};
