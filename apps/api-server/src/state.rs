//! Application state - the wired port implementations shared by the schema.

use std::sync::Arc;

use scribe_core::ports::{
    CategoryRepository, Mailer, PasswordService, PostRepository, TokenService, UserRepository,
};
use scribe_infra::database::{
    InMemoryCategoryRepository, InMemoryPostRepository, InMemoryStore, InMemoryUserRepository,
    PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository,
};
use scribe_infra::{Argon2PasswordService, DatabaseConfig, JwtTokenService, LogMailer};

type Repositories = (
    Arc<dyn UserRepository>,
    Arc<dyn CategoryRepository>,
    Arc<dyn PostRepository>,
);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        let (users, categories, posts) = match db_config {
            Some(config) => match scribe_infra::connect(config).await {
                Ok(conn) => {
                    let users: Arc<dyn UserRepository> =
                        Arc::new(PostgresUserRepository::new(conn.clone()));
                    let categories: Arc<dyn CategoryRepository> =
                        Arc::new(PostgresCategoryRepository::new(conn.clone()));
                    let posts: Arc<dyn PostRepository> =
                        Arc::new(PostgresPostRepository::new(conn));
                    (users, categories, posts)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::memory_repositories()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::memory_repositories()
            }
        };

        tracing::info!("Application state initialized");

        Self {
            users,
            categories,
            posts,
            tokens: Arc::new(JwtTokenService::from_env()),
            passwords: Arc::new(Argon2PasswordService::new()),
            mailer: Arc::new(LogMailer::new()),
        }
    }

    fn memory_repositories() -> Repositories {
        let store = InMemoryStore::new();
        (
            Arc::new(InMemoryUserRepository::new(store.clone())),
            Arc::new(InMemoryCategoryRepository::new(store.clone())),
            Arc::new(InMemoryPostRepository::new(store)),
        )
    }
}
