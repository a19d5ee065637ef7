//! # Scribe Infrastructure
//!
//! Concrete implementations of the ports defined in `scribe-core`:
//! PostgreSQL repositories via SeaORM, functional in-memory repositories for
//! database-less runs and tests, JWT tokens, Argon2 password hashing, and the
//! outbound mail port.

pub mod auth;
pub mod database;
pub mod mail;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{DatabaseConfig, connect};
pub use mail::LogMailer;
