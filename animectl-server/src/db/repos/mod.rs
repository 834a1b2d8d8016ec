//! Repository traits and implementations
//!
//! - `anime`: anime CRUD, PostgreSQL-backed
//! - `users`: account lookup for Basic authentication
//! - `memory`: in-process stores for development and tests

pub mod anime;
pub mod memory;
pub mod users;

pub use anime::{AnimeRepository, PgAnimeRepo};
pub use memory::{MemoryAnimeRepo, MemoryUserRepo};
pub use users::{PgUserRepo, UserRepository};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {resource} '{id}' already exists")]
    Conflict { resource: &'static str, id: String },

    #[error("corrupt {resource} row: {reason}")]
    Corrupt { resource: &'static str, reason: String },
}

pub type DbResult<T> = Result<T, DbError>;
