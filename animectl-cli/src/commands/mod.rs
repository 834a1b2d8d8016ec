//! Command implementations for animectl CLI

pub mod migrate;
pub mod serve;
pub mod user;

// Re-export main dispatcher functions for flat access from main.rs
pub use migrate::run_migrate;
pub use serve::run_serve;
pub use user::{run_hash_password, run_user};
