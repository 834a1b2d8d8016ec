//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool sized from `[database]`, migrated on connect
//! - Repositories are traits so the service layer runs against
//!   PostgreSQL or the in-memory store alike
//! - Batch writes happen inside one transaction

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{connect, pool_options};
pub use repos::*;
