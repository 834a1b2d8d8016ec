//! Domain models with validation at construction
//!
//! Invalid input returns ValidationError, not panic.

pub mod anime;
pub mod user;
pub mod validation;

pub use anime::Anime;
pub use user::{format_authorities, parse_authorities, Role, User};
pub use validation::ValidationError;
