//! Route handlers organized by resource

pub mod animes;
pub mod health;
