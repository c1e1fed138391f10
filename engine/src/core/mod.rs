//! Media Studio Core Engine
//!
//! Timeline model, edit operations, persistence and settings.

pub mod commands;
pub mod fs;
pub mod project;
pub mod settings;
pub mod timeline;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;

#[cfg(test)]
mod tests_invariants;
