//! Project Persistence Module
//!
//! Saving and loading timeline state between sessions.

mod snapshot;

pub use snapshot::*;
