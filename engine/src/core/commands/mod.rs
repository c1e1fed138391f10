//! Edit Command System
//!
//! Serializable timeline operations and the store that applies them one at
//! a time with undo/redo.

mod executor;
mod op;

pub use executor::*;
pub use op::*;
