//! Timeline Module
//!
//! Tracks, clips and the pure edit operations over a [`TimelineState`].

mod models;
mod ops;
mod sync;
mod validate;

pub use models::*;
pub use ops::{calculate_total_duration, create_default_timeline};
pub use validate::{validate_timeline, ValidationReport};
