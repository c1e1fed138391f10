//! Media Studio Core Type Definitions
//!
//! Defines fundamental types shared by the timeline, commands and persistence.

// =============================================================================
// ID Types
// =============================================================================

/// Clip unique identifier (ULID, or caller supplied)
pub type ClipId = String;

/// Track unique identifier (`<kind>-<ULID>`)
pub type TrackId = String;

/// Effect identifier
pub type EffectId = String;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Current wall-clock time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Generates a fresh ULID string.
pub fn new_id() -> String {
    ulid::Ulid::new().to_string()
}
