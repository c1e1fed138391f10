//! Media Studio Error Definitions
//!
//! Timeline operations themselves never fail; these errors belong to the
//! surfaces around them (history, persistence, settings, op decoding).

use thiserror::Error;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // History Errors
    // =========================================================================
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedSnapshotVersion(String),

    #[error("Settings error: {0}")]
    SettingsError(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;
