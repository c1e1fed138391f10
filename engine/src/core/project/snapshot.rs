//! Snapshot Module
//!
//! Stores a full TimelineState as versioned JSON so a session can be
//! restored exactly as it was left.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{
    fs::{atomic_write_json_pretty, read_json},
    now_rfc3339,
    timeline::TimelineState,
    CoreError, CoreResult,
};

/// Snapshot format version
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Default snapshot file name inside a project directory
pub const SNAPSHOT_FILE: &str = "timeline.json";

// =============================================================================
// Snapshot Data
// =============================================================================

/// On-disk snapshot layout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotData {
    /// Snapshot format version for migrations
    pub version: String,
    /// Timestamp when snapshot was created (ISO 8601)
    pub created_at: String,
    /// Full timeline state
    pub timeline: TimelineState,
}

// =============================================================================
// Snapshot Manager
// =============================================================================

/// Saves and loads timeline snapshots
pub struct Snapshot;

impl Snapshot {
    /// Default snapshot path for a project directory
    pub fn default_path(project_dir: &Path) -> PathBuf {
        project_dir.join(SNAPSHOT_FILE)
    }

    /// Saves a timeline snapshot atomically
    pub fn save(path: &Path, state: &TimelineState) -> CoreResult<()> {
        let data = SnapshotData {
            version: SNAPSHOT_VERSION.to_string(),
            created_at: now_rfc3339(),
            timeline: state.clone(),
        };
        atomic_write_json_pretty(path, &data)?;

        info!(
            "Saved timeline snapshot to {:?} ({} tracks, {} clips)",
            path,
            state.tracks.len(),
            state.clip_count()
        );
        Ok(())
    }

    /// Loads a timeline snapshot
    pub fn load(path: &Path) -> CoreResult<TimelineState> {
        if !path.exists() {
            return Err(CoreError::SnapshotNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        let data: SnapshotData = read_json(path)?;
        if !data.version.starts_with("1.") {
            return Err(CoreError::UnsupportedSnapshotVersion(data.version));
        }

        info!("Loaded timeline snapshot from {:?}", path);
        Ok(data.timeline)
    }

    /// Checks if a snapshot file exists
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }
}
