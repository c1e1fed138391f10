//! Settings Persistence System
//!
//! Provides persistent studio settings with:
//! - Atomic file writes (temp file + rename)
//! - Defaults for every missing field
//! - Normalization instead of hard failures
//!
//! Storage location: {config_dir}/settings.json

use std::fs;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::{fs::atomic_write_json_pretty, CoreError, CoreResult};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.json";

/// Lock file name (advisory lock to prevent concurrent writers)
pub const SETTINGS_LOCK_FILE: &str = "settings.json.lock";

/// Undo steps kept when settings do not say otherwise
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Studio settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudioSettings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Defaults for new timelines
    #[serde(default)]
    pub timeline: TimelineSettings,

    /// Editing behaviour
    #[serde(default)]
    pub editor: EditorSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            timeline: TimelineSettings::default(),
            editor: EditorSettings::default(),
        }
    }
}

impl StudioSettings {
    /// Normalizes and clamps settings so persisted state is always valid.
    ///
    /// Bad values are corrected rather than rejected, so an old or
    /// hand-edited file never blocks a session.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;

        self.timeline.default_track_height = self.timeline.default_track_height.clamp(20, 400);
        self.timeline.default_zoom = clamp_f64(self.timeline.default_zoom, 0.1, 10.0);
        self.timeline.grid_size = clamp_f64(self.timeline.grid_size, 0.01, 60.0);
        self.timeline.minimum_duration = clamp_f64(self.timeline.minimum_duration, 1.0, 86_400.0);

        self.editor.history_limit = self.editor.history_limit.clamp(1, 1000);
        self.editor.duplicate_offset = clamp_f64(self.editor.duplicate_offset, 0.0, 60.0);
    }
}

fn clamp_f64(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return min;
    }
    value.clamp(min, max)
}

/// Defaults applied when a timeline is created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSettings {
    /// Track lane height in pixels
    #[serde(default = "default_track_height")]
    pub default_track_height: u32,

    /// Initial zoom level (1.0 = 100%)
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    /// Snap to grid enabled
    #[serde(default = "default_true")]
    pub snap_to_grid: bool,

    /// Grid spacing in seconds
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,

    /// Shortest timeline shown, in seconds. Informational: the model floor
    /// stays at 60 seconds.
    #[serde(default = "default_minimum_duration")]
    pub minimum_duration: f64,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            default_track_height: default_track_height(),
            default_zoom: default_zoom(),
            snap_to_grid: true,
            grid_size: default_grid_size(),
            minimum_duration: default_minimum_duration(),
        }
    }
}

fn default_track_height() -> u32 {
    60
}

fn default_zoom() -> f64 {
    1.0
}

fn default_grid_size() -> f64 {
    1.0
}

fn default_minimum_duration() -> f64 {
    60.0
}

fn default_true() -> bool {
    true
}

/// Editor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    /// Undo steps kept by the timeline store
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Gap in seconds between a clip and its duplicate
    #[serde(default = "default_duplicate_offset")]
    pub duplicate_offset: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            duplicate_offset: default_duplicate_offset(),
        }
    }
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_duplicate_offset() -> f64 {
    1.0
}

// =============================================================================
// Settings Manager
// =============================================================================

/// Settings manager for loading, saving, and resetting settings
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Create a new settings manager rooted at the given config directory
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            settings_path: config_dir.as_ref().join(SETTINGS_FILE),
        }
    }

    /// Create a settings manager for an explicit settings file
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: path.into(),
        }
    }

    fn lock_path(&self) -> PathBuf {
        self.settings_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SETTINGS_LOCK_FILE)
    }

    fn with_lock<T>(&self, exclusive: bool, op: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
        // Ensure parent directory exists so the lock file can be created.
        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;

        let locked = if exclusive {
            fs2::FileExt::lock_exclusive(&lock_file)
        } else {
            fs2::FileExt::lock_shared(&lock_file)
        };
        locked.map_err(|e| CoreError::SettingsError(format!("Failed to lock settings: {}", e)))?;

        let result = op();

        if let Err(e) = fs2::FileExt::unlock(&lock_file) {
            warn!("Failed to unlock settings lock file: {}", e);
        }

        result
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, returning defaults if the file is missing or unreadable
    pub fn load(&self) -> StudioSettings {
        let result = self.with_lock(false, || {
            if !self.settings_path.exists() {
                info!("Settings file not found, using defaults");
                return Ok(StudioSettings::default());
            }

            let content = fs::read_to_string(&self.settings_path)?;
            let mut settings = serde_json::from_str::<StudioSettings>(&content)?;

            if settings.version < SETTINGS_VERSION {
                info!(
                    "Migrating settings from version {} to {}",
                    settings.version, SETTINGS_VERSION
                );
            }

            settings.normalize();
            Ok(settings)
        });

        match result {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                StudioSettings::default()
            }
        }
    }

    /// Save settings to disk using atomic write, returning what was stored
    pub fn save(&self, settings: &StudioSettings) -> CoreResult<StudioSettings> {
        self.with_lock(true, || {
            let mut normalized = settings.clone();
            normalized.normalize();

            atomic_write_json_pretty(&self.settings_path, &normalized)?;

            info!("Settings saved to {:?}", self.settings_path);
            Ok(normalized)
        })
    }

    /// Reset settings to defaults and delete the settings file
    pub fn reset(&self) -> CoreResult<StudioSettings> {
        self.with_lock(true, || {
            if self.settings_path.exists() {
                fs::remove_file(&self.settings_path)?;
                info!("Settings file deleted");
            }
            Ok(StudioSettings::default())
        })
    }
}
