//! Timeline Model Definitions
//!
//! Defines TimelineState, Track, Clip and related types for the Media Studio
//! timeline. Tracks own their clips directly; a clip's `track_id` is only a
//! lookup key back to the owning track.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{new_id, now_rfc3339, ClipId, EffectId, TimeSec, TrackId};

/// Lower bound for `TimelineState::total_duration`, in seconds.
pub const MIN_TIMELINE_DURATION_SEC: TimeSec = 60.0;

/// Duration given to a new clip when the caller does not supply one.
pub const DEFAULT_CLIP_DURATION_SEC: TimeSec = 5.0;

/// Gap inserted between a clip and its duplicate.
pub const DEFAULT_DUPLICATE_OFFSET_SEC: TimeSec = 1.0;

/// Zoom limits shared with the editor settings.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

// =============================================================================
// Track Kind
// =============================================================================

/// Track type/kind enumeration. Fixed for the lifetime of a track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Text,
}

impl TrackKind {
    /// All kinds, in default stacking order
    pub const ALL: [TrackKind; 3] = [TrackKind::Video, TrackKind::Audio, TrackKind::Text];

    /// Capitalized label used in default names ("Video Track 2")
    pub fn label(&self) -> &'static str {
        match self {
            TrackKind::Video => "Video",
            TrackKind::Audio => "Audio",
            TrackKind::Text => "Text",
        }
    }

    /// Lowercase key used in ids and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Text => "text",
        }
    }

    /// Default lane color for this kind
    pub fn default_color(&self) -> &'static str {
        match self {
            TrackKind::Video => "#3b82f6",
            TrackKind::Audio => "#10b981",
            TrackKind::Text => "#f59e0b",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TrackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(TrackKind::Video),
            "audio" => Ok(TrackKind::Audio),
            "text" => Ok(TrackKind::Text),
            other => Err(format!("Unknown track type: {}", other)),
        }
    }
}

// =============================================================================
// Clip Content, Effects and Metadata
// =============================================================================

/// Free-form clip payload. Known keys are typed; anything else the front end
/// stores rides along in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ClipContent {
    pub fn media(url: &str) -> Self {
        Self {
            media_url: Some(url.to_string()),
            ..Self::default()
        }
    }

    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// True when the clip has either a media URL or text to show.
    /// Empty strings count as missing.
    pub fn has_media(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.media_url) || present(&self.text)
    }
}

/// Effect applied to a clip
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipEffect {
    pub id: EffectId,
    #[serde(rename = "type")]
    pub effect_type: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ClipEffect {
    pub fn new(effect_type: &str) -> Self {
        Self {
            id: new_id(),
            effect_type: effect_type.to_string(),
            parameters: BTreeMap::new(),
            enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Bookkeeping carried by every clip
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipMetadata {
    /// ISO 8601 creation time
    pub created_at: String,
    /// ISO 8601 time of the last edit
    pub modified_at: String,
    /// Whether the content came from a generation service
    #[serde(default)]
    pub ai_generated: bool,
    /// Name of the generation service, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_used: Option<String>,
}

impl ClipMetadata {
    pub fn now() -> Self {
        let now = now_rfc3339();
        Self {
            created_at: now.clone(),
            modified_at: now,
            ai_generated: false,
            service_used: None,
        }
    }
}

impl Default for ClipMetadata {
    fn default() -> Self {
        Self::now()
    }
}

// =============================================================================
// Clip
// =============================================================================

/// Clip (timed unit of content on exactly one track)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: ClipId,
    /// Owning track, lookup key only
    pub track_id: TrackId,
    /// Mirrors the owning track's kind
    #[serde(rename = "type")]
    pub kind: TrackKind,
    pub title: String,
    pub start_time: TimeSec,
    pub duration: TimeSec,
    /// Always `start_time + duration` after any mutator that places the clip
    pub end_time: TimeSec,
    #[serde(default)]
    pub content: ClipContent,
    #[serde(default)]
    pub effects: Vec<ClipEffect>,
    pub metadata: ClipMetadata,
}

impl Clip {
    /// Creates a clip spanning `[start_time, start_time + duration)`
    pub fn new(
        track_id: &str,
        kind: TrackKind,
        title: &str,
        start_time: TimeSec,
        duration: TimeSec,
    ) -> Self {
        Self {
            id: new_id(),
            track_id: track_id.to_string(),
            kind,
            title: title.to_string(),
            start_time,
            duration,
            end_time: start_time + duration,
            content: ClipContent::default(),
            effects: vec![],
            metadata: ClipMetadata::now(),
        }
    }

    /// Moves the clip start and rederives the end
    pub fn place_at(&mut self, start_time: TimeSec) {
        self.start_time = start_time;
        self.end_time = start_time + self.duration;
    }

    /// Half-open overlap test against `[start, end)`
    pub fn overlaps_range(&self, start: TimeSec, end: TimeSec) -> bool {
        start < self.end_time && end > self.start_time
    }

    /// Half-open overlap test against another clip
    pub fn overlaps(&self, other: &Clip) -> bool {
        self.overlaps_range(other.start_time, other.end_time)
    }

    /// Refreshes `metadata.modified_at`
    pub fn touch(&mut self) {
        self.metadata.modified_at = now_rfc3339();
    }
}

// =============================================================================
// Track
// =============================================================================

/// Track (typed lane that owns its clips)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    #[serde(rename = "type")]
    pub kind: TrackKind,
    pub name: String,
    pub height: u32,
    pub color: String,
    pub locked: bool,
    pub visible: bool,
    pub clips: Vec<Clip>,
}

impl Track {
    /// Creates an empty, unlocked, visible track with the kind's default color
    pub fn new(kind: TrackKind, name: &str, height: u32) -> Self {
        Self {
            id: format!("{}-{}", kind.as_str(), new_id().to_ascii_lowercase()),
            kind,
            name: name.to_string(),
            height,
            color: kind.default_color().to_string(),
            locked: false,
            visible: true,
            clips: vec![],
        }
    }

    pub fn get_clip(&self, clip_id: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    /// Latest end time on this track, 0 when empty
    pub fn end_time(&self) -> TimeSec {
        self.clips.iter().map(|c| c.end_time).fold(0.0, f64::max)
    }

    /// Sorts clips by start time, ties broken by id for determinism
    pub fn sort_clips(&mut self) {
        self.clips.sort_by(|a, b| {
            a.start_time
                .total_cmp(&b.start_time)
                .then_with(|| a.id.cmp(&b.id))
        });
    }
}

// =============================================================================
// Timeline State
// =============================================================================

/// Root value of the editing model. Every operation takes `&self` and
/// returns a new state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineState {
    /// Visual stacking order
    pub tracks: Vec<Track>,
    /// Seconds; at least 60 and at least every clip's end time
    pub total_duration: TimeSec,
    /// Playhead time, never negative
    pub current_time: TimeSec,
    pub zoom: f64,
    pub scroll_left: f64,
    pub playhead_position: f64,
    pub is_playing: bool,
    /// Only ever references existing clips
    pub selected_clip_ids: BTreeSet<ClipId>,
    pub snap_to_grid: bool,
    pub grid_size: f64,
}

impl TimelineState {
    /// Gets a track by ID
    pub fn find_track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    pub(crate) fn find_track_mut(&mut self, track_id: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == track_id)
    }

    /// Gets a clip by ID across all tracks
    pub fn find_clip(&self, clip_id: &str) -> Option<&Clip> {
        self.tracks.iter().find_map(|t| t.get_clip(clip_id))
    }

    pub(crate) fn find_clip_mut(&mut self, clip_id: &str) -> Option<&mut Clip> {
        self.tracks
            .iter_mut()
            .find_map(|t| t.clips.iter_mut().find(|c| c.id == clip_id))
    }

    /// Index of the track holding the clip
    pub(crate) fn track_index_of_clip(&self, clip_id: &str) -> Option<usize> {
        self.tracks
            .iter()
            .position(|t| t.clips.iter().any(|c| c.id == clip_id))
    }

    /// Iterates over every clip in every track
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tracks.iter().flat_map(|t| t.clips.iter())
    }

    /// Number of clips across all tracks
    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(|t| t.clips.len()).sum()
    }

    /// Number of tracks of the given kind
    pub fn track_count(&self, kind: TrackKind) -> usize {
        self.tracks.iter().filter(|t| t.kind == kind).count()
    }
}

// =============================================================================
// Operation Inputs
// =============================================================================

/// Partial clip description accepted by `add_clip_to_track`.
///
/// `kind` and `end_time` are accepted for shape compatibility but never
/// trusted: the track decides the kind and the end is always rederived.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipData {
    pub id: Option<ClipId>,
    #[serde(rename = "type")]
    pub kind: Option<TrackKind>,
    pub title: Option<String>,
    pub start_time: Option<TimeSec>,
    pub duration: Option<TimeSec>,
    pub end_time: Option<TimeSec>,
    pub content: Option<ClipContent>,
    pub effects: Option<Vec<ClipEffect>>,
    pub metadata: Option<ClipMetadata>,
}

impl ClipData {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn at(mut self, start_time: TimeSec) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn lasting(mut self, duration: TimeSec) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_content(mut self, content: ClipContent) -> Self {
        self.content = Some(content);
        self
    }
}

/// Field-wise metadata update
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipMetadataUpdate {
    pub ai_generated: Option<bool>,
    pub service_used: Option<String>,
}

/// Shallow merge applied by `update_clip`.
///
/// Timing fields are copied verbatim; callers changing `start_time` or
/// `duration` must send a matching `end_time`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipUpdate {
    pub title: Option<String>,
    pub start_time: Option<TimeSec>,
    pub duration: Option<TimeSec>,
    pub end_time: Option<TimeSec>,
    pub content: Option<ClipContent>,
    pub effects: Option<Vec<ClipEffect>>,
    pub metadata: Option<ClipMetadataUpdate>,
}

impl ClipUpdate {
    pub(crate) fn apply_to(self, clip: &mut Clip) {
        if let Some(title) = self.title {
            clip.title = title;
        }
        if let Some(start_time) = self.start_time {
            clip.start_time = start_time;
        }
        if let Some(duration) = self.duration {
            clip.duration = duration;
        }
        if let Some(end_time) = self.end_time {
            clip.end_time = end_time;
        }
        if let Some(content) = self.content {
            clip.content = content;
        }
        if let Some(effects) = self.effects {
            clip.effects = effects;
        }
        if let Some(meta) = self.metadata {
            if let Some(ai_generated) = meta.ai_generated {
                clip.metadata.ai_generated = ai_generated;
            }
            if meta.service_used.is_some() {
                clip.metadata.service_used = meta.service_used;
            }
        }
        clip.touch();
    }
}

// =============================================================================
// Tests
// =============================================================================
