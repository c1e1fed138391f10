//! Timeline Operation Definitions
//!
//! Every model mutator as a serializable value, so edits can be queued,
//! logged, replayed from a script, or dispatched through a store.

use serde::{Deserialize, Serialize};

use crate::core::{
    timeline::{ClipData, ClipUpdate, TimelineState, TrackKind, DEFAULT_DUPLICATE_OFFSET_SEC},
    ClipId, TimeSec, TrackId,
};

/// One edit against a [`TimelineState`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TimelineOp {
    AddTrack {
        #[serde(rename = "type")]
        kind: TrackKind,
        #[serde(default)]
        name: Option<String>,
    },
    RemoveTrack {
        track_id: TrackId,
    },
    AddClip {
        track_id: TrackId,
        #[serde(default)]
        clip: ClipData,
    },
    RemoveClip {
        clip_id: ClipId,
    },
    UpdateClip {
        clip_id: ClipId,
        updates: ClipUpdate,
    },
    MoveClip {
        clip_id: ClipId,
        new_track_id: TrackId,
        new_start_time: TimeSec,
    },
    SplitClip {
        clip_id: ClipId,
        split_time: TimeSec,
    },
    DuplicateClip {
        clip_id: ClipId,
        #[serde(default = "default_duplicate_offset")]
        offset: TimeSec,
    },
    AutoSyncAudio,
    SelectClips {
        clip_ids: Vec<ClipId>,
    },
    SetCurrentTime {
        time: TimeSec,
    },
    SetPlaying {
        is_playing: bool,
    },
    SetZoom {
        zoom: f64,
    },
}

fn default_duplicate_offset() -> TimeSec {
    DEFAULT_DUPLICATE_OFFSET_SEC
}

/// Result of applying an op: the new state and whether it differs from the input.
///
/// `changed == false` covers both "nothing to do" and "id not found".
#[derive(Clone, Debug, PartialEq)]
pub struct EditOutcome {
    pub state: TimelineState,
    pub changed: bool,
}

impl TimelineOp {
    /// Applies the op to `state` without modifying it
    pub fn apply(&self, state: &TimelineState) -> EditOutcome {
        let next = match self {
            TimelineOp::AddTrack { kind, name } => state.add_track(*kind, name.as_deref()),
            TimelineOp::RemoveTrack { track_id } => state.remove_track(track_id),
            TimelineOp::AddClip { track_id, clip } => {
                state.add_clip_to_track(track_id, clip.clone())
            }
            TimelineOp::RemoveClip { clip_id } => state.remove_clip(clip_id),
            TimelineOp::UpdateClip { clip_id, updates } => {
                state.update_clip(clip_id, updates.clone())
            }
            TimelineOp::MoveClip {
                clip_id,
                new_track_id,
                new_start_time,
            } => state.move_clip(clip_id, new_track_id, *new_start_time),
            TimelineOp::SplitClip {
                clip_id,
                split_time,
            } => state.split_clip(clip_id, *split_time),
            TimelineOp::DuplicateClip { clip_id, offset } => state.duplicate_clip(clip_id, *offset),
            TimelineOp::AutoSyncAudio => state.auto_sync_audio(),
            TimelineOp::SelectClips { clip_ids } => state.select_clips(clip_ids),
            TimelineOp::SetCurrentTime { time } => state.set_current_time(*time),
            TimelineOp::SetPlaying { is_playing } => state.set_playing(*is_playing),
            TimelineOp::SetZoom { zoom } => state.set_zoom(*zoom),
        };

        let changed = next != *state;
        EditOutcome {
            state: next,
            changed,
        }
    }

    /// Op type name, used for logging
    pub fn type_name(&self) -> &'static str {
        match self {
            TimelineOp::AddTrack { .. } => "AddTrack",
            TimelineOp::RemoveTrack { .. } => "RemoveTrack",
            TimelineOp::AddClip { .. } => "AddClip",
            TimelineOp::RemoveClip { .. } => "RemoveClip",
            TimelineOp::UpdateClip { .. } => "UpdateClip",
            TimelineOp::MoveClip { .. } => "MoveClip",
            TimelineOp::SplitClip { .. } => "SplitClip",
            TimelineOp::DuplicateClip { .. } => "DuplicateClip",
            TimelineOp::AutoSyncAudio => "AutoSyncAudio",
            TimelineOp::SelectClips { .. } => "SelectClips",
            TimelineOp::SetCurrentTime { .. } => "SetCurrentTime",
            TimelineOp::SetPlaying { .. } => "SetPlaying",
            TimelineOp::SetZoom { .. } => "SetZoom",
        }
    }

    /// True for ops that only touch transport/view/selection state
    pub fn is_view_only(&self) -> bool {
        matches!(
            self,
            TimelineOp::SelectClips { .. }
                | TimelineOp::SetCurrentTime { .. }
                | TimelineOp::SetPlaying { .. }
                | TimelineOp::SetZoom { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::TimelineSettings;

    fn timeline() -> TimelineState {
        TimelineState::create_default(&TimelineSettings::default())
    }

    #[test]
    fn test_op_deserialization() {
        let json = r#"[
            {"op": "addTrack", "type": "audio"},
            {"op": "addClip", "trackId": "t1", "clip": {"title": "Intro", "duration": 3}},
            {"op": "moveClip", "clipId": "c1", "newTrackId": "t2", "newStartTime": 4.5},
            {"op": "duplicateClip", "clipId": "c1"},
            {"op": "autoSyncAudio"}
        ]"#;
        let ops: Vec<TimelineOp> = serde_json::from_str(json).unwrap();

        assert_eq!(
            ops[0],
            TimelineOp::AddTrack {
                kind: TrackKind::Audio,
                name: None
            }
        );
        assert!(matches!(&ops[1], TimelineOp::AddClip { clip, .. } if clip.duration == Some(3.0)));
        assert!(matches!(
            &ops[2],
            TimelineOp::MoveClip { new_start_time, .. } if *new_start_time == 4.5
        ));
        assert!(matches!(&ops[3], TimelineOp::DuplicateClip { offset, .. } if *offset == 1.0));
        assert_eq!(ops[4], TimelineOp::AutoSyncAudio);
    }

    #[test]
    fn test_op_serialization_tag() {
        let op = TimelineOp::SplitClip {
            clip_id: "c1".to_string(),
            split_time: 2.0,
        };
        let value = serde_json::to_value(&op).unwrap();

        assert_eq!(value["op"], "splitClip");
        assert_eq!(value["clipId"], "c1");
        assert_eq!(value["splitTime"], 2.0);
    }

    #[test]
    fn test_apply_reports_change() {
        let state = timeline();
        let outcome = TimelineOp::AddTrack {
            kind: TrackKind::Text,
            name: None,
        }
        .apply(&state);

        assert!(outcome.changed);
        assert_eq!(outcome.state.tracks.len(), 4);
    }

    #[test]
    fn test_apply_reports_noop_for_missing_ids() {
        let state = timeline();
        let ops = [
            TimelineOp::RemoveTrack {
                track_id: "missing".to_string(),
            },
            TimelineOp::AddClip {
                track_id: "missing".to_string(),
                clip: ClipData::default(),
            },
            TimelineOp::RemoveClip {
                clip_id: "missing".to_string(),
            },
            TimelineOp::UpdateClip {
                clip_id: "missing".to_string(),
                updates: ClipUpdate::default(),
            },
            TimelineOp::SplitClip {
                clip_id: "missing".to_string(),
                split_time: 1.0,
            },
            TimelineOp::DuplicateClip {
                clip_id: "missing".to_string(),
                offset: 1.0,
            },
            TimelineOp::AutoSyncAudio,
        ];

        for op in ops {
            let outcome = op.apply(&state);
            assert!(!outcome.changed, "{} should be a no-op", op.type_name());
            assert_eq!(outcome.state, state);
        }
    }

    #[test]
    fn test_view_only_ops() {
        assert!(TimelineOp::SetZoom { zoom: 2.0 }.is_view_only());
        assert!(!TimelineOp::AutoSyncAudio.is_view_only());
    }
}
