//! Invariant Tests for Timeline Edits
//!
//! Drives mixed op sequences through the model and checks the properties
//! every resulting state must hold, whatever order the edits arrive in.

use std::collections::BTreeSet;

use crate::core::commands::{TimelineOp, TimelineStore};
use crate::core::settings::{StudioSettings, TimelineSettings};
use crate::core::timeline::{
    calculate_total_duration, validate_timeline, ClipContent, ClipData, TimelineState, TrackKind,
    MIN_TIMELINE_DURATION_SEC,
};

fn timeline() -> TimelineState {
    TimelineState::create_default(&TimelineSettings::default())
}

fn track_id(state: &TimelineState, kind: TrackKind) -> String {
    state
        .tracks
        .iter()
        .find(|t| t.kind == kind)
        .map(|t| t.id.clone())
        .unwrap()
}

fn assert_invariants(state: &TimelineState) {
    for track in &state.tracks {
        for clip in &track.clips {
            assert_eq!(clip.end_time, clip.start_time + clip.duration, "clip {}", clip.id);
            assert_eq!(clip.track_id, track.id, "clip {}", clip.id);
            assert_eq!(clip.kind, track.kind, "clip {}", clip.id);
        }
    }

    assert!(state.total_duration >= MIN_TIMELINE_DURATION_SEC);
    let latest_end = state.clips().map(|c| c.end_time).fold(0.0, f64::max);
    assert!(state.total_duration >= latest_end);

    let ids: BTreeSet<&str> = state.clips().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), state.clip_count(), "clip ids must be unique");
    for selected in &state.selected_clip_ids {
        assert!(ids.contains(selected.as_str()), "dangling selection {}", selected);
    }
}

/// A sequence touching every structural op
fn scripted_ops(state: &TimelineState) -> Vec<TimelineOp> {
    let video = track_id(state, TrackKind::Video);
    let audio = track_id(state, TrackKind::Audio);
    let text = track_id(state, TrackKind::Text);

    vec![
        TimelineOp::AddClip {
            track_id: video.clone(),
            clip: ClipData::titled("Intro")
                .with_id("v1")
                .at(0.0)
                .lasting(10.0)
                .with_content(ClipContent::media("intro.mp4")),
        },
        TimelineOp::AddClip {
            track_id: video.clone(),
            clip: ClipData::titled("Body").with_id("v2").at(4.0).lasting(8.0),
        },
        TimelineOp::AddClip {
            track_id: audio.clone(),
            clip: ClipData::titled("Music").with_id("a1").at(2.5).lasting(20.0),
        },
        TimelineOp::AddClip {
            track_id: text.clone(),
            clip: ClipData::titled("Caption")
                .with_id("t1")
                .at(1.0)
                .lasting(3.0)
                .with_content(ClipContent::text("Hello")),
        },
        TimelineOp::SelectClips {
            clip_ids: vec!["v1".into(), "a1".into(), "ghost".into()],
        },
        TimelineOp::SplitClip {
            clip_id: "v1".into(),
            split_time: 6.0,
        },
        TimelineOp::DuplicateClip {
            clip_id: "v2".into(),
            offset: 1.0,
        },
        TimelineOp::MoveClip {
            clip_id: "t1".into(),
            new_track_id: text,
            new_start_time: 70.0,
        },
        TimelineOp::AutoSyncAudio,
        TimelineOp::SelectClips {
            clip_ids: vec!["a1".into(), "v1-2".into()],
        },
        TimelineOp::RemoveClip {
            clip_id: "a1".into(),
        },
        TimelineOp::AddTrack {
            kind: TrackKind::Audio,
            name: None,
        },
        TimelineOp::RemoveTrack { track_id: audio },
        TimelineOp::MoveClip {
            clip_id: "v2".into(),
            new_track_id: video,
            new_start_time: 0.0,
        },
    ]
}

#[test]
fn test_invariants_hold_after_every_op() {
    let mut state = timeline();
    assert_invariants(&state);

    for op in scripted_ops(&state) {
        state = op.apply(&state).state;
        assert_invariants(&state);
    }
}

#[test]
fn test_scripted_sequence_end_state() {
    let mut state = timeline();
    for op in scripted_ops(&state) {
        state = op.apply(&state).state;
    }

    // Split halves keep their spans.
    let first = state.find_clip("v1-1").unwrap();
    let second = state.find_clip("v1-2").unwrap();
    assert_eq!((first.start_time, first.end_time), (0.0, 6.0));
    assert_eq!((second.start_time, second.end_time), (6.0, 10.0));
    assert!(state.find_clip("v1").is_none());

    // The caption moved past the 60 second floor and raised the total.
    assert_eq!(state.find_clip("t1").unwrap().start_time, 70.0);
    assert_eq!(state.total_duration, 73.0);

    // Removing the audio track took its clips out of the selection.
    assert!(state.find_clip("a1").is_none());
    assert_eq!(
        state.selected_clip_ids.iter().cloned().collect::<Vec<_>>(),
        vec!["v1-2".to_string()]
    );
    assert_eq!(state.track_count(TrackKind::Audio), 1);
}

#[test]
fn test_removing_clips_never_lowers_total_duration() {
    let state = timeline();
    let video = track_id(&state, TrackKind::Video);
    let state = state.add_clip_to_track(
        &video,
        ClipData::titled("Long").with_id("c").at(90.0).lasting(10.0),
    );
    assert_eq!(state.total_duration, 100.0);

    let state = state.remove_clip("c");
    assert_eq!(state.total_duration, 100.0);
    assert_eq!(calculate_total_duration(&state.tracks), MIN_TIMELINE_DURATION_SEC);
}

#[test]
fn test_missing_ids_leave_state_unchanged() {
    let state = timeline();
    let ops = vec![
        TimelineOp::RemoveTrack {
            track_id: "nope".into(),
        },
        TimelineOp::AddClip {
            track_id: "nope".into(),
            clip: ClipData::default(),
        },
        TimelineOp::RemoveClip {
            clip_id: "nope".into(),
        },
        TimelineOp::MoveClip {
            clip_id: "nope".into(),
            new_track_id: track_id(&state, TrackKind::Video),
            new_start_time: 1.0,
        },
        TimelineOp::SplitClip {
            clip_id: "nope".into(),
            split_time: 1.0,
        },
        TimelineOp::DuplicateClip {
            clip_id: "nope".into(),
            offset: 1.0,
        },
    ];

    for op in ops {
        let outcome = op.apply(&state);
        assert!(!outcome.changed, "{} should not change state", op.type_name());
        assert_eq!(outcome.state, state);
    }
}

#[test]
fn test_timeline_json_round_trip() {
    let mut state = timeline();
    for op in scripted_ops(&state) {
        state = op.apply(&state).state;
    }

    let json = serde_json::to_string(&state).unwrap();
    let parsed: TimelineState = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, state);

    let value = serde_json::to_value(&state).unwrap();
    assert!(value.get("totalDuration").is_some());
    assert!(value.get("selectedClipIds").is_some());
    assert_eq!(value["tracks"][0]["type"], "video");
}

#[test]
fn test_store_replay_matches_direct_application() {
    let store = TimelineStore::from_settings(&StudioSettings::default());
    let start = store.snapshot().unwrap();
    let ops = scripted_ops(&start);

    let mut direct = start.clone();
    for op in &ops {
        direct = op.apply(&direct).state;
    }
    store.dispatch_all(&ops).unwrap();
    let replayed = store.snapshot().unwrap();

    // Fresh ids and timestamps differ between runs; compare the layout.
    let layout = |s: &TimelineState| -> Vec<(String, usize, Vec<(f64, f64)>)> {
        s.tracks
            .iter()
            .map(|t| {
                (
                    t.name.clone(),
                    t.clips.len(),
                    t.clips.iter().map(|c| (c.start_time, c.end_time)).collect(),
                )
            })
            .collect()
    };
    assert_eq!(layout(&replayed), layout(&direct));
    assert_eq!(replayed.total_duration, direct.total_duration);

    while store.can_undo() {
        store.undo().unwrap();
    }
    assert_eq!(store.snapshot().unwrap().clip_count(), 0);
}

#[test]
fn test_validation_after_scripted_sequence() {
    let mut state = timeline();
    for op in scripted_ops(&state) {
        state = op.apply(&state).state;
    }

    let report = validate_timeline(&state);
    assert!(report.errors.is_empty());
    // Every clip except the split intro and the caption lacks media.
    assert!(report
        .warnings
        .iter()
        .any(|w| w.ends_with("clip(s) missing media content")));
}
