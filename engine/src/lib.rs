//! Media Studio Timeline Engine
//!
//! Non-linear clip/track editing model used by the Media Studio.
//! Every editing operation is a pure transition from one [`TimelineState`]
//! to the next; persistence, rendering and media generation live outside
//! this crate and talk to it through plain data.
//!
//! [`TimelineState`]: core::timeline::TimelineState

pub mod core;

pub use crate::core::{
    commands::{EditOutcome, TimelineOp, TimelineStore},
    project::Snapshot,
    settings::{SettingsManager, StudioSettings, TimelineSettings},
    timeline::{
        calculate_total_duration, create_default_timeline, validate_timeline, Clip, ClipContent,
        ClipData, ClipEffect, ClipMetadata, ClipUpdate, TimelineState, Track, TrackKind,
        ValidationReport,
    },
    CoreError, CoreResult,
};
