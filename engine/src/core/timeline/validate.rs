//! Timeline Validation
//!
//! Read-only diagnostics. Overlaps, reused clip ids and missing media are
//! reported as warnings; nothing currently populates `errors`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::models::TimelineState;

/// Result of [`validate_timeline`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// True when there is nothing to report
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Checks every track for overlapping neighbours, flags clip ids used more
/// than once, and counts clips that have neither a media URL nor text.
pub fn validate_timeline(state: &TimelineState) -> ValidationReport {
    let mut report = ValidationReport::default();

    for track in &state.tracks {
        let mut clips: Vec<_> = track.clips.iter().collect();
        clips.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        for pair in clips.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            if current.end_time > next.start_time {
                report.warnings.push(format!(
                    "Overlapping clips on track \"{}\": \"{}\" and \"{}\"",
                    track.name, current.title, next.title
                ));
            }
        }
    }

    // Edits never reuse an id, but a hand-written or merged snapshot can.
    let mut seen = BTreeSet::new();
    let duplicates: BTreeSet<&str> = state
        .clips()
        .map(|c| c.id.as_str())
        .filter(|id| !seen.insert(*id))
        .collect();
    for id in duplicates {
        report
            .warnings
            .push(format!("Clip id \"{}\" is used by more than one clip", id));
    }

    let missing_media = state.clips().filter(|c| !c.content.has_media()).count();
    if missing_media > 0 {
        report
            .warnings
            .push(format!("{} clip(s) missing media content", missing_media));
    }

    report
}
