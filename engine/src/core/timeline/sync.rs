//! Audio Auto-Sync
//!
//! Snaps audio clips onto the start of the video clip they overlap.

use tracing::debug;

use crate::core::TimeSec;

use super::models::{TimelineState, TrackKind};

impl TimelineState {
    /// For every video clip, in track order, any audio clip overlapping it is
    /// moved to start with it (duration kept, end rederived).
    ///
    /// Single pass with no conflict resolution afterwards: two audio clips
    /// snapped to the same video clip end up overlapping each other.
    pub fn auto_sync_audio(&self) -> Self {
        let video_spans: Vec<(TimeSec, TimeSec)> = self
            .tracks
            .iter()
            .filter(|t| t.kind == TrackKind::Video)
            .flat_map(|t| t.clips.iter())
            .filter(|c| c.kind == TrackKind::Video)
            .map(|c| (c.start_time, c.end_time))
            .collect();

        let mut next = self.clone();
        for (video_start, video_end) in video_spans {
            let audio_clips = next
                .tracks
                .iter_mut()
                .filter(|t| t.kind == TrackKind::Audio)
                .flat_map(|t| t.clips.iter_mut())
                .filter(|c| c.kind == TrackKind::Audio);

            for clip in audio_clips {
                if clip.overlaps_range(video_start, video_end) && clip.start_time != video_start {
                    debug!(
                        "Syncing audio clip {} from {:.3}s to {:.3}s",
                        clip.id, clip.start_time, video_start
                    );
                    clip.place_at(video_start);
                }
            }
        }

        next.raise_total_duration();
        next
    }
}
