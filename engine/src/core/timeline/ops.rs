//! Timeline Edit Operations
//!
//! State transitions over [`TimelineState`]. Each operation clones the input,
//! edits the copy and returns it. A missing id or an invalid argument yields
//! an unchanged copy rather than an error.

use tracing::debug;

use crate::core::{new_id, settings::TimelineSettings, TimeSec};

use super::models::{
    Clip, ClipData, ClipMetadata, ClipUpdate, TimelineState, Track, TrackKind,
    DEFAULT_CLIP_DURATION_SEC, MAX_ZOOM, MIN_TIMELINE_DURATION_SEC, MIN_ZOOM,
};

/// Total duration for a set of tracks: the latest clip end, never below 60s.
pub fn calculate_total_duration(tracks: &[Track]) -> TimeSec {
    tracks
        .iter()
        .flat_map(|t| t.clips.iter())
        .map(|c| c.end_time)
        .fold(MIN_TIMELINE_DURATION_SEC, f64::max)
}

/// Creates the session's starting timeline: one empty video, audio and text track.
pub fn create_default_timeline(settings: &TimelineSettings) -> TimelineState {
    TimelineState::create_default(settings)
}

/// First start time at or after `requested` where `duration` fits between
/// `others` (which must be sorted by start time).
fn forward_gap_search(others: &[&Clip], requested: TimeSec, duration: TimeSec) -> TimeSec {
    let mut candidate = requested;
    for clip in others {
        if clip.start_time >= candidate + duration {
            break;
        }
        if clip.overlaps_range(candidate, candidate + duration) {
            candidate = clip.end_time;
        }
    }
    candidate
}

impl TimelineState {
    /// Creates a timeline seeded with one track of each kind
    pub fn create_default(settings: &TimelineSettings) -> Self {
        let tracks = TrackKind::ALL
            .iter()
            .map(|kind| {
                Track::new(
                    *kind,
                    &format!("{} Track 1", kind.label()),
                    settings.default_track_height,
                )
            })
            .collect();

        Self {
            tracks,
            total_duration: MIN_TIMELINE_DURATION_SEC,
            current_time: 0.0,
            zoom: settings.default_zoom,
            scroll_left: 0.0,
            playhead_position: 0.0,
            is_playing: false,
            selected_clip_ids: Default::default(),
            snap_to_grid: settings.snap_to_grid,
            grid_size: settings.grid_size,
        }
    }

    /// Raises `total_duration` to cover every clip. Never lowers it.
    pub(crate) fn raise_total_duration(&mut self) {
        self.total_duration = self
            .total_duration
            .max(calculate_total_duration(&self.tracks));
    }

    // =========================================================================
    // Tracks
    // =========================================================================

    /// Appends an empty track. The default name counts existing tracks of
    /// the same kind: "Audio Track 2".
    pub fn add_track(&self, kind: TrackKind, name: Option<&str>) -> Self {
        let height = self
            .tracks
            .first()
            .map(|t| t.height)
            .unwrap_or_else(|| TimelineSettings::default().default_track_height);
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("{} Track {}", kind.label(), self.track_count(kind) + 1),
        };

        let mut next = self.clone();
        next.tracks.push(Track::new(kind, &name, height));
        next
    }

    /// Removes a track and drops its clips from the selection.
    /// `total_duration` is left as is.
    pub fn remove_track(&self, track_id: &str) -> Self {
        let mut next = self.clone();
        let Some(pos) = next.tracks.iter().position(|t| t.id == track_id) else {
            debug!("remove_track: track {} not found", track_id);
            return next;
        };

        let removed = next.tracks.remove(pos);
        for clip in &removed.clips {
            next.selected_clip_ids.remove(&clip.id);
        }
        next
    }

    // =========================================================================
    // Clips
    // =========================================================================

    /// Adds a clip built from `data` to the track.
    ///
    /// Defaults: fresh id, start at the playhead, 5 second duration. A
    /// supplied id that already names a clip is replaced with a fresh one. The
    /// track's kind always wins over `data.kind`, and `end_time` is always
    /// `start_time + duration`. When the requested span overlaps an existing
    /// clip the new clip is placed at the end of the track's last clip.
    pub fn add_clip_to_track(&self, track_id: &str, data: ClipData) -> Self {
        let mut next = self.clone();
        let current_time = next.current_time;
        let id = match data.id {
            Some(id) if self.find_clip(&id).is_some() => {
                let fresh = new_id();
                debug!("Clip id {} already in use, assigning {}", id, fresh);
                fresh
            }
            Some(id) => id,
            None => new_id(),
        };
        let Some(track) = next.find_track_mut(track_id) else {
            debug!("add_clip_to_track: track {} not found", track_id);
            return self.clone();
        };

        let start_time = data.start_time.unwrap_or(current_time);
        let duration = data.duration.unwrap_or(DEFAULT_CLIP_DURATION_SEC);
        let mut clip = Clip {
            id,
            track_id: track.id.clone(),
            kind: track.kind,
            title: data
                .title
                .unwrap_or_else(|| format!("{} Clip", track.kind.label())),
            start_time,
            duration,
            end_time: start_time + duration,
            content: data.content.unwrap_or_default(),
            effects: data.effects.unwrap_or_default(),
            metadata: data.metadata.unwrap_or_else(ClipMetadata::now),
        };

        let conflict = track
            .clips
            .iter()
            .any(|existing| existing.overlaps_range(clip.start_time, clip.end_time));
        if conflict {
            let append_at = track.clips.last().map(|c| c.end_time).unwrap_or(0.0);
            debug!(
                "Clip {} conflicts on track {} at {:.3}s, placing at {:.3}s",
                clip.id, track.id, clip.start_time, append_at
            );
            clip.place_at(append_at);
        }

        track.clips.push(clip);
        next.raise_total_duration();
        next
    }

    /// Removes a clip from whichever track holds it and deselects it.
    pub fn remove_clip(&self, clip_id: &str) -> Self {
        let mut next = self.clone();
        let Some(track_idx) = next.track_index_of_clip(clip_id) else {
            debug!("remove_clip: clip {} not found", clip_id);
            return next;
        };

        next.tracks[track_idx].clips.retain(|c| c.id != clip_id);
        next.selected_clip_ids.remove(clip_id);
        next
    }

    /// Merges `updates` into the clip and stamps `modified_at`.
    ///
    /// No overlap check and no end time rederivation happen here.
    pub fn update_clip(&self, clip_id: &str, updates: ClipUpdate) -> Self {
        let mut next = self.clone();
        let Some(clip) = next.find_clip_mut(clip_id) else {
            debug!("update_clip: clip {} not found", clip_id);
            return next;
        };

        updates.apply_to(clip);
        next.raise_total_duration();
        next
    }

    /// Moves a clip to `new_start_time` on `new_track_id`.
    ///
    /// If the requested span collides with other clips on the destination,
    /// the start is pushed forward past each colliding clip until the clip
    /// fits. The moved clip is appended to the destination's clip list.
    pub fn move_clip(&self, clip_id: &str, new_track_id: &str, new_start_time: TimeSec) -> Self {
        let Some(source_idx) = self.track_index_of_clip(clip_id) else {
            debug!("move_clip: clip {} not found", clip_id);
            return self.clone();
        };
        let Some(dest_idx) = self.tracks.iter().position(|t| t.id == new_track_id) else {
            debug!("move_clip: track {} not found", new_track_id);
            return self.clone();
        };

        let mut next = self.clone();
        let source = &mut next.tracks[source_idx];
        let Some(pos) = source.clips.iter().position(|c| c.id == clip_id) else {
            return self.clone();
        };
        let mut clip = source.clips.remove(pos);

        let dest = &mut next.tracks[dest_idx];
        let mut others: Vec<&Clip> = dest.clips.iter().filter(|c| c.id != clip_id).collect();
        let conflict = others
            .iter()
            .any(|c| c.overlaps_range(new_start_time, new_start_time + clip.duration));

        let start_time = if conflict {
            others.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
            let found = forward_gap_search(&others, new_start_time, clip.duration);
            debug!(
                "Clip {} collides on track {} at {:.3}s, gap found at {:.3}s",
                clip.id, dest.id, new_start_time, found
            );
            found
        } else {
            new_start_time
        };

        clip.track_id = dest.id.clone();
        clip.place_at(start_time);
        dest.clips.push(clip);
        next.raise_total_duration();
        next
    }

    /// Splits a clip in two at `split_time`.
    ///
    /// The halves get ids `<id>-1` and `<id>-2` and become the selection.
    /// Splitting on or outside the clip's bounds does nothing.
    pub fn split_clip(&self, clip_id: &str, split_time: TimeSec) -> Self {
        let Some(track_idx) = self.track_index_of_clip(clip_id) else {
            debug!("split_clip: clip {} not found", clip_id);
            return self.clone();
        };

        let mut next = self.clone();
        let track = &mut next.tracks[track_idx];
        let Some(pos) = track.clips.iter().position(|c| c.id == clip_id) else {
            return self.clone();
        };
        let original = &track.clips[pos];
        if !(split_time > original.start_time && split_time < original.end_time) {
            debug!(
                "split_clip: {:.3}s is not inside clip {} ({:.3}..{:.3})",
                split_time, clip_id, original.start_time, original.end_time
            );
            return self.clone();
        }

        let mut first = original.clone();
        first.id = format!("{}-1", original.id);
        first.duration = split_time - original.start_time;
        first.end_time = split_time;
        first.touch();

        let mut second = original.clone();
        second.id = format!("{}-2", original.id);
        second.start_time = split_time;
        second.duration = original.end_time - split_time;
        second.end_time = original.end_time;
        second.touch();

        next.selected_clip_ids = [first.id.clone(), second.id.clone()].into_iter().collect();
        track.clips.splice(pos..=pos, [first, second]);
        track.sort_clips();
        next
    }

    /// Copies a clip to `offset` seconds after its end on the same track.
    pub fn duplicate_clip(&self, clip_id: &str, offset: TimeSec) -> Self {
        let Some(track_idx) = self.track_index_of_clip(clip_id) else {
            debug!("duplicate_clip: clip {} not found", clip_id);
            return self.clone();
        };

        let mut next = self.clone();
        let track = &mut next.tracks[track_idx];
        let Some(original) = track.get_clip(clip_id) else {
            return self.clone();
        };

        let mut copy = original.clone();
        copy.id = new_id();
        copy.title = format!("{} (Copy)", original.title);
        copy.place_at(original.end_time + offset);
        copy.metadata = ClipMetadata {
            ai_generated: original.metadata.ai_generated,
            service_used: original.metadata.service_used.clone(),
            ..ClipMetadata::now()
        };

        track.clips.push(copy);
        next.raise_total_duration();
        next
    }

    // =========================================================================
    // Selection, transport and view
    // =========================================================================

    /// Replaces the selection with the given ids that name existing clips.
    pub fn select_clips<I, S>(&self, clip_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next = self.clone();
        next.selected_clip_ids = clip_ids
            .into_iter()
            .filter(|id| self.find_clip(id.as_ref()).is_some())
            .map(|id| id.as_ref().to_string())
            .collect();
        next
    }

    /// Moves the playhead. Negative times clamp to 0; non-finite input is ignored.
    pub fn set_current_time(&self, time: TimeSec) -> Self {
        let mut next = self.clone();
        if time.is_finite() {
            next.current_time = time.max(0.0);
        }
        next
    }

    /// Stores the transport flag. Playback itself happens elsewhere.
    pub fn set_playing(&self, is_playing: bool) -> Self {
        let mut next = self.clone();
        next.is_playing = is_playing;
        next
    }

    /// Sets the zoom level, clamped to the editor's range.
    pub fn set_zoom(&self, zoom: f64) -> Self {
        let mut next = self.clone();
        if zoom.is_finite() {
            next.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
        next
    }
}

// =============================================================================
// Tests
// =============================================================================
