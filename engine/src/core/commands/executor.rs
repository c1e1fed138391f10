//! Timeline Store Module
//!
//! Holds the one authoritative TimelineState and applies ops to it under a
//! lock, so two dispatches can never work from the same stale copy.
//! Keeps undo/redo history of prior states.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::core::{
    commands::{EditOutcome, TimelineOp},
    settings::{StudioSettings, DEFAULT_HISTORY_LIMIT},
    timeline::TimelineState,
    CoreError, CoreResult,
};

struct StoreInner {
    state: TimelineState,
    undo_stack: VecDeque<TimelineState>,
    redo_stack: VecDeque<TimelineState>,
}

/// Serializes edits against a single timeline and records history
pub struct TimelineStore {
    inner: Mutex<StoreInner>,
    max_history_size: usize,
}

impl TimelineStore {
    /// Creates a store owning `state`
    pub fn new(state: TimelineState) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                state,
                undo_stack: VecDeque::new(),
                redo_stack: VecDeque::new(),
            }),
            max_history_size: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Creates a store with a fresh default timeline built from settings
    pub fn from_settings(settings: &StudioSettings) -> Self {
        Self::new(TimelineState::create_default(&settings.timeline))
            .with_max_history(settings.editor.history_limit)
    }

    /// Sets the maximum history size
    pub fn with_max_history(mut self, size: usize) -> Self {
        self.max_history_size = size.max(1);
        self
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Internal("Timeline store lock poisoned".to_string()))
    }

    /// Applies an op atomically.
    ///
    /// Structural changes are pushed onto the undo stack and clear the redo
    /// stack. View-only ops (selection, playhead, zoom) and no-ops are not
    /// recorded.
    pub fn dispatch(&self, op: &TimelineOp) -> CoreResult<EditOutcome> {
        let mut inner = self.lock()?;
        let outcome = op.apply(&inner.state);

        if !outcome.changed {
            debug!("{} left the timeline unchanged", op.type_name());
            return Ok(outcome);
        }

        let previous = std::mem::replace(&mut inner.state, outcome.state.clone());
        if !op.is_view_only() {
            inner.undo_stack.push_back(previous);
            while inner.undo_stack.len() > self.max_history_size {
                inner.undo_stack.pop_front();
            }
            inner.redo_stack.clear();
        }

        debug!("Applied {}", op.type_name());
        Ok(outcome)
    }

    /// Applies ops in order, each under the lock
    pub fn dispatch_all(&self, ops: &[TimelineOp]) -> CoreResult<Vec<EditOutcome>> {
        ops.iter().map(|op| self.dispatch(op)).collect()
    }

    /// Restores the state before the last recorded change
    pub fn undo(&self) -> CoreResult<TimelineState> {
        let mut inner = self.lock()?;
        let previous = inner.undo_stack.pop_back().ok_or(CoreError::NothingToUndo)?;
        let current = std::mem::replace(&mut inner.state, previous);
        inner.redo_stack.push_back(current);
        Ok(inner.state.clone())
    }

    /// Re-applies the last undone change
    pub fn redo(&self) -> CoreResult<TimelineState> {
        let mut inner = self.lock()?;
        let next = inner.redo_stack.pop_back().ok_or(CoreError::NothingToRedo)?;
        let current = std::mem::replace(&mut inner.state, next);
        inner.undo_stack.push_back(current);
        Ok(inner.state.clone())
    }

    pub fn can_undo(&self) -> bool {
        self.lock().map(|i| !i.undo_stack.is_empty()).unwrap_or(false)
    }

    pub fn can_redo(&self) -> bool {
        self.lock().map(|i| !i.redo_stack.is_empty()).unwrap_or(false)
    }

    /// Number of undo steps available
    pub fn history_len(&self) -> usize {
        self.lock().map(|i| i.undo_stack.len()).unwrap_or(0)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> CoreResult<TimelineState> {
        Ok(self.lock()?.state.clone())
    }

    /// Swaps in a new state (e.g. a loaded project) and clears history
    pub fn replace(&self, state: TimelineState) -> CoreResult<()> {
        let mut inner = self.lock()?;
        inner.state = state;
        inner.undo_stack.clear();
        inner.redo_stack.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeline::{ClipData, TrackKind};
    use std::sync::Arc;

    fn store() -> TimelineStore {
        TimelineStore::from_settings(&StudioSettings::default())
    }

    fn add_clip(store: &TimelineStore, id: &str, start: f64) -> EditOutcome {
        let track_id = store.snapshot().unwrap().tracks[0].id.clone();
        store
            .dispatch(&TimelineOp::AddClip {
                track_id,
                clip: ClipData::titled(id).with_id(id).at(start).lasting(2.0),
            })
            .unwrap()
    }

    #[test]
    fn test_dispatch_updates_state_and_history() {
        let store = store();
        let outcome = add_clip(&store, "c1", 0.0);

        assert!(outcome.changed);
        assert!(store.snapshot().unwrap().find_clip("c1").is_some());
        assert!(store.can_undo());
        assert!(!store.can_redo());
    }

    #[test]
    fn test_noop_dispatch_is_not_recorded() {
        let store = store();
        let outcome = store
            .dispatch(&TimelineOp::RemoveClip {
                clip_id: "missing".to_string(),
            })
            .unwrap();

        assert!(!outcome.changed);
        assert_eq!(store.history_len(), 0);
    }

    #[test]
    fn test_view_only_dispatch_is_not_recorded() {
        let store = store();
        let outcome = store.dispatch(&TimelineOp::SetCurrentTime { time: 4.0 }).unwrap();

        assert!(outcome.changed);
        assert_eq!(store.snapshot().unwrap().current_time, 4.0);
        assert_eq!(store.history_len(), 0);
    }

    #[test]
    fn test_undo_redo() {
        let store = store();
        let initial = store.snapshot().unwrap();
        add_clip(&store, "c1", 0.0);
        let after = store.snapshot().unwrap();

        assert_eq!(store.undo().unwrap(), initial);
        assert!(store.can_redo());
        assert_eq!(store.redo().unwrap(), after);
        assert!(!store.can_redo());
    }

    #[test]
    fn test_new_change_clears_redo() {
        let store = store();
        add_clip(&store, "c1", 0.0);
        store.undo().unwrap();
        add_clip(&store, "c2", 10.0);

        assert!(!store.can_redo());
        assert!(matches!(store.redo(), Err(CoreError::NothingToRedo)));
    }

    #[test]
    fn test_empty_history_errors() {
        let store = store();
        assert!(matches!(store.undo(), Err(CoreError::NothingToUndo)));
        assert!(matches!(store.redo(), Err(CoreError::NothingToRedo)));
    }

    #[test]
    fn test_default_history_limit_matches_settings() {
        let plain = TimelineStore::new(TimelineState::create_default(
            &StudioSettings::default().timeline,
        ));
        for i in 0..(DEFAULT_HISTORY_LIMIT + 5) {
            plain
                .dispatch(&TimelineOp::AddTrack {
                    kind: TrackKind::Text,
                    name: Some(format!("T{}", i)),
                })
                .unwrap();
        }

        assert_eq!(plain.history_len(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(
            StudioSettings::default().editor.history_limit,
            DEFAULT_HISTORY_LIMIT
        );
    }

    #[test]
    fn test_history_is_bounded() {
        let store = store().with_max_history(2);
        add_clip(&store, "c1", 0.0);
        add_clip(&store, "c2", 10.0);
        add_clip(&store, "c3", 20.0);

        assert_eq!(store.history_len(), 2);
        store.undo().unwrap();
        store.undo().unwrap();
        assert!(store.snapshot().unwrap().find_clip("c1").is_some());
        assert!(matches!(store.undo(), Err(CoreError::NothingToUndo)));
    }

    #[test]
    fn test_replace_clears_history() {
        let store = store();
        add_clip(&store, "c1", 0.0);
        store
            .replace(TimelineState::create_default(&StudioSettings::default().timeline))
            .unwrap();

        assert_eq!(store.history_len(), 0);
        assert_eq!(store.snapshot().unwrap().clip_count(), 0);
    }

    #[test]
    fn test_concurrent_dispatch_loses_no_updates() {
        let store = Arc::new(store());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        store
                            .dispatch(&TimelineOp::AddTrack {
                                kind: TrackKind::Audio,
                                name: None,
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let state = store.snapshot().unwrap();
        assert_eq!(state.tracks.len(), 3 + 80);
        assert_eq!(state.track_count(TrackKind::Audio), 81);
    }
}
