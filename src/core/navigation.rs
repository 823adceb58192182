// src/core/navigation.rs
use crate::core::debounce::NoticeDebouncer;
use crate::core::types::LocationId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long a burst of navigation notices is coalesced before the last
/// one is shown.
pub const NOTICE_WINDOW: Duration = Duration::from_millis(400);

#[derive(Debug)]
struct NavEntry {
    ordered_location_ids: Vec<LocationId>,
    current_index: usize,
}

/// The cursor position for a tracked word: the location to focus, plus
/// where it sits in the full match list. `index` is 0-based.
#[derive(Debug, Clone, PartialEq)]
pub struct NavPosition {
    pub location: LocationId,
    pub index: usize,
    pub total: usize,
}

/// Per-word cursor over an ordered list of match locations.
///
/// Each tracked word is either absent or active with a list and an index;
/// `next`/`prev` wrap around so every occurrence can be cycled through
/// without bound checks. The index is clamped to the list on every read,
/// so a shrunken list can never produce an out-of-range access.
///
/// Owned by the session, not module state, so independent sessions track
/// independently.
#[derive(Debug)]
pub struct NavigationTracker {
    entries: HashMap<String, NavEntry>,
    debouncer: NoticeDebouncer,
}

impl Default for NavigationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationTracker {
    pub fn new() -> Self {
        Self::with_notice_window(NOTICE_WINDOW)
    }

    pub fn with_notice_window(window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            debouncer: NoticeDebouncer::new(window),
        }
    }

    /// Start tracking `word` at its first match, replacing any prior
    /// cursor for it. An empty location list is ignored.
    pub fn begin_or_refresh(&mut self, word: &str, location_ids: Vec<LocationId>) {
        if location_ids.is_empty() {
            return;
        }
        self.entries.insert(
            word.to_string(),
            NavEntry {
                ordered_location_ids: location_ids,
                current_index: 0,
            },
        );
    }

    /// Advance the cursor, wrapping past the last match to the first.
    /// No-op for untracked words.
    pub fn next(&mut self, word: &str) {
        if let Some(entry) = self.entries.get_mut(word) {
            let len = entry.ordered_location_ids.len();
            entry.current_index = (entry.current_index.min(len - 1) + 1) % len;
        }
    }

    /// Move the cursor back, wrapping from the first match to the last.
    /// No-op for untracked words.
    pub fn prev(&mut self, word: &str) {
        if let Some(entry) = self.entries.get_mut(word) {
            let len = entry.ordered_location_ids.len();
            let index = entry.current_index.min(len - 1);
            entry.current_index = if index == 0 { len - 1 } else { index - 1 };
        }
    }

    /// The current position for `word`, or `None` if untracked.
    pub fn current(&self, word: &str) -> Option<NavPosition> {
        let entry = self.entries.get(word)?;
        let total = entry.ordered_location_ids.len();
        let index = entry.current_index.min(total - 1);
        Some(NavPosition {
            location: entry.ordered_location_ids[index].clone(),
            index,
            total,
        })
    }

    /// Stop tracking `word`. Used after a full replace, when its matches
    /// no longer exist under that name.
    pub fn forget(&mut self, word: &str) {
        self.entries.remove(word);
    }

    /// Drop every cursor and any pending debounced notice.
    pub fn clear_all(&mut self) {
        self.entries.clear();
        self.debouncer.cancel();
    }

    pub fn is_tracking(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    /// Queue a coalesced user notice; bursts collapse to the last one.
    pub fn schedule_notice(&mut self, message: String, now: Instant) {
        self.debouncer.schedule(message, now);
    }

    /// The notice to show now, if its window has elapsed.
    pub fn take_due_notice(&mut self, now: Instant) -> Option<String> {
        self.debouncer.take_due(now)
    }
}
