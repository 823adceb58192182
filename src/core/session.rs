// src/core/session.rs
use crate::cache::ResultCache;
use crate::core::navigation::NavigationTracker;
use crate::core::overlay;
use crate::core::replace;
use crate::core::suppress::MutationSuppressor;
use crate::core::types::{selection_fingerprint, LocationId, TextUnit};
use crate::host::DocumentHost;
use crate::messages::{UiEvent, UiRequest};
use crate::persistence::{load_from_disk, save_to_disk};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One proofing session: routes UI messages to the overlay manager, the
/// navigation tracker, the replace engine and the result cache, and keeps
/// the self-caused-mutation accounting that stops the engine's own edits
/// from triggering re-checks.
///
/// Single-threaded and cooperative: one message at a time, and every
/// mutation re-resolves its target first, because the user may have
/// deleted it since the last scan.
pub struct CheckSession {
    nav: NavigationTracker,
    cache: ResultCache,
    suppressor: MutationSuppressor,
    cache_path: Option<PathBuf>,
}

impl Default for CheckSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckSession {
    pub fn new() -> Self {
        Self {
            nav: NavigationTracker::new(),
            cache: ResultCache::new(),
            suppressor: MutationSuppressor::new(),
            cache_path: None,
        }
    }

    /// Open a session backed by a durable cache file, starting empty if
    /// the file is missing or unreadable.
    pub fn from_cache_file_or_new(path: &Path) -> Self {
        let cache = load_from_disk(path).unwrap_or_else(|e| {
            debug!("starting with an empty result cache: {e}");
            ResultCache::new()
        });
        Self {
            nav: NavigationTracker::new(),
            cache,
            suppressor: MutationSuppressor::new(),
            cache_path: Some(path.to_path_buf()),
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Persist the result cache, if a cache file is configured.
    pub fn save_cache(&self) -> Result<(), std::io::Error> {
        match &self.cache_path {
            Some(path) => save_to_disk(&self.cache, path),
            None => Ok(()),
        }
    }

    /// Dispatch one inbound UI message. Returns the events to post back
    /// to the panel; user-facing feedback goes through `host.notify`.
    pub fn handle(
        &mut self,
        host: &mut dyn DocumentHost,
        request: UiRequest,
        now: Instant,
    ) -> Vec<UiEvent> {
        match request {
            UiRequest::SpellCheck { check_type } => self.scan_page(host, &check_type),
            UiRequest::RunCheck { check_type } => self.check_selection(host, &check_type),
            UiRequest::HighlightAndNavigate { location_ids } => {
                self.highlight_and_focus(host, &location_ids)
            }
            UiRequest::NavigateToWord { word, location_ids } => {
                if let Some(ids) = location_ids {
                    self.nav.begin_or_refresh(&word, ids);
                }
                self.focus_current(host, &word, now).into_iter().collect()
            }
            UiRequest::NavigatePrev { word } => {
                self.nav.prev(&word);
                self.focus_current(host, &word, now).into_iter().collect()
            }
            UiRequest::NavigateNext { word } => {
                self.nav.next(&word);
                self.focus_current(host, &word, now).into_iter().collect()
            }
            UiRequest::ReplaceWord {
                location_ids,
                old_word,
                new_word,
            } => self.replace_word(host, &location_ids, &old_word, &new_word),
            UiRequest::ResizeWindow { width, height } => {
                host.resize_ui(width, height);
                vec![]
            }
            UiRequest::ClearHighlights => {
                overlay::clear(host, &mut self.suppressor);
                vec![]
            }
            UiRequest::ClearNavigation => {
                self.nav.clear_all();
                vec![]
            }
            UiRequest::SaveResultsToCache {
                fingerprint,
                check_type,
                corrections,
            } => {
                self.cache.store(&fingerprint, &check_type, corrections);
                if let Err(e) = self.save_cache() {
                    warn!("could not persist result cache: {e}");
                }
                vec![]
            }
            UiRequest::Unknown => {
                warn!("ignoring message of unknown kind");
                vec![]
            }
        }
    }

    /// Feed one generic document-change notification from the host.
    /// Our own mutations are swallowed; a user edit asks the panel to
    /// offer a fresh check.
    pub fn document_changed(&mut self) -> Option<UiEvent> {
        if self.suppressor.observe_change() {
            Some(UiEvent::ReCheckDocument)
        } else {
            None
        }
    }

    /// Show any coalesced navigation notice whose window has elapsed.
    /// The driving loop calls this once per turn.
    pub fn poll_notices(&mut self, host: &mut dyn DocumentHost, now: Instant) {
        if let Some(message) = self.nav.take_due_notice(now) {
            host.notify(&message);
        }
    }

    fn scan_page(&mut self, host: &mut dyn DocumentHost, check_type: &str) -> Vec<UiEvent> {
        debug!("page scan for {check_type}");
        let units = host.all_text_units();
        host.notify(&match units.len() {
            1 => "Found 1 text layer on the page.".to_string(),
            n => format!("Found {n} text layers on the page."),
        });
        vec![
            UiEvent::ExtractionStarted,
            UiEvent::AllTextData { units },
        ]
    }

    fn check_selection(&mut self, host: &mut dyn DocumentHost, check_type: &str) -> Vec<UiEvent> {
        let units = host.selected_text_units();
        if units.is_empty() {
            host.notify("Select at least one text layer first.");
            return vec![UiEvent::NoSelection];
        }

        let ids: Vec<LocationId> = units.iter().map(|u| u.id.clone()).collect();
        let fingerprint = selection_fingerprint(&ids);

        if let Some(corrections) = self.cache.lookup(&fingerprint, check_type) {
            debug!("cache hit for ({fingerprint}, {check_type})");
            return vec![UiEvent::CachedResultsFound {
                corrections: corrections.to_vec(),
            }];
        }

        vec![
            UiEvent::ExtractionStarted,
            UiEvent::TextToCheck {
                fingerprint,
                check_type: check_type.to_string(),
                units,
            },
        ]
    }

    fn highlight_and_focus(
        &mut self,
        host: &mut dyn DocumentHost,
        location_ids: &[LocationId],
    ) -> Vec<UiEvent> {
        let outcome = overlay::highlight(host, &mut self.suppressor, location_ids);
        if !outcome.focusable.is_empty() {
            host.set_selection(&outcome.focusable);
            host.scroll_into_view(&outcome.focusable);
        }
        host.notify(&match outcome.created {
            0 => "No matching elements to highlight.".to_string(),
            1 => "Highlighted 1 instance.".to_string(),
            n => format!("Highlighted {n} instances."),
        });
        vec![]
    }

    /// Select and scroll to the tracked word's current match. The wire
    /// event carries a 0-based index; only the human-facing notice adds 1.
    fn focus_current(
        &mut self,
        host: &mut dyn DocumentHost,
        word: &str,
        now: Instant,
    ) -> Option<UiEvent> {
        let pos = self.nav.current(word)?;
        match host.resolve(&pos.location) {
            Ok(_) => {
                let target = std::slice::from_ref(&pos.location);
                host.set_selection(target);
                host.scroll_into_view(target);
                self.nav.schedule_notice(
                    format!("\"{}\" — {} of {}", word, pos.index + 1, pos.total),
                    now,
                );
                Some(UiEvent::NavigationUpdate {
                    word: word.to_string(),
                    index: pos.index,
                    total: pos.total,
                })
            }
            Err(e) => {
                warn!("navigation target vanished: {e}");
                host.notify("Could not navigate — the element may have been deleted.");
                None
            }
        }
    }

    fn replace_word(
        &mut self,
        host: &mut dyn DocumentHost,
        location_ids: &[LocationId],
        old_word: &str,
        new_word: &str,
    ) -> Vec<UiEvent> {
        let pattern = match replace::word_pattern(old_word) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!("unusable replace pattern for {old_word:?}: {e}");
                return vec![];
            }
        };

        let mut changed = 0usize;
        for id in location_ids {
            // Re-validate: the element may be gone since the scan.
            let unit: TextUnit = match host.resolve(id) {
                Ok(unit) => unit,
                Err(e) => {
                    warn!("skipping {id}: {e}");
                    continue;
                }
            };
            // The font must be loaded before a text element can be
            // rewritten. A failure skips this element only.
            if let Err(e) = host.load_font(id) {
                warn!("skipping {id}: {e}");
                continue;
            }
            let Some(new_text) = replace::apply(&pattern, &unit.text, new_word) else {
                continue;
            };
            self.suppressor.mark();
            match host.set_text(id, &new_text) {
                Ok(()) => changed += 1,
                Err(e) => {
                    self.suppressor.unmark();
                    warn!("could not rewrite {id}: {e}");
                }
            }
        }

        // The word's matches no longer exist under the old spelling.
        self.nav.forget(old_word);

        host.notify(&format!(
            "Replaced \"{}\" with \"{}\" in {}.",
            old_word,
            new_word,
            replace::count_layers(changed)
        ));
        vec![UiEvent::WordReplaced {
            word: old_word.to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryDocument;
    use crate::host::Rect;

    fn rect() -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 14.0,
        }
    }

    fn drain_changes(session: &mut CheckSession, doc: &mut MemoryDocument) -> Vec<UiEvent> {
        let mut events = Vec::new();
        for _ in 0..doc.take_change_events() {
            events.extend(session.document_changed());
        }
        events
    }

    #[test]
    fn unknown_messages_are_ignored() {
        let mut doc = MemoryDocument::new();
        let mut session = CheckSession::new();
        let events = session.handle(&mut doc, UiRequest::Unknown, Instant::now());
        assert!(events.is_empty());
    }

    #[test]
    fn page_scan_reports_layer_count_and_emits_all_text() {
        let mut doc = MemoryDocument::new();
        doc.add_text_layer("1:1", "teh cat", rect());
        doc.add_text_layer("1:2", "a dog", rect());

        let mut session = CheckSession::new();
        let events = session.handle(
            &mut doc,
            UiRequest::SpellCheck {
                check_type: "SPELLING".to_string(),
            },
            Instant::now(),
        );

        assert_eq!(events[0], UiEvent::ExtractionStarted);
        assert!(matches!(&events[1], UiEvent::AllTextData { units } if units.len() == 2));
        assert_eq!(doc.last_notice(), Some("Found 2 text layers on the page."));
    }

    #[test]
    fn selection_check_misses_then_hits_the_cache() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_text_layer("10:2", "Visit figma today", rect());
        let b = doc.add_text_layer("10:5", "figma files", rect());
        doc.select(&[a, b]);

        let mut session = CheckSession::new();
        let run_check = UiRequest::RunCheck {
            check_type: "TYPO_BRAND".to_string(),
        };

        let events = session.handle(&mut doc, run_check.clone(), Instant::now());
        let UiEvent::TextToCheck { fingerprint, .. } = &events[1] else {
            panic!("expected text-to-check, got {events:?}");
        };
        assert_eq!(fingerprint, "10:2,10:5");

        session.handle(
            &mut doc,
            UiRequest::SaveResultsToCache {
                fingerprint: fingerprint.clone(),
                check_type: "TYPO_BRAND".to_string(),
                corrections: vec![],
            },
            Instant::now(),
        );

        let events = session.handle(&mut doc, run_check, Instant::now());
        assert!(matches!(events[0], UiEvent::CachedResultsFound { .. }));
    }

    #[test]
    fn empty_selection_yields_no_selection() {
        let mut doc = MemoryDocument::new();
        doc.add_text_layer("1:1", "unselected", rect());

        let mut session = CheckSession::new();
        let events = session.handle(
            &mut doc,
            UiRequest::RunCheck {
                check_type: "SPELLING".to_string(),
            },
            Instant::now(),
        );
        assert_eq!(events, vec![UiEvent::NoSelection]);
    }

    #[test]
    fn own_mutations_do_not_trigger_a_re_check_but_user_edits_do() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_text_layer("1:1", "teh", rect());
        let b = doc.add_text_layer("1:2", "teh again", rect());

        let mut session = CheckSession::new();
        session.handle(
            &mut doc,
            UiRequest::HighlightAndNavigate {
                location_ids: vec![a.clone(), b],
            },
            Instant::now(),
        );
        assert_eq!(drain_changes(&mut session, &mut doc), vec![]);

        doc.user_edit_text(&a, "the");
        assert_eq!(
            drain_changes(&mut session, &mut doc),
            vec![UiEvent::ReCheckDocument]
        );
    }

    #[test]
    fn navigating_to_a_deleted_element_leaves_the_selection_alone() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_text_layer("1:1", "teh", rect());
        let b = doc.add_text_layer("1:2", "teh", rect());
        doc.select(&[b.clone()]);

        let mut session = CheckSession::new();
        doc.user_remove_element(&a);

        let events = session.handle(
            &mut doc,
            UiRequest::NavigateToWord {
                word: "teh".to_string(),
                location_ids: Some(vec![a]),
            },
            Instant::now(),
        );
        assert!(events.is_empty());
        assert_eq!(doc.selection(), &[b]);
        assert_eq!(
            doc.last_notice(),
            Some("Could not navigate — the element may have been deleted.")
        );
    }

    #[test]
    fn replace_changes_whole_words_only_and_forgets_the_cursor() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_text_layer("1:1", "the cat sat", rect());
        let b = doc.add_text_layer("1:2", "category", rect());
        let ids = vec![a.clone(), b.clone()];

        let mut session = CheckSession::new();
        session.handle(
            &mut doc,
            UiRequest::NavigateToWord {
                word: "cat".to_string(),
                location_ids: Some(ids.clone()),
            },
            Instant::now(),
        );

        let events = session.handle(
            &mut doc,
            UiRequest::ReplaceWord {
                location_ids: ids,
                old_word: "cat".to_string(),
                new_word: "dog".to_string(),
            },
            Instant::now(),
        );

        assert_eq!(doc.text_of(&a), Some("the dog sat"));
        assert_eq!(doc.text_of(&b), Some("category"));
        assert_eq!(
            events,
            vec![UiEvent::WordReplaced {
                word: "cat".to_string()
            }]
        );
        assert_eq!(
            doc.last_notice(),
            Some("Replaced \"cat\" with \"dog\" in 1 layer.")
        );
        // The replace batch must not look like a user edit either.
        assert_eq!(drain_changes(&mut session, &mut doc), vec![]);

        let events = session.handle(
            &mut doc,
            UiRequest::NavigateNext {
                word: "cat".to_string(),
            },
            Instant::now(),
        );
        assert!(events.is_empty());
    }

    #[test]
    fn a_failing_font_load_skips_only_that_element() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_text_layer("1:1", "teh one", rect());
        let b = doc.add_text_layer("1:2", "teh two", rect());
        doc.break_font(&a);

        let mut session = CheckSession::new();
        session.handle(
            &mut doc,
            UiRequest::ReplaceWord {
                location_ids: vec![a.clone(), b.clone()],
                old_word: "teh".to_string(),
                new_word: "the".to_string(),
            },
            Instant::now(),
        );

        assert_eq!(doc.text_of(&a), Some("teh one"));
        assert_eq!(doc.text_of(&b), Some("the two"));
        assert_eq!(
            doc.last_notice(),
            Some("Replaced \"teh\" with \"the\" in 1 layer.")
        );
    }

    #[test]
    fn navigation_notices_coalesce_into_the_last_of_a_burst() {
        let mut doc = MemoryDocument::new();
        let ids: Vec<LocationId> = (0..3)
            .map(|i| doc.add_text_layer(&format!("1:{i}"), "teh", rect()))
            .collect();

        let mut session = CheckSession::new();
        let t0 = Instant::now();
        session.handle(
            &mut doc,
            UiRequest::NavigateToWord {
                word: "teh".to_string(),
                location_ids: Some(ids),
            },
            t0,
        );
        session.handle(
            &mut doc,
            UiRequest::NavigateNext {
                word: "teh".to_string(),
            },
            t0 + std::time::Duration::from_millis(100),
        );

        // Mid-burst poll shows nothing.
        session.poll_notices(&mut doc, t0 + std::time::Duration::from_millis(200));
        assert_eq!(doc.notices.len(), 0);

        session.poll_notices(&mut doc, t0 + std::time::Duration::from_secs(1));
        assert_eq!(doc.notices, vec!["\"teh\" — 2 of 3".to_string()]);
    }

    #[test]
    fn resize_is_forwarded_to_the_host() {
        let mut doc = MemoryDocument::new();
        let mut session = CheckSession::new();
        session.handle(
            &mut doc,
            UiRequest::ResizeWindow {
                width: 420,
                height: 640,
            },
            Instant::now(),
        );
        assert_eq!(doc.ui_size, Some((420, 640)));
    }
}
