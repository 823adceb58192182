// src/messages.rs
//! Wire types exchanged with the UI panel, one JSON object per message,
//! discriminated by a kebab-case `type` tag.

use crate::core::types::{Correction, LocationId, TextUnit};
use serde::{Deserialize, Serialize};

/// Messages consumed from the UI layer.
///
/// `spell-check` scans the whole page; `run-check` is selection-scoped
/// and consults the result cache first. A message whose `type` the engine
/// does not know deserializes to `Unknown`, which the router logs and
/// ignores rather than failing the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiRequest {
    SpellCheck {
        check_type: String,
    },
    RunCheck {
        check_type: String,
    },
    HighlightAndNavigate {
        location_ids: Vec<LocationId>,
    },
    NavigateToWord {
        word: String,
        #[serde(default)]
        location_ids: Option<Vec<LocationId>>,
    },
    NavigatePrev {
        word: String,
    },
    NavigateNext {
        word: String,
    },
    ReplaceWord {
        location_ids: Vec<LocationId>,
        old_word: String,
        new_word: String,
    },
    ResizeWindow {
        width: u32,
        height: u32,
    },
    ClearHighlights,
    ClearNavigation,
    SaveResultsToCache {
        fingerprint: String,
        check_type: String,
        corrections: Vec<Correction>,
    },
    #[serde(other)]
    Unknown,
}

/// Messages emitted to the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiEvent {
    /// Full-page scan results.
    AllTextData { units: Vec<TextUnit> },
    /// Selection-scoped text for the external checker, tagged with the
    /// fingerprint the results should be cached under.
    TextToCheck {
        fingerprint: String,
        check_type: String,
        units: Vec<TextUnit>,
    },
    NoSelection,
    ExtractionStarted,
    CachedResultsFound { corrections: Vec<Correction> },
    WordReplaced { word: String },
    /// Cursor moved. `index` is 0-based on the wire; the panel renders
    /// `index + 1`.
    NavigationUpdate {
        word: String,
        index: usize,
        total: usize,
    },
    /// An external (user) edit happened; the panel should offer a fresh
    /// check.
    ReCheckDocument,
}
