// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque stable identifier for a text-bearing element in the document.
/// Identity survives edits to the element's content; it stops resolving
/// once the element is removed from the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One scannable text-bearing element, as captured by a scan pass.
/// The snapshot goes stale if the underlying element is later removed
/// or edited; the locator, not the text, is the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    pub id: LocationId,
    pub text: String,
}

impl TextUnit {
    pub fn new(id: impl Into<LocationId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A flagged word together with every location it was matched in and the
/// checker's suggested fixes. Produced by the external checker on the UI
/// side; consumed by the navigation tracker and the replace engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub word: String,
    pub matched_locations: Vec<LocationId>,
    pub suggestions: Vec<String>,
}

/// Deterministic cache-key component for the current selection: the
/// sorted, comma-joined locator ids. Two selections of the same elements
/// produce the same fingerprint regardless of selection order.
pub fn selection_fingerprint(ids: &[LocationId]) -> String {
    let mut parts: Vec<&str> = ids.iter().map(LocationId::as_str).collect();
    parts.sort_unstable();
    parts.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_order_independent() {
        let a = [LocationId::from("10:5"), LocationId::from("10:2")];
        let b = [LocationId::from("10:2"), LocationId::from("10:5")];
        assert_eq!(selection_fingerprint(&a), "10:2,10:5");
        assert_eq!(selection_fingerprint(&a), selection_fingerprint(&b));
    }

    #[test]
    fn fingerprint_of_empty_selection_is_empty() {
        assert_eq!(selection_fingerprint(&[]), "");
    }
}
