// src/cache.rs
use crate::core::types::Correction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Local store of previously computed correction lists, keyed by
/// (selection fingerprint, check type). A repeated check on an unchanged
/// selection is served from here instead of going back to the external
/// checker. There is no explicit eviction: a changed selection produces a
/// different fingerprint, which is simply a miss.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ResultCache {
    entries: HashMap<(String, String), Vec<Correction>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, fingerprint: &str, check_type: &str) -> Option<&[Correction]> {
        self.entries
            .get(&(fingerprint.to_string(), check_type.to_string()))
            .map(Vec::as_slice)
    }

    pub fn store(&mut self, fingerprint: &str, check_type: &str, corrections: Vec<Correction>) {
        self.entries
            .insert((fingerprint.to_string(), check_type.to_string()), corrections);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
