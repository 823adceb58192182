// src/host/memory.rs
//! In-memory [`DocumentHost`] used by the binaries and the test suite.
//!
//! Mirrors the observable behavior of a real canvas host: elements vanish
//! when removed, every mutation queues one generic change notification,
//! and groups are unique by name.

use crate::core::types::{LocationId, TextUnit};
use crate::host::{DocumentHost, HostError, MarkerStyle, Rect};
use std::collections::{HashMap, HashSet};

struct Element {
    id: LocationId,
    text: String,
    bounds: Rect,
    parented: bool,
}

struct MarkerGroup {
    marker_ids: Vec<LocationId>,
    locked: bool,
}

/// A fake document: a flat page of text elements plus marker groups.
#[derive(Default)]
pub struct MemoryDocument {
    elements: Vec<Element>,
    selection: Vec<LocationId>,
    markers: HashMap<LocationId, (Rect, MarkerStyle)>,
    groups: HashMap<String, MarkerGroup>,
    next_marker: u32,
    pending_changes: u32,
    /// Toasts shown to the user, newest last.
    pub notices: Vec<String>,
    /// Elements the viewport was last scrolled to.
    pub viewport: Vec<LocationId>,
    /// Last requested plugin panel size.
    pub ui_size: Option<(u32, u32)>,
    failing_fonts: HashSet<LocationId>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text element and return its locator.
    pub fn add_text_layer(&mut self, id: &str, text: &str, bounds: Rect) -> LocationId {
        let id = LocationId::from(id);
        self.elements.push(Element {
            id: id.clone(),
            text: text.to_string(),
            bounds,
            parented: true,
        });
        id
    }

    /// Simulate the user selecting elements. Not a document mutation, so
    /// no change notification is queued.
    pub fn select(&mut self, ids: &[LocationId]) {
        self.selection = ids.to_vec();
    }

    /// Simulate the user deleting an element. Queues a change
    /// notification, as a real host would.
    pub fn user_remove_element(&mut self, id: &LocationId) {
        self.elements.retain(|e| &e.id != id);
        self.selection.retain(|s| s != id);
        self.pending_changes += 1;
    }

    /// Simulate the user editing an element's text.
    pub fn user_edit_text(&mut self, id: &LocationId, text: &str) {
        if let Some(e) = self.elements.iter_mut().find(|e| &e.id == id) {
            e.text = text.to_string();
            self.pending_changes += 1;
        }
    }

    /// Detach an element from its parent without deleting it.
    pub fn detach(&mut self, id: &LocationId) {
        if let Some(e) = self.elements.iter_mut().find(|e| &e.id == id) {
            e.parented = false;
        }
    }

    /// Make subsequent font loads fail for the given element.
    pub fn break_font(&mut self, id: &LocationId) {
        self.failing_fonts.insert(id.clone());
    }

    /// Drain queued change notifications. The driving loop feeds each one
    /// to `CheckSession::document_changed`.
    pub fn take_change_events(&mut self) -> u32 {
        std::mem::take(&mut self.pending_changes)
    }

    pub fn text_of(&self, id: &LocationId) -> Option<&str> {
        self.elements
            .iter()
            .find(|e| &e.id == id)
            .map(|e| e.text.as_str())
    }

    pub fn selection(&self) -> &[LocationId] {
        &self.selection
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn markers_in_group(&self, name: &str) -> usize {
        self.groups.get(name).map_or(0, |g| g.marker_ids.len())
    }

    pub fn last_notice(&self) -> Option<&str> {
        self.notices.last().map(String::as_str)
    }

    fn find(&self, id: &LocationId) -> Result<&Element, HostError> {
        self.elements
            .iter()
            .find(|e| &e.id == id)
            .ok_or_else(|| HostError::StaleLocation(id.clone()))
    }
}

impl DocumentHost for MemoryDocument {
    fn all_text_units(&self) -> Vec<TextUnit> {
        self.elements
            .iter()
            .map(|e| TextUnit::new(e.id.clone(), e.text.clone()))
            .collect()
    }

    fn selected_text_units(&self) -> Vec<TextUnit> {
        self.selection
            .iter()
            .filter_map(|id| {
                self.elements
                    .iter()
                    .find(|e| &e.id == id)
                    .map(|e| TextUnit::new(e.id.clone(), e.text.clone()))
            })
            .collect()
    }

    fn resolve(&self, id: &LocationId) -> Result<TextUnit, HostError> {
        let e = self.find(id)?;
        Ok(TextUnit::new(e.id.clone(), e.text.clone()))
    }

    fn has_parent(&self, id: &LocationId) -> bool {
        self.elements
            .iter()
            .find(|e| &e.id == id)
            .is_some_and(|e| e.parented)
    }

    fn bounds(&self, id: &LocationId) -> Result<Rect, HostError> {
        Ok(self.find(id)?.bounds)
    }

    fn load_font(&mut self, id: &LocationId) -> Result<(), HostError> {
        self.find(id)?;
        if self.failing_fonts.contains(id) {
            return Err(HostError::FontLoad {
                id: id.clone(),
                reason: "font resource unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn set_text(&mut self, id: &LocationId, text: &str) -> Result<(), HostError> {
        let e = self
            .elements
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| HostError::StaleLocation(id.clone()))?;
        e.text = text.to_string();
        self.pending_changes += 1;
        Ok(())
    }

    fn create_marker(&mut self, rect: Rect, style: MarkerStyle) -> Result<LocationId, HostError> {
        self.next_marker += 1;
        let id = LocationId::new(format!("marker:{}", self.next_marker));
        self.markers.insert(id.clone(), (rect, style));
        self.pending_changes += 1;
        Ok(id)
    }

    fn group_and_lock(&mut self, name: &str, marker_ids: &[LocationId]) -> Result<(), HostError> {
        for id in marker_ids {
            if !self.markers.contains_key(id) {
                return Err(HostError::Mutation(format!("unknown marker {id}")));
            }
        }
        self.groups.insert(
            name.to_string(),
            MarkerGroup {
                marker_ids: marker_ids.to_vec(),
                locked: true,
            },
        );
        self.pending_changes += 1;
        Ok(())
    }

    fn remove_group(&mut self, name: &str) -> Result<bool, HostError> {
        match self.groups.remove(name) {
            Some(group) => {
                for id in &group.marker_ids {
                    self.markers.remove(id);
                }
                self.pending_changes += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn group_exists(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    fn set_selection(&mut self, ids: &[LocationId]) {
        self.selection = ids.to_vec();
    }

    fn scroll_into_view(&mut self, ids: &[LocationId]) {
        self.viewport = ids.to_vec();
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn resize_ui(&mut self, width: u32, height: u32) {
        self.ui_size = Some((width, height));
    }
}

impl MemoryDocument {
    /// Whether the named group is locked against accidental edits.
    pub fn group_locked(&self, name: &str) -> bool {
        self.groups.get(name).is_some_and(|g| g.locked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        }
    }

    #[test]
    fn removed_element_stops_resolving() {
        let mut doc = MemoryDocument::new();
        let id = doc.add_text_layer("1:1", "hello", rect());
        assert!(doc.resolve(&id).is_ok());

        doc.user_remove_element(&id);
        assert!(matches!(
            doc.resolve(&id),
            Err(HostError::StaleLocation(_))
        ));
        assert_eq!(doc.take_change_events(), 1);
    }

    #[test]
    fn mutations_queue_change_events() {
        let mut doc = MemoryDocument::new();
        let id = doc.add_text_layer("1:1", "hello", rect());
        doc.set_text(&id, "bye").unwrap();
        let marker = doc.create_marker(rect(), MarkerStyle {
            stroke_weight: 1.5,
            corner_radius: 2.0,
        })
        .unwrap();
        doc.group_and_lock("g", &[marker]).unwrap();
        assert_eq!(doc.take_change_events(), 3);
        assert_eq!(doc.take_change_events(), 0);
    }
}
