// src/host/mod.rs
//! Abstraction over the document-editing API of the hosting design tool.
//!
//! The engine never touches a concrete canvas directly; everything goes
//! through [`DocumentHost`]. `MemoryDocument` is a complete in-memory
//! implementation backing the binaries and the test suite.

pub mod memory;

use crate::core::types::{LocationId, TextUnit};
use thiserror::Error;

/// Failures surfaced by host operations. None of these are fatal: callers
/// skip the affected item, log, and keep the batch going.
#[derive(Debug, Error)]
pub enum HostError {
    /// The locator no longer points to a live element. Expected whenever
    /// the user deletes an element between a scan and a later operation.
    #[error("location {0} no longer resolves to a live element")]
    StaleLocation(LocationId),

    /// A text element's font resource could not be loaded, so its content
    /// cannot be edited.
    #[error("could not load font for {id}: {reason}")]
    FontLoad { id: LocationId, reason: String },

    /// A structural mutation (grouping, removing a group) was rejected by
    /// the host.
    #[error("host mutation failed: {0}")]
    Mutation(String),
}

/// Axis-aligned bounding box of an element in absolute canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Visual style of one highlight marker: outline only, never filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub stroke_weight: f64,
    pub corner_radius: f64,
}

/// The document-editing surface the session drives.
///
/// All calls are fallible and non-atomic with respect to each other: an
/// element may be deleted by the user between any two calls, so mutating
/// code re-validates existence (`resolve`) before each edit rather than
/// trusting an earlier scan.
///
/// Mutating calls (`set_text`, `create_marker`, `group_and_lock`, a
/// `remove_group` that removed something) each produce one generic
/// document-change notification from the host, delivered back to the
/// session regardless of who caused the change.
pub trait DocumentHost {
    /// Every text-bearing element on the current page, in scan order.
    fn all_text_units(&self) -> Vec<TextUnit>;

    /// Text-bearing elements in the current selection; empty when nothing
    /// relevant is selected.
    fn selected_text_units(&self) -> Vec<TextUnit>;

    /// Re-resolve a locator to the element's current content.
    fn resolve(&self, id: &LocationId) -> Result<TextUnit, HostError>;

    /// Whether the element still sits under a live parent. Detached
    /// elements cannot be focused or scrolled to.
    fn has_parent(&self, id: &LocationId) -> bool;

    /// Current bounding geometry of the element.
    fn bounds(&self, id: &LocationId) -> Result<Rect, HostError>;

    /// Load the font resource backing a text element. Required before the
    /// element's text may be rewritten.
    fn load_font(&mut self, id: &LocationId) -> Result<(), HostError>;

    /// Overwrite the element's text content.
    fn set_text(&mut self, id: &LocationId, text: &str) -> Result<(), HostError>;

    /// Create one outline marker covering `rect`; returns the marker's id.
    fn create_marker(&mut self, rect: Rect, style: MarkerStyle) -> Result<LocationId, HostError>;

    /// Collect previously created markers into a named, locked group.
    fn group_and_lock(&mut self, name: &str, marker_ids: &[LocationId]) -> Result<(), HostError>;

    /// Remove the named group and its members. `Ok(false)` when no such
    /// group exists.
    fn remove_group(&mut self, name: &str) -> Result<bool, HostError>;

    fn group_exists(&self, name: &str) -> bool;

    /// Replace the current selection.
    fn set_selection(&mut self, ids: &[LocationId]);

    /// Scroll and zoom the viewport to fit the given elements.
    fn scroll_into_view(&mut self, ids: &[LocationId]);

    /// Show a transient toast to the user.
    fn notify(&mut self, message: &str);

    /// Resize the plugin UI panel.
    fn resize_ui(&mut self, width: u32, height: u32);
}
