// src/core/overlay.rs
use crate::core::suppress::MutationSuppressor;
use crate::core::types::LocationId;
use crate::host::{DocumentHost, MarkerStyle};
use log::{debug, warn};

/// Reserved name of the single highlight group. At most one group with
/// this name exists; creating a new overlay first removes the old one.
pub const OVERLAY_GROUP_NAME: &str = "Proofing Highlights";

/// Outline-only marker: no fill, 1.5-unit stroke, rounded corners.
const MARKER_STYLE: MarkerStyle = MarkerStyle {
    stroke_weight: 1.5,
    corner_radius: 2.0,
};

/// What a highlight pass accomplished. `created` may be smaller than
/// `requested` when locations vanished since the scan; zero is a valid
/// outcome. `focusable` is the subset that still has a live parent and
/// can drive selection and viewport focus.
#[derive(Debug, Default)]
pub struct HighlightOutcome {
    pub requested: usize,
    pub created: usize,
    pub focusable: Vec<LocationId>,
}

/// Remove the overlay group if present. Idempotent: an empty canvas is a
/// no-op, and host failures are logged, never surfaced to the router.
pub fn clear(host: &mut dyn DocumentHost, suppressor: &mut MutationSuppressor) {
    if !host.group_exists(OVERLAY_GROUP_NAME) {
        return;
    }
    suppressor.mark();
    match host.remove_group(OVERLAY_GROUP_NAME) {
        Ok(true) => debug!("removed highlight group"),
        Ok(false) => suppressor.unmark(),
        Err(e) => {
            suppressor.unmark();
            warn!("failed to remove highlight group: {e}");
        }
    }
}

/// Draw one outline marker over each still-existing location and collect
/// the markers into the locked overlay group, replacing any previous
/// overlay. Locations that no longer resolve are skipped with a log line;
/// the batch never aborts.
pub fn highlight(
    host: &mut dyn DocumentHost,
    suppressor: &mut MutationSuppressor,
    location_ids: &[LocationId],
) -> HighlightOutcome {
    clear(host, suppressor);

    let mut outcome = HighlightOutcome {
        requested: location_ids.len(),
        ..HighlightOutcome::default()
    };
    let mut marker_ids = Vec::new();

    for id in location_ids {
        let rect = match host.bounds(id) {
            Ok(rect) => rect,
            Err(e) => {
                warn!("skipping highlight for {id}: {e}");
                continue;
            }
        };

        suppressor.mark();
        match host.create_marker(rect, MARKER_STYLE) {
            Ok(marker_id) => marker_ids.push(marker_id),
            Err(e) => {
                suppressor.unmark();
                warn!("could not create marker over {id}: {e}");
                continue;
            }
        }

        if host.has_parent(id) {
            outcome.focusable.push(id.clone());
        }
    }

    if !marker_ids.is_empty() {
        suppressor.mark();
        if let Err(e) = host.group_and_lock(OVERLAY_GROUP_NAME, &marker_ids) {
            suppressor.unmark();
            warn!("could not group highlight markers: {e}");
        }
    }

    outcome.created = marker_ids.len();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryDocument;
    use crate::host::Rect;

    fn rect(x: f64) -> Rect {
        Rect {
            x,
            y: 0.0,
            width: 40.0,
            height: 12.0,
        }
    }

    fn doc_with_layers(n: usize) -> (MemoryDocument, Vec<LocationId>) {
        let mut doc = MemoryDocument::new();
        let ids = (0..n)
            .map(|i| doc.add_text_layer(&format!("1:{i}"), "teh cat", rect(i as f64 * 50.0)))
            .collect();
        (doc, ids)
    }

    #[test]
    fn clearing_twice_is_a_no_op_and_leaves_zero_groups() {
        let (mut doc, ids) = doc_with_layers(2);
        let mut sup = MutationSuppressor::new();
        highlight(&mut doc, &mut sup, &ids);
        assert_eq!(doc.group_count(), 1);

        clear(&mut doc, &mut sup);
        clear(&mut doc, &mut sup);
        assert_eq!(doc.group_count(), 0);

        // Every mark is balanced by a queued host notification.
        let events = doc.take_change_events();
        assert_eq!(sup.pending(), events);
    }

    #[test]
    fn highlighting_again_replaces_the_previous_overlay() {
        let (mut doc, ids) = doc_with_layers(3);
        let mut sup = MutationSuppressor::new();
        highlight(&mut doc, &mut sup, &ids);
        highlight(&mut doc, &mut sup, &ids[..2]);

        assert_eq!(doc.group_count(), 1);
        assert_eq!(doc.markers_in_group(OVERLAY_GROUP_NAME), 2);
    }

    #[test]
    fn vanished_locations_are_skipped_without_aborting_the_batch() {
        let (mut doc, ids) = doc_with_layers(3);
        doc.user_remove_element(&ids[1]);

        let mut sup = MutationSuppressor::new();
        let outcome = highlight(&mut doc, &mut sup, &ids);
        assert_eq!(outcome.requested, 3);
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.focusable, vec![ids[0].clone(), ids[2].clone()]);
    }

    #[test]
    fn detached_locations_are_highlighted_but_not_focusable() {
        let (mut doc, ids) = doc_with_layers(2);
        doc.detach(&ids[0]);

        let mut sup = MutationSuppressor::new();
        let outcome = highlight(&mut doc, &mut sup, &ids);
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.focusable, vec![ids[1].clone()]);
    }

    #[test]
    fn group_is_locked_against_accidental_edits() {
        let (mut doc, ids) = doc_with_layers(1);
        let mut sup = MutationSuppressor::new();
        highlight(&mut doc, &mut sup, &ids);
        assert!(doc.group_locked(OVERLAY_GROUP_NAME));
    }

    #[test]
    fn zero_matches_is_a_valid_outcome() {
        let mut doc = MemoryDocument::new();
        let mut sup = MutationSuppressor::new();
        let outcome = highlight(&mut doc, &mut sup, &[]);
        assert_eq!(outcome.requested, 0);
        assert_eq!(outcome.created, 0);
        assert_eq!(doc.group_count(), 0);
    }
}
