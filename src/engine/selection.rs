//! Selection tracking: which nodes and edges are currently selected.
//!
//! The selection is always a subset of the live graph; the engine prunes it
//! after every store mutation. A debounce window gates the floating action
//! menu so it does not flicker during a marquee drag.

use crate::constants::SELECTION_MENU_DEBOUNCE;
use crate::engine::grouping;
use crate::types::{EdgeId, FlowGraph, NodeId};
use std::time::Instant;

/// The current selection: ordered, deduplicated node and edge id lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Selected node ids, in selection order
    pub nodes: Vec<NodeId>,
    /// Selected edge ids, in selection order
    pub edges: Vec<EdgeId>,
}

impl Selection {
    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Tracks the selection and the stability window for the action menu.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    current: Selection,
    last_changed: Option<Instant>,
}

impl SelectionTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selection, deduplicating while preserving order.
    ///
    /// The stability clock restarts only when the stored selection actually
    /// changes, so repeated identical updates (e.g. a held pointer) do not
    /// keep the menu hidden.
    pub fn set_selection(&mut self, nodes: Vec<NodeId>, edges: Vec<EdgeId>, now: Instant) {
        let next = Selection {
            nodes: dedup_preserving_order(nodes),
            edges: dedup_preserving_order(edges),
        };
        if next != self.current {
            self.current = next;
            self.last_changed = Some(now);
        }
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        if !self.current.is_empty() {
            self.current = Selection::default();
            self.last_changed = None;
        }
    }

    /// The current selection.
    pub fn current(&self) -> &Selection {
        &self.current
    }

    /// Drops ids that no longer exist in the graph. Called by the engine
    /// after every store mutation.
    ///
    /// Pruning that removes anything is a selection change, so it restarts
    /// the stability clock like [`SelectionTracker::set_selection`] does.
    pub fn prune(&mut self, graph: &FlowGraph, now: Instant) {
        let before_nodes = self.current.nodes.len();
        let before_edges = self.current.edges.len();
        self.current.nodes.retain(|id| graph.contains_node(id));
        self.current.edges.retain(|id| graph.contains_edge(id));
        let dropped =
            (before_nodes - self.current.nodes.len()) + (before_edges - self.current.edges.len());
        if dropped > 0 {
            log::debug!("pruned {dropped} stale id(s) from selection");
            self.last_changed = Some(now);
        }
    }

    /// True if the current selection can be collapsed into a composite
    /// node: at least two nodes and no boundary edges.
    pub fn groupable(&self, graph: &FlowGraph) -> bool {
        grouping::validate_selection(graph, &self.current.nodes).is_ok()
    }

    /// Whether the floating action menu should be visible.
    ///
    /// True only once the selection has been stable for
    /// [`SELECTION_MENU_DEBOUNCE`] and is groupable; false immediately when
    /// the selection is empty or invalid.
    pub fn menu_visible(&self, graph: &FlowGraph, now: Instant) -> bool {
        if !self.groupable(graph) {
            return false;
        }
        match self.last_changed {
            Some(changed) => now.duration_since(changed) >= SELECTION_MENU_DEBOUNCE,
            None => false,
        }
    }
}

fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
