//! Undo/redo history built on whole-graph snapshots.
//!
//! Each entry is an immutable deep copy of `{nodes, edges, viewport}`; the
//! engine takes a snapshot immediately before applying any user-initiated
//! structural mutation, so undo always restores the state just prior to
//! that action. Continuous gestures snapshot once at gesture start.

use crate::constants::MAX_UNDO_HISTORY;
use crate::types::{FlowDocument, FlowGraph};

/// Undo/redo stacks of graph snapshots.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<FlowDocument>,
    redo_stack: Vec<FlowDocument>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a snapshot of the current graph onto the undo stack and
    /// clears the redo stack.
    ///
    /// History depth is capped at [`MAX_UNDO_HISTORY`]; the oldest snapshot
    /// is dropped once the cap is reached.
    pub fn take_snapshot(&mut self, graph: &FlowGraph) {
        self.undo_stack.push(graph.to_document());
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Returns true if there is a snapshot to undo to.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there is a snapshot to redo to.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Restores the most recent undo snapshot into the graph, pushing the
    /// pre-undo state onto the redo stack.
    ///
    /// # Returns
    ///
    /// `true` if a snapshot was restored; `false` (a no-op) if the undo
    /// stack was empty.
    pub fn undo(&mut self, graph: &mut FlowGraph) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        let current = graph.to_document();
        // Snapshots were valid when captured, so restoring cannot fail.
        if let Err(e) = graph.replace_all(snapshot) {
            log::error!("undo restore failed, snapshot discarded: {e}");
            return false;
        }
        self.redo_stack.push(current);
        true
    }

    /// Mirror of [`History::undo`]: restores the most recent redo snapshot,
    /// pushing the pre-redo state onto the undo stack.
    pub fn redo(&mut self, graph: &mut FlowGraph) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let current = graph.to_document();
        if let Err(e) = graph.replace_all(snapshot) {
            log::error!("redo restore failed, snapshot discarded: {e}");
            return false;
        }
        self.undo_stack.push(current);
        true
    }

    /// Clears both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
