//! The interactive editing engine.
//!
//! `FlowEditor` owns the graph store and coordinates selection, history,
//! clipboard, grouping, connection validation, drop ingestion, and autosave
//! scheduling. User gestures arrive as discrete [`EditIntent`]s; every
//! user-initiated structural mutation is preceded by a history snapshot and
//! followed by selection pruning and autosave scheduling.
//!
//! The engine is single-threaded and synchronous: each intent completes
//! before control returns to the caller. The only shared ambient value is
//! the last known pointer position, updated by the embedding application
//! and read by paste/duplicate/ingest.

pub mod autosave;
pub mod clipboard;
pub mod grouping;
pub mod history;
pub mod ingest;
pub mod selection;
pub mod shortcuts;


use crate::catalog::TemplateCatalog;
use crate::connection::{check_connection, resolve_handles, ConnectionCandidate, ConnectionRejection};
use crate::error::{EngineError, GroupingError, IngestError, PersistenceFailure};
use crate::types::{EdgeId, FlowDocument, FlowEdge, FlowGraph, NodeId, Position, Viewport};
use autosave::{AutosaveScheduler, PersistenceSink};
use clipboard::{copy_selection, paste_payload, Clipboard, ClipboardPayload};
use history::History;
use ingest::DropPayload;
use selection::SelectionTracker;
use std::time::Instant;

/// A discrete user intent applied to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EditIntent {
    /// Connect two ports, subject to validation.
    Connect(ConnectionCandidate),
    /// Delete the current selection (nodes cascade their edges).
    DeleteSelection,
    /// Collapse the selected nodes into a composite node.
    Group,
    /// Expand the selected composite node back into its members.
    Ungroup,
    /// Copy the selection to the clipboard.
    Copy,
    /// Copy the selection, then delete it.
    Cut,
    /// Paste the clipboard at the last known pointer position.
    Paste,
    /// Copy and immediately paste the selection at a small offset.
    Duplicate,
    /// Restore the previous snapshot.
    Undo,
    /// Restore the previously undone snapshot.
    Redo,
}

/// User-facing events surfaced to the embedding application.
///
/// The engine never swallows a user-relevant failure: it queues one of
/// these and carries on with unchanged state.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// An autosave request failed; local state is retained.
    AutosaveFailed(PersistenceFailure),
    /// A grouping attempt was rejected, with the offending edges.
    GroupingRejected(GroupingError),
    /// A proposed connection was rejected.
    ConnectionRejected(ConnectionRejection),
    /// A dropped payload could not be ingested.
    DropRejected(IngestError),
}

/// The graph editing engine.
pub struct FlowEditor {
    graph: FlowGraph,
    catalog: TemplateCatalog,
    selection: SelectionTracker,
    history: History,
    clipboard: Clipboard,
    autosave: AutosaveScheduler,
    pointer: Position,
    notifications: Vec<Notification>,
    dragging: bool,
}

impl FlowEditor {
    /// Creates an engine with an empty graph and the given template catalog.
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self {
            graph: FlowGraph::new(),
            catalog,
            selection: SelectionTracker::new(),
            history: History::new(),
            clipboard: Clipboard::new(),
            autosave: AutosaveScheduler::new(),
            pointer: Position::new(0.0, 0.0),
            notifications: Vec::new(),
            dragging: false,
        }
    }

    /// Read access to the live graph.
    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    /// The template catalog in use.
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// The current selection.
    pub fn selection(&self) -> &selection::Selection {
        self.selection.current()
    }

    /// The clipboard.
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// True if there is a snapshot to undo to.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// True if there is a snapshot to redo to.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Updates the ambient last-known pointer position (world units).
    /// Last-write-wins; read by paste, duplicate and ingestion.
    pub fn set_pointer(&mut self, position: Position) {
        if position.is_finite() {
            self.pointer = position;
        }
    }

    /// Updates the canvas viewport (pan/zoom).
    ///
    /// Not a structural mutation: no snapshot is taken and no save is
    /// scheduled, but the next snapshot or save body carries the new
    /// viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.graph.set_viewport(viewport);
    }

    /// Replaces the selection.
    pub fn set_selection(&mut self, nodes: Vec<NodeId>, edges: Vec<EdgeId>, now: Instant) {
        self.selection.set_selection(nodes, edges, now);
        self.selection.prune(&self.graph, now);
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Whether the floating selection-action menu should be shown.
    pub fn menu_visible(&self, now: Instant) -> bool {
        self.selection.menu_visible(&self.graph, now)
    }

    /// Drains and returns all pending notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Applies a user intent.
    ///
    /// User-facing rejections (invalid connection, ungroupable selection,
    /// malformed drop) do not error: they queue a [`Notification`] and
    /// leave the graph unchanged. `Err` indicates an internal integrity
    /// failure.
    pub fn apply(&mut self, intent: EditIntent, now: Instant) -> Result<(), EngineError> {
        match intent {
            EditIntent::Connect(candidate) => self.connect(candidate, now),
            EditIntent::DeleteSelection => self.delete_selection(now),
            EditIntent::Group => self.group(now),
            EditIntent::Ungroup => self.ungroup(now),
            EditIntent::Copy => {
                self.copy();
                Ok(())
            }
            EditIntent::Cut => self.cut(now),
            EditIntent::Paste => self.paste(now),
            EditIntent::Duplicate => self.duplicate(now),
            EditIntent::Undo => {
                self.undo(now);
                Ok(())
            }
            EditIntent::Redo => {
                self.redo(now);
                Ok(())
            }
        }
    }

    /// Validates and inserts a new edge.
    ///
    /// Rejections are reported via [`Notification::ConnectionRejected`].
    pub fn connect(
        &mut self,
        candidate: ConnectionCandidate,
        now: Instant,
    ) -> Result<(), EngineError> {
        if let Err(rejection) = check_connection(&candidate, &self.graph, &self.catalog) {
            log::debug!("connection rejected: {rejection:?}");
            self.notifications
                .push(Notification::ConnectionRejected(rejection));
            return Ok(());
        }
        // Validation passed, so the handles resolve.
        let Some((source_handle, target_handle)) =
            resolve_handles(&candidate, &self.graph, &self.catalog)
        else {
            return Ok(());
        };
        self.history.take_snapshot(&self.graph);
        self.graph.add_edge(FlowEdge::new(
            candidate.source,
            source_handle,
            candidate.target,
            target_handle,
        ))?;
        self.after_mutation(now);
        Ok(())
    }

    /// Deletes the selected edges and nodes (with cascade).
    pub fn delete_selection(&mut self, now: Instant) -> Result<(), EngineError> {
        let selection = self.selection.current().clone();
        if selection.is_empty() {
            return Ok(());
        }
        self.history.take_snapshot(&self.graph);
        self.graph.remove_edges(&selection.edges);
        self.graph.remove_nodes(&selection.nodes);
        self.selection.clear();
        self.after_mutation(now);
        Ok(())
    }

    /// Copies the selection to the clipboard. No graph mutation.
    pub fn copy(&mut self) {
        self.clipboard.copy(&self.graph, self.selection.current());
    }

    /// Copies the selection, then deletes it.
    pub fn cut(&mut self, now: Instant) -> Result<(), EngineError> {
        if self.selection.current().is_empty() {
            return Ok(());
        }
        self.copy();
        self.delete_selection(now)
    }

    /// Pastes the clipboard centered at the last known pointer position.
    pub fn paste(&mut self, now: Instant) -> Result<(), EngineError> {
        let Some(payload) = self.clipboard.payload().cloned() else {
            return Ok(());
        };
        self.paste_at(&payload, self.pointer, now)
    }

    /// Copies the selection and pastes it back at a small offset from the
    /// selection's own center.
    pub fn duplicate(&mut self, now: Instant) -> Result<(), EngineError> {
        let payload = copy_selection(&self.graph, self.selection.current());
        if payload.is_empty() {
            return Ok(());
        }
        let center = grouping::bounding_box_center(&payload.nodes);
        let (dx, dy) = crate::constants::DUPLICATE_OFFSET;
        let anchor = Position::new(center.x + dx, center.y + dy);
        self.paste_at(&payload, anchor, now)
    }

    fn paste_at(
        &mut self,
        payload: &ClipboardPayload,
        target: Position,
        now: Instant,
    ) -> Result<(), EngineError> {
        if payload.is_empty() {
            return Ok(());
        }
        self.history.take_snapshot(&self.graph);
        let outcome = paste_payload(&mut self.graph, payload, target);
        self.selection
            .set_selection(outcome.node_ids, outcome.edge_ids, now);
        self.after_mutation(now);
        Ok(())
    }

    /// Collapses the selected nodes into a composite node.
    ///
    /// Rejections (too few nodes, boundary edges) are reported via
    /// [`Notification::GroupingRejected`] with the offending edge ids.
    pub fn group(&mut self, now: Instant) -> Result<(), EngineError> {
        let nodes = self.selection.current().nodes.clone();
        if let Err(rejection) = grouping::validate_selection(&self.graph, &nodes) {
            log::debug!("grouping rejected: {rejection}");
            self.notifications
                .push(Notification::GroupingRejected(rejection));
            return Ok(());
        }
        self.history.take_snapshot(&self.graph);
        let composite_id = grouping::group(&mut self.graph, &nodes)?;
        self.selection
            .set_selection(vec![composite_id], Vec::new(), now);
        self.after_mutation(now);
        Ok(())
    }

    /// Expands the selected composite node back into its members.
    ///
    /// The nested nodes are re-inserted through the paste path (fresh ids)
    /// centered on the composite's position. A no-op when the selection
    /// does not contain a composite node.
    pub fn ungroup(&mut self, now: Instant) -> Result<(), EngineError> {
        let Some((composite_id, nested)) = self
            .selection
            .current()
            .nodes
            .iter()
            .find_map(|id| grouping::nested_flow(&self.graph, id).map(|doc| (id.clone(), doc)))
        else {
            return Ok(());
        };
        // Guaranteed present: nested_flow resolved through this node.
        let Some(center) = self.graph.node(&composite_id).map(|n| n.position) else {
            return Ok(());
        };
        self.history.take_snapshot(&self.graph);
        self.graph.remove_nodes(std::slice::from_ref(&composite_id));
        let outcome = paste_payload(
            &mut self.graph,
            &ClipboardPayload::from_document(nested),
            center,
        );
        self.selection
            .set_selection(outcome.node_ids, outcome.edge_ids, now);
        self.after_mutation(now);
        Ok(())
    }

    /// Restores the previous snapshot. A no-op when the undo stack is
    /// empty.
    pub fn undo(&mut self, now: Instant) {
        if self.history.undo(&mut self.graph) {
            self.after_mutation(now);
        }
    }

    /// Restores the previously undone snapshot. A no-op when the redo
    /// stack is empty.
    pub fn redo(&mut self, now: Instant) {
        if self.history.redo(&mut self.graph) {
            self.after_mutation(now);
        }
    }

    /// Starts a drag gesture over the selected nodes, taking exactly one
    /// snapshot for the whole gesture.
    pub fn begin_drag(&mut self) {
        if self.dragging {
            return;
        }
        self.dragging = true;
        self.history.take_snapshot(&self.graph);
    }

    /// Moves a node during an active drag gesture. Position updates are
    /// not structural: no snapshot, no autosave.
    pub fn drag_to(&mut self, node_id: &str, position: Position) -> Result<(), EngineError> {
        self.graph.update_node_position(node_id, position)?;
        Ok(())
    }

    /// Ends the current drag gesture.
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Ingests an external drop payload at the given canvas position.
    ///
    /// Failures (unknown template, malformed file) are reported via
    /// [`Notification::DropRejected`] and leave the graph unchanged.
    pub fn ingest_drop(
        &mut self,
        payload: DropPayload,
        drop_position: Position,
        now: Instant,
    ) -> Result<(), EngineError> {
        let document = match payload {
            DropPayload::Template { type_tag } => {
                match self.catalog.instantiate(&type_tag, drop_position) {
                    Ok(node) => FlowDocument {
                        nodes: vec![node],
                        edges: Vec::new(),
                        viewport: self.graph.viewport(),
                    },
                    Err(e) => {
                        log::debug!("template drop rejected: {e}");
                        self.notifications.push(Notification::DropRejected(e));
                        return Ok(());
                    }
                }
            }
            DropPayload::File { contents } => match ingest::parse_flow_file(&contents) {
                Ok(document) => document,
                Err(e) => {
                    log::debug!("file drop rejected: {e}");
                    self.notifications.push(Notification::DropRejected(e));
                    return Ok(());
                }
            },
        };
        let payload = ClipboardPayload::from_document(document);
        self.paste_at(&payload, drop_position, now)
    }

    /// Fires a pending autosave if its debounce window has elapsed.
    ///
    /// Failures queue [`Notification::AutosaveFailed`]; the save is retried
    /// after the next structural mutation.
    pub fn poll_autosave(&mut self, now: Instant, sink: &mut dyn PersistenceSink) {
        if let Some(Err(failure)) = self.autosave.poll(now, &self.graph, sink) {
            self.notifications
                .push(Notification::AutosaveFailed(failure));
        }
    }

    /// Post-mutation bookkeeping: prune the selection against the live
    /// graph and schedule autosave for structural changes.
    fn after_mutation(&mut self, now: Instant) {
        self.selection.prune(&self.graph, now);
        if self.graph.take_structurally_dirty() {
            self.autosave.mark_dirty(now);
        }
    }
}
