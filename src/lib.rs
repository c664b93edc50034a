//! # Flow Editor
//!
//! A headless graph-editing engine for a visual flow builder. The engine
//! owns the in-memory graph of nodes and edges and provides everything an
//! interactive editor needs on top of it:
//! - **Graph store**: atomic node/edge mutations with cascade deletion
//! - **Selection**: tracked, pruned, and debounced for UI affordances
//! - **Undo/redo**: snapshot-based history with a bounded depth
//! - **Clipboard**: copy/cut/paste/duplicate of sub-graphs with fresh ids
//! - **Grouping**: collapse a closed selection into a composite node
//! - **Connection validation**: port existence and type compatibility
//! - **Drop ingestion**: node templates and serialized flow files
//! - **Autosave**: debounced, best-effort persistence scheduling
//!
//! Rendering, styling, and network persistence are deliberately left to the
//! embedding application; the engine exposes the contracts they drive.
//!
//! ## Example
//!
//! ```
//! use floweditor::{DropPayload, EditIntent, FlowEditor, Position, TemplateCatalog};
//! use std::time::Instant;
//!
//! let mut editor = FlowEditor::new(TemplateCatalog::builtin());
//! editor
//!     .ingest_drop(
//!         DropPayload::Template { type_tag: "prompt".into() },
//!         Position::new(100.0, 100.0),
//!         Instant::now(),
//!     )
//!     .unwrap();
//! assert_eq!(editor.graph().node_count(), 1);
//!
//! editor.apply(EditIntent::Undo, Instant::now()).unwrap();
//! assert_eq!(editor.graph().node_count(), 0);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod catalog;
mod connection;
mod constants;
mod engine;
mod error;
mod types;

// Re-export the public surface.
pub use catalog::{InputPort, NodeTemplate, OutputPort, TemplateCatalog, ANY_TYPE, COMPOSITE_TYPE};
pub use connection::{
    check_connection, is_valid_connection, ConnectionCandidate, ConnectionRejection,
};
pub use constants::{
    AUTOSAVE_DEBOUNCE, DUPLICATE_OFFSET, MAX_UNDO_HISTORY, SELECTION_MENU_DEBOUNCE,
};
pub use engine::autosave::{AutosaveScheduler, PersistenceSink};
pub use engine::clipboard::{Clipboard, ClipboardPayload, PasteOutcome};
pub use engine::grouping::{nested_flow, validate_selection, NESTED_FLOW_FIELD};
pub use engine::history::History;
pub use engine::ingest::{parse_flow_file, DropPayload};
pub use engine::selection::{Selection, SelectionTracker};
pub use engine::shortcuts::{dispatch_action, EditorAction};
pub use engine::{EditIntent, FlowEditor, Notification};
pub use error::{
    BoundaryViolation, EngineError, GraphError, GroupingError, IngestError, PersistenceFailure,
};
pub use types::{
    EdgeId, FlowDocument, FlowEdge, FlowGraph, FlowNode, NodeData, NodeId, Position, SourceHandle,
    TargetHandle, Viewport,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_editor() {
        let editor = FlowEditor::new(TemplateCatalog::builtin());
        assert_eq!(editor.graph().node_count(), 0);
        assert!(editor.selection().is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_builtin_validator_example() {
        let catalog = TemplateCatalog::builtin();
        assert!(catalog.get("prompt").is_some());
        assert!(catalog.get("composite").is_some());
    }
}
