//! Keyboard shortcut dispatch: maps named logical actions onto engine
//! intents.
//!
//! Actions originating inside a text-input context are suppressed entirely
//! so the engine never intercepts normal text editing (e.g. Ctrl+C in a
//! node's name field).

use crate::engine::{EditIntent, FlowEditor};
use crate::error::EngineError;
use std::time::Instant;

/// Named logical editor actions, as produced by the embedding
/// application's keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Undo the last structural mutation
    Undo,
    /// Redo the last undone mutation
    Redo,
    /// Copy the selection
    Copy,
    /// Cut the selection
    Cut,
    /// Paste at the pointer
    Paste,
    /// Duplicate the selection in place
    Duplicate,
    /// Delete the selection
    Delete,
    /// Group the selected nodes
    Group,
    /// Expand the selected composite node
    Ungroup,
}

impl EditorAction {
    fn intent(self) -> EditIntent {
        match self {
            EditorAction::Undo => EditIntent::Undo,
            EditorAction::Redo => EditIntent::Redo,
            EditorAction::Copy => EditIntent::Copy,
            EditorAction::Cut => EditIntent::Cut,
            EditorAction::Paste => EditIntent::Paste,
            EditorAction::Duplicate => EditIntent::Duplicate,
            EditorAction::Delete => EditIntent::DeleteSelection,
            EditorAction::Group => EditIntent::Group,
            EditorAction::Ungroup => EditIntent::Ungroup,
        }
    }
}

/// Forwards an action to the engine unless a text input currently has
/// focus, in which case the action is swallowed.
pub fn dispatch_action(
    editor: &mut FlowEditor,
    action: EditorAction,
    in_text_input: bool,
    now: Instant,
) -> Result<(), EngineError> {
    if in_text_input {
        log::debug!("suppressed {action:?} inside text input");
        return Ok(());
    }
    editor.apply(action.intent(), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TemplateCatalog;
    use crate::types::Position;

    fn editor_with_node() -> FlowEditor {
        let mut editor = FlowEditor::new(TemplateCatalog::builtin());
        editor
            .ingest_drop(
                crate::engine::ingest::DropPayload::Template {
                    type_tag: "prompt".into(),
                },
                Position::new(0.0, 0.0),
                Instant::now(),
            )
            .unwrap();
        editor
    }

    #[test]
    fn test_delete_action_forwards_to_engine() {
        let mut editor = editor_with_node();
        assert_eq!(editor.graph().node_count(), 1);
        // Template ingestion selects the new node.
        dispatch_action(&mut editor, EditorAction::Delete, false, Instant::now()).unwrap();
        assert_eq!(editor.graph().node_count(), 0);
    }

    #[test]
    fn test_action_suppressed_in_text_input() {
        let mut editor = editor_with_node();
        dispatch_action(&mut editor, EditorAction::Delete, true, Instant::now()).unwrap();
        assert_eq!(editor.graph().node_count(), 1);

        dispatch_action(&mut editor, EditorAction::Undo, true, Instant::now()).unwrap();
        assert_eq!(editor.graph().node_count(), 1);
    }

    #[test]
    fn test_undo_action_reverses_delete() {
        let mut editor = editor_with_node();
        dispatch_action(&mut editor, EditorAction::Delete, false, Instant::now()).unwrap();
        assert_eq!(editor.graph().node_count(), 0);

        dispatch_action(&mut editor, EditorAction::Undo, false, Instant::now()).unwrap();
        assert_eq!(editor.graph().node_count(), 1);
    }
}
