//! Drop ingestion: turns external drag-and-drop payloads into graph
//! mutations.
//!
//! Two payload kinds exist: a node template dragged from the sidebar, and a
//! serialized flow file dropped onto the canvas. Both are inserted through
//! the clipboard paste path so id freshness and target centering behave the
//! same everywhere.

use crate::error::IngestError;
use crate::types::FlowDocument;

/// An external payload dropped onto the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum DropPayload {
    /// Instantiate a new node of the named type at the drop position.
    Template {
        /// Type tag of the template to instantiate
        type_tag: String,
    },
    /// Insert the nodes/edges of a serialized flow document.
    File {
        /// Raw JSON contents of the dropped file
        contents: String,
    },
}

/// Parses and structurally validates a dropped flow file.
///
/// Well-formedness requires a parseable JSON document with unique node and
/// edge ids, finite positions, and every edge endpoint resolvable within
/// the document itself.
pub fn parse_flow_file(contents: &str) -> Result<FlowDocument, IngestError> {
    let document = FlowDocument::from_json(contents).map_err(|e| IngestError::MalformedFile {
        reason: format!("invalid JSON: {e}"),
    })?;
    document
        .validate()
        .map_err(|e| IngestError::MalformedFile {
            reason: e.to_string(),
        })?;
    Ok(document)
}
