//! Node template catalog: the port schemas and default payloads that back
//! connection validation and drop ingestion.
//!
//! The catalog is supplied by the embedding application; a small curated
//! built-in set is provided for the binary, documentation examples, and
//! tests.

use crate::error::IngestError;
use crate::types::{FlowNode, NodeData, Position};
use serde_json::json;
use std::collections::HashMap;

/// Type tag used for composite nodes produced by grouping.
pub const COMPOSITE_TYPE: &str = "composite";

/// Wildcard type name accepted/produced by untyped ports.
pub const ANY_TYPE: &str = "any";

/// An input field on a node template that edges may attach to.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPort {
    /// Field name, unique within the template
    pub field: String,
    /// Accepted types; empty or containing [`ANY_TYPE`] means wildcard
    pub input_types: Vec<String>,
}

/// An output port on a node template that edges may leave from.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPort {
    /// Port name, unique within the template
    pub port: String,
    /// Produced types; empty or containing [`ANY_TYPE`] means wildcard
    pub output_types: Vec<String>,
}

/// Schema and defaults for one node type.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTemplate {
    /// Type tag, also used as the id prefix of instantiated nodes
    pub type_tag: String,
    /// Human-friendly display name
    pub display_name: String,
    /// Input fields edges may target
    pub inputs: Vec<InputPort>,
    /// Output ports edges may originate from
    pub outputs: Vec<OutputPort>,
    /// Default field values for new instances
    pub defaults: serde_json::Map<String, serde_json::Value>,
}

impl NodeTemplate {
    /// Looks up an input field by name.
    pub fn input(&self, field: &str) -> Option<&InputPort> {
        self.inputs.iter().find(|p| p.field == field)
    }

    /// Looks up an output port by name.
    pub fn output(&self, port: &str) -> Option<&OutputPort> {
        self.outputs.iter().find(|p| p.port == port)
    }
}

/// Maps type tags to node templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: HashMap<String, NodeTemplate>,
}

impl TemplateCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template, replacing any previous one with the same tag.
    pub fn register(&mut self, template: NodeTemplate) {
        self.templates.insert(template.type_tag.clone(), template);
    }

    /// Looks up a template by type tag.
    pub fn get(&self, type_tag: &str) -> Option<&NodeTemplate> {
        self.templates.get(type_tag)
    }

    /// Instantiates a new node of the named type at the given position,
    /// seeded with the template's default field values.
    pub fn instantiate(
        &self,
        type_tag: &str,
        position: Position,
    ) -> Result<FlowNode, IngestError> {
        let template = self
            .templates
            .get(type_tag)
            .ok_or_else(|| IngestError::UnknownTemplate {
                type_tag: type_tag.to_string(),
            })?;
        Ok(FlowNode {
            id: crate::types::node_id_for(type_tag),
            node_type: type_tag.to_string(),
            position,
            data: NodeData {
                template: template.type_tag.clone(),
                fields: template.defaults.clone(),
            },
        })
    }

    /// A small curated set of templates: a text source, a prompt, a language
    /// model, a text sink, and the composite container used by grouping.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(NodeTemplate {
            type_tag: "text_input".into(),
            display_name: "Text Input".into(),
            inputs: vec![],
            outputs: vec![OutputPort {
                port: "text".into(),
                output_types: vec!["str".into()],
            }],
            defaults: json_fields(json!({ "value": "" })),
        });
        catalog.register(NodeTemplate {
            type_tag: "prompt".into(),
            display_name: "Prompt".into(),
            inputs: vec![InputPort {
                field: "template_vars".into(),
                input_types: vec!["str".into()],
            }],
            outputs: vec![OutputPort {
                port: "prompt".into(),
                output_types: vec!["str".into(), "prompt".into()],
            }],
            defaults: json_fields(json!({ "template": "{input}" })),
        });
        catalog.register(NodeTemplate {
            type_tag: "language_model".into(),
            display_name: "Language Model".into(),
            inputs: vec![
                InputPort {
                    field: "prompt".into(),
                    input_types: vec!["str".into(), "prompt".into()],
                },
                InputPort {
                    field: "system_message".into(),
                    input_types: vec!["str".into()],
                },
            ],
            outputs: vec![OutputPort {
                port: "response".into(),
                output_types: vec!["str".into(), "message".into()],
            }],
            defaults: json_fields(json!({ "temperature": 0.7 })),
        });
        catalog.register(NodeTemplate {
            type_tag: "text_output".into(),
            display_name: "Text Output".into(),
            inputs: vec![InputPort {
                field: "text".into(),
                input_types: vec!["str".into(), "message".into()],
            }],
            outputs: vec![],
            defaults: serde_json::Map::new(),
        });
        // The composite container declares wildcard ports so grouped
        // sub-graphs can still be wired up after creation.
        catalog.register(NodeTemplate {
            type_tag: COMPOSITE_TYPE.into(),
            display_name: "Group".into(),
            inputs: vec![InputPort {
                field: "input".into(),
                input_types: vec![],
            }],
            outputs: vec![OutputPort {
                port: "output".into(),
                output_types: vec![],
            }],
            defaults: serde_json::Map::new(),
        });
        catalog
    }
}

fn json_fields(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}
