//! Connection validation: accepts or rejects a proposed edge between two
//! ports based on type compatibility and structural rules.

use crate::catalog::{TemplateCatalog, ANY_TYPE};
use crate::types::{FlowGraph, NodeId, SourceHandle, TargetHandle};

/// A proposed edge, before any graph mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionCandidate {
    /// Id of the proposed source node
    pub source: NodeId,
    /// Output port name on the source node
    pub source_port: String,
    /// Id of the proposed target node
    pub target: NodeId,
    /// Input field name on the target node
    pub target_field: String,
}

/// Why a candidate connection was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionRejection {
    /// One of the endpoint node ids does not exist in the graph.
    MissingNode(NodeId),
    /// Source and target refer to the same node.
    SelfLoop(NodeId),
    /// The source node's template has no such output port.
    UnknownOutputPort(String),
    /// The target node's template has no such input field.
    UnknownInputField(String),
    /// The produced and accepted type sets do not intersect.
    IncompatibleTypes {
        /// Types the source port produces
        produced: Vec<String>,
        /// Types the target field accepts
        accepted: Vec<String>,
    },
    /// An identical (source port, target field) edge already exists.
    DuplicateEdge,
}

/// Checks a candidate connection against the structural and type rules,
/// in order, returning the first violated rule.
///
/// Rules:
/// 1. both endpoint nodes exist and are distinct;
/// 2. the named output port and input field exist on their templates;
/// 3. the produced types intersect the accepted types, unless either side
///    is a wildcard;
/// 4. no edge already joins the same ordered (source port, target field)
///    pair.
pub fn check_connection(
    candidate: &ConnectionCandidate,
    graph: &FlowGraph,
    catalog: &TemplateCatalog,
) -> Result<(), ConnectionRejection> {
    // Rule 1: endpoints exist and are distinct.
    let source = graph
        .node(&candidate.source)
        .ok_or_else(|| ConnectionRejection::MissingNode(candidate.source.clone()))?;
    let target = graph
        .node(&candidate.target)
        .ok_or_else(|| ConnectionRejection::MissingNode(candidate.target.clone()))?;
    if candidate.source == candidate.target {
        return Err(ConnectionRejection::SelfLoop(candidate.source.clone()));
    }

    // Rule 2: ports exist on the respective templates.
    let output = catalog
        .get(&source.node_type)
        .and_then(|t| t.output(&candidate.source_port))
        .ok_or_else(|| ConnectionRejection::UnknownOutputPort(candidate.source_port.clone()))?;
    let input = catalog
        .get(&target.node_type)
        .and_then(|t| t.input(&candidate.target_field))
        .ok_or_else(|| ConnectionRejection::UnknownInputField(candidate.target_field.clone()))?;

    // Rule 3: type compatibility.
    if !types_compatible(&output.output_types, &input.input_types) {
        return Err(ConnectionRejection::IncompatibleTypes {
            produced: output.output_types.clone(),
            accepted: input.input_types.clone(),
        });
    }

    // Rule 4: no duplicate edge over the same ordered port pair.
    let duplicate = graph.edges().iter().any(|e| {
        e.source == candidate.source
            && e.target == candidate.target
            && e.source_handle.port == candidate.source_port
            && e.target_handle.field == candidate.target_field
    });
    if duplicate {
        return Err(ConnectionRejection::DuplicateEdge);
    }

    Ok(())
}

/// Boolean form of [`check_connection`], for callers that only gate a UI
/// affordance. Deterministic: a pure function of its inputs.
pub fn is_valid_connection(
    candidate: &ConnectionCandidate,
    graph: &FlowGraph,
    catalog: &TemplateCatalog,
) -> bool {
    check_connection(candidate, graph, catalog).is_ok()
}

/// Builds the cached edge handles for a validated candidate.
///
/// Returns `None` if either template or port cannot be resolved; callers
/// are expected to have run [`check_connection`] first.
pub fn resolve_handles(
    candidate: &ConnectionCandidate,
    graph: &FlowGraph,
    catalog: &TemplateCatalog,
) -> Option<(SourceHandle, TargetHandle)> {
    let source = graph.node(&candidate.source)?;
    let target = graph.node(&candidate.target)?;
    let output = catalog.get(&source.node_type)?.output(&candidate.source_port)?;
    let input = catalog.get(&target.node_type)?.input(&candidate.target_field)?;
    Some((
        SourceHandle {
            port: output.port.clone(),
            output_types: output.output_types.clone(),
        },
        TargetHandle {
            field: input.field.clone(),
            input_types: input.input_types.clone(),
        },
    ))
}

fn is_wildcard(types: &[String]) -> bool {
    types.is_empty() || types.iter().any(|t| t == ANY_TYPE)
}

fn types_compatible(produced: &[String], accepted: &[String]) -> bool {
    if is_wildcard(produced) || is_wildcard(accepted) {
        return true;
    }
    produced.iter().any(|t| accepted.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlowEdge, FlowNode, Position};

    fn graph_with(catalog: &TemplateCatalog, types: &[&str]) -> (FlowGraph, Vec<NodeId>) {
        let mut graph = FlowGraph::new();
        let mut ids = Vec::new();
        for (i, t) in types.iter().enumerate() {
            let node = catalog
                .instantiate(t, Position::new(i as f32 * 150.0, 0.0))
                .unwrap();
            ids.push(graph.add_node(node).unwrap());
        }
        (graph, ids)
    }

    #[test]
    fn test_valid_connection_str_to_str() {
        let catalog = TemplateCatalog::builtin();
        let (graph, ids) = graph_with(&catalog, &["text_input", "prompt"]);
        let candidate = ConnectionCandidate {
            source: ids[0].clone(),
            source_port: "text".into(),
            target: ids[1].clone(),
            target_field: "template_vars".into(),
        };
        assert!(is_valid_connection(&candidate, &graph, &catalog));
    }

    #[test]
    fn test_duplicate_edge_rejected() {
        let catalog = TemplateCatalog::builtin();
        let (mut graph, ids) = graph_with(&catalog, &["text_input", "prompt"]);
        let candidate = ConnectionCandidate {
            source: ids[0].clone(),
            source_port: "text".into(),
            target: ids[1].clone(),
            target_field: "template_vars".into(),
        };
        assert_eq!(check_connection(&candidate, &graph, &catalog), Ok(()));

        let (sh, th) = resolve_handles(&candidate, &graph, &catalog).unwrap();
        graph
            .add_edge(FlowEdge::new(ids[0].clone(), sh, ids[1].clone(), th))
            .unwrap();

        assert_eq!(
            check_connection(&candidate, &graph, &catalog),
            Err(ConnectionRejection::DuplicateEdge)
        );
    }

    #[test]
    fn test_self_loop_rejected() {
        let catalog = TemplateCatalog::builtin();
        let (graph, ids) = graph_with(&catalog, &["language_model"]);
        let candidate = ConnectionCandidate {
            source: ids[0].clone(),
            source_port: "response".into(),
            target: ids[0].clone(),
            target_field: "prompt".into(),
        };
        assert_eq!(
            check_connection(&candidate, &graph, &catalog),
            Err(ConnectionRejection::SelfLoop(ids[0].clone()))
        );
    }

    #[test]
    fn test_missing_node_rejected() {
        let catalog = TemplateCatalog::builtin();
        let (graph, ids) = graph_with(&catalog, &["text_input"]);
        let candidate = ConnectionCandidate {
            source: ids[0].clone(),
            source_port: "text".into(),
            target: "gone-00000".into(),
            target_field: "text".into(),
        };
        assert_eq!(
            check_connection(&candidate, &graph, &catalog),
            Err(ConnectionRejection::MissingNode("gone-00000".into()))
        );
    }

    #[test]
    fn test_unknown_port_rejected() {
        let catalog = TemplateCatalog::builtin();
        let (graph, ids) = graph_with(&catalog, &["text_input", "prompt"]);
        let candidate = ConnectionCandidate {
            source: ids[0].clone(),
            source_port: "no_such_port".into(),
            target: ids[1].clone(),
            target_field: "template_vars".into(),
        };
        assert_eq!(
            check_connection(&candidate, &graph, &catalog),
            Err(ConnectionRejection::UnknownOutputPort("no_such_port".into()))
        );
    }

    #[test]
    fn test_incompatible_types_rejected() {
        let catalog = TemplateCatalog::builtin();
        // prompt produces {str, prompt}; nothing here produces what a
        // text_input accepts, because text_input has no inputs at all.
        let (graph, ids) = graph_with(&catalog, &["language_model", "prompt"]);
        // language_model response = {str, message}; prompt.template_vars
        // accepts {str} so that is fine; check an actually incompatible pair
        // via a custom template.
        let mut catalog = catalog;
        catalog.register(crate::catalog::NodeTemplate {
            type_tag: "image_sink".into(),
            display_name: "Image Sink".into(),
            inputs: vec![crate::catalog::InputPort {
                field: "image".into(),
                input_types: vec!["image".into()],
            }],
            outputs: vec![],
            defaults: serde_json::Map::new(),
        });
        let mut graph = graph;
        let sink = graph
            .add_node(catalog.instantiate("image_sink", Position::new(300.0, 0.0)).unwrap())
            .unwrap();

        let candidate = ConnectionCandidate {
            source: ids[1].clone(),
            source_port: "prompt".into(),
            target: sink,
            target_field: "image".into(),
        };
        assert!(matches!(
            check_connection(&candidate, &graph, &catalog),
            Err(ConnectionRejection::IncompatibleTypes { .. })
        ));
    }

    #[test]
    fn test_wildcard_accepts_anything() {
        let catalog = TemplateCatalog::builtin();
        // The composite template declares wildcard ports on both sides.
        let (graph, ids) = graph_with(&catalog, &["text_input", "composite"]);
        let candidate = ConnectionCandidate {
            source: ids[0].clone(),
            source_port: "text".into(),
            target: ids[1].clone(),
            target_field: "input".into(),
        };
        assert!(is_valid_connection(&candidate, &graph, &catalog));
    }

    #[test]
    fn test_validator_is_deterministic() {
        let catalog = TemplateCatalog::builtin();
        let (graph, ids) = graph_with(&catalog, &["text_input", "prompt"]);
        let candidate = ConnectionCandidate {
            source: ids[0].clone(),
            source_port: "text".into(),
            target: ids[1].clone(),
            target_field: "template_vars".into(),
        };
        let first = is_valid_connection(&candidate, &graph, &catalog);
        for _ in 0..10 {
            assert_eq!(is_valid_connection(&candidate, &graph, &catalog), first);
        }
    }
}
