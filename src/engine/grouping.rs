//! Grouping: collapses a valid selection into a single composite node that
//! embeds the selected sub-graph.
//!
//! A selection is only groupable when no edge crosses its boundary; boundary
//! edges are collected and reported, never silently dropped.

use crate::catalog::COMPOSITE_TYPE;
use crate::error::{BoundaryViolation, GroupingError};
use crate::types::{FlowDocument, FlowGraph, FlowNode, NodeData, NodeId, Position, Viewport};
use std::collections::HashSet;

/// Field name under which a composite node embeds its nested sub-graph.
pub const NESTED_FLOW_FIELD: &str = "flow";

/// Checks whether the given nodes form a groupable selection.
///
/// Requires at least two selected nodes that exist in the graph, and no
/// boundary edges (edges with exactly one endpoint inside the selection).
/// Violations report the offending edge together with its inside and
/// outside endpoints.
pub fn validate_selection(graph: &FlowGraph, node_ids: &[NodeId]) -> Result<(), GroupingError> {
    let inside: HashSet<&str> = node_ids
        .iter()
        .map(String::as_str)
        .filter(|id| graph.contains_node(id))
        .collect();
    if inside.len() < 2 {
        return Err(GroupingError::TooFewNodes {
            count: inside.len(),
        });
    }

    let mut violations = Vec::new();
    for edge in graph.edges() {
        let source_in = inside.contains(edge.source.as_str());
        let target_in = inside.contains(edge.target.as_str());
        if source_in != target_in {
            let (inside_id, outside_id) = if source_in {
                (&edge.source, &edge.target)
            } else {
                (&edge.target, &edge.source)
            };
            violations.push(BoundaryViolation {
                edge_id: edge.id.clone(),
                inside: inside_id.clone(),
                outside: outside_id.clone(),
            });
        }
    }
    if !violations.is_empty() {
        return Err(GroupingError::BoundaryEdges(violations));
    }
    Ok(())
}

/// Collapses the selection into a composite node.
///
/// The selected nodes and their internal edges are cloned into a nested
/// document embedded in the composite's payload; the originals are removed
/// (cascade applies) and the composite is inserted at the centroid of the
/// selection's bounding box.
///
/// # Returns
///
/// The id of the new composite node, or the validation error that made the
/// selection ungroupable. On error the graph is unchanged.
pub fn group(graph: &mut FlowGraph, node_ids: &[NodeId]) -> Result<NodeId, GroupingError> {
    validate_selection(graph, node_ids)?;

    let inside: HashSet<&str> = node_ids.iter().map(String::as_str).collect();
    let members: Vec<FlowNode> = graph
        .nodes()
        .filter(|n| inside.contains(n.id.as_str()))
        .cloned()
        .collect();
    let internal_edges = graph
        .edges()
        .iter()
        .filter(|e| inside.contains(e.source.as_str()) && inside.contains(e.target.as_str()))
        .cloned()
        .collect();

    let centroid = bounding_box_center(&members);
    let mut nested: Vec<FlowNode> = members;
    nested.sort_by(|a, b| a.id.cmp(&b.id));
    let document = FlowDocument {
        nodes: nested,
        edges: internal_edges,
        viewport: Viewport::default(),
    };

    let composite_id = graph.fresh_node_id(COMPOSITE_TYPE);
    let mut fields = serde_json::Map::new();
    fields.insert(
        NESTED_FLOW_FIELD.to_string(),
        serde_json::to_value(&document).unwrap_or_default(),
    );

    let owned_ids: Vec<NodeId> = node_ids.to_vec();
    graph.remove_nodes(&owned_ids);
    let composite = FlowNode {
        id: composite_id.clone(),
        node_type: COMPOSITE_TYPE.to_string(),
        position: centroid,
        data: NodeData {
            template: COMPOSITE_TYPE.to_string(),
            fields,
        },
    };
    // Fresh id and finite centroid: insertion cannot fail.
    if let Err(e) = graph.add_node(composite) {
        log::error!("composite insertion failed: {e}");
    }
    log::debug!(
        "grouped {} node(s) into composite {composite_id}",
        owned_ids.len()
    );
    Ok(composite_id)
}

/// Extracts the nested document embedded in a composite node, if the node
/// exists and carries one.
pub fn nested_flow(graph: &FlowGraph, composite_id: &str) -> Option<FlowDocument> {
    let node = graph.node(composite_id)?;
    let value = node.data.fields.get(NESTED_FLOW_FIELD)?;
    serde_json::from_value(value.clone()).ok()
}

/// Center of the axis-aligned bounding box of the given nodes.
pub(crate) fn bounding_box_center(nodes: &[FlowNode]) -> Position {
    if nodes.is_empty() {
        return Position::new(0.0, 0.0);
    }
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for node in nodes {
        min_x = min_x.min(node.position.x);
        min_y = min_y.min(node.position.y);
        max_x = max_x.max(node.position.x);
        max_y = max_y.max(node.position.y);
    }
    Position::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0)
}
