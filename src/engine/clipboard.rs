//! Clipboard: copy/cut/paste/duplicate of selected sub-graphs.
//!
//! A payload is a fully detached copy of the selected nodes plus only the
//! edges internal to the selection; pasting regenerates every id and
//! translates positions so the group is centered on the paste target.

use crate::engine::grouping::bounding_box_center;
use crate::engine::selection::Selection;
use crate::types::{fresh_edge_id, EdgeId, FlowDocument, FlowGraph, FlowNode, NodeId, Position};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A detached copy of a selection, safe to hold across graph mutations.
///
/// Node and edge ids inside the payload are the originals at copy time;
/// they are remapped to fresh ids on every paste.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    /// Copied nodes
    pub nodes: Vec<FlowNode>,
    /// Edges whose both endpoints were inside the selection
    pub edges: Vec<crate::types::FlowEdge>,
}

impl ClipboardPayload {
    /// True if the payload contains no nodes.
    ///
    /// Edge-only payloads count as empty: an edge cannot be pasted without
    /// its endpoints.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Builds a payload from a detached document (used when ingesting
    /// dropped flow files).
    pub fn from_document(document: FlowDocument) -> Self {
        Self {
            nodes: document.nodes,
            edges: document.edges,
        }
    }
}

/// Ids created by a paste operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasteOutcome {
    /// Fresh ids of the pasted nodes, in payload order
    pub node_ids: Vec<NodeId>,
    /// Fresh ids of the pasted edges, in payload order
    pub edge_ids: Vec<EdgeId>,
}

/// Holds the most recent copied payload.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    payload: Option<ClipboardPayload>,
}

impl Clipboard {
    /// Creates an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the selected nodes and their internal edges into the
    /// clipboard. Edges crossing the selection boundary are dropped.
    pub fn copy(&mut self, graph: &FlowGraph, selection: &Selection) {
        self.payload = Some(copy_selection(graph, selection));
    }

    /// The current payload, if any.
    pub fn payload(&self) -> Option<&ClipboardPayload> {
        self.payload.as_ref()
    }

    /// True if there is nothing pasteable on the clipboard.
    pub fn is_empty(&self) -> bool {
        self.payload.as_ref().map_or(true, ClipboardPayload::is_empty)
    }
}

/// Clones the selected nodes, in selection order, plus the edges whose both
/// endpoints are inside the selection.
pub fn copy_selection(graph: &FlowGraph, selection: &Selection) -> ClipboardPayload {
    let inside: HashSet<&str> = selection.nodes.iter().map(String::as_str).collect();
    let nodes: Vec<FlowNode> = selection
        .nodes
        .iter()
        .filter_map(|id| graph.node(id))
        .cloned()
        .collect();
    let edges = graph
        .edges()
        .iter()
        .filter(|e| inside.contains(e.source.as_str()) && inside.contains(e.target.as_str()))
        .cloned()
        .collect();
    ClipboardPayload { nodes, edges }
}

/// Pastes a payload into the graph, centered on `target`.
///
/// Every node and edge receives a fresh id that cannot collide with the
/// live graph; edge endpoints are remapped accordingly and positions are
/// translated so the payload's bounding-box center lands on `target`.
/// Pasting an empty (or edge-only) payload is a no-op.
pub fn paste_payload(
    graph: &mut FlowGraph,
    payload: &ClipboardPayload,
    target: Position,
) -> PasteOutcome {
    if payload.is_empty() {
        return PasteOutcome::default();
    }

    let center = bounding_box_center(&payload.nodes);
    let offset = Position::new(target.x - center.x, target.y - center.y);

    // Assign fresh node ids up front so edge endpoints can be remapped.
    let mut id_map: HashMap<&str, NodeId> = HashMap::with_capacity(payload.nodes.len());
    let mut assigned: HashSet<NodeId> = HashSet::with_capacity(payload.nodes.len());
    for node in &payload.nodes {
        let mut fresh = graph.fresh_node_id(&node.node_type);
        while assigned.contains(&fresh) {
            fresh = graph.fresh_node_id(&node.node_type);
        }
        assigned.insert(fresh.clone());
        id_map.insert(node.id.as_str(), fresh);
    }

    let mut outcome = PasteOutcome::default();
    for node in &payload.nodes {
        let mut pasted = node.clone();
        pasted.id = id_map[node.id.as_str()].clone();
        pasted.position = Position::new(node.position.x + offset.x, node.position.y + offset.y);
        match graph.add_node(pasted) {
            Ok(id) => outcome.node_ids.push(id),
            Err(e) => log::error!("paste skipped node {}: {e}", node.id),
        }
    }
    for edge in &payload.edges {
        // Only edges fully internal to the payload are pasted.
        let (Some(source), Some(target)) = (
            id_map.get(edge.source.as_str()),
            id_map.get(edge.target.as_str()),
        ) else {
            continue;
        };
        let mut pasted = edge.clone();
        pasted.id = fresh_edge_id();
        pasted.source = source.clone();
        pasted.target = target.clone();
        match graph.add_edge(pasted) {
            Ok(id) => outcome.edge_ids.push(id),
            Err(e) => log::error!("paste skipped edge {}: {e}", edge.id),
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlowEdge, SourceHandle, TargetHandle};

    fn handles() -> (SourceHandle, TargetHandle) {
        (
            SourceHandle {
                port: "out".into(),
                output_types: vec!["str".into()],
            },
            TargetHandle {
                field: "in".into(),
                input_types: vec!["str".into()],
            },
        )
    }

    fn seeded_graph() -> (FlowGraph, Vec<NodeId>, Vec<EdgeId>) {
        let mut graph = FlowGraph::new();
        let a = graph
            .add_node(FlowNode::new("prompt", Position::new(0.0, 0.0)))
            .unwrap();
        let b = graph
            .add_node(FlowNode::new("model", Position::new(200.0, 100.0)))
            .unwrap();
        let c = graph
            .add_node(FlowNode::new("output", Position::new(400.0, 0.0)))
            .unwrap();
        let (sh, th) = handles();
        let ab = graph
            .add_edge(FlowEdge::new(a.clone(), sh.clone(), b.clone(), th.clone()))
            .unwrap();
        let bc = graph
            .add_edge(FlowEdge::new(b.clone(), sh, c.clone(), th))
            .unwrap();
        (graph, vec![a, b, c], vec![ab, bc])
    }

    #[test]
    fn test_copy_keeps_only_internal_edges() {
        let (graph, ids, edges) = seeded_graph();
        let selection = Selection {
            nodes: vec![ids[0].clone(), ids[1].clone()],
            edges: vec![],
        };
        let payload = copy_selection(&graph, &selection);

        assert_eq!(payload.nodes.len(), 2);
        assert_eq!(payload.edges.len(), 1);
        assert_eq!(payload.edges[0].id, edges[0]);
    }

    #[test]
    fn test_paste_generates_fresh_collision_free_ids() {
        let (mut graph, ids, _) = seeded_graph();
        let selection = Selection {
            nodes: vec![ids[0].clone(), ids[1].clone()],
            edges: vec![],
        };
        let payload = copy_selection(&graph, &selection);
        let before: HashSet<NodeId> = graph.nodes().map(|n| n.id.clone()).collect();

        let outcome = paste_payload(&mut graph, &payload, Position::new(500.0, 500.0));

        assert_eq!(outcome.node_ids.len(), 2);
        assert_eq!(outcome.edge_ids.len(), 1);
        for id in &outcome.node_ids {
            assert!(!before.contains(id));
        }
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_paste_centers_on_target() {
        let (mut graph, ids, _) = seeded_graph();
        let selection = Selection {
            nodes: vec![ids[0].clone(), ids[1].clone()],
            edges: vec![],
        };
        // Payload bbox spans (0,0)..(200,100), center (100,50).
        let payload = copy_selection(&graph, &selection);
        let outcome = paste_payload(&mut graph, &payload, Position::new(100.0, 100.0));

        let positions: Vec<Position> = outcome
            .node_ids
            .iter()
            .map(|id| graph.node(id).unwrap().position)
            .collect();
        let min_x = positions.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = positions.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = positions.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = positions.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        assert!(((min_x + max_x) / 2.0 - 100.0).abs() < 1e-3);
        assert!(((min_y + max_y) / 2.0 - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_paste_remaps_edge_endpoints() {
        let (mut graph, ids, _) = seeded_graph();
        let selection = Selection {
            nodes: vec![ids[0].clone(), ids[1].clone()],
            edges: vec![],
        };
        let payload = copy_selection(&graph, &selection);
        let outcome = paste_payload(&mut graph, &payload, Position::new(0.0, 0.0));

        let pasted_edge = graph.edge(&outcome.edge_ids[0]).unwrap();
        assert!(outcome.node_ids.contains(&pasted_edge.source));
        assert!(outcome.node_ids.contains(&pasted_edge.target));
        // Original endpoints are untouched.
        assert_ne!(pasted_edge.source, ids[0]);
        assert_ne!(pasted_edge.target, ids[1]);
    }

    #[test]
    fn test_paste_empty_payload_is_noop() {
        let (mut graph, _, _) = seeded_graph();
        let before = graph.to_document();
        let outcome = paste_payload(&mut graph, &ClipboardPayload::default(), Position::new(0.0, 0.0));
        assert_eq!(outcome, PasteOutcome::default());
        assert_eq!(graph.to_document(), before);
    }

    #[test]
    fn test_edge_only_payload_is_noop() {
        let (mut graph, _, edges) = seeded_graph();
        let payload = ClipboardPayload {
            nodes: vec![],
            edges: vec![graph.edge(&edges[0]).unwrap().clone()],
        };
        let before = graph.to_document();
        let outcome = paste_payload(&mut graph, &payload, Position::new(0.0, 0.0));
        assert!(outcome.node_ids.is_empty() && outcome.edge_ids.is_empty());
        assert_eq!(graph.to_document(), before);
    }

    #[test]
    fn test_payload_detached_from_live_graph() {
        let (mut graph, ids, _) = seeded_graph();
        let selection = Selection {
            nodes: ids.clone(),
            edges: vec![],
        };
        let payload = copy_selection(&graph, &selection);

        graph.remove_nodes(&ids);
        assert_eq!(graph.node_count(), 0);
        // The payload still pastes everything back.
        let outcome = paste_payload(&mut graph, &payload, Position::new(200.0, 50.0));
        assert_eq!(outcome.node_ids.len(), 3);
        assert_eq!(outcome.edge_ids.len(), 2);
    }
}
