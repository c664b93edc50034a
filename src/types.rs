//! Core data types and the graph store.
//!
//! This module defines the fundamental data structures used throughout the
//! engine — nodes, edges, ports, the viewport — and `FlowGraph`, the sole
//! owner of live graph state. Every other subsystem (selection, clipboard,
//! history) holds id references or detached copies, never live entities.

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Unique identifier for nodes, `<type_tag>-<short uuid>` by convention.
pub type NodeId = String;

/// Unique identifier for edges.
pub type EdgeId = String;

/// Generates a fresh node id for the given type tag.
///
/// The suffix is drawn from a v4 UUID; callers inserting into a live graph
/// must still collision-check (see [`FlowGraph::fresh_node_id`]).
pub fn node_id_for(type_tag: &str) -> NodeId {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{}-{}", type_tag, &uuid[..crate::constants::NODE_ID_SUFFIX_LEN])
}

/// Generates a fresh edge id.
pub fn fresh_edge_id() -> EdgeId {
    format!("edge-{}", Uuid::new_v4().simple())
}

/// A point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate in world units
    pub x: f32,
    /// Vertical coordinate in world units
    pub y: f32,
}

impl Position {
    /// Creates a new position.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns true if both coordinates are finite (no NaN or infinity).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// The visible region of the canvas: pan offset plus zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Horizontal pan offset
    pub x: f32,
    /// Vertical pan offset
    pub y: f32,
    /// Zoom level (1.0 = normal)
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Opaque configuration payload carried by a node.
///
/// `template` names the component template the node was instantiated from;
/// `fields` holds the configured field values. Composite nodes embed their
/// nested sub-graph under the `"flow"` field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeData {
    /// Name of the template this node was instantiated from
    pub template: String,
    /// Configured field values, keyed by field name
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// A single node in the flow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Unique identifier for this node
    pub id: NodeId,
    /// Type tag selecting the node's component template
    pub node_type: String,
    /// Position on the canvas in world units
    pub position: Position,
    /// Opaque configuration payload
    pub data: NodeData,
}

impl FlowNode {
    /// Creates a new node of the given type at the given position, with a
    /// fresh id and an empty payload naming the type as its template.
    pub fn new(node_type: impl Into<String>, position: Position) -> Self {
        let node_type = node_type.into();
        Self {
            id: node_id_for(&node_type),
            node_type: node_type.clone(),
            position,
            data: NodeData {
                template: node_type,
                fields: serde_json::Map::new(),
            },
        }
    }
}

/// Cached metadata about the output port an edge leaves from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceHandle {
    /// Name of the output port on the source node
    pub port: String,
    /// Types the port produces, captured at connection time
    #[serde(default)]
    pub output_types: Vec<String>,
}

/// Cached metadata about the input field an edge attaches to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetHandle {
    /// Name of the input field on the target node
    pub field: String,
    /// Types the field accepts, captured at connection time
    #[serde(default)]
    pub input_types: Vec<String>,
}

/// A directed connection from an output port to an input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// Id of the source node
    pub source: NodeId,
    /// Output port on the source node
    pub source_handle: SourceHandle,
    /// Id of the target node
    pub target: NodeId,
    /// Input field on the target node
    pub target_handle: TargetHandle,
}

impl FlowEdge {
    /// Creates a new edge with a fresh id.
    pub fn new(
        source: NodeId,
        source_handle: SourceHandle,
        target: NodeId,
        target_handle: TargetHandle,
    ) -> Self {
        Self {
            id: fresh_edge_id(),
            source,
            source_handle,
            target,
            target_handle,
        }
    }

    /// Returns true if this edge touches the given node on either end.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// A detached, serializable copy of graph state.
///
/// Used as the exchange format for files, clipboard payloads, undo/redo
/// snapshots, nested composite sub-graphs, and persistence bodies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowDocument {
    /// All nodes, ordered by id for deterministic serialization
    pub nodes: Vec<FlowNode>,
    /// All edges
    pub edges: Vec<FlowEdge>,
    /// The viewport at capture time
    #[serde(default)]
    pub viewport: Viewport,
}

impl FlowDocument {
    /// Parses a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the document to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Checks structural well-formedness: unique node ids, unique edge ids,
    /// finite positions, resolvable edge endpoints, and no self-loops.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut node_ids: HashSet<&str> = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !node.position.is_finite() {
                return Err(GraphError::NonFinitePosition {
                    node_id: node.id.clone(),
                });
            }
            if !node_ids.insert(&node.id) {
                return Err(GraphError::DuplicateId {
                    id: node.id.clone(),
                });
            }
        }
        let mut edge_ids: HashSet<&str> = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            if !edge_ids.insert(&edge.id) {
                return Err(GraphError::DuplicateId {
                    id: edge.id.clone(),
                });
            }
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(GraphError::InvalidReference {
                        edge_id: edge.id.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
            // Same invariant as `add_edge`: a document must not carry a
            // state the store's own mutation API would reject.
            if edge.source == edge.target {
                return Err(GraphError::InvalidReference {
                    edge_id: edge.id.clone(),
                    missing: edge.target.clone(),
                });
            }
        }
        Ok(())
    }
}

/// The canonical mutable graph state: nodes, edges, and the viewport.
///
/// All mutations are synchronous and atomic: arguments are validated before
/// anything is touched, so no partially-applied state is ever observable.
/// Removing a node cascade-deletes every edge attached to it.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    nodes: HashMap<NodeId, FlowNode>,
    edges: Vec<FlowEdge>,
    viewport: Viewport,
    revision: u64,
    structurally_dirty: bool,
}

impl FlowGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node with the given id, if present.
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.get(id)
    }

    /// Returns true if a node with the given id exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns the edge with the given id, if present.
    pub fn edge(&self, id: &str) -> Option<&FlowEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Returns true if an edge with the given id exists.
    pub fn contains_edge(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e.id == id)
    }

    /// Iterates over all nodes in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.values()
    }

    /// Returns all edges in insertion order.
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replaces the viewport. Not a structural mutation.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.revision += 1;
    }

    /// Monotonically increasing counter bumped on every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns and clears the structural-dirty flag.
    ///
    /// Set by node/edge adds and removes and by [`FlowGraph::replace_all`],
    /// but not by position or viewport updates; the autosave scheduler polls
    /// this to decide when a save is warranted.
    pub fn take_structurally_dirty(&mut self) -> bool {
        std::mem::take(&mut self.structurally_dirty)
    }

    /// Generates a node id for `type_tag` guaranteed not to collide with any
    /// live node.
    pub fn fresh_node_id(&self, type_tag: &str) -> NodeId {
        loop {
            let id = node_id_for(type_tag);
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    /// Adds a node to the graph.
    ///
    /// Rejects duplicate ids and non-finite positions without mutating.
    pub fn add_node(&mut self, node: FlowNode) -> Result<NodeId, GraphError> {
        if !node.position.is_finite() {
            return Err(GraphError::NonFinitePosition { node_id: node.id });
        }
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateId { id: node.id });
        }
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        self.mark_structural();
        Ok(id)
    }

    /// Removes the given nodes, cascade-deleting every edge that touches any
    /// of them. Ids not present in the graph are ignored.
    ///
    /// # Returns
    ///
    /// The number of nodes actually removed.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> usize {
        let mut removed = 0;
        for id in ids {
            if self.nodes.remove(id).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            let gone: HashSet<&str> = ids.iter().map(String::as_str).collect();
            self.edges
                .retain(|e| !gone.contains(e.source.as_str()) && !gone.contains(e.target.as_str()));
            self.mark_structural();
        }
        removed
    }

    /// Adds an edge to the graph.
    ///
    /// Rejects edges whose endpoints are missing or identical (self-loop)
    /// with [`GraphError::InvalidReference`], and duplicate edge ids.
    pub fn add_edge(&mut self, edge: FlowEdge) -> Result<EdgeId, GraphError> {
        for endpoint in [&edge.source, &edge.target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::InvalidReference {
                    edge_id: edge.id,
                    missing: endpoint.clone(),
                });
            }
        }
        if edge.source == edge.target {
            return Err(GraphError::InvalidReference {
                edge_id: edge.id,
                missing: edge.target,
            });
        }
        if self.contains_edge(&edge.id) {
            return Err(GraphError::DuplicateId { id: edge.id });
        }
        let id = edge.id.clone();
        self.edges.push(edge);
        self.mark_structural();
        Ok(id)
    }

    /// Removes the given edges. Ids not present are ignored.
    ///
    /// # Returns
    ///
    /// The number of edges actually removed.
    pub fn remove_edges(&mut self, ids: &[EdgeId]) -> usize {
        let gone: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let before = self.edges.len();
        self.edges.retain(|e| !gone.contains(e.id.as_str()));
        let removed = before - self.edges.len();
        if removed > 0 {
            self.mark_structural();
        }
        removed
    }

    /// Moves a node to a new position. Not a structural mutation.
    pub fn update_node_position(
        &mut self,
        id: &str,
        position: Position,
    ) -> Result<(), GraphError> {
        if !position.is_finite() {
            return Err(GraphError::NonFinitePosition {
                node_id: id.to_string(),
            });
        }
        let node = self.nodes.get_mut(id).ok_or_else(|| GraphError::UnknownNode {
            node_id: id.to_string(),
        })?;
        node.position = position;
        self.revision += 1;
        Ok(())
    }

    /// Replaces the entire graph with the contents of a document.
    ///
    /// The document is validated first; on any error the graph is unchanged.
    pub fn replace_all(&mut self, document: FlowDocument) -> Result<(), GraphError> {
        document.validate()?;
        self.nodes = document
            .nodes
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();
        self.edges = document.edges;
        self.viewport = document.viewport;
        self.mark_structural();
        Ok(())
    }

    /// Captures the current graph state as a detached document.
    ///
    /// Nodes are sorted by id so the output is deterministic; the returned
    /// document shares no storage with the live graph.
    pub fn to_document(&self) -> FlowDocument {
        let mut nodes: Vec<FlowNode> = self.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        FlowDocument {
            nodes,
            edges: self.edges.clone(),
            viewport: self.viewport,
        }
    }

    fn mark_structural(&mut self) {
        self.revision += 1;
        self.structurally_dirty = true;
    }
}
