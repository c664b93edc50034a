//! Error types for the graph-editing engine.
//!
//! Structural-integrity failures (`GraphError`) are raised by store mutations
//! and handled close to where they occur; user-facing failures (grouping
//! rejections, malformed drops, persistence errors) are surfaced through the
//! engine's notification queue instead of panicking or corrupting state.

use crate::types::{EdgeId, NodeId};
use thiserror::Error;

/// Errors raised by mutations of the graph store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// An edge referenced a node id that is not present in the graph.
    #[error("edge {edge_id} references missing node {missing}")]
    InvalidReference {
        /// Id of the offending edge
        edge_id: EdgeId,
        /// The endpoint id that could not be resolved
        missing: NodeId,
    },
    /// A node or edge was inserted with an id that already exists.
    #[error("duplicate id {id}")]
    DuplicateId {
        /// The colliding id
        id: String,
    },
    /// A node position contained NaN or an infinity.
    #[error("node {node_id} has a non-finite position")]
    NonFinitePosition {
        /// Id of the offending node
        node_id: NodeId,
    },
    /// An operation targeted a node id that does not exist.
    #[error("unknown node {node_id}")]
    UnknownNode {
        /// The missing node id
        node_id: NodeId,
    },
}

/// A single edge that prevents a selection from being grouped.
///
/// Boundary edges have exactly one endpoint inside the selection; grouping
/// would leave them dangling, so they are reported rather than dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryViolation {
    /// Id of the boundary edge
    pub edge_id: EdgeId,
    /// The endpoint that lies inside the selection
    pub inside: NodeId,
    /// The endpoint that lies outside the selection
    pub outside: NodeId,
}

/// Errors raised when a selection cannot be collapsed into a composite node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroupingError {
    /// Grouping requires at least two nodes.
    #[error("grouping requires at least 2 nodes, got {count}")]
    TooFewNodes {
        /// Number of nodes in the selection
        count: usize,
    },
    /// One or more edges cross the selection boundary.
    #[error("{} edge(s) cross the selection boundary", .0.len())]
    BoundaryEdges(Vec<BoundaryViolation>),
}

/// Errors raised by the drop-ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    /// The dropped file could not be parsed or failed structural validation.
    #[error("malformed flow file: {reason}")]
    MalformedFile {
        /// Human-readable description of what was wrong
        reason: String,
    },
    /// A template drop named a type that the catalog does not know.
    #[error("unknown node template {type_tag:?}")]
    UnknownTemplate {
        /// The unrecognized type tag
        type_tag: String,
    },
}

/// An autosave request that could not be completed.
///
/// Local graph state is retained; the failure is reported and the save is
/// retried after the next structural mutation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("persistence failed: {reason}")]
pub struct PersistenceFailure {
    /// Description of the failure, suitable for showing to the user
    pub reason: String,
}

/// Umbrella error for engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A graph store mutation failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A grouping attempt was rejected.
    #[error(transparent)]
    Grouping(#[from] GroupingError),
    /// A drop payload was rejected.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// An autosave request failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceFailure),
}
