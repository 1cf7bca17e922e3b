//! Error types for graph mutations.

use crate::model::NodeId;
use thiserror::Error;

/// Structural errors surfaced by the canvas engine.
///
/// None of these are fatal to the canvas: callers recover by skipping the
/// operation (authoring errors are also logged at the point of detection).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Shape id not present in the registry.
    #[error("unknown shape '{0}'")]
    UnknownShape(String),

    /// Node referenced by id does not exist.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// Port referenced by id does not exist on the node.
    #[error("port '{port}' not found on node {node}")]
    PortNotFound { node: NodeId, port: String },

    /// Edge source and target resolve to the same port on the same node.
    #[error("edge endpoints resolve to the same port '{port}' on node {node}")]
    SelfLoop { node: NodeId, port: String },
}
