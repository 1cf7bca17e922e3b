//! Connection validation and connector selection.
//!
//! Validation is structural only: it decides whether a proposed pair of
//! terminals may become an edge at all. Connector selection is the
//! deterministic lookup that picks the edge geometry for a shape pair once
//! a connection has been accepted.

use crate::canvas::GraphDocument;
use crate::model::{ConnectorSpec, EdgeId, NodeId};

/// Where one end of a proposed connection lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTerminal {
    /// A specific port on a specific node.
    Port { node: NodeId, port: String },
    /// The node body, outside any port.
    Node(NodeId),
    /// An existing edge.
    Edge(EdgeId),
    /// Empty canvas.
    Blank,
}

impl ConnectTerminal {
    pub fn port(node: NodeId, port: impl Into<String>) -> Self {
        ConnectTerminal::Port {
            node,
            port: port.into(),
        }
    }
}

/// A proposed connection, as produced by an interactive wiring gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCandidate {
    pub source: ConnectTerminal,
    pub target: ConnectTerminal,
}

/// Whether a proposed connection is allowed to become an edge.
///
/// Only port-to-port connections pass. The target port must exist and be a
/// magnet; connecting a port to itself is rejected, but two distinct ports
/// on the same node are fine, as are parallel edges between the same pair.
pub fn validate_connection(document: &GraphDocument, candidate: &ConnectionCandidate) -> bool {
    let ConnectTerminal::Port {
        node: source_node,
        port: source_port,
    } = &candidate.source
    else {
        return false;
    };
    let ConnectTerminal::Port {
        node: target_node,
        port: target_port,
    } = &candidate.target
    else {
        return false;
    };

    if source_node == target_node && source_port == target_port {
        return false;
    }
    let Some(source) = document.node(*source_node) else {
        return false;
    };
    if source.port(source_port).is_none() {
        return false;
    }
    let Some(target) = document.node(*target_node) else {
        return false;
    };
    match target.port(target_port) {
        Some(port) => port.magnet,
        None => false,
    }
}

/// Connector for an accepted connection, keyed on the endpoint shapes.
///
/// A `text-1` at either end forces a horizontal sweep; otherwise a `text-2`
/// forces a vertical one; every other pair gets the free-form smooth
/// connector. The source endpoint is consulted first so a `text-1`/`text-2`
/// pair resolves horizontally.
pub fn connector_for(source_shape: &str, target_shape: &str) -> ConnectorSpec {
    for shape in [source_shape, target_shape] {
        if shape == "text-1" {
            return ConnectorSpec::smooth_horizontal();
        }
    }
    for shape in [source_shape, target_shape] {
        if shape == "text-2" {
            return ConnectorSpec::smooth_vertical();
        }
    }
    ConnectorSpec::smooth()
}
