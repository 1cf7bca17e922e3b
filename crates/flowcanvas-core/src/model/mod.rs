//! Graph data model: nodes, ports, and edges.

mod edge;
mod node;
mod port;

pub use edge::{ConnectorSpec, Edge, EdgeEndpoint, EdgeStyle, RouterSpec, SmoothDirection};
pub use node::{Node, NodeData, PortOrientation};
pub use port::{Port, PortAnchor, PortPosition};

use uuid::Uuid;

/// Unique identifier for nodes.
pub type NodeId = Uuid;

/// Unique identifier for edges.
pub type EdgeId = Uuid;
