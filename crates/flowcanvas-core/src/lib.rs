//! FlowCanvas Core Library
//!
//! Renderer-agnostic engine for a node-and-edge flow canvas: shape registry,
//! graph document, capability-driven port layout, child expansion,
//! containment, and connection validation.

pub mod canvas;
pub mod capability;
pub mod constraint;
pub mod drag;
pub mod error;
pub mod expansion;
pub mod layout;
pub mod model;
pub mod registry;
pub mod routing;

pub use canvas::{CanvasEngine, CanvasEvent, GraphDocument, MoveOptions};
pub use capability::CapabilityOption;
pub use constraint::{clamp_position, find_parent, ContainmentMargins};
pub use drag::DragController;
pub use error::GraphError;
pub use expansion::SpawnSpec;
pub use layout::{layout_ports, PortLayoutConfig};
pub use model::{
    ConnectorSpec, Edge, EdgeEndpoint, EdgeId, EdgeStyle, Node, NodeData, NodeId, Port, PortAnchor,
    PortOrientation, PortPosition, RouterSpec, SmoothDirection,
};
pub use registry::{NodeConfig, PortGroup, PortItem, ShapeRegistry, ShapeTemplate};
pub use routing::{connector_for, validate_connection, ConnectTerminal, ConnectionCandidate};
