//! Node: a positioned, sized graph element carrying ports and metadata.

use super::{NodeId, Port};
use crate::capability::CapabilityOption;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Layout orientation for capability-derived ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortOrientation {
    /// Capability ports distributed evenly beneath the node.
    #[default]
    Horizontal,
    /// Capability ports stacked along the node's trailing edge.
    Vertical,
}

/// User-editable node metadata.
///
/// Two distinct parent relations live here. `parent_id` is the expansion
/// engine's ownership tag: set once on spawned children, it decides which
/// nodes a rebuild deletes and is never touched by dragging. `embedded_in`
/// is the spatial embedding into a container, re-evaluated at every drag
/// end and consulted by the containment clamp. The cosmetic fields
/// (heading, colors) have no structural effect on the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_in: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    /// Per-node capability state, mutated only through the node's menu.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CapabilityOption>,
    #[serde(default)]
    pub orientation: PortOrientation,
}

/// A graph node instantiated from a registered shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    /// Registry shape id this node was instantiated from.
    pub shape: String,
    /// Top-left corner position.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub ports: Vec<Port>,
    pub data: NodeData,
}

impl Node {
    pub fn new(shape: impl Into<String>, position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            shape: shape.into(),
            position,
            width,
            height,
            ports: Vec::new(),
            data: NodeData::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Look up a port by id.
    pub fn port(&self, id: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == id)
    }

    /// First port belonging to the given group, if any.
    pub fn port_in_group(&self, group: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.group == group)
    }

    /// Replace the full port set. Ports are regenerated wholesale, never
    /// edited in place; duplicate ids are dropped (first occurrence wins).
    pub fn set_ports(&mut self, ports: Vec<Port>) {
        let mut seen = std::collections::HashSet::new();
        self.ports = ports
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
    }
}
