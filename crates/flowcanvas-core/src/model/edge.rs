//! Edges: directed connections between two ports.

use super::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One end of an edge: a port on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeEndpoint {
    pub node: NodeId,
    pub port: String,
}

impl EdgeEndpoint {
    pub fn new(node: NodeId, port: impl Into<String>) -> Self {
        Self {
            node,
            port: port.into(),
        }
    }
}

/// Preferred sweep direction for smooth connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SmoothDirection {
    H,
    V,
}

/// How the edge path is drawn between its endpoints. Cosmetic, but must be
/// deterministic for a given endpoint shape pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum ConnectorSpec {
    Smooth {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<SmoothDirection>,
        radius: f64,
    },
}

impl ConnectorSpec {
    /// Default free-form smooth connector.
    pub fn smooth() -> Self {
        ConnectorSpec::Smooth {
            direction: None,
            radius: -20.0,
        }
    }

    /// Smooth connector constrained to a horizontal sweep.
    pub fn smooth_horizontal() -> Self {
        ConnectorSpec::Smooth {
            direction: Some(SmoothDirection::H),
            radius: 120.0,
        }
    }

    /// Smooth connector constrained to a vertical sweep.
    pub fn smooth_vertical() -> Self {
        ConnectorSpec::Smooth {
            direction: Some(SmoothDirection::V),
            radius: 120.0,
        }
    }
}

impl Default for ConnectorSpec {
    fn default() -> Self {
        Self::smooth()
    }
}

/// Routing strategy for the edge path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterSpec {
    #[default]
    Normal,
    Orthogonal,
}

/// Cosmetic line attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub stroke_width: f64,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self { stroke_width: 2.0 }
    }
}

/// A directed connection between two ports.
///
/// Both endpoints may sit on the same node as long as the port ids differ;
/// multiple edges between the same pair of ports are allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub source: EdgeEndpoint,
    pub target: EdgeEndpoint,
    #[serde(default)]
    pub router: RouterSpec,
    #[serde(default)]
    pub connector: ConnectorSpec,
    #[serde(default)]
    pub style: EdgeStyle,
}

impl Edge {
    pub fn new(source: EdgeEndpoint, target: EdgeEndpoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            target,
            router: RouterSpec::default(),
            connector: ConnectorSpec::default(),
            style: EdgeStyle::default(),
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// Whether this edge touches the given node at either end.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source.node == node || self.target.node == node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touches() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let edge = Edge::new(EdgeEndpoint::new(a, "bottom"), EdgeEndpoint::new(b, "top"));
        assert!(edge.touches(a));
        assert!(edge.touches(b));
        assert!(!edge.touches(c));
    }

    #[test]
    fn test_connector_serde_round_trip() {
        let edge = {
            let mut e = Edge::new(
                EdgeEndpoint::new(Uuid::new_v4(), "bottom"),
                EdgeEndpoint::new(Uuid::new_v4(), "top"),
            );
            e.connector = ConnectorSpec::smooth_vertical();
            e
        };
        let json = serde_json::to_string(&edge).unwrap();
        let back: Edge = serde_json::from_str(&json).unwrap();
        assert_eq!(back.connector, ConnectorSpec::smooth_vertical());
        assert_eq!(back.style.stroke_width, 2.0);
    }
}
