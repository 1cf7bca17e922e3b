//! Ports: named connection points on a node's boundary.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Named boundary anchor for a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortAnchor {
    Left,
    Right,
    Top,
    Bottom,
}

/// Where a port sits on its node.
///
/// Either a named anchor (edge midpoint) or a fractional offset within the
/// node's bounding box, with `(0, 0)` the top-left corner and `(1, 1)` the
/// bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortPosition {
    Anchor(PortAnchor),
    Fraction { fx: f64, fy: f64 },
}

impl PortPosition {
    /// Resolve the port position to a concrete point on the node bounds.
    pub fn resolve(&self, bounds: Rect) -> Point {
        match *self {
            PortPosition::Anchor(PortAnchor::Left) => {
                Point::new(bounds.x0, bounds.y0 + bounds.height() / 2.0)
            }
            PortPosition::Anchor(PortAnchor::Right) => {
                Point::new(bounds.x1, bounds.y0 + bounds.height() / 2.0)
            }
            PortPosition::Anchor(PortAnchor::Top) => {
                Point::new(bounds.x0 + bounds.width() / 2.0, bounds.y0)
            }
            PortPosition::Anchor(PortAnchor::Bottom) => {
                Point::new(bounds.x0 + bounds.width() / 2.0, bounds.y1)
            }
            PortPosition::Fraction { fx, fy } => Point::new(
                bounds.x0 + bounds.width() * fx,
                bounds.y0 + bounds.height() * fy,
            ),
        }
    }
}

/// A connection point on a node.
///
/// Port ids are unique within their node. Ports are never edited in place;
/// the port layout engine removes and regenerates the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    /// Port group the port belongs to ("left", "bottom", ...).
    pub group: String,
    pub position: PortPosition,
    /// Whether the port is a valid edge endpoint.
    pub magnet: bool,
}

impl Port {
    pub fn new(
        id: impl Into<String>,
        group: impl Into<String>,
        position: PortPosition,
        magnet: bool,
    ) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            position,
            magnet,
        }
    }
}
