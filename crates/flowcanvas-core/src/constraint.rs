//! Containment constraint: keeps embedded children inside their parent.

use crate::canvas::GraphDocument;
use crate::model::NodeId;
use crate::registry::ShapeRegistry;
use kurbo::{Point, Rect, Size};

/// Margins keeping a child clear of the parent's border. The larger top
/// margin leaves room for the parent's header strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainmentMargins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for ContainmentMargins {
    fn default() -> Self {
        Self {
            left: 10.0,
            right: 10.0,
            top: 40.0,
            bottom: 10.0,
        }
    }
}

/// Clamp a desired child position so the child's box stays inside the
/// parent's bounds minus the margins.
///
/// Composed as `min(max(x, lo), hi)` so that when the child is larger than
/// the parent's inner box the upper bound wins instead of panicking.
pub fn clamp_position(
    parent: Rect,
    child: Size,
    desired: Point,
    margins: &ContainmentMargins,
) -> Point {
    let x = desired
        .x
        .max(parent.x0 + margins.left)
        .min(parent.x1 - child.width - margins.right);
    let y = desired
        .y
        .max(parent.y0 + margins.top)
        .min(parent.y1 - child.height - margins.bottom);
    Point::new(x, y)
}

/// Embedding predicate, evaluated at drag-end: the smallest container-shape
/// node whose bounding box fully encloses the dragged node's box. Returns
/// `None` when nothing encloses it (the node stays free-floating).
///
/// The dragged node itself and its own spawned descendants are never
/// candidates, so embedding can't form a cycle.
pub fn find_parent(
    document: &GraphDocument,
    registry: &ShapeRegistry,
    node: NodeId,
) -> Option<NodeId> {
    let dragged = document.node(node)?;
    let bbox = dragged.bounds();

    document
        .nodes()
        .filter(|candidate| {
            candidate.id() != node
                && registry.is_container(&candidate.shape)
                && !is_descendant(document, candidate.id(), node)
                && contains_rect(candidate.bounds(), bbox)
        })
        .min_by(|a, b| {
            let (a, b) = (a.bounds().area(), b.bounds().area());
            a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|n| n.id())
}

/// Whether `node` sits somewhere below `ancestor` along either parent
/// relation (spawn ownership or spatial embedding).
fn is_descendant(document: &GraphDocument, node: NodeId, ancestor: NodeId) -> bool {
    let mut stack = vec![node];
    // Bounded walk in case stale data ever forms a loop.
    let mut budget = document.node_count() * 2;
    while let Some(id) = stack.pop() {
        if budget == 0 {
            break;
        }
        budget -= 1;
        let Some(current) = document.node(id) else {
            continue;
        };
        for link in [current.data.parent_id, current.data.embedded_in] {
            match link {
                Some(up) if up == ancestor => return true,
                Some(up) => stack.push(up),
                None => {}
            }
        }
    }
    false
}

fn contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}
