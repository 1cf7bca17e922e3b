//! Drag gesture state machine for node movement.
//!
//! During a drag nothing is committed to the document: `update` only
//! computes the preview position (clamped for embedded nodes so the preview
//! never leaves the parent). The document changes once, at `end`, which also
//! re-evaluates which container the node is embedded in. `cancel` simply
//! discards the gesture.

use crate::canvas::{CanvasEngine, MoveOptions};
use crate::constraint;
use crate::model::NodeId;
use kurbo::{Point, Size};

/// Current gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Active {
        node: NodeId,
        /// Node position when the gesture began.
        origin: Point,
        /// Pointer position when the gesture began.
        grab: Point,
    },
}

/// Tracks one node-drag gesture from pointer-down to release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, DragState::Active { .. })
    }

    /// Start dragging a node. Returns false if the node does not exist or a
    /// gesture is already in progress.
    pub fn begin(&mut self, engine: &CanvasEngine, node: NodeId, pointer: Point) -> bool {
        if self.is_active() {
            return false;
        }
        let Some(target) = engine.document().node(node) else {
            log::warn!("drag requested for missing node {node}");
            return false;
        };
        self.state = DragState::Active {
            node,
            origin: target.position,
            grab: pointer,
        };
        true
    }

    /// Preview position for the current pointer, without committing.
    ///
    /// For a node embedded in a container the preview is clamped to the
    /// parent's inner box, matching what `end` would commit.
    pub fn update(&self, engine: &CanvasEngine, pointer: Point) -> Option<Point> {
        let DragState::Active { node, origin, grab } = self.state else {
            return None;
        };
        let desired = origin + (pointer - grab);
        Some(self.constrain(engine, node, desired))
    }

    /// Finish the gesture: commit the final position and re-evaluate the
    /// node's embedding. Returns the committed position.
    pub fn end(&mut self, engine: &mut CanvasEngine, pointer: Point) -> Option<Point> {
        let DragState::Active { node, origin, grab } = self.state else {
            return None;
        };
        self.state = DragState::Idle;
        let desired = origin + (pointer - grab);
        if engine
            .set_node_position(node, desired, MoveOptions::default())
            .is_err()
        {
            // Node was removed mid-gesture.
            return None;
        }
        engine.assign_parent(node);
        engine.document().node(node).map(|n| n.position)
    }

    /// Abandon the gesture. The document was never touched, so there is
    /// nothing to roll back.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    fn constrain(&self, engine: &CanvasEngine, node: NodeId, desired: Point) -> Point {
        let Some(target) = engine.document().node(node) else {
            return desired;
        };
        let Some(parent) = target
            .data
            .embedded_in
            .and_then(|id| engine.document().node(id))
        else {
            return desired;
        };
        if !engine.registry().is_container(&parent.shape) {
            return desired;
        }
        constraint::clamp_position(
            parent.bounds(),
            Size::new(target.width, target.height),
            desired,
            engine.margins(),
        )
    }
}
