//! Option-expansion engine: turns enabled capability options into spawned
//! child nodes wired to their parent.
//!
//! Expansion is a full rebuild, not an incremental diff: every existing
//! child of the parent is deleted (edges cascading with it) before the new
//! row is generated, so stale children can never accumulate.

use crate::canvas::CanvasEngine;
use crate::capability;
use crate::model::{ConnectorSpec, Edge, EdgeEndpoint, NodeId};
use crate::registry::NodeConfig;

/// How a spawn-capable shape expands its enabled options into children.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnSpec {
    /// Shape instantiated for each generated child.
    pub child_shape: String,
    /// Slot width used for row geometry.
    pub child_width: f64,
    /// Horizontal gap between consecutive slots.
    pub gap: f64,
    /// Vertical offset of the row below the parent's top edge.
    pub offset_y: f64,
}

impl SpawnSpec {
    pub fn new(child_shape: impl Into<String>, child_width: f64, gap: f64, offset_y: f64) -> Self {
        Self {
            child_shape: child_shape.into(),
            child_width,
            gap,
            offset_y,
        }
    }
}

/// Rebuild the generated children of `parent` from its capability state.
///
/// Step order matters: the cascading delete of the previous generation
/// completes before any new child is created. One child is spawned per
/// enabled top-level option, laid out in a row centered beneath the parent,
/// each wired from the parent's `bottom`-group port to the child's `top`
/// port with a smooth vertical connector.
pub(crate) fn rebuild_children(engine: &mut CanvasEngine, parent: NodeId) {
    let Some(parent_node) = engine.document().node(parent) else {
        log::warn!("expansion requested for missing node {parent}");
        return;
    };
    let options = parent_node.data.options.clone();
    if options.is_empty() {
        return;
    }
    let Some(spawn) = engine
        .registry()
        .template(&parent_node.shape)
        .and_then(|t| t.spawn.clone())
    else {
        return;
    };
    let parent_bounds = parent_node.bounds();

    // 1. Cascading delete of the previous generation.
    let stale: Vec<NodeId> = engine
        .document()
        .nodes()
        .filter(|n| n.data.parent_id == Some(parent))
        .map(|n| n.id())
        .collect();
    for id in stale {
        engine.remove_node(id);
    }

    // 2. Row geometry from the enabled top-level sequence.
    let labels: Vec<String> = capability::enabled_top_level(&options)
        .iter()
        .map(|o| o.label.clone())
        .collect();
    let count = labels.len();
    if count == 0 {
        return;
    }
    let total_width = count as f64 * spawn.child_width + (count as f64 - 1.0) * spawn.gap;
    let start_x = parent_bounds.x0 + (parent_bounds.width() - total_width) / 2.0;
    let base_y = parent_bounds.y0 + spawn.offset_y;

    // 3/4. Spawn one child per option and wire it to the parent.
    for (index, label) in labels.into_iter().enumerate() {
        let x = start_x + index as f64 * (spawn.child_width + spawn.gap);
        let config = NodeConfig::new(spawn.child_shape.clone(), x, base_y);
        let Some(mut child) = engine.registry().instantiate(&config) else {
            continue;
        };
        child.data.parent_id = Some(parent);
        child.data.heading = Some(label);
        let child_id = engine.add_node(child);

        let source_port = engine
            .document()
            .node(parent)
            .and_then(|n| n.port_in_group("bottom"))
            .map(|p| p.id.clone());
        let target_port = engine
            .document()
            .node(child_id)
            .and_then(|n| n.port_in_group("top"))
            .map(|p| p.id.clone());
        let (Some(source_port), Some(target_port)) = (source_port, target_port) else {
            log::warn!(
                "missing downstream/upstream port while wiring child of {parent}, edge skipped"
            );
            continue;
        };

        let mut edge = Edge::new(
            EdgeEndpoint::new(parent, source_port),
            EdgeEndpoint::new(child_id, target_port),
        );
        edge.connector = ConnectorSpec::smooth_vertical();
        if let Err(err) = engine.add_edge(edge) {
            log::warn!("failed to wire spawned child: {err}");
        }
    }
}
