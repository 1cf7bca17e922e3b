//! Port layout engine: derives a node's port set and size from its
//! capability state.
//!
//! The engine never edits a port in place. On every invocation it rebuilds
//! the full set from scratch — the fixed wiring ports from the shape
//! template plus one synthesized port per enabled capability leaf — so the
//! ports always match the current capability state exactly.

use crate::capability;
use crate::model::{Node, Port, PortOrientation};
use crate::registry::ShapeTemplate;

/// Spacing and sizing constants for capability-derived ports. These were
/// tuning constants in the original editor, kept as configuration here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortLayoutConfig {
    /// Offset between consecutive ports along the trailing edge.
    pub port_spacing: f64,
    /// Inset from the node's side edges for beneath-node ports.
    pub edge_margin: f64,
    /// Node height with no capability ports enabled.
    pub min_height: f64,
    /// Node width in horizontal orientation.
    pub horizontal_width: f64,
    /// Node width in vertical orientation.
    pub vertical_width: f64,
    /// Extra height reserved for the row of beneath-node ports.
    pub drop_length: f64,
    /// Room kept above the first trailing-edge port (header strip).
    pub header_height: f64,
}

impl Default for PortLayoutConfig {
    fn default() -> Self {
        Self {
            port_spacing: 30.0,
            edge_margin: 20.0,
            min_height: 50.0,
            horizontal_width: 350.0,
            vertical_width: 150.0,
            drop_length: 46.0,
            header_height: 40.0,
        }
    }
}

/// Group name for synthesized ports in each orientation.
fn dynamic_group(orientation: PortOrientation) -> &'static str {
    match orientation {
        PortOrientation::Horizontal => "bottom",
        PortOrientation::Vertical => "right",
    }
}

/// Regenerate a node's ports and size from its capability state.
///
/// The fixed wiring ports come from the template's default port items; each
/// enabled leaf adds one magnet port with the deterministic id
/// `port-{leaf id}`, positioned by its index in the enabled sequence.
/// Invoking this twice with the same state yields an identical port set.
pub fn layout_ports(node: &mut Node, template: &ShapeTemplate, config: &PortLayoutConfig) {
    let orientation = node.data.orientation;
    let leaves: Vec<(String, String)> = capability::enabled_leaves(&node.data.options)
        .iter()
        .map(|leaf| (leaf.id.clone(), leaf.label.clone()))
        .collect();
    let count = leaves.len();

    // Size first: fractional port offsets resolve against the new box.
    match orientation {
        PortOrientation::Horizontal => {
            node.width = config.horizontal_width;
            node.height = if count == 0 {
                config.min_height
            } else {
                config.min_height + config.drop_length
            };
        }
        PortOrientation::Vertical => {
            node.width = config.vertical_width;
            node.height = config
                .min_height
                .max(config.header_height + count as f64 * config.port_spacing);
        }
    }

    let mut ports = Vec::with_capacity(template.default_ports.len() + count);
    for item in &template.default_ports {
        if let Some(group) = template.port_groups.get(&item.group) {
            ports.push(Port::new(
                item.id.clone(),
                item.group.clone(),
                group.position,
                group.magnet,
            ));
        } else {
            log::warn!(
                "shape '{}' default port '{}' references missing group '{}'",
                node.shape,
                item.id,
                item.group
            );
        }
    }

    for (index, (leaf_id, _label)) in leaves.iter().enumerate() {
        let position = match orientation {
            PortOrientation::Horizontal => {
                // Evenly beneath the node; a single port sits centered.
                let fx = if count == 1 {
                    0.5
                } else {
                    let usable = node.width - 2.0 * config.edge_margin;
                    let step = usable / (count as f64 - 1.0);
                    (config.edge_margin + index as f64 * step) / node.width
                };
                crate::model::PortPosition::Fraction { fx, fy: 1.0 }
            }
            PortOrientation::Vertical => {
                // Down the trailing edge at spacing * index.
                let y = config.header_height + config.port_spacing * index as f64;
                crate::model::PortPosition::Fraction {
                    fx: 1.0,
                    fy: y / node.height,
                }
            }
        };
        ports.push(Port::new(
            format!("port-{leaf_id}"),
            dynamic_group(orientation),
            position,
            true,
        ));
    }

    node.set_ports(ports);
}
