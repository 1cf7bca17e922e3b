//! Shape registry: immutable templates nodes are instantiated from.

use crate::capability::CapabilityOption;
use crate::expansion::SpawnSpec;
use crate::model::{Node, Port, PortAnchor, PortOrientation, PortPosition};
use kurbo::Point;
use std::collections::HashMap;

/// Port-group template: where ports of this group sit and whether they
/// accept connections.
#[derive(Debug, Clone, PartialEq)]
pub struct PortGroup {
    pub position: PortPosition,
    pub magnet: bool,
}

impl PortGroup {
    pub fn anchor(anchor: PortAnchor) -> Self {
        Self {
            position: PortPosition::Anchor(anchor),
            magnet: true,
        }
    }

    pub fn fraction(fx: f64, fy: f64) -> Self {
        Self {
            position: PortPosition::Fraction { fx, fy },
            magnet: true,
        }
    }
}

/// A port item in a node configuration: which group the port joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortItem {
    pub id: String,
    pub group: String,
}

impl PortItem {
    pub fn new(id: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
        }
    }

    /// The common case: port id equals its group name.
    pub fn named(name: &str) -> Self {
        Self::new(name, name)
    }
}

/// Node configuration consumed by [`ShapeRegistry::instantiate`].
///
/// This is the external drop interface: a shape name, a position, and an
/// optional explicit port list overriding the template default.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub shape: String,
    pub x: f64,
    pub y: f64,
    pub ports: Vec<PortItem>,
}

impl NodeConfig {
    pub fn new(shape: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            shape: shape.into(),
            x,
            y,
            ports: Vec::new(),
        }
    }

    pub fn with_ports(mut self, ports: Vec<PortItem>) -> Self {
        self.ports = ports;
        self
    }
}

/// Immutable shape template: default geometry, port groups, capability
/// defaults, and the derived-behavior flags (dynamic ports, child spawning,
/// containment).
#[derive(Debug, Clone)]
pub struct ShapeTemplate {
    pub width: f64,
    pub height: f64,
    pub min_width: f64,
    pub min_height: f64,
    /// Container shapes participate as embedding parents.
    pub container: bool,
    pub port_groups: HashMap<String, PortGroup>,
    /// Ports added when the node config carries no explicit list.
    pub default_ports: Vec<PortItem>,
    /// Whether the port layout engine regenerates this shape's ports from
    /// its capability state.
    pub dynamic_ports: bool,
    /// Default capability options for new nodes of this shape.
    pub options: Vec<CapabilityOption>,
    /// Child-spawning behavior, if this shape expands enabled options into
    /// generated child nodes.
    pub spawn: Option<SpawnSpec>,
    pub heading: Option<String>,
    pub orientation: PortOrientation,
}

impl ShapeTemplate {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            min_width: width,
            min_height: height,
            container: false,
            port_groups: HashMap::new(),
            default_ports: Vec::new(),
            dynamic_ports: false,
            options: Vec::new(),
            spawn: None,
            heading: None,
            orientation: PortOrientation::default(),
        }
    }

    pub fn with_min_size(mut self, min_width: f64, min_height: f64) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    pub fn container(mut self) -> Self {
        self.container = true;
        self
    }

    pub fn with_group(mut self, name: &str, group: PortGroup) -> Self {
        self.port_groups.insert(name.to_string(), group);
        self
    }

    pub fn with_default_ports(mut self, ports: Vec<PortItem>) -> Self {
        self.default_ports = ports;
        self
    }

    pub fn dynamic_ports(mut self) -> Self {
        self.dynamic_ports = true;
        self
    }

    pub fn with_options(mut self, options: Vec<CapabilityOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_spawn(mut self, spawn: SpawnSpec) -> Self {
        self.spawn = Some(spawn);
        self
    }

    pub fn with_heading(mut self, heading: &str) -> Self {
        self.heading = Some(heading.to_string());
        self
    }

    pub fn with_orientation(mut self, orientation: PortOrientation) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Registry of shape templates, keyed by shape id.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    templates: HashMap<String, ShapeTemplate>,
}

impl ShapeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a template under the given shape id. Re-registering replaces
    /// the previous template.
    pub fn register(&mut self, shape: impl Into<String>, template: ShapeTemplate) {
        let shape = shape.into();
        if self.templates.insert(shape.clone(), template).is_some() {
            log::warn!("shape '{shape}' re-registered, previous template replaced");
        }
    }

    /// Look up a template.
    pub fn template(&self, shape: &str) -> Option<&ShapeTemplate> {
        self.templates.get(shape)
    }

    /// Whether the shape is registered as a container.
    pub fn is_container(&self, shape: &str) -> bool {
        self.templates.get(shape).is_some_and(|t| t.container)
    }

    /// Build a node from a config: template defaults first, then overrides.
    ///
    /// Unknown shape ids and port items referencing missing groups are
    /// authoring errors: they are logged and skipped, never propagated.
    pub fn instantiate(&self, config: &NodeConfig) -> Option<Node> {
        let Some(template) = self.templates.get(&config.shape) else {
            log::warn!("unknown shape '{}', node not created", config.shape);
            return None;
        };

        let mut node = Node::new(
            config.shape.clone(),
            Point::new(config.x, config.y),
            template.width,
            template.height,
        );
        node.data.heading = template.heading.clone();
        node.data.options = template.options.clone();
        node.data.orientation = template.orientation;

        let items = if config.ports.is_empty() {
            &template.default_ports
        } else {
            &config.ports
        };
        let mut ports = Vec::with_capacity(items.len());
        for item in items {
            let Some(group) = template.port_groups.get(&item.group) else {
                log::warn!(
                    "shape '{}' has no port group '{}', port '{}' skipped",
                    config.shape,
                    item.group,
                    item.id
                );
                continue;
            };
            ports.push(Port::new(
                item.id.clone(),
                item.group.clone(),
                group.position,
                group.magnet,
            ));
        }
        node.set_ports(ports);

        Some(node)
    }

    /// The built-in shape set of the flow editor.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        let wiring_groups = |template: ShapeTemplate| {
            template
                .with_group("left", PortGroup::anchor(PortAnchor::Left))
                .with_group("top", PortGroup::fraction(0.33, 0.0))
                .with_group("right", PortGroup::fraction(1.0, 0.5))
                .with_group("bottom", PortGroup::fraction(0.5, 1.0))
        };
        let all_sides = vec![
            PortItem::named("left"),
            PortItem::named("right"),
            PortItem::named("top"),
            PortItem::named("bottom"),
        ];

        registry.register(
            "multi-ai-node",
            wiring_groups(ShapeTemplate::new(350.0, 50.0))
                .with_default_ports(all_sides.clone())
                .dynamic_ports()
                .with_options(multi_ai_options())
                .with_spawn(SpawnSpec::new("oracle", 200.0, 200.0, 200.0))
                .with_heading("Multi-AI Model"),
        );

        registry.register(
            "oracle",
            wiring_groups(ShapeTemplate::new(200.0, 50.0))
                .with_default_ports(all_sides.clone())
                .with_options(oracle_options())
                .with_spawn(SpawnSpec::new("text-3", 100.0, 50.0, 200.0))
                .with_heading("Oracle")
                .with_orientation(PortOrientation::Vertical),
        );

        let text_template = || {
            ShapeTemplate::new(200.0, 50.0)
                .with_group("left", PortGroup::anchor(PortAnchor::Left))
                .with_group("right", PortGroup::anchor(PortAnchor::Right))
                .with_group("top", PortGroup::anchor(PortAnchor::Top))
                .with_group("bottom", PortGroup::anchor(PortAnchor::Bottom))
        };

        registry.register(
            "text-1",
            text_template()
                .with_default_ports(vec![PortItem::named("left"), PortItem::named("right")])
                .with_heading("Text 1"),
        );
        registry.register(
            "text-2",
            text_template()
                .with_default_ports(vec![PortItem::named("top"), PortItem::named("bottom")])
                .with_heading("Text 2"),
        );
        registry.register(
            "text-3",
            text_template().with_default_ports(all_sides),
        );

        registry.register(
            "block-node",
            ShapeTemplate::new(400.0, 300.0)
                .with_min_size(200.0, 100.0)
                .container()
                .with_group("left", PortGroup::anchor(PortAnchor::Left))
                .with_group("right", PortGroup::anchor(PortAnchor::Right))
                .with_default_ports(vec![PortItem::named("left"), PortItem::named("right")])
                .with_heading("Block Container"),
        );

        registry
    }
}

/// Default capability set for the multi-AI model node.
fn multi_ai_options() -> Vec<CapabilityOption> {
    vec![
        CapabilityOption::group(
            "embeddings",
            "Embeddings",
            vec![
                CapabilityOption::leaf("google-embeddings", "Google Embeddings"),
                CapabilityOption::leaf("facebook-embeddings", "Facebook Embeddings"),
                CapabilityOption::leaf("openai-embeddings", "OpenAI Embeddings"),
                CapabilityOption::leaf("cohere-embeddings", "Cohere Embeddings"),
            ],
        ),
        CapabilityOption::leaf("memory", "Memory"),
        CapabilityOption::leaf("tool", "Tool"),
        CapabilityOption::leaf("apps", "Apps"),
        CapabilityOption::leaf("text", "Text"),
        CapabilityOption::leaf("image", "Image"),
        CapabilityOption::leaf("chat", "Chat"),
    ]
}

/// Default capability set for the oracle node.
fn oracle_options() -> Vec<CapabilityOption> {
    vec![
        CapabilityOption::leaf("memory", "Memory"),
        CapabilityOption::leaf("tool", "Tool"),
        CapabilityOption::leaf("apps", "Apps"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiate_applies_template_defaults() {
        let registry = ShapeRegistry::builtin();
        let node = registry
            .instantiate(&NodeConfig::new("multi-ai-node", 100.0, 50.0))
            .unwrap();

        assert_eq!(node.width, 350.0);
        assert_eq!(node.height, 50.0);
        assert_eq!(node.position, Point::new(100.0, 50.0));
        assert_eq!(node.ports.len(), 4);
        assert_eq!(node.data.heading.as_deref(), Some("Multi-AI Model"));
        assert!(!node.data.options.is_empty());
    }

    #[test]
    fn test_instantiate_port_override() {
        let registry = ShapeRegistry::builtin();
        let config = NodeConfig::new("text-1", 0.0, 0.0)
            .with_ports(vec![PortItem::named("top"), PortItem::named("bottom")]);
        let node = registry.instantiate(&config).unwrap();
        let groups: Vec<&str> = node.ports.iter().map(|p| p.group.as_str()).collect();
        assert_eq!(groups, vec!["top", "bottom"]);
    }

    #[test]
    fn test_unknown_shape_is_none() {
        let registry = ShapeRegistry::builtin();
        assert!(
            registry
                .instantiate(&NodeConfig::new("no-such-shape", 0.0, 0.0))
                .is_none()
        );
    }

    #[test]
    fn test_missing_group_skips_port() {
        let registry = ShapeRegistry::builtin();
        let config = NodeConfig::new("text-1", 0.0, 0.0)
            .with_ports(vec![PortItem::named("left"), PortItem::named("diagonal")]);
        let node = registry.instantiate(&config).unwrap();
        assert_eq!(node.ports.len(), 1);
        assert_eq!(node.ports[0].id, "left");
    }

    #[test]
    fn test_container_flag() {
        let registry = ShapeRegistry::builtin();
        assert!(registry.is_container("block-node"));
        assert!(!registry.is_container("oracle"));
        assert!(!registry.is_container("missing"));
    }
}
