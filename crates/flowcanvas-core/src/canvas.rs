//! Canvas engine: the graph document plus every mutation the editor
//! performs on it.
//!
//! The engine owns the document and the shape registry. All structural
//! changes go through engine methods so derived behavior (port layout,
//! child expansion, containment) and change notification stay consistent.
//! Notifications are delivered depth-first: a mutation triggered while
//! servicing another completes its own delivery before the outer one fires.

use crate::capability::CapabilityOption;
use crate::constraint::{self, ContainmentMargins};
use crate::error::GraphError;
use crate::expansion;
use crate::layout::{self, PortLayoutConfig};
use crate::model::{Edge, EdgeId, Node, NodeId, PortOrientation};
use crate::registry::{NodeConfig, ShapeRegistry};
use crate::routing::{self, ConnectTerminal, ConnectionCandidate};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The serializable graph state: nodes, edges, and render order.
///
/// `z_order` holds every node id, back to front. Containers are inserted at
/// the back so free nodes dropped later always render above them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeId, Edge>,
    z_order: Vec<NodeId>,
}

impl GraphDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Nodes in render order, back to front.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.z_order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Direct children of a node, by parent back-reference.
    pub fn children_of(&self, parent: NodeId) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| n.data.parent_id == Some(parent))
            .map(|n| n.id())
            .collect()
    }

    /// Edges touching the given node at either end.
    pub fn edges_touching(&self, node: NodeId) -> Vec<EdgeId> {
        self.edges
            .values()
            .filter(|e| e.touches(node))
            .map(|e| e.id())
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn insert_node(&mut self, node: Node, container: bool) -> NodeId {
        let id = node.id();
        self.nodes.insert(id, node);
        if container {
            self.z_order.insert(0, id);
        } else {
            self.z_order.push(id);
        }
        id
    }

    fn take_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.z_order.retain(|n| *n != id);
        Some(node)
    }
}

/// Change notification emitted after a mutation has been committed.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    NodeAdded { node: NodeId },
    NodeRemoved { node: NodeId },
    NodeMoved { node: NodeId, from: Point, to: Point },
    NodeResized { node: NodeId, width: f64, height: f64 },
    EdgeAdded { edge: EdgeId },
    EdgeRemoved { edge: EdgeId },
    EdgeConnected { edge: EdgeId },
}

/// Options for a position change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// Suppress containment enforcement for this one move. Set on the
    /// corrective move the enforcement itself issues, so a clamp never
    /// re-triggers enforcement.
    pub skip_containment: bool,
}

impl MoveOptions {
    pub fn skipping_containment() -> Self {
        Self {
            skip_containment: true,
        }
    }
}

type Subscriber = Box<dyn FnMut(&CanvasEvent)>;

/// The canvas engine: document, registry, and mutation surface.
pub struct CanvasEngine {
    document: GraphDocument,
    registry: ShapeRegistry,
    layout_config: PortLayoutConfig,
    margins: ContainmentMargins,
    subscribers: Vec<Subscriber>,
}

impl std::fmt::Debug for CanvasEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasEngine")
            .field("document", &self.document)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl CanvasEngine {
    pub fn new(registry: ShapeRegistry) -> Self {
        Self {
            document: GraphDocument::new(),
            registry,
            layout_config: PortLayoutConfig::default(),
            margins: ContainmentMargins::default(),
            subscribers: Vec::new(),
        }
    }

    /// Restore an engine around a previously serialized document.
    pub fn with_document(registry: ShapeRegistry, document: GraphDocument) -> Self {
        let mut engine = Self::new(registry);
        engine.document = document;
        engine
    }

    pub fn document(&self) -> &GraphDocument {
        &self.document
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn layout_config(&self) -> &PortLayoutConfig {
        &self.layout_config
    }

    pub fn margins(&self) -> &ContainmentMargins {
        &self.margins
    }

    /// Register a change listener. Listeners observe committed state only.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&CanvasEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    fn notify(&mut self, event: CanvasEvent) {
        let mut subscribers = std::mem::take(&mut self.subscribers);
        for subscriber in subscribers.iter_mut() {
            subscriber(&event);
        }
        subscribers.append(&mut self.subscribers);
        self.subscribers = subscribers;
    }

    /// Instantiate a shape at a position and add it to the document.
    pub fn drop_shape(&mut self, shape: &str, at: Point) -> Result<NodeId, GraphError> {
        let config = NodeConfig::new(shape, at.x, at.y);
        let Some(node) = self.registry.instantiate(&config) else {
            return Err(GraphError::UnknownShape(shape.to_string()));
        };
        Ok(self.add_node(node))
    }

    /// Add a fully built node. Containers go to the back of the z-order.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let container = self.registry.is_container(&node.shape);
        let id = self.document.insert_node(node, container);
        self.notify(CanvasEvent::NodeAdded { node: id });
        id
    }

    /// Remove a node, its spawned descendants, and every incident edge.
    /// Nodes merely embedded in it are released, not deleted.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if self.document.node(id).is_none() {
            return false;
        }
        for child in self.document.children_of(id) {
            self.remove_node(child);
        }
        for edge in self.document.edges_touching(id) {
            self.remove_edge(edge);
        }
        self.document.take_node(id);
        for node in self.document.nodes.values_mut() {
            if node.data.embedded_in == Some(id) {
                node.data.embedded_in = None;
            }
        }
        self.notify(CanvasEvent::NodeRemoved { node: id });
        true
    }

    /// Move a node. The requested position is committed first; unless
    /// suppressed, containment enforcement then issues its own corrective
    /// move, whose notification is delivered before this one.
    pub fn set_node_position(
        &mut self,
        id: NodeId,
        to: Point,
        options: MoveOptions,
    ) -> Result<(), GraphError> {
        let Some(node) = self.document.node_mut(id) else {
            return Err(GraphError::NodeNotFound(id));
        };
        let from = node.position;
        node.position = to;
        if !options.skip_containment {
            self.enforce_containment(id);
        }
        self.notify(CanvasEvent::NodeMoved { node: id, from, to });
        Ok(())
    }

    /// Clamp a node back inside the container it is embedded in, if any.
    fn enforce_containment(&mut self, id: NodeId) {
        let Some(node) = self.document.node(id) else {
            return;
        };
        let Some(parent_id) = node.data.embedded_in else {
            return;
        };
        let Some(parent) = self.document.node(parent_id) else {
            log::warn!("node {id} embedded in missing container {parent_id}, clamp skipped");
            return;
        };
        if !self.registry.is_container(&parent.shape) {
            return;
        }
        let clamped = constraint::clamp_position(
            parent.bounds(),
            kurbo::Size::new(node.width, node.height),
            node.position,
            &self.margins,
        );
        if clamped != node.position {
            // Corrective move with enforcement suppressed, so this recursion
            // is depth one at most.
            let _ = self.set_node_position(id, clamped, MoveOptions::skipping_containment());
        }
    }

    /// Re-evaluate which container (if any) a node is embedded in. Called
    /// at the end of a drag gesture. Only the embedding is rewritten here;
    /// spawn ownership (`parent_id`) survives any amount of dragging.
    pub fn assign_parent(&mut self, id: NodeId) {
        let new_parent = constraint::find_parent(&self.document, &self.registry, id);
        let Some(node) = self.document.node_mut(id) else {
            return;
        };
        if node.data.embedded_in == new_parent {
            return;
        }
        node.data.embedded_in = new_parent;
        if new_parent.is_some() {
            self.enforce_containment(id);
        }
    }

    /// Add an edge after checking both endpoints resolve to real ports.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeId, GraphError> {
        for endpoint in [&edge.source, &edge.target] {
            let Some(node) = self.document.node(endpoint.node) else {
                return Err(GraphError::NodeNotFound(endpoint.node));
            };
            if node.port(&endpoint.port).is_none() {
                return Err(GraphError::PortNotFound {
                    node: endpoint.node,
                    port: endpoint.port.clone(),
                });
            }
        }
        if edge.source == edge.target {
            return Err(GraphError::SelfLoop {
                node: edge.source.node,
                port: edge.source.port,
            });
        }
        let id = edge.id();
        self.document.edges.insert(id, edge);
        self.notify(CanvasEvent::EdgeAdded { edge: id });
        Ok(id)
    }

    /// Complete an interactive wiring gesture: validate the candidate, pick
    /// the connector for the endpoint shapes, and add the edge.
    pub fn connect(&mut self, candidate: &ConnectionCandidate) -> Option<EdgeId> {
        if !routing::validate_connection(&self.document, candidate) {
            return None;
        }
        let (ConnectTerminal::Port {
            node: source_node,
            port: source_port,
        }, ConnectTerminal::Port {
            node: target_node,
            port: target_port,
        }) = (&candidate.source, &candidate.target)
        else {
            return None;
        };
        let source_shape = self.document.node(*source_node)?.shape.clone();
        let target_shape = self.document.node(*target_node)?.shape.clone();

        let mut edge = Edge::new(
            crate::model::EdgeEndpoint::new(*source_node, source_port.clone()),
            crate::model::EdgeEndpoint::new(*target_node, target_port.clone()),
        );
        edge.connector = routing::connector_for(&source_shape, &target_shape);
        let id = self.add_edge(edge).ok()?;
        self.notify(CanvasEvent::EdgeConnected { edge: id });
        Some(id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        if self.document.edges.remove(&id).is_none() {
            return false;
        }
        self.notify(CanvasEvent::EdgeRemoved { edge: id });
        true
    }

    /// Resize a node, clamped to the template minimum.
    pub fn resize_node(&mut self, id: NodeId, width: f64, height: f64) -> Result<(), GraphError> {
        let Some(node) = self.document.node(id) else {
            return Err(GraphError::NodeNotFound(id));
        };
        let (min_width, min_height) = self
            .registry
            .template(&node.shape)
            .map(|t| (t.min_width, t.min_height))
            .unwrap_or((0.0, 0.0));
        let width = width.max(min_width);
        let height = height.max(min_height);
        let node = self.document.node_mut(id).expect("checked above");
        node.width = width;
        node.height = height;
        self.notify(CanvasEvent::NodeResized {
            node: id,
            width,
            height,
        });
        Ok(())
    }

    /// Replace a node's capability state and run every derived behavior:
    /// port regeneration for dynamic shapes, then child expansion for
    /// spawn-capable shapes.
    pub fn update_options(&mut self, id: NodeId, options: Vec<CapabilityOption>) {
        let Some(node) = self.document.node_mut(id) else {
            log::warn!("option update for missing node {id} ignored");
            return;
        };
        node.data.options = options;
        self.relayout_if_dynamic(id);
        let spawns = self
            .document
            .node(id)
            .and_then(|n| self.registry.template(&n.shape))
            .is_some_and(|t| t.spawn.is_some());
        if spawns {
            expansion::rebuild_children(self, id);
        }
    }

    /// Flip the layout orientation of a dynamic-port node.
    pub fn set_orientation(&mut self, id: NodeId, orientation: PortOrientation) {
        let Some(node) = self.document.node_mut(id) else {
            log::warn!("orientation change for missing node {id} ignored");
            return;
        };
        if node.data.orientation == orientation {
            return;
        }
        node.data.orientation = orientation;
        self.relayout_if_dynamic(id);
    }

    fn relayout_if_dynamic(&mut self, id: NodeId) {
        let Some(node) = self.document.node(id) else {
            return;
        };
        let Some(template) = self.registry.template(&node.shape) else {
            return;
        };
        if !template.dynamic_ports {
            return;
        }
        let template = template.clone();
        let node = self.document.node_mut(id).expect("checked above");
        layout::layout_ports(node, &template, &self.layout_config);
        let (width, height) = (node.width, node.height);
        self.notify(CanvasEvent::NodeResized {
            node: id,
            width,
            height,
        });
    }

    /// Set the display heading. Cosmetic, no structural effect.
    pub fn set_heading(&mut self, id: NodeId, heading: impl Into<String>) {
        if let Some(node) = self.document.node_mut(id) {
            node.data.heading = Some(heading.into());
        }
    }

    /// Set display colors. Cosmetic, no structural effect.
    pub fn set_colors(
        &mut self,
        id: NodeId,
        background_color: Option<String>,
        text_color: Option<String>,
    ) {
        if let Some(node) = self.document.node_mut(id) {
            node.data.background_color = background_color;
            node.data.text_color = text_color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine() -> CanvasEngine {
        CanvasEngine::new(ShapeRegistry::builtin())
    }

    fn recorded(engine: &mut CanvasEngine) -> Rc<RefCell<Vec<CanvasEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        engine.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    #[test]
    fn test_drop_shape_instantiates_template() {
        let mut engine = engine();
        let id = engine
            .drop_shape("multi-ai-node", Point::new(100.0, 50.0))
            .unwrap();
        let node = engine.document().node(id).unwrap();
        assert_eq!(node.shape, "multi-ai-node");
        assert_eq!(node.position, Point::new(100.0, 50.0));
        assert_eq!(node.ports.len(), 4);
    }

    #[test]
    fn test_drop_unknown_shape_fails() {
        let mut engine = engine();
        assert_eq!(
            engine.drop_shape("no-such-shape", Point::ZERO),
            Err(GraphError::UnknownShape("no-such-shape".into()))
        );
        assert_eq!(engine.document().node_count(), 0);
    }

    #[test]
    fn test_containers_sit_at_back_of_z_order() {
        let mut engine = engine();
        let text = engine.drop_shape("text-3", Point::ZERO).unwrap();
        let block = engine.drop_shape("block-node", Point::ZERO).unwrap();
        let order: Vec<NodeId> = engine.document().nodes().map(|n| n.id()).collect();
        assert_eq!(order, vec![block, text]);
    }

    #[test]
    fn test_move_emits_event() {
        let mut engine = engine();
        let id = engine.drop_shape("text-3", Point::ZERO).unwrap();
        let events = recorded(&mut engine);

        engine
            .set_node_position(id, Point::new(40.0, 60.0), MoveOptions::default())
            .unwrap();
        assert_eq!(
            events.borrow().as_slice(),
            &[CanvasEvent::NodeMoved {
                node: id,
                from: Point::ZERO,
                to: Point::new(40.0, 60.0),
            }]
        );
    }

    #[test]
    fn test_move_clamps_embedded_child() {
        let mut engine = engine();
        let block = engine.drop_shape("block-node", Point::ZERO).unwrap();
        let child = engine
            .drop_shape("text-3", Point::new(100.0, 100.0))
            .unwrap();
        // text-3 is 200x50, block-node 400x300: fully inside.
        engine.assign_parent(child);
        assert_eq!(
            engine.document().node(child).unwrap().data.embedded_in,
            Some(block)
        );

        let events = recorded(&mut engine);
        engine
            .set_node_position(child, Point::new(-50.0, -50.0), MoveOptions::default())
            .unwrap();

        // Corrective move lands at the inner top-left corner and is
        // delivered before the outer move notification.
        assert_eq!(
            engine.document().node(child).unwrap().position,
            Point::new(10.0, 40.0)
        );
        assert_eq!(
            events.borrow().as_slice(),
            &[
                CanvasEvent::NodeMoved {
                    node: child,
                    from: Point::new(-50.0, -50.0),
                    to: Point::new(10.0, 40.0),
                },
                CanvasEvent::NodeMoved {
                    node: child,
                    from: Point::new(100.0, 100.0),
                    to: Point::new(-50.0, -50.0),
                },
            ]
        );
    }

    #[test]
    fn test_skip_containment_moves_freely() {
        let mut engine = engine();
        let _block = engine.drop_shape("block-node", Point::ZERO).unwrap();
        let child = engine
            .drop_shape("text-3", Point::new(100.0, 100.0))
            .unwrap();
        engine.assign_parent(child);

        engine
            .set_node_position(
                child,
                Point::new(-50.0, -50.0),
                MoveOptions::skipping_containment(),
            )
            .unwrap();
        assert_eq!(
            engine.document().node(child).unwrap().position,
            Point::new(-50.0, -50.0)
        );
    }

    #[test]
    fn test_assign_parent_picks_smallest_container() {
        let mut engine = engine();
        let outer = engine.drop_shape("block-node", Point::ZERO).unwrap();
        engine.resize_node(outer, 900.0, 700.0).unwrap();
        let inner = engine
            .drop_shape("block-node", Point::new(50.0, 60.0))
            .unwrap();
        let child = engine
            .drop_shape("text-3", Point::new(100.0, 120.0))
            .unwrap();

        engine.assign_parent(child);
        assert_eq!(
            engine.document().node(child).unwrap().data.embedded_in,
            Some(inner)
        );

        // Dragged outside both containers the node floats free again.
        engine
            .set_node_position(
                child,
                Point::new(2000.0, 2000.0),
                MoveOptions::skipping_containment(),
            )
            .unwrap();
        engine.assign_parent(child);
        assert_eq!(engine.document().node(child).unwrap().data.embedded_in, None);
    }

    #[test]
    fn test_add_edge_rejects_bad_endpoints() {
        let mut engine = engine();
        let a = engine.drop_shape("text-3", Point::ZERO).unwrap();
        let b = engine.drop_shape("text-3", Point::new(300.0, 0.0)).unwrap();

        let missing_node = Edge::new(
            crate::model::EdgeEndpoint::new(a, "right"),
            crate::model::EdgeEndpoint::new(uuid::Uuid::new_v4(), "left"),
        );
        assert!(matches!(
            engine.add_edge(missing_node),
            Err(GraphError::NodeNotFound(_))
        ));

        let missing_port = Edge::new(
            crate::model::EdgeEndpoint::new(a, "right"),
            crate::model::EdgeEndpoint::new(b, "nope"),
        );
        assert!(matches!(
            engine.add_edge(missing_port),
            Err(GraphError::PortNotFound { .. })
        ));

        let self_loop = Edge::new(
            crate::model::EdgeEndpoint::new(a, "right"),
            crate::model::EdgeEndpoint::new(a, "right"),
        );
        assert!(matches!(
            engine.add_edge(self_loop),
            Err(GraphError::SelfLoop { .. })
        ));
    }

    #[test]
    fn test_connect_picks_connector_for_shape_pair() {
        let mut engine = engine();
        let text1 = engine.drop_shape("text-1", Point::ZERO).unwrap();
        let text3 = engine.drop_shape("text-3", Point::new(300.0, 0.0)).unwrap();
        let events = recorded(&mut engine);

        let id = engine
            .connect(&ConnectionCandidate {
                source: ConnectTerminal::port(text1, "right"),
                target: ConnectTerminal::port(text3, "left"),
            })
            .unwrap();

        let edge = engine.document().edge(id).unwrap();
        assert_eq!(
            edge.connector,
            crate::model::ConnectorSpec::smooth_horizontal()
        );
        assert_eq!(
            events.borrow().as_slice(),
            &[
                CanvasEvent::EdgeAdded { edge: id },
                CanvasEvent::EdgeConnected { edge: id },
            ]
        );
    }

    #[test]
    fn test_connect_rejects_invalid_candidate() {
        let mut engine = engine();
        let a = engine.drop_shape("text-3", Point::ZERO).unwrap();
        assert!(
            engine
                .connect(&ConnectionCandidate {
                    source: ConnectTerminal::port(a, "right"),
                    target: ConnectTerminal::Blank,
                })
                .is_none()
        );
        assert_eq!(engine.document().edge_count(), 0);
    }

    #[test]
    fn test_resize_clamps_to_template_minimum() {
        let mut engine = engine();
        let block = engine.drop_shape("block-node", Point::ZERO).unwrap();
        engine.resize_node(block, 50.0, 50.0).unwrap();
        let node = engine.document().node(block).unwrap();
        assert_eq!((node.width, node.height), (200.0, 100.0));
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut engine = engine();
        let a = engine.drop_shape("text-3", Point::ZERO).unwrap();
        let b = engine.drop_shape("text-3", Point::new(300.0, 0.0)).unwrap();
        engine
            .connect(&ConnectionCandidate {
                source: ConnectTerminal::port(a, "right"),
                target: ConnectTerminal::port(b, "left"),
            })
            .unwrap();

        assert!(engine.remove_node(b));
        assert_eq!(engine.document().edge_count(), 0);
        assert_eq!(engine.document().node_count(), 1);
    }

    #[test]
    fn test_document_json_round_trip() {
        let mut engine = engine();
        let a = engine.drop_shape("multi-ai-node", Point::new(10.0, 20.0)).unwrap();
        let b = engine.drop_shape("text-2", Point::new(400.0, 0.0)).unwrap();
        engine
            .connect(&ConnectionCandidate {
                source: ConnectTerminal::port(a, "right"),
                target: ConnectTerminal::port(b, "top"),
            })
            .unwrap();

        let json = engine.document().to_json().unwrap();
        let restored = GraphDocument::from_json(&json).unwrap();
        assert_eq!(restored.node_count(), 2);
        assert_eq!(restored.edge_count(), 1);
        let node = restored.node(a).unwrap();
        assert_eq!(node.position, Point::new(10.0, 20.0));
        assert_eq!(node.ports.len(), 4);
        let order: Vec<NodeId> = restored.nodes().map(|n| n.id()).collect();
        let original: Vec<NodeId> = engine.document().nodes().map(|n| n.id()).collect();
        assert_eq!(order, original);
    }

    #[test]
    fn test_orientation_flip_relayouts() {
        let mut engine = engine();
        let id = engine.drop_shape("multi-ai-node", Point::ZERO).unwrap();
        let mut options = engine.document().node(id).unwrap().data.options.clone();
        crate::capability::toggle(&mut options, "memory");
        engine.update_options(id, options);
        assert_eq!(engine.document().node(id).unwrap().width, 350.0);

        engine.set_orientation(id, PortOrientation::Vertical);
        let node = engine.document().node(id).unwrap();
        assert_eq!(node.width, 150.0);
        assert!(node.port("port-memory").is_some());
    }
}
