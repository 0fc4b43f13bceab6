//! Mindmap Layout - WASM Module
//!
//! This module provides a deterministic layout engine for mindmap-style
//! trees: given a root in a diagram graph, it computes a top-left position
//! for every visible node in one of six directions (Right, Left, Both, Top,
//! Bottom, Radial) and writes them back. It is compiled to WebAssembly and
//! exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: Host diagram graph using petgraph's StableGraph
//! - `layout`: Extract, visibility, sizing, assignment and write passes
//! - `spatial`: R-tree of placed boxes for overlap checks
//! - `logging`: tracing subscriber setup (native and browser)

use js_sys::{Float32Array, Function};
use wasm_bindgen::prelude::*;

pub mod graph;
pub mod layout;
pub mod logging;
pub mod spatial;

use graph::{DiagramGraph, EdgeId, NodeId, OrderKey};
use layout::{LayoutConfig, LayoutError, LayoutRequest, MindmapLayout, PositionSink};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = logging::init_logging(None, None);
}

/// Main entry point for the layout engine.
///
/// This struct wraps a [`DiagramGraph`] and a [`MindmapLayout`] and provides
/// the public API exposed to JavaScript.
#[wasm_bindgen]
pub struct MindmapLayoutWasm {
    graph: DiagramGraph,
    layout: MindmapLayout,
}

impl Default for MindmapLayoutWasm {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl MindmapLayoutWasm {
    /// Create an empty diagram with the default layout configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            graph: DiagramGraph::new(),
            layout: MindmapLayout::with_defaults(),
        }
    }

    /// Create a diagram with pre-allocated capacity.
    ///
    /// # Arguments
    ///
    /// * `node_capacity` - Expected number of nodes
    /// * `edge_capacity` - Expected number of edges
    #[wasm_bindgen(js_name = withCapacity)]
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: DiagramGraph::with_capacity(node_capacity, edge_capacity),
            layout: MindmapLayout::with_defaults(),
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node with its top-left position and measured size.
    ///
    /// Returns the stable node ID. The node gets the next order key.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, x: f32, y: f32, width: f32, height: f32) -> u32 {
        self.graph.add_node(x, y, width, height).raw()
    }

    /// Add a node restored from a saved document, keeping its order key.
    #[wasm_bindgen(js_name = addNodeWithOrderKey)]
    pub fn add_node_with_order_key(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        order_key: u64,
    ) -> u32 {
        self.graph
            .add_node_with_order_key(x, y, width, height, OrderKey(order_key))
            .raw()
    }

    /// Remove a node and its edges.
    ///
    /// Returns true if the node existed and was removed.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: u32) -> bool {
        self.graph.remove_node(NodeId(node_id))
    }

    /// Get the number of nodes in the diagram.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.graph.node_count()
    }

    /// Get a node's X position.
    #[wasm_bindgen(js_name = getNodeX)]
    pub fn get_node_x(&self, node_id: u32) -> Option<f32> {
        self.graph.get_node_position(NodeId(node_id)).map(|(x, _)| x)
    }

    /// Get a node's Y position.
    #[wasm_bindgen(js_name = getNodeY)]
    pub fn get_node_y(&self, node_id: u32) -> Option<f32> {
        self.graph.get_node_position(NodeId(node_id)).map(|(_, y)| y)
    }

    /// Set a node's position.
    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, node_id: u32, x: f32, y: f32) -> bool {
        self.graph.set_node_position(NodeId(node_id), x, y)
    }

    /// Set a node's size after the renderer measured it.
    #[wasm_bindgen(js_name = setNodeSize)]
    pub fn set_node_size(&mut self, node_id: u32, width: f32, height: f32) -> bool {
        self.graph.set_node_size(NodeId(node_id), width, height)
    }

    /// Get a node's size as [width, height].
    #[wasm_bindgen(js_name = getNodeSize)]
    pub fn get_node_size(&self, node_id: u32) -> Option<Vec<f32>> {
        self.graph
            .get_node_size(NodeId(node_id))
            .map(|(w, h)| vec![w, h])
    }

    /// Get a node's order key.
    #[wasm_bindgen(js_name = getOrderKey)]
    pub fn get_order_key(&self, node_id: u32) -> Option<u64> {
        self.graph.order_key(NodeId(node_id)).map(OrderKey::raw)
    }

    /// Collapse or expand a node's branch. Takes effect on the next layout.
    #[wasm_bindgen(js_name = setCollapsed)]
    pub fn set_collapsed(&mut self, node_id: u32, collapsed: bool) -> bool {
        self.graph.set_collapsed(NodeId(node_id), collapsed)
    }

    /// Check if a node is collapsed.
    #[wasm_bindgen(js_name = isCollapsed)]
    pub fn is_collapsed(&self, node_id: u32) -> bool {
        self.graph.is_collapsed(NodeId(node_id))
    }

    /// Check if the last layout hid a node.
    #[wasm_bindgen(js_name = isNodeHidden)]
    pub fn is_node_hidden(&self, node_id: u32) -> bool {
        self.graph.is_node_hidden(NodeId(node_id))
    }

    /// Find the root of the tree containing a node.
    #[wasm_bindgen(js_name = rootOf)]
    pub fn root_of(&self, node_id: u32) -> Option<u32> {
        self.graph.tree_root(NodeId(node_id)).map(NodeId::raw)
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add a parent → child edge.
    ///
    /// Returns the edge ID, or undefined if either node doesn't exist.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, source: u32, target: u32) -> Option<u32> {
        self.graph
            .add_edge(NodeId(source), NodeId(target))
            .map(EdgeId::raw)
    }

    /// Remove an edge by ID.
    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, edge_id: u32) -> bool {
        self.graph.remove_edge(EdgeId(edge_id))
    }

    /// Move a node under a new parent.
    ///
    /// Returns the new edge ID, or undefined if the move would create a cycle.
    pub fn reparent(&mut self, child: u32, new_parent: u32) -> Option<u32> {
        self.graph
            .reparent(NodeId(child), NodeId(new_parent))
            .map(EdgeId::raw)
    }

    /// Get the number of edges in the diagram.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count()
    }

    /// Get a node's children.
    #[wasm_bindgen(js_name = getChildren)]
    pub fn get_children(&self, node_id: u32) -> Vec<u32> {
        self.graph
            .children(NodeId(node_id))
            .into_iter()
            .map(NodeId::raw)
            .collect()
    }

    /// Check if the last layout hid an edge.
    #[wasm_bindgen(js_name = isEdgeHidden)]
    pub fn is_edge_hidden(&self, edge_id: u32) -> bool {
        self.graph.is_edge_hidden(EdgeId(edge_id))
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Replace the layout configuration.
    ///
    /// Accepts a partial object; missing fields keep their defaults.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let config: LayoutConfig = serde_wasm_bindgen::from_value(config)?;
        self.layout.set_config(config)?;
        Ok(())
    }

    /// Get the active layout configuration.
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(self.layout.config())?)
    }

    /// Compute a layout without moving any node.
    ///
    /// `request` is `{ root, direction?, mode?, sortOrder?, anchor? }`.
    /// Returns a flat Float32Array [id0, x0, y0, id1, x1, y1, ...].
    #[wasm_bindgen(js_name = computeLayout)]
    pub fn compute_layout(&self, request: JsValue) -> Result<Float32Array, JsError> {
        let request: LayoutRequest = serde_wasm_bindgen::from_value(request)?;
        let flat = self.layout_flat(&request)?;
        Ok(Float32Array::from(&flat[..]))
    }

    /// Compute a layout and move the nodes.
    ///
    /// Returns the number of nodes laid out.
    #[wasm_bindgen(js_name = applyLayout)]
    pub fn apply_layout(&mut self, request: JsValue) -> Result<u32, JsError> {
        let request: LayoutRequest = serde_wasm_bindgen::from_value(request)?;
        Ok(self.apply(&request)?)
    }

    /// Compute a layout and hand each position to a host callback.
    ///
    /// `set_position(id, x, y)` returning `false` marks the node as skipped.
    /// Returns the number of positions the callback accepted.
    #[wasm_bindgen(js_name = applyLayoutWith)]
    pub fn apply_layout_with(&self, request: JsValue, set_position: &Function) -> Result<u32, JsError> {
        let request: LayoutRequest = serde_wasm_bindgen::from_value(request)?;
        let mut sink = JsSink {
            callback: set_position,
            error: None,
        };
        let report = self.layout.apply_with(&self.graph, &mut sink, &request)?;
        if let Some(error) = sink.error {
            return Err(JsError::new(&format!("setPosition callback failed: {:?}", error)));
        }
        Ok(report.written as u32)
    }

    /// Remove all nodes and edges. Order keys keep increasing.
    pub fn clear(&mut self) {
        self.graph.clear();
    }
}

impl MindmapLayoutWasm {
    /// Compute a layout as [id, x, y, ...].
    fn layout_flat(&self, request: &LayoutRequest) -> Result<Vec<f32>, LayoutError> {
        let outcome = self.layout.compute(&self.graph, request)?;
        let mut flat = Vec::with_capacity(outcome.positions.len() * 3);
        for (id, placement) in outcome.positions.iter() {
            flat.extend([id.raw() as f32, placement.position.x, placement.position.y]);
        }
        Ok(flat)
    }

    fn apply(&mut self, request: &LayoutRequest) -> Result<u32, LayoutError> {
        let report = self.layout.apply(&mut self.graph, request)?;
        Ok(report.laid_out as u32)
    }
}

/// Forwards positions to a JavaScript `setPosition(id, x, y)` callback.
struct JsSink<'a> {
    callback: &'a Function,
    error: Option<JsValue>,
}

impl PositionSink for JsSink<'_> {
    fn set_position(&mut self, id: NodeId, x: f32, y: f32) -> bool {
        if self.error.is_some() {
            return false;
        }
        let result = self.callback.call3(
            &JsValue::NULL,
            &JsValue::from(id.raw()),
            &JsValue::from(x),
            &JsValue::from(y),
        );
        match result {
            Ok(value) => value.as_bool() != Some(false),
            Err(error) => {
                self.error = Some(error);
                false
            }
        }
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use layout::{Direction, Point, SortOrder};

    fn facade_with_tree() -> (MindmapLayoutWasm, u32, Vec<u32>) {
        let mut facade = MindmapLayoutWasm::new();
        let root = facade.add_node(0.0, 0.0, 160.0, 80.0);
        let children = (0..3)
            .map(|_| {
                let id = facade.add_node(0.0, 0.0, 120.0, 40.0);
                facade.add_edge(root, id);
                id
            })
            .collect();
        (facade, root, children)
    }

    #[test]
    fn test_flat_layout_triples() {
        let (facade, root, children) = facade_with_tree();
        let flat = facade.layout_flat(&LayoutRequest::new(NodeId(root))).unwrap();

        assert_eq!(flat.len(), 12);
        assert_eq!(&flat[..3], &[root as f32, 0.0, 0.0]);
        assert_eq!(&flat[3..6], &[children[0] as f32, 260.0, -44.0]);
        assert_eq!(facade.get_node_x(children[0]), Some(0.0));
    }

    #[test]
    fn test_apply_moves_nodes() {
        let (mut facade, root, children) = facade_with_tree();
        let laid_out = facade.apply(&LayoutRequest::new(NodeId(root))).unwrap();

        assert_eq!(laid_out, 4);
        assert_eq!(facade.get_node_x(children[1]), Some(260.0));
        assert_eq!(facade.get_node_y(children[1]), Some(20.0));
    }

    #[test]
    fn test_collapse_hides_branch() {
        let (mut facade, root, children) = facade_with_tree();
        let grandchild = facade.add_node(0.0, 0.0, 50.0, 20.0);
        let edge = facade.add_edge(children[0], grandchild).unwrap();
        facade.set_collapsed(children[0], true);

        let laid_out = facade.apply(&LayoutRequest::new(NodeId(root))).unwrap();
        assert_eq!(laid_out, 4);
        assert!(facade.is_node_hidden(grandchild));
        assert!(facade.is_edge_hidden(edge));
        assert_eq!(facade.get_node_x(grandchild), Some(0.0));

        facade.set_collapsed(children[0], false);
        facade.apply(&LayoutRequest::new(NodeId(root))).unwrap();
        assert!(!facade.is_node_hidden(grandchild));
        assert!(!facade.is_edge_hidden(edge));
        assert_eq!(facade.get_node_x(grandchild), Some(260.0 + 120.0 + 100.0));
    }

    #[test]
    fn test_root_of_after_reparent() {
        let (mut facade, root, children) = facade_with_tree();
        let grandchild = facade.add_node(0.0, 0.0, 50.0, 20.0);
        facade.add_edge(children[0], grandchild);

        assert_eq!(facade.root_of(grandchild), Some(root));
        assert!(facade.reparent(grandchild, children[2]).is_some());
        assert_eq!(facade.get_children(children[2]), vec![grandchild]);
        assert!(facade.get_children(children[0]).is_empty());

        // Moving a node under its own descendant is refused
        assert!(facade.reparent(children[2], grandchild).is_none());
    }

    #[test]
    fn test_unknown_root() {
        let (facade, _, _) = facade_with_tree();
        let result = facade.layout_flat(&LayoutRequest::new(NodeId(42)));
        assert_eq!(result.unwrap_err(), LayoutError::UnknownRoot(NodeId(42)));
    }

    #[test]
    fn test_radial_round_trip_through_graph() {
        let (mut facade, root, children) = facade_with_tree();
        let request = LayoutRequest::new(NodeId(root))
            .with_direction(Direction::Radial)
            .with_sort_order(SortOrder::AngularClockwise)
            .with_anchor(Point::new(100.0, 100.0));
        facade.apply(&request).unwrap();

        // First child sits on the positive x axis through the root's center
        let y = facade.get_node_y(children[0]).unwrap();
        assert!((y + 20.0 - 140.0).abs() < 1e-3);
        assert!(facade.get_node_x(children[0]).unwrap() > 260.0);
    }

    #[test]
    fn test_clear_keeps_order_keys_increasing() {
        let (mut facade, _, children) = facade_with_tree();
        let last_key = facade.get_order_key(children[2]).unwrap();
        facade.clear();
        assert_eq!(facade.node_count(), 0);

        let fresh = facade.add_node(0.0, 0.0, 10.0, 10.0);
        assert!(facade.get_order_key(fresh).unwrap() > last_key);
    }
}
