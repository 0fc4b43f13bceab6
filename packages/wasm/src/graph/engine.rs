//! DiagramGraph - the host's node/edge store.
//!
//! The DiagramGraph stores the diagram topology using petgraph's StableGraph
//! and maintains SoA (Structure of Arrays) buffers for node boxes, order keys
//! and state flags. It is the default [`TreeSource`] the layout engine reads
//! and the default [`PositionSink`] it writes to.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, NodeIndexable};
use petgraph::{Directed, Direction};
use std::collections::{HashMap, HashSet, VecDeque};

use super::edge::{EdgeId, EdgeState};
use super::node::{NodeId, NodeState, OrderCounter, OrderKey};
use crate::layout::{EdgeRecord, NodeRecord, PositionSink, TreeSource};

/// Edge payload stored in the petgraph topology.
#[derive(Debug, Clone, Copy)]
struct EdgeSlot {
    id: EdgeId,
    state: EdgeState,
}

/// The host diagram graph.
///
/// This struct manages:
/// - Diagram topology via petgraph
/// - Node boxes (position + size) in SoA layout
/// - Order keys stamped from an injected [`OrderCounter`]
/// - Node and edge state (collapsed, hidden)
/// - ID mapping between stable IDs and internal indices
#[derive(Debug, Clone)]
pub struct DiagramGraph {
    /// The underlying graph structure.
    /// Nodes store their stable NodeId, edges store their id and state.
    graph: StableGraph<NodeId, EdgeSlot, Directed>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// Map from stable EdgeId to petgraph EdgeIndex
    edge_id_to_index: HashMap<EdgeId, EdgeIndex>,

    /// Next node ID to assign
    next_node_id: u32,

    /// Next edge ID to assign
    next_edge_id: u32,

    /// Source of creation-order stamps
    order_counter: OrderCounter,

    /// Top-left X positions (SoA layout)
    pos_x: Vec<f32>,

    /// Top-left Y positions (SoA layout)
    pos_y: Vec<f32>,

    /// Box widths (SoA layout)
    width: Vec<f32>,

    /// Box heights (SoA layout)
    height: Vec<f32>,

    /// Order keys (SoA layout)
    order_keys: Vec<OrderKey>,

    /// Node states (collapsed, hidden)
    states: Vec<NodeState>,
}

impl DiagramGraph {
    /// Create a new empty graph with a fresh order counter.
    pub fn new() -> Self {
        Self::with_counter(OrderCounter::default())
    }

    /// Create an empty graph that stamps order keys from `counter`.
    pub fn with_counter(order_counter: OrderCounter) -> Self {
        Self {
            graph: StableGraph::new(),
            node_id_to_index: HashMap::new(),
            edge_id_to_index: HashMap::new(),
            next_node_id: 0,
            next_edge_id: 0,
            order_counter,
            pos_x: Vec::new(),
            pos_y: Vec::new(),
            width: Vec::new(),
            height: Vec::new(),
            order_keys: Vec::new(),
            states: Vec::new(),
        }
    }

    /// Create a graph with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            node_id_to_index: HashMap::with_capacity(node_capacity),
            edge_id_to_index: HashMap::with_capacity(edge_capacity),
            pos_x: Vec::with_capacity(node_capacity),
            pos_y: Vec::with_capacity(node_capacity),
            width: Vec::with_capacity(node_capacity),
            height: Vec::with_capacity(node_capacity),
            order_keys: Vec::with_capacity(node_capacity),
            states: Vec::with_capacity(node_capacity),
            ..Self::new()
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node box, stamping it with the next order key.
    pub fn add_node(&mut self, x: f32, y: f32, width: f32, height: f32) -> NodeId {
        let key = self.order_counter.next();
        self.insert_node(x, y, width, height, key)
    }

    /// Add a node that already carries a persisted order key.
    ///
    /// The counter is advanced past `key` so nodes created afterwards still
    /// sort after every restored node.
    pub fn add_node_with_order_key(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        key: OrderKey,
    ) -> NodeId {
        self.order_counter.observe(key);
        self.insert_node(x, y, width, height, key)
    }

    fn insert_node(&mut self, x: f32, y: f32, width: f32, height: f32, key: OrderKey) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(id);
        self.node_id_to_index.insert(id, index);

        // StableGraph reuses vacant slots, so the SoA slot may already exist
        let i = index.index();
        if i >= self.pos_x.len() {
            let len = i + 1;
            self.pos_x.resize(len, 0.0);
            self.pos_y.resize(len, 0.0);
            self.width.resize(len, 0.0);
            self.height.resize(len, 0.0);
            self.order_keys.resize(len, OrderKey::default());
            self.states.resize(len, NodeState::new());
        }
        self.pos_x[i] = x;
        self.pos_y[i] = y;
        self.width[i] = width;
        self.height[i] = height;
        self.order_keys[i] = key;
        self.states[i] = NodeState::new();

        id
    }

    /// Remove a node and all its connected edges.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.node_id_to_index.remove(&id) else {
            return false;
        };

        // Remove edges connected to this node (both incoming and outgoing)
        let edges: Vec<EdgeId> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();
        for edge_id in edges {
            self.edge_id_to_index.remove(&edge_id);
        }

        // Zero out SoA arrays for the removed node's slot
        let i = index.index();
        if i < self.pos_x.len() {
            self.pos_x[i] = 0.0;
            self.pos_y[i] = 0.0;
            self.width[i] = 0.0;
            self.height[i] = 0.0;
            self.order_keys[i] = OrderKey::default();
            self.states[i] = NodeState::new();
        }

        self.graph.remove_node(index);
        true
    }

    /// Check whether a node exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_id_to_index.contains_key(&id)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// Get the upper bound on node indices (max index + 1).
    /// This may be larger than node_count() if nodes have been removed,
    /// since StableGraph preserves index stability.
    pub fn node_bound(&self) -> u32 {
        self.graph.node_bound() as u32
    }

    /// Get a node's top-left position.
    pub fn get_node_position(&self, id: NodeId) -> Option<(f32, f32)> {
        self.slot(id).map(|i| (self.pos_x[i], self.pos_y[i]))
    }

    /// Set a node's top-left position.
    ///
    /// Returns false if the node does not exist.
    pub fn set_node_position(&mut self, id: NodeId, x: f32, y: f32) -> bool {
        let Some(i) = self.slot(id) else {
            return false;
        };
        self.pos_x[i] = x;
        self.pos_y[i] = y;
        true
    }

    /// Get a node's (width, height).
    pub fn get_node_size(&self, id: NodeId) -> Option<(f32, f32)> {
        self.slot(id).map(|i| (self.width[i], self.height[i]))
    }

    /// Set a node's size, as measured by the host's renderer.
    pub fn set_node_size(&mut self, id: NodeId, width: f32, height: f32) -> bool {
        let Some(i) = self.slot(id) else {
            return false;
        };
        self.width[i] = width;
        self.height[i] = height;
        true
    }

    /// Get the order key stamped on a node at creation.
    pub fn order_key(&self, id: NodeId) -> Option<OrderKey> {
        self.slot(id).map(|i| self.order_keys[i])
    }

    /// The counter new nodes are stamped from.
    pub fn order_counter(&self) -> &OrderCounter {
        &self.order_counter
    }

    /// Collapse or expand a node's branch.
    ///
    /// Only the flag changes here; hidden flags follow on the next layout pass.
    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) -> bool {
        let Some(i) = self.slot(id) else {
            return false;
        };
        self.states[i].set_collapsed(collapsed);
        true
    }

    /// Check if a node's branch is collapsed.
    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.slot(id)
            .map(|i| self.states[i].is_collapsed())
            .unwrap_or(false)
    }

    /// Check if a node is hidden inside a collapsed branch.
    pub fn is_node_hidden(&self, id: NodeId) -> bool {
        self.slot(id)
            .map(|i| self.states[i].is_hidden())
            .unwrap_or(false)
    }

    fn slot(&self, id: NodeId) -> Option<usize> {
        self.node_id_to_index.get(&id).map(|index| index.index())
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add a parent → child edge.
    ///
    /// Returns None if source or target don't exist.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        let source_index = *self.node_id_to_index.get(&source)?;
        let target_index = *self.node_id_to_index.get(&target)?;

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        let slot = EdgeSlot {
            id,
            state: EdgeState::new(),
        };
        let index = self.graph.add_edge(source_index, target_index, slot);
        self.edge_id_to_index.insert(id, index);

        Some(id)
    }

    /// Remove an edge.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        if let Some(index) = self.edge_id_to_index.remove(&id) {
            self.graph.remove_edge(index);
            true
        } else {
            false
        }
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    /// Get an edge's (source, target).
    pub fn edge_endpoints(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        let index = *self.edge_id_to_index.get(&id)?;
        let (source, target) = self.graph.edge_endpoints(index)?;
        Some((self.graph[source], self.graph[target]))
    }

    /// Check if an edge is hidden inside a collapsed branch.
    pub fn is_edge_hidden(&self, id: EdgeId) -> bool {
        self.edge_id_to_index
            .get(&id)
            .and_then(|&index| self.graph.edge_weight(index))
            .map(|slot| slot.state.is_hidden())
            .unwrap_or(false)
    }

    /// Get the targets of a node's outgoing edges.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Get the sources of a node's incoming edges.
    pub fn parents(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        self.node_id_to_index
            .get(&id)
            .map(|&index| {
                self.graph
                    .neighbors_directed(index, direction)
                    .filter_map(|n| self.graph.node_weight(n).copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn edge_records(&self, id: NodeId, direction: Direction) -> Vec<EdgeRecord> {
        let Some(&index) = self.node_id_to_index.get(&id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(index, direction)
            .map(|e| EdgeRecord {
                id: e.weight().id,
                source: self.graph[e.source()],
                target: self.graph[e.target()],
            })
            .collect()
    }

    /// Move `child` under `new_parent`, replacing all of its incoming edges.
    ///
    /// Returns None if either node is missing, if `child == new_parent`, or
    /// if `new_parent` lies inside `child`'s own branch.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) -> Option<EdgeId> {
        if child == new_parent
            || !self.contains_node(child)
            || !self.contains_node(new_parent)
            || self.is_descendant(child, new_parent)
        {
            return None;
        }

        let incoming: Vec<EdgeId> = self
            .edge_records(child, Direction::Incoming)
            .into_iter()
            .map(|edge| edge.id)
            .collect();
        for edge in incoming {
            self.remove_edge(edge);
        }

        self.add_edge(new_parent, child)
    }

    /// Check whether `node` is reachable from `ancestor` along outgoing edges.
    pub fn is_descendant(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([ancestor]);
        visited.insert(ancestor);
        while let Some(current) = queue.pop_front() {
            for child in self.children(current) {
                if child == node {
                    return true;
                }
                if visited.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        false
    }

    /// Follow incoming edges up to the topmost ancestor of `id`.
    ///
    /// At each step the oldest incoming edge wins. Walking stops at a node
    /// with no parent, or at the first repeated node when the parents form a
    /// cycle.
    pub fn tree_root(&self, id: NodeId) -> Option<NodeId> {
        if !self.contains_node(id) {
            return None;
        }
        let mut visited = HashSet::new();
        let mut current = id;
        visited.insert(current);
        loop {
            let parent = self
                .edge_records(current, Direction::Incoming)
                .into_iter()
                .min_by_key(|edge| edge.id)
                .map(|edge| edge.source);
            match parent {
                Some(parent) if visited.insert(parent) => current = parent,
                _ => return Some(current),
            }
        }
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Get the bounding box (min_x, min_y, max_x, max_y) of all visible node boxes.
    /// Skips dead slots (nodes that have been removed) and hidden nodes.
    pub fn get_bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for node_index in self.graph.node_indices() {
            let i = node_index.index();
            if i >= self.pos_x.len() || self.states[i].is_hidden() {
                continue;
            }
            min_x = min_x.min(self.pos_x[i]);
            min_y = min_y.min(self.pos_y[i]);
            max_x = max_x.max(self.pos_x[i] + self.width[i]);
            max_y = max_y.max(self.pos_y[i] + self.height[i]);
        }

        if min_x == f32::INFINITY {
            return None;
        }

        Some((min_x, min_y, max_x, max_y))
    }

    /// Clear all nodes and edges.
    ///
    /// Node and edge ids restart at zero; the order counter keeps counting so
    /// keys stay unique for the lifetime of the graph.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.edge_id_to_index.clear();
        self.next_node_id = 0;
        self.next_edge_id = 0;
        self.pos_x.clear();
        self.pos_y.clear();
        self.width.clear();
        self.height.clear();
        self.order_keys.clear();
        self.states.clear();
    }
}

impl Default for DiagramGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeSource for DiagramGraph {
    fn node(&self, id: NodeId) -> Option<NodeRecord> {
        let i = self.slot(id)?;
        Some(NodeRecord {
            id,
            x: self.pos_x[i],
            y: self.pos_y[i],
            width: self.width[i],
            height: self.height[i],
            order_key: self.order_keys[i],
            collapsed: self.states[i].is_collapsed(),
        })
    }

    fn outgoing(&self, id: NodeId) -> Vec<EdgeRecord> {
        self.edge_records(id, Direction::Outgoing)
    }

    fn incoming(&self, id: NodeId) -> Vec<EdgeRecord> {
        self.edge_records(id, Direction::Incoming)
    }
}

impl PositionSink for DiagramGraph {
    fn set_position(&mut self, id: NodeId, x: f32, y: f32) -> bool {
        self.set_node_position(id, x, y)
    }

    fn set_node_hidden(&mut self, id: NodeId, hidden: bool) -> bool {
        let Some(i) = self.slot(id) else {
            return false;
        };
        self.states[i].set_hidden(hidden);
        true
    }

    fn set_edge_hidden(&mut self, id: EdgeId, hidden: bool) -> bool {
        let Some(&index) = self.edge_id_to_index.get(&id) else {
            return false;
        };
        match self.graph.edge_weight_mut(index) {
            Some(slot) => {
                slot.state.set_hidden(hidden);
                true
            }
            None => false,
        }
    }
}
