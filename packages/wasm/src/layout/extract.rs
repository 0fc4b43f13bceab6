//! Tree extraction.
//!
//! Walks the host graph from a root along outgoing edges and snapshots the
//! reachable part into an arena of [`TreeNode`]s. The arena owns its child
//! lists; host nodes are referenced by id only, so the later passes never
//! touch the live graph.
//!
//! Edges that lead back to an ancestor on the current path are skipped
//! (cycle), as are edges to a node already placed under another parent, so
//! every node appears at most once. Both are reported, not fatal.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::error::LayoutError;
use super::types::{Point, Size};
use crate::graph::{EdgeId, NodeId, OrderKey};

/// Snapshot of one host node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRecord {
    /// Stable node id.
    pub id: NodeId,
    /// Current top-left X.
    pub x: f32,
    /// Current top-left Y.
    pub y: f32,
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
    /// Creation-order stamp.
    pub order_key: OrderKey,
    /// Whether the node's branch is collapsed.
    pub collapsed: bool,
}

/// Snapshot of one host edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    /// Stable edge id.
    pub id: EdgeId,
    /// Parent end.
    pub source: NodeId,
    /// Child end.
    pub target: NodeId,
}

/// Read access to the host's node/edge graph.
pub trait TreeSource {
    /// Look up a node, or None if it does not exist.
    fn node(&self, id: NodeId) -> Option<NodeRecord>;

    /// Edges whose source is `id`.
    fn outgoing(&self, id: NodeId) -> Vec<EdgeRecord>;

    /// Edges whose target is `id`.
    fn incoming(&self, id: NodeId) -> Vec<EdgeRecord>;
}

/// One node of the extracted tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Host node id.
    pub id: NodeId,
    /// Box size, clamped to the configured minimum.
    pub size: Size,
    /// Depth from the root (root = 0).
    pub level: u32,
    /// Creation-order stamp.
    pub order_key: OrderKey,
    /// Whether the node's branch is collapsed.
    pub collapsed: bool,
    /// Set when an ancestor is collapsed.
    pub pruned: bool,
    /// Parent arena index (None for root).
    pub parent: Option<usize>,
    /// Edge from the parent (None for root).
    pub edge: Option<EdgeId>,
    /// Children that take part in layout, in discovery order.
    pub children: Vec<usize>,
    /// Children moved out of layout by a collapse.
    pub hidden_children: Vec<usize>,
}

/// Arena-backed tree snapshot. Index 0 is the root and every child index
/// is greater than its parent's.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    nodes: Vec<TreeNode>,
    root_position: Point,
    recovered: Vec<LayoutError>,
}

impl LayoutTree {
    /// Arena index of the root.
    pub const ROOT: usize = 0;

    /// Get a node by arena index.
    pub fn node(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    /// Get a mutable node by arena index.
    pub fn node_mut(&mut self, index: usize) -> &mut TreeNode {
        &mut self.nodes[index]
    }

    /// All nodes in pre-order.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Number of extracted nodes, pruned ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root's top-left position in the host graph.
    pub fn root_position(&self) -> Point {
        self.root_position
    }

    /// Conditions repaired during extraction.
    pub fn recovered(&self) -> &[LayoutError] {
        &self.recovered
    }

    /// Take ownership of the repaired conditions.
    pub fn take_recovered(&mut self) -> Vec<LayoutError> {
        std::mem::take(&mut self.recovered)
    }

    /// Find the arena index of a host node.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }
}

/// Walk state shared across the traversal.
struct Walk<'a, S: TreeSource + ?Sized> {
    source: &'a S,
    min_node_size: f32,
    nodes: Vec<TreeNode>,
    visited: HashSet<NodeId>,
    on_path: HashSet<NodeId>,
    recovered: Vec<LayoutError>,
}

/// A node on the current DFS path and the children it has yet to visit.
struct Frame {
    index: usize,
    id: NodeId,
    level: u32,
    candidates: std::vec::IntoIter<(EdgeRecord, NodeRecord)>,
}

/// Snapshot the tree hanging off `root`.
///
/// Children are discovered in `(order key, edge id)` order so the result
/// never depends on the source's iteration order.
pub fn extract<S: TreeSource + ?Sized>(
    source: &S,
    root: NodeId,
    min_node_size: f32,
) -> Result<LayoutTree, LayoutError> {
    let record = source.node(root).ok_or(LayoutError::UnknownRoot(root))?;

    let mut walk = Walk {
        source,
        min_node_size,
        nodes: Vec::new(),
        visited: HashSet::new(),
        on_path: HashSet::new(),
        recovered: Vec::new(),
    };
    walk.run(record);

    debug!(
        nodes = walk.nodes.len(),
        recovered = walk.recovered.len(),
        "Extracted tree"
    );

    Ok(LayoutTree {
        nodes: walk.nodes,
        root_position: Point::new(record.x, record.y),
        recovered: walk.recovered,
    })
}

impl<S: TreeSource + ?Sized> Walk<'_, S> {
    /// Depth-first walk with an explicit stack, so chain depth is bounded
    /// only by memory. Nodes are numbered in pre-order.
    fn run(&mut self, root: NodeRecord) {
        let mut stack = vec![self.enter(root, None, None, 0)];

        while let Some(frame) = stack.last_mut() {
            let Some((edge, target)) = frame.candidates.next() else {
                let id = frame.id;
                stack.pop();
                self.on_path.remove(&id);
                continue;
            };
            let (parent_index, parent_id, level) = (frame.index, frame.id, frame.level);

            if self.on_path.contains(&target.id) {
                warn!(edge = %edge.id, parent = %parent_id, child = %target.id, "Skipping edge that closes a cycle");
                self.recovered.push(LayoutError::CycleDetected {
                    edge: edge.id,
                    parent: parent_id,
                    child: target.id,
                });
                continue;
            }
            if self.visited.contains(&target.id) {
                warn!(edge = %edge.id, parent = %parent_id, child = %target.id, "Skipping edge to a node placed under another parent");
                self.recovered.push(LayoutError::SharedChild {
                    edge: edge.id,
                    parent: parent_id,
                    child: target.id,
                });
                continue;
            }

            let child = self.enter(target, Some(parent_index), Some(edge.id), level + 1);
            self.nodes[parent_index].children.push(child.index);
            stack.push(child);
        }
    }

    /// Add `record` to the arena and collect its candidate children.
    fn enter(
        &mut self,
        record: NodeRecord,
        parent: Option<usize>,
        edge: Option<EdgeId>,
        level: u32,
    ) -> Frame {
        let raw = Size::new(record.width, record.height);
        if raw.is_degenerate() {
            warn!(node = %record.id, width = record.width, height = record.height, "Clamping degenerate node size");
            self.recovered.push(LayoutError::DegenerateSize {
                node: record.id,
                width: record.width,
                height: record.height,
            });
        }

        let index = self.nodes.len();
        self.nodes.push(TreeNode {
            id: record.id,
            size: raw.clamped(self.min_node_size),
            level,
            order_key: record.order_key,
            collapsed: record.collapsed,
            pruned: false,
            parent,
            edge,
            children: Vec::new(),
            hidden_children: Vec::new(),
        });
        self.visited.insert(record.id);
        self.on_path.insert(record.id);

        let mut candidates: Vec<(EdgeRecord, NodeRecord)> = self
            .source
            .outgoing(record.id)
            .into_iter()
            .filter(|edge| edge.source == record.id)
            .filter_map(|edge| self.source.node(edge.target).map(|target| (edge, target)))
            .collect();
        candidates.sort_by_key(|(edge, target)| (target.order_key, edge.id));

        Frame {
            index,
            id: record.id,
            level,
            candidates: candidates.into_iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DiagramGraph;

    fn graph_with_nodes(count: usize) -> (DiagramGraph, Vec<NodeId>) {
        let mut graph = DiagramGraph::new();
        let ids = (0..count)
            .map(|_| graph.add_node(0.0, 0.0, 40.0, 20.0))
            .collect();
        (graph, ids)
    }

    #[test]
    fn test_unknown_root() {
        let graph = DiagramGraph::new();
        let result = extract(&graph, NodeId(3), 1.0);
        assert_eq!(result.unwrap_err(), LayoutError::UnknownRoot(NodeId(3)));
    }

    #[test]
    fn test_single_node() {
        let (graph, ids) = graph_with_nodes(1);
        let tree = extract(&graph, ids[0], 1.0).unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.node(LayoutTree::ROOT).level, 0);
        assert!(tree.node(LayoutTree::ROOT).children.is_empty());
    }

    #[test]
    fn test_levels_follow_depth() {
        let (mut graph, ids) = graph_with_nodes(4);
        graph.add_edge(ids[0], ids[1]);
        graph.add_edge(ids[1], ids[2]);
        graph.add_edge(ids[2], ids[3]);

        let tree = extract(&graph, ids[0], 1.0).unwrap();
        let levels: Vec<u32> = tree.nodes().iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_only_outgoing_edges_are_followed() {
        let (mut graph, ids) = graph_with_nodes(3);
        graph.add_edge(ids[0], ids[1]);
        // ids[2] points at the root; it is not part of the root's tree
        graph.add_edge(ids[2], ids[0]);

        let tree = extract(&graph, ids[0], 1.0).unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree.index_of(ids[2]).is_none());
    }

    #[test]
    fn test_children_sorted_by_order_key() {
        let (mut graph, ids) = graph_with_nodes(4);
        // Edges added newest-first
        graph.add_edge(ids[0], ids[3]);
        graph.add_edge(ids[0], ids[1]);
        graph.add_edge(ids[0], ids[2]);

        let tree = extract(&graph, ids[0], 1.0).unwrap();
        let children: Vec<NodeId> = tree
            .node(LayoutTree::ROOT)
            .children
            .iter()
            .map(|&c| tree.node(c).id)
            .collect();
        assert_eq!(children, vec![ids[1], ids[2], ids[3]]);
    }

    #[test]
    fn test_cycle_edge_is_skipped() {
        let (mut graph, ids) = graph_with_nodes(3);
        graph.add_edge(ids[0], ids[1]);
        graph.add_edge(ids[1], ids[2]);
        let back = graph.add_edge(ids[2], ids[0]).unwrap();

        let tree = extract(&graph, ids[0], 1.0).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(
            tree.recovered(),
            &[LayoutError::CycleDetected {
                edge: back,
                parent: ids[2],
                child: ids[0],
            }]
        );
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let (mut graph, ids) = graph_with_nodes(2);
        graph.add_edge(ids[0], ids[0]);
        graph.add_edge(ids[0], ids[1]);

        let tree = extract(&graph, ids[0], 1.0).unwrap();
        assert_eq!(tree.len(), 2);
        assert!(matches!(
            tree.recovered()[0],
            LayoutError::CycleDetected { .. }
        ));
    }

    #[test]
    fn test_shared_child_placed_once() {
        let (mut graph, ids) = graph_with_nodes(4);
        graph.add_edge(ids[0], ids[1]);
        graph.add_edge(ids[0], ids[2]);
        graph.add_edge(ids[1], ids[3]);
        graph.add_edge(ids[2], ids[3]);

        let tree = extract(&graph, ids[0], 1.0).unwrap();
        assert_eq!(tree.len(), 4);
        let shared = tree.index_of(ids[3]).unwrap();
        assert_eq!(tree.node(shared).parent, tree.index_of(ids[1]));
        assert!(matches!(
            tree.recovered()[0],
            LayoutError::SharedChild { .. }
        ));
    }

    #[test]
    fn test_degenerate_size_is_clamped() {
        let mut graph = DiagramGraph::new();
        let root = graph.add_node(0.0, 0.0, 0.0, -5.0);

        let tree = extract(&graph, root, 1.0).unwrap();
        assert_eq!(tree.node(LayoutTree::ROOT).size, Size::new(1.0, 1.0));
        assert!(matches!(
            tree.recovered()[0],
            LayoutError::DegenerateSize { .. }
        ));
    }

    #[test]
    fn test_child_indices_follow_parent() {
        let (mut graph, ids) = graph_with_nodes(6);
        graph.add_edge(ids[0], ids[1]);
        graph.add_edge(ids[0], ids[2]);
        graph.add_edge(ids[1], ids[3]);
        graph.add_edge(ids[2], ids[4]);
        graph.add_edge(ids[4], ids[5]);

        let tree = extract(&graph, ids[0], 1.0).unwrap();
        for (index, node) in tree.nodes().iter().enumerate() {
            for &child in &node.children {
                assert!(child > index);
                assert_eq!(tree.node(child).parent, Some(index));
            }
        }
    }

    #[test]
    fn test_deep_chain() {
        let (mut graph, ids) = graph_with_nodes(10_000);
        for pair in ids.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }

        let tree = extract(&graph, ids[0], 1.0).unwrap();
        assert_eq!(tree.len(), 10_000);
        assert_eq!(tree.node(9_999).level, 9_999);
        assert_eq!(tree.node(9_999).id, ids[9_999]);
        assert!(tree.recovered().is_empty());
    }

    #[test]
    fn test_siblings_numbered_after_earlier_subtrees() {
        let (mut graph, ids) = graph_with_nodes(4);
        graph.add_edge(ids[0], ids[1]);
        graph.add_edge(ids[0], ids[3]);
        graph.add_edge(ids[1], ids[2]);

        let tree = extract(&graph, ids[0], 1.0).unwrap();
        let order: Vec<NodeId> = tree.nodes().iter().map(|n| n.id).collect();
        assert_eq!(order, vec![ids[0], ids[1], ids[2], ids[3]]);
    }
}
