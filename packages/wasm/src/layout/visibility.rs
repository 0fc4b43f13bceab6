//! Collapsed-branch visibility.
//!
//! A collapsed node keeps its own slot in the layout, but everything below
//! it is pruned: removed from the child lists the sizer and assigner walk,
//! and reported so the writer can hide the nodes and their edges. Nothing is
//! deleted from the host graph.

use tracing::debug;

use super::extract::LayoutTree;
use crate::graph::{EdgeId, NodeId};

/// Which tree nodes and edges are shown after a visibility pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityReport {
    /// Nodes that take part in layout.
    pub visible_nodes: Vec<NodeId>,
    /// Nodes below a collapsed ancestor.
    pub pruned_nodes: Vec<NodeId>,
    /// Tree edges between visible nodes.
    pub visible_edges: Vec<EdgeId>,
    /// Tree edges leading into a pruned node.
    pub hidden_edges: Vec<EdgeId>,
}

/// Mark every descendant of a collapsed node as pruned.
///
/// Pruned children move from `children` to `hidden_children`, so later
/// passes see collapsed nodes as leaves.
pub fn mark_visibility(tree: &mut LayoutTree) -> VisibilityReport {
    let mut report = VisibilityReport::default();
    let mut stack = vec![(LayoutTree::ROOT, false)];

    while let Some((index, pruned)) = stack.pop() {
        let node = tree.node_mut(index);
        node.pruned = pruned;

        if pruned {
            report.pruned_nodes.push(node.id);
            report.hidden_edges.extend(node.edge);
            // Push in reverse so the stack pops in child order
            for &child in node.children.iter().chain(&node.hidden_children).rev() {
                stack.push((child, true));
            }
            continue;
        }

        report.visible_nodes.push(node.id);
        report.visible_edges.extend(node.edge);

        if node.collapsed && !node.children.is_empty() {
            let hidden = std::mem::take(&mut node.children);
            for &child in hidden.iter().rev() {
                stack.push((child, true));
            }
            node.hidden_children = hidden;
        } else {
            for &child in node.children.iter().rev() {
                stack.push((child, false));
            }
        }
    }

    debug!(
        visible = report.visible_nodes.len(),
        pruned = report.pruned_nodes.len(),
        "Marked visibility"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DiagramGraph;
    use crate::layout::extract::extract;

    /// root → a → (a1, a2 → a21), root → b
    fn sample() -> (DiagramGraph, Vec<NodeId>) {
        let mut graph = DiagramGraph::new();
        let ids: Vec<NodeId> = (0..6)
            .map(|_| graph.add_node(0.0, 0.0, 40.0, 20.0))
            .collect();
        graph.add_edge(ids[0], ids[1]);
        graph.add_edge(ids[1], ids[2]);
        graph.add_edge(ids[1], ids[3]);
        graph.add_edge(ids[3], ids[4]);
        graph.add_edge(ids[0], ids[5]);
        (graph, ids)
    }

    #[test]
    fn test_nothing_collapsed() {
        let (graph, ids) = sample();
        let mut tree = extract(&graph, ids[0], 1.0).unwrap();
        let report = mark_visibility(&mut tree);

        assert_eq!(report.visible_nodes, ids);
        assert!(report.pruned_nodes.is_empty());
        assert_eq!(report.visible_edges.len(), 5);
        assert!(report.hidden_edges.is_empty());
    }

    #[test]
    fn test_collapsed_branch_is_pruned() {
        let (mut graph, ids) = sample();
        graph.set_collapsed(ids[1], true);
        let mut tree = extract(&graph, ids[0], 1.0).unwrap();
        let report = mark_visibility(&mut tree);

        assert_eq!(report.visible_nodes, vec![ids[0], ids[1], ids[5]]);
        assert_eq!(report.pruned_nodes, vec![ids[2], ids[3], ids[4]]);
        assert_eq!(report.hidden_edges.len(), 3);
        assert_eq!(report.visible_edges.len(), 2);

        let a = tree.index_of(ids[1]).unwrap();
        assert!(tree.node(a).children.is_empty());
        assert_eq!(tree.node(a).hidden_children.len(), 2);
        assert!(!tree.node(a).pruned);
    }

    #[test]
    fn test_collapsed_leaf_changes_nothing() {
        let (mut graph, ids) = sample();
        graph.set_collapsed(ids[5], true);
        let mut tree = extract(&graph, ids[0], 1.0).unwrap();
        let report = mark_visibility(&mut tree);

        assert_eq!(report.visible_nodes.len(), 6);
        assert!(report.pruned_nodes.is_empty());
    }

    #[test]
    fn test_collapsed_root_keeps_only_root() {
        let (mut graph, ids) = sample();
        graph.set_collapsed(ids[0], true);
        let mut tree = extract(&graph, ids[0], 1.0).unwrap();
        let report = mark_visibility(&mut tree);

        assert_eq!(report.visible_nodes, vec![ids[0]]);
        assert_eq!(report.pruned_nodes.len(), 5);
        assert_eq!(report.hidden_edges.len(), 5);
    }
}
