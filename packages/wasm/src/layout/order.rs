//! Sibling ordering.
//!
//! Separates "what order are siblings in" from "how are they placed": the
//! assigner asks for an ordered child list and a winding, and never sorts
//! on its own.

use super::extract::LayoutTree;
use super::types::SortOrder;

/// Rotational sense requested by an angular sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Visually clockwise on a y-down canvas (increasing angle).
    Clockwise,
    /// Visually counter-clockwise (decreasing angle).
    CounterClockwise,
}

impl SortOrder {
    /// The winding an angular order asks for; None for insertion orders.
    pub fn winding(self) -> Option<Winding> {
        match self {
            SortOrder::InsertionAscending | SortOrder::InsertionDescending => None,
            SortOrder::AngularClockwise => Some(Winding::Clockwise),
            SortOrder::AngularCounterClockwise => Some(Winding::CounterClockwise),
        }
    }
}

/// Order `children` (arena indices) for placement.
///
/// Sorting is by order key alone, with the host id as a tiebreak for
/// restored keys that collide. Angular orders use ascending keys; the
/// assigner applies their winding.
pub fn order_children(tree: &LayoutTree, children: &[usize], sort_order: SortOrder) -> Vec<usize> {
    let mut ordered = children.to_vec();
    ordered.sort_by_key(|&index| {
        let node = tree.node(index);
        (node.order_key, node.id)
    });
    if sort_order == SortOrder::InsertionDescending {
        ordered.reverse();
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DiagramGraph, NodeId, OrderKey};
    use crate::layout::extract::extract;

    fn tree_with_keys(keys: &[u64]) -> (LayoutTree, Vec<NodeId>) {
        let mut graph = DiagramGraph::new();
        let root = graph.add_node_with_order_key(0.0, 0.0, 10.0, 10.0, OrderKey(0));
        let children: Vec<NodeId> = keys
            .iter()
            .map(|&key| {
                let id = graph.add_node_with_order_key(0.0, 0.0, 10.0, 10.0, OrderKey(key));
                graph.add_edge(root, id);
                id
            })
            .collect();
        (extract(&graph, root, 1.0).unwrap(), children)
    }

    fn ids(tree: &LayoutTree, ordered: &[usize]) -> Vec<NodeId> {
        ordered.iter().map(|&i| tree.node(i).id).collect()
    }

    #[test]
    fn test_ascending_by_order_key() {
        let (tree, children) = tree_with_keys(&[30, 10, 20]);
        let root_children = tree.node(LayoutTree::ROOT).children.clone();

        let ordered = order_children(&tree, &root_children, SortOrder::InsertionAscending);
        assert_eq!(ids(&tree, &ordered), vec![children[1], children[2], children[0]]);
    }

    #[test]
    fn test_descending_reverses() {
        let (tree, children) = tree_with_keys(&[30, 10, 20]);
        let root_children = tree.node(LayoutTree::ROOT).children.clone();

        let ordered = order_children(&tree, &root_children, SortOrder::InsertionDescending);
        assert_eq!(ids(&tree, &ordered), vec![children[0], children[2], children[1]]);
    }

    #[test]
    fn test_angular_orders_share_ascending_keys() {
        let (tree, _) = tree_with_keys(&[3, 1, 2]);
        let root_children = tree.node(LayoutTree::ROOT).children.clone();

        let ascending = order_children(&tree, &root_children, SortOrder::InsertionAscending);
        let clockwise = order_children(&tree, &root_children, SortOrder::AngularClockwise);
        let counter = order_children(&tree, &root_children, SortOrder::AngularCounterClockwise);
        assert_eq!(ascending, clockwise);
        assert_eq!(ascending, counter);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let (tree, _) = tree_with_keys(&[5, 4, 3, 2, 1]);
        let mut shuffled = tree.node(LayoutTree::ROOT).children.clone();
        let sorted = order_children(&tree, &shuffled, SortOrder::InsertionAscending);
        shuffled.reverse();
        assert_eq!(order_children(&tree, &shuffled, SortOrder::InsertionAscending), sorted);
    }

    #[test]
    fn test_winding() {
        assert_eq!(SortOrder::InsertionAscending.winding(), None);
        assert_eq!(SortOrder::AngularClockwise.winding(), Some(Winding::Clockwise));
        assert_eq!(
            SortOrder::AngularCounterClockwise.winding(),
            Some(Winding::CounterClockwise)
        );
    }
}
