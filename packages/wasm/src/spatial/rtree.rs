//! R-tree of placed node boxes using the rstar crate.
//!
//! Provides O(log n) queries for:
//! - Rectangle intersection
//! - Overlapping box pairs

use rstar::{AABB, RTree, RTreeObject};

use crate::graph::NodeId;
use crate::layout::PositionResult;

/// An axis-aligned node box in the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    /// The node identifier.
    pub id: NodeId,
    /// Top-left corner.
    pub min: [f32; 2],
    /// Bottom-right corner.
    pub max: [f32; 2],
}

impl NodeBox {
    /// Create a box from a top-left corner and a size.
    pub fn new(id: NodeId, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            min: [x, y],
            max: [x + width, y + height],
        }
    }

    /// Overlap depth along each axis; negative when apart.
    fn overlap(&self, other: &NodeBox) -> (f32, f32) {
        let dx = self.max[0].min(other.max[0]) - self.min[0].max(other.min[0]);
        let dy = self.max[1].min(other.max[1]) - self.min[1].max(other.min[1]);
        (dx, dy)
    }
}

impl RTreeObject for NodeBox {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Spatial index over laid-out node boxes.
///
/// Uses an R*-tree, bulk loaded from a [`PositionResult`].
pub struct BoxIndex {
    tree: RTree<NodeBox>,
}

impl BoxIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Index every placed box of a layout.
    pub fn from_positions(positions: &PositionResult) -> Self {
        let boxes: Vec<NodeBox> = positions
            .iter()
            .map(|(id, placement)| {
                NodeBox::new(
                    id,
                    placement.position.x,
                    placement.position.y,
                    placement.size.width,
                    placement.size.height,
                )
            })
            .collect();

        Self {
            tree: RTree::bulk_load(boxes),
        }
    }

    /// Insert a box.
    pub fn insert(&mut self, node_box: NodeBox) {
        self.tree.insert(node_box);
    }

    /// Find all boxes touching a rectangle.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<NodeId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut ids: Vec<NodeId> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|node_box| node_box.id)
            .collect();
        ids.sort();
        ids
    }

    /// Pairs of boxes that overlap by more than `tolerance` on both axes.
    ///
    /// Boxes that only touch (or overlap less than the tolerance) are not
    /// reported. Each pair is listed once, lower id first, sorted.
    pub fn overlapping_pairs(&self, tolerance: f32) -> Vec<(NodeId, NodeId)> {
        let mut pairs = Vec::new();
        for node_box in self.tree.iter() {
            for other in self.tree.locate_in_envelope_intersecting(&node_box.envelope()) {
                if other.id <= node_box.id {
                    continue;
                }
                let (dx, dy) = node_box.overlap(other);
                if dx > tolerance && dy > tolerance {
                    pairs.push((node_box.id, other.id));
                }
            }
        }
        pairs.sort();
        pairs
    }

    /// Clear all boxes from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Get the number of boxes in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for BoxIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(boxes: &[(u32, f32, f32, f32, f32)]) -> BoxIndex {
        let mut index = BoxIndex::new();
        for &(id, x, y, w, h) in boxes {
            index.insert(NodeBox::new(NodeId(id), x, y, w, h));
        }
        index
    }

    #[test]
    fn test_in_rect() {
        let index = index(&[
            (0, 0.0, 0.0, 10.0, 10.0),
            (1, 20.0, 0.0, 10.0, 10.0),
            (2, 100.0, 100.0, 10.0, 10.0),
        ]);

        assert_eq!(index.in_rect(5.0, 5.0, 25.0, 6.0), vec![NodeId(0), NodeId(1)]);
        assert!(index.in_rect(50.0, 50.0, 60.0, 60.0).is_empty());
    }

    #[test]
    fn test_overlapping_pairs() {
        let index = index(&[
            (0, 0.0, 0.0, 10.0, 10.0),
            (1, 5.0, 5.0, 10.0, 10.0),
            (2, 100.0, 0.0, 10.0, 10.0),
        ]);

        assert_eq!(index.overlapping_pairs(0.01), vec![(NodeId(0), NodeId(1))]);
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let index = index(&[(0, 0.0, 0.0, 10.0, 10.0), (1, 10.0, 0.0, 10.0, 10.0)]);

        assert!(index.overlapping_pairs(0.01).is_empty());
    }

    #[test]
    fn test_nested_box_overlaps() {
        let index = index(&[(3, 0.0, 0.0, 100.0, 100.0), (1, 10.0, 10.0, 5.0, 5.0)]);

        assert_eq!(index.overlapping_pairs(0.01), vec![(NodeId(1), NodeId(3))]);
    }

    #[test]
    fn test_clear() {
        let mut index = index(&[(0, 0.0, 0.0, 1.0, 1.0)]);
        assert_eq!(index.len(), 1);

        index.clear();
        assert!(index.is_empty());
    }
}
