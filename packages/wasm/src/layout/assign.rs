//! Coordinate assignment (top-down).
//!
//! Turns subtree extents into top-left positions, starting from the root's
//! anchor. Every direction is handled by exhaustive dispatch on
//! [`Direction`]:
//!
//! - **Right / Left / Top / Bottom**: each child is centered in its reserved
//!   band on the stacking axis, and the stack of bands is centered on the
//!   parent's center line. Children sit one level gap past the parent's far
//!   edge along the growth axis.
//! - **Both**: the root's children are split, first half to the right and
//!   the rest to the left; each side is then an independent Right or Left
//!   layout.
//! - **Radial**: slices of the circle proportional to angular span, the
//!   first child's slice centered on angle 0; children of deeper nodes split
//!   their parent's slice the same way.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace};

use super::extract::LayoutTree;
use super::order::{Winding, order_children};
use super::sizer::{Axis, AxisExtent, RadialSizes, SubtreeSizes, stacked_cross};
use super::types::{Direction, Point, Size, SortOrder, Spacing};
use crate::graph::NodeId;

/// Which side of the root a node was placed on in a Both layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    /// Right of the root.
    Right,
    /// Left of the root.
    Left,
}

/// One placed node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Top-left corner.
    pub position: Point,
    /// Box size used for placement.
    pub size: Size,
    /// Both-layout side; None for the root and other directions.
    pub side: Option<Side>,
}

/// Final positions of every visible node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionResult {
    placements: BTreeMap<NodeId, Placement>,
}

impl PositionResult {
    /// Top-left position of a node, if it was placed.
    pub fn get(&self, id: NodeId) -> Option<Point> {
        self.placements.get(&id).map(|p| p.position)
    }

    /// Full placement of a node.
    pub fn placement(&self, id: NodeId) -> Option<&Placement> {
        self.placements.get(&id)
    }

    /// Both-layout side of a node.
    pub fn side(&self, id: NodeId) -> Option<Side> {
        self.placements.get(&id).and_then(|p| p.side)
    }

    /// Placed nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Placement)> {
        self.placements.iter().map(|(&id, placement)| (id, placement))
    }

    /// Number of placed nodes.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Bounding box (min_x, min_y, max_x, max_y) of all placed boxes.
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        self.placements.values().fold(None, |acc, p| {
            let (x0, y0) = (p.position.x, p.position.y);
            let (x1, y1) = (x0 + p.size.width, y0 + p.size.height);
            Some(match acc {
                None => (x0, y0, x1, y1),
                Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
            })
        })
    }

    fn insert(&mut self, id: NodeId, position: Point, size: Size, side: Option<Side>) {
        trace!(node = %id, x = position.x, y = position.y, "Placed node");
        self.placements.insert(
            id,
            Placement {
                position,
                size,
                side,
            },
        );
    }
}

/// Growth sense along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Growth {
    Forward,
    Backward,
}

/// Stacking sense along the cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stacking {
    Increasing,
    Decreasing,
}

/// An axis direction's frame.
#[derive(Debug, Clone, Copy)]
struct Frame {
    axis: Axis,
    growth: Growth,
    side: Option<Side>,
}

impl Frame {
    /// Both uses the right-hand frame; Radial never reaches an axis frame.
    fn of(direction: Direction, side: Option<Side>) -> Self {
        let (axis, growth) = match direction {
            Direction::Right | Direction::Both => (Axis::Horizontal, Growth::Forward),
            Direction::Left => (Axis::Horizontal, Growth::Backward),
            Direction::Bottom | Direction::Radial => (Axis::Vertical, Growth::Forward),
            Direction::Top => (Axis::Vertical, Growth::Backward),
        };
        Self { axis, growth, side }
    }

    /// Stacking that reads as clockwise around the parent on a y-down canvas.
    fn clockwise(self) -> Stacking {
        match (self.axis, self.growth) {
            (Axis::Horizontal, Growth::Forward) => Stacking::Increasing,
            (Axis::Horizontal, Growth::Backward) => Stacking::Decreasing,
            (Axis::Vertical, Growth::Forward) => Stacking::Decreasing,
            (Axis::Vertical, Growth::Backward) => Stacking::Increasing,
        }
    }

    fn stacking(self, sort_order: SortOrder) -> Stacking {
        match sort_order.winding() {
            None => Stacking::Increasing,
            Some(Winding::Clockwise) => self.clockwise(),
            Some(Winding::CounterClockwise) => match self.clockwise() {
                Stacking::Increasing => Stacking::Decreasing,
                Stacking::Decreasing => Stacking::Increasing,
            },
        }
    }

    /// Canvas top-left from (growth-axis start, cross-axis start).
    fn to_point(self, main: f32, cross: f32) -> Point {
        match self.axis {
            Axis::Horizontal => Point::new(main, cross),
            Axis::Vertical => Point::new(cross, main),
        }
    }

    /// Growth-axis start of a child box of length `child_len`.
    fn child_main(self, parent_main: f32, parent_len: f32, child_len: f32, gap: f32) -> f32 {
        match self.growth {
            Growth::Forward => parent_main + parent_len + gap,
            Growth::Backward => parent_main - gap - child_len,
        }
    }
}

/// Shared inputs of the axis placement.
struct AxisPass<'a> {
    tree: &'a LayoutTree,
    extents: &'a [AxisExtent],
    spacing: Spacing,
    sort_order: SortOrder,
}

/// A node waiting to be placed: growth-axis start and stacking-axis center.
struct Pending {
    index: usize,
    frame: Frame,
    main: f32,
    center: f32,
}

/// Assign a position to every visible node.
pub fn assign(
    tree: &LayoutTree,
    sizes: &SubtreeSizes,
    direction: Direction,
    sort_order: SortOrder,
    spacing: Spacing,
    anchor: Point,
) -> PositionResult {
    let mut result = PositionResult::default();

    match (direction, sizes) {
        (Direction::Radial, SubtreeSizes::Radial(radial)) => {
            assign_radial(tree, radial, sort_order, anchor, &mut result);
        }
        (
            Direction::Right | Direction::Left | Direction::Top | Direction::Bottom,
            SubtreeSizes::Axis { extents, .. },
        ) => {
            let pass = AxisPass {
                tree,
                extents,
                spacing,
                sort_order,
            };
            let frame = Frame::of(direction, None);
            let root = tree.node(LayoutTree::ROOT);
            let (main, cross) = match frame.axis {
                Axis::Horizontal => (anchor.x, anchor.y),
                Axis::Vertical => (anchor.y, anchor.x),
            };
            let center = cross + frame.axis.cross(root.size) / 2.0;
            pass.place(LayoutTree::ROOT, frame, main, center, &mut result);
        }
        (Direction::Both, SubtreeSizes::Axis { extents, .. }) => {
            let pass = AxisPass {
                tree,
                extents,
                spacing,
                sort_order,
            };
            assign_both(&pass, anchor, &mut result);
        }
        // Sizes measured for another direction: place the root alone
        _ => {
            let root = tree.node(LayoutTree::ROOT);
            result.insert(root.id, anchor, root.size, None);
        }
    }

    debug!(?direction, placed = result.len(), "Assigned coordinates");
    result
}

impl AxisPass<'_> {
    /// Place `index` with its growth-axis start at `main` and its center on
    /// the stacking axis at `center`, then everything below it.
    fn place(&self, index: usize, frame: Frame, main: f32, center: f32, out: &mut PositionResult) {
        let pending = vec![Pending {
            index,
            frame,
            main,
            center,
        }];
        self.drain(pending, out);
    }

    /// Place queued nodes until none are left, queueing their children.
    fn drain(&self, mut pending: Vec<Pending>, out: &mut PositionResult) {
        while let Some(Pending {
            index,
            frame,
            main,
            center,
        }) = pending.pop()
        {
            let node = self.tree.node(index);
            let cross = center - frame.axis.cross(node.size) / 2.0;
            out.insert(node.id, frame.to_point(main, cross), node.size, frame.side);

            let children = order_children(self.tree, &node.children, self.sort_order);
            let parent_len = frame.axis.main(node.size);
            self.stack(&children, frame, main, parent_len, center, &mut pending);
        }
    }

    /// Queue `children` in bands centered on `center`, one level past the parent.
    fn stack(
        &self,
        children: &[usize],
        frame: Frame,
        parent_main: f32,
        parent_len: f32,
        center: f32,
        pending: &mut Vec<Pending>,
    ) {
        if children.is_empty() {
            return;
        }
        let gap = self.spacing.sibling_gap;
        let total = stacked_cross(children, self.extents, gap);

        let mut bands: Vec<usize> = children.to_vec();
        if frame.stacking(self.sort_order) == Stacking::Decreasing {
            bands.reverse();
        }

        let mut cursor = center - total / 2.0;
        for child in bands {
            let band = self.extents[child].cross;
            let child_len = frame.axis.main(self.tree.node(child).size);
            pending.push(Pending {
                index: child,
                frame,
                main: frame.child_main(parent_main, parent_len, child_len, self.spacing.level_gap),
                center: cursor + band / 2.0,
            });
            cursor += band + gap;
        }
    }
}

/// Split the root's children between a Right and a Left side.
///
/// The first `ceil(n / 2)` children in sort order go right.
fn assign_both(pass: &AxisPass<'_>, anchor: Point, out: &mut PositionResult) {
    let root = pass.tree.node(LayoutTree::ROOT);
    out.insert(root.id, anchor, root.size, None);

    let ordered = order_children(pass.tree, &root.children, pass.sort_order);
    let (right, left) = ordered.split_at(ordered.len().div_ceil(2));
    let center = anchor.y + root.size.height / 2.0;

    let mut pending = Vec::new();
    let right_frame = Frame::of(Direction::Right, Some(Side::Right));
    pass.stack(right, right_frame, anchor.x, root.size.width, center, &mut pending);

    let left_frame = Frame::of(Direction::Left, Some(Side::Left));
    pass.stack(left, left_frame, anchor.x, root.size.width, center, &mut pending);

    pass.drain(pending, out);
}

/// Place nodes on rings around the root's center.
fn assign_radial(
    tree: &LayoutTree,
    radial: &RadialSizes,
    sort_order: SortOrder,
    anchor: Point,
    out: &mut PositionResult,
) {
    let root = tree.node(LayoutTree::ROOT);
    out.insert(root.id, anchor, root.size, None);

    let origin = Point::new(
        anchor.x + root.size.width / 2.0,
        anchor.y + root.size.height / 2.0,
    );
    let sense = match sort_order.winding() {
        Some(Winding::CounterClockwise) => -1.0,
        _ => 1.0,
    };

    let children = order_children(tree, &root.children, sort_order);
    let Some(&first) = children.first() else {
        return;
    };
    let total: f32 = children.iter().map(|&c| radial.extents[c].angular_span).sum();
    let scale = std::f32::consts::TAU / total;
    let first_slice = radial.extents[first].angular_span * scale;

    let pass = RadialPass {
        tree,
        radial,
        sort_order,
        sense,
        origin,
    };
    // Start half a slice back so the first child's slice is centered on angle 0
    pass.place(children, -sense * first_slice / 2.0, scale, out);
}

/// Shared inputs of the radial placement.
struct RadialPass<'a> {
    tree: &'a LayoutTree,
    radial: &'a RadialSizes,
    sort_order: SortOrder,
    sense: f32,
    origin: Point,
}

impl RadialPass<'_> {
    /// Lay `children` out along an arc starting at angle `start`, each
    /// taking `span * scale` radians, then do the same for every sibling
    /// group below them inside its parent's slice.
    fn place(&self, children: Vec<usize>, start: f32, scale: f32, out: &mut PositionResult) {
        let mut pending = vec![(children, start, scale)];

        while let Some((children, start, scale)) = pending.pop() {
            let mut cursor = start;
            for child in children {
                let extent = self.radial.extents[child];
                let slice = extent.angular_span * scale;
                let mid = cursor + self.sense * slice / 2.0;

                let node = self.tree.node(child);
                let center_x = self.origin.x + extent.radius * mid.cos();
                let center_y = self.origin.y + extent.radius * mid.sin();
                let position = Point::new(
                    center_x - node.size.width / 2.0,
                    center_y - node.size.height / 2.0,
                );
                out.insert(node.id, position, node.size, None);

                // Grandchildren fill this child's slice proportionally
                let grandchildren = order_children(self.tree, &node.children, self.sort_order);
                let inner: f32 = grandchildren
                    .iter()
                    .map(|&g| self.radial.extents[g].angular_span)
                    .sum();
                if inner > 0.0 {
                    pending.push((grandchildren, mid - self.sense * slice / 2.0, slice / inner));
                }

                cursor += self.sense * slice;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DiagramGraph;
    use crate::layout::extract::extract;
    use crate::layout::sizer::size;
    use crate::layout::visibility::mark_visibility;

    const STANDARD: Spacing = Spacing::new(24.0, 100.0);

    fn star(count: usize) -> (DiagramGraph, NodeId, Vec<NodeId>) {
        let mut graph = DiagramGraph::new();
        let root = graph.add_node(0.0, 0.0, 160.0, 80.0);
        let children = (0..count)
            .map(|_| {
                let id = graph.add_node(0.0, 0.0, 120.0, 40.0);
                graph.add_edge(root, id);
                id
            })
            .collect();
        (graph, root, children)
    }

    fn run(graph: &DiagramGraph, root: NodeId, direction: Direction, sort_order: SortOrder) -> PositionResult {
        let mut tree = extract(graph, root, 1.0).unwrap();
        mark_visibility(&mut tree);
        let sizes = size(&tree, direction, STANDARD);
        assign(&tree, &sizes, direction, sort_order, STANDARD, Point::default())
    }

    #[test]
    fn test_root_alone() {
        let (graph, root, _) = star(0);
        let result = run(&graph, root, Direction::Right, SortOrder::InsertionAscending);

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(root), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_right_three_children() {
        let (graph, root, children) = star(3);
        let result = run(&graph, root, Direction::Right, SortOrder::InsertionAscending);

        let ys: Vec<f32> = children.iter().map(|&c| result.get(c).unwrap().y).collect();
        for &c in &children {
            assert_eq!(result.get(c).unwrap().x, 260.0);
        }
        // Stack of 168 centered on the root's center line (y = 40)
        assert_eq!(ys, vec![-44.0, 20.0, 84.0]);
    }

    #[test]
    fn test_single_child_on_center_line() {
        let (graph, root, children) = star(1);
        let result = run(&graph, root, Direction::Right, SortOrder::InsertionAscending);

        assert_eq!(result.get(children[0]), Some(Point::new(260.0, 20.0)));
    }

    #[test]
    fn test_left_mirrors_right() {
        let (graph, root, children) = star(2);
        let right = run(&graph, root, Direction::Right, SortOrder::InsertionAscending);
        let left = run(&graph, root, Direction::Left, SortOrder::InsertionAscending);

        for &c in &children {
            let r = right.get(c).unwrap();
            let l = left.get(c).unwrap();
            assert_eq!(l.y, r.y);
            // Right edge of the child one level gap before the root's left edge
            assert_eq!(l.x + 120.0, -100.0);
        }
    }

    #[test]
    fn test_bottom_and_top() {
        let (graph, root, children) = star(2);
        let bottom = run(&graph, root, Direction::Bottom, SortOrder::InsertionAscending);
        let top = run(&graph, root, Direction::Top, SortOrder::InsertionAscending);

        let b0 = bottom.get(children[0]).unwrap();
        let b1 = bottom.get(children[1]).unwrap();
        assert_eq!(b0.y, 180.0);
        assert!(b0.x < b1.x);
        // Centered on the root's center column (x = 80)
        assert_eq!((b0.x + b1.x + 120.0) / 2.0, 80.0);

        let t0 = top.get(children[0]).unwrap();
        assert_eq!(t0.y + 40.0, -100.0);
        assert_eq!(t0.x, b0.x);
    }

    #[test]
    fn test_descending_reverses_stack() {
        let (graph, root, children) = star(3);
        let result = run(&graph, root, Direction::Right, SortOrder::InsertionDescending);

        let ys: Vec<f32> = children.iter().map(|&c| result.get(c).unwrap().y).collect();
        assert!(ys[0] > ys[1] && ys[1] > ys[2]);
    }

    #[test]
    fn test_clockwise_on_left_stacks_upward() {
        let (graph, root, children) = star(2);
        let result = run(&graph, root, Direction::Left, SortOrder::AngularClockwise);

        assert!(result.get(children[0]).unwrap().y > result.get(children[1]).unwrap().y);
    }

    #[test]
    fn test_both_splits_root_children() {
        let (graph, root, children) = star(5);
        let result = run(&graph, root, Direction::Both, SortOrder::InsertionAscending);

        for &c in &children[..3] {
            assert_eq!(result.side(c), Some(Side::Right));
            assert_eq!(result.get(c).unwrap().x, 260.0);
        }
        for &c in &children[3..] {
            assert_eq!(result.side(c), Some(Side::Left));
            assert_eq!(result.get(c).unwrap().x, -220.0);
        }
        assert_eq!(result.side(root), None);
    }

    #[test]
    fn test_both_grandchildren_stay_on_side() {
        let (mut graph, root, children) = star(2);
        let grandchild = graph.add_node(0.0, 0.0, 50.0, 20.0);
        graph.add_edge(children[1], grandchild);
        let result = run(&graph, root, Direction::Both, SortOrder::InsertionAscending);

        assert_eq!(result.side(grandchild), Some(Side::Left));
        assert_eq!(result.get(grandchild).unwrap().x, -220.0 - 100.0 - 50.0);
    }

    #[test]
    fn test_radial_first_child_at_angle_zero() {
        let (graph, root, children) = star(4);
        let result = run(&graph, root, Direction::Radial, SortOrder::AngularClockwise);

        let center = |id: NodeId| {
            let p = result.placement(id).unwrap();
            (
                p.position.x + p.size.width / 2.0 - 80.0,
                p.position.y + p.size.height / 2.0 - 40.0,
            )
        };
        let (x0, y0) = center(children[0]);
        assert!(x0 > 0.0);
        assert!(y0.abs() < 1e-3);

        // Clockwise on a y-down canvas: the second child is below the first
        let (_, y1) = center(children[1]);
        assert!(y1 > 0.0);
    }

    #[test]
    fn test_radial_counter_clockwise_mirrors() {
        let (graph, root, children) = star(4);
        let cw = run(&graph, root, Direction::Radial, SortOrder::AngularClockwise);
        let ccw = run(&graph, root, Direction::Radial, SortOrder::AngularCounterClockwise);

        let a = cw.get(children[1]).unwrap();
        let b = ccw.get(children[1]).unwrap();
        assert!((a.x - b.x).abs() < 1e-3);
        // Mirrored about the root's center line (y = 40) for 40-tall boxes
        assert!(((a.y + 20.0) - 40.0 + (b.y + 20.0) - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_bounds() {
        let (graph, root, _) = star(3);
        let result = run(&graph, root, Direction::Right, SortOrder::InsertionAscending);

        assert_eq!(result.bounds(), Some((0.0, -44.0, 380.0, 124.0)));
    }

    #[test]
    fn test_deep_chain() {
        let mut graph = DiagramGraph::new();
        let ids: Vec<NodeId> = (0..10_000)
            .map(|_| graph.add_node(0.0, 0.0, 10.0, 10.0))
            .collect();
        for pair in ids.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }

        let right = run(&graph, ids[0], Direction::Right, SortOrder::InsertionAscending);
        assert_eq!(right.len(), 10_000);
        assert_eq!(right.get(ids[1]), Some(Point::new(110.0, 0.0)));
        assert_eq!(right.get(ids[9_999]), Some(Point::new(9_999.0 * 110.0, 0.0)));

        let radial = run(&graph, ids[0], Direction::Radial, SortOrder::AngularClockwise);
        assert_eq!(radial.len(), 10_000);
    }
}
