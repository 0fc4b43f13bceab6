//! Subtree sizing (bottom-up).
//!
//! Axis directions reserve, for every visible node, the band its whole
//! subtree needs: the cross-axis extent is the children's stacked extents
//! plus sibling gaps (never less than the node itself), the growth-axis
//! extent is the node plus one level gap plus its deepest child.
//!
//! Radial sizing places each depth on a ring and measures subtrees as
//! angular spans on those rings. A node needs the angle its circumscribed
//! circle subtends at its ring radius plus a sibling gap's worth of arc.

use std::f32::consts::TAU;

use tracing::debug;

use super::extract::{LayoutTree, TreeNode};
use super::types::{Direction, Size, Spacing};

/// Which canvas axis a direction grows along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Growth along x, siblings stacked along y.
    Horizontal,
    /// Growth along y, siblings stacked along x.
    Vertical,
}

impl Axis {
    /// A box's length along the growth axis.
    pub fn main(self, size: Size) -> f32 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    /// A box's length along the stacking axis.
    pub fn cross(self, size: Size) -> f32 {
        match self {
            Axis::Horizontal => size.height,
            Axis::Vertical => size.width,
        }
    }
}

/// Space a subtree reserves in an axis layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisExtent {
    /// Extent along the growth axis.
    pub main: f32,
    /// Extent along the stacking axis.
    pub cross: f32,
}

impl AxisExtent {
    /// The extent as a canvas-space (width, height).
    pub fn to_size(self, axis: Axis) -> Size {
        match axis {
            Axis::Horizontal => Size::new(self.main, self.cross),
            Axis::Vertical => Size::new(self.cross, self.main),
        }
    }
}

/// Space a subtree reserves in a radial layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RadialExtent {
    /// Distance from the root's center to this node's center.
    pub radius: f32,
    /// Angle (radians) the node and its visible descendants need.
    pub angular_span: f32,
}

/// Per-node extent, indexed like the tree arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubtreeExtent {
    /// Axis directions (Right, Left, Top, Bottom, Both).
    Axis(AxisExtent),
    /// Radial direction.
    Radial(RadialExtent),
}

/// Result of a sizing pass.
#[derive(Debug, Clone)]
pub enum SubtreeSizes {
    /// Extents for an axis layout.
    Axis {
        /// Growth axis the extents were measured along.
        axis: Axis,
        /// One extent per arena index.
        extents: Vec<AxisExtent>,
    },
    /// Rings and spans for a radial layout.
    Radial(RadialSizes),
}

impl SubtreeSizes {
    /// The extent of one arena node.
    pub fn extent(&self, index: usize) -> SubtreeExtent {
        match self {
            SubtreeSizes::Axis { extents, .. } => SubtreeExtent::Axis(extents[index]),
            SubtreeSizes::Radial(radial) => SubtreeExtent::Radial(radial.extents[index]),
        }
    }
}

/// Ring radii and spans for a radial layout.
#[derive(Debug, Clone)]
pub struct RadialSizes {
    /// Ring radius per depth (depth 0 = 0).
    pub ring_radii: Vec<f32>,
    /// One extent per arena index.
    pub extents: Vec<RadialExtent>,
}

/// Size every visible subtree for `direction`.
pub fn size(tree: &LayoutTree, direction: Direction, spacing: Spacing) -> SubtreeSizes {
    let sizes = match direction {
        Direction::Right | Direction::Left | Direction::Both => SubtreeSizes::Axis {
            axis: Axis::Horizontal,
            extents: size_axis(tree, Axis::Horizontal, spacing),
        },
        Direction::Top | Direction::Bottom => SubtreeSizes::Axis {
            axis: Axis::Vertical,
            extents: size_axis(tree, Axis::Vertical, spacing),
        },
        Direction::Radial => SubtreeSizes::Radial(size_radial(tree, spacing)),
    };
    debug!(?direction, root = ?sizes.extent(LayoutTree::ROOT), "Sized subtrees");
    sizes
}

/// Axis extents, bottom-up.
pub fn size_axis(tree: &LayoutTree, axis: Axis, spacing: Spacing) -> Vec<AxisExtent> {
    let mut extents = vec![AxisExtent::default(); tree.len()];

    // Children always sit after their parent in the arena
    for index in (0..tree.len()).rev() {
        let node = tree.node(index);
        let own_main = axis.main(node.size);
        let own_cross = axis.cross(node.size);

        if node.children.is_empty() {
            extents[index] = AxisExtent {
                main: own_main,
                cross: own_cross,
            };
            continue;
        }

        let stacked = stacked_cross(&node.children, &extents, spacing.sibling_gap);
        let deepest = node
            .children
            .iter()
            .map(|&child| extents[child].main)
            .fold(0.0, f32::max);

        extents[index] = AxisExtent {
            main: own_main + spacing.level_gap + deepest,
            cross: own_cross.max(stacked),
        };
    }

    extents
}

/// Cross-axis length of `children` stacked with `gap` between neighbours.
pub fn stacked_cross(children: &[usize], extents: &[AxisExtent], gap: f32) -> f32 {
    if children.is_empty() {
        return 0.0;
    }
    let total: f32 = children.iter().map(|&child| extents[child].cross).sum();
    total + gap * (children.len() - 1) as f32
}

/// Ring radii and angular spans.
///
/// When the root's children need more than a full turn, every ring is pushed
/// outward by the shortfall ratio and spans are measured again.
pub fn size_radial(tree: &LayoutTree, spacing: Spacing) -> RadialSizes {
    let max_radius = level_max_radii(tree);
    let mut ring_radii = ring_radii(&max_radius, spacing.level_gap);

    let mut extents = radial_extents(tree, &ring_radii, spacing.sibling_gap);
    for _ in 0..4 {
        let total = root_children_span(tree, &extents);
        if total <= TAU {
            break;
        }
        let scale = total / TAU;
        for radius in ring_radii.iter_mut() {
            *radius *= scale;
        }
        extents = radial_extents(tree, &ring_radii, spacing.sibling_gap);
    }

    RadialSizes { ring_radii, extents }
}

/// Largest circumscribed radius among visible nodes at each depth.
fn level_max_radii(tree: &LayoutTree) -> Vec<f32> {
    let mut max_radius: Vec<f32> = Vec::new();
    for node in tree.nodes().iter().filter(|node| !node.pruned) {
        let level = node.level as usize;
        if level >= max_radius.len() {
            max_radius.resize(level + 1, 0.0);
        }
        max_radius[level] = max_radius[level].max(node.size.half_diagonal());
    }
    max_radius
}

fn ring_radii(max_radius: &[f32], level_gap: f32) -> Vec<f32> {
    let mut radii = vec![0.0; max_radius.len()];
    for level in 1..max_radius.len() {
        // The root is not on a ring; its circle starts at the center
        let inner = if level == 1 {
            max_radius[0]
        } else {
            radii[level - 1] + max_radius[level - 1]
        };
        radii[level] = inner + level_gap + max_radius[level];
    }
    radii
}

fn own_span(node: &TreeNode, radius: f32, sibling_gap: f32) -> f32 {
    let ratio = (node.size.half_diagonal() / radius).min(1.0);
    2.0 * ratio.asin() + sibling_gap / radius
}

fn radial_extents(tree: &LayoutTree, ring_radii: &[f32], sibling_gap: f32) -> Vec<RadialExtent> {
    let mut extents = vec![RadialExtent::default(); tree.len()];

    for index in (0..tree.len()).rev() {
        let node = tree.node(index);
        if node.pruned {
            continue;
        }
        if node.level == 0 {
            extents[index] = RadialExtent {
                radius: 0.0,
                angular_span: TAU,
            };
            continue;
        }

        let radius = ring_radii[node.level as usize];
        let own = own_span(node, radius, sibling_gap);
        let children: f32 = node
            .children
            .iter()
            .map(|&child| extents[child].angular_span)
            .sum();

        extents[index] = RadialExtent {
            radius,
            angular_span: own.max(children),
        };
    }

    extents
}

fn root_children_span(tree: &LayoutTree, extents: &[RadialExtent]) -> f32 {
    tree.node(LayoutTree::ROOT)
        .children
        .iter()
        .map(|&child| extents[child].angular_span)
        .sum()
}
