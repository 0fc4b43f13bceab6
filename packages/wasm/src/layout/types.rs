//! Request, configuration and geometry types shared by the layout passes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::LayoutError;
use crate::graph::NodeId;

/// A point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A box size in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether either side is non-positive or not finite.
    pub fn is_degenerate(self) -> bool {
        let usable = |v: f32| v.is_finite() && v > 0.0;
        !(usable(self.width) && usable(self.height))
    }

    /// Clamp each side to at least `min`. NaN and infinite sides become `min`.
    pub fn clamped(self, min: f32) -> Self {
        let clamp = |v: f32| if v.is_finite() && v >= min { v } else { min };
        Self {
            width: clamp(self.width),
            height: clamp(self.height),
        }
    }

    /// Half the box diagonal: the radius of the smallest circle around the box.
    pub fn half_diagonal(self) -> f32 {
        self.width.hypot(self.height) / 2.0
    }
}

/// The axis/shape along which a tree grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Children to the right of their parent.
    #[default]
    Right,
    /// Children to the left of their parent.
    Left,
    /// Root children split between right and left sides.
    Both,
    /// Children above their parent.
    Top,
    /// Children below their parent.
    Bottom,
    /// Children on concentric rings around the root.
    Radial,
}

impl FromStr for Direction {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "right" => Ok(Direction::Right),
            "left" => Ok(Direction::Left),
            "both" => Ok(Direction::Both),
            "top" => Ok(Direction::Top),
            "bottom" => Ok(Direction::Bottom),
            "radial" => Ok(Direction::Radial),
            _ => Err(LayoutError::unknown_variant("direction", s)),
        }
    }
}

/// Named spacing preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DensityMode {
    /// Tightest spacing.
    Compact,
    /// Default spacing.
    #[default]
    Standard,
    /// Loosest spacing.
    Spacious,
}

impl FromStr for DensityMode {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(DensityMode::Compact),
            "standard" => Ok(DensityMode::Standard),
            "spacious" => Ok(DensityMode::Spacious),
            _ => Err(LayoutError::unknown_variant("density mode", s)),
        }
    }
}

/// How siblings are ordered before placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Oldest node first.
    #[default]
    InsertionAscending,
    /// Newest node first.
    InsertionDescending,
    /// Oldest first, winding clockwise around the parent.
    AngularClockwise,
    /// Oldest first, winding counter-clockwise around the parent.
    AngularCounterClockwise,
}

impl FromStr for SortOrder {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "insertionascending" | "ascending" => Ok(SortOrder::InsertionAscending),
            "insertiondescending" | "descending" => Ok(SortOrder::InsertionDescending),
            "angularclockwise" | "clockwise" => Ok(SortOrder::AngularClockwise),
            "angularcounterclockwise" | "counterclockwise" => {
                Ok(SortOrder::AngularCounterClockwise)
            }
            _ => Err(LayoutError::unknown_variant("sort order", s)),
        }
    }
}

/// Gaps for one density mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spacing {
    /// Gap between adjacent sibling subtrees.
    pub sibling_gap: f32,
    /// Gap between a parent and its children along the growth axis.
    pub level_gap: f32,
}

impl Spacing {
    /// Create a new spacing pair.
    pub const fn new(sibling_gap: f32, level_gap: f32) -> Self {
        Self {
            sibling_gap,
            level_gap,
        }
    }
}

/// Tunable constants for the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Spacing for [`DensityMode::Compact`].
    pub compact: Spacing,
    /// Spacing for [`DensityMode::Standard`].
    pub standard: Spacing,
    /// Spacing for [`DensityMode::Spacious`].
    pub spacious: Spacing,
    /// Smallest side a node box is clamped to.
    pub min_node_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            compact: Spacing::new(12.0, 60.0),
            standard: Spacing::new(24.0, 100.0),
            spacious: Spacing::new(40.0, 160.0),
            min_node_size: 1.0,
        }
    }
}

impl LayoutConfig {
    /// Resolve a density mode to its gaps.
    pub fn spacing(&self, mode: DensityMode) -> Spacing {
        match mode {
            DensityMode::Compact => self.compact,
            DensityMode::Standard => self.standard,
            DensityMode::Spacious => self.spacious,
        }
    }

    /// Reject gaps that are negative or not finite, and a non-positive minimum size.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let presets = [
            ("compact", self.compact),
            ("standard", self.standard),
            ("spacious", self.spacious),
        ];
        for (name, spacing) in presets {
            for (gap_name, gap) in [
                ("siblingGap", spacing.sibling_gap),
                ("levelGap", spacing.level_gap),
            ] {
                if !gap.is_finite() || gap < 0.0 {
                    return Err(LayoutError::invalid_config(format!(
                        "{name}.{gap_name} must be a finite non-negative number, got {gap}"
                    )));
                }
            }
        }
        if !self.min_node_size.is_finite() || self.min_node_size <= 0.0 {
            return Err(LayoutError::invalid_config(format!(
                "minNodeSize must be positive, got {}",
                self.min_node_size
            )));
        }
        Ok(())
    }
}

/// One layout call's inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    /// The tree's root node.
    pub root: NodeId,
    /// Growth direction.
    #[serde(default)]
    pub direction: Direction,
    /// Spacing preset.
    #[serde(default)]
    pub mode: DensityMode,
    /// Sibling order.
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Root top-left override; the root's current position when absent.
    #[serde(default)]
    pub anchor: Option<Point>,
}

impl LayoutRequest {
    /// A request with default direction, mode and sort order.
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            direction: Direction::default(),
            mode: DensityMode::default(),
            sort_order: SortOrder::default(),
            anchor: None,
        }
    }

    /// Set the growth direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the spacing preset.
    pub fn with_mode(mut self, mode: DensityMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the sibling order.
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Pin the root's top-left corner.
    pub fn with_anchor(mut self, anchor: Point) -> Self {
        self.anchor = Some(anchor);
        self
    }
}
