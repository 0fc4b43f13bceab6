//! Mindmap layout engine.
//!
//! One synchronous call turns a tree in the host graph into a position per
//! visible node. The call runs five passes over a snapshot of the tree:
//!
//! 1. [`extract`]: snapshot the tree reachable from the root
//! 2. [`visibility`]: prune everything below collapsed nodes
//! 3. [`sizer`]: measure every visible subtree bottom-up
//! 4. [`assign`]: place nodes top-down from the root's anchor
//! 5. [`writer`]: push positions and hidden flags back into the host
//!
//! Nothing survives between calls; sibling order comes from each node's
//! order key, which the host owns.

pub mod assign;
pub mod error;
pub mod extract;
pub mod order;
pub mod sizer;
pub mod types;
pub mod visibility;
pub mod writer;

pub use assign::{Placement, PositionResult, Side};
pub use error::LayoutError;
pub use extract::{EdgeRecord, LayoutTree, NodeRecord, TreeSource};
pub use types::{DensityMode, Direction, LayoutConfig, LayoutRequest, Point, Size, SortOrder, Spacing};
pub use visibility::VisibilityReport;
pub use writer::{PositionSink, WriteSummary};

use tracing::{Level, debug, info_span, warn};

use crate::graph::{EdgeId, NodeId};
use crate::spatial::BoxIndex;

/// Overlap depth below which two boxes count as touching.
const OVERLAP_TOLERANCE: f32 = 0.01;

/// What one layout call did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutReport {
    /// Number of nodes that received a position.
    pub laid_out: usize,
    /// Nodes below a collapsed ancestor.
    pub pruned: Vec<NodeId>,
    /// Tree edges leading into pruned nodes.
    pub hidden_edges: Vec<EdgeId>,
    /// Tree edges between laid-out nodes.
    pub visible_edges: Vec<EdgeId>,
    /// Conditions repaired during the call.
    pub recovered: Vec<LayoutError>,
    /// Positions the sink accepted.
    pub written: usize,
    /// Positions for ids the sink no longer knows.
    pub skipped: usize,
}

/// Positions plus the report of a compute-only call.
#[derive(Debug, Clone)]
pub struct LayoutOutcome {
    /// Top-left position of every visible node.
    pub positions: PositionResult,
    /// Counts and repaired conditions; written/skipped stay zero.
    pub report: LayoutReport,
}

/// The mindmap layout engine.
#[derive(Debug, Clone, Default)]
pub struct MindmapLayout {
    config: LayoutConfig,
}

impl MindmapLayout {
    /// Create a layout engine with a validated configuration.
    pub fn new(config: LayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a layout engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// The active configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Replace the configuration. The old one stays if the new one is invalid.
    pub fn set_config(&mut self, config: LayoutConfig) -> Result<(), LayoutError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Compute positions without touching the host.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownRoot`] if the root is not in `source`. Every
    /// other condition is repaired and listed in the report.
    pub fn compute<S: TreeSource + ?Sized>(
        &self,
        source: &S,
        request: &LayoutRequest,
    ) -> Result<LayoutOutcome, LayoutError> {
        let span = info_span!(
            "mindmap_layout",
            root = %request.root,
            direction = ?request.direction,
            mode = ?request.mode,
            sort_order = ?request.sort_order,
        );
        let _guard = span.enter();

        let mut tree = extract::extract(source, request.root, self.config.min_node_size)?;
        let visibility = visibility::mark_visibility(&mut tree);

        let spacing = self.config.spacing(request.mode);
        let sizes = sizer::size(&tree, request.direction, spacing);
        let anchor = request.anchor.unwrap_or_else(|| tree.root_position());
        let positions = assign::assign(
            &tree,
            &sizes,
            request.direction,
            request.sort_order,
            spacing,
            anchor,
        );

        if tracing::enabled!(Level::DEBUG) {
            check_overlaps(&positions);
        }

        let report = LayoutReport {
            laid_out: positions.len(),
            pruned: visibility.pruned_nodes,
            hidden_edges: visibility.hidden_edges,
            visible_edges: visibility.visible_edges,
            recovered: tree.take_recovered(),
            written: 0,
            skipped: 0,
        };
        debug!(
            laid_out = report.laid_out,
            pruned = report.pruned.len(),
            recovered = report.recovered.len(),
            "Computed layout"
        );

        Ok(LayoutOutcome { positions, report })
    }

    /// Compute and write into a graph that is both source and sink.
    pub fn apply<G: TreeSource + PositionSink>(
        &self,
        graph: &mut G,
        request: &LayoutRequest,
    ) -> Result<LayoutReport, LayoutError> {
        let LayoutOutcome { positions, report } = self.compute(&*graph, request)?;
        Ok(finish(positions, report, graph))
    }

    /// Compute from `source` and write into a separate `sink`.
    pub fn apply_with<S: TreeSource + ?Sized, W: PositionSink + ?Sized>(
        &self,
        source: &S,
        sink: &mut W,
        request: &LayoutRequest,
    ) -> Result<LayoutReport, LayoutError> {
        let LayoutOutcome { positions, report } = self.compute(source, request)?;
        Ok(finish(positions, report, sink))
    }
}

fn finish<W: PositionSink + ?Sized>(
    positions: PositionResult,
    mut report: LayoutReport,
    sink: &mut W,
) -> LayoutReport {
    let visibility = VisibilityReport {
        visible_nodes: positions.iter().map(|(id, _)| id).collect(),
        pruned_nodes: report.pruned.clone(),
        visible_edges: report.visible_edges.clone(),
        hidden_edges: report.hidden_edges.clone(),
    };
    writer::write_visibility(&visibility, sink);

    let summary = writer::write(&positions, sink);
    report.written = summary.written;
    report.skipped = summary.skipped;
    report
}

fn check_overlaps(positions: &PositionResult) {
    let pairs = BoxIndex::from_positions(positions).overlapping_pairs(OVERLAP_TOLERANCE);
    if let Some(&(first, second)) = pairs.first() {
        warn!(count = pairs.len(), %first, %second, "Layout produced overlapping nodes");
    }
}
