//! Position writer.
//!
//! Pushes computed positions (and hidden flags) back into the host. Ids that
//! disappeared between compute and write are skipped.

use std::collections::BTreeMap;

use tracing::debug;

use super::assign::PositionResult;
use super::types::Point;
use super::visibility::VisibilityReport;
use crate::graph::{EdgeId, NodeId};

/// Write access to the host's node positions and visibility.
pub trait PositionSink {
    /// Move a node's top-left corner. Returns false if the node is gone.
    fn set_position(&mut self, id: NodeId, x: f32, y: f32) -> bool;

    /// Show or hide a node. Hosts without visibility support ignore this.
    fn set_node_hidden(&mut self, _id: NodeId, _hidden: bool) -> bool {
        false
    }

    /// Show or hide an edge.
    fn set_edge_hidden(&mut self, _id: EdgeId, _hidden: bool) -> bool {
        false
    }
}

impl PositionSink for BTreeMap<NodeId, Point> {
    fn set_position(&mut self, id: NodeId, x: f32, y: f32) -> bool {
        self.insert(id, Point::new(x, y));
        true
    }
}

/// Counts from one write pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Positions the host accepted.
    pub written: usize,
    /// Positions for ids the host no longer knows.
    pub skipped: usize,
}

/// Write every placed position into `sink`.
pub fn write<S: PositionSink + ?Sized>(positions: &PositionResult, sink: &mut S) -> WriteSummary {
    let mut summary = WriteSummary::default();
    for (id, placement) in positions.iter() {
        if sink.set_position(id, placement.position.x, placement.position.y) {
            summary.written += 1;
        } else {
            summary.skipped += 1;
        }
    }
    debug!(
        written = summary.written,
        skipped = summary.skipped,
        "Wrote positions"
    );
    summary
}

/// Sync hidden flags: pruned nodes and their edges hidden, the rest shown.
pub fn write_visibility<S: PositionSink + ?Sized>(report: &VisibilityReport, sink: &mut S) {
    for &id in &report.visible_nodes {
        sink.set_node_hidden(id, false);
    }
    for &id in &report.pruned_nodes {
        sink.set_node_hidden(id, true);
    }
    for &id in &report.visible_edges {
        sink.set_edge_hidden(id, false);
    }
    for &id in &report.hidden_edges {
        sink.set_edge_hidden(id, true);
    }
    debug!(
        hidden_nodes = report.pruned_nodes.len(),
        hidden_edges = report.hidden_edges.len(),
        "Synced visibility"
    );
}
