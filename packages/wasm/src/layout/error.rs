//! Error types for the layout engine.
//!
//! Only [`LayoutError::UnknownRoot`] and [`LayoutError::InvalidConfig`] abort
//! a layout call. Cycle, shared-child and degenerate-size conditions are
//! repaired where they occur and collected in the call's report.

use thiserror::Error;

use crate::graph::{EdgeId, NodeId};

/// Layout engine errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Unknown root: {0} is not in the diagram")]
    UnknownRoot(NodeId),

    #[error("Cycle detected: {edge} from {parent} back to ancestor {child} was skipped")]
    CycleDetected {
        edge: EdgeId,
        parent: NodeId,
        child: NodeId,
    },

    #[error("Shared child: {edge} from {parent} to already placed {child} was skipped")]
    SharedChild {
        edge: EdgeId,
        parent: NodeId,
        child: NodeId,
    },

    #[error("Degenerate size: {node} is {width}x{height}, clamped to the minimum")]
    DegenerateSize { node: NodeId, width: f32, height: f32 },

    #[error("Invalid config: {message}")]
    InvalidConfig { message: String },

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl LayoutError {
    /// Create a new invalid-config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new unknown-variant error
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }

    /// Whether the engine repairs this condition instead of failing the call.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CycleDetected { .. } | Self::SharedChild { .. } | Self::DegenerateSize { .. }
        )
    }
}
