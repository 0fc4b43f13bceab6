//! Host diagram graph.
//!
//! This module provides the ambient node/edge graph using petgraph's
//! StableGraph for stable node/edge indices, with Structure of Arrays (SoA)
//! buffers for node boxes so positions can be handed to the renderer without
//! copying. The layout engine reads it through [`crate::layout::TreeSource`]
//! and writes back through [`crate::layout::PositionSink`].

mod edge;
mod engine;
mod node;

pub use edge::{EdgeId, EdgeState};
pub use engine::DiagramGraph;
pub use node::{NodeId, NodeState, OrderCounter, OrderKey};
