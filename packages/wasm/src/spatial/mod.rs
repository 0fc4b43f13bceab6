//! Spatial indexing for O(log n) box queries.
//!
//! This module provides an R-tree over laid-out node boxes, used to check
//! layouts for overlapping nodes.

mod rtree;

pub use rtree::{BoxIndex, NodeBox};
