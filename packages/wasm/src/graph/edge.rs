//! Parent → child connections.
//!
//! An edge only carries its id and whether a collapse currently hides it;
//! its endpoints live in the graph topology.

use std::fmt;

/// Stable edge identifier, handed out once and never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Raw id for the JS side.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

/// Visibility of one edge.
///
/// Only a layout pass writes it. An edge is hidden while its child end sits
/// below a collapsed node and shown again on the first layout after the
/// branch is expanded. Edges outside the laid-out tree keep whatever value
/// they had.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeState {
    hidden: bool,
}

impl EdgeState {
    /// A freshly added edge is visible.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_hidden(self) -> bool {
        self.hidden
    }

    #[inline]
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}
