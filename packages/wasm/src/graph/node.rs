//! Node type and related structures.
//!
//! Nodes are the visual boxes of the diagram. Each node has:
//! - A stable unique identifier (survives graph mutations)
//! - A box (top-left position and size) in canvas space
//! - An order key stamped once at creation time
//! - Collapsed / hidden state flags

use std::fmt;

/// Stable node identifier.
///
/// This ID remains valid even after other nodes are removed from the graph.
/// It wraps a u32 for efficient storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Creation-order stamp used to keep sibling order stable across relayouts.
///
/// Assigned once when a node is created and never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OrderKey(pub u64);

impl OrderKey {
    /// Get the raw u64 value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Host-owned monotonic source of [`OrderKey`]s.
///
/// Owned by the graph it stamps, so two diagrams never share a sequence and
/// a reload can resume past the highest persisted key.
#[derive(Debug, Clone, Default)]
pub struct OrderCounter {
    next: u64,
}

impl OrderCounter {
    /// Create a counter whose first key is `start`.
    pub fn starting_at(start: u64) -> Self {
        Self { next: start }
    }

    /// Stamp the next key.
    pub fn next(&mut self) -> OrderKey {
        let key = OrderKey(self.next);
        self.next = self.next.saturating_add(1);
        key
    }

    /// Record an externally supplied key so later stamps sort after it.
    pub fn observe(&mut self, key: OrderKey) {
        if key.0 >= self.next {
            self.next = key.0.saturating_add(1);
        }
    }

    /// The key the next call to [`OrderCounter::next`] will return.
    pub fn peek(&self) -> OrderKey {
        OrderKey(self.next)
    }
}

/// Node state flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const COLLAPSED: u8 = 0b0000_0001;
    const HIDDEN: u8 = 0b0000_0010;

    /// Create a new default node state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the node's branch is collapsed.
    #[inline]
    pub fn is_collapsed(self) -> bool {
        self.flags & Self::COLLAPSED != 0
    }

    /// Set the collapsed state.
    #[inline]
    pub fn set_collapsed(&mut self, collapsed: bool) {
        if collapsed {
            self.flags |= Self::COLLAPSED;
        } else {
            self.flags &= !Self::COLLAPSED;
        }
    }

    /// Check if the node is hidden (inside a collapsed ancestor).
    #[inline]
    pub fn is_hidden(self) -> bool {
        self.flags & Self::HIDDEN != 0
    }

    /// Set the hidden state.
    #[inline]
    pub fn set_hidden(&mut self, hidden: bool) {
        if hidden {
            self.flags |= Self::HIDDEN;
        } else {
            self.flags &= !Self::HIDDEN;
        }
    }
}
