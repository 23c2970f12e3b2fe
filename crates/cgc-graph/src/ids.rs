use serde::{Deserialize, Serialize};

/// Identifier for a node within a [`crate::DirectedGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Creates a new identifier from its raw index.
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw index of the identifier.
    pub fn as_raw(&self) -> usize {
        self.0
    }
}

/// Identifier for an edge within a [`crate::DirectedGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(usize);

impl EdgeId {
    /// Creates a new identifier from its raw index.
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw index of the identifier.
    pub fn as_raw(&self) -> usize {
        self.0
    }
}
