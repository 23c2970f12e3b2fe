#![deny(missing_docs)]

//! Directed loop graphs carrying coherence increments on their edges.
//!
//! The pentagon propagator is a circulant built from a single closed loop
//! ("VID loop"). This crate owns that loop as an explicit graph so reports can
//! quote node and edge counts and the propagator builder can take its
//! adjacency from the same source.

mod digraph;
mod ids;

pub use digraph::{directed_cycle, pentagon, DirectedGraph, EdgeRecord, PENTAGON_NODES};
pub use ids::{EdgeId, NodeId};
