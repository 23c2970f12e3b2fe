use std::collections::BTreeSet;

use cgc_core::errors::{CgcError, ErrorInfo};
use cgc_core::Matrix;
use serde::{Deserialize, Serialize};

use crate::ids::{EdgeId, NodeId};

fn graph_error(code: &str, message: impl Into<String>) -> CgcError {
    CgcError::InvalidParameter(ErrorInfo::new(code, message))
}

/// Directed edge with its coherence increment `G(e)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Tail of the edge.
    pub source: NodeId,
    /// Head of the edge.
    pub target: NodeId,
    /// Coherence increment carried along the edge.
    pub increment: f64,
}

/// Small deterministic directed graph without parallel edges or self loops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectedGraph {
    num_nodes: usize,
    edges: Vec<EdgeRecord>,
}

impl DirectedGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its identifier.
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId::from_raw(self.num_nodes);
        self.num_nodes += 1;
        id
    }

    /// Adds a directed edge `source -> target` carrying `increment`.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        increment: f64,
    ) -> Result<EdgeId, CgcError> {
        for node in [source, target] {
            if node.as_raw() >= self.num_nodes {
                return Err(CgcError::InvalidParameter(
                    ErrorInfo::new("unknown-node", "edge endpoint is not part of the graph")
                        .with_context("node", node.as_raw())
                        .with_context("num_nodes", self.num_nodes),
                ));
            }
        }
        if source == target {
            return Err(graph_error("self-loop", "self loops are not supported"));
        }
        CgcError::check_finite("increment", increment)?;
        if self
            .edges
            .iter()
            .any(|edge| edge.source == source && edge.target == target)
        {
            return Err(CgcError::InvalidParameter(
                ErrorInfo::new("duplicate-edge", "edge already present")
                    .with_context("source", source.as_raw())
                    .with_context("target", target.as_raw()),
            ));
        }
        let id = EdgeId::from_raw(self.edges.len());
        self.edges.push(EdgeRecord {
            source,
            target,
            increment,
        });
        Ok(id)
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over node identifiers in insertion order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeId> {
        (0..self.num_nodes).map(NodeId::from_raw)
    }

    /// Returns the edge records in insertion order.
    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    /// Nodes with an edge into `node`.
    pub fn predecessors(&self, node: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter(|edge| edge.target == node)
            .map(|edge| edge.source)
            .collect()
    }

    /// Returns the adjacency matrix with `A[target, source] = 1` per edge.
    ///
    /// Columns are sources so that `A * psi` moves the value of each node to
    /// its successors, matching the propagator convention `psi' = T psi`.
    pub fn adjacency_matrix(&self) -> Matrix {
        let mut adjacency = Matrix::zeros(self.num_nodes, self.num_nodes);
        for edge in &self.edges {
            adjacency[(edge.target.as_raw(), edge.source.as_raw())] = 1.0;
        }
        adjacency
    }

    /// Returns `true` when every node has exactly one predecessor and one
    /// successor and all nodes form a single directed loop.
    pub fn is_single_cycle(&self) -> bool {
        if self.num_nodes < 2 || self.edges.len() != self.num_nodes {
            return false;
        }
        let mut successor = vec![None; self.num_nodes];
        let mut in_degree = vec![0usize; self.num_nodes];
        for edge in &self.edges {
            let slot = &mut successor[edge.source.as_raw()];
            if slot.is_some() {
                return false;
            }
            *slot = Some(edge.target.as_raw());
            in_degree[edge.target.as_raw()] += 1;
        }
        if in_degree.iter().any(|&degree| degree != 1) {
            return false;
        }
        let mut visited = BTreeSet::new();
        let mut current = 0usize;
        while visited.insert(current) {
            match successor[current] {
                Some(next) => current = next,
                None => return false,
            }
        }
        current == 0 && visited.len() == self.num_nodes
    }

    /// Total coherence increment accumulated around the graph.
    ///
    /// For a single closed loop this is the circulation `Σ_e G(e)`.
    pub fn circulation(&self) -> f64 {
        self.edges.iter().map(|edge| edge.increment).sum()
    }
}

/// Builds the directed cycle `i -> (i + 1) mod n` with a uniform increment.
pub fn directed_cycle(n: usize, increment: f64) -> Result<DirectedGraph, CgcError> {
    if n < 2 {
        return Err(CgcError::InvalidParameter(
            ErrorInfo::new("cycle-too-small", "a directed cycle needs at least two nodes")
                .with_context("nodes", n),
        ));
    }
    let mut graph = DirectedGraph::new();
    let nodes: Vec<NodeId> = (0..n).map(|_| graph.add_node()).collect();
    for (idx, &node) in nodes.iter().enumerate() {
        graph.add_edge(node, nodes[(idx + 1) % n], increment)?;
    }
    Ok(graph)
}

/// Number of nodes in the pentagon loop.
pub const PENTAGON_NODES: usize = 5;

/// Directed pentagon with unit coherence increments.
pub fn pentagon() -> Result<DirectedGraph, CgcError> {
    directed_cycle(PENTAGON_NODES, 1.0)
}
