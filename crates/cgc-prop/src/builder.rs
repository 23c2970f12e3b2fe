//! Propagator variants and the matrices they build.

use cgc_core::errors::{CgcError, ErrorInfo};
use cgc_core::{all_finite, Matrix, StateVector};
use cgc_graph::{directed_cycle, PENTAGON_NODES};
use serde::{Deserialize, Serialize};

/// Named propagator variants with their scalar parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "kebab-case")]
pub enum PropagatorSpec {
    /// Three-node chain: diagonal `1 + eta`, forward coupling `alpha` from
    /// node 0 into node 1 and damping feedback `-beta` from node 1 onto node 0.
    ThreeNode {
        /// Amplification factor.
        eta: f64,
        /// Forward coupling.
        alpha: f64,
        /// Damping feedback.
        beta: f64,
    },
    /// Five-node circulant `(1 - damping) I + eta A` on the directed pentagon.
    Pentagon {
        /// Amplification carried from each predecessor.
        eta: f64,
        /// Self damping.
        damping: f64,
    },
    /// Circulant on a directed cycle with an arbitrary number of nodes.
    Ring {
        /// Number of nodes in the loop.
        nodes: usize,
        /// Amplification carried from each predecessor.
        eta: f64,
        /// Self damping.
        damping: f64,
    },
}

impl PropagatorSpec {
    /// Dimension of the matrix this variant builds.
    pub fn dim(&self) -> usize {
        match self {
            PropagatorSpec::ThreeNode { .. } => 3,
            PropagatorSpec::Pentagon { .. } => PENTAGON_NODES,
            PropagatorSpec::Ring { nodes, .. } => *nodes,
        }
    }

    /// Amplification factor of the variant.
    pub fn eta(&self) -> f64 {
        match self {
            PropagatorSpec::ThreeNode { eta, .. }
            | PropagatorSpec::Pentagon { eta, .. }
            | PropagatorSpec::Ring { eta, .. } => *eta,
        }
    }

    /// Short label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            PropagatorSpec::ThreeNode { .. } => "three-node",
            PropagatorSpec::Pentagon { .. } => "pentagon",
            PropagatorSpec::Ring { .. } => "ring",
        }
    }

    fn validate(&self) -> Result<(), CgcError> {
        match *self {
            PropagatorSpec::ThreeNode { eta, alpha, beta } => {
                CgcError::check_finite("eta", eta)?;
                CgcError::check_finite("alpha", alpha)?;
                CgcError::check_finite("beta", beta)?;
            }
            PropagatorSpec::Pentagon { eta, damping } => {
                CgcError::check_finite("eta", eta)?;
                CgcError::check_finite("damping", damping)?;
            }
            PropagatorSpec::Ring {
                nodes,
                eta,
                damping,
            } => {
                CgcError::check_finite("eta", eta)?;
                CgcError::check_finite("damping", damping)?;
                if nodes < 2 {
                    return Err(CgcError::InvalidParameter(
                        ErrorInfo::new("ring-too-small", "a ring propagator needs at least two nodes")
                            .with_context("nodes", nodes),
                    ));
                }
            }
        }
        let eta = self.eta();
        if eta <= -1.0 {
            return Err(CgcError::InvalidParameter(
                ErrorInfo::new("amplification-out-of-range", "eta must be greater than -1")
                    .with_context("eta", eta)
                    .with_hint("1 + eta is the per-step gain and must stay positive"),
            ));
        }
        Ok(())
    }
}

/// Fixed linear operator `T∞` applied at every evolution step.
///
/// Constructed once and never mutated; the matrix is only exposed by
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Propagator {
    spec: Option<PropagatorSpec>,
    matrix: Matrix,
}

impl Propagator {
    /// Wraps an arbitrary square matrix with finite entries.
    pub fn from_matrix(matrix: Matrix) -> Result<Self, CgcError> {
        if !matrix.is_square() {
            return Err(CgcError::DimensionMismatch(
                ErrorInfo::new("non-square-propagator", "propagator must be square")
                    .with_context("rows", matrix.nrows())
                    .with_context("cols", matrix.ncols()),
            ));
        }
        if matrix.nrows() == 0 {
            return Err(CgcError::invalid_parameter(
                "empty-propagator",
                "propagator must have at least one row",
            ));
        }
        if !all_finite(matrix.as_slice()) {
            return Err(CgcError::invalid_parameter(
                "non-finite-entry",
                "propagator entries must be finite",
            ));
        }
        Ok(Self { spec: None, matrix })
    }

    /// Returns the variant this propagator was built from, if any.
    pub fn spec(&self) -> Option<&PropagatorSpec> {
        self.spec.as_ref()
    }

    /// Returns the underlying matrix.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Dimension of the state vectors this propagator acts on.
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// Applies one evolution step `T psi`.
    pub fn apply(&self, psi: &StateVector) -> Result<StateVector, CgcError> {
        if psi.len() != self.dim() {
            return Err(CgcError::dimension_mismatch(self.dim(), psi.len(), "state vector"));
        }
        Ok(&self.matrix * psi)
    }
}

fn three_node_matrix(eta: f64, alpha: f64, beta: f64) -> Matrix {
    let mut matrix = Matrix::identity(3, 3) * (1.0 + eta);
    matrix[(1, 0)] = alpha;
    matrix[(0, 1)] = -beta;
    matrix
}

fn ring_matrix(nodes: usize, eta: f64, damping: f64) -> Result<Matrix, CgcError> {
    let adjacency = directed_cycle(nodes, 1.0)?.adjacency_matrix();
    Ok(Matrix::identity(nodes, nodes) * (1.0 - damping) + adjacency * eta)
}

/// Builds the propagator for a named variant.
pub fn build(spec: &PropagatorSpec) -> Result<Propagator, CgcError> {
    spec.validate()?;
    let matrix = match *spec {
        PropagatorSpec::ThreeNode { eta, alpha, beta } => three_node_matrix(eta, alpha, beta),
        PropagatorSpec::Pentagon { eta, damping } => ring_matrix(PENTAGON_NODES, eta, damping)?,
        PropagatorSpec::Ring {
            nodes,
            eta,
            damping,
        } => ring_matrix(nodes, eta, damping)?,
    };
    tracing::debug!(variant = spec.label(), dim = matrix.nrows(), "built propagator");
    Ok(Propagator {
        spec: Some(*spec),
        matrix,
    })
}

/// Builds the propagator and checks it acts on `dim`-dimensional states.
pub fn build_for_dim(spec: &PropagatorSpec, dim: usize) -> Result<Propagator, CgcError> {
    if spec.dim() != dim {
        return Err(CgcError::InvalidParameter(
            ErrorInfo::new(
                "variant-dimension-mismatch",
                format!("{} propagator has dimension {}", spec.label(), spec.dim()),
            )
            .with_context("requested", dim)
            .with_context("implied", spec.dim()),
        ));
    }
    build(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_node_layout() {
        let prop = build(&PropagatorSpec::ThreeNode {
            eta: 0.05,
            alpha: 0.01,
            beta: 0.02,
        })
        .unwrap();
        let m = prop.matrix();
        for i in 0..3 {
            assert_eq!(m[(i, i)], 1.0 + 0.05);
        }
        assert_eq!(m[(1, 0)], 0.01);
        assert_eq!(m[(0, 1)], -0.02);
        let off_diagonal_nonzero = (0..3)
            .flat_map(|i| (0..3).map(move |j| (i, j)))
            .filter(|&(i, j)| i != j && m[(i, j)] != 0.0)
            .count();
        assert_eq!(off_diagonal_nonzero, 2);
    }

    #[test]
    fn pentagon_is_circulant() {
        let prop = build(&PropagatorSpec::Pentagon {
            eta: 0.08,
            damping: 0.02,
        })
        .unwrap();
        let m = prop.matrix();
        for i in 0..5 {
            assert_eq!(m[(i, i)], 1.0 - 0.02);
            assert_eq!(m[((i + 1) % 5, i)], 0.08);
            assert!((m.row(i).sum() - 1.06).abs() < 1e-12);
        }
    }
}
