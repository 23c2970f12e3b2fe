//! Least-squares exponent fit of `ln D_n` over an index window.

use cgc_core::errors::{CgcError, ErrorInfo};
use cgc_core::StateVector;
use cgc_prop::{evolve_pair, Propagator};
use serde::{Deserialize, Serialize};

use crate::distance::distance_sequence;

fn fit_error(code: &str, message: impl Into<String>) -> CgcError {
    CgcError::NonConvergence(ErrorInfo::new(code, message))
}

fn default_start() -> usize {
    10
}

fn default_end() -> usize {
    150
}

/// Half-open index window `[start, end)` used for the regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitWindow {
    /// First index included in the fit.
    #[serde(default = "default_start")]
    pub start: usize,
    /// One past the last index included in the fit.
    #[serde(default = "default_end")]
    pub end: usize,
}

impl Default for FitWindow {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
        }
    }
}

impl FitWindow {
    /// Creates a window covering `start..end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of indices covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` when the window covers no index.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self, available: usize) -> Result<(), CgcError> {
        if self.start >= self.end {
            return Err(CgcError::InvalidParameter(
                ErrorInfo::new("fit-window-inverted", "fit window start must precede its end")
                    .with_context("start", self.start)
                    .with_context("end", self.end),
            ));
        }
        if self.end > available {
            return Err(CgcError::InvalidParameter(
                ErrorInfo::new("fit-window-out-of-range", "fit window exceeds the sequence")
                    .with_context("end", self.end)
                    .with_context("len", available)
                    .with_hint("raise n_steps or lower the window end"),
            ));
        }
        if self.len() < 2 {
            return Err(CgcError::NonConvergence(
                ErrorInfo::new("fit-window-too-small", "a line fit needs at least two points")
                    .with_context("start", self.start)
                    .with_context("end", self.end),
            ));
        }
        Ok(())
    }
}

/// Least-squares line through `(n, ln D_n)` over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExponentFit {
    /// Fitted slope; the estimated exponent `λ_CG`.
    pub slope: f64,
    /// Fitted intercept at `n = 0`.
    pub intercept: f64,
    /// Residual sum of squares of the fit.
    pub residual_sum_squares: f64,
    /// Window used for the fit.
    pub window: FitWindow,
    /// Indices entering the regression.
    pub indices: Vec<usize>,
    /// `ln D_n` for each fitted index.
    pub log_distances: Vec<f64>,
}

impl ExponentFit {
    /// Value of the fitted line at index `n`.
    pub fn predict(&self, n: usize) -> f64 {
        self.intercept + self.slope * n as f64
    }
}

/// Fits `ln D_n = intercept + slope * n` over `window`.
///
/// Every distance inside the window must be finite and strictly positive;
/// offending points fail the fit instead of being dropped.
pub fn fit_exponent(distances: &[f64], window: FitWindow) -> Result<ExponentFit, CgcError> {
    window.validate(distances.len())?;

    let mut indices = Vec::with_capacity(window.len());
    let mut log_distances = Vec::with_capacity(window.len());
    for (n, &distance) in distances
        .iter()
        .enumerate()
        .take(window.end)
        .skip(window.start)
    {
        if !distance.is_finite() {
            return Err(CgcError::FitDomain(
                ErrorInfo::new("non-finite-distance", "distance inside fit window is not finite")
                    .with_context("index", n)
                    .with_context("value", distance),
            ));
        }
        if distance <= 0.0 {
            return Err(CgcError::FitDomain(
                ErrorInfo::new(
                    "non-positive-distance",
                    "distance inside fit window must be strictly positive",
                )
                .with_context("index", n)
                .with_context("value", distance)
                .with_hint("move the window past coincident states"),
            ));
        }
        indices.push(n);
        log_distances.push(distance.ln());
    }

    let count = indices.len() as f64;
    let mean_x = indices.iter().map(|&n| n as f64).sum::<f64>() / count;
    let mean_y = log_distances.iter().sum::<f64>() / count;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&n, &y) in indices.iter().zip(&log_distances) {
        let dx = n as f64 - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    if sxx <= 0.0 {
        return Err(fit_error("degenerate-abscissa", "fit indices have no spread"));
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(fit_error("non-finite-fit", "least-squares solution is not finite"));
    }
    let residual_sum_squares = indices
        .iter()
        .zip(&log_distances)
        .map(|(&n, &y)| {
            let resid = y - (intercept + slope * n as f64);
            resid * resid
        })
        .sum();

    Ok(ExponentFit {
        slope,
        intercept,
        residual_sum_squares,
        window,
        indices,
        log_distances,
    })
}

/// Distance sequence and fitted exponent for one pair of initial states.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExponentEstimate {
    /// `D_n` for `n = 0..=n_steps`.
    pub distances: Vec<f64>,
    /// Fit over the requested window.
    pub fit: ExponentFit,
}

impl ExponentEstimate {
    /// Estimated exponent `λ_CG`.
    pub fn exponent(&self) -> f64 {
        self.fit.slope
    }
}

/// Evolves both initial states, forms `D_n` and fits the exponent.
pub fn estimate_exponent(
    propagator: &Propagator,
    psi0: &StateVector,
    psi0_prime: &StateVector,
    n_steps: usize,
    window: FitWindow,
) -> Result<ExponentEstimate, CgcError> {
    let (first, second) = evolve_pair(propagator, psi0, psi0_prime, n_steps)?;
    let distances = distance_sequence(&first, &second)?;
    let fit = fit_exponent(&distances, window)?;
    Ok(ExponentEstimate { distances, fit })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_exponential_recovers_rate() {
        let distances: Vec<f64> = (0..50).map(|n| 1e-6 * (0.07 * n as f64).exp()).collect();
        let fit = fit_exponent(&distances, FitWindow::new(5, 40)).unwrap();
        assert!((fit.slope - 0.07).abs() < 1e-12);
        assert!((fit.intercept - 1e-6f64.ln()).abs() < 1e-9);
        assert!(fit.residual_sum_squares < 1e-18);
        assert_eq!(fit.indices.len(), 35);
        assert_eq!(fit.indices[0], 5);
    }

    #[test]
    fn two_points_are_enough() {
        let fit = fit_exponent(&[1.0, std::f64::consts::E], FitWindow::new(0, 2)).unwrap();
        assert!((fit.slope - 1.0).abs() < 1e-12);
        assert!(fit.intercept.abs() < 1e-12);
    }
}
