use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::commands::common::CliError;

/// YAML run file. Every key is optional; explicit flags win over the file and
/// the file wins over built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Self-amplification rate.
    pub eta: Option<f64>,
    /// Three-node forward coupling.
    pub alpha: Option<f64>,
    /// Three-node backward coupling.
    pub beta: Option<f64>,
    /// Ring damping.
    pub damping: Option<f64>,
    /// Ring size.
    pub nodes: Option<usize>,
    /// Number of evolution steps.
    pub n_steps: Option<usize>,
    /// Initial separation.
    pub epsilon: Option<f64>,
    /// First fitted index.
    pub fit_start: Option<usize>,
    /// One past the last fitted index.
    pub fit_end: Option<usize>,
    /// Master seed.
    pub seed: Option<u64>,
    /// Powers reported for `‖T^n‖₂`.
    pub powers: Option<Vec<u32>>,
    /// Coarse-graining projection (`norm`, `mean`, `component:<i>`).
    pub projection: Option<String>,
    /// Allowed separation between fine and coarse exponents, in decades.
    pub max_decades: Option<f64>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path)
            .map_err(|err| CliError::Config(format!("{}: {err}", path.display())))?;
        Self::from_yaml(&text)
            .map_err(|err| CliError::Config(format!("{}: {err}", path.display())))
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_of_keys() {
        let config = RunConfig::from_yaml("eta: 0.1\nn_steps: 300\npowers: [1, 5]\n").unwrap();
        assert_eq!(config.eta, Some(0.1));
        assert_eq!(config.n_steps, Some(300));
        assert_eq!(config.powers, Some(vec![1, 5]));
        assert!(config.alpha.is_none());
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(RunConfig::from_yaml("\n").unwrap(), RunConfig::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(RunConfig::from_yaml("etta: 0.1\n").is_err());
    }
}
