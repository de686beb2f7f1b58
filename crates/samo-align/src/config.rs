use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AlignError;

/// Parameters of one alignment invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Distance threshold trading aligned length against RMSD.
    pub lambda: f64,
    /// Search the correspondence space exhaustively instead of stopping at a local optimum.
    pub use_branch_and_bound: bool,
    /// Restrict the final correspondence to strictly increasing B-indices.
    pub enforce_sequential_order: bool,
    /// Number of blocks per sequence used to generate seeds, 0 for the identity seed only.
    pub heuristic_start_level: usize,
    /// Relax the threshold and tighten it geometrically before the final pass.
    pub annealing_enabled: bool,
    /// Initial threshold relaxation.
    pub annealing_initial: f64,
    /// Factor applied to the relaxation after every round.
    pub annealing_rate: f64,
    /// Relaxation at or below which annealing stops.
    pub annealing_min_temperature: f64,
    /// Score change under which the alternation is considered converged.
    pub convergence_tolerance: f64,
    /// Maximum number of fit/match steps of one alternation run.
    pub max_iterations: usize,
    /// Maximum number of search nodes visited by branch and bound.
    pub max_search_nodes: Option<u64>,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            lambda: 6.0,
            use_branch_and_bound: false,
            enforce_sequential_order: false,
            heuristic_start_level: 2,
            annealing_enabled: false,
            annealing_initial: 60.0,
            annealing_rate: 0.4,
            annealing_min_temperature: 0.01,
            convergence_tolerance: 0.01,
            max_iterations: 1000,
            max_search_nodes: None,
        }
    }
}

impl AlignConfig {
    /// Read a configuration from a JSON file. Missing fields take their default value.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AlignError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the ranges of all parameters.
    pub fn validate(&self) -> Result<(), AlignError> {
        if !self.lambda.is_finite() || self.lambda <= 0.0 {
            return Err(AlignError::InvalidConfig(format!(
                "lambda must be positive, got {}",
                self.lambda
            )));
        }
        if !self.annealing_rate.is_finite()
            || self.annealing_rate <= 0.0
            || self.annealing_rate >= 1.0
        {
            return Err(AlignError::InvalidConfig(format!(
                "annealing rate must be in (0, 1), got {}",
                self.annealing_rate
            )));
        }
        if !self.annealing_initial.is_finite() || self.annealing_initial < 0.0 {
            return Err(AlignError::InvalidConfig(format!(
                "annealing initial value must be non-negative, got {}",
                self.annealing_initial
            )));
        }
        if !self.annealing_min_temperature.is_finite() || self.annealing_min_temperature <= 0.0
        {
            return Err(AlignError::InvalidConfig(format!(
                "annealing stop value must be positive, got {}",
                self.annealing_min_temperature
            )));
        }
        if !self.convergence_tolerance.is_finite() || self.convergence_tolerance < 0.0 {
            return Err(AlignError::InvalidConfig(format!(
                "convergence tolerance must be non-negative, got {}",
                self.convergence_tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(AlignError::InvalidConfig(
                "max iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
