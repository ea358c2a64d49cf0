//! Configuration types for the simulation.

use crate::error::{ConfigErrors, Result};
use crate::types::Coordinate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Genotype space and interaction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenotypeConfig {
    /// Bit width L of each genotype
    pub bits: u32,
    /// Probability that two genotypes interact (theta)
    pub theta: f64,
    /// Optional explicit size of the genotype space; must equal 2^L when set
    pub genotypes_total: Option<u64>,
}

impl GenotypeConfig {
    /// Number of distinct genotypes, 2^L
    pub fn space_size(&self) -> usize {
        1usize << self.bits
    }
}

impl Default for GenotypeConfig {
    fn default() -> Self {
        Self {
            bits: 12,
            theta: 0.25,
            genotypes_total: None,
        }
    }
}

/// How resources (mu) are spread over the lattice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceDistribution {
    /// Every patch receives the same value
    Fixed { value: f64 },
    /// Nested cube shells, richer towards the outside
    CubicShell,
    /// Linear decline along the first axis
    Gradient,
}

impl Default for ResourceDistribution {
    fn default() -> Self {
        ResourceDistribution::Fixed { value: 0.05 }
    }
}

/// Where the starting population is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StartPosition {
    Fixed { x: u8, y: u8, z: u8 },
    Random,
}

impl Default for StartPosition {
    fn default() -> Self {
        StartPosition::Fixed { x: 3, y: 3, z: 3 }
    }
}

/// Lattice geometry and initial conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    /// Side length X of the cubic lattice
    pub size: u8,
    pub resources: ResourceDistribution,
    pub start: StartPosition,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            size: 6,
            resources: ResourceDistribution::default(),
            start: StartPosition::default(),
        }
    }
}

/// Policy for picking which occupied patch acts on a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Roulette wheel over population share
    #[default]
    Weighted,
    /// Every occupied patch equally likely
    Uniform,
}

/// Per-step transition parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    /// Scale of the interaction term in the reproduction weight function
    pub c_r: f64,
    /// Per-bit mutation probability for offspring
    pub p_mut: f64,
    /// Probability of death for the selected individual
    pub p_kill: f64,
    /// Probability of migration when no death occurred
    pub p_move: f64,
    pub selection: SelectionPolicy,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            c_r: 20.0,
            p_mut: 0.05,
            p_kill: 0.2,
            p_move: 0.003,
            selection: SelectionPolicy::Weighted,
        }
    }
}

/// Run length and seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Generation budget
    pub generations: u64,
    /// Number of individuals placed on the starting patch (N_0)
    pub initial_population: u32,
    /// Random seed for reproducibility; drawn from entropy when absent
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            generations: 500,
            initial_population: 100,
            seed: None,
        }
    }
}

/// Complete model configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub genotype: GenotypeConfig,
    pub lattice: LatticeConfig,
    pub dynamics: DynamicsConfig,
    pub run: RunConfig,
}

impl ModelConfig {
    /// Parse a JSON configuration; absent fields keep their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Fixed start coordinate, if configured
    pub fn fixed_start(&self) -> Option<Coordinate> {
        match self.lattice.start {
            StartPosition::Fixed { x, y, z } => Some(Coordinate::new(x, y, z)),
            StartPosition::Random => None,
        }
    }

    /// Check every parameter, reporting all violations together
    pub fn validate(&self) -> Result<()> {
        let mut errors = ConfigErrors::new();
        let g = &self.genotype;
        let l = &self.lattice;
        let d = &self.dynamics;

        errors.check(g.bits <= 1 || g.bits >= 17, "L must be in [2, 16].");
        if let Some(total) = g.genotypes_total {
            let expected = 1u64.checked_shl(g.bits).unwrap_or(0);
            errors.check(total != expected, "GENOTYPES_TOT must be equal 2^L.");
        }
        errors.check(l.size <= 1 || l.size >= 10, "X must be in [2, 9].");
        errors.check(self.run.initial_population == 0, "N_0 must be positive.");
        errors.check(self.run.generations == 0, "GENERATIONS_TOT must be positive.");
        errors.check(!is_probability(g.theta), "THETA must be in [0, 1].");
        errors.check(!is_probability(d.p_mut), "PMUT must be in [0, 1].");
        errors.check(
            !(d.p_kill > 0.0 && d.p_kill <= 1.0),
            "PKILL must be in (0, 1].",
        );
        errors.check(!is_probability(d.p_move), "PMOVE must be in [0, 1].");
        errors.check(!d.c_r.is_finite(), "C_R must be finite.");

        if let Some(start) = self.fixed_start() {
            errors.check(
                !start.within(l.size),
                "If using a fixed starting point, the starting coordinates must not exceed the lattice dimensions.",
            );
        }
        if let ResourceDistribution::Fixed { value } = l.resources {
            errors.check(
                !(value >= 0.0 && value.is_finite()),
                "FIXED_MU_VAL must be non-negative.",
            );
        }

        errors.into_result()
    }
}

fn is_probability(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_configs() {
        let config = ModelConfig::default();
        assert_eq!(config.genotype.bits, 12);
        assert_eq!(config.genotype.space_size(), 4096);
        assert_eq!(config.lattice.size, 6);
        assert_eq!(config.run.generations, 500);
        assert_eq!(config.run.initial_population, 100);
        assert_eq!(config.dynamics.p_kill, 0.2);
        assert_eq!(config.fixed_start(), Some(Coordinate::new(3, 3, 3)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ModelConfig::from_json(
            r#"{
                "lattice": { "size": 4, "resources": { "kind": "cubic_shell" }, "start": { "kind": "random" } },
                "dynamics": { "selection": "uniform" },
                "run": { "seed": 99 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.lattice.size, 4);
        assert_eq!(config.lattice.resources, ResourceDistribution::CubicShell);
        assert_eq!(config.lattice.start, StartPosition::Random);
        assert_eq!(config.dynamics.selection, SelectionPolicy::Uniform);
        assert_eq!(config.dynamics.c_r, 20.0);
        assert_eq!(config.run.seed, Some(99));
        assert_eq!(config.genotype.bits, 12);
    }

    #[test]
    fn test_config_serialization() {
        let config = ModelConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized = ModelConfig::from_json(&json).unwrap();
        assert_eq!(config.lattice.resources, deserialized.lattice.resources);
        assert_eq!(config.dynamics.p_move, deserialized.dynamics.p_move);
    }

    #[test]
    fn test_validation_collects_every_violation() {
        let mut config = ModelConfig::default();
        config.genotype.bits = 20;
        config.lattice.size = 12;
        config.run.initial_population = 0;
        config.dynamics.p_mut = -0.1;
        config.dynamics.p_move = -1.0;

        match config.validate() {
            Err(Error::InvalidConfig(errors)) => {
                assert_eq!(errors.len(), 5);
                assert!(errors.messages().iter().any(|m| m.starts_with("L must")));
                assert!(errors.messages().iter().any(|m| m.starts_with("X must")));
                assert!(errors.messages().iter().any(|m| m.starts_with("N_0")));
                assert!(errors.messages().iter().any(|m| m.starts_with("PMUT")));
                assert!(errors.messages().iter().any(|m| m.starts_with("PMOVE")));
            }
            other => panic!("expected configuration errors, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_genotype_space_mismatch() {
        let mut config = ModelConfig::default();
        config.genotype.genotypes_total = Some(4000);
        assert!(config.validate().is_err());

        config.genotype.genotypes_total = Some(4096);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_start_outside_lattice() {
        let mut config = ModelConfig::default();
        config.lattice.start = StartPosition::Fixed { x: 0, y: 5, z: 6 };
        assert!(config.validate().is_err());

        config.lattice.start = StartPosition::Fixed { x: 0, y: 5, z: 5 };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_kill_probability() {
        let mut config = ModelConfig::default();
        config.dynamics.p_kill = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_negative_fixed_mu() {
        let mut config = ModelConfig::default();
        config.lattice.resources = ResourceDistribution::Fixed { value: -0.5 };
        assert!(config.validate().is_err());
    }
}
