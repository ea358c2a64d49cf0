//! Per-generation statistics and terminal run outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lattice-wide totals recorded at a generation boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Generations completed so far (1-based at the first boundary)
    pub generation: u64,
    /// Individuals across every patch
    pub total_population: u64,
    /// Patches with non-zero population
    pub occupied_patches: usize,
    /// Distinct genotypes present anywhere on the lattice
    pub distinct_genotypes: usize,
    /// Step budget for the generation that follows
    pub tau: u64,
}

impl GenerationSummary {
    /// `generation<TAB>total_population`, as written to the population log
    pub fn log_line(&self) -> String {
        format!("{}\t{}", self.generation, self.total_population)
    }
}

/// How a run ended. Both variants are clean terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The occupied index emptied
    Extinct {
        /// Generations completed before extinction
        generation: u64,
        /// Total steps executed
        steps: u64,
    },
    /// The generation budget was exhausted
    Completed { generations: u64 },
}

impl RunOutcome {
    pub fn is_extinct(&self) -> bool {
        matches!(self, RunOutcome::Extinct { .. })
    }

    pub fn generations(&self) -> u64 {
        match self {
            RunOutcome::Extinct { generation, .. } => *generation,
            RunOutcome::Completed { generations } => *generations,
        }
    }

    /// Short status line printed when the process ends
    pub fn status_message(&self) -> &'static str {
        match self {
            RunOutcome::Extinct { .. } => "Total extinction.",
            RunOutcome::Completed { .. } => "All generations passed without extinction.",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_line() {
        let summary = GenerationSummary {
            generation: 3,
            total_population: 412,
            occupied_patches: 5,
            distinct_genotypes: 40,
            tau: 2060,
        };
        assert_eq!(summary.log_line(), "3\t412");
    }

    #[test]
    fn test_outcomes_are_distinguishable() {
        let extinct = RunOutcome::Extinct { generation: 4, steps: 1234 };
        let completed = RunOutcome::Completed { generations: 500 };

        assert!(extinct.is_extinct());
        assert!(!completed.is_extinct());
        assert_eq!(extinct.generations(), 4);
        assert_eq!(completed.generations(), 500);
        assert_ne!(extinct.status_message(), completed.status_message());
        assert_eq!(completed.to_string(), "All generations passed without extinction.");
    }
}
