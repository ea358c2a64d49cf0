//! Mutation operator for genotypes.

use crate::space::GenotypeSpace;
use serde::{Deserialize, Serialize};
use stn_core::{Genotype, RandomStream};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Probability that each bit of an offspring is flipped
    pub point_mutation_rate: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            point_mutation_rate: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Mutator {
    config: MutationConfig,
    bits: u32,
}

impl Mutator {
    pub fn new(config: MutationConfig, space: GenotypeSpace) -> Self {
        Self {
            config,
            bits: space.bits(),
        }
    }

    /// Copy `parent`, flipping each bit independently.
    ///
    /// Always takes exactly one draw per bit, from bit 0 upwards.
    pub fn mutate<R: RandomStream>(&self, parent: Genotype, rng: &mut R) -> Genotype {
        let mut offspring = parent;
        for bit in 0..self.bits {
            if rng.next_real() < self.config.point_mutation_rate {
                offspring = offspring.with_bit_flipped(bit);
            }
        }
        offspring
    }
}
