//! The fixed universe of 2^L genotypes and their bit patterns.

use serde::{Deserialize, Serialize};
use stn_core::Genotype;

/// All genotypes of a given bit width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenotypeSpace {
    bits: u32,
}

impl GenotypeSpace {
    /// Create the space of `bits`-wide genotypes.
    ///
    /// Panics outside `1..=31`; configuration validation keeps L in [2, 16].
    pub fn new(bits: u32) -> Self {
        assert!(
            (1..=31).contains(&bits),
            "genotype bit width {} out of range",
            bits
        );
        Self { bits }
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Number of distinct genotypes, 2^L
    pub fn size(&self) -> usize {
        1usize << self.bits
    }

    pub fn contains(&self, genotype: Genotype) -> bool {
        genotype.index() < self.size()
    }

    /// Every genotype in ascending id order
    pub fn genotypes(&self) -> impl Iterator<Item = Genotype> {
        (0..self.size() as u32).map(Genotype::new)
    }

    /// Bits of `genotype`, most significant first
    pub fn bits_of(&self, genotype: Genotype) -> impl Iterator<Item = bool> {
        (0..self.bits).rev().map(move |bit| genotype.bit(bit))
    }

    /// L-character pattern of '0'/'1', most significant bit first
    pub fn bit_pattern(&self, genotype: Genotype) -> String {
        self.bits_of(genotype)
            .map(|set| if set { '1' } else { '0' })
            .collect()
    }

    /// Inverse of [`bit_pattern`](Self::bit_pattern)
    pub fn parse_bit_pattern(&self, pattern: &str) -> Option<Genotype> {
        if pattern.len() != self.bits as usize {
            return None;
        }
        pattern.chars().try_fold(0u32, |acc, c| match c {
            '0' => Some(acc << 1),
            '1' => Some(acc << 1 | 1),
            _ => None,
        })
        .map(Genotype::new)
    }
}
