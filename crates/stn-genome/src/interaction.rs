//! Pairwise genotype interaction strengths.
//!
//! The strength J(a, b) is built from two coefficient arrays and a sparsity
//! mask, all indexed by genotype id:
//!
//! ```text
//! J(a, a) = 0
//! J(a, b) = A[a ^ b] * B[b]   if mask[a ^ b]
//!         = 0                 otherwise
//! ```
//!
//! `B` is indexed by the second genotype only, so J is not symmetric.

use crate::space::GenotypeSpace;
use stn_core::{Genotype, RandomStream};
use tracing::debug;

/// Immutable interaction tables shared by every patch
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMatrix {
    coeff_a: Vec<f64>,
    coeff_b: Vec<f64>,
    mask: Vec<bool>,
}

impl InteractionMatrix {
    /// Draw the tables for `space`.
    ///
    /// For each index in ascending order: one draw for A, one for B (both in
    /// `[-1, 1)`), then one mask draw that is set with probability `theta`.
    pub fn generate<R: RandomStream>(space: GenotypeSpace, theta: f64, rng: &mut R) -> Self {
        let size = space.size();
        let mut coeff_a = Vec::with_capacity(size);
        let mut coeff_b = Vec::with_capacity(size);
        let mut mask = Vec::with_capacity(size);

        for _ in 0..size {
            coeff_a.push(rng.real_in_range(-1.0, 1.0));
            coeff_b.push(rng.real_in_range(-1.0, 1.0));
            mask.push(rng.next_real() < theta);
        }

        let matrix = Self {
            coeff_a,
            coeff_b,
            mask,
        };
        debug!(
            genotypes = size,
            theta,
            interacting = matrix.interacting_count(),
            "Generated interaction matrix"
        );
        matrix
    }

    /// Build from explicit tables; all three must have the same length
    pub fn from_parts(coeff_a: Vec<f64>, coeff_b: Vec<f64>, mask: Vec<bool>) -> Self {
        assert_eq!(coeff_a.len(), coeff_b.len(), "coefficient tables differ in length");
        assert_eq!(coeff_a.len(), mask.len(), "mask length differs from coefficients");
        Self {
            coeff_a,
            coeff_b,
            mask,
        }
    }

    /// Interaction strength J(a, b); see the module docs
    #[inline]
    pub fn strength(&self, a: Genotype, b: Genotype) -> f64 {
        if a == b {
            return 0.0;
        }
        let z = (a.id() ^ b.id()) as usize;
        if self.mask[z] {
            self.coeff_a[z] * self.coeff_b[b.index()]
        } else {
            0.0
        }
    }

    pub fn len(&self) -> usize {
        self.mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    pub fn coeff_a(&self) -> &[f64] {
        &self.coeff_a
    }

    pub fn coeff_b(&self) -> &[f64] {
        &self.coeff_b
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Number of XOR distances with a non-zero interaction
    pub fn interacting_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stn_core::SeededStream;

    fn generated(bits: u32, theta: f64, seed: u64) -> InteractionMatrix {
        let mut rng = SeededStream::from_seed_u64(seed);
        InteractionMatrix::generate(GenotypeSpace::new(bits), theta, &mut rng)
    }

    /// Same coefficients as `matrix` with mask entry `z` forced to `interacting`
    fn with_mask_entry(matrix: &InteractionMatrix, z: usize, interacting: bool) -> InteractionMatrix {
        let mut mask = matrix.mask().to_vec();
        mask[z] = interacting;
        InteractionMatrix::from_parts(matrix.coeff_a().to_vec(), matrix.coeff_b().to_vec(), mask)
    }

    #[test]
    fn test_tables_are_initialised() {
        let matrix = generated(12, 0.25, 42);
        assert_eq!(matrix.len(), 4096);
        for idx in 0..matrix.len() {
            assert!((-1.0..1.0).contains(&matrix.coeff_a()[idx]));
            assert!((-1.0..1.0).contains(&matrix.coeff_b()[idx]));
        }
        // Roughly a quarter of the mask is set
        let fraction = matrix.interacting_count() as f64 / matrix.len() as f64;
        assert!((0.2..0.3).contains(&fraction));
    }

    #[test]
    fn test_same_genotype_zero_interaction() {
        let matrix = with_mask_entry(&generated(12, 1.0, 1), 0, true);
        let g = Genotype::new(1);
        assert_eq!(matrix.strength(g, g), 0.0);
    }

    #[test]
    fn test_no_entanglement_zero_interaction() {
        let matrix = with_mask_entry(&generated(12, 0.25, 2), 3, false);
        let a = Genotype::new(1);
        let b = Genotype::new(2);
        assert_eq!(matrix.strength(a, b), 0.0);
    }

    #[test]
    fn test_entangled_genotypes_nonzero_interaction() {
        let matrix = with_mask_entry(&generated(12, 0.25, 3), 3, true);
        let a = Genotype::new(1);
        let b = Genotype::new(2);
        let strength = matrix.strength(a, b);
        assert_ne!(strength, 0.0);
        assert_eq!(strength, matrix.coeff_a()[3] * matrix.coeff_b()[2]);
    }

    #[test]
    fn test_strength_is_asymmetric() {
        let matrix = InteractionMatrix::from_parts(
            vec![0.0, 0.5, 0.0, 0.0],
            vec![0.0, 0.2, 0.0, 0.0],
            vec![false, true, false, false],
        );
        // z = 0 ^ 1 = 1 in both directions, but B is indexed by the second argument
        assert_eq!(matrix.strength(Genotype::new(1), Genotype::new(0)), 0.0);
        assert_eq!(matrix.strength(Genotype::new(0), Genotype::new(1)), 0.5 * 0.2);
    }

    #[test]
    fn test_generation_is_reproducible() {
        assert_eq!(generated(8, 0.25, 11), generated(8, 0.25, 11));
        assert_ne!(generated(8, 0.25, 11), generated(8, 0.25, 12));
    }

    #[test]
    #[should_panic(expected = "mask length")]
    fn test_mismatched_parts_panic() {
        InteractionMatrix::from_parts(vec![0.0; 4], vec![0.0; 4], vec![false; 3]);
    }

    proptest! {
        #[test]
        fn self_interaction_is_always_zero(seed in any::<u64>(), raw in 0u32..256) {
            let matrix = generated(8, 0.5, seed);
            let g = Genotype::new(raw);
            prop_assert_eq!(matrix.strength(g, g), 0.0);
        }

        #[test]
        fn masked_pairs_never_interact(seed in any::<u64>(), a in 0u32..256, b in 0u32..256) {
            let matrix = generated(8, 0.5, seed);
            let z = (a ^ b) as usize;
            let strength = matrix.strength(Genotype::new(a), Genotype::new(b));
            if !matrix.mask()[z] {
                prop_assert_eq!(strength, 0.0);
            } else if a != b && matrix.coeff_a()[z] != 0.0 && matrix.coeff_b()[b as usize] != 0.0 {
                prop_assert_ne!(strength, 0.0);
            }
        }
    }
}
