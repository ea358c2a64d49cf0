//! The genotype universe together with its interaction tables.

use crate::interaction::InteractionMatrix;
use crate::space::GenotypeSpace;
use stn_core::{GenotypeConfig, Genotype, RandomStream};

/// Genotype space plus the shared, read-only interaction tables
#[derive(Debug, Clone)]
pub struct GenotypeModel {
    space: GenotypeSpace,
    interactions: InteractionMatrix,
}

impl GenotypeModel {
    /// Build the space and draw the interaction tables from `rng`
    pub fn generate<R: RandomStream>(config: &GenotypeConfig, rng: &mut R) -> Self {
        let space = GenotypeSpace::new(config.bits);
        let interactions = InteractionMatrix::generate(space, config.theta, rng);
        Self {
            space,
            interactions,
        }
    }

    pub fn from_parts(space: GenotypeSpace, interactions: InteractionMatrix) -> Self {
        assert_eq!(
            space.size(),
            interactions.len(),
            "interaction tables do not cover the genotype space"
        );
        Self {
            space,
            interactions,
        }
    }

    pub fn space(&self) -> GenotypeSpace {
        self.space
    }

    pub fn interactions(&self) -> &InteractionMatrix {
        &self.interactions
    }

    #[inline]
    pub fn strength(&self, a: Genotype, b: Genotype) -> f64 {
        self.interactions.strength(a, b)
    }
}
