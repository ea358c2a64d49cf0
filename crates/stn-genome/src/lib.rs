//! Genotype model for the Tangled Nature simulation.
//!
//! Genotypes are fixed-width bit patterns. This crate provides:
//! - the genotype space and bit-pattern encoding
//! - per-bit point mutation of offspring
//! - the pairwise interaction tables that drive fitness

pub mod space;
pub mod mutation;
pub mod interaction;
pub mod model;

pub use space::GenotypeSpace;
pub use mutation::{Mutator, MutationConfig};
pub use interaction::InteractionMatrix;
pub use model::GenotypeModel;
