//! Per-step transitions: reproduction, annihilation and migration.
//!
//! Each step acts on one selected patch. Reproduction picks an occupant and
//! returns its slot in the patch's existent list; that same slot is then
//! offered to annihilation and, if nobody died, to migration. Offspring of a
//! novel genotype are appended to the end of the list, so the returned slot
//! still names the chosen occupant afterwards.

use crate::lattice::Lattice;
use crate::patch::Patch;
use stn_core::{DynamicsConfig, Genotype, LatticePoint, RandomStream, SelectionPolicy};
use stn_genome::{GenotypeModel, MutationConfig, Mutator};
use tracing::trace;

/// Transition rules shared by every patch
#[derive(Debug, Clone)]
pub struct Dynamics {
    c_r: f64,
    p_kill: f64,
    p_move: f64,
    selection: SelectionPolicy,
    mutator: Mutator,
}

impl Dynamics {
    pub fn new(config: &DynamicsConfig, model: &GenotypeModel) -> Self {
        let mutator = Mutator::new(
            MutationConfig {
                point_mutation_rate: config.p_mut,
            },
            model.space(),
        );
        Self {
            c_r: config.c_r,
            p_kill: config.p_kill,
            p_move: config.p_move,
            selection: config.selection,
            mutator,
        }
    }

    pub fn p_kill(&self) -> f64 {
        self.p_kill
    }

    /// How the acting patch is chosen each step
    pub fn selection(&self) -> SelectionPolicy {
        self.selection
    }

    /// Interaction sum for `chosen` against every co-resident genotype,
    /// weighted by count
    pub fn interaction_sum(&self, patch: &Patch, chosen: Genotype, model: &GenotypeModel) -> f64 {
        patch
            .existent()
            .iter()
            .map(|&g| model.strength(chosen, g) * patch.count(g) as f64)
            .sum()
    }

    /// Weight function H = C_R * sum / N - mu * N
    pub fn weight(&self, patch: &Patch, chosen: Genotype, model: &GenotypeModel) -> f64 {
        let n = patch.population() as f64;
        self.c_r * self.interaction_sum(patch, chosen, model) / n - patch.mu() * n
    }

    /// Logistic reproduction probability p_off = 1 / (1 + e^-H)
    pub fn reproduction_probability(&self, patch: &Patch, chosen: Genotype, model: &GenotypeModel) -> f64 {
        1.0 / (1.0 + (-self.weight(patch, chosen, model)).exp())
    }

    /// Attempt reproduction of a uniformly chosen existent genotype.
    ///
    /// Draws: occupant slot, reproduction threshold, then one draw per bit if
    /// reproduction succeeds. Returns the chosen slot whether or not an
    /// offspring was produced.
    pub fn reproduce<R: RandomStream>(
        &self,
        lattice: &mut Lattice,
        point: LatticePoint,
        model: &GenotypeModel,
        rng: &mut R,
    ) -> usize {
        let patch = lattice.patch(point);
        let existent = patch.existent().len();
        assert!(existent > 0, "reproduce called on empty patch {}", point.coordinate());

        let existent_idx = rng.int_in_range(0, existent - 1);
        let parent = patch.genotype_at(existent_idx);
        let p_off = self.reproduction_probability(patch, parent, model);

        if rng.next_real() <= p_off {
            let offspring = self.mutator.mutate(parent, rng);
            lattice.add_individual(point, offspring);
            trace!(point = point.raw(), %parent, %offspring, p_off, "Reproduced");
        }

        existent_idx
    }

    /// With probability p_kill, remove one individual of the genotype at
    /// `existent_idx`. Returns whether a death occurred.
    pub fn annihilate<R: RandomStream>(
        &self,
        lattice: &mut Lattice,
        point: LatticePoint,
        existent_idx: usize,
        rng: &mut R,
    ) -> bool {
        if rng.next_real() < self.p_kill {
            let genotype = lattice.remove_individual(point, existent_idx);
            trace!(point = point.raw(), %genotype, "Annihilated");
            true
        } else {
            false
        }
    }

    /// With probability p_move, move one individual of the genotype at
    /// `existent_idx` to a uniformly chosen neighbour. Returns the destination.
    pub fn migrate<R: RandomStream>(
        &self,
        lattice: &mut Lattice,
        point: LatticePoint,
        existent_idx: usize,
        rng: &mut R,
    ) -> Option<LatticePoint> {
        if rng.next_real() >= self.p_move {
            return None;
        }

        let genotype = lattice.remove_individual(point, existent_idx);
        let neighbours = lattice.patch(point).neighbours();
        let destination = neighbours[rng.int_in_range(0, neighbours.len() - 1)];
        lattice.add_individual(destination, genotype);

        trace!(from = point.raw(), to = destination.raw(), %genotype, "Migrated");
        Some(destination)
    }
}
