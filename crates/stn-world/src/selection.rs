//! Choosing which occupied patch acts on a step.

use crate::lattice::Lattice;
use stn_core::{LatticePoint, RandomStream, SelectionPolicy};

/// Pick an occupied patch, or `None` when the lattice is extinct.
///
/// No draw is taken on an extinct lattice. Weighted selection takes one real
/// draw; uniform selection takes one integer draw.
pub fn select_occupied<R: RandomStream>(
    lattice: &Lattice,
    policy: SelectionPolicy,
    rng: &mut R,
) -> Option<LatticePoint> {
    let occupied = lattice.occupied();
    if occupied.is_empty() {
        return None;
    }

    match policy {
        SelectionPolicy::Uniform => Some(occupied[rng.int_in_range(0, occupied.len() - 1)]),
        SelectionPolicy::Weighted => {
            let threshold = rng.next_real();
            select_weighted(lattice, threshold)
        }
    }
}

/// Roulette wheel over population share.
///
/// Walks the occupied index in order, accumulating each patch's share of the
/// lattice-wide population, and returns the first patch at which the running
/// share reaches `threshold`.
pub fn select_weighted(lattice: &Lattice, threshold: f64) -> Option<LatticePoint> {
    let occupied = lattice.occupied();
    let total = lattice.total_population() as f64;

    let mut running = 0.0;
    for &point in occupied {
        running += lattice.patch(point).population() as f64 / total;
        if running >= threshold {
            return Some(point);
        }
    }

    // Rounding can leave the running share a hair under a threshold near 1
    occupied.last().copied()
}
