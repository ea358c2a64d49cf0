//! Cubic lattice of patches with periodic boundaries.

use crate::patch::Patch;
use stn_core::{Coordinate, Genotype, LatticePoint};

/// An X*X*X periodic lattice plus the index of occupied patches.
///
/// A point is in the occupied index exactly when its patch has a positive
/// population. The index keeps insertion order, which the roulette-wheel
/// patch selection walks.
#[derive(Debug, Clone)]
pub struct Lattice {
    size: u8,
    patches: Vec<Patch>,
    occupied: Vec<LatticePoint>,
    total_population: u64,
}

impl Lattice {
    /// Empty lattice of side `size` for a genotype space of `genotypes` entries
    pub fn new(size: u8, genotypes: usize) -> Self {
        let mut patches = Vec::with_capacity(size as usize * size as usize * size as usize);
        for i in 0..size {
            for j in 0..size {
                for k in 0..size {
                    let coordinate = Coordinate::new(i, j, k);
                    patches.push(Patch::new(
                        coordinate,
                        genotypes,
                        neighbours_of(coordinate, size),
                    ));
                }
            }
        }

        Self {
            size,
            patches,
            occupied: Vec::new(),
            total_population: 0,
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn total_population(&self) -> u64 {
        self.total_population
    }

    /// Occupied points in insertion order
    pub fn occupied(&self) -> &[LatticePoint] {
        &self.occupied
    }

    pub fn is_extinct(&self) -> bool {
        self.occupied.is_empty()
    }

    pub fn is_occupied(&self, point: LatticePoint) -> bool {
        self.occupied.contains(&point)
    }

    fn index_of(&self, coordinate: Coordinate) -> usize {
        assert!(
            coordinate.within(self.size),
            "coordinate {} outside lattice of size {}",
            coordinate,
            self.size
        );
        let x = self.size as usize;
        (coordinate.i as usize * x + coordinate.j as usize) * x + coordinate.k as usize
    }

    pub fn patch(&self, point: LatticePoint) -> &Patch {
        &self.patches[self.index_of(point.coordinate())]
    }

    pub fn patch_mut(&mut self, point: LatticePoint) -> &mut Patch {
        let index = self.index_of(point.coordinate());
        &mut self.patches[index]
    }

    pub fn patch_at(&self, coordinate: Coordinate) -> &Patch {
        &self.patches[self.index_of(coordinate)]
    }

    /// All patches, iterated with i slowest and k fastest
    pub fn patches(&self) -> impl Iterator<Item = &Patch> + '_ {
        self.patches.iter()
    }

    pub fn patches_mut(&mut self) -> impl Iterator<Item = &mut Patch> + '_ {
        self.patches.iter_mut()
    }

    /// Add one individual of `genotype` at `point`, registering the patch as
    /// occupied if it was empty
    pub fn add_individual(&mut self, point: LatticePoint, genotype: Genotype) {
        let patch = self.patch_mut(point);
        let was_empty = patch.is_empty();
        patch.add_individual(genotype);
        if was_empty {
            self.occupied.push(point);
        }
        self.total_population += 1;
    }

    /// Remove one individual of the genotype at `existent_idx` of the patch at
    /// `point`, dropping the patch from the occupied index once it empties
    pub fn remove_individual(&mut self, point: LatticePoint, existent_idx: usize) -> Genotype {
        let patch = self.patch_mut(point);
        let genotype = patch.remove_at(existent_idx);
        let emptied = patch.is_empty();
        if emptied {
            let position = self
                .occupied
                .iter()
                .position(|p| *p == point)
                .unwrap_or_else(|| panic!("emptied patch {} missing from occupied index", point));
            self.occupied.remove(position);
        }
        self.total_population -= 1;
        genotype
    }

    /// Number of distinct genotypes present anywhere
    pub fn distinct_genotypes(&self, genotypes: usize) -> usize {
        let mut seen = vec![false; genotypes];
        let mut distinct = 0;
        for patch in &self.patches {
            for genotype in patch.existent() {
                let slot = &mut seen[genotype.index()];
                if !*slot {
                    *slot = true;
                    distinct += 1;
                }
            }
        }
        distinct
    }

    /// Verify per-patch bookkeeping, the occupied index and the running total
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut total = 0u64;
        for patch in &self.patches {
            patch.check_invariants()?;
            total += patch.population() as u64;

            let listed = self.occupied.iter().filter(|p| **p == patch.point()).count();
            match (patch.is_empty(), listed) {
                (true, 0) | (false, 1) => {}
                (_, n) => {
                    return Err(format!(
                        "patch {} with population {} appears {} times in the occupied index",
                        patch.coordinate(),
                        patch.population(),
                        n
                    ))
                }
            }
        }
        if total != self.total_population {
            return Err(format!(
                "patch populations sum to {} but lattice total is {}",
                total, self.total_population
            ));
        }
        Ok(())
    }
}

/// The 26 Moore neighbours of `coordinate` under periodic wraparound.
///
/// Ordered by (di, dj, dk) over {-1, 0, 1}, each axis from -1 upwards.
pub fn neighbours_of(coordinate: Coordinate, size: u8) -> Vec<LatticePoint> {
    let mut neighbours = Vec::with_capacity(26);
    for di in -1..=1 {
        for dj in -1..=1 {
            for dk in -1..=1 {
                if di == 0 && dj == 0 && dk == 0 {
                    continue;
                }
                neighbours.push(coordinate.offset_wrapped(di, dj, dk, size).to_point());
            }
        }
    }
    neighbours
}
