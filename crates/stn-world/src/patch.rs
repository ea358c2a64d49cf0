//! Patch state: the sub-population living at one lattice coordinate.

use stn_core::{Coordinate, Genotype, LatticePoint};

/// One lattice cell.
///
/// Counts are kept twice: densely, one slot per genotype in the space, and
/// sparsely as the list of genotypes currently present. A genotype is in
/// `existent` exactly when its count is positive, and `population` is the sum
/// of all counts.
///
/// Individuals are added and removed through [`Lattice`](crate::Lattice) so
/// the occupied index and lattice total stay in step; from outside the crate
/// a `&mut Patch` only allows setting mu:
///
/// ```compile_fail
/// use stn_core::{Genotype, LatticePoint};
/// use stn_world::Lattice;
///
/// let mut lattice = Lattice::new(2, 4);
/// let point = LatticePoint::from_coords(0, 0, 0);
/// lattice.patch_mut(point).add_individual(Genotype::new(1));
/// ```
///
/// ```
/// use stn_core::LatticePoint;
/// use stn_world::Lattice;
///
/// let mut lattice = Lattice::new(2, 4);
/// lattice.patch_mut(LatticePoint::from_coords(0, 0, 0)).set_mu(0.05);
/// assert!(lattice.check_invariants().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Patch {
    coordinate: Coordinate,
    counts: Vec<u32>,
    existent: Vec<Genotype>,
    population: u32,
    mu: f64,
    neighbours: Vec<LatticePoint>,
}

impl Patch {
    pub fn new(coordinate: Coordinate, genotypes: usize, neighbours: Vec<LatticePoint>) -> Self {
        Self {
            coordinate,
            counts: vec![0; genotypes],
            existent: Vec::new(),
            population: 0,
            mu: 0.0,
            neighbours,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn point(&self) -> LatticePoint {
        self.coordinate.to_point()
    }

    pub fn population(&self) -> u32 {
        self.population
    }

    pub fn is_empty(&self) -> bool {
        self.population == 0
    }

    /// Resource supply term
    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn set_mu(&mut self, mu: f64) {
        self.mu = mu;
    }

    /// Genotypes present, in order of arrival
    pub fn existent(&self) -> &[Genotype] {
        &self.existent
    }

    #[inline]
    pub fn count(&self, genotype: Genotype) -> u32 {
        self.counts[genotype.index()]
    }

    #[inline]
    pub fn genotype_at(&self, existent_idx: usize) -> Genotype {
        self.existent[existent_idx]
    }

    /// Periodic Moore neighbourhood, fixed at construction
    pub fn neighbours(&self) -> &[LatticePoint] {
        &self.neighbours
    }

    /// Add one individual; returns true if the genotype was not present before
    pub(crate) fn add_individual(&mut self, genotype: Genotype) -> bool {
        let slot = &mut self.counts[genotype.index()];
        let novel = *slot == 0;
        if novel {
            self.existent.push(genotype);
        }
        *slot += 1;
        self.population += 1;
        novel
    }

    /// Remove one individual of the genotype at `existent_idx`.
    ///
    /// When its count reaches zero the genotype leaves the existent list;
    /// later entries keep their relative order.
    pub(crate) fn remove_at(&mut self, existent_idx: usize) -> Genotype {
        let genotype = self.existent[existent_idx];
        let slot = &mut self.counts[genotype.index()];
        assert!(*slot > 0, "existent genotype {} has zero count", genotype);
        *slot -= 1;
        self.population -= 1;
        if *slot == 0 {
            self.existent.remove(existent_idx);
        }
        genotype
    }

    /// Tab-terminated existent genotypes, as written to the per-patch log
    pub fn existent_line(&self) -> String {
        let mut line = String::with_capacity(self.existent.len() * 5);
        for genotype in &self.existent {
            line.push_str(&genotype.to_string());
            line.push('\t');
        }
        line
    }

    /// Verify the dense/sparse bookkeeping agrees
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut sum = 0u64;
        for genotype in &self.existent {
            let count = self.count(*genotype);
            if count == 0 {
                return Err(format!(
                    "patch {}: genotype {} listed with zero count",
                    self.coordinate, genotype
                ));
            }
            sum += count as u64;
        }
        let listed = self.existent.len();
        let positive = self.counts.iter().filter(|&&c| c > 0).count();
        if listed != positive {
            return Err(format!(
                "patch {}: {} genotypes listed but {} have positive counts",
                self.coordinate, listed, positive
            ));
        }
        if sum != self.population as u64 {
            return Err(format!(
                "patch {}: counts sum to {} but population is {}",
                self.coordinate, sum, self.population
            ));
        }
        Ok(())
    }
}
