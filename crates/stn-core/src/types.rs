//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single axis coordinate on the lattice
pub type LatticeCoord = u8;

/// Genotype label: an L-bit pattern stored in the low bits of a `u32`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Genotype(pub u32);

impl Genotype {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }

    /// Index into dense per-genotype arrays
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Value of bit `bit` (bit 0 is the least significant)
    #[inline]
    pub fn bit(&self, bit: u32) -> bool {
        (self.0 >> bit) & 1 == 1
    }

    /// Copy of this genotype with bit `bit` inverted
    #[inline]
    pub fn with_bit_flipped(&self, bit: u32) -> Self {
        Self(self.0 ^ (1 << bit))
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 3D position on the cubic lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub i: LatticeCoord,
    pub j: LatticeCoord,
    pub k: LatticeCoord,
}

impl Coordinate {
    pub fn new(i: LatticeCoord, j: LatticeCoord, k: LatticeCoord) -> Self {
        Self { i, j, k }
    }

    /// Offset by a delta on each axis, wrapping periodically on a lattice of side `size`
    pub fn offset_wrapped(&self, di: i32, dj: i32, dk: i32, size: u8) -> Self {
        let size = size as i32;
        let wrap = |c: LatticeCoord, d: i32| (c as i32 + d).rem_euclid(size) as LatticeCoord;
        Self {
            i: wrap(self.i, di),
            j: wrap(self.j, dj),
            k: wrap(self.k, dk),
        }
    }

    /// Whether every axis is strictly below `size`
    pub fn within(&self, size: u8) -> bool {
        self.i < size && self.j < size && self.k < size
    }

    pub fn to_point(&self) -> LatticePoint {
        LatticePoint::from(*self)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.i, self.j, self.k)
    }
}

/// A coordinate packed into one integer: `i + (j << 8) + (k << 16)`.
///
/// Used as the occupied-index key and as the scalar written to logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LatticePoint(pub u32);

impl LatticePoint {
    pub fn from_coords(i: LatticeCoord, j: LatticeCoord, k: LatticeCoord) -> Self {
        Self(i as u32 | (j as u32) << 8 | (k as u32) << 16)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn i(&self) -> LatticeCoord {
        (self.0 & 0xff) as LatticeCoord
    }

    pub fn j(&self) -> LatticeCoord {
        ((self.0 & 0xff00) >> 8) as LatticeCoord
    }

    pub fn k(&self) -> LatticeCoord {
        ((self.0 & 0xff0000) >> 16) as LatticeCoord
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.i(), self.j(), self.k())
    }
}

impl From<Coordinate> for LatticePoint {
    fn from(c: Coordinate) -> Self {
        Self::from_coords(c.i, c.j, c.k)
    }
}

impl From<LatticePoint> for Coordinate {
    fn from(p: LatticePoint) -> Self {
        p.coordinate()
    }
}

impl fmt::Display for LatticePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
