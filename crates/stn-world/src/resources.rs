//! Placement of the resource term mu across the lattice.

use crate::lattice::Lattice;
use stn_core::{RandomStream, ResourceDistribution};
use tracing::debug;

/// Assign mu to every patch according to `policy`
pub fn distribute<R: RandomStream>(lattice: &mut Lattice, policy: ResourceDistribution, rng: &mut R) {
    match policy {
        ResourceDistribution::Fixed { value } => {
            for patch in lattice.patches_mut() {
                patch.set_mu(value);
            }
        }
        ResourceDistribution::CubicShell => distribute_cubic_shell(lattice, rng),
        ResourceDistribution::Gradient => distribute_gradient(lattice, rng),
    }

    let (min, max) = lattice
        .patches()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.mu()), hi.max(p.mu()))
        });
    debug!(?policy, min_mu = min, max_mu = max, "Distributed resources");
}

/// Truncate toward zero onto the 0.001 grid
fn truncate_to_milli(mu: f64) -> f64 {
    mu - mu % 0.001
}

/// Nested cube shells, one per frame length X, X-2, ... > 0.
///
/// Every patch on the surface of the centred cube of side `frame` gets
/// `frame / (10 X)` plus noise in `[-0.005, 0.005)`, so outer shells are
/// richer than inner ones.
fn distribute_cubic_shell<R: RandomStream>(lattice: &mut Lattice, rng: &mut R) {
    let size = lattice.size() as i32;
    let x = size as f64;

    let mut frame = size;
    while frame > 0 {
        let lo = (size - frame) / 2;
        let hi = (size + frame) / 2 - 1;
        let on_edge = |c: u8| c as i32 == lo || c as i32 == hi;
        let inside = |c: u8| (lo..=hi).contains(&(c as i32));

        for patch in lattice.patches_mut() {
            let c = patch.coordinate();
            if inside(c.i) && inside(c.j) && inside(c.k) && (on_edge(c.i) || on_edge(c.j) || on_edge(c.k)) {
                let mu = frame as f64 / (10.0 * x) + rng.real_in_range(-1.0, 1.0) / 200.0;
                patch.set_mu(truncate_to_milli(mu));
            }
        }

        frame -= 2;
    }
}

/// Linear decline along the i axis; each patch redraws until mu is positive
fn distribute_gradient<R: RandomStream>(lattice: &mut Lattice, rng: &mut R) {
    let x = lattice.size() as f64;

    for patch in lattice.patches_mut() {
        let i = patch.coordinate().i as f64;
        let mu = loop {
            let mu = truncate_to_milli(0.1 - i / (10.0 * x) + rng.real_in_range(-1.0, 1.0) / 100.0);
            if mu > 0.0 {
                break mu;
            }
        };
        patch.set_mu(mu);
    }
}
