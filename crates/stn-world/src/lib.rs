//! Spatial world for the Tangled Nature simulation.
//!
//! A periodic cubic lattice of patches, each holding a sub-population spread
//! across genotypes. The scheduler repeatedly selects an occupied patch and
//! applies reproduction, annihilation and migration to one of its occupants.

pub mod patch;
pub mod lattice;
pub mod resources;
pub mod selection;
pub mod dynamics;
pub mod observer;
pub mod logfile;
pub mod simulation;

pub use patch::Patch;
pub use lattice::{neighbours_of, Lattice};
pub use dynamics::Dynamics;
pub use observer::{GenerationObserver, NullObserver, RecordingObserver};
pub use logfile::{write_initial_state, LogDirectory};
pub use simulation::{Simulation, SimulationState};
