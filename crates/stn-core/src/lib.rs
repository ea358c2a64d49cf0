//! Core types and utilities for the spatial Tangled Nature simulation.

pub mod types;
pub mod config;
pub mod error;
pub mod rng;
pub mod summary;

pub use error::{ConfigErrors, Error, Result};
pub use types::*;
pub use config::*;
pub use rng::{RandomStream, ScriptedStream, SeededStream};
pub use summary::*;
