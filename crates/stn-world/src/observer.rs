//! Hooks called by the scheduler at each generation boundary.

use crate::lattice::Lattice;
use stn_core::{GenerationSummary, Result};

/// Receives the lattice and summary once per generation boundary
pub trait GenerationObserver {
    fn on_generation(&mut self, lattice: &Lattice, summary: &GenerationSummary) -> Result<()>;

    /// Called once after the run reaches a terminal state
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<O: GenerationObserver + ?Sized> GenerationObserver for &mut O {
    fn on_generation(&mut self, lattice: &Lattice, summary: &GenerationSummary) -> Result<()> {
        (**self).on_generation(lattice, summary)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl GenerationObserver for NullObserver {
    fn on_generation(&mut self, _lattice: &Lattice, _summary: &GenerationSummary) -> Result<()> {
        Ok(())
    }
}

/// Keeps every summary in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub summaries: Vec<GenerationSummary>,
    pub finished: bool,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&GenerationSummary> {
        self.summaries.last()
    }
}

impl GenerationObserver for RecordingObserver {
    fn on_generation(&mut self, _lattice: &Lattice, summary: &GenerationSummary) -> Result<()> {
        self.summaries.push(*summary);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
