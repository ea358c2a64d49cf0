//! Plain-text run logs in an output directory.
//!
//! Layout:
//! - `initial_state_log.txt`: parameters, seed, per-patch mu and the start
//! - `population_log.txt`: one `generation<TAB>total` line per generation
//! - `existent_genotypes_{i}{j}{k}.txt`: one line of tab-terminated genotype
//!   ids per generation for every patch

use crate::lattice::Lattice;
use crate::observer::GenerationObserver;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use stn_core::{Coordinate, GenerationSummary, ModelConfig, Result};
use tracing::debug;

pub const POPULATION_LOG: &str = "population_log.txt";
pub const INITIAL_STATE_LOG: &str = "initial_state_log.txt";

/// File name of the per-patch genotype log
pub fn existent_log_name(coordinate: Coordinate) -> String {
    format!(
        "existent_genotypes_{}{}{}.txt",
        coordinate.i, coordinate.j, coordinate.k
    )
}

/// Writes per-generation logs into a directory that must already exist
pub struct LogDirectory {
    population: BufWriter<File>,
    /// One writer per patch, in lattice iteration order
    patches: Vec<BufWriter<File>>,
}

impl LogDirectory {
    pub fn create(root: impl AsRef<Path>, lattice: &Lattice) -> Result<Self> {
        let root = root.as_ref();
        let population = BufWriter::new(File::create(root.join(POPULATION_LOG))?);
        let patches = lattice
            .patches()
            .map(|patch| {
                let path = root.join(existent_log_name(patch.coordinate()));
                Ok(BufWriter::new(File::create(path)?))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(root = %root.display(), files = patches.len() + 1, "Opened generation logs");
        Ok(Self {
            population,
            patches,
        })
    }
}

impl GenerationObserver for LogDirectory {
    fn on_generation(&mut self, lattice: &Lattice, summary: &GenerationSummary) -> Result<()> {
        for (patch, out) in lattice.patches().zip(self.patches.iter_mut()) {
            writeln!(out, "{}", patch.existent_line())?;
        }
        writeln!(self.population, "{}", summary.log_line())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        for out in &mut self.patches {
            out.flush()?;
        }
        self.population.flush()?;
        Ok(())
    }
}

/// Format a real with six significant digits, like `%g`: fixed notation for
/// decimal exponents in [-4, 6), scientific otherwise, with trailing zeros
/// and any trailing point removed
pub fn format_real(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    // Exponent after rounding to six significant digits
    let scientific = format!("{:.5e}", value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..6).contains(&exponent) {
        let decimals = (5 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Write `initial_state_log.txt` describing the parameters, the resource
/// landscape and the starting coordinate
pub fn write_initial_state(
    root: impl AsRef<Path>,
    config: &ModelConfig,
    seed: Option<u64>,
    lattice: &Lattice,
    start: Coordinate,
) -> Result<()> {
    let path = root.as_ref().join(INITIAL_STATE_LOG);
    let mut out = BufWriter::new(File::create(&path)?);
    write_initial_state_to(&mut out, config, seed, lattice, start)?;
    out.flush()?;
    Ok(())
}

fn write_initial_state_to<W: Write>(
    out: &mut W,
    config: &ModelConfig,
    seed: Option<u64>,
    lattice: &Lattice,
    start: Coordinate,
) -> Result<()> {
    writeln!(
        out,
        "g{}\tL{}\tX{}\tp{}\tt{}\t",
        config.run.generations,
        config.genotype.bits,
        config.lattice.size,
        config.run.initial_population,
        format_real(config.genotype.theta)
    )?;
    writeln!(
        out,
        "m{}\tk{}\tv{}\tc{}",
        format_real(config.dynamics.p_mut),
        format_real(config.dynamics.p_kill),
        format_real(config.dynamics.p_move),
        format_real(config.dynamics.c_r)
    )?;
    if let Some(seed) = seed {
        writeln!(out, "s{}", seed)?;
    }
    writeln!(out)?;

    writeln!(out, "x\ty\tz\t")?;
    let size = lattice.size();
    for k in 0..size {
        for j in 0..size {
            for i in 0..size {
                let mu = lattice.patch_at(Coordinate::new(i, j, k)).mu();
                writeln!(out, "{}\t{}\t{}\t{}", i, j, k, format_real(mu))?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Starting coordinates: {}", start)?;
    Ok(())
}
