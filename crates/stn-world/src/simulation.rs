//! Simulation scheduler: drives steps, generations and termination.

use crate::dynamics::Dynamics;
use crate::lattice::Lattice;
use crate::observer::GenerationObserver;
use crate::resources;
use crate::selection::select_occupied;
use stn_core::{
    Coordinate, Error, GenerationSummary, Genotype, ModelConfig, RandomStream, Result,
    RunConfig, RunOutcome, StartPosition,
};
use stn_genome::GenotypeModel;
use tracing::{debug, info, instrument};

/// Scheduler state after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Running,
    /// The step just taken closed a generation
    GenerationBoundary(GenerationSummary),
    /// The occupied index emptied
    Extinct,
    /// The generation budget was used up
    Completed,
}

impl SimulationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SimulationState::Extinct | SimulationState::Completed)
    }
}

pub struct Simulation<R> {
    model: GenotypeModel,
    lattice: Lattice,
    dynamics: Dynamics,
    run: RunConfig,
    rng: R,
    start: Option<Coordinate>,
    state: SimulationState,
    generation: u64,
    step: u64,
    total_steps: u64,
    tau: u64,
    // Event counters for the end-of-run summary
    births: u64,
    deaths: u64,
    migrations: u64,
}

impl<R: RandomStream> Simulation<R> {
    /// Validate `config` and build the initial state from `rng`.
    ///
    /// Draw order: interaction tables, resources, start coordinate (if
    /// random), then one genotype draw per founding individual.
    pub fn new(config: &ModelConfig, mut rng: R) -> Result<Self> {
        config.validate()?;

        let model = GenotypeModel::generate(&config.genotype, &mut rng);
        let size = config.lattice.size;
        let mut lattice = Lattice::new(size, model.space().size());
        resources::distribute(&mut lattice, config.lattice.resources, &mut rng);

        let start = match config.lattice.start {
            StartPosition::Fixed { x, y, z } => Coordinate::new(x, y, z),
            StartPosition::Random => {
                let max = size as usize - 1;
                let i = rng.int_in_range(0, max) as u8;
                let j = rng.int_in_range(0, max) as u8;
                let k = rng.int_in_range(0, max) as u8;
                Coordinate::new(i, j, k)
            }
        };

        let point = start.to_point();
        let max_genotype = model.space().size() - 1;
        for _ in 0..config.run.initial_population {
            let genotype = Genotype::new(rng.int_in_range(0, max_genotype) as u32);
            lattice.add_individual(point, genotype);
        }

        info!(
            size,
            bits = config.genotype.bits,
            initial_population = config.run.initial_population,
            %start,
            "Initialised lattice"
        );

        let dynamics = Dynamics::new(&config.dynamics, &model);
        let mut simulation = Self::from_parts(model, lattice, dynamics, config.run.clone(), rng);
        simulation.start = Some(start);
        Ok(simulation)
    }

    /// Assemble a simulation from prepared parts
    pub fn from_parts(
        model: GenotypeModel,
        lattice: Lattice,
        dynamics: Dynamics,
        run: RunConfig,
        rng: R,
    ) -> Self {
        let tau = generation_length(lattice.total_population(), dynamics.p_kill());
        let start = lattice.occupied().first().map(|p| p.coordinate());
        Self {
            model,
            lattice,
            dynamics,
            run,
            rng,
            start,
            state: SimulationState::Running,
            generation: 0,
            step: 0,
            total_steps: 0,
            tau,
            births: 0,
            deaths: 0,
            migrations: 0,
        }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Coordinate the founding population was placed on
    pub fn start(&self) -> Option<Coordinate> {
        self.start
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Generations completed so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Steps taken within the current generation
    pub fn step_in_generation(&self) -> u64 {
        self.step
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Step budget of the current generation
    pub fn tau(&self) -> u64 {
        self.tau
    }

    /// Terminal outcome, once one has been reached
    pub fn outcome(&self) -> Option<RunOutcome> {
        match self.state {
            SimulationState::Extinct => Some(RunOutcome::Extinct {
                generation: self.generation,
                steps: self.total_steps,
            }),
            SimulationState::Completed => Some(RunOutcome::Completed {
                generations: self.generation,
            }),
            _ => None,
        }
    }

    /// Lattice bookkeeping check, surfaced as an error
    pub fn check_invariants(&self) -> Result<()> {
        self.lattice.check_invariants().map_err(Error::InvalidState)
    }

    /// Advance by one step: select a patch, reproduce, then annihilate or
    /// migrate. Terminal states are returned unchanged.
    pub fn step<O: GenerationObserver>(&mut self, observer: &mut O) -> Result<SimulationState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        let Some(point) = select_occupied(&self.lattice, self.dynamics.selection(), &mut self.rng)
        else {
            self.state = SimulationState::Extinct;
            return Ok(self.state);
        };

        let before = self.lattice.total_population();
        let idx = self
            .dynamics
            .reproduce(&mut self.lattice, point, &self.model, &mut self.rng);
        if self.lattice.total_population() > before {
            self.births += 1;
        }

        if self
            .dynamics
            .annihilate(&mut self.lattice, point, idx, &mut self.rng)
        {
            self.deaths += 1;
        } else if self
            .dynamics
            .migrate(&mut self.lattice, point, idx, &mut self.rng)
            .is_some()
        {
            self.migrations += 1;
        }

        self.step += 1;
        self.total_steps += 1;

        self.state = if self.step == self.tau {
            let summary = self.close_generation(observer)?;
            if self.generation >= self.run.generations {
                SimulationState::Completed
            } else if self.lattice.is_extinct() {
                SimulationState::Extinct
            } else {
                SimulationState::GenerationBoundary(summary)
            }
        } else if self.lattice.is_extinct() {
            SimulationState::Extinct
        } else {
            SimulationState::Running
        };

        Ok(self.state)
    }

    fn close_generation<O: GenerationObserver>(&mut self, observer: &mut O) -> Result<GenerationSummary> {
        self.step = 0;
        self.generation += 1;
        let total = self.lattice.total_population();
        self.tau = generation_length(total, self.dynamics.p_kill());

        let summary = GenerationSummary {
            generation: self.generation,
            total_population: total,
            occupied_patches: self.lattice.occupied().len(),
            distinct_genotypes: self.lattice.distinct_genotypes(self.model.space().size()),
            tau: self.tau,
        };
        observer.on_generation(&self.lattice, &summary)?;

        let interval = (self.run.generations / 100).max(1);
        if self.generation % interval == 0 {
            info!(
                generation = summary.generation,
                total_population = summary.total_population,
                occupied_patches = summary.occupied_patches,
                distinct_genotypes = summary.distinct_genotypes,
                tau = summary.tau,
                "Generation {}/{}",
                summary.generation,
                self.run.generations
            );
        } else {
            debug!(generation = summary.generation, total_population = total, "Generation closed");
        }

        Ok(summary)
    }

    /// Step until extinction or the generation budget is exhausted
    #[instrument(skip(self, observer), fields(generations = self.run.generations, tau = self.tau))]
    pub fn run<O: GenerationObserver>(&mut self, observer: &mut O) -> Result<RunOutcome> {
        info!(
            "Starting simulation: {} individuals, first generation of {} steps",
            self.lattice.total_population(),
            self.tau
        );

        let outcome = loop {
            self.step(observer)?;
            if let Some(outcome) = self.outcome() {
                break outcome;
            }
        };
        observer.finish()?;

        self.emit_run_summary(&outcome);
        Ok(outcome)
    }

    fn emit_run_summary(&self, outcome: &RunOutcome) {
        info!(
            event = "run_summary",
            extinct = outcome.is_extinct(),
            generations = self.generation,
            total_steps = self.total_steps,
            births = self.births,
            deaths = self.deaths,
            migrations = self.migrations,
            final_population = self.lattice.total_population(),
            occupied_patches = self.lattice.occupied().len(),
            "{}",
            outcome.status_message()
        );
    }
}

/// Steps per generation: population divided by the death probability,
/// rounded to the nearest integer
pub fn generation_length(total_population: u64, p_kill: f64) -> u64 {
    (total_population as f64 / p_kill).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{NullObserver, RecordingObserver};
    use stn_core::{
        DynamicsConfig, GenotypeConfig, LatticeConfig, LatticePoint, ScriptedStream, SeededStream,
    };
    use stn_genome::{GenotypeSpace, InteractionMatrix};

    fn small_config(seed: u64) -> ModelConfig {
        ModelConfig {
            genotype: GenotypeConfig {
                bits: 6,
                ..Default::default()
            },
            lattice: LatticeConfig {
                size: 3,
                start: StartPosition::Fixed { x: 1, y: 1, z: 1 },
                ..Default::default()
            },
            run: RunConfig {
                generations: 20,
                initial_population: 30,
                seed: Some(seed),
            },
            ..Default::default()
        }
    }

    /// Four-bit model with no interactions; each patch gets mu 0 so p_off is 0.5
    fn silent_parts(p_kill: f64) -> (GenotypeModel, Dynamics) {
        let model = GenotypeModel::from_parts(
            GenotypeSpace::new(4),
            InteractionMatrix::from_parts(vec![0.0; 16], vec![0.0; 16], vec![false; 16]),
        );
        let dynamics = Dynamics::new(
            &DynamicsConfig {
                p_mut: 0.0,
                p_kill,
                p_move: 0.0,
                ..Default::default()
            },
            &model,
        );
        (model, dynamics)
    }

    #[test]
    fn test_generation_length() {
        assert_eq!(generation_length(100, 0.2), 500);
        assert_eq!(generation_length(1, 0.3), 3);
        assert_eq!(generation_length(0, 0.2), 0);
    }

    #[test]
    fn test_new_places_founders_on_start() {
        let config = small_config(7);
        let sim = Simulation::new(&config, SeededStream::from_seed_u64(7)).unwrap();

        let start = LatticePoint::from_coords(1, 1, 1);
        assert_eq!(sim.start(), Some(Coordinate::new(1, 1, 1)));
        assert_eq!(sim.lattice().occupied(), &[start]);
        assert_eq!(sim.lattice().patch(start).population(), 30);
        assert_eq!(sim.tau(), 150);
        assert_eq!(sim.state(), SimulationState::Running);
        assert!(sim.check_invariants().is_ok());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = small_config(1);
        config.genotype.bits = 1;
        config.lattice.size = 12;
        let err = Simulation::new(&config, ScriptedStream::new(Vec::new())).err().unwrap();
        match err {
            Error::InvalidConfig(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_random_start_uses_three_draws() {
        let mut config = small_config(3);
        config.lattice.start = StartPosition::Random;
        config.run.initial_population = 1;

        // 64 genotypes * 3 draws for the tables, then i, j, k, then one founder
        let mut draws = vec![0.5; 64 * 3];
        draws.extend([0.0, 0.5, 0.99, 0.0]);
        let sim = Simulation::new(&config, ScriptedStream::new(draws)).unwrap();

        assert_eq!(sim.start(), Some(Coordinate::new(0, 1, 2)));
        let patch = sim.lattice().patch(LatticePoint::from_coords(0, 1, 2));
        assert_eq!(patch.existent(), &[Genotype::new(0)]);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let config = small_config(11);
        let mut a = Simulation::new(&config, SeededStream::from_seed_u64(11)).unwrap();
        let mut b = Simulation::new(&config, SeededStream::from_seed_u64(11)).unwrap();
        let mut obs_a = RecordingObserver::new();
        let mut obs_b = RecordingObserver::new();

        let outcome_a = a.run(&mut obs_a).unwrap();
        let outcome_b = b.run(&mut obs_b).unwrap();

        assert_eq!(outcome_a, outcome_b);
        assert_eq!(obs_a.summaries, obs_b.summaries);
        assert!(obs_a.finished);
    }

    #[test]
    fn test_budget_exhaustion_completes() {
        let config = small_config(5);
        let mut sim = Simulation::new(&config, SeededStream::from_seed_u64(5)).unwrap();
        let mut observer = RecordingObserver::new();

        let outcome = sim.run(&mut observer).unwrap();
        match outcome {
            RunOutcome::Completed { generations } => {
                assert_eq!(generations, 20);
                assert_eq!(observer.summaries.len(), 20);
            }
            RunOutcome::Extinct { generation, .. } => {
                assert_eq!(observer.summaries.len() as u64, generation);
            }
        }
        for (n, summary) in observer.summaries.iter().enumerate() {
            assert_eq!(summary.generation, n as u64 + 1);
        }
        assert!(sim.check_invariants().is_ok());
    }

    #[test]
    fn test_single_death_is_extinction() {
        let (model, dynamics) = silent_parts(1.0);
        let mut lattice = Lattice::new(3, 16);
        lattice.add_individual(LatticePoint::from_coords(0, 0, 0), Genotype::new(2));
        let run = RunConfig {
            generations: 10,
            initial_population: 1,
            seed: None,
        };
        // Select, pick slot 0, fail to reproduce (p_off 0.5), die
        let rng = ScriptedStream::new([0.0, 0.0, 0.9, 0.0]);
        let mut sim = Simulation::from_parts(model, lattice, dynamics, run, rng);
        assert_eq!(sim.tau(), 1);

        let mut observer = RecordingObserver::new();
        // tau is 1, so the step closes a generation and then sees extinction
        assert_eq!(sim.step(&mut observer).unwrap(), SimulationState::Extinct);
        assert_eq!(observer.summaries.len(), 1);
        assert_eq!(observer.summaries[0].total_population, 0);
        assert_eq!(observer.summaries[0].tau, 0);
        assert_eq!(
            sim.outcome(),
            Some(RunOutcome::Extinct {
                generation: 1,
                steps: 1
            })
        );

        // Terminal states are sticky and draw nothing
        assert_eq!(sim.step(&mut observer).unwrap(), SimulationState::Extinct);
        assert_eq!(sim.total_steps(), 1);
    }

    #[test]
    fn test_extinction_mid_generation() {
        let (model, dynamics) = silent_parts(0.5);
        let mut lattice = Lattice::new(3, 16);
        lattice.add_individual(LatticePoint::from_coords(2, 2, 2), Genotype::new(5));
        let run = RunConfig::default();
        let rng = ScriptedStream::new([0.3, 0.0, 0.9, 0.1]);
        let mut sim = Simulation::from_parts(model, lattice, dynamics, run, rng);
        assert_eq!(sim.tau(), 2);

        let mut observer = NullObserver;
        assert_eq!(sim.step(&mut observer).unwrap(), SimulationState::Extinct);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.step_in_generation(), 1);
    }

    #[test]
    fn test_boundary_reports_summary_and_recomputes_tau() {
        let (model, dynamics) = silent_parts(0.5);
        let mut lattice = Lattice::new(3, 16);
        lattice.add_individual(LatticePoint::from_coords(0, 0, 0), Genotype::new(1));
        let run = RunConfig::default();
        // Two steps of: select, slot 0, reproduce, four unflipped bits, no
        // death, no move
        let one_step = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.9, 0.9];
        let rng = ScriptedStream::new(one_step.iter().chain(one_step.iter()).copied());
        let mut sim = Simulation::from_parts(model, lattice, dynamics, run, rng);
        assert_eq!(sim.tau(), 2);

        let mut observer = RecordingObserver::new();
        assert_eq!(sim.step(&mut observer).unwrap(), SimulationState::Running);
        let state = sim.step(&mut observer).unwrap();

        let expected = GenerationSummary {
            generation: 1,
            total_population: 3,
            occupied_patches: 1,
            distinct_genotypes: 1,
            tau: 6,
        };
        assert_eq!(state, SimulationState::GenerationBoundary(expected));
        assert_eq!(observer.summaries, vec![expected]);
        assert_eq!(sim.tau(), 6);
        assert_eq!(sim.step_in_generation(), 0);
    }

    #[test]
    fn test_empty_lattice_is_extinct_without_draws() {
        let (model, dynamics) = silent_parts(0.2);
        let lattice = Lattice::new(3, 16);
        let mut sim = Simulation::from_parts(model, lattice, dynamics, RunConfig::default(), ScriptedStream::new(Vec::new()));
        assert_eq!(sim.start(), None);

        let outcome = sim.run(&mut NullObserver).unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Extinct {
                generation: 0,
                steps: 0
            }
        );
    }
}
