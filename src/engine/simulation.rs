//! Generation stepping and the play/step/stop/reset state machine

use crate::config::BoundaryCondition;
use crate::error::{EngineError, Result};
use crate::life::{Grid, RuleSet, SeedInitializer};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Run state of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Freshly built or reset, at generation 0
    Ready,
    /// Auto-stepping; the driver calls [`Simulation::tick`]
    Running,
    Paused,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Ready => "ready",
            RunState::Running => "running",
            RunState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Construction parameters for [`Simulation::new`]
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub width: usize,
    pub height: usize,
    pub density: f64,
    pub rules: RuleSet,
    pub boundary_condition: BoundaryCondition,
    /// `None` draws a seed from OS entropy
    pub seed: Option<u64>,
}

/// Evolves a grid one whole generation at a time.
///
/// Each generation is an immutable [`Grid`] behind an `Arc`; stepping swaps in
/// a newly computed grid, so a snapshot taken by a renderer is always a
/// complete generation.
pub struct Simulation {
    initial: Arc<Grid>,
    current: Arc<Grid>,
    previous: Option<Arc<Grid>>,
    generation: u64,
    rules: RuleSet,
    state: RunState,
    seed: u64,
    rng: ChaCha8Rng,
    /// Random source as it stood at generation 0, restored by `reset`
    initial_rng: ChaCha8Rng,
}

/// Build a simulation with a random generation-0 grid
pub fn create_simulation(
    width: usize,
    height: usize,
    initial_density: f64,
    rules: RuleSet,
    boundary_condition: BoundaryCondition,
    seed: Option<u64>,
) -> Result<Simulation> {
    Simulation::new(SimulationParams {
        width,
        height,
        density: initial_density,
        rules,
        boundary_condition,
        seed,
    })
}

impl Simulation {
    pub fn new(params: SimulationParams) -> Result<Self> {
        let seed = params.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = SeedInitializer::initialize(
            params.width,
            params.height,
            params.density,
            params.boundary_condition,
            &mut rng,
        )?;

        info!(
            width = params.width,
            height = params.height,
            density = params.density,
            seed,
            rules = %params.rules,
            "Created simulation with {} live cells",
            grid.living_count()
        );
        Ok(Self::assemble(grid, params.rules, seed, rng))
    }

    /// Start from a caller-supplied generation-0 grid
    pub fn from_grid(grid: Grid, rules: RuleSet, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        info!(
            width = grid.width(),
            height = grid.height(),
            seed,
            rules = %rules,
            "Created simulation from custom grid with {} live cells",
            grid.living_count()
        );
        Self::assemble(grid, rules, seed, ChaCha8Rng::seed_from_u64(seed))
    }

    fn assemble(grid: Grid, rules: RuleSet, seed: u64, rng: ChaCha8Rng) -> Self {
        let initial = Arc::new(grid);
        Self {
            current: Arc::clone(&initial),
            initial,
            previous: None,
            generation: 0,
            rules,
            state: RunState::Ready,
            seed,
            initial_rng: rng.clone(),
            rng,
        }
    }

    /// READY or PAUSED to RUNNING
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            RunState::Ready | RunState::Paused => {
                info!(generation = self.generation, "Playing");
                self.state = RunState::Running;
                Ok(())
            }
            RunState::Running => Err(self.reject("play")),
        }
    }

    /// RUNNING to PAUSED; the current generation is kept
    pub fn stop(&mut self) -> Result<()> {
        match self.state {
            RunState::Running => {
                info!(generation = self.generation, "Stopped");
                self.state = RunState::Paused;
                Ok(())
            }
            _ => Err(self.reject("stop")),
        }
    }

    /// Advance exactly one generation by hand, leaving the simulation PAUSED
    pub fn step(&mut self) -> Result<()> {
        match self.state {
            RunState::Ready | RunState::Paused => {
                self.advance();
                self.state = RunState::Paused;
                Ok(())
            }
            RunState::Running => Err(self.reject("step")),
        }
    }

    /// One generation of auto-stepping, called by the driver's timer while RUNNING
    pub fn tick(&mut self) -> Result<()> {
        match self.state {
            RunState::Running => {
                self.advance();
                Ok(())
            }
            _ => Err(self.reject("tick")),
        }
    }

    /// Back to generation 0 from any state
    pub fn reset(&mut self) {
        info!(from_generation = self.generation, "Reset");
        self.current = Arc::clone(&self.initial);
        self.previous = None;
        self.generation = 0;
        self.rng = self.initial_rng.clone();
        self.state = RunState::Ready;
    }

    fn reject(&self, action: &'static str) -> EngineError {
        warn!(state = %self.state, action, "Rejected transition");
        EngineError::InvalidTransition {
            from: self.state,
            action,
        }
    }

    fn advance(&mut self) {
        let started = Instant::now();
        let next = self.rules.evolve(&self.current, &mut self.rng);
        self.previous = Some(std::mem::replace(&mut self.current, Arc::new(next)));
        self.generation += 1;

        debug!(
            generation = self.generation,
            living = self.current.living_count(),
            "Generation computed"
        );
        trace!(elapsed_us = started.elapsed().as_micros() as u64, "Step timing");
    }

    /// Snapshot of the current generation
    pub fn current_grid(&self) -> Arc<Grid> {
        Arc::clone(&self.current)
    }

    pub fn initial_grid(&self) -> &Grid {
        &self.initial
    }

    pub fn generation_index(&self) -> u64 {
        self.generation
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Seed of the random source, also when it was drawn from entropy
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn boundary_condition(&self) -> BoundaryCondition {
        self.current.boundary_condition()
    }

    /// No live cells remain
    pub fn is_extinct(&self) -> bool {
        self.current.is_empty()
    }

    /// The last step left the grid unchanged; false at generation 0
    pub fn is_stable(&self) -> bool {
        self.previous
            .as_ref()
            .is_some_and(|previous| **previous == *self.current)
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("width", &self.current.width())
            .field("height", &self.current.height())
            .field("generation", &self.generation)
            .field("state", &self.state)
            .field("rules", &self.rules)
            .field("seed", &self.seed)
            .finish()
    }
}
