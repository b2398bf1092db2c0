//! Caller-side driver: plays a simulation until a soft stop

use super::simulation::Simulation;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument};

/// Soft-stop conditions checked after every generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopPolicy {
    pub max_generations: Option<u64>,
    pub stop_on_extinction: bool,
    pub stop_on_stable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Extinct,
    Stable,
    MaxGenerations,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::Extinct => "extinction",
            StopReason::Stable => "equilibrium",
            StopReason::MaxGenerations => "generation cap",
        };
        f.write_str(text)
    }
}

/// Outcome of one driven run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub reason: StopReason,
    pub generations: u64,
    pub seed: u64,
    pub rules: String,
    pub initial_living: usize,
    pub final_living: usize,
    /// Live-cell count per generation, starting at generation 0
    pub population: Vec<usize>,
}

pub struct Runner {
    policy: StopPolicy,
}

impl Runner {
    /// Rejects a policy that could never end a run
    pub fn new(policy: StopPolicy) -> Result<Self> {
        if policy.max_generations.is_none() && !policy.stop_on_extinction && !policy.stop_on_stable {
            return Err(EngineError::invalid(
                "A run needs a generation cap or at least one soft-stop condition",
            ));
        }
        Ok(Self { policy })
    }

    pub fn run(&self, sim: &mut Simulation) -> Result<RunReport> {
        self.run_with(sim, |_| {})
    }

    /// Play `sim` until a stop reason applies, then stop it.
    ///
    /// `observe` sees the starting generation and every generation after it,
    /// the way a renderer would.
    #[instrument(skip_all, fields(seed = sim.seed()))]
    pub fn run_with<F>(&self, sim: &mut Simulation, mut observe: F) -> Result<RunReport>
    where
        F: FnMut(&Simulation),
    {
        let mut population = vec![sim.current_grid().living_count()];
        observe(sim);

        sim.play()?;
        let reason = loop {
            if self
                .policy
                .max_generations
                .is_some_and(|cap| sim.generation_index() >= cap)
            {
                break StopReason::MaxGenerations;
            }

            sim.tick()?;
            population.push(sim.current_grid().living_count());
            observe(sim);

            if self.policy.stop_on_extinction && sim.is_extinct() {
                break StopReason::Extinct;
            }
            if self.policy.stop_on_stable && sim.is_stable() {
                break StopReason::Stable;
            }
        };
        sim.stop()?;

        info!(
            generation = sim.generation_index(),
            "Run ended by {}", reason
        );

        Ok(RunReport {
            reason,
            generations: sim.generation_index(),
            seed: sim.seed(),
            rules: sim.rules().to_string(),
            initial_living: population[0],
            final_living: population.last().copied().unwrap_or_default(),
            population,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundaryCondition;
    use crate::engine::{create_simulation, RunState};
    use crate::life::{Pattern, RuleSet};

    fn policy(max_generations: Option<u64>, extinction: bool, stable: bool) -> StopPolicy {
        StopPolicy {
            max_generations,
            stop_on_extinction: extinction,
            stop_on_stable: stable,
        }
    }

    #[test]
    fn test_never_ending_policy_rejected() {
        assert!(matches!(
            Runner::new(policy(None, false, false)),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_generation_cap() {
        let mut sim = create_simulation(10, 10, 0.3, RuleSet::problife(), BoundaryCondition::Wrap, Some(5)).unwrap();
        let report = Runner::new(policy(Some(25), false, false)).unwrap().run(&mut sim).unwrap();

        assert_eq!(report.reason, StopReason::MaxGenerations);
        assert_eq!(report.generations, 25);
        assert_eq!(report.population.len(), 26);
        assert_eq!(sim.run_state(), RunState::Paused);
    }

    #[test]
    fn test_extinction_stop() {
        let mut sim = create_simulation(6, 6, 0.0, RuleSet::conway(), BoundaryCondition::Dead, Some(1)).unwrap();
        let report = Runner::new(policy(Some(100), true, false)).unwrap().run(&mut sim).unwrap();
        assert_eq!(report.reason, StopReason::Extinct);
        assert_eq!(report.generations, 1);
        assert_eq!(report.final_living, 0);
    }

    #[test]
    fn test_still_life_stops_as_stable() {
        let block = Pattern::Block.stamp(6, 6, BoundaryCondition::Dead, 2, 2).unwrap();
        let mut sim = Simulation::from_grid(block, RuleSet::conway(), Some(0));
        let report = Runner::new(policy(None, true, true)).unwrap().run(&mut sim).unwrap();
        assert_eq!(report.reason, StopReason::Stable);
        assert_eq!(report.generations, 1);
        assert_eq!(report.population, vec![4, 4]);
    }

    #[test]
    fn test_observer_sees_every_generation() {
        let blinker = Pattern::Blinker.stamp(5, 5, BoundaryCondition::Wrap, 1, 1).unwrap();
        let mut sim = Simulation::from_grid(blinker, RuleSet::conway(), Some(0));
        let mut seen = Vec::new();
        Runner::new(policy(Some(4), true, true))
            .unwrap()
            .run_with(&mut sim, |s| seen.push(s.generation_index()))
            .unwrap();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_running_simulation_is_rejected() {
        let mut sim = create_simulation(4, 4, 0.5, RuleSet::conway(), BoundaryCondition::Wrap, Some(2)).unwrap();
        sim.play().unwrap();
        let runner = Runner::new(policy(Some(3), false, false)).unwrap();
        assert!(matches!(
            runner.run(&mut sim),
            Err(EngineError::InvalidTransition { .. })
        ));
    }
}
