//! Many independent runs over consecutive seeds
//!
//! Every run owns its own single-threaded [`Simulation`]; rayon only spreads
//! whole runs across threads.

use super::runner::{RunReport, Runner, StopReason};
use super::simulation::Simulation;
use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Aggregate statistics over an ensemble of runs
#[derive(Debug, Clone, Serialize)]
pub struct EnsembleReport {
    pub runs: usize,
    pub extinct: usize,
    pub stable: usize,
    pub capped: usize,
    pub mean_generations: f64,
    pub mean_final_living: f64,
    pub min_final_living: usize,
    pub max_final_living: usize,
    pub reports: Vec<RunReport>,
}

impl EnsembleReport {
    fn from_reports(reports: Vec<RunReport>) -> Self {
        let runs = reports.len();
        let count = |reason: StopReason| reports.iter().filter(|r| r.reason == reason).count();
        let mean = |total: f64| if runs == 0 { 0.0 } else { total / runs as f64 };

        Self {
            runs,
            extinct: count(StopReason::Extinct),
            stable: count(StopReason::Stable),
            capped: count(StopReason::MaxGenerations),
            mean_generations: mean(reports.iter().map(|r| r.generations as f64).sum()),
            mean_final_living: mean(reports.iter().map(|r| r.final_living as f64).sum()),
            min_final_living: reports.iter().map(|r| r.final_living).min().unwrap_or(0),
            max_final_living: reports.iter().map(|r| r.final_living).max().unwrap_or(0),
            reports,
        }
    }
}

/// Run one simulation per seed from `first_seed` upward, wrapping past `u64::MAX`
pub fn run_ensemble<F>(runner: &Runner, first_seed: u64, runs: usize, build: F) -> Result<EnsembleReport>
where
    F: Fn(u64) -> Result<Simulation> + Sync,
{
    info!(runs, first_seed, "Starting ensemble");

    let reports = (0..runs)
        .into_par_iter()
        .map(|i| {
            let mut sim = build(first_seed.wrapping_add(i as u64))?;
            Ok(runner.run(&mut sim)?)
        })
        .collect::<Result<Vec<RunReport>>>()?;

    Ok(EnsembleReport::from_reports(reports))
}

impl fmt::Display for EnsembleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ensemble of {} runs:", self.runs)?;
        writeln!(f, "  Extinct:          {}", self.extinct)?;
        writeln!(f, "  Stable:           {}", self.stable)?;
        writeln!(f, "  Hit cap:          {}", self.capped)?;
        writeln!(f, "  Mean generations: {:.1}", self.mean_generations)?;
        writeln!(
            f,
            "  Final living:     mean {:.1}, min {}, max {}",
            self.mean_final_living, self.min_final_living, self.max_final_living
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundaryCondition;
    use crate::engine::{create_simulation, StopPolicy};
    use crate::life::RuleSet;

    fn runner() -> Runner {
        Runner::new(StopPolicy {
            max_generations: Some(30),
            stop_on_extinction: true,
            stop_on_stable: false,
        })
        .unwrap()
    }

    fn build(seed: u64) -> Result<Simulation> {
        Ok(create_simulation(12, 12, 0.3, RuleSet::problife(), BoundaryCondition::Wrap, Some(seed))?)
    }

    #[test]
    fn test_ensemble_counts() {
        let report = run_ensemble(&runner(), 100, 8, build).unwrap();
        assert_eq!(report.runs, 8);
        assert_eq!(report.extinct + report.stable + report.capped, 8);
        assert!(report.min_final_living <= report.max_final_living);

        let seeds: Vec<u64> = report.reports.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, (100..108).collect::<Vec<_>>());
    }

    #[test]
    fn test_ensemble_matches_sequential_runs() {
        let parallel = run_ensemble(&runner(), 5, 4, build).unwrap();
        for report in &parallel.reports {
            let mut sim = build(report.seed).unwrap();
            let sequential = runner().run(&mut sim).unwrap();
            assert_eq!(sequential.population, report.population);
        }
    }

    #[test]
    fn test_seeds_wrap_at_the_top_of_the_range() {
        let report = run_ensemble(&runner(), u64::MAX, 2, build).unwrap();
        let seeds: Vec<u64> = report.reports.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![u64::MAX, 0]);
    }

    #[test]
    fn test_build_failure_propagates() {
        let result = run_ensemble(&runner(), 0, 3, |seed| {
            Ok(create_simulation(0, 4, 0.3, RuleSet::conway(), BoundaryCondition::Dead, Some(seed))?)
        });
        assert!(result.is_err());
    }
}
