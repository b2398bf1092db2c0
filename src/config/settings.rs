//! Configuration settings for simulation runs

use crate::engine::{create_simulation, Runner, Simulation, StopPolicy};
use crate::life::{load_grid_from_file, LifeRule, ProbRule, RuleSet, SeedInitializer};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub simulation: SimulationConfig,
    pub rules: RulesConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub width: usize,
    pub height: usize,
    /// Fraction of cells alive at generation 0
    pub density: f64,
    #[serde(rename = "boundary")]
    pub boundary_condition: BoundaryCondition,
    pub seed: Option<u64>,
    pub max_generations: Option<u64>,
    pub stop_on_extinction: bool,
    pub stop_on_stable: bool,
}

/// How neighbor queries treat positions beyond the grid edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// Outside cells are permanently dead
    Dead,
    /// Opposite edges are joined (torus)
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleVariant {
    Life,
    Problife,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    pub variant: RuleVariant,
    /// B/S rulestring used by the `life` variant
    pub rulestring: String,
    /// `Pc(N)=x` entries used by the `problife` variant
    pub probabilities: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// Text grid replacing the random generation 0
    pub pattern_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Print every n-th generation; 0 prints only the first and last
    pub show_every: u64,
    pub save_final: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig {
                width: 20,
                height: 20,
                density: 0.25,
                boundary_condition: BoundaryCondition::Wrap,
                seed: None,
                max_generations: Some(200),
                stop_on_extinction: true,
                stop_on_stable: true,
            },
            rules: RulesConfig {
                variant: RuleVariant::Life,
                rulestring: LifeRule::conway().to_string(),
                probabilities: ProbRule::problife().to_exprs(),
            },
            input: InputConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Text,
                show_every: 0,
                save_final: None,
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.width == 0 || sim.height == 0 {
            anyhow::bail!("Grid dimensions must be positive, got {}x{}", sim.width, sim.height);
        }

        SeedInitializer::check_density(sim.density)?;
        self.rule_set().context("Invalid rule configuration")?;
        Runner::new(self.stop_policy())?;

        if let Some(ref pattern) = self.input.pattern_file {
            if !pattern.exists() {
                anyhow::bail!("Pattern file does not exist: {}", pattern.display());
            }
        }

        Ok(())
    }

    /// Rules selected by the configured variant
    pub fn rule_set(&self) -> Result<RuleSet> {
        let rules = match self.rules.variant {
            RuleVariant::Life => RuleSet::Life(LifeRule::parse(&self.rules.rulestring)?),
            RuleVariant::Problife => RuleSet::Problife(ProbRule::from_exprs(&self.rules.probabilities)?),
        };
        Ok(rules)
    }

    pub fn stop_policy(&self) -> StopPolicy {
        StopPolicy {
            max_generations: self.simulation.max_generations,
            stop_on_extinction: self.simulation.stop_on_extinction,
            stop_on_stable: self.simulation.stop_on_stable,
        }
    }

    /// Build a simulation using the configured seed
    pub fn build_simulation(&self) -> Result<Simulation> {
        self.build_simulation_with_seed(self.simulation.seed)
    }

    /// Build a simulation, loading the pattern file when one is configured
    pub fn build_simulation_with_seed(&self, seed: Option<u64>) -> Result<Simulation> {
        let sim = &self.simulation;
        let rules = self.rule_set()?;

        match self.input.pattern_file {
            Some(ref path) => {
                let grid = load_grid_from_file(path, sim.boundary_condition)?;
                if (grid.width(), grid.height()) != (sim.width, sim.height) {
                    warn!(
                        "Pattern {} is {}x{}; configured size {}x{} ignored",
                        path.display(),
                        grid.width(),
                        grid.height(),
                        sim.width,
                        sim.height
                    );
                }
                Ok(Simulation::from_grid(grid, rules, seed))
            }
            None => Ok(create_simulation(
                sim.width,
                sim.height,
                sim.density,
                rules,
                sim.boundary_condition,
                seed,
            )?),
        }
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        let sim = &mut self.simulation;
        if let Some(width) = cli_overrides.width {
            sim.width = width;
        }
        if let Some(height) = cli_overrides.height {
            sim.height = height;
        }
        if let Some(density) = cli_overrides.density {
            sim.density = density;
        }
        if let Some(seed) = cli_overrides.seed {
            sim.seed = Some(seed);
        }
        if let Some(generations) = cli_overrides.generations {
            sim.max_generations = Some(generations);
        }
        if let Some(boundary) = cli_overrides.boundary_condition {
            sim.boundary_condition = boundary;
        }

        if let Some(ref rulestring) = cli_overrides.rule {
            self.rules.variant = RuleVariant::Life;
            self.rules.rulestring = rulestring.clone();
        }
        if !cli_overrides.probabilities.is_empty() {
            self.rules.variant = RuleVariant::Problife;
            self.rules.probabilities = cli_overrides.probabilities.clone();
        }
        if cli_overrides.problife {
            self.rules.variant = RuleVariant::Problife;
        }

        if let Some(ref pattern) = cli_overrides.pattern_file {
            self.input.pattern_file = Some(pattern.clone());
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub density: Option<f64>,
    pub seed: Option<u64>,
    pub generations: Option<u64>,
    pub boundary_condition: Option<BoundaryCondition>,
    pub rule: Option<String>,
    pub probabilities: Vec<String>,
    pub problife: bool,
    pub pattern_file: Option<PathBuf>,
    pub format: Option<OutputFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::life::save_grid_to_file;
    use crate::life::Pattern;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.rule_set().unwrap(), RuleSet::conway());
    }

    #[test]
    fn test_yaml_file_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config/default.yaml");

        let mut settings = Settings::default();
        settings.simulation.seed = Some(17);
        settings.rules.variant = RuleVariant::Problife;
        settings.to_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("boundary: wrap"));

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded.simulation.seed, Some(17));
        assert_eq!(loaded.rule_set().unwrap(), RuleSet::problife());
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
simulation:
  width: 8
  height: 6
  density: 0.5
  boundary: dead
  seed: 3
  max_generations: 50
  stop_on_extinction: true
  stop_on_stable: false
rules:
  variant: problife
  rulestring: B3/S23
  probabilities: ["Ps(2)=0.5", "Pb(3)=1.0"]
input: {}
output:
  format: json
  show_every: 5
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        settings.validate().unwrap();
        assert_eq!(settings.simulation.boundary_condition, BoundaryCondition::Dead);
        assert_eq!(settings.output.format, OutputFormat::Json);
        assert!(settings.input.pattern_file.is_none());

        let sim = settings.build_simulation().unwrap();
        assert_eq!(sim.current_grid().width(), 8);
        assert_eq!(sim.seed(), 3);
        assert_eq!(sim.boundary_condition(), BoundaryCondition::Dead);
    }

    #[test]
    fn test_validation_failures() {
        let mut settings = Settings::default();
        settings.simulation.density = 1.5;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.simulation.width = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.rules.rulestring = "B9/S23".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.simulation.max_generations = None;
        settings.simulation.stop_on_extinction = false;
        settings.simulation.stop_on_stable = false;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.input.pattern_file = Some(PathBuf::from("/nonexistent/pattern.txt"));
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_merge_with_cli() {
        let mut settings = Settings::default();
        settings.merge_with_cli(&CliOverrides {
            width: Some(40),
            seed: Some(9),
            generations: Some(10),
            boundary_condition: Some(BoundaryCondition::Dead),
            probabilities: vec!["Pb(3)=0.5".to_string()],
            ..Default::default()
        });

        assert_eq!(settings.simulation.width, 40);
        assert_eq!(settings.simulation.height, 20);
        assert_eq!(settings.simulation.seed, Some(9));
        assert_eq!(settings.simulation.max_generations, Some(10));
        assert_eq!(settings.rules.variant, RuleVariant::Problife);
        assert_eq!(settings.rule_set().unwrap().to_string(), "Problife Pb(3)=0.5");
    }

    #[test]
    fn test_pattern_file_replaces_random_seed() {
        let temp_dir = tempdir().unwrap();
        let pattern = temp_dir.path().join("glider.txt");
        let glider = Pattern::Glider.stamp(7, 7, BoundaryCondition::Wrap, 0, 0).unwrap();
        save_grid_to_file(&glider, &pattern).unwrap();

        let mut settings = Settings::default();
        settings.input.pattern_file = Some(pattern);
        settings.validate().unwrap();

        let sim = settings.build_simulation().unwrap();
        assert_eq!(*sim.current_grid(), glider);
    }
}
