//! Command line driver for Game of Life and Problife simulations

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use problife::{
    config::{BoundaryCondition, CliOverrides, OutputFormat, RuleVariant, Settings},
    engine::{run_ensemble, RunReport, Runner, StopReason},
    life::{create_example_grids, io::grid_to_string, save_grid_to_file},
    utils::{ColorOutput, GridFormatter},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "problife")]
#[command(about = "Game of Life and Problife cellular automaton simulator")]
#[command(version)]
struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation until a soft stop
    Run {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Print every n-th generation (0 prints first and last only)
        #[arg(long)]
        show_every: Option<u64>,

        /// Save the final generation to a grid file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Create example configuration and pattern files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Run the same configuration over consecutive seeds in parallel
    Ensemble {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Number of runs
        #[arg(short = 'n', long, default_value_t = 32)]
        runs: usize,

        /// Seed of the first run
        #[arg(long, default_value_t = 0)]
        first_seed: u64,
    },
}

#[derive(Args)]
struct OverrideArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Grid width (overrides config)
    #[arg(long)]
    width: Option<usize>,

    /// Grid height (overrides config)
    #[arg(long)]
    height: Option<usize>,

    /// Initial live-cell fraction in [0, 1] (overrides config)
    #[arg(short, long)]
    density: Option<f64>,

    /// Random seed (overrides config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Generation cap (overrides config)
    #[arg(short, long)]
    generations: Option<u64>,

    /// Boundary policy (overrides config)
    #[arg(short, long, value_enum)]
    boundary: Option<BoundaryCondition>,

    /// Classic rulestring such as B3/S23; selects Life
    #[arg(short, long)]
    rule: Option<String>,

    /// Problife entry such as Ps(2)=0.9; repeatable, selects Problife
    #[arg(short = 'p', long = "prob")]
    probabilities: Vec<String>,

    /// Use Problife with the configured probabilities
    #[arg(long)]
    problife: bool,

    /// Grid file replacing the random initial grid
    #[arg(long)]
    pattern: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

impl OverrideArgs {
    fn cli_overrides(&self) -> CliOverrides {
        CliOverrides {
            width: self.width,
            height: self.height,
            density: self.density,
            seed: self.seed,
            generations: self.generations,
            boundary_condition: self.boundary,
            rule: self.rule.clone(),
            probabilities: self.probabilities.clone(),
            problife: self.problife,
            pattern_file: self.pattern.clone(),
            format: self.format,
        }
    }

    /// Configuration file (or defaults) with command line overrides applied
    fn load_settings(&self) -> Result<Settings> {
        let mut settings = if self.config.exists() {
            Settings::from_file(&self.config)
                .with_context(|| format!("Failed to load config from {}", self.config.display()))?
        } else {
            println!(
                "{}",
                ColorOutput::warning(&format!(
                    "Config file {} not found, using defaults",
                    self.config.display()
                ))
            );
            Settings::default()
        };

        settings.merge_with_cli(&self.cli_overrides());
        settings.validate().context("Configuration validation failed")?;
        Ok(settings)
    }
}

/// Which generations a text run prints
struct PrintSchedule {
    every: u64,
    last_shown: Option<u64>,
}

impl PrintSchedule {
    /// `every == 0` shows only the starting generation
    fn new(every: u64) -> Self {
        Self { every, last_shown: None }
    }

    fn should_show(&mut self, generation: u64) -> bool {
        let due = if self.every == 0 {
            generation == 0
        } else {
            generation % self.every == 0
        };
        if due {
            self.last_shown = Some(generation);
        }
        due
    }

    fn was_shown(&self, generation: u64) -> bool {
        self.last_shown == Some(generation)
    }
}

#[derive(Serialize)]
struct JsonRun<'a> {
    report: &'a RunReport,
    final_grid: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { overrides, show_every, save } => run_command(&overrides, show_every, save),
        Commands::Setup { directory, force } => setup_command(directory, force),
        Commands::Ensemble { overrides, runs, first_seed } => ensemble_command(&overrides, runs, first_seed),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_command(overrides: &OverrideArgs, show_every: Option<u64>, save: Option<PathBuf>) -> Result<()> {
    let mut settings = overrides.load_settings()?;
    if let Some(every) = show_every {
        settings.output.show_every = every;
    }
    if save.is_some() {
        settings.output.save_final = save;
    }

    let mut sim = settings
        .build_simulation()
        .context("Failed to create simulation")?;
    let runner = Runner::new(settings.stop_policy())?;

    let text = settings.output.format == OutputFormat::Text;
    if text {
        println!("{}", ColorOutput::info(&format!("▶ {}", sim.rules())));
        if sim.rules().is_probabilistic() {
            println!("{}", ColorOutput::info(&format!("🎲 seed {}", sim.seed())));
        }
    }

    let mut schedule = PrintSchedule::new(settings.output.show_every);
    let start_time = Instant::now();
    let report = runner.run_with(&mut sim, |s| {
        if text && schedule.should_show(s.generation_index()) {
            println!("{}", GridFormatter::format_generation(s));
        }
    })?;
    let elapsed = start_time.elapsed();

    let final_grid = sim.current_grid();
    match settings.output.format {
        OutputFormat::Text => {
            if !schedule.was_shown(report.generations) {
                println!("{}", GridFormatter::format_generation(&sim));
            }
            println!("{}", GridFormatter::format_run_report(&report));
            let summary = format!(
                "{} generation(s) in {:.3}s",
                report.generations,
                elapsed.as_secs_f64()
            );
            if report.reason == StopReason::Extinct {
                println!("{}", ColorOutput::error(&format!("💀 {}, population died out", summary)));
            } else {
                println!("{}", ColorOutput::success(&format!("✅ {}", summary)));
            }
        }
        OutputFormat::Json => {
            let output = JsonRun {
                report: &report,
                final_grid: grid_to_string(&final_grid).lines().map(str::to_string).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    if let Some(ref path) = settings.output.save_final {
        save_grid_to_file(&final_grid, path)
            .with_context(|| format!("Failed to save final grid to {}", path.display()))?;
        info!(path = %path.display(), "Saved final generation");
    }

    Ok(())
}

fn ensemble_command(overrides: &OverrideArgs, runs: usize, first_seed: u64) -> Result<()> {
    if runs == 0 {
        anyhow::bail!("Ensemble needs at least one run");
    }
    let settings = overrides.load_settings()?;
    let runner = Runner::new(settings.stop_policy())?;

    let start_time = Instant::now();
    let report = run_ensemble(&runner, first_seed, runs, |seed| {
        settings.build_simulation_with_seed(Some(seed))
    })?;

    match settings.output.format {
        OutputFormat::Text => {
            println!("{}", report);
            println!(
                "{}",
                ColorOutput::success(&format!(
                    "✅ {} runs in {:.3}s",
                    report.runs,
                    start_time.elapsed().as_secs_f64()
                ))
            );
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("🛠️  Setting up project structure..."));

    let config_dir = directory.join("config");
    let pattern_dir = directory.join("input/patterns");

    for dir in [&config_dir, &pattern_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    write_config(&config_dir.join("default.yaml"), &Settings::default(), force)?;

    create_example_grids(&pattern_dir).context("Failed to create example grids")?;
    println!("Created example patterns in: {}", pattern_dir.display());

    let examples_dir = config_dir.join("examples");

    let mut problife = Settings::default();
    problife.rules.variant = RuleVariant::Problife;
    problife.simulation.seed = Some(42);
    problife.simulation.stop_on_stable = false;
    write_config(&examples_dir.join("problife.yaml"), &problife, force)?;

    let mut glider = Settings::default();
    glider.simulation.boundary_condition = BoundaryCondition::Dead;
    glider.simulation.max_generations = Some(4);
    glider.input.pattern_file = Some(PathBuf::from("input/patterns/glider.txt"));
    glider.output.show_every = 1;
    write_config(&examples_dir.join("glider.yaml"), &glider, force)?;

    let mut custom = Settings::default();
    custom.rules.rulestring = "B13/S23".to_string();
    write_config(&examples_dir.join("custom_rules.yaml"), &custom, force)?;

    println!("\n{}", ColorOutput::success("✅ Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Add your own patterns to {}", pattern_dir.display());
    println!("3. Run: cargo run -- run --config config/default.yaml");

    Ok(())
}

fn write_config(path: &Path, settings: &Settings, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Skipped: {} (already exists)", path.display());
        return Ok(());
    }
    settings
        .to_file(path)
        .with_context(|| format!("Failed to write configuration {}", path.display()))?;
    println!("Created: {}", path.display());
    Ok(())
}
