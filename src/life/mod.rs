//! Cellular automaton core: grids, rules and seeding

pub mod grid;
pub mod io;
pub mod patterns;
pub mod rules;
pub mod seed;

pub use grid::{CellState, Grid};
pub use io::{create_example_grids, load_grid_from_file, parse_grid_from_string, save_grid_to_file};
pub use patterns::Pattern;
pub use rules::{Condition, LifeRule, NeighborSet, ProbRule, RuleSet, TransitionRule};
pub use seed::SeedInitializer;
