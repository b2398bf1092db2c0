//! Display and output formatting utilities

use crate::engine::{RunReport, Simulation};
use crate::life::Grid;
use itertools::Itertools;

/// Text rendering of grids and run summaries
pub struct GridFormatter;

impl GridFormatter {
    /// One character per cell
    pub fn format_grid_compact(grid: &Grid) -> String {
        let mut output = String::with_capacity(grid.height() * (grid.width() + 1) * 3);
        for row in grid.rows() {
            output.extend(row.iter().map(|&cell| if cell { '█' } else { '·' }));
            output.push('\n');
        }
        output
    }

    /// Two characters per cell with column and row numbers
    pub fn format_grid_with_coords(grid: &Grid) -> String {
        let mut output = String::new();

        output.push_str("   ");
        for x in 0..grid.width() {
            output.push_str(&format!("{:2}", x % 10));
        }
        output.push('\n');

        for (y, row) in grid.rows().enumerate() {
            output.push_str(&format!("{:2} ", y));
            for &cell in row {
                output.push_str(if cell { "██" } else { "··" });
            }
            output.push('\n');
        }

        output
    }

    /// Header line plus compact grid for the simulation's current generation
    pub fn format_generation(sim: &Simulation) -> String {
        let grid = sim.current_grid();
        format!(
            "Generation {} (living: {}, density: {:.1}%)\n{}",
            sim.generation_index(),
            grid.living_count(),
            grid.density() * 100.0,
            Self::format_grid_compact(&grid)
        )
    }

    /// Population history as a one-line bar chart
    pub fn sparkline(values: &[usize]) -> String {
        const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
        let max = values.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return BARS[0].to_string().repeat(values.len());
        }
        values
            .iter()
            .map(|&v| BARS[v * (BARS.len() - 1) / max])
            .collect()
    }

    pub fn format_run_report(report: &RunReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("Rules: {}\n", report.rules));
        output.push_str(&format!("Seed: {}\n", report.seed));
        output.push_str(&format!(
            "Stopped by {} after {} generation(s)\n",
            report.reason, report.generations
        ));
        output.push_str(&format!(
            "Living Cells: {} → {}\n",
            report.initial_living, report.final_living
        ));

        // Long histories are shown as their last 60 entries
        let tail = &report.population[report.population.len().saturating_sub(60)..];
        output.push_str(&format!("Population: {}\n", Self::sparkline(tail)));
        output.push_str(&format!(
            "Recent counts: {}\n",
            tail.iter().rev().take(8).rev().join(" ")
        ));
        output
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && std::env::var("TERM").unwrap_or_default() != "dumb"
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}
