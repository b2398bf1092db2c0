//! Text file format for grids
//!
//! Each line is one row, `1` for a live cell and `0` for a dead one.

use super::{Grid, Pattern};
use crate::config::BoundaryCondition;
use anyhow::{Context, Result};
use std::path::Path;

/// Load a grid from a text file
pub fn load_grid_from_file<P: AsRef<Path>>(
    path: P,
    boundary_condition: BoundaryCondition,
) -> Result<Grid> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read grid file: {}", path.as_ref().display()))?;

    parse_grid_from_string(&content, boundary_condition)
        .with_context(|| format!("Failed to parse grid from file: {}", path.as_ref().display()))
}

/// Parse a grid from its text representation
pub fn parse_grid_from_string(content: &str, boundary_condition: BoundaryCondition) -> Result<Grid> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        anyhow::bail!("Grid file is empty or contains no valid rows");
    }

    let width = lines[0].len();
    let mut cells = Vec::with_capacity(lines.len());

    for (y, line) in lines.iter().enumerate() {
        if line.len() != width {
            anyhow::bail!(
                "Row {} has length {}, expected {} (all rows must have the same length)",
                y,
                line.len(),
                width
            );
        }

        let row = line
            .chars()
            .enumerate()
            .map(|(x, ch)| match ch {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => anyhow::bail!(
                    "Invalid character '{}' at position ({}, {}). Only '0' and '1' are allowed",
                    ch,
                    x,
                    y
                ),
            })
            .collect::<Result<Vec<bool>>>()?;
        cells.push(row);
    }

    Ok(Grid::from_cells(cells, boundary_condition)?)
}

/// Save a grid to a text file, creating parent directories
pub fn save_grid_to_file<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, grid_to_string(grid))
        .with_context(|| format!("Failed to write grid to file: {}", path.as_ref().display()))?;

    Ok(())
}

pub fn grid_to_string(grid: &Grid) -> String {
    let mut result = String::with_capacity(grid.height() * (grid.width() + 1));
    for row in grid.rows() {
        result.extend(row.iter().map(|&cell| if cell { '1' } else { '0' }));
        result.push('\n');
    }
    result
}

/// Write one example file per built-in pattern
pub fn create_example_grids<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    // (pattern, side length, margin)
    for (pattern, size, margin) in [
        (Pattern::Glider, 5, 0),
        (Pattern::Blinker, 3, 0),
        (Pattern::Block, 4, 1),
        (Pattern::Beacon, 6, 1),
    ] {
        let grid = pattern.stamp(size, size, BoundaryCondition::Dead, margin, margin)?;
        let path = dir.join(format!("{}.txt", pattern.name()));
        save_grid_to_file(&grid, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::life::CellState;
    use tempfile::tempdir;

    #[test]
    fn test_parse_grid_from_string() {
        let grid = parse_grid_from_string("010\n101\n\n010\n", BoundaryCondition::Dead).unwrap();

        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.living_count(), 4);
        assert_eq!(grid.get(1, 0).unwrap(), CellState::Alive);
        assert_eq!(grid.get(0, 1).unwrap(), CellState::Alive);
        assert_eq!(grid.get(1, 1).unwrap(), CellState::Dead);
    }

    #[test]
    fn test_grid_to_string() {
        let grid = parse_grid_from_string("0110\n1001\n", BoundaryCondition::Wrap).unwrap();
        assert_eq!(grid_to_string(&grid), "0110\n1001\n");
    }

    #[test]
    fn test_file_operations() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("nested/test_grid.txt");

        let original = parse_grid_from_string("101\n010\n", BoundaryCondition::Dead).unwrap();
        save_grid_to_file(&original, &file_path).unwrap();
        let loaded = load_grid_from_file(&file_path, BoundaryCondition::Dead).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn test_invalid_input() {
        assert!(parse_grid_from_string("010\n1X1\n010\n", BoundaryCondition::Dead).is_err());
        assert!(parse_grid_from_string("010\n11\n010\n", BoundaryCondition::Dead).is_err());
        assert!(parse_grid_from_string("", BoundaryCondition::Dead).is_err());
        assert!(load_grid_from_file("/nonexistent/grid.txt", BoundaryCondition::Dead).is_err());
    }

    #[test]
    fn test_create_example_grids() {
        let temp_dir = tempdir().unwrap();
        create_example_grids(temp_dir.path()).unwrap();

        for name in ["glider", "blinker", "block", "beacon"] {
            assert!(temp_dir.path().join(format!("{}.txt", name)).exists());
        }

        let glider = load_grid_from_file(temp_dir.path().join("glider.txt"), BoundaryCondition::Dead).unwrap();
        assert_eq!(glider.width(), 5);
        assert_eq!(glider.height(), 5);
        assert_eq!(glider.living_count(), 5);

        let beacon = load_grid_from_file(temp_dir.path().join("beacon.txt"), BoundaryCondition::Dead).unwrap();
        assert_eq!(beacon.living_count(), 6);
    }
}
