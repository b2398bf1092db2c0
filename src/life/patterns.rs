//! Well-known starting patterns

use super::Grid;
use crate::config::BoundaryCondition;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Diagonal spaceship, period 4
    Glider,
    /// Period-2 oscillator
    Blinker,
    /// Still life
    Block,
    /// Period-2 oscillator
    Beacon,
}

impl Pattern {
    pub const ALL: [Pattern; 4] = [Pattern::Glider, Pattern::Blinker, Pattern::Block, Pattern::Beacon];

    pub fn name(self) -> &'static str {
        match self {
            Pattern::Glider => "glider",
            Pattern::Blinker => "blinker",
            Pattern::Block => "block",
            Pattern::Beacon => "beacon",
        }
    }

    /// Live cells relative to the pattern's top-left corner, as `(x, y)`
    pub fn cells(self) -> &'static [(usize, usize)] {
        match self {
            Pattern::Glider => &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
            Pattern::Blinker => &[(0, 1), (1, 1), (2, 1)],
            Pattern::Block => &[(0, 0), (1, 0), (0, 1), (1, 1)],
            Pattern::Beacon => &[(0, 0), (1, 0), (0, 1), (3, 2), (2, 3), (3, 3)],
        }
    }

    /// Place the pattern at `(x, y)` in an otherwise empty grid; cells that
    /// fall outside are wrapped under `Wrap` and dropped under `Dead`.
    pub fn stamp(
        self,
        width: usize,
        height: usize,
        boundary_condition: BoundaryCondition,
        x: usize,
        y: usize,
    ) -> Result<Grid> {
        let placed: Vec<(usize, usize)> = self
            .cells()
            .iter()
            .filter_map(|&(dx, dy)| {
                let (px, py) = (x + dx, y + dy);
                match boundary_condition {
                    BoundaryCondition::Wrap => Some((px % width.max(1), py % height.max(1))),
                    BoundaryCondition::Dead => (px < width && py < height).then_some((px, py)),
                }
            })
            .collect();
        Grid::from_fn(width, height, boundary_condition, |cx, cy| placed.contains(&(cx, cy)))
    }
}

impl std::str::FromStr for Pattern {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Pattern::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown pattern '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_glider() {
        let grid = Pattern::Glider.stamp(5, 5, BoundaryCondition::Dead, 1, 1).unwrap();
        assert_eq!(grid.living_cells(), vec![(2, 1), (3, 2), (1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_stamp_clipping_and_wrapping() {
        let clipped = Pattern::Block.stamp(4, 4, BoundaryCondition::Dead, 3, 3).unwrap();
        assert_eq!(clipped.living_cells(), vec![(3, 3)]);

        let wrapped = Pattern::Block.stamp(4, 4, BoundaryCondition::Wrap, 3, 3).unwrap();
        assert_eq!(wrapped.living_count(), 4);
        assert_eq!(wrapped.living_cells(), vec![(0, 0), (3, 0), (0, 3), (3, 3)]);
    }

    #[test]
    fn test_pattern_from_str() {
        assert_eq!("Glider".parse::<Pattern>().unwrap(), Pattern::Glider);
        assert!("spaceship".parse::<Pattern>().is_err());
    }
}
