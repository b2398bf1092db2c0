//! Random generation-0 grids

use super::Grid;
use crate::config::BoundaryCondition;
use crate::error::{EngineError, Result};
use rand::Rng;

/// Populates initial grids from a live-cell density
pub struct SeedInitializer;

impl SeedInitializer {
    /// Each cell is independently alive with probability `density`.
    ///
    /// Draws exactly one value from `rng` per cell, row-major.
    pub fn initialize<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        density: f64,
        boundary_condition: BoundaryCondition,
        rng: &mut R,
    ) -> Result<Grid> {
        Self::check_density(density)?;
        Grid::from_fn(width, height, boundary_condition, |_, _| rng.gen::<f64>() < density)
    }

    pub fn check_density(density: f64) -> Result<()> {
        if density.is_finite() && (0.0..=1.0).contains(&density) {
            Ok(())
        } else {
            Err(EngineError::invalid(format!(
                "Density must lie in [0, 1], got {}",
                density
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_density_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let empty = SeedInitializer::initialize(8, 6, 0.0, BoundaryCondition::Dead, &mut rng).unwrap();
        let full = SeedInitializer::initialize(8, 6, 1.0, BoundaryCondition::Dead, &mut rng).unwrap();
        assert!(empty.is_empty());
        assert_eq!(full.living_count(), 48);
    }

    #[test]
    fn test_density_is_respected() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let grid = SeedInitializer::initialize(100, 100, 0.25, BoundaryCondition::Wrap, &mut rng).unwrap();
        assert!((grid.density() - 0.25).abs() < 0.03, "density = {}", grid.density());
    }

    #[test]
    fn test_same_seed_same_grid() {
        let a = SeedInitializer::initialize(
            12, 9, 0.4, BoundaryCondition::Wrap, &mut ChaCha8Rng::seed_from_u64(99),
        )
        .unwrap();
        let b = SeedInitializer::initialize(
            12, 9, 0.4, BoundaryCondition::Wrap, &mut ChaCha8Rng::seed_from_u64(99),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_parameters() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for density in [1.5, -0.1, f64::NAN] {
            assert!(matches!(
                SeedInitializer::initialize(4, 4, density, BoundaryCondition::Dead, &mut rng),
                Err(EngineError::InvalidParameter(_))
            ));
        }
        assert!(SeedInitializer::initialize(0, 4, 0.5, BoundaryCondition::Dead, &mut rng).is_err());
        assert!(SeedInitializer::initialize(4, 0, 0.5, BoundaryCondition::Dead, &mut rng).is_err());
    }
}
