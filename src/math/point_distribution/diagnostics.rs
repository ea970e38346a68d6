// src/math/point_distribution/diagnostics.rs

use super::density::DensityGrid;
use crate::math::{spatial::NeighborTable, utils::statistics};

/// Kennzahlen der aktuellen Zellverteilung.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpacingDiagnostics {
    /// Mittlerer Nachbarabstand über alle Einträge der Nachbartabelle
    pub mean_spacing: f64,
    /// `sqrt(mean((distance - desired)²)) / desired`
    pub spacing_deviation: f64,
    /// Standardabweichung der Gitterdichte
    pub density_std: f64,
}

impl SpacingDiagnostics {
    pub fn compute(neighbours: &NeighborTable, density: &DensityGrid, desired_spacing: f64) -> Self {
        let distances = neighbours.distances();
        Self {
            mean_spacing: statistics::mean(&distances),
            spacing_deviation: statistics::rms_deviation(&distances, desired_spacing)
                / desired_spacing,
            density_std: density.std_dev(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{
        spatial::TorusIndex,
        types::{Point2D, TorusDomain},
    };
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_regular_lattice_matches_desired_spacing() {
        let domain = TorusDomain::new(4.0, 4.0).unwrap();
        let mut grid = DensityGrid::new(&domain, 2.0).unwrap();
        let centers: Vec<Point2D> = (0..4)
            .flat_map(|ix| (0..4).map(move |iy| Point2D::new(ix as f64 + 0.5, iy as f64 + 0.5)))
            .collect();
        let radii = vec![0.2; centers.len()];
        let index = TorusIndex::build(&centers, &domain);
        let table = NeighborTable::compute(index.as_ref(), &centers, &radii, 4);
        grid.recompute(index.as_ref(), &radii);

        let diagnostics = SpacingDiagnostics::compute(&table, &grid, 1.0);
        assert_abs_diff_eq!(diagnostics.mean_spacing, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(diagnostics.spacing_deviation, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(diagnostics.density_std, 0.0, epsilon = 1e-12);
    }
}
