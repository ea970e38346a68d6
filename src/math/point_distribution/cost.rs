// src/math/point_distribution/cost.rs

use super::density::DensityGrid;
use crate::math::{spatial::NeighborTable, utils::constants::MIN_PAIR_DISTANCE};
use nalgebra::DMatrix;

/// Gewicht des Dichte-Uniformitätsterms.
pub const DENSITY_WEIGHT: f64 = 100.0;

/// `1 - 1 / (1 + e^-g)`: 0.5 bei `g = 0`, gegen 0 für große Lücken, gegen 1 für starke Überlappung.
pub fn sigmoid(gap: f64) -> f64 {
    1.0 - 1.0 / (1.0 + (-gap).exp())
}

/// Erste Ableitung von [`sigmoid`]: `-s(g) * (1 - s(g))`.
pub fn sigmoid_derivative(gap: f64) -> f64 {
    let s = sigmoid(gap);
    -s * (1.0 - s)
}

/// Abstand für den Kostenterm; exakt übereinanderliegende Zellen werden auf
/// [`MIN_PAIR_DISTANCE`] geklemmt statt durch 0 zu teilen.
fn pair_distance(distance: f64) -> f64 {
    distance.max(MIN_PAIR_DISTANCE)
}

/// Lokaler Abstandsterm: `Σ sigmoid(gap) / distance` über alle Nachbarpaare.
pub fn gap_cost(neighbours: &NeighborTable) -> f64 {
    neighbours
        .entries()
        .iter()
        .map(|n| sigmoid(n.gap) / pair_distance(n.distance))
        .sum()
}

/// Globaler Dichteterm: `100 * stddev(density)²`.
pub fn density_cost(density: &DensityGrid) -> f64 {
    DENSITY_WEIGHT * density.std_dev().powi(2)
}

/// Gesamtkosten aus Nachbartabelle und Dichtegitter.
pub fn spacing_cost(neighbours: &NeighborTable, density: &DensityGrid) -> f64 {
    gap_cost(neighbours) + density_cost(density)
}

/// Ableitung des Abstandsterms nach den Lücken, elementweise durch den Abstand
/// geteilt; Zeile `i`, Spalte `j` gehört zum `j`-ten Nachbarn der Zelle `i`.
pub fn gap_cost_derivative(neighbours: &NeighborTable) -> DMatrix<f64> {
    let rows = neighbours.cell_count();
    let cols = neighbours.k();
    DMatrix::from_fn(rows, cols, |i, j| {
        neighbours
            .row(i)
            .get(j)
            .map(|n| sigmoid_derivative(n.gap) / pair_distance(n.distance))
            .unwrap_or(0.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{
        spatial::TorusIndex,
        types::{Point2D, TorusDomain},
    };
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_sigmoid_limits() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(50.0) < 1e-20);
        assert_abs_diff_eq!(sigmoid(-50.0), 1.0, epsilon = 1e-15);
        assert!(sigmoid(1.0) < sigmoid(-1.0));
    }

    #[test]
    fn test_sigmoid_derivative_matches_finite_difference() {
        for &g in &[-3.0, -0.5, 0.0, 0.7, 4.0] {
            let h = 1e-6;
            let numeric = (sigmoid(g + h) - sigmoid(g - h)) / (2.0 * h);
            assert_abs_diff_eq!(sigmoid_derivative(g), numeric, epsilon = 1e-8);
        }
        assert_relative_eq!(sigmoid_derivative(0.0), -0.25);
    }

    #[test]
    fn test_coincident_cells_produce_finite_cost() {
        let domain = TorusDomain::new(4.0, 4.0).unwrap();
        let centers = vec![Point2D::new(1.0, 1.0), Point2D::new(1.0, 1.0)];
        let radii = vec![0.3, 0.3];
        let index = TorusIndex::build(&centers, &domain);
        let table = NeighborTable::compute(index.as_ref(), &centers, &radii, 1);

        let cost = gap_cost(&table);
        assert!(cost.is_finite());
        assert_relative_eq!(cost, 2.0 * sigmoid(-0.6) / MIN_PAIR_DISTANCE);

        let derivative = gap_cost_derivative(&table);
        assert_eq!(derivative.shape(), (2, 1));
        assert!(derivative.iter().all(|d| d.is_finite() && *d < 0.0));
    }

    #[test]
    fn test_well_separated_pair_costs_little() {
        let domain = TorusDomain::new(10.0, 10.0).unwrap();
        let near = vec![Point2D::new(1.0, 1.0), Point2D::new(1.5, 1.0)];
        let far = vec![Point2D::new(1.0, 1.0), Point2D::new(6.0, 1.0)];
        let radii = vec![0.2, 0.2];

        let cost_of = |centers: &[Point2D]| {
            let index = TorusIndex::build(centers, &domain);
            gap_cost(&NeighborTable::compute(index.as_ref(), centers, &radii, 1))
        };
        assert!(cost_of(&far) < cost_of(&near));
    }
}
