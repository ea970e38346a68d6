// src/math/point_distribution/density.rs

use crate::math::{
    error::{MathError, MathResult},
    geometry::{circle_area, exact_circle_overlap_area},
    scalar_field::ScalarField2D,
    spatial::TorusIndex,
    types::{Point2D, TorusDomain},
    utils::{constants::AREA_RADIUS_FACTOR, statistics},
};

/// Regelmäßiges Gitter von Messpunkten mit lokaler Zelldichte.
///
/// Die Punkte liegen bei `(ix * spacing, iy * spacing)` für alle Indizes mit
/// Koordinate kleiner als Breite bzw. Höhe, in x-major Reihenfolge
/// (`index = ix * ny + iy`). Die Punktpositionen ändern sich nie; nur die
/// Dichtewerte werden neu berechnet.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    spacing: f64,
    sampling_radius: f64,
    nx: usize,
    ny: usize,
    points: Vec<Point2D>,
    values: Vec<f64>,
}

impl DensityGrid {
    pub fn new(domain: &TorusDomain, spacing: f64) -> MathResult<Self> {
        if !(spacing > 0.0) || !spacing.is_finite() {
            return Err(MathError::InvalidConfiguration {
                message: format!("Grid spacing must be positive, got {}", spacing),
            });
        }

        let nx = axis_count(domain.width(), spacing);
        let ny = axis_count(domain.height(), spacing);

        let mut points = Vec::with_capacity(nx * ny);
        for ix in 0..nx {
            for iy in 0..ny {
                points.push(Point2D::new(ix as f64 * spacing, iy as f64 * spacing));
            }
        }

        Ok(Self {
            spacing,
            sampling_radius: spacing * AREA_RADIUS_FACTOR,
            nx,
            ny,
            values: vec![0.0; points.len()],
            points,
        })
    }

    /// Radius der Messkreise (`spacing * √2/2`): die Kreise überdecken die Ebene lückenlos.
    pub fn sampling_radius(&self) -> f64 {
        self.sampling_radius
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Berechnet die Dichte an jedem Gitterpunkt neu.
    ///
    /// Dichte = Summe der Schnittflächen aller Zellen, deren Mittelpunkt im
    /// Messkreis liegt, geteilt durch die Messkreisfläche, begrenzt auf 1.
    /// Ohne Index (keine Zellen) sind alle Werte 0.
    pub fn recompute(&mut self, index: Option<&TorusIndex>, radii: &[f64]) {
        let Some(index) = index else {
            self.values.iter_mut().for_each(|v| *v = 0.0);
            return;
        };

        let r = self.sampling_radius;
        let disk_area = circle_area(r);
        for (value, &point) in self.values.iter_mut().zip(&self.points) {
            let covered: f64 = index
                .within_radius(point, r)
                .iter()
                .map(|hit| exact_circle_overlap_area(radii[hit.cell], r, hit.distance))
                .sum();
            *value = (covered / disk_area).min(1.0);
        }
    }

    /// Populations-Standardabweichung der Dichtewerte.
    pub fn std_dev(&self) -> f64 {
        statistics::std_dev(&self.values)
    }

    pub fn mean(&self) -> f64 {
        statistics::mean(&self.values)
    }

    pub fn max(&self) -> f64 {
        statistics::max(&self.values).unwrap_or(0.0)
    }
}

/// Anzahl der Gitterpunkte `i * spacing < extent`.
fn axis_count(extent: f64, spacing: f64) -> usize {
    let mut count = (extent / spacing).ceil() as usize;
    while count > 1 && (count - 1) as f64 * spacing >= extent {
        count -= 1;
    }
    count.max(1)
}

impl ScalarField2D for DensityGrid {
    fn width(&self) -> usize {
        self.nx
    }

    fn height(&self) -> usize {
        self.ny
    }

    fn cell_size(&self) -> f64 {
        self.spacing
    }

    fn get_value(&self, x_idx: usize, y_idx: usize) -> f64 {
        if x_idx >= self.nx || y_idx >= self.ny {
            return 0.0;
        }
        self.values[x_idx * self.ny + y_idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_grid_layout_is_x_major() {
        let domain = TorusDomain::new(4.0, 3.0).unwrap();
        let grid = DensityGrid::new(&domain, 1.0).unwrap();
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.points()[0], Point2D::new(0.0, 0.0));
        assert_eq!(grid.points()[1], Point2D::new(0.0, 1.0));
        assert_eq!(grid.points()[3], Point2D::new(1.0, 0.0));
        assert_eq!(grid.cell_to_world(3, 2), Point2D::new(3.0, 2.0));
    }

    #[test]
    fn test_empty_array_has_zero_density() {
        let domain = TorusDomain::new(4.0, 4.0).unwrap();
        let mut grid = DensityGrid::new(&domain, 1.0).unwrap();
        grid.recompute(None, &[]);
        assert!(grid.values().iter().all(|&v| v == 0.0));
        assert_eq!(grid.std_dev(), 0.0);
    }

    #[test]
    fn test_single_cell_on_grid_point() {
        let domain = TorusDomain::new(4.0, 4.0).unwrap();
        let mut grid = DensityGrid::new(&domain, 1.0).unwrap();
        let centers = vec![Point2D::new(2.0, 2.0)];
        let radii = vec![0.3];
        let index = TorusIndex::build(&centers, &domain);
        grid.recompute(index.as_ref(), &radii);

        let r = grid.sampling_radius();
        assert_abs_diff_eq!(grid.get_value(2, 2), 0.09 / (r * r), epsilon = 1e-12);
        // Nachbarpunkte liegen außerhalb des Messradius (Abstand 1 > 0.707)
        assert_eq!(grid.get_value(1, 2), 0.0);
    }

    #[test]
    fn test_uniform_tiling_has_uniform_density() {
        // Auf jedem Gitterpunkt liegt eine Zelle gleichen Radius
        let domain = TorusDomain::new(6.0, 6.0).unwrap();
        let mut grid = DensityGrid::new(&domain, 1.0).unwrap();
        let centers = grid.points().to_vec();
        let radii = vec![grid.sampling_radius(); centers.len()];
        let index = TorusIndex::build(&centers, &domain);
        grid.recompute(index.as_ref(), &radii);

        assert_abs_diff_eq!(grid.std_dev(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.mean(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_density_wraps_across_edges() {
        let domain = TorusDomain::new(4.0, 4.0).unwrap();
        let mut grid = DensityGrid::new(&domain, 1.0).unwrap();
        // Zelle knapp links vom Rand: trifft den Messpunkt (0, 0) periodisch
        let centers = vec![Point2D::new(3.9, 0.0)];
        let index = TorusIndex::build(&centers, &domain);
        grid.recompute(index.as_ref(), &[0.2]);
        assert!(grid.get_value(0, 0) > 0.0);
    }
}
