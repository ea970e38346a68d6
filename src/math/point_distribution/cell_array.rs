// src/math/point_distribution/cell_array.rs

use super::{
    config::{SeedingStrategy, SpacingConfig},
    cost,
    density::DensityGrid,
    diagnostics::SpacingDiagnostics,
    sampler::LowDensitySampler,
};
use crate::math::{
    error::{MathError, MathResult},
    spatial::{NeighborTable, TorusIndex},
    types::{Point2D, TorusDomain},
    utils::constants::PI,
};
use bevy::log::debug;
use nalgebra::{DMatrix, DVector};
use rand::{Rng, seq::SliceRandom};
use rand_distr::{Distribution, Normal};

/// Kleinster erlaubter Radius als Anteil des mittleren Radius.
const MIN_RADIUS_FRACTION: f64 = 0.05;
/// Zellen pro Teilfläche bei der stratifizierten Startverteilung.
const CELLS_PER_STRATUM: usize = 20;

/// Das Zellfeld: einziger Besitzer aller Zelldaten.
///
/// `centers` und `radii` sind indexgleich; Nachbartabelle und Dichtegitter sind
/// abgeleitete Sichten, die nach jeder Änderung vollständig neu berechnet werden.
#[derive(Debug, Clone)]
pub struct CellArray {
    config: SpacingConfig,
    domain: TorusDomain,
    centers: Vec<Point2D>,
    radii: Vec<f64>,
    neighbours: NeighborTable,
    density: DensityGrid,
    radius_distribution: Normal<f64>,
}

impl CellArray {
    /// Erstellt ein Zellfeld mit `config.num_cells` Zellen im Ursprung und
    /// normalverteilten Radien. Die Positionen setzt [`CellArray::seed_positions`].
    pub fn new<R: Rng + ?Sized>(config: SpacingConfig, rng: &mut R) -> MathResult<Self> {
        config.validate()?;

        let domain = TorusDomain::new(config.width, config.height)?;
        let density = DensityGrid::new(&domain, config.grid_spacing)?;
        let radius_distribution =
            Normal::new(config.avg_radius, config.radius_dispersion * config.avg_radius).map_err(
                |e| MathError::InvalidConfiguration {
                    message: format!("Radius distribution: {}", e),
                },
            )?;

        let mut cells = Self {
            centers: vec![Point2D::origin(); config.num_cells],
            radii: Vec::with_capacity(config.num_cells),
            neighbours: NeighborTable::empty(),
            config,
            domain,
            density,
            radius_distribution,
        };
        for _ in 0..cells.config.num_cells {
            let r = cells.draw_radius(rng);
            cells.radii.push(r);
        }

        Ok(cells)
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn config(&self) -> &SpacingConfig {
        &self.config
    }

    pub fn domain(&self) -> &TorusDomain {
        &self.domain
    }

    /// Normalisierte Mittelpunkte (Lesesicht).
    pub fn centers(&self) -> &[Point2D] {
        &self.centers
    }

    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Nachbartabelle des letzten Refresh.
    pub fn neighbours(&self) -> &NeighborTable {
        &self.neighbours
    }

    /// Dichtegitter des letzten Refresh.
    pub fn density(&self) -> &DensityGrid {
        &self.density
    }

    /// Tatsächlich verwendete Nachbarzahl: `min(k, n - 1)`.
    pub fn effective_neighbours(&self) -> usize {
        self.config.num_neighbours.min(self.len().saturating_sub(1))
    }

    fn draw_radius<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let min_radius = MIN_RADIUS_FRACTION * self.config.avg_radius;
        self.radius_distribution.sample(rng).max(min_radius)
    }

    /// Koordinatenvektor `[x_0 .. x_{n-1}, y_0 .. y_{n-1}]` für den Minimierer.
    pub fn positions(&self) -> DVector<f64> {
        let n = self.len();
        DVector::from_iterator(
            2 * n,
            self.centers
                .iter()
                .map(|c| c.x)
                .chain(self.centers.iter().map(|c| c.y)),
        )
    }

    /// Zielfunktion mit Seiteneffekt ("evaluate and refresh").
    ///
    /// Schreibt `positions` normalisiert in das Zellfeld zurück, baut Index,
    /// Nachbartabelle und Dichtegitter neu auf und liefert die Kosten
    /// `Σ sigmoid(gap) / distance + 100 · stddev(density)²`.
    /// Die Methode ist absichtlich nicht rein.
    pub fn evaluate_cost(&mut self, positions: &[f64]) -> MathResult<f64> {
        let n = self.len();
        if positions.len() != 2 * n {
            return Err(MathError::DimensionMismatch {
                expected: 2 * n,
                actual: positions.len(),
            });
        }
        check_coordinates(positions)?;

        let (xs, ys) = positions.split_at(n);
        for ((center, &x), &y) in self.centers.iter_mut().zip(xs).zip(ys) {
            *center = self.domain.wrap(Point2D::new(x, y));
        }

        Ok(self.refresh())
    }

    /// Baut alle abgeleiteten Sichten aus den aktuellen Positionen neu auf und
    /// liefert die Kosten.
    pub fn refresh(&mut self) -> f64 {
        let index = TorusIndex::build(&self.centers, &self.domain);
        self.neighbours = NeighborTable::compute(
            index.as_ref(),
            &self.centers,
            &self.radii,
            self.effective_neighbours(),
        );
        self.density.recompute(index.as_ref(), &self.radii);

        self.cost()
    }

    /// Kosten der zuletzt berechneten Sichten (ohne Neuberechnung).
    pub fn cost(&self) -> f64 {
        cost::spacing_cost(&self.neighbours, &self.density)
    }

    /// Ableitung des Abstandsterms je Nachbarpaar (`n x k`).
    pub fn cost_derivative(&self) -> DMatrix<f64> {
        cost::gap_cost_derivative(&self.neighbours)
    }

    pub fn diagnostics(&self) -> SpacingDiagnostics {
        SpacingDiagnostics::compute(&self.neighbours, &self.density, self.config.desired_spacing)
    }

    /// Mittlere Flächenbedeckung `n π r̄² / (width · height)`.
    pub fn mean_coverage(&self) -> f64 {
        self.len() as f64 * PI * self.config.avg_radius.powi(2) / self.domain.area()
    }

    fn sampler(&self) -> LowDensitySampler {
        LowDensitySampler::new(self.domain, self.density.clone())
    }

    /// Punkt in einem Bereich geringer Dichte; das Zellfeld bleibt unverändert.
    pub fn sample_low_density_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2D {
        self.sampler().sample(&self.centers, &self.radii, rng)
    }

    /// Verteilt alle Zellen neu gemäß `config.seeding`.
    pub fn seed_positions<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.config.seeding {
            SeedingStrategy::LowDensity => {
                let mut sampler = self.sampler();
                for i in 0..self.len() {
                    let point = sampler.sample(&self.centers[..i], &self.radii[..i], rng);
                    self.centers[i] = point;
                }
            }
            SeedingStrategy::Stratified => self.seed_stratified(rng),
            SeedingStrategy::Uniform => {
                let (w, h) = (self.domain.width(), self.domain.height());
                for center in &mut self.centers {
                    *center = Point2D::new(rng.random::<f64>() * w, rng.random::<f64>() * h);
                }
            }
        }

        debug!("{} cells seeded ({:?})", self.len(), self.config.seeding);
        self.refresh();
    }

    /// Teilt das Gebiet in `d x d` Teilflächen (`d = n / 20 + 1`), mischt sie und
    /// verteilt die Zellen reihum, jeweils zufällig innerhalb der Teilfläche.
    fn seed_stratified<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let divisions = self.len() / CELLS_PER_STRATUM + 1;
        let dw = self.domain.width() / divisions as f64;
        let dh = self.domain.height() / divisions as f64;

        let mut strata: Vec<(usize, usize)> = (0..divisions)
            .flat_map(|ix| (0..divisions).map(move |iy| (ix, iy)))
            .collect();
        strata.shuffle(rng);

        for (i, center) in self.centers.iter_mut().enumerate() {
            let (ix, iy) = strata[i % strata.len()];
            *center = self.domain.wrap(Point2D::new(
                (ix as f64 + rng.random::<f64>()) * dw,
                (iy as f64 + rng.random::<f64>()) * dh,
            ));
        }
    }

    /// Fügt eine Zelle an einer Stelle geringer Dichte mit neu gezogenem Radius ein.
    pub fn add_cell<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let point = self.sample_low_density_point(rng);
        let radius = self.draw_radius(rng);
        self.push_cell(point, radius)
    }

    /// Fügt eine Zelle an `point` mit Radius `radius` ein und liefert ihren Index.
    pub fn insert_cell(&mut self, point: Point2D, radius: f64) -> MathResult<usize> {
        check_radius(radius)?;
        check_coordinates(&[point.x, point.y])?;
        Ok(self.push_cell(point, radius))
    }

    fn push_cell(&mut self, point: Point2D, radius: f64) -> usize {
        self.centers.push(self.domain.wrap(point));
        self.radii.push(radius);
        self.config.num_cells = self.len();
        self.refresh();
        self.len() - 1
    }

    /// Entfernt die Zelle `index`; nachfolgende Zellen rücken auf.
    pub fn remove_cell(&mut self, index: usize) -> MathResult<(Point2D, f64)> {
        self.check_index(index)?;
        let center = self.centers.remove(index);
        let radius = self.radii.remove(index);
        self.config.num_cells = self.len();
        self.refresh();
        Ok((center, radius))
    }

    /// Setzt Position und Radius einer einzelnen Zelle.
    pub fn adjust_cell(&mut self, index: usize, point: Point2D, radius: f64) -> MathResult<()> {
        self.check_index(index)?;
        check_radius(radius)?;
        check_coordinates(&[point.x, point.y])?;
        self.centers[index] = self.domain.wrap(point);
        self.radii[index] = radius;
        self.refresh();
        Ok(())
    }

    /// Übernimmt einen gespeicherten Zustand (Koordinaten erst alle x, dann alle y).
    /// Die Zellzahl richtet sich nach den geladenen Daten.
    pub fn restore(&mut self, coordinates: &[f64], radii: &[f64]) -> MathResult<()> {
        if coordinates.len() != 2 * radii.len() {
            return Err(MathError::DimensionMismatch {
                expected: 2 * radii.len(),
                actual: coordinates.len(),
            });
        }
        for &r in radii {
            check_radius(r)?;
        }
        check_coordinates(coordinates)?;

        let n = radii.len();
        let (xs, ys) = coordinates.split_at(n);
        self.centers = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| self.domain.wrap(Point2D::new(x, y)))
            .collect();
        self.radii = radii.to_vec();
        self.config.num_cells = n;
        self.refresh();
        Ok(())
    }

    /// Vorbedingungen eines Optimierungslaufs: mindestens zwei Zellen und `k < n`.
    pub fn validate_for_optimization(&self) -> MathResult<()> {
        if self.len() < 2 {
            return Err(MathError::InsufficientPoints {
                expected: 2,
                actual: self.len(),
            });
        }
        if self.config.num_neighbours == 0 || self.config.num_neighbours >= self.len() {
            return Err(MathError::InvalidConfiguration {
                message: format!(
                    "Number of neighbours ({}) must be in 1..{} for {} cells",
                    self.config.num_neighbours,
                    self.len(),
                    self.len()
                ),
            });
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> MathResult<()> {
        if index >= self.len() {
            return Err(MathError::CellIndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }
}

fn check_radius(radius: f64) -> MathResult<()> {
    if !(radius > 0.0) || !radius.is_finite() {
        return Err(MathError::InvalidConfiguration {
            message: format!("Cell radius must be positive, got {}", radius),
        });
    }
    Ok(())
}

/// Unendliche oder NaN-Koordinaten lassen sich nicht normalisieren.
fn check_coordinates(coordinates: &[f64]) -> MathResult<()> {
    match coordinates.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(MathError::NonFiniteCoordinate {
            index,
            value: coordinates[index],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{SeedableRng, rngs::StdRng};

    fn small_config() -> SpacingConfig {
        SpacingConfig::new()
            .with_cells(6)
            .with_dimensions(5.0, 4.0)
            .with_radius(0.3, 0.1)
            .with_neighbours(2)
            .with_grid_spacing(1.0)
            .with_desired_spacing(1.5)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = small_config().with_neighbours(6);
        assert!(CellArray::new(config, &mut rng).is_err());
    }

    #[test]
    fn test_radii_are_positive_and_aligned() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = small_config().with_radius(0.3, 5.0);
        let cells = CellArray::new(config, &mut rng).unwrap();
        assert_eq!(cells.radii().len(), cells.centers().len());
        assert!(cells.radii().iter().all(|&r| r > 0.0));
    }

    #[test]
    fn test_evaluate_cost_wraps_positions() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut cells = CellArray::new(small_config(), &mut rng).unwrap();
        let positions = [
            -1.0, 5.0, 12.3, 2.0, -0.001, 4.999, // x
            -7.5, 4.0, 0.5, 8.1, -3.0, 1.0, // y
        ];
        let value = cells.evaluate_cost(&positions).unwrap();
        assert!(value.is_finite());
        for c in cells.centers() {
            assert!(cells.domain().contains(*c), "{:?} outside domain", c);
        }
        assert_abs_diff_eq!(cells.centers()[0].x, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cells.centers()[0].y, 0.5, epsilon = 1e-12);
        assert_eq!(cells.neighbours().cell_count(), 6);
        assert_abs_diff_eq!(value, cells.cost());
    }

    #[test]
    fn test_evaluate_cost_rejects_wrong_length() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut cells = CellArray::new(small_config(), &mut rng).unwrap();
        assert_eq!(
            cells.evaluate_cost(&[1.0, 2.0]),
            Err(MathError::DimensionMismatch {
                expected: 12,
                actual: 2
            })
        );
    }

    #[test]
    fn test_evaluate_cost_rejects_non_finite_coordinates() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut cells = CellArray::new(small_config(), &mut rng).unwrap();
        cells.seed_positions(&mut rng);
        let before = cells.centers().to_vec();

        let mut positions = cells.positions();
        positions[0] = f64::INFINITY;
        assert!(matches!(
            cells.evaluate_cost(positions.as_slice()),
            Err(MathError::NonFiniteCoordinate { index: 0, .. })
        ));
        positions[0] = 1.0;
        positions[7] = f64::NAN;
        assert!(matches!(
            cells.evaluate_cost(positions.as_slice()),
            Err(MathError::NonFiniteCoordinate { index: 7, .. })
        ));
        assert_eq!(cells.centers(), before.as_slice());

        assert!(cells.adjust_cell(0, Point2D::new(f64::NEG_INFINITY, 1.0), 0.3).is_err());
        assert!(cells.insert_cell(Point2D::new(1.0, f64::NAN), 0.3).is_err());
        assert!(cells.restore(&[f64::INFINITY, 1.0], &[0.3]).is_err());
        assert_eq!(cells.len(), 6);
    }

    #[test]
    fn test_config_tracks_cell_count() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut cells = CellArray::new(small_config(), &mut rng).unwrap();
        cells.seed_positions(&mut rng);

        cells.add_cell(&mut rng);
        assert_eq!(cells.config().num_cells, 7);
        cells.remove_cell(0).unwrap();
        cells.remove_cell(0).unwrap();
        assert_eq!(cells.config().num_cells, 5);
        cells
            .restore(&[1.0, 2.0, 3.0, 1.0, 2.0, 3.0], &[0.3, 0.3, 0.3])
            .unwrap();
        assert_eq!(cells.config().num_cells, 3);
    }

    #[test]
    fn test_seeding_strategies_fill_domain() {
        for seeding in [
            SeedingStrategy::LowDensity,
            SeedingStrategy::Stratified,
            SeedingStrategy::Uniform,
        ] {
            let mut rng = StdRng::seed_from_u64(5);
            let config = small_config().with_seeding(seeding);
            let mut cells = CellArray::new(config, &mut rng).unwrap();
            cells.seed_positions(&mut rng);
            assert!(cells.centers().iter().all(|c| cells.domain().contains(*c)));
            assert_eq!(cells.neighbours().cell_count(), 6);
        }
    }

    #[test]
    fn test_add_and_remove_keep_arrays_aligned() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut cells = CellArray::new(small_config(), &mut rng).unwrap();
        cells.seed_positions(&mut rng);

        let index = cells.add_cell(&mut rng);
        assert_eq!(index, 6);
        assert_eq!(cells.len(), 7);
        assert_eq!(cells.radii().len(), 7);
        assert_eq!(cells.neighbours().cell_count(), 7);

        let third = cells.centers()[3];
        let (removed, _) = cells.remove_cell(2).unwrap();
        assert_ne!(removed, third);
        assert_eq!(cells.centers()[2], third);
        assert_eq!(cells.len(), 6);
        assert_eq!(cells.radii().len(), 6);
        assert_eq!(cells.neighbours().cell_count(), 6);
    }

    #[test]
    fn test_failed_edits_leave_state_untouched() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut cells = CellArray::new(small_config(), &mut rng).unwrap();
        cells.seed_positions(&mut rng);
        let before = (cells.centers().to_vec(), cells.radii().to_vec());

        assert!(matches!(
            cells.remove_cell(42),
            Err(MathError::CellIndexOutOfRange { index: 42, len: 6 })
        ));
        assert!(cells.adjust_cell(0, Point2D::new(1.0, 1.0), -1.0).is_err());
        assert!(cells.insert_cell(Point2D::new(1.0, 1.0), 0.0).is_err());
        assert!(cells.restore(&[1.0, 2.0, 3.0], &[0.3, 0.3]).is_err());

        assert_eq!(before, (cells.centers().to_vec(), cells.radii().to_vec()));
    }

    #[test]
    fn test_empty_array_short_circuits() {
        let mut rng = StdRng::seed_from_u64(2);
        let config = small_config().with_cells(0);
        let mut cells = CellArray::new(config, &mut rng).unwrap();
        assert_eq!(cells.evaluate_cost(&[]).unwrap(), 0.0);
        assert!(cells.neighbours().is_empty());
        assert!(cells.validate_for_optimization().is_err());

        // Erste Zelle ohne Dichteinformation, danach k = min(2, n - 1)
        cells.add_cell(&mut rng);
        cells.add_cell(&mut rng);
        assert_eq!(cells.effective_neighbours(), 1);
        assert_eq!(cells.neighbours().row(0).len(), 1);
    }

    #[test]
    fn test_restore_adopts_snapshot_size() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut cells = CellArray::new(small_config(), &mut rng).unwrap();
        cells
            .restore(&[0.5, 1.5, 2.5, 1.0, 2.0, 3.0], &[0.2, 0.3, 0.4])
            .unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells.centers()[1], Point2D::new(1.5, 2.0));
        assert_eq!(cells.positions().as_slice(), &[0.5, 1.5, 2.5, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_mean_coverage() {
        let mut rng = StdRng::seed_from_u64(4);
        let cells = CellArray::new(small_config(), &mut rng).unwrap();
        assert_abs_diff_eq!(cells.mean_coverage(), 6.0 * PI * 0.09 / 20.0, epsilon = 1e-12);
    }
}
