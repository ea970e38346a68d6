// src/math/point_distribution/config.rs
use crate::math::{
    error::{MathError, MathResult},
    utils::constants::AREA_RADIUS_FACTOR,
};
use std::path::PathBuf;

/// Auswahl des ableitungsfreien Minimierers für die innere Schleife.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinimizerKind {
    #[default]
    Powell,
    NelderMead,
}

/// Wie die Startpositionen beim Initialisieren verteilt werden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedingStrategy {
    /// Zelle für Zelle in Gebiete geringer Dichte
    #[default]
    LowDensity,
    /// Gleichmäßig auf Teilflächen verteilt, innerhalb zufällig
    Stratified,
    /// Rein zufällig
    Uniform,
}

/// Unveränderliche Konfiguration eines Zellfeldes und seiner Optimierung.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingConfig {
    pub num_cells: usize,
    pub width: f64,
    pub height: f64,
    /// Mittlerer Zellradius
    pub avg_radius: f64,
    /// Relative Standardabweichung der Radien (Anteil von `avg_radius`)
    pub radius_dispersion: f64,
    /// Anzahl Nachbarn pro Zelle im Kostenterm (k)
    pub num_neighbours: usize,
    /// Abstand der Dichte-Messpunkte
    pub grid_spacing: f64,
    /// Sollabstand; nur für die Abweichungsdiagnose, nicht für die Kosten
    pub desired_spacing: f64,
    /// Kostenziel, unter dem die Optimierung als konvergiert gilt
    pub cost_goal: f64,
    /// Iterationen pro Aufruf des Minimierers
    pub max_inner_iterations: usize,
    /// Maximale Anzahl äußerer Schleifen
    pub max_outer_loops: usize,
    pub minimizer: MinimizerKind,
    pub seeding: SeedingStrategy,
    pub seed: Option<u64>,
    /// Verzeichnis für Checkpoint-Dateien
    pub checkpoint_dir: PathBuf,
}

impl SpacingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cells(mut self, count: usize) -> Self {
        self.num_cells = count;
        self
    }

    pub fn with_dimensions(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_radius(mut self, avg_radius: f64, dispersion: f64) -> Self {
        self.avg_radius = avg_radius;
        self.radius_dispersion = dispersion;
        self
    }

    pub fn with_neighbours(mut self, k: usize) -> Self {
        self.num_neighbours = k;
        self
    }

    pub fn with_grid_spacing(mut self, spacing: f64) -> Self {
        self.grid_spacing = spacing;
        self
    }

    pub fn with_desired_spacing(mut self, spacing: f64) -> Self {
        self.desired_spacing = spacing;
        self
    }

    /// Setzt den Sollabstand auf den einer hexagonalen Packung mit `num_cells` Zellen.
    pub fn with_hexagonal_spacing(mut self) -> Self {
        if self.num_cells > 0 {
            let area_per_cell = self.width * self.height / self.num_cells as f64;
            self.desired_spacing = (2.0 * area_per_cell / 3.0_f64.sqrt()).sqrt();
        }
        self
    }

    pub fn with_cost_goal(mut self, goal: f64) -> Self {
        self.cost_goal = goal;
        self
    }

    pub fn with_iterations(mut self, inner: usize, outer: usize) -> Self {
        self.max_inner_iterations = inner;
        self.max_outer_loops = outer;
        self
    }

    pub fn with_minimizer(mut self, minimizer: MinimizerKind) -> Self {
        self.minimizer = minimizer;
        self
    }

    pub fn with_seeding(mut self, seeding: SeedingStrategy) -> Self {
        self.seeding = seeding;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_checkpoint_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.checkpoint_dir = dir.into();
        self
    }

    /// Radius der Dichte-Messkreise um jeden Gitterpunkt.
    pub fn sampling_radius(&self) -> f64 {
        self.grid_spacing * AREA_RADIUS_FACTOR
    }

    pub fn validate(&self) -> MathResult<()> {
        let invalid = |message: String| Err(MathError::InvalidConfiguration { message });

        if !(self.width > 0.0 && self.height > 0.0)
            || !self.width.is_finite()
            || !self.height.is_finite()
        {
            return invalid(format!(
                "Domain dimensions must be positive, got {} x {}",
                self.width, self.height
            ));
        }

        if !(self.avg_radius > 0.0) || !self.avg_radius.is_finite() {
            return invalid("Average cell radius must be positive".to_string());
        }

        if !(self.radius_dispersion >= 0.0) || !self.radius_dispersion.is_finite() {
            return invalid("Radius dispersion must be non-negative".to_string());
        }

        if self.num_cells > 0 && self.num_neighbours >= self.num_cells {
            return invalid(format!(
                "Number of neighbours ({}) must be less than the number of cells ({})",
                self.num_neighbours, self.num_cells
            ));
        }

        if !(self.grid_spacing > 0.0) || self.grid_spacing > self.width.min(self.height) {
            return invalid(format!(
                "Grid spacing must be in (0, {}], got {}",
                self.width.min(self.height),
                self.grid_spacing
            ));
        }

        // Jeder Messkreis muss mindestens zwei Zelldurchmesser aufnehmen können
        if self.sampling_radius() < 2.0 * self.avg_radius {
            return invalid(format!(
                "Grid spacing {} too small for cell radius {}: sampling radius {:.4} < {:.4}",
                self.grid_spacing,
                self.avg_radius,
                self.sampling_radius(),
                2.0 * self.avg_radius
            ));
        }

        if !(self.desired_spacing > 0.0) {
            return invalid("Desired cell spacing must be positive".to_string());
        }

        if self.max_inner_iterations == 0 || self.max_outer_loops == 0 {
            return invalid("Iteration limits must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            num_cells: 50,
            width: 20.0,
            height: 20.0,
            avg_radius: 0.5,
            radius_dispersion: 0.1,
            num_neighbours: 6,
            grid_spacing: 2.0,
            desired_spacing: 3.04,
            cost_goal: 0.01,
            max_inner_iterations: 3,
            max_outer_loops: 50,
            minimizer: MinimizerKind::Powell,
            seeding: SeedingStrategy::LowDensity,
            seed: None,
            checkpoint_dir: PathBuf::from("checkpoints"),
        }
    }
}
