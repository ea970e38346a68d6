// src/sim/persistence.rs

use crate::math::point_distribution::CellArray;
use bevy::prelude::*;
use std::fs;
use std::io::Write;
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

const CENTRES_PREFIX: &str = "centres";
const RADII_PREFIX: &str = "radii";

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {} line {line}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: ParseFloatError,
    },

    #[error("Snapshot shape mismatch: expected {expected} coordinates, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Not a centres snapshot file: {}", .path.display())]
    UnrecognisedFileName { path: PathBuf },
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Positionen (erst alle x, dann alle y) und Radien eines Zellfeldes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellSnapshot {
    /// Äußere Iteration, nach der der Stand aufgenommen wurde
    pub iteration: usize,
    pub coordinates: Vec<f64>,
    pub radii: Vec<f64>,
}

impl CellSnapshot {
    pub fn from_cells(iteration: usize, cells: &CellArray) -> Self {
        Self {
            iteration,
            coordinates: cells.positions().as_slice().to_vec(),
            radii: cells.radii().to_vec(),
        }
    }

    pub fn cell_count(&self) -> usize {
        self.radii.len()
    }

    /// Prüft, ob die Koordinatenzahl genau `2 * expected_cells` ist.
    pub fn check_shape(&self, expected_cells: usize) -> PersistenceResult<()> {
        if self.coordinates.len() != 2 * expected_cells {
            return Err(PersistenceError::ShapeMismatch {
                expected: 2 * expected_cells,
                actual: self.coordinates.len(),
            });
        }
        Ok(())
    }
}

/// Dateipaar eines gespeicherten Snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotPaths {
    pub radii: PathBuf,
    pub centres: PathBuf,
}

/// Schreibt und liest Snapshots als zeilenweise Zahlenlisten.
///
/// Dateinamen: `radii_<unix-sekunden>_<laufnummer>.txt` und
/// `centres_<unix-sekunden>_<laufnummer>.txt`; die Laufnummer hält mehrere
/// Checkpoints derselben Sekunde auseinander.
#[derive(Resource, Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    sequence: u32,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sequence: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn set_dir(&mut self, dir: impl Into<PathBuf>) {
        self.dir = dir.into();
    }

    pub fn save(&mut self, snapshot: &CellSnapshot) -> PersistenceResult<SnapshotPaths> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let suffix = format!("_{}_{:04}.txt", stamp, self.sequence);
        self.sequence = self.sequence.wrapping_add(1);

        let paths = SnapshotPaths {
            radii: self.dir.join(format!("{RADII_PREFIX}{suffix}")),
            centres: self.dir.join(format!("{CENTRES_PREFIX}{suffix}")),
        };
        write_values(&paths.radii, &snapshot.radii)?;
        write_values(&paths.centres, &snapshot.coordinates)?;

        debug!(
            "Snapshot of {} cells saved to {}",
            snapshot.cell_count(),
            paths.centres.display()
        );
        Ok(paths)
    }

    /// Lädt einen Snapshot über den Pfad seiner Koordinatendatei; die
    /// Radiendatei ergibt sich aus dem Dateinamen.
    pub fn load(&self, centres_path: &Path) -> PersistenceResult<CellSnapshot> {
        let radii_path = radii_path_for(centres_path)?;
        let coordinates = read_values(centres_path)?;
        let radii = read_values(&radii_path)?;

        let snapshot = CellSnapshot {
            iteration: 0,
            coordinates,
            radii,
        };
        snapshot.check_shape(snapshot.cell_count())?;
        Ok(snapshot)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new("checkpoints")
    }
}

/// `.../centres<rest>` -> `.../radii<rest>`
pub fn radii_path_for(centres_path: &Path) -> PersistenceResult<PathBuf> {
    let unrecognised = || PersistenceError::UnrecognisedFileName {
        path: centres_path.to_path_buf(),
    };
    let file_name = centres_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(unrecognised)?;
    let rest = file_name
        .strip_prefix(CENTRES_PREFIX)
        .ok_or_else(unrecognised)?;
    Ok(centres_path.with_file_name(format!("{RADII_PREFIX}{rest}")))
}

fn write_values(path: &Path, values: &[f64]) -> PersistenceResult<()> {
    let io_error = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs::File::create(path).map_err(io_error)?;
    let mut content = String::with_capacity(values.len() * 26);
    for v in values {
        content.push_str(&format!("{:.18e}\n", v));
    }
    file.write_all(content.as_bytes()).map_err(io_error)
}

fn read_values(path: &Path) -> PersistenceResult<Vec<f64>> {
    let content = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            line.trim()
                .parse::<f64>()
                .map_err(|source| PersistenceError::Parse {
                    path: path.to_path_buf(),
                    line: i + 1,
                    source,
                })
        })
        .collect()
}
