// src/math/spatial/neighbors.rs

use super::torus_index::TorusIndex;
use crate::math::types::Point2D;

/// Ein Eintrag der Nachbartabelle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    /// ID der Nachbarzelle
    pub id: usize,
    /// Mittelpunktsabstand
    pub distance: f64,
    /// `distance - radius(i) - radius(id)`; negativ bei Überlappung
    pub gap: f64,
}

/// Die `k` nächsten Nachbarn jeder Zelle, zeilenweise flach gespeichert.
///
/// Die Tabelle wird immer vollständig aus Index und Radien neu berechnet und
/// nie inkrementell angepasst.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborTable {
    k: usize,
    cells: usize,
    entries: Vec<Neighbour>,
}

impl NeighborTable {
    /// Leere Tabelle (kein Nachbar, keine Zelle).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Berechnet die `k` nächsten Nachbarn jeder Zelle.
    ///
    /// Pro Zelle werden `k + 1` Replikate abgefragt; der Treffer der Zelle selbst
    /// (ihr Replikat in der Heimatkachel) wird verworfen. Liegen zwei Zellen exakt
    /// aufeinander, entscheidet damit die Replikat-ID und nicht der Abstand 0.
    pub fn compute(
        index: Option<&TorusIndex>,
        centers: &[Point2D],
        radii: &[f64],
        k: usize,
    ) -> Self {
        let Some(index) = index else {
            return Self::empty();
        };
        debug_assert_eq!(centers.len(), radii.len());

        let mut entries = Vec::with_capacity(centers.len() * k);
        for (i, &center) in centers.iter().enumerate() {
            let own_replica = index.home_replica(i);
            let row = index
                .k_nearest(center, k + 1)
                .into_iter()
                .filter(|hit| hit.replica != own_replica)
                .take(k)
                .map(|hit| Neighbour {
                    id: hit.cell,
                    distance: hit.distance,
                    gap: hit.distance - radii[i] - radii[hit.cell],
                });
            entries.extend(row);
        }

        Self {
            k,
            cells: centers.len(),
            entries,
        }
    }

    /// Anzahl der Nachbarn pro Zelle.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Anzahl der Zellen in der Tabelle.
    pub fn cell_count(&self) -> usize {
        self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nachbarn der Zelle `cell`, aufsteigend nach Abstand.
    pub fn row(&self, cell: usize) -> &[Neighbour] {
        let start = cell * self.k;
        self.entries.get(start..start + self.k).unwrap_or(&[])
    }

    /// Alle Einträge in Zeilenreihenfolge.
    pub fn entries(&self) -> &[Neighbour] {
        &self.entries
    }

    /// Alle Abstände in Zeilenreihenfolge.
    pub fn distances(&self) -> Vec<f64> {
        self.entries.iter().map(|n| n.distance).collect()
    }
}
