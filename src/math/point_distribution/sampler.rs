// src/math/point_distribution/sampler.rs

use super::density::DensityGrid;
use crate::math::{
    spatial::TorusIndex,
    types::{Point2D, TorusDomain},
};
use rand::Rng;

/// Anzahl gewichteter Kandidaten-Gitterpunkte pro Ziehung.
pub const GRID_CANDIDATES: usize = 5;
/// Anzahl zufälliger Versätze um den gewählten Gitterpunkt.
pub const OFFSET_CANDIDATES: usize = 10;

/// Zieht Positionen bevorzugt aus dünn besiedelten Bereichen.
///
/// Der Sampler besitzt eine eigene Kopie des Dichtegitters und verändert das
/// Zellfeld nie; das Einfügen des gelieferten Punktes ist Sache des Aufrufers.
#[derive(Debug, Clone)]
pub struct LowDensitySampler {
    domain: TorusDomain,
    grid: DensityGrid,
}

impl LowDensitySampler {
    pub fn new(domain: TorusDomain, grid: DensityGrid) -> Self {
        Self { domain, grid }
    }

    /// Zieht einen Punkt für ein Zellfeld mit den gegebenen Mittelpunkten und Radien.
    ///
    /// 1. Ohne Zellen: gleichverteilter Zufallspunkt.
    /// 2. Sonst: Gewicht `max(density) - density(p)` je Gitterpunkt, fünf Ziehungen
    ///    proportional zum Gewicht (Binärsuche in der kumulierten Summe), davon
    ///    der Kandidat mit der geringsten Dichte.
    /// 3. Zehn zufällige Versätze innerhalb einer Gitterzelle um diesen Punkt;
    ///    zurück kommt der Versatz mit dem größten Abstand zur nächsten Zelle.
    pub fn sample<R: Rng + ?Sized>(
        &mut self,
        centers: &[Point2D],
        radii: &[f64],
        rng: &mut R,
    ) -> Point2D {
        let Some(index) = TorusIndex::build(centers, &self.domain) else {
            return self.uniform_point(rng);
        };
        if self.grid.is_empty() {
            return self.uniform_point(rng);
        }

        self.grid.recompute(Some(&index), radii);
        let anchor = self.grid.points()[self.pick_sparse_grid_point(rng)];
        self.best_clearance_offset(&index, anchor, rng)
    }

    fn uniform_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2D {
        Point2D::new(
            rng.random::<f64>() * self.domain.width(),
            rng.random::<f64>() * self.domain.height(),
        )
    }

    /// Index des gewählten Gitterpunktes.
    fn pick_sparse_grid_point<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let densities = self.grid.values();
        let max_density = self.grid.max();

        let mut cumulative = Vec::with_capacity(densities.len());
        let mut total = 0.0;
        for &d in densities {
            total += max_density - d;
            cumulative.push(total);
        }

        let last = densities.len() - 1;
        (0..GRID_CANDIDATES)
            .map(|_| {
                if total > 0.0 {
                    let u = rng.random::<f64>() * total;
                    cumulative.partition_point(|&c| c < u).min(last)
                } else {
                    // Völlig gleichmäßige Dichte: jeder Gitterpunkt gleich wahrscheinlich
                    rng.random_range(0..densities.len())
                }
            })
            .reduce(|best, candidate| {
                if densities[candidate] < densities[best] {
                    candidate
                } else {
                    best
                }
            })
            .unwrap_or(0)
    }

    fn best_clearance_offset<R: Rng + ?Sized>(
        &self,
        index: &TorusIndex,
        anchor: Point2D,
        rng: &mut R,
    ) -> Point2D {
        let half = 0.5 * self.grid.spacing();
        let mut best = self.domain.wrap(anchor);
        let mut best_clearance = f64::NEG_INFINITY;

        for _ in 0..OFFSET_CANDIDATES {
            let candidate = self.domain.wrap(Point2D::new(
                anchor.x + rng.random_range(-half..half),
                anchor.y + rng.random_range(-half..half),
            ));
            let clearance = index
                .nearest_cell(candidate)
                .map_or(f64::INFINITY, |hit| hit.distance);
            if clearance > best_clearance {
                best_clearance = clearance;
                best = candidate;
            }
        }

        best
    }
}
