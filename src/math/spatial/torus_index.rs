// src/math/spatial/torus_index.rs

use crate::math::types::{Point2D, TorusDomain};
use rstar::{RTree, primitives::GeomWithData};

/// Ein Replikat ("Geisterzelle") im R*-Baum; `data` ist die Replikat-ID.
type Replica = GeomWithData<[f64; 2], usize>;

/// Anzahl der Kacheln: Heimatkachel plus acht periodische Nachbarn.
pub const TILE_COUNT: usize = 9;
/// Index der Heimatkachel (Verschiebung (0, 0)).
pub const HOME_TILE: usize = 4;

/// Ergebnis einer Nachbarschaftsabfrage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHit {
    /// ID der echten Zelle (`replica_id % n`)
    pub cell: usize,
    /// ID des getroffenen Replikats
    pub replica: usize,
    /// Euklidischer Abstand zum Abfragepunkt
    pub distance: f64,
}

/// Periodischer Nächste-Nachbarn-Index.
///
/// Jede Zelle wird in alle neun Kacheln des Torus kopiert. Die Kachel `t` hat
/// die Verschiebung `((t % 3) - 1, (t / 3) - 1)` und das Replikat von Zelle `i`
/// erhält die ID `t * n + i`, sodass `replica_id % n` die echte Zelle liefert.
/// Der Index wird bei jeder Positionsänderung vollständig neu aufgebaut.
#[derive(Debug)]
pub struct TorusIndex {
    tree: RTree<Replica>,
    cell_count: usize,
}

impl TorusIndex {
    /// Baut den Index auf. Für ein leeres Zellfeld gibt es keinen Index (`None`).
    pub fn build(centers: &[Point2D], domain: &TorusDomain) -> Option<Self> {
        let n = centers.len();
        if n == 0 {
            return None;
        }

        let mut replicas = Vec::with_capacity(TILE_COUNT * n);
        for tile in 0..TILE_COUNT {
            let offset = domain.tile_offset((tile % 3) as i32 - 1, (tile / 3) as i32 - 1);
            for (i, center) in centers.iter().enumerate() {
                let p = *center + offset;
                replicas.push(GeomWithData::new([p.x, p.y], tile * n + i));
            }
        }

        Some(Self {
            tree: RTree::bulk_load(replicas),
            cell_count: n,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Replikat-ID der Zelle `cell` in der Heimatkachel.
    pub fn home_replica(&self, cell: usize) -> usize {
        HOME_TILE * self.cell_count + cell
    }

    fn hit(&self, replica: &Replica, distance_2: f64) -> IndexHit {
        IndexHit {
            cell: replica.data % self.cell_count,
            replica: replica.data,
            distance: distance_2.sqrt(),
        }
    }

    /// Die `k` nächsten Replikate zu `point`, aufsteigend nach Abstand sortiert.
    pub fn k_nearest(&self, point: Point2D, k: usize) -> Vec<IndexHit> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[point.x, point.y])
            .take(k)
            .map(|(replica, distance_2)| self.hit(replica, distance_2))
            .collect()
    }

    /// Alle Replikate im Abstand `<= radius` um `point`.
    ///
    /// Ist `radius` größer als die halbe Gebietsbreite, kann dieselbe Zelle über
    /// mehrere Replikate getroffen werden; das entspricht der periodischen Geometrie.
    pub fn within_radius(&self, point: Point2D, radius: f64) -> Vec<IndexHit> {
        let query = [point.x, point.y];
        self.tree
            .locate_within_distance(query, radius * radius)
            .map(|replica| {
                let dx = replica.geom()[0] - point.x;
                let dy = replica.geom()[1] - point.y;
                self.hit(replica, dx * dx + dy * dy)
            })
            .collect()
    }

    /// Die nächstgelegene existierende Zelle zu `point`.
    pub fn nearest_cell(&self, point: Point2D) -> Option<IndexHit> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[point.x, point.y])
            .next()
            .map(|(replica, distance_2)| self.hit(replica, distance_2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn domain() -> TorusDomain {
        TorusDomain::new(10.0, 10.0).unwrap()
    }

    #[test]
    fn test_empty_array_has_no_index() {
        assert!(TorusIndex::build(&[], &domain()).is_none());
    }

    #[test]
    fn test_replica_ids_map_back_to_cells() {
        let centers = vec![
            Point2D::new(1.0, 1.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(8.0, 2.0),
        ];
        let index = TorusIndex::build(&centers, &domain()).unwrap();

        for (i, c) in centers.iter().enumerate() {
            let hit = index.nearest_cell(*c).unwrap();
            assert_eq!(hit.cell, i);
            assert_eq!(hit.replica, index.home_replica(i));
            assert_abs_diff_eq!(hit.distance, 0.0);
        }

        // Ein Punkt jenseits des rechten Randes trifft das Replikat von Zelle 0
        let hit = index.nearest_cell(Point2D::new(11.0, 1.0)).unwrap();
        assert_eq!(hit.cell, 0);
        assert_ne!(hit.replica, index.home_replica(0));
    }

    #[test]
    fn test_nearest_neighbour_across_periodic_edge() {
        let centers = vec![Point2D::new(0.1, 5.0), Point2D::new(9.9, 5.0)];
        let index = TorusIndex::build(&centers, &domain()).unwrap();

        let hits = index.k_nearest(centers[0], 2);
        assert_eq!(hits[0].cell, 0);
        assert_eq!(hits[1].cell, 1);
        assert_abs_diff_eq!(hits[1].distance, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_range_query_is_periodic() {
        let centers = vec![Point2D::new(0.2, 0.2), Point2D::new(5.0, 5.0)];
        let index = TorusIndex::build(&centers, &domain()).unwrap();

        let hits = index.within_radius(Point2D::new(9.9, 9.9), 0.5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].cell, 0);
        assert_abs_diff_eq!(hits[0].distance, (0.3_f64 * 0.3 * 2.0).sqrt(), epsilon = 1e-12);
    }
}
