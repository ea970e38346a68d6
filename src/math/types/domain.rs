// src/math/types/domain.rs

use crate::math::{error::*, types::*, utils::periodic};
use std::fmt;

/// Rechteckiges Gebiet mit periodischen Rändern (Torus).
///
/// Gegenüberliegende Kanten sind identifiziert: ein Punkt, der rechts
/// hinausläuft, erscheint links wieder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusDomain {
    width: f64,
    height: f64,
}

impl TorusDomain {
    /// Erstellt ein neues Gebiet; beide Ausdehnungen müssen positiv und endlich sein.
    pub fn new(width: f64, height: f64) -> MathResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(MathError::InvalidConfiguration {
                message: format!(
                    "Domain dimensions must be positive, got {} x {}",
                    width, height
                ),
            });
        }

        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Liegt der Punkt in `[0, width) x [0, height)`?
    pub fn contains(&self, point: Point2D) -> bool {
        (0.0..self.width).contains(&point.x) && (0.0..self.height).contains(&point.y)
    }

    /// Normalisiert einen Punkt in das Grundgebiet.
    pub fn wrap(&self, point: Point2D) -> Point2D {
        Point2D::new(
            periodic::wrap(point.x, self.width),
            periodic::wrap(point.y, self.height),
        )
    }

    /// Kürzester Verbindungsvektor von `a` nach `b` unter Berücksichtigung der Periodizität.
    pub fn delta(&self, a: Point2D, b: Point2D) -> Vector2D {
        Vector2D::new(
            periodic::delta(a.x, b.x, self.width),
            periodic::delta(a.y, b.y, self.height),
        )
    }

    /// Periodischer Abstand zweier Punkte.
    pub fn distance(&self, a: Point2D, b: Point2D) -> f64 {
        self.delta(a, b).norm()
    }

    /// Verschiebung der Kachel `(tx, ty)` mit `tx, ty ∈ {-1, 0, 1}`.
    pub fn tile_offset(&self, tx: i32, ty: i32) -> Vector2D {
        Vector2D::new(tx as f64 * self.width, ty as f64 * self.height)
    }
}

impl fmt::Display for TorusDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Torus({:.3} x {:.3})", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rejects_non_positive_dimensions() {
        assert!(TorusDomain::new(0.0, 1.0).is_err());
        assert!(TorusDomain::new(1.0, -2.0).is_err());
        assert!(TorusDomain::new(f64::NAN, 1.0).is_err());
        assert!(TorusDomain::new(3.0, 2.0).is_ok());
    }

    #[test]
    fn test_wrap_and_distance_across_edges() {
        let domain = TorusDomain::new(10.0, 10.0).unwrap();
        let wrapped = domain.wrap(Point2D::new(-0.5, 12.0));
        assert!(domain.contains(wrapped));
        assert_abs_diff_eq!(wrapped.x, 9.5, epsilon = 1e-12);
        assert_abs_diff_eq!(wrapped.y, 2.0, epsilon = 1e-12);

        let a = Point2D::new(0.1, 5.0);
        let b = Point2D::new(9.9, 5.0);
        assert_abs_diff_eq!(domain.distance(a, b), 0.2, epsilon = 1e-12);
    }
}
