// src/math/geometry/circle.rs

use crate::math::utils::constants::PI;

/// Fläche eines Kreises mit Radius `r`.
pub fn circle_area(r: f64) -> f64 {
    PI * r * r
}

/// Exakte Schnittfläche zweier Kreise mit Radien `r1`, `r2` und Mittelpunktsabstand `d`.
///
/// * Liegt ein Kreis vollständig im anderen (`d <= |r1 - r2|`), ist das Ergebnis
///   die Fläche des kleineren Kreises.
/// * Sind die Kreise disjunkt (`d >= r1 + r2`), ist das Ergebnis 0.
/// * Sonst gilt die Linsenformel
///   `r1² acos((d² + r1² - r2²) / 2dr1) + r2² acos((d² + r2² - r1²) / 2dr2)
///    - ½ sqrt((-d + r1 + r2)(d + r1 - r2)(d - r1 + r2)(d + r1 + r2))`.
pub fn exact_circle_overlap_area(r1: f64, r2: f64, d: f64) -> f64 {
    let d = d.abs();

    if d <= (r1 - r2).abs() {
        return circle_area(r1.min(r2));
    }

    if d >= r1 + r2 {
        return 0.0;
    }

    // Rundungsfehler nahe der Grenzfälle abfangen
    let cos1 = ((d * d + r1 * r1 - r2 * r2) / (2.0 * d * r1)).clamp(-1.0, 1.0);
    let cos2 = ((d * d + r2 * r2 - r1 * r1) / (2.0 * d * r2)).clamp(-1.0, 1.0);
    let kite = (-d + r1 + r2) * (d + r1 - r2) * (d - r1 + r2) * (d + r1 + r2);

    r1 * r1 * cos1.acos() + r2 * r2 * cos2.acos() - 0.5 * kite.max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_contained_circle_returns_smaller_area() {
        assert_relative_eq!(exact_circle_overlap_area(0.5, 2.0, 0.0), circle_area(0.5));
        assert_relative_eq!(exact_circle_overlap_area(2.0, 0.5, 1.0), circle_area(0.5));
        assert_relative_eq!(exact_circle_overlap_area(1.0, 1.0, 0.0), circle_area(1.0));
    }

    #[test]
    fn test_touching_circles_have_no_overlap() {
        assert_eq!(exact_circle_overlap_area(0.3, 0.7, 1.0), 0.0);
        assert_eq!(exact_circle_overlap_area(0.3, 0.7, 5.0), 0.0);
    }

    #[test]
    fn test_equal_circles_half_radius_apart() {
        // Zwei Einheitskreise im Abstand 1: 2π/3 - √3/2
        let expected = 2.0 * PI / 3.0 - 3.0_f64.sqrt() / 2.0;
        assert_abs_diff_eq!(exact_circle_overlap_area(1.0, 1.0, 1.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_overlap_is_continuous_and_non_increasing() {
        let (r, big_r) = (0.4, 0.9);
        let lower = big_r - r;
        let upper = big_r + r;
        let steps = 500;

        let mut previous = exact_circle_overlap_area(r, big_r, lower);
        assert_relative_eq!(previous, circle_area(r), max_relative = 1e-9);

        for i in 1..=steps {
            let d = lower + (upper - lower) * i as f64 / steps as f64;
            let area = exact_circle_overlap_area(r, big_r, d);
            assert!(area <= previous + 1e-12, "area increased at d = {}", d);
            assert!(previous - area < 0.01, "jump at d = {}", d);
            previous = area;
        }
        assert_abs_diff_eq!(previous, 0.0, epsilon = 1e-12);
    }
}
