// src/math/utils.rs

/// Mathematische Konstanten
pub mod constants {
    /// Untergrenze für Zellabstände im Kostenterm `sigmoid(gap) / distance`.
    pub const MIN_PAIR_DISTANCE: f64 = 1e-9;
    /// Radiusfaktor der Dichte-Messkreise: benachbarte Kreise berühren sich
    /// diagonal, wenn `radius = grid_spacing * AREA_RADIUS_FACTOR`.
    pub const AREA_RADIUS_FACTOR: f64 = std::f64::consts::FRAC_1_SQRT_2;
    pub const PI: f64 = std::f64::consts::PI;
}

/// Einfache Statistik über Slices
pub mod statistics {
    /// Arithmetisches Mittel, 0.0 für leere Eingaben
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Populations-Standardabweichung (Division durch N)
    pub fn std_dev(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let m = mean(values);
        let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }

    /// Wurzel der mittleren quadratischen Abweichung von `target`
    pub fn rms_deviation(values: &[f64], target: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let sum_sq = values.iter().map(|v| (v - target).powi(2)).sum::<f64>();
        (sum_sq / values.len() as f64).sqrt()
    }

    /// Maximum, `None` für leere Eingaben
    pub fn max(values: &[f64]) -> Option<f64> {
        values.iter().copied().reduce(f64::max)
    }
}

/// Hilfsfunktionen für periodische (toroidale) Koordinaten
pub mod periodic {
    /// Bildet `value` in das halboffene Intervall `[0, period)` ab.
    pub fn wrap(value: f64, period: f64) -> f64 {
        let wrapped = value.rem_euclid(period);
        // rem_euclid kann für winzige negative Werte genau `period` liefern
        if wrapped >= period { 0.0 } else { wrapped }
    }

    /// Kürzeste vorzeichenbehaftete Differenz `b - a` auf einem Kreis mit Umfang `period`.
    pub fn delta(a: f64, b: f64, period: f64) -> f64 {
        let mut d = (b - a).rem_euclid(period);
        if d > period * 0.5 {
            d -= period;
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_wrap_stays_in_half_open_interval() {
        assert_abs_diff_eq!(periodic::wrap(10.5, 10.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(periodic::wrap(-0.25, 10.0), 9.75, epsilon = 1e-12);
        assert_eq!(periodic::wrap(10.0, 10.0), 0.0);
        let tiny = periodic::wrap(-1e-18, 10.0);
        assert!((0.0..10.0).contains(&tiny));
    }

    #[test]
    fn test_periodic_delta_takes_short_way() {
        assert_abs_diff_eq!(periodic::delta(0.1, 9.9, 10.0), -0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(periodic::delta(9.9, 0.1, 10.0), 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(periodic::delta(2.0, 4.0, 10.0), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_population_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(statistics::std_dev(&values), 2.0, epsilon = 1e-12);
        assert_eq!(statistics::std_dev(&[]), 0.0);
        assert_abs_diff_eq!(statistics::rms_deviation(&[1.0, 3.0], 2.0), 1.0);
    }
}
