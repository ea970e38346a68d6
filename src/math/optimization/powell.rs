// src/math/optimization/powell.rs

use super::{
    line_search::minimize_along,
    minimizer::{CountingObjective, MinimizeOutcome, Minimizer, Objective},
};
use nalgebra::{DMatrix, DVector};

/// Powells Richtungssatz-Verfahren (ohne Ableitungen).
///
/// Jede Iteration minimiert nacheinander entlang aller Richtungen des Satzes.
/// Danach wird die Gesamtverschiebung der Iteration extrapoliert; lohnt sie
/// sich, ersetzt sie die Richtung mit dem größten Einzelgewinn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Powell {
    /// Toleranz der Linienminimierung (relativ, in Schrittweiten)
    pub xtol: f64,
    /// Relative Toleranz der Funktionswertabnahme pro Iteration
    pub ftol: f64,
}

impl Default for Powell {
    fn default() -> Self {
        Self {
            xtol: 1e-4,
            ftol: 1e-4,
        }
    }
}

impl Minimizer for Powell {
    fn name(&self) -> &'static str {
        "Powell"
    }

    fn minimize(
        &self,
        objective: &mut Objective<'_>,
        x0: DVector<f64>,
        max_iterations: usize,
    ) -> MinimizeOutcome {
        let n = x0.len();
        let line_tol = self.xtol * 100.0;
        let mut f = CountingObjective::new(objective);

        let mut directions = DMatrix::<f64>::identity(n, n);
        let mut x = x0;
        let mut fval = f.eval(&x);
        let mut x_start = x.clone();
        let mut iterations = 0;
        let mut converged = false;

        while n > 0 && iterations < max_iterations {
            let f_start = fval;
            let mut biggest_drop = 0.0;
            let mut biggest_index = 0;

            for i in 0..n {
                let direction = directions.column(i).into_owned();
                let f_before = fval;
                let (value, point, _) = minimize_along(&mut f, &x, &direction, line_tol);
                fval = value;
                x = point;
                if f_before - fval > biggest_drop {
                    biggest_drop = f_before - fval;
                    biggest_index = i;
                }
            }
            iterations += 1;

            let bound = self.ftol * (f_start.abs() + fval.abs()) + 1e-20;
            if 2.0 * (f_start - fval) <= bound {
                converged = true;
                break;
            }
            if iterations >= max_iterations || (f_start.is_nan() && fval.is_nan()) {
                break;
            }

            // Extrapolation entlang der Gesamtverschiebung dieser Iteration
            let shift = &x - &x_start;
            let extrapolated = &x * 2.0 - &x_start;
            x_start = x.clone();
            let f_extrapolated = f.eval(&extrapolated);

            if f_start > f_extrapolated {
                let mut t = 2.0 * (f_start + f_extrapolated - 2.0 * fval);
                let gain = f_start - fval - biggest_drop;
                t *= gain * gain;
                let overshoot = f_start - f_extrapolated;
                t -= biggest_drop * overshoot * overshoot;
                if t < 0.0 {
                    let (value, point, step) = minimize_along(&mut f, &x, &shift, line_tol);
                    fval = value;
                    x = point;
                    if step.iter().any(|&s| s != 0.0) {
                        let last = directions.column(n - 1).into_owned();
                        directions.set_column(biggest_index, &last);
                        directions.set_column(n - 1, &step);
                    }
                }
            }
        }

        MinimizeOutcome {
            x,
            fun: fval,
            iterations,
            evaluations: f.evaluations,
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_coupled_quadratic() {
        let mut objective = |x: &DVector<f64>| {
            (x[0] - 1.0).powi(2) + 2.0 * (x[1] + 2.0).powi(2) + 0.5 * (x[0] - 1.0) * (x[1] + 2.0)
        };
        let outcome = Powell::default().minimize(&mut objective, DVector::zeros(2), 50);
        assert!(outcome.converged);
        assert_abs_diff_eq!(outcome.x[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(outcome.x[1], -2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(outcome.fun, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rosenbrock_improves() {
        let mut objective =
            |x: &DVector<f64>| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let x0 = DVector::from_vec(vec![-1.2, 1.0]);
        let start = objective(&x0);
        let outcome = Powell::default().minimize(&mut objective, x0, 200);
        assert!(outcome.fun < start * 1e-3);
    }

    #[test]
    fn test_iteration_cap_is_respected() {
        let mut objective = |x: &DVector<f64>| x.iter().map(|v| (v - 3.0).powi(4)).sum::<f64>();
        let outcome = Powell::default().minimize(&mut objective, DVector::zeros(4), 2);
        assert!(outcome.iterations <= 2);
        assert!(outcome.evaluations > 0);
        assert!(outcome.fun < 4.0 * 81.0);
    }

    #[test]
    fn test_outcome_value_matches_point() {
        let mut objective = |x: &DVector<f64>| (x[0] - 0.3).abs() + (x[1] * x[1]);
        let outcome = Powell::default().minimize(&mut objective, DVector::from_vec(vec![2.0, 1.0]), 5);
        assert_abs_diff_eq!(outcome.fun, objective(&outcome.x), epsilon = 1e-12);
    }
}
