// src/math/optimization/nelder_mead.rs

use super::minimizer::{CountingObjective, MinimizeOutcome, Minimizer, Objective};
use nalgebra::DVector;

/// Relative Auslenkung der Startsimplex-Ecken
const NONZERO_DELTA: f64 = 0.05;
/// Absolute Auslenkung für Startkoordinaten gleich 0
const ZERO_DELTA: f64 = 0.00025;

/// Downhill-Simplex-Verfahren nach Nelder und Mead.
///
/// Langsamer als [`super::Powell`] für das Zellfeld, braucht aber pro Iteration
/// nur wenige Auswertungen; sinnvoll mit deutlich höherem Iterationslimit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMead {
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
    /// Abbruch, wenn alle Ecken näher als `xatol` am besten Punkt liegen ...
    pub xatol: f64,
    /// ... und sich die Funktionswerte um weniger als `fatol` unterscheiden
    pub fatol: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            xatol: 1e-4,
            fatol: 1e-4,
        }
    }
}

struct Simplex {
    vertices: Vec<DVector<f64>>,
    values: Vec<f64>,
}

impl Simplex {
    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| self.values[a].total_cmp(&self.values[b]));
        self.vertices = order.iter().map(|&i| self.vertices[i].clone()).collect();
        self.values = order.iter().map(|&i| self.values[i]).collect();
    }

    fn is_collapsed(&self, xatol: f64, fatol: f64) -> bool {
        let best = &self.vertices[0];
        let x_spread = self.vertices[1..]
            .iter()
            .map(|v| (v - best).amax())
            .fold(0.0, f64::max);
        let f_spread = self.values[1..]
            .iter()
            .map(|f| (f - self.values[0]).abs())
            .fold(0.0, f64::max);
        x_spread <= xatol && f_spread <= fatol
    }

    /// Schwerpunkt aller Ecken außer der schlechtesten.
    fn centroid(&self) -> DVector<f64> {
        let n = self.vertices.len() - 1;
        let mut sum = DVector::zeros(self.vertices[0].len());
        for v in &self.vertices[..n] {
            sum += v;
        }
        sum / n as f64
    }
}

impl Minimizer for NelderMead {
    fn name(&self) -> &'static str {
        "Nelder-Mead"
    }

    fn minimize(
        &self,
        objective: &mut Objective<'_>,
        x0: DVector<f64>,
        max_iterations: usize,
    ) -> MinimizeOutcome {
        let n = x0.len();
        let mut f = CountingObjective::new(objective);

        let mut vertices = Vec::with_capacity(n + 1);
        vertices.push(x0.clone());
        for k in 0..n {
            let mut y = x0.clone();
            y[k] = if y[k] != 0.0 {
                y[k] * (1.0 + NONZERO_DELTA)
            } else {
                ZERO_DELTA
            };
            vertices.push(y);
        }
        let values = vertices.iter().map(|v| f.eval(v)).collect();
        let mut simplex = Simplex { vertices, values };
        simplex.sort();

        let (rho, chi, psi, sigma) = (self.reflection, self.expansion, self.contraction, self.shrink);
        let mut iterations = 1;
        let mut converged = false;

        while n > 0 && iterations < max_iterations {
            if simplex.is_collapsed(self.xatol, self.fatol) {
                converged = true;
                break;
            }

            let xbar = simplex.centroid();
            let worst = simplex.vertices[n].clone();
            let xr = &xbar * (1.0 + rho) - &worst * rho;
            let fxr = f.eval(&xr);
            let mut shrink = false;

            if fxr < simplex.values[0] {
                let xe = &xbar * (1.0 + rho * chi) - &worst * (rho * chi);
                let fxe = f.eval(&xe);
                if fxe < fxr {
                    simplex.vertices[n] = xe;
                    simplex.values[n] = fxe;
                } else {
                    simplex.vertices[n] = xr;
                    simplex.values[n] = fxr;
                }
            } else if fxr < simplex.values[n - 1] {
                simplex.vertices[n] = xr;
                simplex.values[n] = fxr;
            } else if fxr < simplex.values[n] {
                // Äußere Kontraktion
                let xc = &xbar * (1.0 + psi * rho) - &worst * (psi * rho);
                let fxc = f.eval(&xc);
                if fxc <= fxr {
                    simplex.vertices[n] = xc;
                    simplex.values[n] = fxc;
                } else {
                    shrink = true;
                }
            } else {
                // Innere Kontraktion
                let xcc = &xbar * (1.0 - psi) + &worst * psi;
                let fxcc = f.eval(&xcc);
                if fxcc < simplex.values[n] {
                    simplex.vertices[n] = xcc;
                    simplex.values[n] = fxcc;
                } else {
                    shrink = true;
                }
            }

            if shrink {
                let best = simplex.vertices[0].clone();
                for j in 1..=n {
                    let shrunk = &best + (&simplex.vertices[j] - &best) * sigma;
                    simplex.values[j] = f.eval(&shrunk);
                    simplex.vertices[j] = shrunk;
                }
            }

            simplex.sort();
            iterations += 1;
        }

        MinimizeOutcome {
            x: simplex.vertices[0].clone(),
            fun: simplex.values[0],
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
    fn test_quadratic_bowl() {
        let mut objective = |x: &DVector<f64>| (x[0] - 2.0).powi(2) + 3.0 * (x[1] - 0.5).powi(2);
        let outcome = NelderMead::default().minimize(&mut objective, DVector::from_vec(vec![0.0, 0.0]), 1000);
        assert!(outcome.converged);
        assert_abs_diff_eq!(outcome.x[0], 2.0, epsilon = 1e-2);
        assert_abs_diff_eq!(outcome.x[1], 0.5, epsilon = 1e-2);
    }

    #[test]
    fn test_never_worse_than_start() {
        let mut objective = |x: &DVector<f64>| x.iter().map(|v| v.sin() + 0.1 * v * v).sum::<f64>();
        let x0 = DVector::from_vec(vec![1.0, -2.0, 0.5]);
        let start = objective(&x0);
        let outcome = NelderMead::default().minimize(&mut objective, x0, 5);
        assert!(outcome.fun <= start);
        assert!(outcome.iterations <= 5);
    }

    #[test]
    fn test_empty_problem() {
        let mut objective = |_: &DVector<f64>| 4.0;
        let outcome = NelderMead::default().minimize(&mut objective, DVector::zeros(0), 10);
        assert_eq!(outcome.fun, 4.0);
        assert_eq!(outcome.evaluations, 1);
    }
}
