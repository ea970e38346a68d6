// src/math/optimization/line_search.rs

//! Eindimensionale Minimierung: Klammerung eines Minimums und Brent-Verfahren.

use super::minimizer::CountingObjective;
use nalgebra::DVector;

const GOLDEN_RATIO: f64 = 1.618034;
/// Komplement des goldenen Schnitts, `(3 - √5) / 2`
const GOLDEN_SECTION: f64 = 0.381_966_0;
const GROW_LIMIT: f64 = 110.0;
const BRACKET_MAX_ITERATIONS: usize = 1000;
const VERY_SMALL: f64 = 1e-21;
const BRENT_MIN_TOLERANCE: f64 = 1.0e-11;
const BRENT_MAX_ITERATIONS: usize = 500;

/// Drei Stellen `a, b, c` mit `f(b) <= f(a)` und `f(b) <= f(c)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub fa: f64,
    pub fb: f64,
    pub fc: f64,
}

/// Sucht ausgehend von `xa`, `xb` bergab eine Klammer um ein Minimum
/// (goldener Schnitt mit parabolischer Extrapolation).
///
/// Wird nach [`BRACKET_MAX_ITERATIONS`] keine Klammer gefunden, kommt die
/// zuletzt betrachtete Dreiergruppe zurück; das Brent-Verfahren liefert dann
/// deren besten Punkt.
pub fn bracket<F: FnMut(f64) -> f64>(f: &mut F, xa: f64, xb: f64) -> Bracket {
    let (mut xa, mut xb) = (xa, xb);
    let mut fa = f(xa);
    let mut fb = f(xb);
    if fa < fb {
        std::mem::swap(&mut xa, &mut xb);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut xc = xb + GOLDEN_RATIO * (xb - xa);
    let mut fc = f(xc);

    let mut iterations = 0;
    while fc < fb {
        let tmp1 = (xb - xa) * (fb - fc);
        let tmp2 = (xb - xc) * (fb - fa);
        let val = tmp2 - tmp1;
        let denom = if val.abs() < VERY_SMALL {
            2.0 * VERY_SMALL
        } else {
            2.0 * val
        };
        let mut w = xb - ((xb - xc) * tmp2 - (xb - xa) * tmp1) / denom;
        let wlim = xb + GROW_LIMIT * (xc - xb);

        if iterations > BRACKET_MAX_ITERATIONS {
            break;
        }
        iterations += 1;

        let mut fw;
        if (w - xc) * (xb - w) > 0.0 {
            // Parabelminimum zwischen b und c
            fw = f(w);
            if fw < fc {
                return Bracket {
                    a: xb,
                    b: w,
                    c: xc,
                    fa: fb,
                    fb: fw,
                    fc,
                };
            } else if fw > fb {
                return Bracket {
                    a: xa,
                    b: xb,
                    c: w,
                    fa,
                    fb,
                    fc: fw,
                };
            }
            w = xc + GOLDEN_RATIO * (xc - xb);
            fw = f(w);
        } else if (w - wlim) * (wlim - xc) >= 0.0 {
            w = wlim;
            fw = f(w);
        } else if (w - wlim) * (xc - w) > 0.0 {
            fw = f(w);
            if fw < fc {
                xb = xc;
                xc = w;
                w = xc + GOLDEN_RATIO * (xc - xb);
                fb = fc;
                fc = fw;
                fw = f(w);
            }
        } else {
            w = xc + GOLDEN_RATIO * (xc - xb);
            fw = f(w);
        }

        xa = xb;
        xb = xc;
        xc = w;
        fa = fb;
        fb = fc;
        fc = fw;
    }

    Bracket {
        a: xa,
        b: xb,
        c: xc,
        fa,
        fb,
        fc,
    }
}

/// Brent-Verfahren: Minimum von `f` mit relativer Toleranz `tol`.
/// Liefert `(x_min, f(x_min))`.
pub fn brent<F: FnMut(f64) -> f64>(f: &mut F, tol: f64) -> (f64, f64) {
    let br = bracket(f, 0.0, 1.0);

    let (mut x, mut w, mut v) = (br.b, br.b, br.b);
    let (mut fx, mut fw, mut fv) = (br.fb, br.fb, br.fb);
    let (mut a, mut b) = if br.a < br.c {
        (br.a, br.c)
    } else {
        (br.c, br.a)
    };
    // Auch ohne echte Klammer den besten bekannten Punkt behalten
    for (p, fp) in [(br.a, br.fa), (br.c, br.fc)] {
        if fp < fx {
            x = p;
            fx = fp;
        }
    }

    let mut deltax: f64 = 0.0;
    let mut rat: f64 = 0.0;
    for _ in 0..BRENT_MAX_ITERATIONS {
        let tol1 = tol * x.abs() + BRENT_MIN_TOLERANCE;
        let tol2 = 2.0 * tol1;
        let xmid = 0.5 * (a + b);
        if (x - xmid).abs() < tol2 - 0.5 * (b - a) {
            break;
        }

        if deltax.abs() <= tol1 {
            deltax = if x >= xmid { a - x } else { b - x };
            rat = GOLDEN_SECTION * deltax;
        } else {
            // Parabolische Interpolation durch x, w, v
            let tmp1 = (x - w) * (fx - fv);
            let mut tmp2 = (x - v) * (fx - fw);
            let mut p = (x - v) * tmp2 - (x - w) * tmp1;
            tmp2 = 2.0 * (tmp2 - tmp1);
            if tmp2 > 0.0 {
                p = -p;
            }
            tmp2 = tmp2.abs();
            let previous_step = deltax;
            deltax = rat;

            if p > tmp2 * (a - x) && p < tmp2 * (b - x) && p.abs() < (0.5 * tmp2 * previous_step).abs()
            {
                rat = p / tmp2;
                let u = x + rat;
                if (u - a) < tol2 || (b - u) < tol2 {
                    rat = if xmid - x >= 0.0 { tol1 } else { -tol1 };
                }
            } else {
                deltax = if x >= xmid { a - x } else { b - x };
                rat = GOLDEN_SECTION * deltax;
            }
        }

        let u = if rat.abs() < tol1 {
            x + if rat >= 0.0 { tol1 } else { -tol1 }
        } else {
            x + rat
        };
        let fu = f(u);

        if fu > fx {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        } else {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        }
    }

    (x, fx)
}

/// Minimiert entlang `direction` ab `origin`.
///
/// Liefert `(f_min, neuer Punkt, tatsächlicher Schritt)`. Für eine
/// Nullrichtung wird nur `origin` ausgewertet.
pub(crate) fn minimize_along(
    objective: &mut CountingObjective<'_, '_>,
    origin: &DVector<f64>,
    direction: &DVector<f64>,
    tol: f64,
) -> (f64, DVector<f64>, DVector<f64>) {
    if direction.iter().all(|&d| d == 0.0) {
        let value = objective.eval(origin);
        return (value, origin.clone(), direction.clone());
    }

    let mut along = |alpha: f64| objective.eval(&(origin + direction * alpha));
    let (alpha, value) = brent(&mut along, tol);
    let step = direction * alpha;
    (value, origin + &step, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bracket_encloses_minimum() {
        let mut f = |x: f64| (x - 7.3).powi(2);
        let br = bracket(&mut f, 0.0, 1.0);
        let (lo, hi) = if br.a < br.c { (br.a, br.c) } else { (br.c, br.a) };
        assert!(lo <= 7.3 && 7.3 <= hi, "{:?}", br);
        assert!(br.fb <= br.fa && br.fb <= br.fc);
    }

    #[test]
    fn test_brent_finds_parabola_minimum() {
        let mut f = |x: f64| 3.0 * (x + 2.5).powi(2) + 1.0;
        let (x, fx) = brent(&mut f, 1e-8);
        assert_abs_diff_eq!(x, -2.5, epsilon = 1e-6);
        assert_abs_diff_eq!(fx, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_brent_on_non_quadratic() {
        // Minimum von x^4 - 3x bei (3/4)^(1/3)
        let mut f = |x: f64| x.powi(4) - 3.0 * x;
        let (x, _) = brent(&mut f, 1e-8);
        assert_abs_diff_eq!(x, 0.75_f64.cbrt(), epsilon = 1e-5);
    }

    #[test]
    fn test_minimize_along_direction() {
        let mut objective = |x: &DVector<f64>| (x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2);
        let mut counting = CountingObjective::new(&mut objective);
        let origin = DVector::from_vec(vec![0.0, 2.0]);
        let direction = DVector::from_vec(vec![1.0, 0.0]);

        let (value, point, step) = minimize_along(&mut counting, &origin, &direction, 1e-6);
        assert_abs_diff_eq!(value, 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(point[0], 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(step[1], 0.0);
        assert!(counting.evaluations > 3);
    }
}
