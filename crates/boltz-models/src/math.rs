//! Stable exponential integrals for the continuous hidden domain.
//!
//! The continuous local normalizer and activation split the hidden density
//! at zero into two exponential pieces. Both pieces reduce to the integrals
//! below, whose naive closed forms divide by the exponent and blow up as it
//! approaches zero. Each helper switches to a series expansion near zero so
//! the exponent can cross zero without a discontinuity.

/// `∫ exp(a·t) dt` over `[t0, t1]`.
pub fn exp_integral(a: f64, t0: f64, t1: f64) -> f64 {
    let d = t1 - t0;
    let x = a * d;
    if x.abs() < 1e-12 {
        d * (a * t0).exp() * (1.0 + 0.5 * x)
    } else {
        (a * t0).exp() * x.exp_m1() / a
    }
}

/// `∫ t·exp(a·t) dt` over `[t0, t1]`.
///
/// The closed form `[exp(a·t)(a·t − 1)] / a²` cancels catastrophically for
/// small `|a|`: the subtraction loses two orders of the exponent, so its
/// relative error grows like `eps / a²`. The quadratic series truncates at
/// `O((a·scale)³)`, so at the `1e-4` threshold both branches agree to well
/// below `1e-12`.
pub fn exp_h_integral(a: f64, t0: f64, t1: f64) -> f64 {
    let scale = t0.abs().max(t1.abs());
    if (a * scale).abs() < 1e-4 {
        0.5 * (t1 * t1 - t0 * t0)
            + a * (t1.powi(3) - t0.powi(3)) / 3.0
            + a * a * (t1.powi(4) - t0.powi(4)) / 8.0
    } else {
        ((a * t1).exp() * (a * t1 - 1.0) - (a * t0).exp() * (a * t0 - 1.0)) / (a * a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn riemann<F: Fn(f64) -> f64>(f: F, t0: f64, t1: f64, n: usize) -> f64 {
        let dt = (t1 - t0) / n as f64;
        (0..n)
            .map(|k| f(t0 + (k as f64 + 0.5) * dt) * dt)
            .sum()
    }

    #[test]
    fn exp_integral_matches_quadrature() {
        for &a in &[-3.0, -0.5, 0.4, 2.5] {
            let exact = exp_integral(a, -1.0, 1.0);
            let approx = riemann(|t| (a * t).exp(), -1.0, 1.0, 200_000);
            assert!((exact - approx).abs() < 1e-8, "a = {a}");
        }
    }

    #[test]
    fn exp_integral_is_continuous_across_zero_exponent() {
        let below = exp_integral(-1e-13, 0.0, 1.0);
        let at = exp_integral(0.0, 0.0, 1.0);
        let above = exp_integral(1e-13, 0.0, 1.0);
        assert!((at - 1.0).abs() < 1e-12);
        assert!((below - at).abs() < 1e-12);
        assert!((above - at).abs() < 1e-12);
    }

    #[test]
    fn exp_h_integral_matches_quadrature() {
        for &a in &[-3.0, -0.5, 0.4, 2.5] {
            let exact = exp_h_integral(a, -1.0, 0.0);
            let approx = riemann(|t| t * (a * t).exp(), -1.0, 0.0, 200_000);
            assert!((exact - approx).abs() < 1e-8, "a = {a}");
        }
    }

    #[test]
    fn exp_h_integral_is_accurate_around_the_branch_switch() {
        // Straddle the series/closed-form boundary; both branches must agree
        // with quadrature far below the cancellation floor of the naive form.
        for &a in &[2e-5, 9e-5, 1.1e-4, 5e-4] {
            for &sign in &[1.0, -1.0] {
                let exact = exp_h_integral(sign * a, -1.0, 0.0);
                let approx = riemann(|t| t * (sign * a * t).exp(), -1.0, 0.0, 200_000);
                assert!((exact - approx).abs() < 1e-10, "a = {}", sign * a);
            }
        }
    }

    #[test]
    fn exp_h_integral_is_continuous_across_zero_exponent() {
        // At a = 0 the integral over [0, 1] is exactly 1/2.
        let at = exp_h_integral(0.0, 0.0, 1.0);
        assert!((at - 0.5).abs() < 1e-15);
        let near = exp_h_integral(1e-9, 0.0, 1.0);
        assert!((near - at).abs() < 1e-9);
    }
}
