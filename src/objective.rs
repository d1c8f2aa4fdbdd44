//! Objective evaluation — pure ℝ³ → ℝ math, no solver state.
//!
//! Given a candidate `(dyn_stiff, s_0, m_0)`, the fitted moment is the
//! baseline moment with the integration constants applied; the loss is the
//! p-norm of the residual against the measured curvature.  The smooth
//! softplus barrier used for box bounds also lives here.

use crate::types::NormOrder;
use ndarray::Array1;

// ─────────────────────────────────────────────────────────────
//  p-norms
// ─────────────────────────────────────────────────────────────

/// p-norm of a residual vector: `(Σ|e_i|^p)^(1/p)`, or `max|e_i|` for the
/// infinity order.
pub fn p_norm(e: &Array1<f64>, norm: NormOrder) -> f64 {
    match norm {
        // `f64::max` prefers the non-NaN operand, so a plain fold would
        // silently drop NaN elements; they must poison the norm instead.
        NormOrder::Inf => {
            if e.iter().any(|v| v.is_nan()) {
                f64::NAN
            } else {
                e.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
            }
        }
        NormOrder::P(1) => e.iter().map(|v| v.abs()).sum(),
        NormOrder::P(2) => e.iter().map(|v| v * v).sum::<f64>().sqrt(),
        NormOrder::P(p) => {
            let p = f64::from(p);
            e.iter().map(|v| v.abs().powf(p)).sum::<f64>().powf(1.0 / p)
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Moment model
// ─────────────────────────────────────────────────────────────

/// Bending moment with integration constants applied:
/// `m[i] = m̄[i] + m_0 + i·s_0`.
pub fn fitted_moment(baseline: &Array1<f64>, s_0: f64, m_0: f64) -> Array1<f64> {
    baseline
        .iter()
        .enumerate()
        .map(|(i, &m)| m + m_0 + i as f64 * s_0)
        .collect()
}

/// Scalar fit loss at `x = [dyn_stiff, s_0, m_0]`.
///
/// Residual: `e[i] = c[i] − (m̄[i] + m_0 + i·s_0) / dyn_stiff`.
///
/// `dyn_stiff == 0` divides the residual by zero; the resulting `±inf`
/// propagates into the loss, and a `NaN` loss (from a `0/0` element) is
/// mapped to `+inf` so the solver's best-cost tracking stays ordered.
pub fn fit_loss(x: &[f64], curvature: &Array1<f64>, baseline: &Array1<f64>, norm: NormOrder) -> f64 {
    let dyn_stiff = x[0];
    let s_0 = x[1];
    let m_0 = x[2];

    let error: Array1<f64> = curvature
        .iter()
        .zip(baseline.iter())
        .enumerate()
        .map(|(i, (&c, &m))| c - (m + m_0 + i as f64 * s_0) / dyn_stiff)
        .collect();

    let loss = p_norm(&error, norm);
    if loss.is_nan() { f64::INFINITY } else { loss }
}

// ─────────────────────────────────────────────────────────────
//  Softplus barrier for box bounds
// ─────────────────────────────────────────────────────────────

/// Numerically stable log(1 + exp(z)).
#[inline]
fn log1pexp(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

/// Smooth one-sided barrier.
/// `k < 0` ⟹  penalise x < b  (min barrier).
/// `k > 0` ⟹  penalise x > b  (max barrier).
#[inline]
pub fn softplus(x: f64, b: f64, k: f64) -> f64 {
    let z = -k * (b - x) - 1.0;
    log1pexp(z)
}

/// Smooth barrier loss for the packed parameter vector.  Infinite bound
/// ends contribute nothing, so fully unbounded fits see the raw loss.
pub fn bounds_penalty(x: &[f64], lb: &[f64; 3], ub: &[f64; 3], sharpness: f64) -> f64 {
    let mut loss = 0.0;
    for i in 0..3 {
        if lb[i].is_finite() {
            loss += softplus(x[i], lb[i], -sharpness);
        }
        if ub[i].is_finite() {
            loss += softplus(x[i], ub[i], sharpness);
        }
    }
    loss
}
