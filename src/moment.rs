//! Moment reconstruction: load profile → baseline bending moment.
//!
//! Double discrete integration of the load with implicitly zero integration
//! constants, then rescaling so the result's infinity norm matches the
//! measured curvature's.  The missing constants (`s_0`, `m_0`) and the
//! dynamic stiffness are recovered later by the optimiser.

use crate::objective::p_norm;
use crate::types::{HsmrError, NormOrder};
use ndarray::Array1;

/// Prefix sum (discrete integration with a zero constant).
fn cumsum(v: &Array1<f64>) -> Array1<f64> {
    let mut acc = 0.0;
    v.iter()
        .map(|&x| {
            acc += x;
            acc
        })
        .collect()
}

/// Baseline bending moment of the ROI.
///
/// `m̄ = cumsum(cumsum(q)) · ‖c‖_∞ / ‖cumsum(cumsum(q))‖_∞`
///
/// Depends only on the inputs, never on the optimiser's iterate, so one
/// call per synthesis serves both fit stages.
///
/// # Errors
/// [`HsmrError::DegenerateLoad`] if the double integral has zero infinity
/// norm (e.g. an all-zero load profile): the normalisation would divide by
/// zero, and a NaN-poisoned baseline is rejected here rather than handed to
/// the solver.
pub fn baseline_moment(q: &Array1<f64>, c: &Array1<f64>) -> Result<Array1<f64>, HsmrError> {
    let raw = cumsum(&cumsum(q));

    let raw_inf = p_norm(&raw, NormOrder::Inf);
    if raw_inf == 0.0 {
        return Err(HsmrError::DegenerateLoad);
    }

    let scale = p_norm(c, NormOrder::Inf) / raw_inf;
    Ok(raw.mapv(|m| m * scale))
}
