//! Objective evaluator tests — p-norms, moment model, loss, bound barrier.

use hsmr::objective::{bounds_penalty, fit_loss, fitted_moment, p_norm, softplus};
use hsmr::types::NormOrder;
use ndarray::{array, Array1};

// ─────────────────────────────────────────────────────────────
//  p-norms
// ─────────────────────────────────────────────────────────────

#[test]
fn p_norms_on_three_four_vector() {
    let e = array![3.0, -4.0];

    assert!((p_norm(&e, NormOrder::P(1)) - 7.0).abs() < 1e-12);
    assert!((p_norm(&e, NormOrder::P(2)) - 5.0).abs() < 1e-12);
    assert!((p_norm(&e, NormOrder::Inf) - 4.0).abs() < 1e-12);

    // General path:  (3³ + 4³)^(1/3) = 91^(1/3)
    let p3 = p_norm(&e, NormOrder::P(3));
    assert!((p3 - 91.0_f64.powf(1.0 / 3.0)).abs() < 1e-12);
}

/// A NaN residual element must poison every norm order, including the
/// infinity norm (where a max-fold would otherwise drop it).
#[test]
fn p_norm_propagates_nan_elements() {
    let e = array![f64::NAN, 1.0];
    for norm in [NormOrder::P(1), NormOrder::P(2), NormOrder::P(3), NormOrder::Inf] {
        assert!(p_norm(&e, norm).is_nan(), "norm {norm:?}");
    }
}

#[test]
fn p_norm_of_empty_residual_is_zero() {
    let e = Array1::<f64>::zeros(0);
    assert_eq!(p_norm(&e, NormOrder::P(1)), 0.0);
    assert_eq!(p_norm(&e, NormOrder::Inf), 0.0);
}

// ─────────────────────────────────────────────────────────────
//  Moment model + loss
// ─────────────────────────────────────────────────────────────

#[test]
fn fitted_moment_applies_integration_constants() {
    let baseline = array![1.0, 2.0, 3.0];
    let m = fitted_moment(&baseline, 0.5, 1.0);

    let expected = [2.0, 3.5, 5.0];
    for (got, want) in m.iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-12);
    }
}

/// A curvature constructed exactly from the moment model has zero loss at
/// the generating parameters, for every norm order.
#[test]
fn exact_model_has_zero_loss() {
    let baseline = array![1.0, 2.0, 3.0];
    let x = [2.0, 0.5, 1.0]; // dyn_stiff, s_0, m_0
    let c = fitted_moment(&baseline, x[1], x[2]).mapv(|m| m / x[0]);

    for norm in [NormOrder::P(1), NormOrder::P(2), NormOrder::P(3), NormOrder::Inf] {
        let loss = fit_loss(&x, &c, &baseline, norm);
        assert!(loss.abs() < 1e-14, "loss {loss} for {norm:?}");
    }
}

/// Zero dynamic stiffness divides the residual by zero.  The loss must
/// come back as +inf (never panic, never NaN) so the minimizer is pushed
/// away from that region.
#[test]
fn zero_stiffness_gives_infinite_loss() {
    let baseline = array![1.0, 2.0, 3.0];
    let c = array![1.0, 1.75, 2.5];

    for norm in [NormOrder::P(1), NormOrder::P(2), NormOrder::Inf] {
        let loss = fit_loss(&[0.0, 0.0, 0.0], &c, &baseline, norm);
        assert_eq!(loss, f64::INFINITY, "norm {norm:?}");
    }

    // 0/0 elements (zero baseline entry, zero constants) must also land on
    // +inf via the NaN guard — for every norm order, so singular stiffness
    // never masquerades as a zero-loss optimum.
    let zero_baseline = array![0.0, 0.0];
    let c2 = array![1.0, -1.0];
    for norm in [NormOrder::P(1), NormOrder::P(2), NormOrder::Inf] {
        let loss = fit_loss(&[0.0, 0.0, 0.0], &c2, &zero_baseline, norm);
        assert_eq!(loss, f64::INFINITY, "norm {norm:?}");
    }

    // All-zero curvature against an all-zero baseline is the fully
    // degenerate 0/0 case.
    let c3 = array![0.0, 0.0];
    let loss = fit_loss(&[0.0, 0.0, 0.0], &c3, &zero_baseline, NormOrder::Inf);
    assert_eq!(loss, f64::INFINITY);
}

// ─────────────────────────────────────────────────────────────
//  Bound barrier
// ─────────────────────────────────────────────────────────────

#[test]
fn unbounded_barrier_is_zero() {
    let lb = [f64::NEG_INFINITY; 3];
    let ub = [f64::INFINITY; 3];
    assert_eq!(bounds_penalty(&[1.0, -5.0, 100.0], &lb, &ub, 10.0), 0.0);
}

#[test]
fn barrier_grows_towards_and_past_a_bound() {
    let lb = [0.0, f64::NEG_INFINITY, f64::NEG_INFINITY];
    let ub = [f64::INFINITY; 3];

    let far = bounds_penalty(&[2.0, 0.0, 0.0], &lb, &ub, 10.0);
    let near = bounds_penalty(&[0.1, 0.0, 0.0], &lb, &ub, 10.0);
    let outside = bounds_penalty(&[-0.5, 0.0, 0.0], &lb, &ub, 10.0);

    assert!(far < near);
    assert!(near < outside);
}

#[test]
fn softplus_is_monotone_in_violation() {
    // Max barrier at b = 1: deeper violation, larger penalty.
    assert!(softplus(1.5, 1.0, 10.0) < softplus(2.0, 1.0, 10.0));
    // Min barrier at b = 1: same, mirrored.
    assert!(softplus(0.5, 1.0, -10.0) < softplus(0.0, 1.0, -10.0));
}
