//! Two-stage bounded fit driver via the `argmin` crate.
//!
//! Wraps the fit loss + softplus bound barrier into argmin's `CostFunction`
//! trait, then runs a Nelder–Mead simplex per stage: first with `p = 2` to
//! land a well-conditioned start, then with the caller's target norm from
//! that start.  The target norm is typically `p = 1` (sparsity-favouring)
//! and non-smooth, which is why the solver is gradient-free.
//!
//! The solver parameter is a plain `Vec<f64>`: argmin-math carries its own
//! ndarray impls, and keeping the 3-vector out of ndarray means the crate's
//! ndarray version never has to agree with argmin's.

use crate::moment;
use crate::objective::{bounds_penalty, fit_loss, fitted_moment};
use crate::types::{
    HsmrError, Interval, NormOrder, ParamBounds, Params, SolverOptions, SynthesisOptions,
    SynthesisResult,
};
use argmin::core::{CostFunction, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;

// ─────────────────────────────────────────────────────────────
//  argmin problem wrapper
// ─────────────────────────────────────────────────────────────

/// One stage's minimisation problem: measured curvature, shared baseline
/// moment, the stage's norm order, and the box bounds as a barrier.
struct FitProblem<'a> {
    curvature: &'a Array1<f64>,
    baseline: &'a Array1<f64>,
    norm: NormOrder,
    lb: [f64; 3],
    ub: [f64; 3],
    barrier_weight: f64,
    barrier_sharpness: f64,
}

impl CostFunction for FitProblem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let data_loss = fit_loss(x, self.curvature, self.baseline, self.norm);
        let barrier = self.barrier_weight
            * bounds_penalty(x, &self.lb, &self.ub, self.barrier_sharpness);
        Ok(data_loss + barrier)
    }
}

// ─────────────────────────────────────────────────────────────
//  Input validation  (fail fast, before any reconstruction)
// ─────────────────────────────────────────────────────────────

fn validate_interval(name: &str, interval: &Interval, guess: f64) -> Result<(), HsmrError> {
    if interval.lower.is_nan() || interval.upper.is_nan() {
        return Err(HsmrError::Bounds(format!("{name} bounds contain NaN")));
    }
    if interval.lower > interval.upper {
        return Err(HsmrError::Bounds(format!(
            "{name} bounds are inverted: lower {} > upper {}",
            interval.lower, interval.upper
        )));
    }
    if !interval.contains(guess) {
        return Err(HsmrError::Bounds(format!(
            "{name} initial guess {} lies outside [{}, {}]",
            guess, interval.lower, interval.upper
        )));
    }
    Ok(())
}

fn validate_inputs(
    c: &Array1<f64>,
    q: &Array1<f64>,
    opts: &SynthesisOptions,
) -> Result<(), HsmrError> {
    if c.is_empty() {
        return Err(HsmrError::Shape("curvature profile is empty".into()));
    }
    if c.len() != q.len() {
        return Err(HsmrError::Shape(format!(
            "curvature has {} samples but load has {}",
            c.len(),
            q.len()
        )));
    }
    if let NormOrder::P(0) = opts.norm {
        return Err(HsmrError::InvalidNorm(0));
    }

    let guess = opts.initial_guess;
    validate_interval("dyn_stiff", &opts.bounds.dyn_stiff, guess.dyn_stiff)?;
    validate_interval("s_0", &opts.bounds.s_0, guess.s_0)?;
    validate_interval("m_0", &opts.bounds.m_0, guess.m_0)?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────
//  Inner Nelder–Mead solve  (one call site, tagged by norm + start)
// ─────────────────────────────────────────────────────────────

struct StageOutcome {
    params: [f64; 3],
    loss: f64,
    converged: bool,
    iterations: usize,
}

/// Initial simplex around `x0`: the start point plus one vertex per
/// coordinate, perturbed by 5% of its magnitude (0.1 absolute at zero).
fn initial_simplex(x0: &[f64; 3]) -> Vec<Vec<f64>> {
    let mut vertices = vec![x0.to_vec()];
    for i in 0..3 {
        let mut v = x0.to_vec();
        v[i] += if x0[i] != 0.0 { 0.05 * x0[i].abs() } else { 0.1 };
        vertices.push(v);
    }
    vertices
}

/// Run one bounded Nelder–Mead stage.
///
/// Returns the best parameters found (clamped into their closed bound
/// intervals), the raw fit loss at those parameters, and the termination
/// status — non-convergence is reported, not raised.
fn run_stage(
    curvature: &Array1<f64>,
    baseline: &Array1<f64>,
    norm: NormOrder,
    x0: [f64; 3],
    bounds: &ParamBounds,
    opts: &SolverOptions,
) -> Result<StageOutcome, HsmrError> {
    let (lb, ub) = bounds.as_arrays();

    let problem = FitProblem {
        curvature,
        baseline,
        norm,
        lb,
        ub,
        barrier_weight: opts.barrier_weight,
        barrier_sharpness: opts.barrier_sharpness,
    };

    let solver = NelderMead::new(initial_simplex(&x0)).with_sd_tolerance(opts.sd_tolerance)?;

    let executor = Executor::new(problem, solver)
        .configure(|state| state.max_iters(opts.max_iterations as u64));

    let result = executor.run()?;

    let best = result
        .state()
        .get_best_param()
        .ok_or_else(|| HsmrError::Solver("Nelder-Mead returned no best parameters".into()))?;

    // The barrier is smooth, so the best vertex can sit marginally outside
    // a finite bound; the contract is the closed interval.
    let mut params = [best[0], best[1], best[2]];
    for i in 0..3 {
        params[i] = params[i].clamp(lb[i], ub[i]);
    }

    let converged = matches!(
        result.state().get_termination_reason(),
        Some(TerminationReason::SolverConverged)
    );

    Ok(StageOutcome {
        params,
        loss: fit_loss(&params, curvature, baseline, norm),
        converged,
        iterations: result.state().get_iter() as usize,
    })
}

// ─────────────────────────────────────────────────────────────
//  Top-level synthesis entry point
// ─────────────────────────────────────────────────────────────

/// Synthesise the healthy-structure curvature of one ROI.
///
/// `c` is the measured curvature profile, `q` the applied load profile,
/// index-aligned and of equal length.  The fit runs in two sequential
/// stages over `(dyn_stiff, s_0, m_0)`:
///
/// - **Stage A**: `p = 2`, from the caller's initial guess.  Smooth and
///   well-conditioned; exists purely to seed stage B near the optimum.
/// - **Stage B**: the caller's norm, from stage A's parameters, same
///   bounds.  Its parameters are the final result.
///
/// The baseline moment is reconstructed once and shared by both stages.
///
/// # Errors
/// - [`HsmrError::Shape`] / [`HsmrError::Bounds`] / [`HsmrError::InvalidNorm`]
///   before any optimisation work.
/// - [`HsmrError::DegenerateLoad`] if the load yields a zero baseline moment.
/// - [`HsmrError::Solver`] on argmin runtime failure.  Non-convergence is
///   *not* an error: the best iterate is returned with
///   [`SynthesisResult::converged`] set to `false`.
pub fn synthesize(
    c: &Array1<f64>,
    q: &Array1<f64>,
    opts: &SynthesisOptions,
) -> Result<SynthesisResult, HsmrError> {
    validate_inputs(c, q, opts)?;

    // Shared by both stages; depends only on the inputs.
    let baseline = moment::baseline_moment(q, c)?;

    let stage_a = run_stage(
        c,
        &baseline,
        NormOrder::P(2),
        opts.initial_guess.pack(),
        &opts.bounds,
        &opts.solver,
    )?;
    if opts.solver.verbose {
        eprintln!(
            "stage A (p=2): loss={:.6e}, iters={}, converged={}",
            stage_a.loss, stage_a.iterations, stage_a.converged,
        );
    }

    let stage_b = run_stage(c, &baseline, opts.norm, stage_a.params, &opts.bounds, &opts.solver)?;
    if opts.solver.verbose {
        eprintln!(
            "stage B ({:?}): loss={:.6e}, iters={}, converged={}",
            opts.norm, stage_b.loss, stage_b.iterations, stage_b.converged,
        );
    }

    let params = Params::unpack(stage_b.params);
    let fitted = fitted_moment(&baseline, params.s_0, params.m_0);
    let healthy = fitted.mapv(|m| m / params.dyn_stiff);

    Ok(SynthesisResult {
        healthy_curvature: healthy,
        baseline_moment: baseline,
        fitted_moment: fitted,
        params,
        loss: stage_b.loss,
        converged: stage_b.converged,
        iterations: stage_a.iterations + stage_b.iterations,
    })
}
