use ndarray::Array1;
use std::fmt;

// ─────────────────────────────────────────────────────────────
//  Error type
// ─────────────────────────────────────────────────────────────

/// Unified error type for all fallible operations in the crate.
///
/// Every function in the public API returns `Result<T, HsmrError>` instead
/// of panicking.  Shape and bounds problems are detected before any
/// optimisation work begins; solver *non-convergence* is deliberately not an
/// error (see [`SynthesisResult::converged`]).
#[derive(Debug)]
pub enum HsmrError {
    /// Curvature / load profiles disagree in length, or are empty.
    Shape(String),
    /// A bound interval is inverted or NaN, or an initial guess lies
    /// outside its own interval.
    Bounds(String),
    /// A p-norm order of zero was requested.
    InvalidNorm(u32),
    /// The reconstructed baseline moment has zero infinity norm, so the
    /// normalisation against the measured curvature is a division by zero.
    DegenerateLoad,
    /// Argmin solver returned an error.
    Solver(String),
}

impl fmt::Display for HsmrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape(msg) => write!(f, "shape error: {msg}"),
            Self::Bounds(msg) => write!(f, "bounds error: {msg}"),
            Self::InvalidNorm(p) => write!(f, "invalid norm order p = {p} (need p >= 1)"),
            Self::DegenerateLoad =>
                write!(f, "load profile yields a zero baseline moment; normalisation is undefined"),
            Self::Solver(msg) => write!(f, "solver error: {msg}"),
        }
    }
}

impl std::error::Error for HsmrError {}

impl From<argmin::core::Error> for HsmrError {
    fn from(e: argmin::core::Error) -> Self {
        Self::Solver(e.to_string())
    }
}

// ─────────────────────────────────────────────────────────────
//  Constants
// ─────────────────────────────────────────────────────────────

pub const DEFAULT_BARRIER_SHARPNESS: f64 = 10.0;

// ─────────────────────────────────────────────────────────────
//  Norm order
// ─────────────────────────────────────────────────────────────

/// Order of the p-norm used to reduce the residual to a scalar loss.
///
/// `P(1)` favours sparse, spiky deviations (consistent with localised
/// damage); `P(2)` is the smooth least-squares norm used by the
/// stabilisation stage; `Inf` is the maximum absolute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormOrder {
    /// Integer p-norm, `p >= 1`.
    P(u32),
    /// Infinity norm (maximum absolute value).
    Inf,
}

impl Default for NormOrder {
    fn default() -> Self {
        NormOrder::P(1)
    }
}

// ─────────────────────────────────────────────────────────────
//  Physical parameters
// ─────────────────────────────────────────────────────────────

/// The three physical unknowns fitted per ROI.
///
/// `moment = dyn_stiff × curvature`; `s_0` and `m_0` are the integration
/// constants (shear and bending moment at the initial end of the ROI) lost
/// by the zero-boundary-condition double integration of the load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    pub dyn_stiff: f64,
    pub s_0: f64,
    pub m_0: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self { dyn_stiff: 1.0, s_0: 0.0, m_0: 0.0 }
    }
}

impl Params {
    /// Pack into the solver's parameter vector, `[dyn_stiff, s_0, m_0]`.
    pub fn pack(&self) -> [f64; 3] {
        [self.dyn_stiff, self.s_0, self.m_0]
    }

    /// Unpack from the solver's parameter vector.
    pub fn unpack(x: [f64; 3]) -> Self {
        Self { dyn_stiff: x[0], s_0: x[1], m_0: x[2] }
    }
}

// ─────────────────────────────────────────────────────────────
//  Bounds
// ─────────────────────────────────────────────────────────────

/// Closed interval on the real line.  Unbounded ends are plain `±inf`
/// values rather than `Option`s, so bounded and unbounded parameters flow
/// through the driver uniformly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn unbounded() -> Self {
        Self { lower: f64::NEG_INFINITY, upper: f64::INFINITY }
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x <= self.upper
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Independent bound intervals for the three fitted parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamBounds {
    pub dyn_stiff: Interval,
    pub s_0: Interval,
    pub m_0: Interval,
}

impl ParamBounds {
    /// Split into packed `(lower, upper)` arrays in parameter order.
    pub fn as_arrays(&self) -> ([f64; 3], [f64; 3]) {
        (
            [self.dyn_stiff.lower, self.s_0.lower, self.m_0.lower],
            [self.dyn_stiff.upper, self.s_0.upper, self.m_0.upper],
        )
    }
}

// ─────────────────────────────────────────────────────────────
//  Solver / synthesis options
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Simplex standard-deviation tolerance for Nelder–Mead termination.
    pub sd_tolerance: f64,
    /// Iteration cap per stage.
    pub max_iterations: usize,
    pub barrier_weight: f64,
    pub barrier_sharpness: f64,
    /// Emit a one-line summary per stage on stderr.
    pub verbose: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            sd_tolerance: 1e-12,
            max_iterations: 500,
            barrier_weight: 1000.0,
            barrier_sharpness: DEFAULT_BARRIER_SHARPNESS,
            verbose: false,
        }
    }
}

/// Full configuration of one synthesis call.  The defaults reproduce the
/// reference formulation: guess `(1, 0, 0)`, target norm `p = 1`, fully
/// unbounded parameters.
#[derive(Debug, Clone, Default)]
pub struct SynthesisOptions {
    pub initial_guess: Params,
    pub norm: NormOrder,
    pub bounds: ParamBounds,
    pub solver: SolverOptions,
}

// ─────────────────────────────────────────────────────────────
//  Synthesis result
// ─────────────────────────────────────────────────────────────

/// Everything derived from one synthesis call.  All sequences have the
/// length of the input profiles; nothing is retained across calls.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// Curvature of the healthy ROI: `fitted_moment / dyn_stiff`.
    pub healthy_curvature: Array1<f64>,
    /// Bending moment with null integration constants, normalised against
    /// the measured curvature (diagnostic output).
    pub baseline_moment: Array1<f64>,
    /// Bending moment with the fitted integration constants applied.
    pub fitted_moment: Array1<f64>,
    /// Fitted physical parameters.
    pub params: Params,
    /// Final-stage loss at the returned parameters (caller's norm).
    pub loss: f64,
    /// Whether the final stage satisfied the solver's convergence
    /// criteria.  `false` still carries the best iterate found.
    pub converged: bool,
    /// Iterations across both stages.
    pub iterations: usize,
}
