//! **hsmr** — healthy-structure model response synthesis for one beam ROI.
//!
//! Given the measured curvature and applied load profiles of a region of
//! interest (ROI), reconstruct the curvature the *healthy* structure would
//! exhibit, under the assumption that damage is spatially sparse.  The
//! pipeline:
//!
//! 1. **Moment reconstruction** (`moment`): double prefix-summation of the
//!    load, normalised against the measured curvature's infinity norm.
//! 2. **Objective** (`objective`): residual between the moment-implied
//!    curvature and the measurement, reduced to a p-norm loss.
//! 3. **Optimiser** (`optimizer`): two-stage bounded Nelder–Mead fit via
//!    `argmin` — a stabilising p=2 stage, then the caller's target norm.
//!
//! Reference: Garrido, Domizio, Curadelli, Ambrosini.  *Synthesis of
//! healthy-structure model responses for damage quantification*, Structural
//! Health Monitoring, 2022.

pub mod types;
pub mod moment;
pub mod objective;
pub mod optimizer;
