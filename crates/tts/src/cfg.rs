//! Numeric tolerances for the geometry kernel (internal).
//!
//! Policy
//! - These guard degenerate arithmetic (parallel vectors, zero-length arcs) and are not
//!   physical thresholds. Physical thresholds live in `DetectCfg` / `GuardCfg` and are
//!   configurable.

/// `|a × b|` below this means the arc `a`–`b` has no well-defined great circle.
pub(crate) const DEGENERATE_EPS: f64 = 1e-14;
/// Orientation determinant magnitude treated as "on the arc".
pub(crate) const ORIENT_EPS: f64 = 1e-15;
/// Slack for the foot-inside-arc test (unit sphere, radians).
pub(crate) const ARC_EPS: f64 = 1e-14;
