use serde::{Deserialize, Serialize};

use crate::sphere::Sphere;

/// Thresholds of the approach detector. Distances and angles are in degrees of arc, so the
/// same configuration works for any sphere radius.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectCfg {
    /// Vertex–edge distance below which a pairing is tracked at all.
    pub active_deg: f64,
    /// Distance at or below which any pairing counts as approaching.
    pub small_deg: f64,
    /// Lower/upper distance of the trend ramp.
    pub trend_d0_deg: f64,
    pub trend_d1_deg: f64,
    /// Relative-closure ratio required at and below `trend_d0_deg` / at and above `trend_d1_deg`.
    pub trend_p0: f64,
    pub trend_p1: f64,
    /// Interior angle below which a second approaching vertex across the same edge jumps
    /// the queue.
    pub small_angle_deg: f64,
    /// A per-step interior angle change larger than this means the boundary folded.
    pub wrong_angle_jump_deg: f64,
}

impl Default for DetectCfg {
    fn default() -> Self {
        Self {
            active_deg: 0.5,
            small_deg: 0.02,
            trend_d0_deg: 0.005,
            trend_d1_deg: 0.1,
            trend_p0: 0.3,
            trend_p1: 0.8,
            small_angle_deg: 5.0,
            wrong_angle_jump_deg: 180.0,
        }
    }
}

impl DetectCfg {
    #[inline]
    pub fn is_active(&self, sphere: &Sphere, distance: f64) -> bool {
        distance < sphere.arc(self.active_deg)
    }

    #[inline]
    pub fn small_distance(&self, sphere: &Sphere) -> f64 {
        sphere.arc(self.small_deg)
    }

    /// Relative closure `(d0 - d1) / d0` a pairing at distance `d` must reach per step.
    ///
    /// Smooth ramp from `p0` to `p1` between the two trend distances.
    pub fn trend(&self, sphere: &Sphere, distance: f64) -> f64 {
        let d0 = sphere.arc(self.trend_d0_deg);
        let d1 = sphere.arc(self.trend_d1_deg);
        if distance <= d0 {
            self.trend_p0
        } else if distance >= d1 {
            self.trend_p1
        } else {
            let t = (distance - d0) / (d1 - d0);
            (self.trend_p1 - self.trend_p0) * (4.0 - 3.0 * t) * t.powi(3) + self.trend_p0
        }
    }

    /// Whether a vertex that went from `old` to `new` distance is closing in fast enough
    /// (or is simply too close) to be handed to surgery.
    pub fn is_approaching(&self, sphere: &Sphere, old: f64, new: f64) -> bool {
        if new <= self.small_distance(sphere) {
            return true;
        }
        if old <= 0.0 {
            return false;
        }
        (old - new) / old >= self.trend(sphere, old)
    }
}
