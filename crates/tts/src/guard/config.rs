use serde::{Deserialize, Serialize};

use crate::sphere::Sphere;

/// Thresholds of the curvature guard. Lengths in degrees of arc.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardCfg {
    /// Split an edge when its test point strays from the chord midpoint by more than this
    /// fraction of the edge length.
    pub curvature_ratio: f64,
    /// Edges shorter than this are never split.
    pub min_split_length_deg: f64,
    /// A degree-2 vertex whose shorter edge is below this is merged away.
    pub merge_length_deg: f64,
    /// Snap the cut onto an edge endpoint when the foot is within this fraction of the
    /// edge length from it.
    pub snap_ratio: f64,
    /// Below this distance the approaching vertex itself is moved onto the edge; above it
    /// a connecting edge is inserted.
    pub connect_distance_deg: f64,
    /// A triangle whose height over its longest edge is below this fraction of that edge
    /// is collapsed.
    pub slim_ratio: f64,
}

impl Default for GuardCfg {
    fn default() -> Self {
        Self {
            curvature_ratio: 0.1,
            min_split_length_deg: 0.2,
            merge_length_deg: 0.05,
            snap_ratio: 0.1,
            connect_distance_deg: 0.04,
            slim_ratio: 0.01,
        }
    }
}

impl GuardCfg {
    #[inline]
    pub fn min_split_length(&self, sphere: &Sphere) -> f64 {
        sphere.arc(self.min_split_length_deg)
    }

    #[inline]
    pub fn merge_length(&self, sphere: &Sphere) -> f64 {
        sphere.arc(self.merge_length_deg)
    }

    #[inline]
    pub fn connect_distance(&self, sphere: &Sphere) -> f64 {
        sphere.arc(self.connect_distance_deg)
    }
}
