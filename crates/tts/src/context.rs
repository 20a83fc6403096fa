//! Run context threaded through every pipeline stage.
//!
//! Holds what would otherwise be process-wide state: the thresholds, the step counter,
//! the approaching-vertex worklist and the deferred angle-recompute queue. One context
//! per mesh; the mesh and its context are mutated together by `advect`.

use serde::{Deserialize, Serialize};

use crate::detector::{ApproachingVertices, DetectCfg};
use crate::guard::GuardCfg;
use crate::mesh::{EdgeId, HalfEdgeId, Mesh, Side};

/// All tunable thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsCfg {
    pub detect: DetectCfg,
    pub guard: GuardCfg,
    /// Relative total-area drift that triggers a warning.
    pub area_tolerance: f64,
}

impl Default for TtsCfg {
    fn default() -> Self {
        Self {
            detect: DetectCfg::default(),
            guard: GuardCfg::default(),
            area_tolerance: 1e-10,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Context {
    pub cfg: TtsCfg,
    pub(crate) step: u64,
    pub(crate) approaching: ApproachingVertices,
    pub(crate) tasks: Tasks,
}

impl Context {
    pub fn new(cfg: TtsCfg) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }

    /// Number of completed `advect` calls.
    pub fn step(&self) -> u64 {
        self.step
    }

    pub(crate) fn first_step(&self) -> bool {
        self.step == 0
    }

    /// Current worklist (empty between steps).
    pub fn approaching(&self) -> &ApproachingVertices {
        &self.approaching
    }

    /// Drop per-step detector state: worklist membership and pending tasks.
    /// Pairings persist across steps.
    pub fn reset(&mut self, mesh: &mut Mesh) {
        self.approaching.clear(mesh);
        self.tasks.run(mesh);
    }
}

/// Deferred interior-angle recomputation, run once the rings touched by an operation are
/// consistent again.
#[derive(Clone, Debug, Default)]
pub(crate) struct Tasks {
    angles: Vec<HalfEdgeId>,
}

impl Tasks {
    pub(crate) fn record(&mut self, h: HalfEdgeId) {
        self.angles.push(h);
    }

    /// Angles at both endpoints of every half-edge of `e`.
    pub(crate) fn record_edge(&mut self, mesh: &Mesh, e: EdgeId) {
        for side in Side::BOTH {
            if let Some(h) = mesh[e].half_edges[side.index()] {
                self.angles.push(h);
                self.angles.push(mesh[h].next);
            }
        }
    }

    pub(crate) fn run(&mut self, mesh: &mut Mesh) {
        for h in self.angles.drain(..) {
            if mesh.contains_half_edge(h) {
                mesh.refresh_angle(h);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.angles.len()
    }
}
