//! Curvature guard: the per-step topology maintenance pipeline.
//!
//! Purpose
//! - Keep every polygon a faithful, non-self-intersecting parcel boundary after the
//!   vertices moved: split edges that bent, merge vertices that crowded, and split
//!   polygons whose boundary is about to touch itself.
//!
//! Pipeline (one call per step, after vertex tracking)
//! 1. Track the edge test points (located first on the very first step).
//! 2. `split_edges`, then detect, `merge_edges`, detect again.
//! 3. `split_polygons` drains the worklist.
//! 4. Reset the worklist and pending tasks; compact the arenas if topology changed.
//!
//! Why this design
//! - Every operation re-validates the detector pairings it disturbs (`handover`,
//!   `update`) so the crossing signal stays exact without a global re-scan.
//! - Degenerate polygons (one or two edges) are removed in the same pass that created
//!   them, handing their mass to a surviving neighbour, so mass is conserved exactly.

mod config;
mod degenerate;
mod edges;
mod split;

pub use config::GuardCfg;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::Context;
use crate::detector::detect_all;
use crate::error::Result;
use crate::mesh::{EdgeId, Mesh};
use crate::track::{Locator, Tracker, VelocityField};

/// What the guard changed in one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardReport {
    pub edges_split: usize,
    pub edges_merged: usize,
    pub polygons_split: usize,
}

impl GuardReport {
    pub fn changed(&self) -> bool {
        self.edges_split + self.edges_merged + self.polygons_split > 0
    }
}

/// Run the full maintenance pipeline for the current step.
pub fn guard<L: Locator, V: VelocityField>(
    mesh: &mut Mesh,
    ctx: &mut Context,
    tracker: &Tracker<'_, L, V>,
) -> Result<GuardReport> {
    let first = ctx.first_step();
    for e in mesh.edge_ids() {
        let tp = &mut mesh[e].test_point;
        if first {
            tracker.relocate(tp);
        }
        tracker.track(tp);
    }
    let mut report = GuardReport {
        edges_split: edges::split_edges(mesh, ctx, tracker)?,
        ..GuardReport::default()
    };
    detect_all(mesh, ctx)?;
    report.edges_merged = edges::merge_edges(mesh, ctx, tracker)?;
    detect_all(mesh, ctx)?;
    report.polygons_split = split::split_polygons(mesh, ctx, tracker)?;
    ctx.reset(mesh);
    if report.changed() {
        mesh.reindex()?;
    }
    debug!(
        step = ctx.step(),
        split = report.edges_split,
        merged = report.edges_merged,
        surgeries = report.polygons_split,
        "guard"
    );
    Ok(report)
}

/// Re-centre the test point of `e` on its (old-level) endpoints and track it through
/// the current step.
pub(crate) fn retrack<L: Locator, V: VelocityField>(
    mesh: &mut Mesh,
    tracker: &Tracker<'_, L, V>,
    e: EdgeId,
) {
    mesh.reset_test_point(e);
    let tp = &mut mesh[e].test_point;
    tracker.relocate(tp);
    tracker.track(tp);
}

#[cfg(test)]
mod tests;
