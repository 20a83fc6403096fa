//! One time step of the parcel mesh: move every vertex, then repair topology.
//!
//! Purpose
//! - `advect` is the single entry point a host calls per step. It tracks all vertices,
//!   refreshes edge geometry and interior angles, rejects folded boundaries, runs the
//!   curvature guard and finally refreshes polygon areas.
//! - `reseed` re-establishes detector state after the host replaced or edited the mesh.
//!
//! Why this design
//! - The mesh and its `Context` are passed explicitly; no state lives outside them, so
//!   several meshes can be advected side by side.
//! - Tracer masses are Lagrangian: they never change during a step except where surgery
//!   redistributes them, so conservation is checked by summing them.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::Context;
use crate::detector::{check_angles, detect_all};
use crate::error::Result;
use crate::guard::{guard, GuardReport};
use crate::mesh::Mesh;
use crate::track::{Locator, Tracker, VelocityField};

/// Summary of one `advect` call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Index of the step just completed (0 for the first).
    pub step: u64,
    pub vertices: usize,
    pub edges: usize,
    pub polygons: usize,
    /// Sum of polygon areas after the step.
    pub total_area: f64,
    /// `total_area / sphere area - 1`.
    pub area_bias: f64,
    pub guard: GuardReport,
}

/// Advance `mesh` by one step of `tracker`.
///
/// On error the mesh is left mid-step and should be discarded.
pub fn advect<L: Locator, V: VelocityField>(
    mesh: &mut Mesh,
    ctx: &mut Context,
    tracker: &Tracker<'_, L, V>,
) -> Result<StepReport> {
    let vertices = mesh.vertex_ids();
    if ctx.first_step() {
        for &v in &vertices {
            tracker.relocate(&mut mesh[v].point);
        }
    }
    for &v in &vertices {
        tracker.track(&mut mesh[v].point);
    }
    for e in mesh.edge_ids() {
        mesh.refresh_edge(e);
    }
    for h in mesh.half_edge_ids() {
        mesh.refresh_angle(h);
    }
    check_angles(mesh, &ctx.cfg.detect)?;

    let guard = guard(mesh, ctx, tracker)?;

    let total_area: f64 = mesh.polygon_ids().into_iter().map(|p| mesh.calc_area(p)).sum();
    let area_bias = total_area / mesh.sphere.surface_area() - 1.0;
    if area_bias.abs() > ctx.cfg.area_tolerance {
        warn!(step = ctx.step, area_bias, "total area drifted");
    }
    let report = StepReport {
        step: ctx.step,
        vertices: mesh.num_vertices(),
        edges: mesh.num_edges(),
        polygons: mesh.num_polygons(),
        total_area,
        area_bias,
        guard,
    };
    info!(
        step = report.step,
        vertices = report.vertices,
        edges = report.edges,
        polygons = report.polygons,
        area_bias,
        "advect"
    );
    ctx.step += 1;
    Ok(report)
}

/// Locate every point afresh, rebuild the detector pairings and clear per-step state.
///
/// Call after the host rebuilt or rezoned the mesh between steps.
pub fn reseed<L: Locator, V: VelocityField>(
    mesh: &mut Mesh,
    ctx: &mut Context,
    tracker: &Tracker<'_, L, V>,
) -> Result<()> {
    for v in mesh.vertex_ids() {
        tracker.relocate(&mut mesh[v].point);
    }
    for e in mesh.edge_ids() {
        tracker.relocate(&mut mesh[e].test_point);
    }
    mesh.refresh_geometry();
    detect_all(mesh, ctx)?;
    ctx.reset(mesh);
    Ok(())
}
