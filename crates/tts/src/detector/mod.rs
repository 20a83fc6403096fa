//! Approach detection: which vertices are about to run into which edges.
//!
//! Purpose
//! - Within each polygon, pair every vertex that comes within the active distance of a
//!   non-incident boundary edge with its closest such edge, follow the distance over
//!   steps, and queue the vertex for surgery once it closes in fast enough (or is already
//!   within the small distance).
//!
//! Why this design
//! - Pairings are stored on both ends (`VertexAgent::edge`, `EdgeAgent::vertices`) so that
//!   edge rewiring can hand them over or re-validate them without a global search.
//! - A vertex keeps at most one pairing; a closer edge steals it.
//! - Side changes of a paired vertex are the crossing signal: there is no way back once a
//!   vertex is on the wrong side of an edge, so they are reported as fatal errors.
//!
//! The worklist (`ApproachingVertices`) is per step; pairings persist across steps and
//! carry the distance reference for the trend test.

mod agent;
mod config;
mod worklist;

pub use agent::{EdgeAgent, VertexAgent};
pub use config::DetectCfg;
pub use worklist::ApproachingVertices;

pub(crate) use agent::{clean_edge, handover, pair, side_of, unpair, update};

use tracing::debug;

use crate::context::Context;
use crate::error::{Result, TtsError};
use crate::mesh::{EdgeId, HalfEdgeId, Level, Mesh, PolygonId, Side, VertexId};
use crate::sphere::{orient, Coord};
use crate::track::Location;

/// Run detection over every polygon.
pub fn detect_all(mesh: &mut Mesh, ctx: &mut Context) -> Result<()> {
    for p in mesh.polygon_ids() {
        detect_polygon(mesh, ctx, p)?;
    }
    Ok(())
}

/// Detect approaches of the vertices of `p` towards the edges of `p`.
pub fn detect_polygon(mesh: &mut Mesh, ctx: &mut Context, p: PolygonId) -> Result<()> {
    let sphere = mesh.sphere;
    let ring = mesh.ring(p);
    let n = ring.len();
    if n < 3 {
        return Ok(());
    }
    for (j, &ep1) in ring.iter().enumerate() {
        let e1 = mesh[ep1].edge;
        let (v1, v2) = (mesh.he_first(ep1), mesh.he_second(ep1));
        let (x1, x2) = (mesh.coord(v1, Level::New), mesh.coord(v2, Level::New));
        let bbox = CoarseBox::around(&mesh[v1].point.loc, &mesh[v2].point.loc);
        for k in 1..n - 1 {
            let v3 = mesh.he_second(ring[(j + k) % n]);
            if v3 == v1 || v3 == v2 || mesh[v3].agent.approaching {
                continue;
            }
            if !bbox.contains(&mesh[v3].point.loc) {
                continue;
            }
            let x3 = mesh.coord(v3, Level::New);
            let Some((foot, d)) = sphere.project(&x1, &x2, &x3) else {
                if mesh[v3].agent.edge == Some(e1) {
                    unpair(mesh, &mut ctx.approaching, v3)?;
                }
                continue;
            };
            if !ctx.cfg.detect.is_active(&sphere, d) {
                continue;
            }
            // Side relative to the edge's own direction.
            let o = match mesh[ep1].side {
                Side::Left => orient(&x1, &x2, &x3),
                Side::Right => orient(&x2, &x1, &x3),
            };
            let side = side_of(o).ok_or(TtsError::OnEdge { vertex: v3, edge: e1 })?;
            let paired = mesh[v3].agent.edge;
            match paired {
                None => pair_new(mesh, ctx, v3, ep1, foot, d, side)?,
                Some(e) if e == e1 => {
                    if side != mesh[v3].agent.side {
                        return Err(TtsError::EdgeCrossing {
                            vertex: v3,
                            edge: e1,
                            stage: "detect",
                        });
                    }
                    let d0 = mesh[v3].agent.distance;
                    if ctx.cfg.detect.is_approaching(&sphere, d0, d) {
                        ctx.approaching.record(mesh, v3);
                    } else {
                        let agent = &mut mesh[v3].agent;
                        agent.foot = foot;
                        agent.distance = d;
                        handle_small_angle(mesh, ctx, ep1, v3)?;
                    }
                }
                Some(_) => {
                    if d < mesh[v3].agent.distance {
                        unpair(mesh, &mut ctx.approaching, v3)?;
                        pair_new(mesh, ctx, v3, ep1, foot, d, side)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn pair_new(
    mesh: &mut Mesh,
    ctx: &mut Context,
    v3: VertexId,
    ep1: HalfEdgeId,
    foot: Coord,
    d: f64,
    side: Side,
) -> Result<()> {
    let e1 = mesh[ep1].edge;
    if d <= ctx.cfg.detect.small_distance(&mesh.sphere) {
        // Queued vertices keep their old-level foot and distance; surgery cuts there.
        let [w1, w2] = mesh[e1].ends;
        let old = mesh.sphere.project(
            &mesh.coord(w1, Level::Old),
            &mesh.coord(w2, Level::Old),
            &mesh.coord(v3, Level::Old),
        );
        let (foot, d) = old.unwrap_or((foot, d));
        pair(mesh, v3, e1, foot, d, side);
        debug!(vertex = v3.0, edge = e1.0, distance = d, "paired within small distance");
        ctx.approaching.record(mesh, v3);
    } else {
        pair(mesh, v3, e1, foot, d, side);
        handle_small_angle(mesh, ctx, ep1, v3)?;
    }
    Ok(())
}

/// At a sharp corner of `ep1`, a vertex approaching the same edge from the other side
/// must not be processed before `v3`.
fn handle_small_angle(mesh: &mut Mesh, ctx: &mut Context, ep1: HalfEdgeId, v3: VertexId) -> Result<()> {
    let small = ctx.cfg.detect.small_angle_deg.to_radians();
    let next = mesh[ep1].next;
    if mesh[ep1].angle.new >= small && mesh[next].angle.new >= small {
        return Ok(());
    }
    let e1 = mesh[ep1].edge;
    let side = mesh[v3].agent.side;
    let partner = mesh[e1].agent.vertices.iter().copied().find(|&w| {
        w != v3 && mesh[w].agent.approaching && mesh[w].agent.side != side
    });
    if let Some(w) = partner {
        debug!(vertex = v3.0, before = w.0, edge = e1.0, "small angle");
        ctx.approaching.record_before(mesh, v3, w)?;
    }
    Ok(())
}

/// A jump of an interior angle by more than the configured limit within one step means
/// the boundary folded over itself.
pub fn check_angles(mesh: &Mesh, cfg: &DetectCfg) -> Result<()> {
    let limit = cfg.wrong_angle_jump_deg.to_radians();
    for h in mesh.half_edge_ids() {
        let a = mesh[h].angle;
        if (a.new - a.old).abs() > limit {
            return Err(TtsError::EdgeCrossing {
                vertex: mesh.he_first(h),
                edge: mesh[h].edge,
                stage: "angle",
            });
        }
    }
    Ok(())
}

/// Vertices paired with `e` that are queued this step.
pub(crate) fn approaching_on(mesh: &Mesh, e: EdgeId) -> impl Iterator<Item = VertexId> + '_ {
    mesh[e]
        .agent
        .vertices
        .iter()
        .copied()
        .filter(|&v| mesh[v].agent.approaching)
}

/// Coarse-bucket bounding box of an edge, one bucket of margin, longitude wrap-aware.
/// Disabled near the poles or when the locator provides no buckets.
#[derive(Clone, Copy, Debug)]
struct CoarseBox {
    all: bool,
    lon_start: usize,
    lon_width: usize,
    lon_count: usize,
    lat_lo: usize,
    lat_hi: usize,
}

impl CoarseBox {
    fn around(a: &Location, b: &Location) -> Self {
        let n = a.coarse_lon_count;
        let all = Self {
            all: true,
            lon_start: 0,
            lon_width: 0,
            lon_count: 0,
            lat_lo: 0,
            lat_hi: 0,
        };
        if a.on_pole || b.on_pole || n == 0 || n != b.coarse_lon_count {
            return all;
        }
        let (i1, i2) = (a.coarse.0 % n, b.coarse.0 % n);
        let fwd = (i2 + n - i1) % n;
        let (start, width) = if fwd <= n / 2 { (i1, fwd) } else { (i2, n - fwd) };
        if width + 3 >= n {
            return all;
        }
        Self {
            all: false,
            lon_start: (start + n - 1) % n,
            lon_width: width + 2,
            lon_count: n,
            lat_lo: a.coarse.1.min(b.coarse.1).saturating_sub(1),
            lat_hi: a.coarse.1.max(b.coarse.1) + 1,
        }
    }

    fn contains(&self, loc: &Location) -> bool {
        if self.all {
            return true;
        }
        let n = self.lon_count;
        let di = (loc.coarse.0 % n + n - self.lon_start) % n;
        di <= self.lon_width && (self.lat_lo..=self.lat_hi).contains(&loc.coarse.1)
    }
}

#[cfg(test)]
mod tests;
