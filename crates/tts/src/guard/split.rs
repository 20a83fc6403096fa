//! Polygon-splitting surgery.
//!
//! Purpose
//! - Resolve every queued approach of a vertex `v3` towards an edge `e1` of its polygon
//!   `p1` by cutting `p1` in two along `v3` → cut point on `e1`, before the boundary can
//!   cross itself.
//!
//! Modes
//! - `SnapFirst` / `SnapSecond`: the cut point is close to an endpoint of `e1`; `v3` is
//!   merged into that endpoint.
//! - `Move`: `v3` is already very close; it is merged into a new vertex on `e1`.
//! - `Connect`: a new vertex on `e1` and a new edge `v3`–new vertex.
//! - `Reuse`: moving `v3` would sweep over another vertex, so `e1` is bent through `v3`.
//!
//! The half of `p1` from `v3` round to `v1` becomes the new polygon `p3`. Polygons left
//! with fewer than three edges are collapsed; slim triangles are re-split once.

use tracing::{debug, warn};

use crate::context::Context;
use crate::detector::{detect_polygon, handover, pair, unpair, update};
use crate::error::{Result, TtsError};
use crate::mesh::{EdgeId, End, HalfEdgeId, Level, Mesh, Point, PolygonId, Side, VertexId};
use crate::sphere::{in_triangle, Coord};
use crate::track::{Locator, Tracker, VelocityField};

use super::degenerate::{collapse, drop_loops};
use super::retrack;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Mode {
    SnapFirst,
    SnapSecond,
    Move,
    Connect,
    Reuse,
}

impl Mode {
    /// Modes that add an edge from `v1` to the cut vertex.
    fn cuts(self) -> bool {
        matches!(self, Mode::Move | Mode::Connect | Mode::Reuse)
    }
}

/// Drain the approaching worklist. Returns the number of polygons split.
pub(crate) fn split_polygons<L: Locator, V: VelocityField>(
    mesh: &mut Mesh,
    ctx: &mut Context,
    tracker: &Tracker<'_, L, V>,
) -> Result<usize> {
    ctx.tasks.run(mesh);
    let mut count = 0;
    while let Some(v3) = ctx.approaching.front() {
        if !mesh.contains_vertex(v3) {
            return Err(TtsError::Missing {
                what: "approaching vertex",
                id: v3.0,
            });
        }
        let paired = mesh[v3].agent.edge;
        let Some(e1) = paired else {
            ctx.approaching.remove(mesh, v3)?;
            continue;
        };
        let d3 = mesh[v3].agent.distance;
        let closer = mesh[e1]
            .agent
            .vertices
            .iter()
            .copied()
            .find(|&w| w != v3 && mesh[w].agent.approaching && mesh[w].agent.distance < d3);
        if let Some(w) = closer {
            ctx.approaching.jump(w)?;
            continue;
        }
        if split_at(mesh, ctx, tracker, v3, e1, true, 0)?.is_some() {
            count += 1;
        }
        ctx.tasks.run(mesh);
        drop_if_stuck(mesh, ctx, v3, e1)?;
    }
    Ok(count)
}

/// Unqueue `v3` if it is still at the front after its surgery, so the worklist drains.
/// Returns whether it was dropped.
pub(super) fn drop_if_stuck(mesh: &mut Mesh, ctx: &mut Context, v3: VertexId, e1: EdgeId) -> Result<bool> {
    if ctx.approaching.front() != Some(v3) || !mesh.contains_vertex(v3) {
        return Ok(false);
    }
    warn!(vertex = v3.0, edge = e1.0, "approaching vertex not consumed, dropping it");
    unpair(mesh, &mut ctx.approaching, v3)?;
    Ok(true)
}

/// Cut the polygon `v3` is approaching along `v3` → `e1`. Returns the mode used, or `None`
/// when the pairing was stale and has been dissolved instead.
pub(super) fn split_at<L: Locator, V: VelocityField>(
    mesh: &mut Mesh,
    ctx: &mut Context,
    tracker: &Tracker<'_, L, V>,
    v3: VertexId,
    e1: EdgeId,
    allow_connect: bool,
    depth: u8,
) -> Result<Option<Mode>> {
    let side = mesh[v3].agent.side;
    let (Some(ep1), Some(ep5)) = (
        mesh[e1].half_edges[side.index()],
        mesh[e1].half_edges[side.opposite().index()],
    ) else {
        unpair(mesh, &mut ctx.approaching, v3)?;
        return Ok(None);
    };
    let (p1, p2) = (mesh[ep1].polygon, mesh[ep5].polygon);
    let Some(ep2) = mesh.ring(p1).into_iter().find(|&h| mesh.he_second(h) == v3) else {
        if mesh.vertex_polygons(v3).contains(&p1) {
            return Err(TtsError::VertexOffPolygon {
                vertex: v3,
                polygon: p1,
            });
        }
        unpair(mesh, &mut ctx.approaching, v3)?;
        return Ok(None);
    };
    let (v1, v2) = (mesh.he_first(ep1), mesh.he_second(ep1));
    let Some((mut mode, foot)) = choose_mode(mesh, ctx, v1, v2, v3) else {
        unpair(mesh, &mut ctx.approaching, v3)?;
        return Ok(None);
    };
    if !allow_connect && mode == Mode::Connect {
        mode = Mode::Move;
    }

    let mut test = match mode {
        Mode::SnapFirst => mesh[v1].point.clone(),
        Mode::SnapSecond => mesh[v2].point.clone(),
        _ => cut_point(mesh, tracker, v1, v2, v3, &foot),
    };
    let keep = match mode {
        Mode::SnapFirst => Some(v1),
        Mode::SnapSecond => Some(v2),
        _ => None,
    };
    if mode != Mode::Connect && sweeps_vertex(mesh, v3, &test.x.new, keep) {
        mode = Mode::Reuse;
        test = mesh[v3].point.clone();
    }
    if matches!(mode, Mode::Connect | Mode::Move) && bends_over_vertex(mesh, v1, v2, v3, [p1, p2], &test.x.new) {
        test.x.new = foot;
        tracker.relocate(&mut test);
    }
    unpair(mesh, &mut ctx.approaching, v3)?;
    debug!(vertex = v3.0, edge = e1.0, polygon = p1.0, ?mode, depth, "split polygon");

    // The part of p1 from v3 round to v1 (or v2 when snapping there) moves to p3.
    let end = if mode == Mode::SnapSecond {
        mesh[ep1].next
    } else {
        ep1
    };
    let p3 = mesh.add_polygon();
    let mut h = mesh[ep2].next;
    while h != end {
        let next = mesh[h].next;
        mesh.ring_move(h, p3);
        h = next;
    }

    let nv = match mode {
        Mode::SnapFirst => v1,
        Mode::SnapSecond => v2,
        Mode::Reuse => v3,
        Mode::Move | Mode::Connect => mesh.add_vertex(test),
    };
    let mut changed = vec![e1];
    if mode.cuts() {
        let ne1 = mesh.add_edge(v1, nv);
        let h3 = mesh.add_half_edge(ne1, Side::Left, p3);
        mesh.ring_push_back(p3, h3);
        let h5 = mesh.add_half_edge(ne1, Side::Right, p2);
        mesh.ring_insert_after(ep5, h5);
        if mode == Mode::Connect {
            let ne2 = mesh.add_edge(v3, nv);
            let a = mesh.add_half_edge(ne2, Side::Left, p1);
            mesh.ring_insert_after(ep2, a);
            let b = mesh.add_half_edge(ne2, Side::Right, p3);
            mesh.ring_insert_after(h3, b);
            retrack(mesh, tracker, ne2);
            changed.push(ne2);
        }
        let slot = match mesh[ep1].side {
            Side::Left => End::First,
            Side::Right => End::Second,
        };
        mesh.change_end(e1, slot, nv);
        mesh.refresh_edge(e1);
        retrack(mesh, tracker, e1);
        retrack(mesh, tracker, ne1);
        handover(mesh, ctx, e1, ne1)?;
        update(mesh, ctx, e1)?;
        changed.push(ne1);
    }

    let mut loops = Vec::new();
    if matches!(mode, Mode::SnapFirst | Mode::SnapSecond | Mode::Move) {
        for e in mesh[v3].edges.clone() {
            let Some(slot) = mesh.end_of(e, v3) else {
                continue;
            };
            mesh.change_end(e, slot, nv);
            if mesh.other_end(e, nv) == nv {
                loops.push(e);
                continue;
            }
            mesh.refresh_edge(e);
            retrack(mesh, tracker, e);
            update(mesh, ctx, e)?;
            changed.push(e);
        }
        mesh.remove_vertex(v3);
    }

    let mut candidates = vec![p1, p3];
    candidates.extend(drop_loops(mesh, ctx, &loops)?);
    if mesh.contains_vertex(nv) {
        candidates.extend(mesh.vertex_polygons(nv));
    }
    collapse(mesh, ctx, candidates, [p1, p3])?;
    share_mass(mesh, p1, p3);

    for p in [p1, p3] {
        if mesh.contains_polygon(p) {
            for h in mesh.ring(p) {
                ctx.tasks.record(h);
            }
        }
    }
    for e in changed {
        if mesh.contains_edge(e) {
            ctx.tasks.record_edge(mesh, e);
        }
    }
    ctx.tasks.run(mesh);

    if depth == 0 {
        for p in [p1, p3] {
            handle_slim(mesh, ctx, tracker, p)?;
        }
    }
    if mode.cuts() && mesh.contains_vertex(nv) {
        for q in mesh.vertex_polygons(nv) {
            detect_polygon(mesh, ctx, q)?;
        }
    }
    // Every polygon around nv changed shape, not only the two halves.
    if mesh.contains_vertex(nv) {
        for q in mesh.vertex_polygons(nv) {
            mesh.calc_area(q);
        }
    }
    Ok(Some(mode))
}

/// Mode and new-level foot of `v3` on `v1→v2`; `None` when the approach is no longer valid.
fn choose_mode(
    mesh: &Mesh,
    ctx: &Context,
    v1: VertexId,
    v2: VertexId,
    v3: VertexId,
) -> Option<(Mode, Coord)> {
    if v3 == v1 || v3 == v2 {
        return None;
    }
    let sphere = &mesh.sphere;
    let cfg = &ctx.cfg.guard;
    let (x1, x2) = (mesh.coord(v1, Level::New), mesh.coord(v2, Level::New));
    let (foot, d) = sphere.project(&x1, &x2, &mesh.coord(v3, Level::New))?;
    let snap = cfg.snap_ratio * sphere.distance(&x1, &x2);
    let (d1, d2) = (sphere.distance(&foot, &x1), sphere.distance(&foot, &x2));
    let mode = if d1 <= snap && d1 <= d2 {
        Mode::SnapFirst
    } else if d2 <= snap {
        Mode::SnapSecond
    } else if d < cfg.connect_distance(sphere) {
        Mode::Move
    } else {
        Mode::Connect
    };
    Some((mode, foot))
}

/// New cut vertex: the old-level foot of `v3` on `e1`, tracked through the step. Falls
/// back to the new-level foot when the old projection is off the arc.
fn cut_point<L: Locator, V: VelocityField>(
    mesh: &Mesh,
    tracker: &Tracker<'_, L, V>,
    v1: VertexId,
    v2: VertexId,
    v3: VertexId,
    foot: &Coord,
) -> Point {
    let old = mesh.sphere.project(
        &mesh.coord(v1, Level::Old),
        &mesh.coord(v2, Level::Old),
        &mesh.coord(v3, Level::Old),
    );
    match old {
        Some((foot_old, _)) => {
            let mut p = Point::at(foot_old);
            tracker.relocate(&mut p);
            tracker.track(&mut p);
            p
        }
        None => {
            let mut p = Point::at(*foot);
            tracker.relocate(&mut p);
            p
        }
    }
}

/// Moving `v3` to `target` drags its incident edges; true if that sweeps over a vertex of
/// a polygon around `v3`.
fn sweeps_vertex(mesh: &Mesh, v3: VertexId, target: &Coord, keep: Option<VertexId>) -> bool {
    let x3 = mesh.coord(v3, Level::New);
    let others: Vec<VertexId> = mesh
        .vertex_polygons(v3)
        .into_iter()
        .flat_map(|p| mesh.polygon_vertices(p))
        .filter(|&w| w != v3 && Some(w) != keep)
        .collect();
    mesh[v3].edges.iter().any(|&e| {
        let u = mesh.other_end(e, v3);
        let xu = mesh.coord(u, Level::New);
        others
            .iter()
            .filter(|&&w| w != u)
            .any(|&w| in_triangle(&xu, &x3, target, &mesh.coord(w, Level::New)))
    })
}

/// Bending `v1→v2` through `target` sweeps the triangle between them; true if a vertex of
/// `polygons` other than the three involved lies in it.
fn bends_over_vertex(
    mesh: &Mesh,
    v1: VertexId,
    v2: VertexId,
    v3: VertexId,
    polygons: [PolygonId; 2],
    target: &Coord,
) -> bool {
    let (x1, x2) = (mesh.coord(v1, Level::New), mesh.coord(v2, Level::New));
    polygons
        .iter()
        .flat_map(|&p| mesh.polygon_vertices(p))
        .filter(|&w| w != v1 && w != v2 && w != v3)
        .any(|w| in_triangle(&x1, &x2, target, &mesh.coord(w, Level::New)))
}

/// Pool the masses of the two halves and split them by area.
fn share_mass(mesh: &mut Mesh, p1: PolygonId, p3: PolygonId) {
    if !mesh.contains_polygon(p1) || !mesh.contains_polygon(p3) {
        return;
    }
    let (a1, a3) = (mesh.calc_area(p1), mesh.calc_area(p3));
    let total = a1 + a3;
    let w1 = if total > 0.0 { a1 / total } else { 0.5 };
    let pooled: Vec<f64> = mesh[p1]
        .masses
        .iter()
        .zip(&mesh[p3].masses)
        .map(|(a, b)| a + b)
        .collect();
    mesh[p1].masses = pooled.iter().map(|m| m * w1).collect();
    mesh[p3].masses = pooled.iter().map(|m| m * (1.0 - w1)).collect();
}

/// Collapse `p` if it is a triangle whose apex nearly lies on its longest edge.
fn handle_slim<L: Locator, V: VelocityField>(
    mesh: &mut Mesh,
    ctx: &mut Context,
    tracker: &Tracker<'_, L, V>,
    p: PolygonId,
) -> Result<()> {
    if !mesh.contains_polygon(p) || mesh[p].len != 3 {
        return Ok(());
    }
    let Some((long, c, foot, d)) = slim_apex(mesh, ctx, p) else {
        return Ok(());
    };
    let e = mesh[long].edge;
    let side = mesh[long].side;
    debug!(polygon = p.0, vertex = c.0, edge = e.0, "slim triangle");
    unpair(mesh, &mut ctx.approaching, c)?;
    pair(mesh, c, e, foot, d, side);
    split_at(mesh, ctx, tracker, c, e, false, 1)?;
    Ok(())
}

fn slim_apex(mesh: &Mesh, ctx: &Context, p: PolygonId) -> Option<(HalfEdgeId, VertexId, Coord, f64)> {
    let sphere = &mesh.sphere;
    let length = |h: HalfEdgeId| {
        sphere.distance(
            &mesh.coord(mesh.he_first(h), Level::New),
            &mesh.coord(mesh.he_second(h), Level::New),
        )
    };
    let long = mesh
        .ring(p)
        .into_iter()
        .max_by(|&a, &b| length(a).total_cmp(&length(b)))?;
    let c = mesh.he_second(mesh[long].next);
    let (a, b) = (mesh.he_first(long), mesh.he_second(long));
    if c == a || c == b {
        return None;
    }
    let (xa, xb, xc) = (
        mesh.coord(a, Level::New),
        mesh.coord(b, Level::New),
        mesh.coord(c, Level::New),
    );
    let h = sphere.distance_to_circle(&xa, &xb, &xc)?;
    if h >= ctx.cfg.guard.slim_ratio * length(long) {
        return None;
    }
    let (foot, d) = sphere.project(&xa, &xb, &xc)?;
    Some((long, c, foot, d))
}
