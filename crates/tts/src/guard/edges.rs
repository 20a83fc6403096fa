//! Edge refinement (split at the test point) and coarsening (merge at degree-2 vertices).

use tracing::debug;

use crate::context::Context;
use crate::detector::{approaching_on, clean_edge, handover, unpair, update};
use crate::error::{Result, TtsError};
use crate::mesh::{EdgeId, End, Level, Mesh, Side, VertexId};
use crate::sphere::{in_triangle, midpoint};
use crate::track::{Locator, Tracker, VelocityField};

use super::retrack;

/// Split every edge whose test point strayed too far from its chord. Returns the count.
pub(crate) fn split_edges<L: Locator, V: VelocityField>(
    mesh: &mut Mesh,
    ctx: &mut Context,
    tracker: &Tracker<'_, L, V>,
) -> Result<usize> {
    let mut count = 0;
    for e in mesh.edge_ids() {
        if mesh.contains_edge(e) && bent(mesh, ctx, e) {
            split_edge(mesh, ctx, tracker, e)?;
            count += 1;
        }
    }
    ctx.tasks.run(mesh);
    Ok(count)
}

fn bent(mesh: &Mesh, ctx: &Context, e: EdgeId) -> bool {
    let cfg = &ctx.cfg.guard;
    let [a, b] = mesh[e].ends;
    if a == b {
        return false;
    }
    let (xa, xb) = (mesh.coord(a, Level::New), mesh.coord(b, Level::New));
    let len = mesh.sphere.distance(&xa, &xb);
    if len < cfg.min_split_length(&mesh.sphere) {
        return false;
    }
    let dev = mesh.sphere.distance(&mesh[e].test_point.x.new, &midpoint(&xa, &xb));
    dev > cfg.curvature_ratio * len
}

/// Insert a vertex at the test point of `e = v1→v2`: `e` becomes `v1→n`, a new edge
/// `n→v2` follows it in both adjacent rings.
pub(crate) fn split_edge<L: Locator, V: VelocityField>(
    mesh: &mut Mesh,
    ctx: &mut Context,
    tracker: &Tracker<'_, L, V>,
    e: EdgeId,
) -> Result<VertexId> {
    let v2 = mesh[e].ends[1];
    let n = mesh.add_vertex(mesh[e].test_point.clone());
    let e2 = mesh.add_edge(n, v2);
    mesh.change_end(e, End::Second, n);
    if let Some(hl) = mesh[e].half_edges[Side::Left.index()] {
        let p = mesh[hl].polygon;
        let h = mesh.add_half_edge(e2, Side::Left, p);
        mesh.ring_insert_after(hl, h);
    }
    if let Some(hr) = mesh[e].half_edges[Side::Right.index()] {
        let p = mesh[hr].polygon;
        let h = mesh.add_half_edge(e2, Side::Right, p);
        mesh.ring_insert_before(hr, h);
    }
    mesh.refresh_edge(e);
    retrack(mesh, tracker, e);
    retrack(mesh, tracker, e2);
    handover(mesh, ctx, e, e2)?;
    update(mesh, ctx, e)?;
    ctx.tasks.record_edge(mesh, e);
    ctx.tasks.record_edge(mesh, e2);
    debug!(edge = e.0, new_edge = e2.0, vertex = n.0, "split edge");
    Ok(n)
}

/// Remove degree-2 vertices next to a too-short edge where that is safe. Returns the count.
pub(crate) fn merge_edges<L: Locator, V: VelocityField>(
    mesh: &mut Mesh,
    ctx: &mut Context,
    tracker: &Tracker<'_, L, V>,
) -> Result<usize> {
    let mut count = 0;
    for v in mesh.vertex_ids() {
        if !mesh.contains_vertex(v) {
            continue;
        }
        if let Some((ea, eb)) = mergeable(mesh, ctx, v) {
            merge_at(mesh, ctx, tracker, v, ea, eb)?;
            count += 1;
        }
    }
    ctx.tasks.run(mesh);
    Ok(count)
}

/// `(kept, dropped)` edges if `v` can be merged away.
fn mergeable(mesh: &Mesh, ctx: &Context, v: VertexId) -> Option<(EdgeId, EdgeId)> {
    let vx = &mesh[v];
    if vx.edges.len() != 2 || vx.agent.edge.is_some() {
        return None;
    }
    let (ea, eb) = (vx.edges[0], vx.edges[1]);
    let (u, w) = (mesh.other_end(ea, v), mesh.other_end(eb, v));
    if ea == eb || u == w || u == v || w == v {
        return None;
    }
    if mesh[ea].length.min(mesh[eb].length) >= ctx.cfg.guard.merge_length(&mesh.sphere) {
        return None;
    }
    let polygons = mesh.vertex_polygons(v);
    if polygons.iter().any(|&p| mesh[p].len <= 3) {
        return None;
    }
    if approaching_on(mesh, ea).chain(approaching_on(mesh, eb)).next().is_some() {
        return None;
    }
    let (xu, xv, xw) = (
        mesh.coord(u, Level::New),
        mesh.coord(v, Level::New),
        mesh.coord(w, Level::New),
    );
    let blocked = polygons.iter().any(|&p| {
        mesh.polygon_vertices(p)
            .into_iter()
            .filter(|&x| x != u && x != v && x != w)
            .any(|x| in_triangle(&xu, &xv, &xw, &mesh.coord(x, Level::New)))
    });
    (!blocked).then_some((ea, eb))
}

/// Drop `eb = v–w` and stretch `ea = u–v` to `u–w`; `v` disappears.
fn merge_at<L: Locator, V: VelocityField>(
    mesh: &mut Mesh,
    ctx: &mut Context,
    tracker: &Tracker<'_, L, V>,
    v: VertexId,
    ea: EdgeId,
    eb: EdgeId,
) -> Result<()> {
    let w = mesh.other_end(eb, v);
    for side in Side::BOTH {
        if let Some(h) = mesh[eb].half_edges[side.index()] {
            mesh.remove_half_edge(h);
        }
    }
    clean_edge(mesh, &mut ctx.approaching, eb)?;
    mesh.remove_edge(eb);
    let end = mesh.end_of(ea, v).ok_or(TtsError::Missing {
        what: "edge endpoint",
        id: v.0,
    })?;
    mesh.change_end(ea, end, w);
    unpair(mesh, &mut ctx.approaching, v)?;
    mesh.remove_vertex(v);
    mesh.refresh_edge(ea);
    retrack(mesh, tracker, ea);
    update(mesh, ctx, ea)?;
    ctx.tasks.record_edge(mesh, ea);
    debug!(vertex = v.0, kept = ea.0, dropped = eb.0, "merge edges");
    Ok(())
}
