//! Removal of polygons that surgery left with fewer than three edges.
//!
//! A ring of one half-edge is a "point" polygon (its edge is a loop); a ring of two is a
//! "line" polygon (two edges with the same endpoints). Both have no area. Their mass goes
//! to an heir before the topology is cleaned up, so nothing is lost.

use tracing::debug;

use crate::context::Context;
use crate::detector::clean_edge;
use crate::error::{Result, TtsError};
use crate::mesh::{EdgeId, Mesh, PolygonId, Side};

/// Remove every polygon reachable from `candidates` that has fewer than three edges.
///
/// `partners` are the two halves of a split: while both are alive, the one that dies
/// leaves its mass to the other instead of to its neighbours.
pub(crate) fn collapse(
    mesh: &mut Mesh,
    ctx: &mut Context,
    mut candidates: Vec<PolygonId>,
    partners: [PolygonId; 2],
) -> Result<usize> {
    let mut removed = 0;
    while let Some(q) = candidates.pop() {
        if !mesh.contains_polygon(q) || mesh[q].len >= 3 {
            continue;
        }
        let partner = if q == partners[0] {
            Some(partners[1])
        } else if q == partners[1] {
            Some(partners[0])
        } else {
            None
        };
        bequeath(mesh, q, partner.filter(|&r| mesh.contains_polygon(r)))?;
        match mesh[q].len {
            0 => mesh.remove_polygon(q),
            1 => candidates.extend(remove_point(mesh, ctx, q)?),
            _ => remove_line(mesh, ctx, q)?,
        }
        debug!(polygon = q.0, "removed degenerate polygon");
        removed += 1;
    }
    Ok(removed)
}

/// Take loop edges out of rings that still have other edges. Loops that form a whole
/// ring are left to `collapse`. Returns the polygons that lost an edge.
pub(crate) fn drop_loops(
    mesh: &mut Mesh,
    ctx: &mut Context,
    loops: &[EdgeId],
) -> Result<Vec<PolygonId>> {
    let mut touched = Vec::new();
    for &e in loops {
        if !mesh.contains_edge(e) {
            continue;
        }
        let halves: Vec<_> = mesh[e].half_edges.iter().flatten().copied().collect();
        if halves.iter().any(|&h| mesh[mesh[h].polygon].len <= 1) {
            continue;
        }
        for h in halves {
            let p = mesh[h].polygon;
            let next = mesh[h].next;
            mesh.remove_half_edge(h);
            ctx.tasks.record(next);
            touched.push(p);
        }
        clean_edge(mesh, &mut ctx.approaching, e)?;
        mesh.remove_edge(e);
    }
    Ok(touched)
}

/// Move all of `q`'s mass to `partner`, or share it evenly over the edges of `q` among
/// the polygons across them.
fn bequeath(mesh: &mut Mesh, q: PolygonId, partner: Option<PolygonId>) -> Result<()> {
    let masses = std::mem::take(&mut mesh[q].masses);
    let heirs: Vec<PolygonId> = match partner {
        Some(r) if r != q => vec![r],
        _ => mesh
            .ring(q)
            .into_iter()
            .filter_map(|h| mesh.neighbor(h))
            .filter(|&r| r != q)
            .collect(),
    };
    if heirs.is_empty() {
        if masses.iter().all(|&m| m == 0.0) {
            mesh[q].masses = masses;
            return Ok(());
        }
        return Err(TtsError::InvalidMesh(format!("{q} has no polygon to inherit its mass")));
    }
    let share = 1.0 / heirs.len() as f64;
    for r in heirs {
        for (dst, m) in mesh[r].masses.iter_mut().zip(&masses) {
            *dst += m * share;
        }
    }
    mesh[q].masses = vec![0.0; masses.len()];
    Ok(())
}

/// Remove a one-edge polygon together with its loop edge; the polygon across the loop
/// loses that edge. Returns it for re-inspection.
fn remove_point(mesh: &mut Mesh, ctx: &mut Context, q: PolygonId) -> Result<Option<PolygonId>> {
    let Some(h) = mesh[q].head else {
        mesh.remove_polygon(q);
        return Ok(None);
    };
    let e = mesh[h].edge;
    let mut across = None;
    if let Some(t) = mesh.twin(h) {
        let r = mesh[t].polygon;
        if r != q {
            let next = mesh[t].next;
            mesh.remove_half_edge(t);
            if mesh.contains_half_edge(next) && next != t {
                ctx.tasks.record(next);
            }
            across = Some(r);
        }
    }
    for side in Side::BOTH {
        if let Some(x) = mesh[e].half_edges[side.index()] {
            mesh.remove_half_edge(x);
        }
    }
    clean_edge(mesh, &mut ctx.approaching, e)?;
    mesh.remove_edge(e);
    mesh.remove_polygon(q);
    Ok(across)
}

/// Remove a two-edge polygon by fusing its edges: the first edge takes over the second
/// edge's use by the polygon across it.
fn remove_line(mesh: &mut Mesh, ctx: &mut Context, q: PolygonId) -> Result<()> {
    let ring = mesh.ring(q);
    let (h1, h2) = (ring[0], ring[1]);
    let (e1, e2) = (mesh[h1].edge, mesh[h2].edge);
    let s1 = mesh[h1].side;
    let t2 = mesh.twin(h2);
    mesh.remove_half_edge(h1);
    mesh.remove_half_edge(h2);
    if e1 == e2 {
        clean_edge(mesh, &mut ctx.approaching, e1)?;
        mesh.remove_edge(e1);
    } else {
        // `h1` and `t2` run the same way (first vertex of h1 → its second vertex).
        if let Some(t2) = t2 {
            let old_side = mesh[t2].side;
            mesh[e2].half_edges[old_side.index()] = None;
            mesh[t2].edge = e1;
            mesh[t2].side = s1;
            mesh[e1].half_edges[s1.index()] = Some(t2);
            ctx.tasks.record(t2);
            let next = mesh[t2].next;
            ctx.tasks.record(next);
        }
        clean_edge(mesh, &mut ctx.approaching, e2)?;
        mesh.remove_edge(e2);
        ctx.tasks.record_edge(mesh, e1);
    }
    mesh.remove_polygon(q);
    Ok(())
}
