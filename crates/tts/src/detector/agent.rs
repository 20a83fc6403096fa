//! Vertex↔edge pairing records and the operations that keep both sides in sync.

use tracing::trace;

use crate::context::Context;
use crate::error::{Result, TtsError};
use crate::mesh::{EdgeId, Level, Mesh, Side, VertexId};
use crate::sphere::{orient, Coord, Orient};

use super::ApproachingVertices;

/// Detector state carried by a vertex: the edge it is watched against.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexAgent {
    pub edge: Option<EdgeId>,
    /// Side of `edge` (relative to its first→second direction) the vertex is on.
    pub side: Side,
    /// New-level foot of the perpendicular on `edge`.
    pub foot: Coord,
    /// Distance to `edge` when last measured; the reference for the trend test.
    pub distance: f64,
    /// Queued in the worklist this step.
    pub approaching: bool,
}

impl Default for VertexAgent {
    fn default() -> Self {
        Self {
            edge: None,
            side: Side::Left,
            foot: Coord::zeros(),
            distance: 0.0,
            approaching: false,
        }
    }
}

/// Detector state carried by an edge: the vertices paired with it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeAgent {
    pub vertices: Vec<VertexId>,
}

/// Side from an orientation result, `None` for `On`.
#[inline]
pub(crate) fn side_of(o: Orient) -> Option<Side> {
    match o {
        Orient::Left => Some(Side::Left),
        Orient::Right => Some(Side::Right),
        Orient::On => None,
    }
}

pub(crate) fn pair(mesh: &mut Mesh, v: VertexId, e: EdgeId, foot: Coord, distance: f64, side: Side) {
    let agent = &mut mesh[v].agent;
    agent.edge = Some(e);
    agent.side = side;
    agent.foot = foot;
    agent.distance = distance;
    mesh[e].agent.vertices.push(v);
}

/// Dissolve `v`'s pairing (and its worklist entry). No-op for unpaired vertices.
pub(crate) fn unpair(mesh: &mut Mesh, list: &mut ApproachingVertices, v: VertexId) -> Result<()> {
    if mesh[v].agent.approaching {
        list.remove(mesh, v)?;
    }
    let Some(e) = mesh[v].agent.edge.take() else {
        return Ok(());
    };
    let vertices = &mut mesh[e].agent.vertices;
    let at = vertices
        .iter()
        .position(|&x| x == v)
        .ok_or(TtsError::Missing {
            what: "paired vertex",
            id: v.0,
        })?;
    vertices.swap_remove(at);
    let agent = &mut mesh[v].agent;
    agent.foot = Coord::zeros();
    agent.distance = 0.0;
    trace!(vertex = v.0, edge = e.0, "unpair");
    Ok(())
}

/// Dissolve every pairing that references `e`.
pub(crate) fn clean_edge(mesh: &mut Mesh, list: &mut ApproachingVertices, e: EdgeId) -> Result<()> {
    for v in mesh[e].agent.vertices.clone() {
        unpair(mesh, list, v)?;
    }
    Ok(())
}

/// Move the pairings of `from` that now project onto `to` over to `to`.
///
/// A vertex must be on the same side of `to` at both levels; otherwise it crossed it.
pub(crate) fn handover(mesh: &mut Mesh, ctx: &mut Context, from: EdgeId, to: EdgeId) -> Result<()> {
    let sphere = mesh.sphere;
    let [w1, w2] = mesh[to].ends;
    let (x1n, x2n) = (mesh.coord(w1, Level::New), mesh.coord(w2, Level::New));
    let (x1o, x2o) = (mesh.coord(w1, Level::Old), mesh.coord(w2, Level::Old));
    for v in mesh[from].agent.vertices.clone() {
        if v == w1 || v == w2 {
            continue;
        }
        let (x3n, x3o) = (mesh.coord(v, Level::New), mesh.coord(v, Level::Old));
        let Some((foot, dn)) = sphere.project(&x1n, &x2n, &x3n) else {
            continue;
        };
        let Some((_, d_old)) = sphere.project(&x1o, &x2o, &x3o) else {
            continue;
        };
        let on = orient(&x1n, &x2n, &x3n);
        if on != orient(&x1o, &x2o, &x3o) {
            return Err(TtsError::EdgeCrossing {
                vertex: v,
                edge: to,
                stage: "handover",
            });
        }
        let side = side_of(on).ok_or(TtsError::OnEdge { vertex: v, edge: to })?;
        unpair(mesh, &mut ctx.approaching, v)?;
        pair(mesh, v, to, foot, dn, side);
        if ctx.cfg.detect.is_approaching(&sphere, d_old, dn) {
            ctx.approaching.record(mesh, v);
        }
    }
    Ok(())
}

/// Re-validate the pairings of `e` after its geometry changed.
pub(crate) fn update(mesh: &mut Mesh, ctx: &mut Context, e: EdgeId) -> Result<()> {
    let sphere = mesh.sphere;
    let [w1, w2] = mesh[e].ends;
    let (x1n, x2n) = (mesh.coord(w1, Level::New), mesh.coord(w2, Level::New));
    let (x1o, x2o) = (mesh.coord(w1, Level::Old), mesh.coord(w2, Level::Old));
    for v in mesh[e].agent.vertices.clone() {
        if v == w1 || v == w2 {
            unpair(mesh, &mut ctx.approaching, v)?;
            continue;
        }
        let x3n = mesh.coord(v, Level::New);
        let Some((foot, dn)) = sphere.project(&x1n, &x2n, &x3n) else {
            unpair(mesh, &mut ctx.approaching, v)?;
            continue;
        };
        let side = side_of(orient(&x1n, &x2n, &x3n)).ok_or(TtsError::OnEdge { vertex: v, edge: e })?;
        if side != mesh[v].agent.side {
            return Err(TtsError::EdgeCrossing {
                vertex: v,
                edge: e,
                stage: "update",
            });
        }
        let approaching = sphere
            .project(&x1o, &x2o, &mesh.coord(v, Level::Old))
            .is_some_and(|(_, d_old)| ctx.cfg.detect.is_approaching(&sphere, d_old, dn));
        let agent = &mut mesh[v].agent;
        agent.foot = foot;
        agent.distance = dn;
        if approaching {
            ctx.approaching.record(mesh, v);
        }
    }
    Ok(())
}
