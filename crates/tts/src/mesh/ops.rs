//! Element creation/removal, endpoint rewiring, geometry refresh, reindexing and the
//! topology self-check.

use crate::detector::{EdgeAgent, VertexAgent};
use crate::error::{Result, TtsError};
use crate::sphere::{angle, midpoint, norm_cross, Coord};

use super::{
    Edge, EdgeId, End, HalfEdge, HalfEdgeId, Level, Levels, Mesh, Point, Polygon, PolygonId,
    Side, Vertex, VertexId,
};

impl Mesh {
    pub fn add_vertex(&mut self, point: Point) -> VertexId {
        VertexId(self.vertices.insert(Vertex {
            point,
            edges: Vec::new(),
            agent: VertexAgent::default(),
        }))
    }

    /// Edge `v1 → v2` with fresh geometry and its test point at the old-level midpoint.
    /// Not yet used by any polygon.
    pub fn add_edge(&mut self, v1: VertexId, v2: VertexId) -> EdgeId {
        let e = EdgeId(self.edges.insert(Edge {
            ends: [v1, v2],
            half_edges: [None, None],
            normal: Levels::splat(Coord::zeros()),
            length: 0.0,
            test_point: Point::at(Coord::zeros()),
            agent: EdgeAgent::default(),
        }));
        self.vertices[v1.0].edges.push(e);
        if v2 != v1 {
            self.vertices[v2.0].edges.push(e);
        }
        self.refresh_edge(e);
        self.reset_test_point(e);
        e
    }

    /// Detached half-edge of `e` on `side`, registered on the edge.
    pub fn add_half_edge(&mut self, e: EdgeId, side: Side, p: PolygonId) -> HalfEdgeId {
        let h = HalfEdgeId(
            self.half_edges
                .insert_with(|i| HalfEdge::detached(HalfEdgeId(i), e, side, p)),
        );
        self.edges[e.0].half_edges[side.index()] = Some(h);
        h
    }

    pub fn add_polygon(&mut self) -> PolygonId {
        PolygonId(self.polygons.insert(Polygon {
            masses: vec![0.0; self.num_tracers()],
            ..Polygon::default()
        }))
    }

    /// Drop a vertex record. Incident edges must already be gone.
    pub fn remove_vertex(&mut self, v: VertexId) {
        self.vertices.remove(v.0);
    }

    /// Unlink `e` from its endpoints and drop it together with any half-edges it still owns.
    /// The half-edges must already be out of their rings.
    pub fn remove_edge(&mut self, e: EdgeId) {
        let Some(edge) = self.edges.remove(e.0) else {
            return;
        };
        for v in edge.ends {
            if let Some(vx) = self.vertices.get_mut(v.0) {
                vx.edges.retain(|&x| x != e);
            }
        }
        for h in edge.half_edges.into_iter().flatten() {
            self.half_edges.remove(h.0);
        }
    }

    /// Unlink a half-edge from its ring and drop it.
    pub fn remove_half_edge(&mut self, h: HalfEdgeId) {
        self.ring_unlink(h);
        let he = &self.half_edges[h.0];
        let (e, side) = (he.edge, he.side);
        if let Some(edge) = self.edges.get_mut(e.0) {
            if edge.half_edges[side.index()] == Some(h) {
                edge.half_edges[side.index()] = None;
            }
        }
        self.half_edges.remove(h.0);
    }

    /// Drop an (already emptied) polygon.
    pub fn remove_polygon(&mut self, p: PolygonId) {
        self.polygons.remove(p.0);
    }

    /// Re-attach endpoint slot `end` of `e` to `v`. Geometry is not refreshed.
    pub fn change_end(&mut self, e: EdgeId, end: End, v: VertexId) {
        let old = self.edges[e.0].ends[end.index()];
        if old == v {
            return;
        }
        let other = self.edges[e.0].ends[end.other().index()];
        if old != other {
            self.vertices[old.0].edges.retain(|&x| x != e);
        }
        self.edges[e.0].ends[end.index()] = v;
        if v != other {
            self.vertices[v.0].edges.push(e);
        }
    }

    /// Recompute both normal levels and the new-level length of `e`.
    /// A loop edge gets a zero normal.
    pub fn refresh_edge(&mut self, e: EdgeId) {
        let [v1, v2] = self.edges[e.0].ends;
        let (a, b) = (&self.vertices[v1.0].point.x, &self.vertices[v2.0].point.x);
        let normal = Levels {
            old: norm_cross(&b.old, &a.old).unwrap_or_else(Coord::zeros),
            new: norm_cross(&b.new, &a.new).unwrap_or_else(Coord::zeros),
        };
        let length = self.sphere.distance(&a.new, &b.new);
        let edge = &mut self.edges[e.0];
        edge.normal = normal;
        edge.length = length;
    }

    /// Place the test point at the old-level midpoint of the endpoints, on both levels.
    /// The caller locates and tracks it.
    pub fn reset_test_point(&mut self, e: EdgeId) {
        let [v1, v2] = self.edges[e.0].ends;
        let m = midpoint(
            &self.vertices[v1.0].point.x.old,
            &self.vertices[v2.0].point.x.old,
        );
        self.edges[e.0].test_point = Point::at(m);
    }

    /// Outward normal of the half-edge at `level`.
    #[inline]
    pub fn he_normal(&self, h: HalfEdgeId, level: Level) -> Coord {
        let he = &self.half_edges[h.0];
        let n = self.edges[he.edge.0].normal.get(level);
        match he.side {
            Side::Left => n,
            Side::Right => -n,
        }
    }

    /// Recompute the interior angle at the first endpoint of `h` on both levels.
    pub fn refresh_angle(&mut self, h: HalfEdgeId) {
        let prev = self.half_edges[h.0].prev;
        let v = self.he_first(h);
        let x = &self.vertices[v.0].point.x;
        let a = Levels {
            old: angle(
                &self.he_normal(prev, Level::Old),
                &self.he_normal(h, Level::Old),
                &x.old,
            ),
            new: angle(
                &self.he_normal(prev, Level::New),
                &self.he_normal(h, Level::New),
                &x.new,
            ),
        };
        self.half_edges[h.0].angle = a;
    }

    /// Recompute, store and return the new-level area of `p`.
    pub fn calc_area(&mut self, p: PolygonId) -> f64 {
        let pts = self.polygon_coords(p, Level::New);
        let area = self.sphere.polygon_area(&pts);
        self.polygons[p.0].area = area;
        area
    }

    /// Compact the vertex and edge arenas and rewrite every reference to them.
    ///
    /// The approaching worklist must be empty (it holds vertex ids).
    pub fn reindex(&mut self) -> Result<()> {
        let vmap = self.vertices.compact();
        let emap = self.edges.compact();
        let vid = |v: VertexId| -> Result<VertexId> {
            vmap.get(v.0)
                .copied()
                .flatten()
                .map(VertexId)
                .ok_or(TtsError::Missing { what: "vertex", id: v.0 })
        };
        let eid = |e: EdgeId| -> Result<EdgeId> {
            emap.get(e.0)
                .copied()
                .flatten()
                .map(EdgeId)
                .ok_or(TtsError::Missing { what: "edge", id: e.0 })
        };
        for edge in self.edges.values_mut() {
            edge.ends = [vid(edge.ends[0])?, vid(edge.ends[1])?];
            edge.agent.vertices = edge
                .agent
                .vertices
                .iter()
                .map(|&v| vid(v))
                .collect::<Result<_>>()?;
        }
        for vertex in self.vertices.values_mut() {
            vertex.edges = vertex
                .edges
                .iter()
                .map(|&e| eid(e))
                .collect::<Result<_>>()?;
            vertex.agent.edge = vertex.agent.edge.map(eid).transpose()?;
        }
        for he in self.half_edges.values_mut() {
            he.edge = eid(he.edge)?;
        }
        Ok(())
    }

    /// Verify ring closure and cross-reference consistency.
    ///
    /// Rings of fewer than three edges are rejected; surgery collapses them before
    /// handing the mesh back.
    pub fn check_topology(&self) -> Result<()> {
        let bad = |msg: String| Err(TtsError::InvalidMesh(msg));
        for p in self.polygon_ids() {
            let poly = &self.polygons[p.0];
            let Some(head) = poly.head else {
                return bad(format!("{p} has an empty ring"));
            };
            if poly.len < 3 {
                return bad(format!("{p} has only {} edges", poly.len));
            }
            let mut h = head;
            for i in 0..poly.len {
                let he = &self.half_edges[h.0];
                if he.polygon != p {
                    return bad(format!("{h} is linked into {p} but claims {}", he.polygon));
                }
                if self.half_edges[he.next.0].prev != h {
                    return bad(format!("{h}: next/prev disagree"));
                }
                if self.he_second(h) != self.he_first(he.next) {
                    return bad(format!("{p} ring does not close at {h}"));
                }
                h = he.next;
                if h == head && i + 1 != poly.len {
                    return bad(format!("{p} ring shorter than its length {}", poly.len));
                }
            }
            if h != head {
                return bad(format!("{p} ring longer than its length {}", poly.len));
            }
        }
        for e in self.edge_ids() {
            let edge = &self.edges[e.0];
            for side in Side::BOTH {
                match edge.half_edges[side.index()] {
                    Some(h) if self.contains_half_edge(h) => {
                        let he = &self.half_edges[h.0];
                        if he.edge != e || he.side != side {
                            return bad(format!("{e} {side:?} half-edge {h} points elsewhere"));
                        }
                        if !self.contains_polygon(he.polygon) {
                            return bad(format!("{h} belongs to a dead polygon"));
                        }
                    }
                    _ => return bad(format!("{e} lacks its {side:?} half-edge")),
                }
            }
            for v in edge.ends {
                if !self.contains_vertex(v) || !self.vertices[v.0].edges.contains(&e) {
                    return bad(format!("{e} endpoint {v} does not list it"));
                }
            }
        }
        for v in self.vertex_ids() {
            for &e in &self.vertices[v.0].edges {
                if !self.contains_edge(e) || self.end_of(e, v).is_none() {
                    return bad(format!("{v} lists {e} which does not end at it"));
                }
            }
        }
        Ok(())
    }
}
