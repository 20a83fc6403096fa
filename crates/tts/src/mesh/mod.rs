//! Half-edge polygon mesh on the sphere.
//!
//! Purpose
//! - Hold the Lagrangian parcels: vertices (advected points), edges (great-circle arcs with
//!   a tracked mid test point), half-edges (a polygon's directed use of an edge) and
//!   polygons (closed rings of half-edges carrying tracer masses).
//!
//! Why this design
//! - Elements live in index arenas with free-lists; cross references are typed ids, so the
//!   cyclic graph (vertex↔edge↔half-edge↔polygon) needs no shared ownership. Deleted slots
//!   are reused, and `reindex` compacts after a step that changed topology.
//! - Rings are doubly linked through the half-edge arena with an incrementally maintained
//!   length, giving O(1) insert/remove during surgery.
//!
//! Invariants (checked by `check_topology`)
//! - Every edge has both half-edges, on distinct polygon rings or twice on one pinched ring.
//! - Rings close: following `next` from `head` returns after exactly `len` steps and each
//!   half-edge starts where its predecessor ends.
//! - Vertex edge lists and edge endpoints agree.

mod arena;
mod build;
mod ops;
mod ring;
mod types;

use std::ops::{Index, IndexMut};

pub use arena::Arena;
pub use build::{cube, from_polygons, lon_lat};
pub use types::{
    Edge, EdgeId, End, HalfEdge, HalfEdgeId, Level, Levels, Point, Polygon, PolygonId, Side,
    Vertex, VertexId,
};

use crate::sphere::{Coord, Sphere};

/// The parcel mesh.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub sphere: Sphere,
    pub(crate) vertices: Arena<Vertex>,
    pub(crate) edges: Arena<Edge>,
    pub(crate) half_edges: Arena<HalfEdge>,
    pub(crate) polygons: Arena<Polygon>,
    num_tracers: usize,
}

impl Mesh {
    pub fn new(sphere: Sphere) -> Self {
        Self {
            sphere,
            ..Self::default()
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_polygons(&self) -> usize {
        self.polygons.len()
    }

    pub fn num_tracers(&self) -> usize {
        self.num_tracers
    }

    /// Snapshot of live vertex ids; safe to iterate while mutating the mesh.
    pub fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices.ids().map(VertexId).collect()
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.ids().map(EdgeId).collect()
    }

    pub fn half_edge_ids(&self) -> Vec<HalfEdgeId> {
        self.half_edges.ids().map(HalfEdgeId).collect()
    }

    pub fn polygon_ids(&self) -> Vec<PolygonId> {
        self.polygons.ids().map(PolygonId).collect()
    }

    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains(v.0)
    }

    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains(e.0)
    }

    pub fn contains_half_edge(&self, h: HalfEdgeId) -> bool {
        self.half_edges.contains(h.0)
    }

    pub fn contains_polygon(&self, p: PolygonId) -> bool {
        self.polygons.contains(p.0)
    }

    #[inline]
    pub fn coord(&self, v: VertexId, level: Level) -> Coord {
        self.vertices[v.0].point.x.get(level)
    }

    /// Vertex at `end` of the half-edge, in traversal order.
    #[inline]
    pub fn he_end(&self, h: HalfEdgeId, end: End) -> VertexId {
        let he = &self.half_edges[h.0];
        let ends = &self.edges[he.edge.0].ends;
        match he.side {
            Side::Left => ends[end.index()],
            Side::Right => ends[end.other().index()],
        }
    }

    #[inline]
    pub fn he_first(&self, h: HalfEdgeId) -> VertexId {
        self.he_end(h, End::First)
    }

    #[inline]
    pub fn he_second(&self, h: HalfEdgeId) -> VertexId {
        self.he_end(h, End::Second)
    }

    /// Half-edge of the same edge on the other side.
    #[inline]
    pub fn twin(&self, h: HalfEdgeId) -> Option<HalfEdgeId> {
        let he = &self.half_edges[h.0];
        self.edges[he.edge.0].half_edges[he.side.opposite().index()]
    }

    /// Polygon across the half-edge's edge.
    #[inline]
    pub fn neighbor(&self, h: HalfEdgeId) -> Option<PolygonId> {
        self.twin(h).map(|t| self.half_edges[t.0].polygon)
    }

    /// Polygon on `side` of `e`.
    #[inline]
    pub fn edge_polygon(&self, e: EdgeId, side: Side) -> Option<PolygonId> {
        self.edges[e.0].half_edges[side.index()].map(|h| self.half_edges[h.0].polygon)
    }

    /// Slot of `v` among the endpoints of `e`.
    #[inline]
    pub fn end_of(&self, e: EdgeId, v: VertexId) -> Option<End> {
        let ends = &self.edges[e.0].ends;
        if ends[0] == v {
            Some(End::First)
        } else if ends[1] == v {
            Some(End::Second)
        } else {
            None
        }
    }

    /// The endpoint of `e` that is not `v`.
    #[inline]
    pub fn other_end(&self, e: EdgeId, v: VertexId) -> VertexId {
        let ends = &self.edges[e.0].ends;
        if ends[0] == v {
            ends[1]
        } else {
            ends[0]
        }
    }

    /// Half-edges of a polygon in ring order starting at its head.
    pub fn ring(&self, p: PolygonId) -> Vec<HalfEdgeId> {
        let poly = &self.polygons[p.0];
        let mut out = Vec::with_capacity(poly.len);
        let Some(head) = poly.head else {
            return out;
        };
        let mut h = head;
        for _ in 0..poly.len {
            out.push(h);
            h = self.half_edges[h.0].next;
        }
        out
    }

    /// Vertices of a polygon in ring order (first endpoint of each half-edge).
    pub fn polygon_vertices(&self, p: PolygonId) -> Vec<VertexId> {
        self.ring(p).into_iter().map(|h| self.he_first(h)).collect()
    }

    pub fn polygon_coords(&self, p: PolygonId, level: Level) -> Vec<Coord> {
        self.polygon_vertices(p)
            .into_iter()
            .map(|v| self.coord(v, level))
            .collect()
    }

    /// Distinct polygons adjacent to `v` through its edges.
    pub fn vertex_polygons(&self, v: VertexId) -> Vec<PolygonId> {
        let mut out = Vec::new();
        for &e in &self.vertices[v.0].edges {
            for side in Side::BOTH {
                if let Some(p) = self.edge_polygon(e, side) {
                    if !out.contains(&p) {
                        out.push(p);
                    }
                }
            }
        }
        out
    }

    /// Edge the vertex is currently paired with by the detector.
    pub fn pairing(&self, v: VertexId) -> Option<EdgeId> {
        self.vertices[v.0].agent.edge
    }

    pub fn mass(&self, p: PolygonId, tracer: usize) -> f64 {
        self.polygons[p.0].masses[tracer]
    }

    pub fn total_mass(&self, tracer: usize) -> f64 {
        self.polygons
            .ids()
            .map(|i| self.polygons[i].masses[tracer])
            .sum()
    }

    /// Sum of stored polygon areas (as of the last `calc_area`).
    pub fn total_area(&self) -> f64 {
        self.polygons.ids().map(|i| self.polygons[i].area).sum()
    }

    /// Add a tracer whose initial mass per polygon is `density(centroid) * area`.
    /// Returns the tracer index.
    pub fn add_tracer(&mut self, density: impl Fn(&Coord) -> f64) -> usize {
        let index = self.num_tracers;
        for p in self.polygon_ids() {
            let area = self.calc_area(p);
            let pts = self.polygon_coords(p, Level::New);
            let sum: Coord = pts.iter().sum();
            let centroid = if sum.norm() > 0.0 {
                sum.normalize()
            } else {
                pts.first().copied().unwrap_or_else(Coord::zeros)
            };
            let mass = density(&centroid) * area;
            self.polygons[p.0].masses.push(mass);
        }
        self.num_tracers += 1;
        index
    }
}

macro_rules! index_by {
    ($id:ty, $arena:ident, $out:ty) => {
        impl Index<$id> for Mesh {
            type Output = $out;

            #[inline]
            fn index(&self, id: $id) -> &$out {
                &self.$arena[id.0]
            }
        }

        impl IndexMut<$id> for Mesh {
            #[inline]
            fn index_mut(&mut self, id: $id) -> &mut $out {
                &mut self.$arena[id.0]
            }
        }
    };
}

index_by!(VertexId, vertices, Vertex);
index_by!(EdgeId, edges, Edge);
index_by!(HalfEdgeId, half_edges, HalfEdge);
index_by!(PolygonId, polygons, Polygon);
