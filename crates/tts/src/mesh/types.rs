//! Element records of the parcel mesh.
//!
//! Kept as plain data; all linking logic lives in `ops.rs` / `ring.rs` so that every
//! mutation that must keep back-references consistent is in one place.

use std::f64::consts::PI;
use std::fmt;

use crate::detector::{EdgeAgent, VertexAgent};
use crate::sphere::Coord;
use crate::track::Location;

macro_rules! id {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

id!(VertexId);
id!(EdgeId);
id!(HalfEdgeId);
id!(PolygonId);

/// Stored time level of a two-level quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Old,
    New,
}

/// A quantity kept at the old and new time level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Levels<T> {
    pub old: T,
    pub new: T,
}

impl<T: Copy> Levels<T> {
    #[inline]
    pub fn splat(v: T) -> Self {
        Self { old: v, new: v }
    }

    #[inline]
    pub fn get(&self, level: Level) -> T {
        match level {
            Level::Old => self.old,
            Level::New => self.new,
        }
    }

    /// Shift `new` into `old` and store `v` as the new value.
    #[inline]
    pub fn push(&mut self, v: T) {
        self.old = self.new;
        self.new = v;
    }
}

/// Side of an edge. `Left` is the side of the polygon traversing first→second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];
}

/// Endpoint slot of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum End {
    First,
    Second,
}

impl End {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            End::First => 0,
            End::Second => 1,
        }
    }

    #[inline]
    pub fn other(self) -> Self {
        match self {
            End::First => End::Second,
            End::Second => End::First,
        }
    }
}

/// An advected point: two coordinate levels plus its cached background location.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub x: Levels<Coord>,
    pub loc: Location,
}

impl Point {
    /// Point sitting at `x` on both levels, not yet located.
    #[inline]
    pub fn at(x: Coord) -> Self {
        Self {
            x: Levels::splat(x),
            loc: Location::default(),
        }
    }

    /// Commit one step of motion: the current position becomes the old one.
    #[inline]
    pub fn advance(&mut self, x: Coord, loc: Location) {
        self.x.push(x);
        self.loc = loc;
    }
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub point: Point,
    /// Incident edges, unordered.
    pub edges: Vec<EdgeId>,
    pub agent: VertexAgent,
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub ends: [VertexId; 2],
    /// Half-edge per side (`Side::index`).
    pub half_edges: [Option<HalfEdgeId>; 2],
    /// Points to the right of first→second.
    pub normal: Levels<Coord>,
    /// New-level great-circle length.
    pub length: f64,
    pub test_point: Point,
    pub agent: EdgeAgent,
}

/// Directed use of an edge by one polygon (an "edge pointer").
#[derive(Clone, Debug)]
pub struct HalfEdge {
    pub edge: EdgeId,
    pub side: Side,
    pub polygon: PolygonId,
    pub next: HalfEdgeId,
    pub prev: HalfEdgeId,
    /// Interior angle at the first endpoint.
    pub angle: Levels<f64>,
}

impl HalfEdge {
    pub(crate) fn detached(id: HalfEdgeId, edge: EdgeId, side: Side, polygon: PolygonId) -> Self {
        Self {
            edge,
            side,
            polygon,
            next: id,
            prev: id,
            angle: Levels::splat(PI),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Polygon {
    pub head: Option<HalfEdgeId>,
    /// Ring length, maintained incrementally.
    pub len: usize,
    /// Mass per tracer.
    pub masses: Vec<f64>,
    /// New-level area, refreshed by `Mesh::calc_area`.
    pub area: f64,
}
