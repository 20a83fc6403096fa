//! Spherical geometry kernel.
//!
//! Purpose
//! - Pure predicates on points of the sphere: great-circle distance, projection onto an
//!   arc, side-of-arc orientation, interior angle between two arcs, spherical areas.
//!
//! Conventions
//! - Points are unit vectors (`Coord`); lengths and areas are scaled by `Sphere::radius`.
//! - Arcs are the shorter great-circle segment between their endpoints.
//! - The normal of a directed arc `a→b` is `norm_cross(b, a)`, i.e. it points to the right
//!   of travel. Polygons are traversed counter-clockwise seen from outside, so half-edge
//!   normals point out of their polygon.
//! - `orient(a, b, c)` is the sign of `(a × b) · c`: `Left` means `c` is to the left of
//!   `a→b`.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

use crate::cfg::{ARC_EPS, DEGENERATE_EPS, ORIENT_EPS};

/// Point on the unit sphere (Cartesian).
pub type Coord = Vector3<f64>;

/// Side of a directed arc a point lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orient {
    Left,
    Right,
    On,
}

/// Sphere of a given radius; all metric quantities scale with it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub radius: f64,
}

impl Default for Sphere {
    fn default() -> Self {
        Self { radius: 1.0 }
    }
}

impl Sphere {
    #[inline]
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    /// Arc length subtended by `deg` degrees.
    #[inline]
    pub fn arc(&self, deg: f64) -> f64 {
        deg.to_radians() * self.radius
    }

    /// Great-circle distance.
    #[inline]
    pub fn distance(&self, a: &Coord, b: &Coord) -> f64 {
        central_angle(a, b) * self.radius
    }

    /// Project `c` onto the arc `a`–`b`.
    ///
    /// Returns the foot of the perpendicular and the distance from `c` to it, or `None` when
    /// the foot falls outside the arc (or the arc is degenerate).
    pub fn project(&self, a: &Coord, b: &Coord, c: &Coord) -> Option<(Coord, f64)> {
        let n = a.cross(b);
        let nn = n.norm();
        if nn < DEGENERATE_EPS {
            return None;
        }
        let n = n / nn;
        let h = c.dot(&n);
        let foot = c - n * h;
        let fnorm = foot.norm();
        if fnorm < DEGENERATE_EPS {
            return None;
        }
        let foot = foot / fnorm;
        if a.cross(&foot).dot(&n) < -ARC_EPS || foot.cross(b).dot(&n) < -ARC_EPS {
            return None;
        }
        Some((foot, h.abs().atan2(fnorm) * self.radius))
    }

    /// Distance from `c` to the full great circle through `a` and `b`.
    pub fn distance_to_circle(&self, a: &Coord, b: &Coord, c: &Coord) -> Option<f64> {
        let n = norm_cross(a, b)?;
        Some(c.dot(&n).abs().clamp(0.0, 1.0).asin() * self.radius)
    }

    /// Signed area of the spherical triangle `a, b, c` (positive when counter-clockwise).
    #[inline]
    pub fn triangle_area(&self, a: &Coord, b: &Coord, c: &Coord) -> f64 {
        unit_triangle_area(a, b, c) * self.radius * self.radius
    }

    /// Area of a spherical polygon given counter-clockwise, in `[0, 4πR²)`.
    ///
    /// The triangle fan from the first vertex is accurate but only known modulo the full
    /// sphere; the angle excess (Gauss–Bonnet) picks the right branch, which matters for
    /// polygons larger than a hemisphere. Repeated points and slits (`..a, b, a..`) are
    /// removed first; neither encloses area.
    pub fn polygon_area(&self, pts: &[Coord]) -> f64 {
        let ring = simplify_ring(pts);
        if ring.len() < 3 {
            return 0.0;
        }
        let a = &ring[0];
        let mut fan = 0.0;
        for w in ring[1..].windows(2) {
            fan += unit_triangle_area(a, &w[0], &w[1]);
        }
        let area = match angle_excess(&ring) {
            Some(excess) => fan + 2.0 * TAU * ((excess - fan) / (2.0 * TAU)).round(),
            None => fan,
        };
        area * self.radius * self.radius
    }

    /// Total surface area.
    #[inline]
    pub fn surface_area(&self) -> f64 {
        4.0 * PI * self.radius * self.radius
    }
}

/// Unit vector for longitude/latitude in radians.
#[inline]
pub fn from_lon_lat(lon: f64, lat: f64) -> Coord {
    Coord::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

/// Longitude in `[0, 2π)` and latitude in `[-π/2, π/2]`.
#[inline]
pub fn to_lon_lat(x: &Coord) -> (f64, f64) {
    let lon = x.y.atan2(x.x).rem_euclid(TAU);
    let lat = x.z.clamp(-1.0, 1.0).asin();
    (lon, lat)
}

/// Central angle between two unit vectors.
#[inline]
pub fn central_angle(a: &Coord, b: &Coord) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}

/// Normalized `a × b`, `None` for (anti)parallel inputs.
#[inline]
pub fn norm_cross(a: &Coord, b: &Coord) -> Option<Coord> {
    let n = a.cross(b);
    let nn = n.norm();
    (nn >= DEGENERATE_EPS).then(|| n / nn)
}

/// Midpoint of the arc `a`–`b`.
#[inline]
pub fn midpoint(a: &Coord, b: &Coord) -> Coord {
    let m = a + b;
    let mn = m.norm();
    if mn < DEGENERATE_EPS {
        *a
    } else {
        m / mn
    }
}

/// Which side of the directed arc `a→b` the point `c` is on.
#[inline]
pub fn orient(a: &Coord, b: &Coord, c: &Coord) -> Orient {
    let det = a.cross(b).dot(c);
    if det > ORIENT_EPS {
        Orient::Left
    } else if det < -ORIENT_EPS {
        Orient::Right
    } else {
        Orient::On
    }
}

/// Interior angle at `x` between an incoming arc with outward normal `n_in` and an outgoing
/// arc with outward normal `n_out`, in `[0, 2π)`.
///
/// A straight continuation gives `π`; a left (convex) turn is below `π`.
pub fn angle(n_in: &Coord, n_out: &Coord, x: &Coord) -> f64 {
    let c = n_in.cross(n_out);
    let theta = c.norm().atan2(n_in.dot(n_out));
    if c.dot(x) >= 0.0 {
        PI - theta
    } else {
        PI + theta
    }
}

/// Strictly inside the spherical triangle `a, b, c` (either winding).
pub fn in_triangle(a: &Coord, b: &Coord, c: &Coord, p: &Coord) -> bool {
    let o1 = orient(a, b, p);
    if o1 == Orient::On {
        return false;
    }
    o1 == orient(b, c, p) && o1 == orient(c, a, p)
}

/// Sum of interior angles minus the planar sum; equals the enclosed area on the unit sphere.
/// Drop repeated points and spikes, cyclically.
fn simplify_ring(pts: &[Coord]) -> Vec<Coord> {
    let same = |a: &Coord, b: &Coord| central_angle(a, b) <= ARC_EPS;
    let mut ring: Vec<Coord> = Vec::with_capacity(pts.len());
    for p in pts {
        let n = ring.len();
        if n > 0 && same(&ring[n - 1], p) {
            continue;
        }
        if n > 1 && same(&ring[n - 2], p) {
            ring.pop();
            continue;
        }
        ring.push(*p);
    }
    loop {
        let n = ring.len();
        if n < 3 {
            break;
        }
        if same(&ring[0], &ring[n - 1]) {
            ring.pop();
        } else if same(&ring[n - 2], &ring[0]) {
            ring.truncate(n - 2);
        } else if same(&ring[n - 1], &ring[1]) {
            ring.drain(..2);
        } else {
            break;
        }
    }
    ring
}

fn angle_excess(ring: &[Coord]) -> Option<f64> {
    let n = ring.len();
    let normals = (0..n)
        .map(|i| norm_cross(&ring[(i + 1) % n], &ring[i]))
        .collect::<Option<Vec<_>>>()?;
    let sum: f64 = (0..n)
        .map(|i| angle(&normals[(i + n - 1) % n], &normals[i], &ring[i]))
        .sum();
    Some(sum - (n as f64 - 2.0) * PI)
}

/// Van Oosterom–Strackee signed solid angle of the triangle on the unit sphere.
#[inline]
fn unit_triangle_area(a: &Coord, b: &Coord, c: &Coord) -> f64 {
    let num = a.dot(&b.cross(c));
    let den = 1.0 + a.dot(b) + b.dot(c) + c.dot(a);
    2.0 * num.atan2(den)
}
