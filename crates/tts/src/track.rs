//! Trajectory integration of mesh points through a host-supplied velocity field.
//!
//! Purpose
//! - Advance a `Point` by one time step with classical RK4, re-locating it in the host's
//!   background grid after every sub-step so velocity sampling stays cell-local.
//!
//! Why this design
//! - The host owns the grid and the wind; they reach the mesh only through the `Locator`
//!   and `VelocityField` traits, so the integrator is testable with analytic flows.
//! - Away from the poles the step is taken in longitude/latitude; within the polar cap
//!   (flagged by the locator) a stereographic projection about the nearer pole avoids the
//!   `1/cos φ` singularity. The frame is chosen once per step from the starting location.
//!
//! References
//! - Williamson et al. (1992) for the lon/lat ↔ polar-stereographic wind transform.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::mesh::Point;
use crate::sphere::{from_lon_lat, to_lon_lat, Coord, Sphere};

/// Velocity components in the frame they were requested in:
/// `(u, v)` eastward/northward for `Frame::LonLat`, `(dX/dt, dY/dt)` for `Frame::Stereographic`.
pub type Velocity = Vector2<f64>;

/// Background-grid location of a point, as reported by the host's `Locator`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Host cell index (opaque to the mesh).
    pub cell: usize,
    /// Coarse (lon, lat) bucket used by the detector's bounding-box filter.
    pub coarse: (usize, usize),
    /// Number of coarse buckets around a latitude circle (for longitude wrap-around).
    pub coarse_lon_count: usize,
    /// Inside the polar cap where trajectories switch to the stereographic frame.
    pub on_pole: bool,
}

/// Coordinate frame for a trajectory step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    LonLat,
    /// Polar stereographic about the pole in the point's hemisphere.
    Stereographic,
}

/// Time level at which the field is sampled within a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeLevel {
    Old,
    Half,
    New,
}

/// Maps a point to its background-grid location.
pub trait Locator {
    fn locate(&self, x: &Coord) -> Location;
}

/// Samples the velocity at a located point.
pub trait VelocityField {
    fn velocity(&self, x: &Coord, loc: &Location, level: TimeLevel, frame: Frame) -> Velocity;
}

/// RK4 trajectory tracker bound to one step of one field.
#[derive(Clone, Copy, Debug)]
pub struct Tracker<'a, L, V> {
    pub locator: &'a L,
    pub field: &'a V,
    pub dt: f64,
    pub sphere: Sphere,
}

impl<'a, L: Locator, V: VelocityField> Tracker<'a, L, V> {
    pub fn new(locator: &'a L, field: &'a V, dt: f64, sphere: Sphere) -> Self {
        Self {
            locator,
            field,
            dt,
            sphere,
        }
    }

    #[inline]
    pub fn locate(&self, x: &Coord) -> Location {
        self.locator.locate(x)
    }

    /// Refresh a point's cached location from its new-level coordinate.
    pub fn relocate(&self, point: &mut Point) {
        point.loc = self.locate(&point.x.new);
    }

    /// Advance `point` by one step: old ← new, new ← RK4 endpoint.
    pub fn track(&self, point: &mut Point) {
        let (x, loc) = self.integrate(&point.x.new, &point.loc);
        point.advance(x, loc);
    }

    /// RK4 from `x0` over `dt`; returns the endpoint and its location.
    pub fn integrate(&self, x0: &Coord, loc0: &Location) -> (Coord, Location) {
        let frame = if loc0.on_pole {
            Frame::Stereographic
        } else {
            Frame::LonLat
        };
        let dt = self.dt;
        let r = self.sphere.radius;
        let k1 = self.field.velocity(x0, loc0, TimeLevel::Old, frame);
        let x1 = move_point(x0, &k1, 0.5 * dt, frame, r);
        let k2 = self
            .field
            .velocity(&x1, &self.locate(&x1), TimeLevel::Half, frame);
        let x2 = move_point(x0, &k2, 0.5 * dt, frame, r);
        let k3 = self
            .field
            .velocity(&x2, &self.locate(&x2), TimeLevel::Half, frame);
        let x3 = move_point(x0, &k3, dt, frame, r);
        let k4 = self
            .field
            .velocity(&x3, &self.locate(&x3), TimeLevel::New, frame);
        let k = (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0;
        let x = move_point(x0, &k, dt, frame, r);
        let loc = self.locate(&x);
        (x, loc)
    }
}

/// Move `x0` with constant `vel` for `dt` in `frame` on a sphere of radius `r`.
pub fn move_point(x0: &Coord, vel: &Velocity, dt: f64, frame: Frame, r: f64) -> Coord {
    let (lon, lat) = to_lon_lat(x0);
    match frame {
        Frame::LonLat => {
            let coslat = lat.cos().max(1e-12);
            let mut lon1 = lon + vel.x * dt / (r * coslat);
            let mut lat1 = lat + vel.y * dt / r;
            // Over the pole: come down the other meridian.
            if lat1 > FRAC_PI_2 {
                lat1 = PI - lat1;
                lon1 += PI;
            } else if lat1 < -FRAC_PI_2 {
                lat1 = -PI - lat1;
                lon1 += PI;
            }
            from_lon_lat(lon1, lat1)
        }
        Frame::Stereographic => {
            let north = x0.z >= 0.0;
            let (sx, sy) = stereo_forward(lon, lat, north, r);
            let (lon1, lat1) = stereo_inverse(sx + vel.x * dt, sy + vel.y * dt, north, r);
            from_lon_lat(lon1, lat1)
        }
    }
}

/// Polar stereographic coordinates of `(lon, lat)` about the north (or south) pole.
pub fn stereo_forward(lon: f64, lat: f64, north: bool, r: f64) -> (f64, f64) {
    let phi = if north { lat } else { -lat };
    let rho = 2.0 * r * (FRAC_PI_4 - 0.5 * phi).tan();
    (rho * lon.cos(), rho * lon.sin())
}

pub fn stereo_inverse(x: f64, y: f64, north: bool, r: f64) -> (f64, f64) {
    let rho = x.hypot(y);
    let phi = FRAC_PI_2 - 2.0 * (rho / (2.0 * r)).atan();
    let lon = y.atan2(x);
    (lon, if north { phi } else { -phi })
}

/// Convert an eastward/northward wind at `(lon, lat)` to stereographic components.
pub fn stereo_velocity(lon: f64, lat: f64, u: f64, v: f64, north: bool) -> Velocity {
    let (s, c) = lon.sin_cos();
    if north {
        let k = 1.0 + lat.sin();
        Velocity::new((-2.0 * v * c - 2.0 * u * s) / k, (-2.0 * v * s + 2.0 * u * c) / k)
    } else {
        let k = 1.0 - lat.sin();
        Velocity::new((2.0 * v * c - 2.0 * u * s) / k, (2.0 * v * s + 2.0 * u * c) / k)
    }
}
