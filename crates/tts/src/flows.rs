//! Reference collaborators: a regular lon/lat grid locator and analytic test flows.
//!
//! Purpose
//! - Stand-ins for a host model so the mesh can be driven end to end in tests, benches and
//!   the CLI. The flows are the standard transport test cases on the sphere.
//!
//! References
//! - Williamson et al. (1992), case 1: solid-body rotation.
//! - Nair & Lauritzen (2010), "A class of deformational flow test cases for linear
//!   transport problems on the sphere": cases 1–4 and the cosine-bell initial condition.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::sphere::{central_angle, from_lon_lat, to_lon_lat, Coord, Sphere};
use crate::track::{stereo_velocity, Frame, Location, Locator, TimeLevel, Velocity, VelocityField};

/// Regular lon/lat grid with coarse buckets and a polar cap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LonLatGrid {
    pub nlon: usize,
    pub nlat: usize,
    /// Fine cells per coarse bucket along each axis.
    pub coarse_factor: usize,
    /// Polar cap half-width in degrees (points within it use the stereographic frame).
    pub pole_cap_deg: f64,
}

impl Default for LonLatGrid {
    fn default() -> Self {
        Self {
            nlon: 360,
            nlat: 180,
            coarse_factor: 4,
            pole_cap_deg: 5.0,
        }
    }
}

impl Locator for LonLatGrid {
    fn locate(&self, x: &Coord) -> Location {
        let (lon, lat) = to_lon_lat(x);
        let nlon = self.nlon.max(1);
        let nlat = self.nlat.max(1);
        let f = self.coarse_factor.max(1);
        let i = ((lon / TAU * nlon as f64) as usize).min(nlon - 1);
        let j = (((lat + FRAC_PI_2) / PI * nlat as f64) as usize).min(nlat - 1);
        Location {
            cell: j * nlon + i,
            coarse: (i / f, j / f),
            coarse_lon_count: nlon.div_ceil(f),
            on_pole: lat.abs() > FRAC_PI_2 - self.pole_cap_deg.to_radians(),
        }
    }
}

/// Analytic wind in eastward/northward components at time `t`.
pub trait LonLatFlow {
    fn wind(&self, lon: f64, lat: f64, t: f64) -> (f64, f64);
}

/// Samples a `LonLatFlow` over the step `[time, time + dt]`.
#[derive(Clone, Copy, Debug)]
pub struct Sampled<'a, F> {
    pub flow: &'a F,
    pub time: f64,
    pub dt: f64,
}

impl<'a, F: LonLatFlow> Sampled<'a, F> {
    pub fn new(flow: &'a F, time: f64, dt: f64) -> Self {
        Self { flow, time, dt }
    }
}

impl<F: LonLatFlow> VelocityField for Sampled<'_, F> {
    fn velocity(&self, x: &Coord, _loc: &Location, level: TimeLevel, frame: Frame) -> Velocity {
        let t = match level {
            TimeLevel::Old => self.time,
            TimeLevel::Half => self.time + 0.5 * self.dt,
            TimeLevel::New => self.time + self.dt,
        };
        let (lon, lat) = to_lon_lat(x);
        let (u, v) = self.flow.wind(lon, lat, t);
        match frame {
            Frame::LonLat => Velocity::new(u, v),
            Frame::Stereographic => stereo_velocity(lon, lat, u, v, x.z >= 0.0),
        }
    }
}

/// Solid-body rotation; one revolution per `period`, axis tilted by `alpha` from the pole.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolidRotation {
    pub period: f64,
    pub alpha: f64,
    pub sphere: Sphere,
}

impl LonLatFlow for SolidRotation {
    fn wind(&self, lon: f64, lat: f64, _t: f64) -> (f64, f64) {
        let u0 = TAU * self.sphere.radius / self.period;
        let (sa, ca) = self.alpha.sin_cos();
        let u = u0 * (lat.cos() * ca + lat.sin() * lon.cos() * sa);
        let v = -u0 * lon.sin() * sa;
        (u, v)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeformationCase {
    /// Non-divergent, two vortices.
    Case1,
    /// Non-divergent, stronger stretching.
    Case2,
    /// Divergent.
    Case3,
    /// Non-divergent with a background zonal rotation.
    Case4,
}

/// Reversing deformational flow: the field returns to its initial state at `t = period`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deformation {
    pub case: DeformationCase,
    pub period: f64,
    pub sphere: Sphere,
}

impl LonLatFlow for Deformation {
    fn wind(&self, lon: f64, lat: f64, t: f64) -> (f64, f64) {
        let r = self.sphere.radius;
        let tp = self.period;
        // The published amplitudes are for T = 5 on the unit sphere.
        let s = r * 5.0 / tp;
        let ct = (PI * t / tp).cos();
        match self.case {
            DeformationCase::Case1 => {
                let k = 2.4;
                let u = k * (0.5 * lon).sin().powi(2) * (2.0 * lat).sin() * ct;
                let v = 0.5 * k * lon.sin() * lat.cos() * ct;
                (s * u, s * v)
            }
            DeformationCase::Case2 => {
                let k = 2.0;
                let u = k * lon.sin().powi(2) * (2.0 * lat).sin() * ct;
                let v = k * (2.0 * lon).sin() * lat.cos() * ct;
                (s * u, s * v)
            }
            DeformationCase::Case3 => {
                let k = 1.0;
                let u = -k * (0.5 * lon).sin().powi(2) * (2.0 * lat).sin() * lat.cos().powi(2) * ct;
                let v = 0.5 * k * lon.sin() * lat.cos().powi(3) * ct;
                (s * u, s * v)
            }
            DeformationCase::Case4 => {
                let k = 2.0;
                let lp = lon - TAU * t / tp;
                let u = k * lp.sin().powi(2) * (2.0 * lat).sin() * ct;
                let v = k * (2.0 * lp).sin() * lat.cos() * ct;
                (s * u + TAU * r * lat.cos() / tp, s * v)
            }
        }
    }
}

/// Two cosine bells on a background value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CosineBells {
    pub background: f64,
    pub amplitude: f64,
    /// Bell radius in radians.
    pub width: f64,
    pub centers: [(f64, f64); 2],
}

impl Default for CosineBells {
    fn default() -> Self {
        Self {
            background: 0.1,
            amplitude: 0.9,
            width: 0.5,
            centers: [(5.0 * PI / 6.0, 0.0), (7.0 * PI / 6.0, 0.0)],
        }
    }
}

impl CosineBells {
    pub fn density(&self, x: &Coord) -> f64 {
        let bump: f64 = self
            .centers
            .iter()
            .map(|&(lon, lat)| {
                let r = central_angle(x, &from_lon_lat(lon, lat));
                if r < self.width {
                    0.5 * (1.0 + (PI * r / self.width).cos())
                } else {
                    0.0
                }
            })
            .sum();
        self.background + self.amplitude * bump
    }
}
