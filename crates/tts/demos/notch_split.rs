//! A notched square closing onto its own edge, split before the tip crosses.
//!
//! Purpose
//! - Show a single polygon split step by step: the distance the tip keeps to the opposite
//!   edge, the step at which the cut happens, and how mass is shared between the halves.
//!
//! Usage
//!   cargo run -p tts --example notch_split
//!
//! References
//! - Code: crates/tts/src/guard/split.rs::split_polygons

use std::f64::consts::{PI, TAU};

use tts::api::*;

/// Southward drift in a thin strip around lon 0 that stops just below lat -5°.
struct Squeeze;

impl VelocityField for Squeeze {
    fn velocity(&self, x: &Coord, _: &Location, _: TimeLevel, _: Frame) -> Velocity {
        let (lon, lat) = to_lon_lat(x);
        let lon = if lon > PI { lon - TAU } else { lon };
        if lon.abs() < 1f64.to_radians() && lat > (-5.025f64).to_radians() {
            Velocity::new(0.0, -(0.015f64).to_radians())
        } else {
            Velocity::zeros()
        }
    }
}

fn main() {
    let pts: Vec<Coord> = [(-5.0, -5.0), (5.0, -5.0), (5.0, 5.0), (0.0, -4.9), (-5.0, 5.0)]
        .iter()
        .map(|&(lon, lat): &(f64, f64)| from_lon_lat(lon.to_radians(), lat.to_radians()))
        .collect();
    let mut mesh = from_polygons(
        Sphere::default(),
        &pts,
        &[vec![0, 1, 2, 3, 4], vec![4, 3, 2, 1, 0]],
    )
    .expect("notch builds");
    let k = mesh.add_tracer(|_| 1.0);
    let mass0 = mesh.total_mass(k);
    let tip = mesh.vertex_ids()[3];
    let bottom = from_lon_lat(0.0, (-5.0f64).to_radians());

    let grid = LonLatGrid::default();
    let tracker = Tracker::new(&grid, &Squeeze, 1.0, mesh.sphere);
    let mut ctx = Context::new(TtsCfg::default());
    for _ in 0..20 {
        let gap = if mesh.contains_vertex(tip) {
            central_angle(&mesh.coord(tip, Level::New), &bottom).to_degrees()
        } else {
            f64::NAN
        };
        let report = advect(&mut mesh, &mut ctx, &tracker).expect("step succeeds");
        println!(
            "step={} gap_deg={gap:.4} queued={} polygons={}",
            report.step,
            ctx.approaching().len(),
            report.polygons
        );
        if report.guard.polygons_split > 0 {
            break;
        }
    }
    for p in mesh.polygon_ids() {
        println!(
            "polygon={} sides={} area={:.6e} mass={:.6e}",
            p.0,
            mesh[p].len,
            mesh[p].area,
            mesh.mass(p, k)
        );
    }
    println!("mass_rel_error={:.3e}", (mesh.total_mass(k) - mass0) / mass0);
}
