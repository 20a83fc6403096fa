//! Deformational-flow run on a lon/lat mesh, reporting conservation and surgery counts.
//!
//! Purpose
//! - Exercise the whole maintenance pipeline over a reversing flow and print a few numbers
//!   that should stay stable between versions: polygon count growth, edge splits and the
//!   worst relative mass error.
//!
//! Usage
//!   cargo run -p tts --example deformation_run -- [nlon] [steps]
//!
//! References
//! - Code: crates/tts/src/advect.rs::advect
//! - Code: crates/tts/src/flows.rs::Deformation

use std::time::Instant;

use tts::api::*;

fn main() {
    let mut args = std::env::args().skip(1);
    let nlon: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(72);
    let steps: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(300);

    let sphere = Sphere::default();
    let mut mesh = lon_lat(sphere, nlon, nlon / 2).expect("mesh builds");
    let bells = CosineBells::default();
    let k = mesh.add_tracer(|x| bells.density(x));
    let mass0 = mesh.total_mass(k);
    let polygons0 = mesh.num_polygons();

    let flow = Deformation {
        case: DeformationCase::Case1,
        period: 5.0,
        sphere,
    };
    let grid = LonLatGrid::default();
    let dt = flow.period / 600.0;
    let mut ctx = Context::new(TtsCfg::default());

    let mut guard = GuardReport::default();
    let mut worst_bias: f64 = 0.0;
    let start = Instant::now();
    for n in 0..steps {
        let field = Sampled::new(&flow, n as f64 * dt, dt);
        let tracker = Tracker::new(&grid, &field, dt, sphere);
        let report = advect(&mut mesh, &mut ctx, &tracker).expect("step succeeds");
        guard.edges_split += report.guard.edges_split;
        guard.edges_merged += report.guard.edges_merged;
        guard.polygons_split += report.guard.polygons_split;
        worst_bias = worst_bias.max(report.area_bias.abs());
    }
    let elapsed = start.elapsed().as_secs_f64() * 1e3;
    let mass_error = (mesh.total_mass(k) - mass0) / mass0;

    println!("case=Case1 nlon={nlon} steps={steps} dt={dt:.6}");
    println!(
        "polygons_start={polygons0} polygons_end={} vertices_end={} edges_end={}",
        mesh.num_polygons(),
        mesh.num_vertices(),
        mesh.num_edges()
    );
    println!(
        "edges_split={} edges_merged={} polygons_split={}",
        guard.edges_split, guard.edges_merged, guard.polygons_split
    );
    println!("mass_rel_error={mass_error:.3e} worst_area_bias={worst_bias:.3e}");
    println!("run_time_ms={elapsed:.3}");
}
