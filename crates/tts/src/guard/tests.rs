use super::*;
use crate::context::TtsCfg;
use crate::detector::detect_all;
use crate::error::TtsError;
use crate::flows::LonLatGrid;
use crate::mesh::{cube, from_polygons, Level, Point, PolygonId, Side, VertexId};
use crate::sphere::{central_angle, from_lon_lat, Coord, Sphere};
use crate::track::{Frame, Location, TimeLevel, Velocity};
use std::f64::consts::PI;

/// No motion at all: every tracked point stays put.
struct Still;

impl VelocityField for Still {
    fn velocity(&self, _: &Coord, _: &Location, _: TimeLevel, _: Frame) -> Velocity {
        Velocity::zeros()
    }
}

fn notch(tip_deg: f64) -> Mesh {
    let pts: Vec<Coord> = [(-5.0, -5.0), (5.0, -5.0), (5.0, 5.0), (0.0, tip_deg), (-5.0, 5.0)]
        .iter()
        .map(|&(lon, lat): &(f64, f64)| from_lon_lat(lon.to_radians(), lat.to_radians()))
        .collect();
    from_polygons(Sphere::default(), &pts, &[vec![0, 1, 2, 3, 4], vec![4, 3, 2, 1, 0]]).unwrap()
}

/// A single ring of `(lon, lat)` degrees and its complement.
fn polygon_mesh(pts: &[(f64, f64)]) -> Mesh {
    let xs: Vec<Coord> = pts
        .iter()
        .map(|&(lon, lat)| from_lon_lat(lon.to_radians(), lat.to_radians()))
        .collect();
    let ring: Vec<usize> = (0..xs.len()).collect();
    let back: Vec<usize> = ring.iter().rev().copied().collect();
    from_polygons(Sphere::default(), &xs, &[ring, back]).unwrap()
}

/// Latitude in degrees of the arc from (-5°, -5°) to (5°, -5°) at `lon` degrees.
fn bottom_lat(lon: f64) -> f64 {
    let t = 5f64.to_radians();
    -(t.tan() * lon.to_radians().cos() / t.cos()).atan().to_degrees()
}

fn area_sum(mesh: &mut Mesh) -> f64 {
    mesh.polygon_ids().into_iter().map(|p| mesh.calc_area(p)).sum()
}

/// Stored areas are current and the polygons tile the sphere.
fn assert_tiles(mesh: &Mesh) {
    let mut sum = 0.0;
    for p in mesh.polygon_ids() {
        let fresh = mesh.sphere.polygon_area(&mesh.polygon_coords(p, Level::New));
        assert!(fresh > 0.0, "{p} encloses nothing");
        assert!((mesh[p].area - fresh).abs() < 1e-12, "{p}: stored {} vs {fresh}", mesh[p].area);
        sum += fresh;
    }
    assert!((sum - 4.0 * PI).abs() < 1e-10, "areas sum to {sum}");
}

/// Nothing is queued and no surviving pairing would queue its vertex again.
fn assert_settled(mesh: &Mesh, ctx: &Context) {
    assert!(ctx.approaching().is_empty());
    let sphere = mesh.sphere;
    for v in mesh.vertex_ids() {
        let Some(e) = mesh.pairing(v) else {
            continue;
        };
        let [a, b] = mesh[e].ends;
        assert!(v != a && v != b, "{v} paired with its own {e}");
        let (xa, xb, xv) = (mesh.coord(a, Level::New), mesh.coord(b, Level::New), mesh.coord(v, Level::New));
        if let Some((_, d)) = sphere.project(&xa, &xb, &xv) {
            assert!(!ctx.cfg.detect.is_approaching(&sphere, mesh[v].agent.distance, d), "{v} still closing in on {e}");
        }
    }
    let (mut again, mut fresh) = (mesh.clone(), ctx.clone());
    detect_all(&mut again, &mut fresh).unwrap();
    assert!(fresh.approaching().is_empty());
}

/// Detect, then split at the head of the worklist.
fn split_front(
    mesh: &mut Mesh,
    ctx: &mut Context,
    tracker: &Tracker<'_, LonLatGrid, Still>,
) -> Option<split::Mode> {
    detect_all(mesh, ctx).unwrap();
    let v3 = ctx.approaching().front().unwrap();
    let e1 = mesh.pairing(v3).unwrap();
    let mode = split::split_at(mesh, ctx, tracker, v3, e1, true, 0).unwrap();
    ctx.tasks.run(mesh);
    mode
}

#[test]
fn quiet_mesh_is_left_alone() {
    let mut mesh = cube(Sphere::default()).unwrap();
    let mut ctx = Context::new(TtsCfg::default());
    let grid = LonLatGrid::default();
    let tracker = Tracker::new(&grid, &Still, 1.0, mesh.sphere);
    let report = guard(&mut mesh, &mut ctx, &tracker).unwrap();
    assert_eq!(report, GuardReport::default());
    assert!(!report.changed());
    assert_eq!(mesh.num_vertices(), 8);
    mesh.check_topology().unwrap();
}

#[test]
fn bent_edge_is_split_at_its_test_point() {
    let mut mesh = cube(Sphere::default()).unwrap();
    let mut ctx = Context::new(TtsCfg::default());
    let grid = LonLatGrid::default();
    let tracker = Tracker::new(&grid, &Still, 1.0, mesh.sphere);
    assert_eq!(edges::split_edges(&mut mesh, &mut ctx, &tracker).unwrap(), 0);

    let e = mesh.edge_ids()[0];
    let [a, b] = mesh[e].ends;
    let m = (mesh.coord(a, Level::New) + mesh.coord(b, Level::New)).normalize();
    let bulge = (m + 0.2 * mesh[e].normal.new).normalize();
    mesh[e].test_point = Point::at(bulge);
    assert_eq!(edges::split_edges(&mut mesh, &mut ctx, &tracker).unwrap(), 1);

    assert_eq!(mesh.num_vertices(), 9);
    assert_eq!(mesh.num_edges(), 13);
    mesh.check_topology().unwrap();
    let n = VertexId(8);
    assert_eq!(mesh.coord(n, Level::New), bulge);
    assert_eq!(mesh[n].edges.len(), 2);
    for p in mesh.vertex_polygons(n) {
        assert_eq!(mesh[p].len, 5);
    }
    assert!((area_sum(&mut mesh) - 4.0 * PI).abs() < 1e-10);
    // Both halves are straight again.
    assert_eq!(edges::split_edges(&mut mesh, &mut ctx, &tracker).unwrap(), 0);
}

#[test]
fn short_edge_is_merged_back() {
    let mut mesh = cube(Sphere::default()).unwrap();
    let mut ctx = Context::new(TtsCfg::default());
    let grid = LonLatGrid::default();
    let tracker = Tracker::new(&grid, &Still, 1.0, mesh.sphere);
    let e = mesh.edge_ids()[3];
    let [a, b] = mesh[e].ends;
    let near_a = (0.9999 * mesh.coord(a, Level::New) + 0.0001 * mesh.coord(b, Level::New)).normalize();
    mesh[e].test_point = Point::at(near_a);
    edges::split_edge(&mut mesh, &mut ctx, &tracker, e).unwrap();
    ctx.tasks.run(&mut mesh);
    assert_eq!(mesh.num_vertices(), 9);

    assert_eq!(edges::merge_edges(&mut mesh, &mut ctx, &tracker).unwrap(), 1);
    assert_eq!(mesh.num_vertices(), 8);
    assert_eq!(mesh.num_edges(), 12);
    mesh.check_topology().unwrap();
    for p in mesh.polygon_ids() {
        assert_eq!(mesh[p].len, 4);
    }
    assert!((area_sum(&mut mesh) - 4.0 * PI).abs() < 1e-10);
}

#[test]
fn paired_vertex_is_not_merged() {
    let mut mesh = cube(Sphere::default()).unwrap();
    let mut ctx = Context::new(TtsCfg::default());
    let grid = LonLatGrid::default();
    let tracker = Tracker::new(&grid, &Still, 1.0, mesh.sphere);
    let e = mesh.edge_ids()[3];
    let [a, b] = mesh[e].ends;
    let near_a = (0.9999 * mesh.coord(a, Level::New) + 0.0001 * mesh.coord(b, Level::New)).normalize();
    mesh[e].test_point = Point::at(near_a);
    let n = edges::split_edge(&mut mesh, &mut ctx, &tracker, e).unwrap();
    let other = mesh.edge_ids()[0];
    crate::detector::pair(&mut mesh, n, other, Coord::z(), 1.0, Side::Left);
    assert_eq!(edges::merge_edges(&mut mesh, &mut ctx, &tracker).unwrap(), 0);
}

#[test]
fn close_tip_is_moved_onto_the_edge() {
    let mut mesh = notch(-5.01);
    let k = mesh.add_tracer(|_| 1.0);
    let mass = mesh.total_mass(k);
    let mut ctx = Context::new(TtsCfg::default());
    let grid = LonLatGrid::default();
    let tracker = Tracker::new(&grid, &Still, 1.0, mesh.sphere);

    let report = guard(&mut mesh, &mut ctx, &tracker).unwrap();
    assert_eq!(report.polygons_split, 1);
    assert_eq!(mesh.num_polygons(), 3);
    assert_eq!(mesh.num_vertices(), 5);
    assert_eq!(mesh.num_edges(), 6);
    mesh.check_topology().unwrap();
    let lens: Vec<usize> = mesh.polygon_ids().iter().map(|&p| mesh[p].len).collect();
    assert_eq!(lens.iter().filter(|&&n| n == 3).count(), 2);
    assert!(lens.contains(&6));

    assert!((mesh.total_mass(k) - mass).abs() < 1e-12);
    // The complement gained the cut vertex; its stored area follows.
    assert_tiles(&mesh);
    let (halves, rest): (Vec<PolygonId>, Vec<PolygonId>) =
        mesh.polygon_ids().into_iter().partition(|&p| mesh[p].len == 3);
    let halves_area: f64 = halves.iter().map(|&p| mesh[p].area).sum();
    assert!((halves_area - (4.0 * PI - mesh[rest[0]].area)).abs() < 1e-10);
    // Uniform density: the halves split their combined mass by area.
    let halves_mass: f64 = halves.iter().map(|&p| mesh.mass(p, k)).sum();
    for &p in &halves {
        assert!((mesh.mass(p, k) / halves_mass - mesh[p].area / halves_area).abs() < 1e-12);
    }
    assert!(ctx.approaching().is_empty());
}

#[test]
fn distant_tip_is_connected_with_a_new_edge() {
    // Close in from 0.3° to 0.05° in one step: fast enough to be queued, too far to move.
    let mut mesh = notch(-4.719);
    let mut ctx = Context::new(TtsCfg::default());
    let grid = LonLatGrid::default();
    let tracker = Tracker::new(&grid, &Still, 1.0, mesh.sphere);
    crate::detector::detect_all(&mut mesh, &mut ctx).unwrap();
    let tip = VertexId(3);
    assert!(mesh.pairing(tip).is_some());
    assert!(ctx.approaching().is_empty());

    mesh[tip].point.x.new = from_lon_lat(0.0, (-4.969f64).to_radians());
    crate::detector::detect_all(&mut mesh, &mut ctx).unwrap();
    assert_eq!(ctx.approaching().front(), Some(tip));

    assert_eq!(split::split_polygons(&mut mesh, &mut ctx, &tracker).unwrap(), 1);
    assert_eq!(mesh.num_vertices(), 6);
    assert_eq!(mesh.num_edges(), 7);
    assert_eq!(mesh.num_polygons(), 3);
    mesh.check_topology().unwrap();
    // The tip survives and gains the connecting edge.
    assert_eq!(mesh[tip].edges.len(), 3);
    assert_settled(&mesh, &ctx);
    assert_tiles(&mesh);
}

#[test]
fn tip_near_an_end_snaps_onto_it() {
    // Tip 0.3° from one end of the bottom edge and 0.005° above it. The edge from the tip
    // to the far top corner is left dangling inside the complement.
    for (lon, mode, dangling) in [
        (-4.7, split::Mode::SnapFirst, VertexId(4)),
        (4.7, split::Mode::SnapSecond, VertexId(2)),
    ] {
        let mut mesh = polygon_mesh(&[(-5.0, -5.0), (5.0, -5.0), (5.0, 5.0), (lon, -4.997), (-5.0, 5.0)]);
        let k = mesh.add_tracer(|_| 1.0);
        let mass = mesh.total_mass(k);
        let mut ctx = Context::new(TtsCfg::default());
        let grid = LonLatGrid::default();
        let tracker = Tracker::new(&grid, &Still, 1.0, mesh.sphere);

        assert_eq!(split_front(&mut mesh, &mut ctx, &tracker), Some(mode));
        assert!(!mesh.contains_vertex(VertexId(3)));
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 4);
        assert_eq!(mesh.num_polygons(), 2);
        mesh.check_topology().unwrap();
        let mut lens: Vec<usize> = mesh.polygon_ids().iter().map(|&p| mesh[p].len).collect();
        lens.sort();
        assert_eq!(lens, vec![3, 5]);
        assert_eq!(mesh[dangling].edges.len(), 1);
        assert!((mesh.total_mass(k) - mass).abs() < 1e-12);
        assert_tiles(&mesh);
        assert!(ctx.approaching().is_empty());
    }
}

#[test]
fn snapping_over_a_vertex_bends_the_edge_instead() {
    // Snapping the tip to the bottom-left corner would drag its edge to the top-left
    // corner across the bulge at (-4.8°, 0°).
    let tip_lat = bottom_lat(-4.3) + 0.01;
    let mut mesh = polygon_mesh(&[
        (-5.0, -5.0),
        (5.0, -5.0),
        (5.0, 5.0),
        (-4.3, tip_lat),
        (-5.0, 5.0),
        (-4.8, 0.0),
    ]);
    let k = mesh.add_tracer(|_| 1.0);
    let mass = mesh.total_mass(k);
    let mut ctx = Context::new(TtsCfg::default());
    let grid = LonLatGrid::default();
    let tracker = Tracker::new(&grid, &Still, 1.0, mesh.sphere);

    assert_eq!(split_front(&mut mesh, &mut ctx, &tracker), Some(split::Mode::Reuse));
    let tip = VertexId(3);
    assert_eq!(mesh.num_vertices(), 6);
    assert_eq!(mesh.num_edges(), 7);
    assert_eq!(mesh.num_polygons(), 3);
    mesh.check_topology().unwrap();
    // Bottom edge now runs through the tip, which also gains the edge to the corner.
    assert_eq!(mesh[tip].edges.len(), 4);
    assert!(mesh[tip].edges.iter().any(|&e| mesh.other_end(e, tip) == VertexId(0)));
    assert!(mesh[tip].edges.iter().any(|&e| mesh.other_end(e, tip) == VertexId(1)));
    let mut lens: Vec<usize> = mesh.polygon_ids().iter().map(|&p| mesh[p].len).collect();
    lens.sort();
    assert_eq!(lens, vec![3, 4, 7]);
    assert!((mesh.total_mass(k) - mass).abs() < 1e-12);
    assert_tiles(&mesh);
}

#[test]
fn slim_half_is_split_again() {
    // The second vertex sits 0.03° above the bottom edge: after the tip is moved onto the
    // edge it is the apex of a 5° by 0.03° triangle, which is cut down as well.
    let d = (-2.5, bottom_lat(-2.5) + 0.03);
    let mut mesh = polygon_mesh(&[(-5.0, -5.0), (5.0, -5.0), (5.0, 5.0), (0.0, bottom_lat(0.0) + 0.01), d]);
    let xd = from_lon_lat(d.0.to_radians(), d.1.to_radians());
    let k = mesh.add_tracer(|_| 1.0);
    let mass = mesh.total_mass(k);
    let mut ctx = Context::new(TtsCfg::default());
    let grid = LonLatGrid::default();
    let tracker = Tracker::new(&grid, &Still, 1.0, mesh.sphere);

    let report = guard(&mut mesh, &mut ctx, &tracker).unwrap();
    assert_eq!(report.polygons_split, 1);
    assert_eq!(mesh.num_vertices(), 5);
    assert_eq!(mesh.num_edges(), 5);
    assert_eq!(mesh.num_polygons(), 2);
    mesh.check_topology().unwrap();
    let mut lens: Vec<usize> = mesh.polygon_ids().iter().map(|&p| mesh[p].len).collect();
    lens.sort();
    assert_eq!(lens, vec![3, 7]);
    assert!(mesh
        .vertex_ids()
        .iter()
        .all(|&v| central_angle(&mesh.coord(v, Level::New), &xd) > 1e-6));
    assert!((mesh.total_mass(k) - mass).abs() < 1e-12);
    assert_tiles(&mesh);
}

#[test]
fn closer_vertex_on_the_same_edge_goes_first() {
    // Two tips over the bottom edge; the one queued first is the farther one.
    let mut mesh = polygon_mesh(&[
        (-5.0, -5.0),
        (5.0, -5.0),
        (5.0, 5.0),
        (2.0, bottom_lat(2.0) + 0.015),
        (0.0, 4.0),
        (-2.0, bottom_lat(-2.0) + 0.005),
        (-5.0, 5.0),
    ]);
    let k = mesh.add_tracer(|_| 1.0);
    let mass = mesh.total_mass(k);
    let mut ctx = Context::new(TtsCfg::default());
    let grid = LonLatGrid::default();
    let tracker = Tracker::new(&grid, &Still, 1.0, mesh.sphere);
    detect_all(&mut mesh, &mut ctx).unwrap();
    let queued: Vec<VertexId> = ctx.approaching().iter().collect();
    assert_eq!(queued, vec![VertexId(3), VertexId(5)]);
    assert_eq!(mesh.pairing(VertexId(3)), mesh.pairing(VertexId(5)));

    assert_eq!(split::split_polygons(&mut mesh, &mut ctx, &tracker).unwrap(), 2);
    // The first cut vertex lies under the closer tip, west of the meridian.
    let first_cut = VertexId(7);
    assert!(mesh.coord(first_cut, Level::New).y < 0.0);
    assert_eq!(mesh.num_vertices(), 7);
    assert_eq!(mesh.num_edges(), 9);
    assert_eq!(mesh.num_polygons(), 4);
    mesh.check_topology().unwrap();
    assert!((mesh.total_mass(k) - mass).abs() < 1e-12);
    assert_settled(&mesh, &ctx);
    assert_tiles(&mesh);
}

#[test]
fn unconsumed_front_vertex_is_dropped() {
    let mut mesh = notch(-5.01);
    let mut ctx = Context::new(TtsCfg::default());
    let grid = LonLatGrid::default();
    let tracker = Tracker::new(&grid, &Still, 1.0, mesh.sphere);
    detect_all(&mut mesh, &mut ctx).unwrap();
    let tip = VertexId(3);
    let e = mesh.pairing(tip).unwrap();
    assert_eq!(ctx.approaching().front(), Some(tip));

    assert!(!split::drop_if_stuck(&mut mesh, &mut ctx, VertexId(0), e).unwrap());
    assert_eq!(ctx.approaching().len(), 1);
    assert!(split::drop_if_stuck(&mut mesh, &mut ctx, tip, e).unwrap());
    assert!(ctx.approaching().is_empty());
    assert!(!mesh[tip].agent.approaching);
    assert_eq!(mesh.pairing(tip), None);
    assert!(mesh[e].agent.vertices.is_empty());
    assert_eq!(split::split_polygons(&mut mesh, &mut ctx, &tracker).unwrap(), 0);
    assert_eq!(mesh.num_polygons(), 2);
}

#[test]
fn vertex_missing_from_its_ring_is_fatal() {
    let mut mesh = notch(-5.01);
    let mut ctx = Context::new(TtsCfg::default());
    let grid = LonLatGrid::default();
    let tracker = Tracker::new(&grid, &Still, 1.0, mesh.sphere);
    detect_all(&mut mesh, &mut ctx).unwrap();
    let tip = VertexId(3);
    let e1 = mesh.pairing(tip).unwrap();
    let p = mesh.edge_polygon(e1, mesh[tip].agent.side).unwrap();
    // Cut the half-edge into the tip out of the ring; the tip still borders `p`.
    let into = mesh.ring(p).into_iter().find(|&h| mesh.he_second(h) == tip).unwrap();
    mesh.ring_unlink(into);
    assert!(mesh.vertex_polygons(tip).contains(&p));

    let err = split::split_at(&mut mesh, &mut ctx, &tracker, tip, e1, true, 0).unwrap_err();
    assert!(matches!(err, TtsError::VertexOffPolygon { vertex, polygon } if vertex == tip && polygon == p));
}

/// Cube with a lens (two-edge polygon) inserted along one edge.
fn cube_with_lens() -> (Mesh, PolygonId, [PolygonId; 2]) {
    let mut mesh = cube(Sphere::default()).unwrap();
    mesh.add_tracer(|_| 0.0);
    let e = mesh.edge_ids()[0];
    let [u, v] = mesh[e].ends;
    let (Some(hl), Some(hr)) = (mesh[e].half_edges[0], mesh[e].half_edges[1]) else {
        panic!("cube edge without both sides");
    };
    let (f1, f2) = (mesh[hl].polygon, mesh[hr].polygon);
    let e2 = mesh.add_edge(u, v);
    let r2 = mesh.add_half_edge(e2, Side::Right, f2);
    mesh.ring_insert_after(hr, r2);
    mesh.remove_half_edge(hr);
    let q = mesh.add_polygon();
    let a = mesh.add_half_edge(e, Side::Right, q);
    mesh.ring_push_back(q, a);
    let b = mesh.add_half_edge(e2, Side::Left, q);
    mesh.ring_push_back(q, b);
    mesh[q].masses = vec![1.0];
    assert_eq!(mesh[q].len, 2);
    assert!(mesh.check_topology().is_err());
    (mesh, q, [f1, f2])
}

#[test]
fn line_polygon_is_fused_and_its_mass_shared() {
    let (mut mesh, q, [f1, f2]) = cube_with_lens();
    let mut ctx = Context::new(TtsCfg::default());
    assert_eq!(mesh.num_edges(), 13);
    let removed = degenerate::collapse(&mut mesh, &mut ctx, vec![q], [f1, f2]).unwrap();
    assert_eq!(removed, 1);
    assert!(!mesh.contains_polygon(q));
    assert_eq!(mesh.num_edges(), 12);
    assert_eq!(mesh.num_polygons(), 6);
    mesh.check_topology().unwrap();
    assert_eq!(mesh.mass(f1, 0), 0.5);
    assert_eq!(mesh.mass(f2, 0), 0.5);
}

#[test]
fn partner_inherits_everything() {
    let (mut mesh, q, [f1, f2]) = cube_with_lens();
    let mut ctx = Context::new(TtsCfg::default());
    degenerate::collapse(&mut mesh, &mut ctx, vec![q], [q, f2]).unwrap();
    assert_eq!(mesh.mass(f1, 0), 0.0);
    assert_eq!(mesh.mass(f2, 0), 1.0);
}

#[test]
fn point_polygon_is_dropped_with_its_loop() {
    let mut mesh = cube(Sphere::default()).unwrap();
    mesh.add_tracer(|_| 0.0);
    let f = mesh.polygon_ids()[0];
    let h = mesh.ring(f)[0];
    let u = mesh.he_second(h);
    let l = mesh.add_edge(u, u);
    let q = mesh.add_polygon();
    let a = mesh.add_half_edge(l, Side::Left, q);
    mesh.ring_push_back(q, a);
    let b = mesh.add_half_edge(l, Side::Right, f);
    mesh.ring_insert_after(h, b);
    mesh[q].masses = vec![2.0];
    assert!(mesh.check_topology().is_err());
    assert_eq!(mesh[f].len, 5);

    let mut ctx = Context::new(TtsCfg::default());
    degenerate::collapse(&mut mesh, &mut ctx, vec![q], [q, q]).unwrap();
    assert_eq!(mesh.num_polygons(), 6);
    assert_eq!(mesh.num_edges(), 12);
    assert_eq!(mesh[f].len, 4);
    assert_eq!(mesh.mass(f, 0), 2.0);
    mesh.check_topology().unwrap();
}

#[test]
fn loop_inside_a_longer_ring_is_dropped() {
    let mut mesh = cube(Sphere::default()).unwrap();
    let f = mesh.polygon_ids()[0];
    let h = mesh.ring(f)[0];
    let u = mesh.he_second(h);
    let g = mesh
        .vertex_polygons(u)
        .into_iter()
        .find(|&p| p != f)
        .unwrap();
    let gh = mesh
        .ring(g)
        .into_iter()
        .find(|&x| mesh.he_second(x) == u)
        .unwrap();
    let l = mesh.add_edge(u, u);
    let a = mesh.add_half_edge(l, Side::Left, f);
    mesh.ring_insert_after(h, a);
    let b = mesh.add_half_edge(l, Side::Right, g);
    mesh.ring_insert_after(gh, b);
    mesh.check_topology().unwrap();

    let mut ctx = Context::new(TtsCfg::default());
    let touched = degenerate::drop_loops(&mut mesh, &mut ctx, &[l]).unwrap();
    assert_eq!(touched, vec![f, g]);
    assert!(!mesh.contains_edge(l));
    assert_eq!(mesh[f].len, 4);
    assert_eq!(mesh[g].len, 4);
    mesh.check_topology().unwrap();
}
