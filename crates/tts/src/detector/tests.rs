use super::*;
use crate::context::TtsCfg;
use crate::mesh::{cube, from_polygons, Point};
use crate::sphere::{from_lon_lat, Sphere};

/// Square with a V-notch from the top whose tip sits `tip_deg` north of the bottom edge's
/// endpoints, plus the complement polygon. Vertex order A, B, C, E (tip), D.
fn notch(tip_deg: f64) -> Mesh {
    let pts: Vec<Coord> = [(-5.0, -5.0), (5.0, -5.0), (5.0, 5.0), (0.0, tip_deg), (-5.0, 5.0)]
        .iter()
        .map(|&(lon, lat): &(f64, f64)| from_lon_lat(lon.to_radians(), lat.to_radians()))
        .collect();
    from_polygons(Sphere::default(), &pts, &[vec![0, 1, 2, 3, 4], vec![4, 3, 2, 1, 0]]).unwrap()
}

fn ctx() -> Context {
    Context::new(TtsCfg::default())
}

fn move_vertex(mesh: &mut Mesh, v: VertexId, lon_deg: f64, lat_deg: f64) {
    mesh[v].point.x.new = from_lon_lat(lon_deg.to_radians(), lat_deg.to_radians());
}

#[test]
fn trend_ramps_between_its_endpoints() {
    let cfg = DetectCfg::default();
    let s = Sphere::default();
    assert_eq!(cfg.trend(&s, s.arc(0.001)), cfg.trend_p0);
    assert_eq!(cfg.trend(&s, s.arc(0.005)), cfg.trend_p0);
    assert_eq!(cfg.trend(&s, s.arc(0.2)), cfg.trend_p1);
    let mut last = cfg.trend_p0;
    for k in 1..20 {
        let d = s.arc(0.005 + 0.095 * k as f64 / 20.0);
        let t = cfg.trend(&s, d);
        assert!(t >= last && t <= cfg.trend_p1);
        last = t;
    }
}

#[test]
fn approaching_needs_closure_or_proximity() {
    let cfg = DetectCfg::default();
    let s = Sphere::default();
    assert!(cfg.is_approaching(&s, s.arc(0.3), s.arc(0.02)));
    assert!(!cfg.is_approaching(&s, s.arc(0.3), s.arc(0.2)));
    assert!(cfg.is_approaching(&s, s.arc(0.3), s.arc(0.05)));
    // Moving away is never approaching.
    assert!(!cfg.is_approaching(&s, s.arc(0.1), s.arc(0.2)));
    // Scales with the radius.
    let big = Sphere::new(6.371e6);
    assert!(cfg.is_approaching(&big, big.arc(0.3), big.arc(0.05)));
}

#[test]
fn notch_tip_pairs_with_bottom_edge() {
    let mut mesh = notch(-4.9);
    let mut ctx = ctx();
    detect_all(&mut mesh, &mut ctx).unwrap();
    let tip = VertexId(3);
    let bottom = mesh[VertexId(0)].edges[0];
    assert_eq!(mesh[bottom].ends, [VertexId(0), VertexId(1)]);
    assert_eq!(mesh.pairing(tip), Some(bottom));
    assert_eq!(mesh[tip].agent.side, Side::Left);
    assert_eq!(mesh[bottom].agent.vertices, vec![tip]);
    let d = mesh[tip].agent.distance;
    assert!(d > 0.1f64.to_radians() && d < 0.13f64.to_radians());
    assert!(ctx.approaching().is_empty());
    for v in [0, 1, 2, 4] {
        assert_eq!(mesh.pairing(VertexId(v)), None);
    }
}

#[test]
fn detection_is_idempotent() {
    let mut mesh = notch(-4.9);
    let mut ctx = ctx();
    detect_all(&mut mesh, &mut ctx).unwrap();
    let before: Vec<_> = mesh.vertex_ids().iter().map(|&v| mesh[v].agent.clone()).collect();
    detect_all(&mut mesh, &mut ctx).unwrap();
    detect_all(&mut mesh, &mut ctx).unwrap();
    let after: Vec<_> = mesh.vertex_ids().iter().map(|&v| mesh[v].agent.clone()).collect();
    assert_eq!(before, after);
    let bottom = mesh[VertexId(0)].edges[0];
    assert_eq!(mesh[bottom].agent.vertices.len(), 1);
}

#[test]
fn closing_in_within_small_distance_queues_the_vertex() {
    let mut mesh = notch(-4.9);
    let mut ctx = ctx();
    detect_all(&mut mesh, &mut ctx).unwrap();
    move_vertex(&mut mesh, VertexId(3), 0.0, -5.01);
    detect_all(&mut mesh, &mut ctx).unwrap();
    assert_eq!(ctx.approaching().front(), Some(VertexId(3)));
    assert_eq!(ctx.approaching().len(), 1);
    assert!(mesh[VertexId(3)].agent.approaching);
    ctx.reset(&mut mesh);
    assert!(!mesh[VertexId(3)].agent.approaching);
    // The pairing survives the reset.
    assert!(mesh.pairing(VertexId(3)).is_some());
}

#[test]
fn fresh_pairing_within_small_distance_keeps_the_old_projection() {
    // Never detected at -4.9; first seen already 0.01° from the edge.
    let mut mesh = notch(-4.9);
    let mut ctx = ctx();
    move_vertex(&mut mesh, VertexId(3), 0.0, -5.01);
    detect_all(&mut mesh, &mut ctx).unwrap();
    assert_eq!(ctx.approaching().front(), Some(VertexId(3)));
    let agent = &mesh[VertexId(3)].agent;
    assert!(agent.distance > 0.1f64.to_radians() && agent.distance < 0.13f64.to_radians());
    let (lon, _) = crate::sphere::to_lon_lat(&agent.foot);
    assert!(lon.min(2.0 * std::f64::consts::PI - lon) < 1e-9);
}

#[test]
fn crossing_the_paired_edge_is_fatal() {
    let mut mesh = notch(-4.9);
    let mut ctx = ctx();
    detect_all(&mut mesh, &mut ctx).unwrap();
    move_vertex(&mut mesh, VertexId(3), 0.0, -5.05);
    let err = detect_all(&mut mesh, &mut ctx).unwrap_err();
    assert!(matches!(
        err,
        TtsError::EdgeCrossing {
            vertex: VertexId(3),
            stage: "detect",
            ..
        }
    ));
}

#[test]
fn closer_edge_steals_the_pairing() {
    let mut mesh = notch(-4.9);
    let mut ctx = ctx();
    detect_all(&mut mesh, &mut ctx).unwrap();
    let bottom = mesh[VertexId(0)].edges[0];
    // Pull the right side in until it is nearer to the tip than the bottom edge.
    move_vertex(&mut mesh, VertexId(1), 0.05, -5.0);
    move_vertex(&mut mesh, VertexId(2), 0.05, 5.0);
    detect_all(&mut mesh, &mut ctx).unwrap();
    let paired = mesh.pairing(VertexId(3));
    assert!(paired.is_some());
    assert_ne!(paired, Some(bottom));
    assert!(mesh[bottom].agent.vertices.is_empty());
}

#[test]
fn unpair_and_clean_edge_clear_both_sides() {
    let mut mesh = notch(-4.9);
    let mut ctx = ctx();
    detect_all(&mut mesh, &mut ctx).unwrap();
    let tip = VertexId(3);
    let bottom = mesh[VertexId(0)].edges[0];
    unpair(&mut mesh, &mut ctx.approaching, tip).unwrap();
    assert_eq!(mesh.pairing(tip), None);
    assert!(mesh[bottom].agent.vertices.is_empty());
    // Second unpair is a no-op.
    unpair(&mut mesh, &mut ctx.approaching, tip).unwrap();

    detect_all(&mut mesh, &mut ctx).unwrap();
    clean_edge(&mut mesh, &mut ctx.approaching, bottom).unwrap();
    assert_eq!(mesh.pairing(tip), None);
}

#[test]
fn worklist_order_and_flags() {
    let mut mesh = cube(Sphere::default()).unwrap();
    let mut list = ApproachingVertices::default();
    let [a, b, c, d] = [VertexId(0), VertexId(1), VertexId(2), VertexId(3)];
    list.record(&mut mesh, a);
    list.record(&mut mesh, b);
    list.record(&mut mesh, c);
    list.record(&mut mesh, b);
    assert_eq!(list.len(), 3);
    list.jump(c).unwrap();
    list.record_before(&mut mesh, d, b).unwrap();
    assert_eq!(list.iter().collect::<Vec<_>>(), vec![c, a, d, b]);
    list.remove(&mut mesh, a).unwrap();
    assert!(!mesh[a].agent.approaching);
    assert!(mesh[d].agent.approaching);
    assert!(matches!(list.remove(&mut mesh, a), Err(TtsError::Missing { .. })));
    assert!(list.record_before(&mut mesh, a, VertexId(7)).is_err());
    list.clear(&mut mesh);
    assert!(list.is_empty());
    assert!(mesh.vertex_ids().iter().all(|&v| !mesh[v].agent.approaching));
}

#[test]
fn angle_jump_is_reported() {
    let mut mesh = cube(Sphere::default()).unwrap();
    let cfg = DetectCfg::default();
    check_angles(&mesh, &cfg).unwrap();
    let h = mesh.half_edge_ids()[5];
    mesh[h].angle.old = 0.1;
    mesh[h].angle.new = 3.6;
    assert!(matches!(
        check_angles(&mesh, &cfg),
        Err(TtsError::EdgeCrossing { stage: "angle", .. })
    ));
}

#[test]
fn coarse_box_wraps_in_longitude() {
    let at = |i: usize, j: usize| Location {
        coarse: (i, j),
        coarse_lon_count: 90,
        ..Location::default()
    };
    let b = CoarseBox::around(&at(0, 10), &at(89, 11));
    assert!(b.contains(&at(0, 10)));
    assert!(b.contains(&at(1, 12)));
    assert!(b.contains(&at(88, 9)));
    assert!(!b.contains(&at(45, 10)));
    assert!(!b.contains(&at(0, 13)));
    let polar = Location {
        on_pole: true,
        ..at(3, 44)
    };
    assert!(CoarseBox::around(&polar, &at(4, 44)).contains(&at(60, 0)));
}

#[test]
fn stale_point_location_does_not_hide_pairs() {
    // Unlocated points carry no buckets; the filter must let everything through.
    let mut mesh = notch(-4.9);
    let mut ctx = ctx();
    for v in mesh.vertex_ids() {
        mesh[v].point = Point::at(mesh.coord(v, Level::New));
    }
    detect_all(&mut mesh, &mut ctx).unwrap();
    assert!(mesh.pairing(VertexId(3)).is_some());
}
