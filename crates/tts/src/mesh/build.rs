//! Mesh construction from vertex/face lists, plus two standard tilings.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, TtsError};
use crate::sphere::{from_lon_lat, to_lon_lat, Coord, Sphere};

use super::{Level, Mesh, Point, Side, VertexId};

/// Build a closed mesh from unit-vector points and counter-clockwise faces.
///
/// Every undirected edge must be used exactly once in each direction.
pub fn from_polygons(sphere: Sphere, points: &[Coord], faces: &[Vec<usize>]) -> Result<Mesh> {
    let mut mesh = Mesh::new(sphere);
    let ids: Vec<VertexId> = points
        .iter()
        .map(|x| mesh.add_vertex(Point::at(x.normalize())))
        .collect();
    let mut directed = HashSet::new();
    let mut undirected = HashMap::new();
    for (f, face) in faces.iter().enumerate() {
        if face.len() < 3 {
            return Err(TtsError::InvalidMesh(format!("face {f} has {} vertices", face.len())));
        }
        let p = mesh.add_polygon();
        for k in 0..face.len() {
            let (a, b) = (face[k], face[(k + 1) % face.len()]);
            if a >= points.len() || b >= points.len() || a == b {
                return Err(TtsError::InvalidMesh(format!("face {f} has a bad edge {a}-{b}")));
            }
            if !directed.insert((a, b)) {
                return Err(TtsError::InvalidMesh(format!("directed edge {a}->{b} used twice")));
            }
            let (e, side) = match undirected.get(&(b, a)) {
                Some(&e) => (e, Side::Right),
                None => {
                    let e = mesh.add_edge(ids[a], ids[b]);
                    undirected.insert((a, b), e);
                    (e, Side::Left)
                }
            };
            let h = mesh.add_half_edge(e, side, p);
            mesh.ring_push_back(p, h);
        }
    }
    if let Some((a, b)) = undirected
        .iter()
        .find_map(|(&k, &e)| mesh[e].half_edges[Side::Right.index()].is_none().then_some(k))
    {
        return Err(TtsError::InvalidMesh(format!("edge {a}-{b} has only one side")));
    }
    mesh.refresh_geometry();
    Ok(mesh)
}

/// Six quadrilaterals of the inscribed cube.
pub fn cube(sphere: Sphere) -> Result<Mesh> {
    let s = 1.0 / 3f64.sqrt();
    let points: Vec<Coord> = [
        [-s, -s, -s],
        [s, -s, -s],
        [s, s, -s],
        [-s, s, -s],
        [-s, -s, s],
        [s, -s, s],
        [s, s, s],
        [-s, s, s],
    ]
    .iter()
    .map(|p| Coord::new(p[0], p[1], p[2]))
    .collect();
    let faces = vec![
        vec![0, 3, 2, 1],
        vec![4, 5, 6, 7],
        vec![0, 1, 5, 4],
        vec![1, 2, 6, 5],
        vec![2, 3, 7, 6],
        vec![3, 0, 4, 7],
    ];
    from_polygons(sphere, &points, &faces)
}

/// Latitude–longitude tiling: `nlon` columns, `nlat` bands, the two polar bands as caps.
pub fn lon_lat(sphere: Sphere, nlon: usize, nlat: usize) -> Result<Mesh> {
    if nlon < 3 || nlat < 3 {
        return Err(TtsError::InvalidMesh(format!("lon_lat({nlon}, {nlat}) too coarse")));
    }
    let dlon = 360.0 / nlon as f64;
    let dlat = 180.0 / nlat as f64;
    let rings = nlat - 1;
    let idx = |i: usize, j: usize| j * nlon + (i % nlon);
    let mut points = Vec::with_capacity(rings * nlon);
    for j in 0..rings {
        let lat = -90.0 + (j + 1) as f64 * dlat;
        for i in 0..nlon {
            points.push(from_lon_lat(
                (i as f64 * dlon).to_radians(),
                lat.to_radians(),
            ));
        }
    }
    let mut faces = Vec::with_capacity((rings - 1) * nlon + 2);
    faces.push((0..nlon).rev().map(|i| idx(i, 0)).collect());
    for j in 0..rings - 1 {
        for i in 0..nlon {
            faces.push(vec![idx(i, j), idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }
    faces.push((0..nlon).map(|i| idx(i, rings - 1)).collect());
    from_polygons(sphere, &points, &faces)
}

impl Mesh {
    /// Recompute normals, lengths, angles and areas from vertex coordinates.
    pub fn refresh_geometry(&mut self) {
        for e in self.edge_ids() {
            self.refresh_edge(e);
        }
        for h in self.half_edge_ids() {
            self.refresh_angle(h);
        }
        for p in self.polygon_ids() {
            self.calc_area(p);
        }
    }

    /// Perturb every vertex by up to `amplitude_deg` in longitude and latitude.
    ///
    /// Seeded, so runs are reproducible. Test points are re-centred on their edges.
    pub fn jitter(&mut self, seed: u64, amplitude_deg: f64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = amplitude_deg.to_radians();
        for v in self.vertex_ids() {
            let (lon, lat) = to_lon_lat(&self.coord(v, Level::New));
            let lon = lon + rng.gen_range(-a..=a);
            let lat = (lat + rng.gen_range(-a..=a)).clamp(
                -std::f64::consts::FRAC_PI_2,
                std::f64::consts::FRAC_PI_2,
            );
            self[v].point = Point::at(from_lon_lat(lon, lat));
        }
        for e in self.edge_ids() {
            self.reset_test_point(e);
        }
        self.refresh_geometry();
    }
}
