//! Curated API for hosts and tooling (UNSTABLE).
//!
//! Important
//! - Prefer these re-exports over deep module paths; internal layout may change.
//! - Mutating entry points are `advect` and `reseed`; everything else on `Mesh` that a
//!   host needs is read-only (counts, masses, areas, topology check).

// Stepping
pub use crate::advect::{advect, reseed, StepReport};
pub use crate::context::{Context, TtsCfg};
pub use crate::error::{Result, TtsError};
pub use crate::guard::{GuardCfg, GuardReport};
pub use crate::detector::{check_angles, detect_all, ApproachingVertices, DetectCfg};
// Mesh
pub use crate::mesh::{
    cube, from_polygons, lon_lat, EdgeId, HalfEdgeId, Level, Mesh, Point, PolygonId, Side,
    VertexId,
};
// Geometry
pub use crate::sphere::{angle, central_angle, from_lon_lat, orient, to_lon_lat, Coord, Orient, Sphere};
// Host interface and reference collaborators
pub use crate::flows::{
    CosineBells, Deformation, DeformationCase, LonLatFlow, LonLatGrid, Sampled, SolidRotation,
};
pub use crate::track::{Frame, Location, Locator, TimeLevel, Tracker, Velocity, VelocityField};
