//! Topology maintenance for Lagrangian polygon meshes on the sphere.
//!
//! The crate keeps a mesh of advected parcels valid over time: vertices are tracked
//! through a host-supplied wind, edges that bend are refined, short ones coarsened, and
//! polygons whose boundaries are about to touch themselves are split before they cross.
//! Tracer masses ride on the polygons and are conserved through every surgery.
//!
//! Layout
//! - `sphere`: great-circle kernel (distances, projection, orientation, areas).
//! - `mesh`: half-edge arena mesh and its builders.
//! - `track`: RK4 tracker and the host interface traits.
//! - `flows`: analytic test flows and a lon/lat locator.
//! - `detector`: vertex/edge approach detection and the worklist.
//! - `guard`: per-step maintenance pipeline and polygon-splitting surgery.
//! - `advect`: the per-step entry point.
//!
//! API Policy
//! - `api` is the curated surface for hosts; module paths may move between versions.

pub mod advect;
pub mod api;
mod cfg;
pub mod context;
pub mod detector;
pub mod error;
pub mod flows;
pub mod guard;
pub mod mesh;
pub mod sphere;
pub mod track;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Result, TtsError};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::advect::{advect, reseed, StepReport};
    pub use crate::context::{Context, TtsCfg};
    pub use crate::error::{Result, TtsError};
    pub use crate::flows::{CosineBells, Deformation, DeformationCase, LonLatGrid, Sampled, SolidRotation};
    pub use crate::mesh::{cube, from_polygons, lon_lat, Level, Mesh, PolygonId, VertexId};
    pub use crate::sphere::{from_lon_lat, to_lon_lat, Coord, Sphere};
    pub use crate::track::{Locator, Tracker, VelocityField};
}
