//! Unrecoverable conditions raised by the mesh maintenance pipeline.
//!
//! There is no retry path: every variant means the mesh is (or would become) topologically
//! invalid, so `advect` stops and hands the error to the host. Stale pairings and
//! geometrically irrelevant approaches are handled inline and never surface here.

use thiserror::Error;

use crate::mesh::{EdgeId, PolygonId, VertexId};

/// Fatal error returned up through `advect`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TtsError {
    /// A vertex changed sides relative to an edge it is not an endpoint of.
    #[error("edge crossing has occurred: {vertex} vs {edge} ({stage})")]
    EdgeCrossing {
        /// Vertex that crossed.
        vertex: VertexId,
        /// Edge that was crossed.
        edge: EdgeId,
        /// Pipeline stage that noticed it.
        stage: &'static str,
    },

    /// The approaching vertex touches the polygon but no boundary half-edge ends at it.
    #[error("{vertex} touches {polygon} but is not on its boundary ring")]
    VertexOffPolygon {
        /// Approaching vertex.
        vertex: VertexId,
        /// Polygon being split.
        polygon: PolygonId,
    },

    /// Orientation came out `On` where a definite side was required.
    #[error("{vertex} lies on {edge} without being one of its endpoints")]
    OnEdge {
        /// Offending vertex.
        vertex: VertexId,
        /// Edge it sits on.
        edge: EdgeId,
    },

    /// An element expected in a list was not found there.
    #[error("{what} {id} not found")]
    Missing {
        /// Which list was searched.
        what: &'static str,
        /// Raw id that was looked up.
        id: usize,
    },

    /// Input rejected by a mesh builder.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
}

/// Result alias for the crate.
pub type Result<T> = std::result::Result<T, TtsError>;
