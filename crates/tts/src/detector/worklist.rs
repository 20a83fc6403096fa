use std::collections::VecDeque;

use crate::error::{Result, TtsError};
use crate::mesh::{Mesh, VertexId};

/// Ordered queue of vertices flagged as approaching; surgery consumes it from the front.
///
/// The `approaching` flag on each vertex's agent mirrors membership.
#[derive(Clone, Debug, Default)]
pub struct ApproachingVertices {
    queue: VecDeque<VertexId>,
}

impl ApproachingVertices {
    /// Append `v` (no-op when already queued).
    pub fn record(&mut self, mesh: &mut Mesh, v: VertexId) {
        if mesh[v].agent.approaching {
            return;
        }
        mesh[v].agent.approaching = true;
        self.queue.push_back(v);
    }

    /// Queue `v` immediately before `anchor`.
    pub fn record_before(&mut self, mesh: &mut Mesh, v: VertexId, anchor: VertexId) -> Result<()> {
        if mesh[v].agent.approaching {
            self.take(v)?;
        }
        let at = self.position(anchor)?;
        self.queue.insert(at, v);
        mesh[v].agent.approaching = true;
        Ok(())
    }

    pub fn remove(&mut self, mesh: &mut Mesh, v: VertexId) -> Result<()> {
        self.take(v)?;
        mesh[v].agent.approaching = false;
        Ok(())
    }

    /// Move `v` to the front.
    pub fn jump(&mut self, v: VertexId) -> Result<()> {
        self.take(v)?;
        self.queue.push_front(v);
        Ok(())
    }

    pub fn front(&self) -> Option<VertexId> {
        self.queue.front().copied()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.queue.iter().copied()
    }

    /// Empty the queue and drop the flags of the vertices that are still alive.
    pub fn clear(&mut self, mesh: &mut Mesh) {
        for v in self.queue.drain(..) {
            if mesh.contains_vertex(v) {
                mesh[v].agent.approaching = false;
            }
        }
    }

    fn position(&self, v: VertexId) -> Result<usize> {
        self.queue
            .iter()
            .position(|&x| x == v)
            .ok_or(TtsError::Missing {
                what: "approaching vertex",
                id: v.0,
            })
    }

    fn take(&mut self, v: VertexId) -> Result<()> {
        let at = self.position(v)?;
        self.queue.remove(at);
        Ok(())
    }
}
