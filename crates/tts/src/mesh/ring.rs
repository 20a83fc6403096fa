//! Doubly linked polygon rings.
//!
//! All insertions take a detached half-edge (its `polygon` field decides the ring for
//! `push_back`; the anchor's ring wins for `insert_after`/`insert_before`).

use super::{HalfEdgeId, Mesh, PolygonId};

impl Mesh {
    /// Append `h` at the tail of `p`'s ring (just before the head).
    pub fn ring_push_back(&mut self, p: PolygonId, h: HalfEdgeId) {
        self.half_edges[h.0].polygon = p;
        match self.polygons[p.0].head {
            None => {
                let he = &mut self.half_edges[h.0];
                he.next = h;
                he.prev = h;
                self.polygons[p.0].head = Some(h);
                self.polygons[p.0].len = 1;
            }
            Some(head) => self.ring_insert_before(head, h),
        }
    }

    /// Insert `h` right after `anchor` in the anchor's ring.
    pub fn ring_insert_after(&mut self, anchor: HalfEdgeId, h: HalfEdgeId) {
        let p = self.half_edges[anchor.0].polygon;
        let next = self.half_edges[anchor.0].next;
        {
            let he = &mut self.half_edges[h.0];
            he.polygon = p;
            he.prev = anchor;
            he.next = next;
        }
        self.half_edges[anchor.0].next = h;
        self.half_edges[next.0].prev = h;
        self.polygons[p.0].len += 1;
    }

    /// Insert `h` right before `anchor` in the anchor's ring.
    pub fn ring_insert_before(&mut self, anchor: HalfEdgeId, h: HalfEdgeId) {
        let prev = self.half_edges[anchor.0].prev;
        self.ring_insert_after(prev, h);
    }

    /// Take `h` out of its ring, leaving it detached (self-linked).
    pub fn ring_unlink(&mut self, h: HalfEdgeId) {
        let (p, prev, next) = {
            let he = &self.half_edges[h.0];
            (he.polygon, he.prev, he.next)
        };
        let poly = &mut self.polygons[p.0];
        poly.len = poly.len.saturating_sub(1);
        if poly.len == 0 {
            poly.head = None;
        } else {
            if poly.head == Some(h) {
                poly.head = Some(next);
            }
            self.half_edges[prev.0].next = next;
            self.half_edges[next.0].prev = prev;
        }
        let he = &mut self.half_edges[h.0];
        he.next = h;
        he.prev = h;
    }

    /// Move `h` from its ring to the tail of `p`'s ring.
    pub fn ring_move(&mut self, h: HalfEdgeId, p: PolygonId) {
        self.ring_unlink(h);
        self.ring_push_back(p, h);
    }
}
