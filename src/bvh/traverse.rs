//! Best-first nearest-hit traversal.
//!
//! Queued nodes are ordered by the distance at which the ray enters their
//! bounding box, so the search always expands the most promising node and
//! can stop as soon as the nearest queued box lies beyond the best triangle
//! hit found so far.

use crate::bvh::builder::Bvh;
use crate::ray::{Hit, Ray};
use crate::triangle::Triangle;
use crate::Real;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A node queued for traversal, keyed by its signed box-entry distance.
///
/// The sign comes from the box test's backface factor: a box containing
/// the ray origin gets a negative key and is therefore expanded before any
/// box the ray has yet to reach. [`BinaryHeap`] is a max-heap, so the
/// ordering is reversed to pop the smallest key first.
struct QueuedNode {
    node: usize,
    distance: Real,
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &QueuedNode) -> bool {
        self.distance == other.distance
    }
}

impl Eq for QueuedNode {}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &QueuedNode) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &QueuedNode) -> Ordering {
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
    }
}

impl Bvh {
    /// Finds the nearest intersection of `ray` with the indexed triangles.
    ///
    /// `triangles` must be the same slice the tree was built over. Returns
    /// a miss (`hit == false`, infinite distance) when the ray strikes
    /// nothing.
    ///
    /// # Panics
    /// Panics when the root is not an interior node with two children; a
    /// tree degenerated to a single leaf indicates broken construction
    /// input, not a query-time condition.
    pub fn nearest_hit(&self, ray: &Ray, triangles: &[Triangle]) -> Hit {
        let root = &self.nodes[0];
        assert!(
            root.is_interior(),
            "traversal requires an interior root with two children"
        );

        let mut queue = BinaryHeap::new();
        self.enqueue(ray, root.left(), &mut queue);
        self.enqueue(ray, root.right(), &mut queue);

        let mut best = Hit::miss();
        while let Some(QueuedNode { node, distance }) = queue.pop() {
            // The queue is distance ordered, so nothing left in it can
            // improve on the best hit once this holds.
            if distance > best.distance {
                break;
            }
            let node = &self.nodes[node];
            if node.is_leaf() {
                for &triangle in &self.leaves[node.leaf_index()].triangles {
                    let hit = ray.intersect_triangle(&triangles[triangle]);
                    if hit.hit && hit.distance < best.distance {
                        best = hit;
                    }
                }
            } else {
                self.enqueue(ray, node.left(), &mut queue);
                self.enqueue(ray, node.right(), &mut queue);
            }
        }
        best
    }

    fn enqueue(&self, ray: &Ray, node: usize, queue: &mut BinaryHeap<QueuedNode>) {
        let hit = ray.intersect_aabb(&self.nodes[node].bounding_box);
        if hit.hit {
            queue.push(QueuedNode {
                node,
                distance: hit.distance * hit.backface_factor,
            });
        }
    }
}
