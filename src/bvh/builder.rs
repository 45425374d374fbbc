//! Iterative BVH construction.
//!
//! The build is driven by an explicit work stack of pending nodes instead of
//! recursion, so pathological inputs with thousands of forced descents
//! cannot overflow the call stack. All primitive bookkeeping lives in one
//! contiguous buffer of [`PrimitiveAabb`]s; every pending node owns a
//! `(start, len)` span of it and splits rearrange the buffer in place,
//! growing it only when a spatial split clips a primitive into two pieces.

use crate::aabb::{Aabb, Bounded};
use crate::bvh::node::{BvhLeaf, BvhNode, PrimitiveAabb, Span, LEAF_SENTINEL};
use crate::bvh::split::{
    clip_primitive, compare_primitives, find_object_split, find_spatial_split, ObjectSplit,
    SpatialSplit, Split,
};
use crate::triangle::Triangle;
use crate::{Point3, Real, Vector3};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Tuning knobs of one build.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildConfig {
    /// Cost of one ray/triangle intersection test in the SAH model.
    pub ray_triangle_cost: Real,

    /// Cost of one ray/box intersection test in the SAH model.
    pub ray_aabb_cost: Real,

    /// Number of bins per axis for the spatial split finder.
    pub bin_count: usize,

    /// Spatial splitting is only attempted for nodes whose best object
    /// split leaves the children overlapping by more than `spatial_alpha`
    /// times the root surface area.
    pub spatial_alpha: Real,

    /// Allow construction to stop early and bundle several primitives into
    /// one leaf when splitting further is not cost-beneficial.
    pub join_leaves: bool,

    /// With `join_leaves`, only spans smaller than this may become a
    /// multi-primitive leaf.
    pub max_leaf_triangles: usize,

    /// With `join_leaves`, only nodes deeper than this may become a
    /// multi-primitive leaf.
    pub min_join_depth: usize,

    /// A primitive whose box area falls below this fraction of the root
    /// area is clipped with the exact polygon clipper. Tuning, not
    /// correctness.
    pub exact_clip_area_ratio: Real,

    /// A primitive whose box has an extent below this is clipped with the
    /// exact polygon clipper. Tuning, not correctness.
    pub exact_clip_min_extent: Real,
}

impl Default for BuildConfig {
    fn default() -> BuildConfig {
        BuildConfig {
            ray_triangle_cost: 2.0,
            ray_aabb_cost: 3.0,
            bin_count: 8,
            spatial_alpha: 1e-5,
            join_leaves: false,
            max_leaf_triangles: 8,
            min_join_depth: 16,
            exact_clip_area_ratio: 1e-3,
            exact_clip_min_extent: 0.01,
        }
    }
}

/// Statistics accumulated over one build, reported to telemetry/UI callers.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildStats {
    /// Number of input triangles.
    pub triangle_count: usize,

    /// Number of interior nodes in the finished tree.
    pub inner_node_count: usize,

    /// Number of leaves in the finished tree.
    pub leaf_count: usize,

    /// Total triangle references across all leaves. Exceeds
    /// `triangle_count` when spatial splits duplicated primitives.
    pub leaf_triangle_count: usize,

    /// Mean depth of the leaves, root at depth 0.
    pub average_leaf_depth: Real,

    /// Mean number of triangle references per leaf.
    pub average_triangles_per_leaf: Real,

    /// Depth of the deepest node.
    pub max_depth: usize,

    /// Sum of the SAH costs of every split taken.
    pub total_sah_cost: Real,

    /// Number of primitives clipped into both children by spatial splits.
    pub duplicated_primitives: usize,

    /// Wall-clock construction time.
    pub build_time: Duration,
}

/// One `(position, extent, depth)` record per node, emitted in
/// breadth-first order with the root at depth 0. Consumed by external
/// debug rendering of the tree's boxes.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisualizationRecord {
    /// Center of the node's bounding box.
    pub position: Point3,

    /// Full size of the node's bounding box.
    pub extent: Vector3,

    /// Depth of the node, root at 0.
    pub depth: usize,
}

/// A bounding volume hierarchy over a caller-owned triangle slice.
///
/// The tree stores only indices into that slice, never triangle geometry,
/// so the slice must outlive the [`Bvh`] and be passed back unchanged to
/// every query.
#[derive(Debug, Clone)]
pub struct Bvh {
    /// Flat node array, root at index 0.
    pub nodes: Vec<BvhNode>,

    /// Leaf records, referenced by leaf nodes via [`BvhNode::leaf_index`].
    pub leaves: Vec<BvhLeaf>,

    /// Statistics of the build that produced this tree.
    pub stats: BuildStats,
}

impl Bvh {
    /// Builds a BVH over `triangles`.
    ///
    /// Building twice from the same input and config produces an identical
    /// tree; all sorting and tie-breaking during construction is
    /// deterministic.
    ///
    /// # Panics
    /// Panics when `triangles` is empty, and when the scene's bounding box
    /// has zero surface area while a split is still required. A scene with
    /// no usable geometry is a contract violation, not a recoverable state.
    pub fn build(triangles: &[Triangle], config: &BuildConfig) -> Bvh {
        assert!(
            !triangles.is_empty(),
            "cannot build a BVH over an empty triangle list"
        );
        let start_time = Instant::now();

        let primitives = triangles
            .iter()
            .enumerate()
            .map(|(index, triangle)| PrimitiveAabb {
                aabb: triangle.aabb(),
                triangle: index,
            })
            .collect::<Vec<_>>();

        let mut root_aabb = Aabb::empty();
        for primitive in &primitives {
            root_aabb.join_mut(&primitive.aabb);
        }

        let span = Span {
            start: 0,
            len: primitives.len(),
        };
        let mut builder = Builder {
            triangles,
            config,
            scene_root_area: root_aabb.surface_area(),
            primitives,
            nodes: vec![BvhNode::new(root_aabb)],
            leaves: Vec::new(),
            stack: vec![Pending {
                node: 0,
                span,
                depth: 0,
            }],
            total_sah_cost: 0.0,
            max_depth: 0,
            leaf_depth_sum: 0,
            duplicated_primitives: 0,
        };
        builder.run();

        let leaf_count = builder.leaves.len();
        let leaf_triangle_count = builder
            .leaves
            .iter()
            .map(|leaf| leaf.triangles.len())
            .sum::<usize>();
        let stats = BuildStats {
            triangle_count: triangles.len(),
            inner_node_count: builder.nodes.len() - leaf_count,
            leaf_count,
            leaf_triangle_count,
            average_leaf_depth: builder.leaf_depth_sum as Real / leaf_count as Real,
            average_triangles_per_leaf: leaf_triangle_count as Real / leaf_count as Real,
            max_depth: builder.max_depth,
            total_sah_cost: builder.total_sah_cost,
            duplicated_primitives: builder.duplicated_primitives,
            build_time: start_time.elapsed(),
        };
        Bvh {
            nodes: builder.nodes,
            leaves: builder.leaves,
            stats,
        }
    }

    /// Emits one record per node in breadth-first order, root first at
    /// depth 0, for external rendering of the tree's boxes.
    pub fn visualization_data(&self) -> Vec<VisualizationRecord> {
        let mut records = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::new();
        queue.push_back((0usize, 0usize));
        while let Some((index, depth)) = queue.pop_front() {
            let node = &self.nodes[index];
            records.push(VisualizationRecord {
                position: node.bounding_box.center(),
                extent: node.bounding_box.size(),
                depth,
            });
            if node.is_interior() {
                queue.push_back((node.left(), depth + 1));
                queue.push_back((node.right(), depth + 1));
            }
        }
        records
    }

    /// Prints a topology of the BVH where the level of indentation of a
    /// node corresponds to its depth.
    pub fn pretty_print(&self) {
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            let node = &self.nodes[index];
            let padding = "\t".repeat(depth);
            if node.is_leaf() {
                let leaf = &self.leaves[node.leaf_index()];
                println!("{}leaf[{}] {:?}", padding, node.leaf_index(), leaf.triangles);
            } else {
                println!("{}node[{} -> {}, {}]", padding, index, node.left(), node.right());
                stack.push((node.right(), depth + 1));
                stack.push((node.left(), depth + 1));
            }
        }
    }
}

/// One queued `(node, span, depth)` construction step.
struct Pending {
    node: usize,
    span: Span,
    depth: usize,
}

/// How one plane-straddling primitive is treated during a spatial split.
#[derive(PartialEq, Eq, Clone, Copy)]
enum Treatment {
    /// Clip into both children.
    Split,
    /// Send the whole primitive to the left child.
    UnsplitLeft,
    /// Send the whole primitive to the right child.
    UnsplitRight,
}

/// All mutable state of one build.
struct Builder<'a> {
    triangles: &'a [Triangle],
    config: &'a BuildConfig,
    primitives: Vec<PrimitiveAabb>,
    nodes: Vec<BvhNode>,
    leaves: Vec<BvhLeaf>,
    stack: Vec<Pending>,
    scene_root_area: Real,
    total_sah_cost: Real,
    max_depth: usize,
    leaf_depth_sum: usize,
    duplicated_primitives: usize,
}

impl<'a> Builder<'a> {
    fn run(&mut self) {
        while let Some(pending) = self.stack.pop() {
            self.process(pending);
        }
    }

    fn process(&mut self, pending: Pending) {
        let Pending { node, span, depth } = pending;
        self.max_depth = self.max_depth.max(depth);

        let span = self.discard_degenerate_fragments(span);
        if span.len <= 1 {
            self.create_leaf(node, span, depth);
            return;
        }

        let node_aabb = self.nodes[node].bounding_box;
        let join_leaves_allowed = self.config.join_leaves
            && span.len < self.config.max_leaf_triangles
            && depth > self.config.min_join_depth;

        let object_split = find_object_split(
            &mut self.primitives[span.start..span.end()],
            &node_aabb,
            join_leaves_allowed,
            self.config,
        );
        let Some(object_split) = object_split else {
            // Joining the span into one leaf is cheaper than any split.
            self.create_leaf(node, span, depth);
            return;
        };

        let mut split = Split::Object(object_split);
        let overlap = object_split
            .left_aabb
            .intersection(&object_split.right_aabb);
        if overlap.surface_area() > self.config.spatial_alpha * self.scene_root_area {
            if let Some(spatial_split) = find_spatial_split(
                &self.primitives[span.start..span.end()],
                self.triangles,
                &node_aabb,
                self.scene_root_area,
                self.config,
            ) {
                if spatial_split.cost < object_split.cost {
                    split = Split::Spatial(spatial_split);
                }
            }
        }

        // The two children are created up front so a degenerate spatial
        // split can retract them before anything observes their indices.
        let left_node = self.nodes.len();
        let right_node = left_node + 1;
        self.nodes.push(BvhNode::new(Aabb::empty()));
        self.nodes.push(BvhNode::new(Aabb::empty()));

        let (outcome, split_cost) = match split {
            Split::Object(object_split) => {
                (self.execute_object_split(span, &object_split), object_split.cost)
            }
            Split::Spatial(spatial_split) => {
                match self.execute_spatial_split(span, &spatial_split, &node_aabb) {
                    Some(outcome) => (outcome, spatial_split.cost),
                    None => {
                        // Every straddler resolved to one side. Retract the
                        // two children and split the untouched span by
                        // object median instead.
                        self.nodes.truncate(left_node);
                        let fallback = find_object_split(
                            &mut self.primitives[span.start..span.end()],
                            &node_aabb,
                            join_leaves_allowed,
                            self.config,
                        );
                        let Some(fallback) = fallback else {
                            self.create_leaf(node, span, depth);
                            return;
                        };
                        self.nodes.push(BvhNode::new(Aabb::empty()));
                        self.nodes.push(BvhNode::new(Aabb::empty()));
                        (self.execute_object_split(span, &fallback), fallback.cost)
                    }
                }
            }
        };
        let (left_span, right_span, left_aabb, right_aabb) = outcome;

        debug_assert_eq!(left_span.end(), right_span.start);
        debug_assert!(right_span.end() <= self.primitives.len());
        debug_assert!(left_span.len > 0 && right_span.len > 0);

        self.total_sah_cost += split_cost;
        self.nodes[left_node].bounding_box = left_aabb;
        self.nodes[right_node].bounding_box = right_aabb;
        self.nodes[node].left_index = left_node as i32;
        self.nodes[node].right_index = right_node as i32;

        self.stack.push(Pending {
            node: left_node,
            span: left_span,
            depth: depth + 1,
        });
        self.stack.push(Pending {
            node: right_node,
            span: right_span,
            depth: depth + 1,
        });
    }

    /// Swap-compacts primitives whose box degenerated under clipping out of
    /// the span; they are simply abandoned. Returns the shrunk span.
    fn discard_degenerate_fragments(&mut self, mut span: Span) -> Span {
        let mut i = span.start;
        while i < span.end() {
            if self.primitives[i].aabb.is_valid() {
                i += 1;
            } else {
                span.len -= 1;
                self.primitives.swap(i, span.end());
            }
        }
        span
    }

    /// Turns a terminal span into a leaf. A triangle clipped into several
    /// fragments of the same span is referenced once.
    fn create_leaf(&mut self, node: usize, span: Span, depth: usize) {
        let mut triangles = self.primitives[span.start..span.end()]
            .iter()
            .map(|primitive| primitive.triangle)
            .collect::<Vec<_>>();
        triangles.sort_unstable();
        triangles.dedup();

        self.nodes[node].left_index = LEAF_SENTINEL;
        self.nodes[node].right_index = self.leaves.len() as i32;
        self.leaves.push(BvhLeaf { triangles });
        self.leaf_depth_sum += depth;
    }

    /// Re-sorts the span by the winning axis and cuts it at the event
    /// index. No primitives move between buffers and none are duplicated.
    fn execute_object_split(&mut self, span: Span, split: &ObjectSplit) -> (Span, Span, Aabb, Aabb) {
        self.primitives[span.start..span.end()]
            .sort_by(|a, b| compare_primitives(a, b, split.axis));
        let left_span = Span {
            start: span.start,
            len: split.event,
        };
        let right_span = Span {
            start: span.start + split.event,
            len: span.len - split.event,
        };
        (left_span, right_span, split.left_aabb, split.right_aabb)
    }

    /// Partitions the span against the splitting plane in place.
    ///
    /// Pass one is a two-cursor scan: primitives fully on one side of the
    /// plane are swapped toward that end of the span, leaving the
    /// straddlers in the middle. Pass two resolves each straddler to
    /// clip-into-both, whole-to-left, or whole-to-right by the cheapest
    /// incremental SAH contribution; right clip pieces are spliced in at
    /// the span's end so the two child spans stay contiguous, and every
    /// pending span behind the insertion point is shifted accordingly.
    ///
    /// Returns `None` when one side ends up with no primitives at all. In
    /// that case no clipping has occurred (a split treatment populates both
    /// sides), so the span's content is intact apart from its order and the
    /// caller can safely fall back to an object split.
    fn execute_spatial_split(
        &mut self,
        span: Span,
        split: &SpatialSplit,
        node_aabb: &Aabb,
    ) -> Option<(Span, Span, Aabb, Aabb)> {
        let axis = split.axis;
        let plane = split.plane;

        // Pass one: fully-left | straddling | fully-right.
        let mut left_end = span.start;
        let mut right_start = span.end();
        let mut i = span.start;
        while i < right_start {
            let aabb = self.primitives[i].aabb;
            if aabb.max[axis] <= plane {
                self.primitives.swap(i, left_end);
                left_end += 1;
                i += 1;
            } else if aabb.min[axis] >= plane {
                right_start -= 1;
                self.primitives.swap(i, right_start);
            } else {
                i += 1;
            }
        }

        let mut left_aabb = Aabb::empty();
        let mut left_count = left_end - span.start;
        for primitive in &self.primitives[span.start..left_end] {
            left_aabb.join_mut(&primitive.aabb);
        }
        let mut right_aabb = Aabb::empty();
        let mut right_count = span.end() - right_start;
        for primitive in &self.primitives[right_start..span.end()] {
            right_aabb.join_mut(&primitive.aabb);
        }

        // Pass two over the straddlers in [left_end, right_start).
        let mut cursor = left_end;
        let mut unresolved_end = right_start;
        let mut right_pieces: Vec<PrimitiveAabb> = Vec::new();
        while cursor < unresolved_end {
            let primitive = self.primitives[cursor];
            let triangle = &self.triangles[primitive.triangle];
            let left_clip = clip_primitive(
                &primitive,
                triangle,
                axis,
                Real::NEG_INFINITY,
                plane,
                node_aabb,
                self.scene_root_area,
                self.config,
            );
            let right_clip = clip_primitive(
                &primitive,
                triangle,
                axis,
                plane,
                Real::INFINITY,
                node_aabb,
                self.scene_root_area,
                self.config,
            );

            let split_cost = left_aabb.join(&left_clip).surface_area()
                * (left_count + 1) as Real
                + right_aabb.join(&right_clip).surface_area() * (right_count + 1) as Real;
            let unsplit_left_cost = left_aabb.join(&primitive.aabb).surface_area()
                * (left_count + 1) as Real
                + right_aabb.surface_area() * right_count as Real;
            let unsplit_right_cost = left_aabb.surface_area() * left_count as Real
                + right_aabb.join(&primitive.aabb).surface_area() * (right_count + 1) as Real;

            let mut treatment = if split_cost <= unsplit_left_cost
                && split_cost <= unsplit_right_cost
            {
                Treatment::Split
            } else if unsplit_left_cost <= unsplit_right_cost {
                Treatment::UnsplitLeft
            } else {
                Treatment::UnsplitRight
            };
            // A clip piece that degenerated to a sliver must not end up as
            // its own fragment; keep the whole primitive on the other side.
            if treatment == Treatment::Split {
                if !left_clip.is_valid() {
                    treatment = Treatment::UnsplitRight;
                } else if !right_clip.is_valid() {
                    treatment = Treatment::UnsplitLeft;
                }
            }

            match treatment {
                Treatment::UnsplitLeft => {
                    left_aabb.join_mut(&primitive.aabb);
                    left_count += 1;
                    cursor += 1;
                }
                Treatment::UnsplitRight => {
                    right_aabb.join_mut(&primitive.aabb);
                    right_count += 1;
                    unresolved_end -= 1;
                    self.primitives.swap(cursor, unresolved_end);
                }
                Treatment::Split => {
                    self.primitives[cursor] = PrimitiveAabb {
                        aabb: left_clip,
                        triangle: primitive.triangle,
                    };
                    right_pieces.push(PrimitiveAabb {
                        aabb: right_clip,
                        triangle: primitive.triangle,
                    });
                    left_aabb.join_mut(&left_clip);
                    right_aabb.join_mut(&right_clip);
                    left_count += 1;
                    right_count += 1;
                    cursor += 1;
                }
            }
        }

        let left_len = cursor - span.start;
        let right_len = span.end() - cursor + right_pieces.len();
        if left_len == 0 || right_len == 0 {
            debug_assert!(right_pieces.is_empty());
            return None;
        }

        // Splice the right clip pieces in at the span's end. Everything
        // behind the insertion point moves over, so pending spans there are
        // shifted to keep pointing at their primitives.
        let inserted = right_pieces.len();
        if inserted > 0 {
            let insert_at = span.end();
            self.primitives.splice(insert_at..insert_at, right_pieces);
            for pending in self.stack.iter_mut() {
                if pending.span.start >= insert_at {
                    pending.span.start += inserted;
                }
            }
            self.duplicated_primitives += inserted;
        }

        let left_span = Span {
            start: span.start,
            len: left_len,
        };
        let right_span = Span {
            start: cursor,
            len: right_len,
        };
        Some((left_span, right_span, left_aabb, right_aabb))
    }
}
