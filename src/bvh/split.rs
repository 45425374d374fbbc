//! Split finders: given one node's primitive span, propose the best
//! splitting plane by the surface area heuristic.
//!
//! Two strategies compete. The *object* split sorts the span by centroid
//! along each axis and sweeps for the cheapest partition index. The
//! *spatial* split bins the primitive boxes along each axis, clipping
//! primitives that straddle bin boundaries, and sweeps the bin boundaries
//! for the cheapest splitting plane; primitives straddling the winning
//! plane are later clipped into both children.

use crate::aabb::Aabb;
use crate::axis::Axis;
use crate::bvh::builder::BuildConfig;
use crate::bvh::node::PrimitiveAabb;
use crate::sah::{surface_area_heuristic, SahInfo};
use crate::triangle::Triangle;
use crate::{Point3, Real};
use std::cmp::Ordering;

/// The winning object split of a node: partition the centroid-sorted span
/// at `event`.
#[derive(Debug, Clone, Copy)]
pub struct ObjectSplit {
    /// Sort axis.
    pub axis: Axis,

    /// Partition index relative to the span start: the left child receives
    /// primitives `[0, event)`, the right child `[event, len)`.
    pub event: usize,

    /// SAH cost of this split.
    pub cost: Real,

    /// Bounds of the left child, precomputed by the sweep.
    pub left_aabb: Aabb,

    /// Bounds of the right child, precomputed by the sweep.
    pub right_aabb: Aabb,
}

/// The winning spatial split of a node: a world-space splitting plane.
#[derive(Debug, Clone, Copy)]
pub struct SpatialSplit {
    /// Plane axis.
    pub axis: Axis,

    /// World-space plane coordinate along `axis`.
    pub plane: Real,

    /// SAH cost of this split.
    pub cost: Real,

    /// Bin-aggregated bounds of the left child.
    pub left_aabb: Aabb,

    /// Bin-aggregated bounds of the right child.
    pub right_aabb: Aabb,
}

/// The split chosen for a node. Consumed by an exhaustive match in the
/// splitter so a new strategy cannot be silently ignored anywhere.
#[derive(Debug, Clone, Copy)]
pub enum Split {
    /// Partition the sorted span in place, no duplication.
    Object(ObjectSplit),

    /// Partition space by a plane, clipping straddling primitives.
    Spatial(SpatialSplit),
}

impl Split {
    /// SAH cost of the chosen split.
    pub fn cost(&self) -> Real {
        match *self {
            Split::Object(ref split) => split.cost,
            Split::Spatial(ref split) => split.cost,
        }
    }
}

/// Deterministic centroid ordering along `axis`.
///
/// Centroid ties fall back to the smaller box area, then to the triangle
/// index, so equal keys only remain for identical fragments of one
/// triangle; combined with a stable sort this makes every build
/// reproducible bit for bit.
pub(crate) fn compare_primitives(a: &PrimitiveAabb, b: &PrimitiveAabb, axis: Axis) -> Ordering {
    a.aabb
        .centroid(axis)
        .partial_cmp(&b.aabb.centroid(axis))
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            a.aabb
                .surface_area()
                .partial_cmp(&b.aabb.surface_area())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.triangle.cmp(&b.triangle))
}

/// Finds the cheapest object split of `primitives` by sweeping all three
/// axes. Leaves the span sorted by the last axis swept; the splitter
/// re-sorts by the winning axis with the same comparator.
///
/// The baseline to beat is the cost of leaving the node as a leaf. Deeper
/// in the tree, where the leaf-join policy forbids early leaves, the
/// baseline is infinite and some split always wins. Returns `None` when no
/// candidate beats the baseline.
pub(crate) fn find_object_split(
    primitives: &mut [PrimitiveAabb],
    node_aabb: &Aabb,
    join_leaves_allowed: bool,
    config: &BuildConfig,
) -> Option<ObjectSplit> {
    let count = primitives.len();
    debug_assert!(count >= 2);
    let parent_area = node_aabb.surface_area();

    let mut best: Option<ObjectSplit> = None;
    let mut best_cost = if join_leaves_allowed {
        count as Real * config.ray_triangle_cost * parent_area
    } else {
        Real::INFINITY
    };

    let mut left_sweep_aabbs = vec![Aabb::empty(); count];
    for axis in Axis::ALL {
        primitives.sort_by(|a, b| compare_primitives(a, b, axis));

        // Left sweep: bounds of the prefix ending at each index.
        let mut left_sweep_aabb = Aabb::empty();
        for (i, primitive) in primitives.iter().enumerate() {
            left_sweep_aabb.join_mut(&primitive.aabb);
            left_sweep_aabbs[i] = left_sweep_aabb;
        }

        // Right sweep: grow the suffix box and score each candidate index.
        let mut right_sweep_aabb = Aabb::empty();
        for event in (1..count).rev() {
            right_sweep_aabb.join_mut(&primitives[event].aabb);
            let left_aabb = left_sweep_aabbs[event - 1];

            let cost = surface_area_heuristic(&SahInfo {
                left_primitive_count: event as Real,
                right_primitive_count: (count - event) as Real,
                left_aabb_area: left_aabb.surface_area(),
                right_aabb_area: right_sweep_aabb.surface_area(),
                parent_aabb_area: parent_area,
                ray_aabb_test_cost: config.ray_aabb_cost,
                ray_triangle_test_cost: config.ray_triangle_cost,
            });
            if cost < best_cost {
                best_cost = cost;
                best = Some(ObjectSplit {
                    axis,
                    event,
                    cost,
                    left_aabb,
                    right_aabb: right_sweep_aabb,
                });
            }
        }
    }
    best
}

/// One spatial bin: aggregated fragment bounds plus the number of
/// primitives whose bin range starts and ends here. The sweep later counts
/// a straddling primitive on both sides of a candidate plane, since it
/// would be clipped into both children.
#[derive(Debug, Clone, Copy)]
struct Bin {
    aabb: Aabb,
    entries: u32,
    exits: u32,
}

impl Bin {
    fn empty() -> Bin {
        Bin {
            aabb: Aabb::empty(),
            entries: 0,
            exits: 0,
        }
    }
}

/// Minimum usable bin width; planes packed tighter than this are noise.
const MIN_BIN_WIDTH: Real = 0.001;

/// Finds the cheapest spatial split of `primitives` by binning their boxes
/// along each axis and sweeping the bin boundaries.
///
/// Candidates that would leave either side with at most one primitive are
/// rejected, as is any axis whose bins would be numerically negligible.
/// Returns `None` when nothing usable remains.
pub(crate) fn find_spatial_split(
    primitives: &[PrimitiveAabb],
    triangles: &[Triangle],
    node_aabb: &Aabb,
    scene_root_area: Real,
    config: &BuildConfig,
) -> Option<SpatialSplit> {
    let count = primitives.len();
    debug_assert!(count >= 2);
    let bin_count = config.bin_count;
    let parent_area = node_aabb.surface_area();

    let mut best: Option<SpatialSplit> = None;
    let mut best_cost = Real::INFINITY;

    for axis in Axis::ALL {
        let bin_width = node_aabb.size()[axis as usize] / bin_count as Real;
        if bin_width < MIN_BIN_WIDTH {
            continue;
        }

        // Project every primitive box onto the bins of this axis.
        let mut bins = vec![Bin::empty(); bin_count];
        for primitive in primitives {
            let relative_min = (primitive.aabb.min[axis] - node_aabb.min[axis]) / bin_width;
            let relative_max = (primitive.aabb.max[axis] - node_aabb.min[axis]) / bin_width;
            let first_bin = (relative_min.floor() as i64).clamp(0, bin_count as i64 - 1) as usize;
            let last_bin = (relative_max.floor() as i64).clamp(0, bin_count as i64 - 1) as usize;

            if first_bin == last_bin {
                // Fully inside one bin, no clipping needed.
                bins[first_bin].aabb.join_mut(&primitive.aabb);
            } else {
                for bin_index in first_bin..=last_bin {
                    let low = node_aabb.min[axis] + bin_index as Real * bin_width;
                    let high = low + bin_width;
                    let clipped = clip_primitive(
                        primitive,
                        &triangles[primitive.triangle],
                        axis,
                        low,
                        high,
                        node_aabb,
                        scene_root_area,
                        config,
                    );
                    if !clipped.is_empty() {
                        bins[bin_index].aabb.join_mut(&clipped);
                    }
                }
            }
            bins[first_bin].entries += 1;
            bins[last_bin].exits += 1;
        }

        // Left-to-right prefix over bin boxes and entry counts.
        let mut left_sweep = vec![(Aabb::empty(), 0u32); bin_count];
        let mut left_aabb = Aabb::empty();
        let mut left_count = 0;
        for (i, bin) in bins.iter().enumerate() {
            left_aabb.join_mut(&bin.aabb);
            left_count += bin.entries;
            left_sweep[i] = (left_aabb, left_count);
        }

        // Right-to-left sweep over exits, scoring each bin boundary.
        let mut right_aabb = Aabb::empty();
        let mut right_count = 0;
        for boundary in (1..bin_count).rev() {
            right_aabb.join_mut(&bins[boundary].aabb);
            right_count += bins[boundary].exits;

            let (left_aabb, left_count) = left_sweep[boundary - 1];
            if left_count <= 1 || right_count <= 1 {
                continue;
            }

            let cost = surface_area_heuristic(&SahInfo {
                left_primitive_count: left_count as Real,
                right_primitive_count: right_count as Real,
                left_aabb_area: left_aabb.surface_area(),
                right_aabb_area: right_aabb.surface_area(),
                parent_aabb_area: parent_area,
                ray_aabb_test_cost: config.ray_aabb_cost,
                ray_triangle_test_cost: config.ray_triangle_cost,
            });
            if cost < best_cost {
                best_cost = cost;
                best = Some(SpatialSplit {
                    axis,
                    plane: node_aabb.min[axis] + boundary as Real * bin_width,
                    cost,
                    left_aabb,
                    right_aabb,
                });
            }
        }
    }
    best
}

/// Returns the bounds of `primitive` restricted to the slab
/// `low <= axis <= high`, choosing between the two clipping strategies.
///
/// The fast path clamps the primitive's box to the slab, which is accurate
/// as long as the box is well contained in the node and large enough for
/// box-level error to be irrelevant. The exact path clips the originating
/// triangle polygon against the slab planes and re-derives the bounds; it
/// is used when the primitive was already clipped by a prior split (its box
/// may extend outside the node) or is tiny relative to the scene.
#[allow(clippy::too_many_arguments)]
pub(crate) fn clip_primitive(
    primitive: &PrimitiveAabb,
    triangle: &Triangle,
    axis: Axis,
    low: Real,
    high: Real,
    node_aabb: &Aabb,
    scene_root_area: Real,
    config: &BuildConfig,
) -> Aabb {
    if needs_exact_clip(primitive, node_aabb, scene_root_area, config) {
        clip_triangle_exact(triangle, axis, low, high).intersection(&primitive.aabb)
    } else {
        clip_aabb_fast(&primitive.aabb, axis, low, high)
    }
}

/// Selection heuristic for the exact clipper, see [`clip_primitive`]. The
/// thresholds are tuning, not correctness, and live in [`BuildConfig`].
fn needs_exact_clip(
    primitive: &PrimitiveAabb,
    node_aabb: &Aabb,
    scene_root_area: Real,
    config: &BuildConfig,
) -> bool {
    if !node_aabb.contains_aabb(&primitive.aabb) {
        return true;
    }
    let size = primitive.aabb.size();
    let smallest_extent = size.x.min(size.y).min(size.z);
    primitive.aabb.surface_area() < scene_root_area * config.exact_clip_area_ratio
        || smallest_extent < config.exact_clip_min_extent
}

/// Clamp-only clipping: restrict the box's extent along `axis` to
/// `[low, high]`.
fn clip_aabb_fast(aabb: &Aabb, axis: Axis, low: Real, high: Real) -> Aabb {
    let mut clipped = *aabb;
    clipped.min[axis] = clipped.min[axis].max(low);
    clipped.max[axis] = clipped.max[axis].min(high);
    clipped
}

/// Exact clipping: Sutherland–Hodgman of the triangle polygon against the
/// two axis-aligned slab planes, then the bounds of what is left. Returns
/// an empty box when the triangle lies entirely outside the slab.
fn clip_triangle_exact(triangle: &Triangle, axis: Axis, low: Real, high: Real) -> Aabb {
    let polygon = vec![triangle[0], triangle[1], triangle[2]];
    let polygon = clip_polygon_against_plane(&polygon, axis, low, false);
    let polygon = clip_polygon_against_plane(&polygon, axis, high, true);

    let mut aabb = Aabb::empty();
    for vertex in &polygon {
        aabb.grow_mut(vertex);
    }
    aabb
}

/// One Sutherland–Hodgman pass against the plane `axis == value`, keeping
/// the half-space below the plane when `keep_below` and above it otherwise.
fn clip_polygon_against_plane(
    polygon: &[Point3],
    axis: Axis,
    value: Real,
    keep_below: bool,
) -> Vec<Point3> {
    let inside = |p: &Point3| {
        if keep_below {
            p[axis] <= value
        } else {
            p[axis] >= value
        }
    };

    let mut clipped = Vec::with_capacity(polygon.len() + 1);
    for (i, current) in polygon.iter().enumerate() {
        let next = &polygon[(i + 1) % polygon.len()];
        let current_inside = inside(current);
        let next_inside = inside(next);

        if current_inside {
            clipped.push(*current);
        }
        if current_inside != next_inside {
            // The edge crosses the plane; interpolate the crossing point.
            let t = (value - current[axis]) / (next[axis] - current[axis]);
            let mut crossing = *current + (next - current) * t;
            // Pin the interpolated coordinate to kill roundoff drift.
            crossing[axis] = value;
            clipped.push(crossing);
        }
    }
    clipped
}
