//! This module defines a Ray structure and intersection algorithms
//! for axis aligned bounding boxes and triangles.

use crate::aabb::Aabb;
use crate::axis::Axis;
use crate::triangle::Triangle;
use crate::{Point3, Real, Vector3, EPSILON};

/// A struct which defines a ray and some of its cached values.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The ray origin.
    pub origin: Point3,

    /// The ray direction, normalized.
    pub direction: Vector3,

    /// Inverse (1/x) ray direction. Cached for use in [`Aabb`] intersections.
    pub inv_direction: Vector3,
}

/// The result of an intersection query: either against a bounding box or
/// against a triangle.
///
/// A miss is encoded as `hit == false` with `distance == +inf`, so the
/// nearest-hit fold in the traversal needs no special casing.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    /// Whether anything was struck.
    pub hit: bool,

    /// Distance from the ray origin to the intersection point.
    pub distance: Real,

    /// Geometric normal at the intersection.
    pub normal: Vector3,

    /// `1.0` for a front-side hit, `-1.0` when the ray started inside the
    /// box (or struck a triangle's backface). Used to order box hits during
    /// traversal: an origin-inside box must be visited unconditionally.
    pub backface_factor: Real,
}

impl Hit {
    /// Constructs a miss.
    pub fn miss() -> Hit {
        Hit {
            hit: false,
            distance: Real::INFINITY,
            normal: Vector3::zeros(),
            backface_factor: 1.0,
        }
    }
}

impl Ray {
    /// Creates a new [`Ray`] from an `origin` and a `direction`.
    /// `direction` will be normalized.
    ///
    /// # Examples
    /// ```
    /// use sbvh::ray::Ray;
    /// use sbvh::{Point3, Vector3};
    ///
    /// let origin = Point3::new(0.0, 0.0, 0.0);
    /// let direction = Vector3::new(1.0, 0.0, 0.0);
    /// let ray = Ray::new(origin, direction);
    ///
    /// assert_eq!(ray.origin, origin);
    /// assert_eq!(ray.direction, direction);
    /// ```
    pub fn new(origin: Point3, direction: Vector3) -> Ray {
        let direction = direction.normalize();
        Ray {
            origin,
            direction,
            inv_direction: Vector3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z),
        }
    }

    /// Tests the intersection of this [`Ray`] with an [`Aabb`] using the
    /// slab method: the per-axis `t` intervals computed from the cached
    /// inverse direction are intersected, and the box is hit iff the
    /// resulting interval is non-empty and overlaps positive `t`.
    ///
    /// When the ray origin lies inside the box, the reported distance is the
    /// *exit* distance and `backface_factor` is `-1.0`; the reported normal
    /// is negated. Callers keying a priority queue on
    /// `distance * backface_factor` thereby visit origin-inside boxes before
    /// any external hit.
    ///
    /// # Examples
    /// ```
    /// use sbvh::aabb::Aabb;
    /// use sbvh::ray::Ray;
    /// use sbvh::{Point3, Vector3};
    ///
    /// let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    /// let aabb = Aabb::with_bounds(Point3::new(4.0, -1.0, -1.0), Point3::new(6.0, 1.0, 1.0));
    ///
    /// let hit = ray.intersect_aabb(&aabb);
    /// assert!(hit.hit);
    /// assert_eq!(hit.distance, 4.0);
    /// ```
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Hit {
        let mut t_entry = Real::NEG_INFINITY;
        let mut t_exit = Real::INFINITY;
        let mut entry_axis = Axis::X;

        for axis in Axis::ALL {
            let t1 = (aabb.min[axis] - self.origin[axis]) * self.inv_direction[axis as usize];
            let t2 = (aabb.max[axis] - self.origin[axis]) * self.inv_direction[axis as usize];
            let (near, far) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

            if near > t_entry {
                t_entry = near;
                entry_axis = axis;
            }
            t_exit = t_exit.min(far);
        }

        if t_exit < t_entry || t_exit <= 0.0 {
            return Hit::miss();
        }

        // The face normal of the tightest slab opposes the ray direction.
        let sign = if self.direction[entry_axis as usize] < 0.0 { 1.0 } else { -1.0 };
        let normal = entry_axis.unit_vector() * sign;

        if t_entry <= 0.0 {
            // Origin inside the box: report the exit distance and flip.
            Hit {
                hit: true,
                distance: t_exit,
                normal: -normal,
                backface_factor: -1.0,
            }
        } else {
            Hit {
                hit: true,
                distance: t_entry,
                normal,
                backface_factor: 1.0,
            }
        }
    }

    /// Returns true if this [`Ray`] intersects the [`Aabb`].
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.intersect_aabb(aabb).hit
    }

    /// Implementation of the
    /// [Möller-Trumbore triangle/ray intersection algorithm](https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm),
    /// without backface culling.
    pub fn intersect_triangle(&self, triangle: &Triangle) -> Hit {
        let a_to_b = triangle.b - triangle.a;
        let a_to_c = triangle.c - triangle.a;

        // The determinant corresponds to the parallelepiped volume:
        // det = 0 => [dir, a_to_b, a_to_c] not linearly independent
        let u_vec = self.direction.cross(&a_to_c);
        let det = a_to_b.dot(&u_vec);

        if det.abs() < EPSILON {
            return Hit::miss();
        }

        let inv_det = 1.0 / det;
        let a_to_origin = self.origin - triangle.a;

        let u = a_to_origin.dot(&u_vec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return Hit::miss();
        }

        let v_vec = a_to_origin.cross(&a_to_b);
        let v = self.direction.dot(&v_vec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return Hit::miss();
        }

        let distance = a_to_c.dot(&v_vec) * inv_det;
        if distance <= EPSILON {
            return Hit::miss();
        }

        let backface_factor = if self.direction.dot(&triangle.normal) > 0.0 {
            -1.0
        } else {
            1.0
        };
        Hit {
            hit: true,
            distance,
            normal: triangle.normal,
            backface_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::aabb::Aabb;
    use crate::ray::Ray;
    use crate::testbase::{tuple_to_point, tuplevec_small_strategy, TupleVec};
    use crate::triangle::Triangle;
    use crate::{Point3, Vector3};
    use float_eq::assert_float_eq;
    use proptest::prelude::*;

    /// Generates a random [`Ray`] which points at a random [`Aabb`].
    fn gen_ray_to_aabb(data: (TupleVec, TupleVec, TupleVec)) -> (Ray, Aabb) {
        // Generate a random Aabb
        let aabb = Aabb::empty()
            .grow(&tuple_to_point(&data.0))
            .grow(&tuple_to_point(&data.1));

        // Get its center
        let center = aabb.center();

        // Generate random ray pointing at the center
        let pos = tuple_to_point(&data.2);
        let ray = Ray::new(pos, center - pos);
        (ray, aabb)
    }

    #[test]
    fn test_ray_hits_box_from_outside() {
        let ray = Ray::new(Point3::new(0.0, 0.5, 0.5), Vector3::new(1.0, 0.0, 0.0));
        let aabb = Aabb::with_bounds(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0));

        let hit = ray.intersect_aabb(&aabb);
        assert!(hit.hit);
        assert_float_eq!(hit.distance, 2.0, abs <= 1e-6);
        assert_eq!(hit.backface_factor, 1.0);
        assert_eq!(hit.normal, Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_origin_inside_box_reports_exit() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vector3::new(1.0, 0.0, 0.0));
        let aabb = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));

        let hit = ray.intersect_aabb(&aabb);
        assert!(hit.hit);
        assert_float_eq!(hit.distance, 0.5, abs <= 1e-6);
        assert_eq!(hit.backface_factor, -1.0);
    }

    #[test]
    fn test_ray_misses_box_behind_origin() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let aabb = Aabb::with_bounds(Point3::new(-3.0, -1.0, -1.0), Point3::new(-2.0, 1.0, 1.0));
        assert!(!ray.intersects_aabb(&aabb));
    }

    #[test]
    fn test_ray_hits_triangle_head_on() {
        let triangle = Triangle::new(
            Point3::new(-1.0, -1.0, 3.0),
            Point3::new(1.0, -1.0, 3.0),
            Point3::new(0.0, 1.0, 3.0),
        );
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));

        let hit = ray.intersect_triangle(&triangle);
        assert!(hit.hit);
        assert_float_eq!(hit.distance, 3.0, abs <= 1e-5);
        // The ray runs along the triangle normal, so this is a backface hit.
        assert_eq!(hit.backface_factor, -1.0);
    }

    #[test]
    fn test_ray_misses_triangle_outside_edges() {
        let triangle = Triangle::new(
            Point3::new(-1.0, -1.0, 3.0),
            Point3::new(1.0, -1.0, 3.0),
            Point3::new(0.0, 1.0, 3.0),
        );
        let ray = Ray::new(Point3::new(5.0, 5.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(!ray.intersect_triangle(&triangle).hit);
    }

    #[test]
    fn test_ray_parallel_to_triangle_misses() {
        let triangle = Triangle::new(
            Point3::new(-1.0, -1.0, 3.0),
            Point3::new(1.0, -1.0, 3.0),
            Point3::new(0.0, 1.0, 3.0),
        );
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(!ray.intersect_triangle(&triangle).hit);
    }

    proptest! {
        // Test whether a `Ray` which points at the center of an `Aabb` intersects it.
        #[test]
        fn test_ray_points_at_aabb_center(data in (tuplevec_small_strategy(),
                                                   tuplevec_small_strategy(),
                                                   tuplevec_small_strategy())) {
            let (ray, aabb) = gen_ray_to_aabb(data);
            assert!(ray.intersects_aabb(&aabb));
        }

        // Test whether a `Ray` which points away from the center of an `Aabb`
        // does not intersect it, unless its origin is inside the `Aabb`.
        #[test]
        fn test_ray_points_from_aabb_center(data in (tuplevec_small_strategy(),
                                                     tuplevec_small_strategy(),
                                                     tuplevec_small_strategy())) {
            let (mut ray, aabb) = gen_ray_to_aabb(data);

            // Invert the direction of the ray
            ray.direction = -ray.direction;
            ray.inv_direction = -ray.inv_direction;
            assert!(!ray.intersects_aabb(&aabb) || aabb.contains(&ray.origin));
        }
    }
}
