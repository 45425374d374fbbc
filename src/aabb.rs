//! Axis Aligned Bounding Boxes.

use crate::axis::Axis;
use crate::{Point3, Real, Vector3, EPSILON};
use std::fmt;

/// An axis-aligned bounding box given by its minimum and maximum corners.
///
/// A freshly created [`Aabb`] is *empty*: its minimum is `+inf` and its
/// maximum is `-inf`, so growing it by any point yields exactly that point.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum coordinates.
    pub min: Point3,

    /// Maximum coordinates.
    pub max: Point3,
}

/// A trait implemented by things which can be bounded by an [`Aabb`].
pub trait Bounded {
    /// Returns the [`Aabb`] bounding `self`.
    fn aabb(&self) -> Aabb;
}

impl Aabb {
    /// Creates a new [`Aabb`] with the given bounds.
    pub fn with_bounds(min: Point3, max: Point3) -> Aabb {
        Aabb { min, max }
    }

    /// Creates a new empty [`Aabb`].
    ///
    /// # Examples
    /// ```
    /// use sbvh::aabb::Aabb;
    /// use sbvh::Point3;
    ///
    /// let aabb = Aabb::empty();
    /// // Grown by a point, the empty box collapses onto that point.
    /// let point = Point3::new(42.0, 42.0, 42.0);
    /// let aabb = aabb.grow(&point);
    /// assert_eq!(aabb.min, point);
    /// assert_eq!(aabb.max, point);
    /// ```
    pub fn empty() -> Aabb {
        Aabb {
            min: Point3::new(Real::INFINITY, Real::INFINITY, Real::INFINITY),
            max: Point3::new(Real::NEG_INFINITY, Real::NEG_INFINITY, Real::NEG_INFINITY),
        }
    }

    /// Returns true if this [`Aabb`] has never been grown, i.e. it still has
    /// its inverted-infinity bounds.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`] and `other`.
    pub fn join(&self, other: &Aabb) -> Aabb {
        Aabb::with_bounds(
            Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }

    /// Expands this [`Aabb`] in place to contain `other`. Bounds only ever grow.
    pub fn join_mut(&mut self, other: &Aabb) {
        *self = self.join(other);
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`] and the point `other`.
    pub fn grow(&self, other: &Point3) -> Aabb {
        Aabb::with_bounds(
            Point3::new(
                self.min.x.min(other.x),
                self.min.y.min(other.y),
                self.min.z.min(other.z),
            ),
            Point3::new(
                self.max.x.max(other.x),
                self.max.y.max(other.y),
                self.max.z.max(other.z),
            ),
        )
    }

    /// Expands this [`Aabb`] in place to contain the point `other`.
    pub fn grow_mut(&mut self, other: &Point3) {
        *self = self.grow(other);
    }

    /// Returns the size of this [`Aabb`] in all three dimensions.
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    /// Returns the center point of the [`Aabb`].
    pub fn center(&self) -> Point3 {
        self.min + (self.size() / 2.0)
    }

    /// Returns the centroid coordinate of the [`Aabb`] along `axis`.
    pub fn centroid(&self, axis: Axis) -> Real {
        (self.min[axis] + self.max[axis]) / 2.0
    }

    /// Returns the total surface area of this [`Aabb`], or `0.0` for an
    /// empty box so callers dividing by a parent area fail loudly instead
    /// of producing garbage.
    pub fn surface_area(&self) -> Real {
        if self.is_empty() {
            return 0.0;
        }
        let size = self.size();
        2.0 * (size.x * size.y + size.y * size.z + size.z * size.x)
    }

    /// Returns true if the point is inside the [`Aabb`].
    ///
    /// # Panics
    /// Panics when called on an empty box.
    pub fn contains(&self, p: &Point3) -> bool {
        assert!(!self.is_empty(), "containment test on an empty Aabb");
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns true if `other` lies entirely inside this [`Aabb`].
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.contains(&other.min) && self.contains(&other.max)
    }

    /// Returns true if this [`Aabb`] and `other` overlap in all three axes.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Returns the componentwise intersection of this [`Aabb`] with `other`.
    /// If the boxes do not overlap the result has inverted bounds on some
    /// axis and reports a zero surface area.
    pub fn intersection(&self, other: &Aabb) -> Aabb {
        Aabb::with_bounds(
            Point3::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            Point3::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        )
    }

    /// Returns whether this [`Aabb`] bounds a usable region of space.
    ///
    /// Negative-size boxes and near-degenerate slivers are rejected: a box
    /// that is flat in two or more axes (a line or a point) cannot bound a
    /// triangle fragment worth keeping, and clipping produces such boxes
    /// when a splitting plane grazes a primitive. Boxes flat in a single
    /// axis are fine; any axis-aligned triangle has one.
    pub fn is_valid(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        let size = self.size();
        if size.x < 0.0 || size.y < 0.0 || size.z < 0.0 {
            return false;
        }
        let flat_axes = (size.x < EPSILON) as u32
            + (size.y < EPSILON) as u32
            + (size.z < EPSILON) as u32;
        flat_axes < 2 && self.surface_area() > EPSILON
    }
}

impl Default for Aabb {
    fn default() -> Aabb {
        Aabb::empty()
    }
}

impl fmt::Display for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Min bound: {}; Max bound: {}", self.min, self.max)
    }
}

/// Implementation of [`Bounded`] for single points.
impl Bounded for Point3 {
    fn aabb(&self) -> Aabb {
        Aabb::with_bounds(*self, *self)
    }
}

#[cfg(test)]
mod tests {
    use crate::aabb::Aabb;
    use crate::testbase::{tuple_to_point, tuplevec_small_strategy, TupleVec};
    use crate::Point3;
    use proptest::prelude::*;

    #[test]
    fn test_empty_aabb_has_zero_area() {
        assert_eq!(Aabb::empty().surface_area(), 0.0);
    }

    #[test]
    fn test_unit_cube_surface_area() {
        let aabb = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.surface_area(), 6.0);
    }

    #[test]
    fn test_flat_box_is_valid_but_line_is_not() {
        // A box flat in one axis bounds an axis-aligned triangle.
        let flat = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        assert!(flat.is_valid());

        // Flat in two axes it degenerates to a line.
        let line = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        assert!(!line.is_valid());

        let point = Aabb::with_bounds(Point3::new(1.0, 2.0, 3.0), Point3::new(1.0, 2.0, 3.0));
        assert!(!point.is_valid());
    }

    #[test]
    fn test_intersection_of_disjoint_boxes_is_invalid() {
        let a = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::with_bounds(Point3::new(2.0, 2.0, 2.0), Point3::new(3.0, 3.0, 3.0));
        assert!(!a.intersects(&b));
        assert!(!a.intersection(&b).is_valid());
    }

    #[test]
    fn test_intersection_shrinks_to_overlap() {
        let a = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
        let b = Aabb::with_bounds(Point3::new(1.0, 1.0, 1.0), Point3::new(3.0, 3.0, 3.0));
        let i = a.intersection(&b);
        assert_eq!(i.min, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(i.max, Point3::new(2.0, 2.0, 2.0));
        assert!(a.intersects(&b));
    }

    proptest! {
        // Test whether an [`Aabb`] always contains its center.
        #[test]
        fn test_aabb_contains_center(a in tuplevec_small_strategy(),
                                     b in tuplevec_small_strategy()) {
            let p1 = tuple_to_point(&a);
            let p2 = tuple_to_point(&b);
            let aabb = Aabb::empty().grow(&p1).grow(&p2);
            assert!(aabb.contains(&aabb.center()));
        }

        // Test whether the joint of two boxes contains all the points that
        // grew either of the two.
        #[test]
        fn test_join_two_aabbs(a in (tuplevec_small_strategy(), tuplevec_small_strategy()),
                               b in (tuplevec_small_strategy(), tuplevec_small_strategy())) {
            let points: [TupleVec; 4] = [a.0, a.1, b.0, b.1];
            let points = points.iter().map(tuple_to_point).collect::<Vec<Point3>>();

            let aabb1 = Aabb::empty().grow(&points[0]).grow(&points[1]);
            let aabb2 = Aabb::empty().grow(&points[2]).grow(&points[3]);
            let joint = aabb1.join(&aabb2);

            for point in &points {
                assert!(joint.contains(point));
            }
        }

        // Growing a box never shrinks it.
        #[test]
        fn test_grow_is_monotonic(a in tuplevec_small_strategy(),
                                  b in tuplevec_small_strategy(),
                                  c in tuplevec_small_strategy()) {
            let base = Aabb::empty()
                .grow(&tuple_to_point(&a))
                .grow(&tuple_to_point(&b));
            let grown = base.grow(&tuple_to_point(&c));
            assert!(grown.contains(&base.min));
            assert!(grown.contains(&base.max));
        }
    }
}
