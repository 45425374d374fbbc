//! Axis enum for indexing three-dimensional structures.
//!
//! `Vector3` is a nalgebra matrix alias with its own generic indexing, so
//! vectors are indexed with `axis as usize` rather than an `Index<Axis>`
//! impl of their own.

use crate::{Point3, Real, Vector3};
use std::fmt::{Display, Formatter, Result};
use std::ops::{Index, IndexMut};

/// An `Axis` in a three-dimensional coordinate system.
/// Used to access `Point3` structs and coordinate slices via index.
///
/// # Examples
/// ```
/// use sbvh::axis::Axis;
///
/// let mut position = [1.0, 0.5, 42.0];
/// position[Axis::Y] *= 4.0;
///
/// assert_eq!(position[Axis::Y], 2.0);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    /// Index of the X axis.
    X = 0,

    /// Index of the Y axis.
    Y = 1,

    /// Index of the Z axis.
    Z = 2,
}

impl Axis {
    /// All three axes, in sweep order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the unit vector pointing in the positive direction of this axis.
    pub fn unit_vector(&self) -> Vector3 {
        match *self {
            Axis::X => Vector3::new(1.0, 0.0, 0.0),
            Axis::Y => Vector3::new(0.0, 1.0, 0.0),
            Axis::Z => Vector3::new(0.0, 0.0, 1.0),
        }
    }
}

/// Display implementation for `Axis`.
impl Display for Axis {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "{}",
            match *self {
                Axis::X => "x",
                Axis::Y => "y",
                Axis::Z => "z",
            }
        )
    }
}

/// Make slices indexable by `Axis`.
impl Index<Axis> for [Real] {
    type Output = Real;

    fn index(&self, axis: Axis) -> &Real {
        &self[axis as usize]
    }
}

/// Make slices mutably accessible by `Axis`.
impl IndexMut<Axis> for [Real] {
    fn index_mut(&mut self, axis: Axis) -> &mut Real {
        &mut self[axis as usize]
    }
}

/// Make `Point3` indexable by `Axis`.
impl Index<Axis> for Point3 {
    type Output = Real;

    fn index(&self, axis: Axis) -> &Real {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Make `Point3` mutably accessible by `Axis`.
impl IndexMut<Axis> for Point3 {
    fn index_mut(&mut self, axis: Axis) -> &mut Real {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::axis::Axis;
    use crate::Point3;
    use proptest::prelude::*;

    proptest! {
        // Test whether accessing arrays by index is the same as accessing them by `Axis`.
        #[test]
        fn test_index_by_axis(tpl: (f32, f32, f32)) {
            let a = [tpl.0, tpl.1, tpl.2];

            assert!((a[0] - a[Axis::X]).abs() < f32::EPSILON || (a[0].is_nan() && a[Axis::X].is_nan()));
            assert!((a[1] - a[Axis::Y]).abs() < f32::EPSILON || (a[1].is_nan() && a[Axis::Y].is_nan()));
            assert!((a[2] - a[Axis::Z]).abs() < f32::EPSILON || (a[2].is_nan() && a[Axis::Z].is_nan()));
        }

        // Test whether points can be mutably set, by indexing via `Axis`.
        #[test]
        fn test_set_by_axis(tpl: (f32, f32, f32)) {
            let mut p = Point3::new(0.0, 0.0, 0.0);

            p[Axis::X] = tpl.0;
            p[Axis::Y] = tpl.1;
            p[Axis::Z] = tpl.2;

            assert!((p.x - tpl.0).abs() < f32::EPSILON || (p.x.is_nan() && tpl.0.is_nan()));
            assert!((p.y - tpl.1).abs() < f32::EPSILON || (p.y.is_nan() && tpl.1.is_nan()));
            assert!((p.z - tpl.2).abs() < f32::EPSILON || (p.z.is_nan() && tpl.2.is_nan()));
        }
    }
}
