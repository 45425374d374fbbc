//! The triangle input primitive.

use crate::aabb::{Aabb, Bounded};
use crate::axis::Axis;
use crate::{Point3, Real, Vector3};
use std::ops::Index;

/// A triangle in world space with a precomputed geometric normal.
///
/// Triangles are immutable once loaded: the scene owns them for the whole
/// lifetime of a [`Bvh`](crate::bvh::Bvh) and the tree references them only
/// by index.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    /// First vertex.
    pub a: Point3,

    /// Second vertex.
    pub b: Point3,

    /// Third vertex.
    pub c: Point3,

    /// Geometric normal.
    pub normal: Vector3,
}

impl Triangle {
    /// Creates a new [`Triangle`] from a counter-clockwise set of vertices,
    /// deriving the normal from the winding.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Triangle {
        let normal = (b - a).cross(&(c - a)).normalize();
        Triangle { a, b, c, normal }
    }

    /// Creates a new [`Triangle`] with an explicitly supplied normal, e.g.
    /// one taken from the source mesh.
    pub fn with_normal(a: Point3, b: Point3, c: Point3, normal: Vector3) -> Triangle {
        Triangle { a, b, c, normal }
    }

    /// Returns the centroid of the triangle's [`Aabb`] along `axis`.
    pub fn aabb_centroid(&self, axis: Axis) -> Real {
        self.aabb().centroid(axis)
    }
}

impl Bounded for Triangle {
    fn aabb(&self) -> Aabb {
        Aabb::empty().grow(&self.a).grow(&self.b).grow(&self.c)
    }
}

/// Per-vertex indexed access, used by the polygon clipper to walk edges.
impl Index<usize> for Triangle {
    type Output = Point3;

    fn index(&self, index: usize) -> &Point3 {
        match index {
            0 => &self.a,
            1 => &self.b,
            2 => &self.c,
            _ => panic!("triangle vertex index out of range: {}", index),
        }
    }
}
