//! Common testing tools shared by the unit tests of this crate.

use crate::triangle::Triangle;
use crate::{Point3, Real};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A vector represented as a tuple, for proptest strategies.
pub type TupleVec = (Real, Real, Real);

/// Generates a [`TupleVec`] for [`proptest::strategy::Strategy`] from
/// closed-on-both-sides range.
pub fn tuplevec_small_strategy() -> impl Strategy<Value = TupleVec> {
    (
        -10.0f32..10.0f32,
        -10.0f32..10.0f32,
        -10.0f32..10.0f32,
    )
}

/// Convert a [`TupleVec`] to a [`Point3`].
pub fn tuple_to_point(tpl: &TupleVec) -> Point3 {
    Point3::new(tpl.0, tpl.1, tpl.2)
}

/// The two triangles of one axis-aligned unit quad.
fn quad(a: Point3, b: Point3, c: Point3, d: Point3) -> [Triangle; 2] {
    [Triangle::new(a, b, c), Triangle::new(a, c, d)]
}

/// The twelve triangles of the unit cube `[0, 1]^3`, two per face.
pub fn unit_cube_triangles() -> Vec<Triangle> {
    let p = |x: Real, y: Real, z: Real| Point3::new(x, y, z);
    let mut triangles = Vec::with_capacity(12);
    // x = 0 and x = 1
    triangles.extend(quad(p(0., 0., 0.), p(0., 1., 0.), p(0., 1., 1.), p(0., 0., 1.)));
    triangles.extend(quad(p(1., 0., 0.), p(1., 0., 1.), p(1., 1., 1.), p(1., 1., 0.)));
    // y = 0 and y = 1
    triangles.extend(quad(p(0., 0., 0.), p(0., 0., 1.), p(1., 0., 1.), p(1., 0., 0.)));
    triangles.extend(quad(p(0., 1., 0.), p(1., 1., 0.), p(1., 1., 1.), p(0., 1., 1.)));
    // z = 0 and z = 1
    triangles.extend(quad(p(0., 0., 0.), p(1., 0., 0.), p(1., 1., 0.), p(0., 1., 0.)));
    triangles.extend(quad(p(0., 0., 1.), p(0., 1., 1.), p(1., 1., 1.), p(1., 0., 1.)));
    triangles
}

/// A deterministic cloud of `count` small triangles scattered in
/// `[-10, 10]^3`, seeded so every run builds the identical scene.
pub fn random_triangle_soup(count: usize, seed: u64) -> Vec<Triangle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut point = |spread: Real| -> Point3 {
        Point3::new(
            rng.random_range(-spread..spread),
            rng.random_range(-spread..spread),
            rng.random_range(-spread..spread),
        )
    };
    (0..count)
        .map(|_| {
            let base = point(10.0);
            let b = base + (point(1.0) - Point3::origin());
            let c = base + (point(1.0) - Point3::origin());
            Triangle::new(base, b, c)
        })
        .collect()
}
