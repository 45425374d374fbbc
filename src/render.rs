//! Parallel full-frame tracing against a finished [`Bvh`].
//!
//! Traversal is read-only, so a frame is traced by handing disjoint
//! scanlines to rayon's worker pool. Each worker writes its own rows of
//! the output buffer; no locks, and the parallel iterator joins when the
//! last row is done. Camera models and image export stay with the caller,
//! which supplies a per-pixel ray generator and a shading closure.

use crate::bvh::Bvh;
use crate::ray::{Hit, Ray};
use crate::triangle::Triangle;
use rayon::prelude::*;

/// Traces a `width` by `height` frame, one [`Bvh::nearest_hit`] query per
/// pixel, and shades each result into the returned row-major buffer.
///
/// `ray_for_pixel` receives `(x, y)` with `(0, 0)` the top-left pixel.
pub fn trace_frame<T, R, S>(
    bvh: &Bvh,
    triangles: &[Triangle],
    width: usize,
    height: usize,
    ray_for_pixel: R,
    shade: S,
) -> Vec<T>
where
    T: Default + Clone + Send,
    R: Fn(usize, usize) -> Ray + Sync,
    S: Fn(&Hit) -> T + Sync,
{
    let mut frame = vec![T::default(); width * height];
    frame
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                let hit = bvh.nearest_hit(&ray_for_pixel(x, y), triangles);
                *pixel = shade(&hit);
            }
        });
    frame
}

#[cfg(test)]
mod tests {
    use crate::bvh::{BuildConfig, Bvh};
    use crate::ray::Ray;
    use crate::render::trace_frame;
    use crate::testbase::unit_cube_triangles;
    use crate::{Point3, Vector3};

    #[test]
    fn test_frame_matches_sequential_trace() {
        let triangles = unit_cube_triangles();
        let bvh = Bvh::build(&triangles, &BuildConfig::default());

        const WIDTH: usize = 32;
        const HEIGHT: usize = 24;
        // A crude orthographic camera in front of the cube, looking at it
        // along +z.
        let ray_for_pixel = |x: usize, y: usize| {
            let origin = Point3::new(
                -0.5 + 2.0 * x as f32 / WIDTH as f32,
                -0.5 + 2.0 * y as f32 / HEIGHT as f32,
                -3.0,
            );
            Ray::new(origin, Vector3::new(0.0, 0.0, 1.0))
        };

        let frame = trace_frame(&bvh, &triangles, WIDTH, HEIGHT, ray_for_pixel, |hit| {
            if hit.hit {
                hit.distance
            } else {
                0.0
            }
        });

        assert_eq!(frame.len(), WIDTH * HEIGHT);
        let mut struck = 0;
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let hit = bvh.nearest_hit(&ray_for_pixel(x, y), &triangles);
                let expected = if hit.hit { hit.distance } else { 0.0 };
                assert_eq!(frame[y * WIDTH + x], expected);
                if hit.hit {
                    struck += 1;
                }
            }
        }
        // Part of the frame covers the cube, part misses it.
        assert!(struck > 0);
        assert!(struck < WIDTH * HEIGHT);
    }
}
