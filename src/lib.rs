//! A crate which exports rays, axis-aligned bounding boxes, and a binary
//! bounding volume hierarchy built with the surface area heuristic.
//!
//! ## About
//!
//! This crate builds a binary BVH over a list of triangles and answers
//! nearest-intersection queries for rays against it. Construction uses the
//! Surface Area Heuristic (SAH) with two competing split strategies: an
//! object-median split, which sorts the primitives by centroid and sweeps
//! for the cheapest partition point, and a binned spatial split, which
//! places a splitting plane and clips primitives that straddle it into both
//! children. Queries walk the finished tree best-first, ordered by the
//! distance at which the ray enters each bounding box, so traversal can
//! stop as soon as no queued node can beat the current best triangle hit.
//!
//! ## Example
//!
//! ```
//! use sbvh::bvh::{BuildConfig, Bvh};
//! use sbvh::ray::Ray;
//! use sbvh::triangle::Triangle;
//! use sbvh::{Point3, Vector3};
//!
//! let triangles = vec![
//!     Triangle::new(
//!         Point3::new(-1.0, -1.0, 5.0),
//!         Point3::new(1.0, -1.0, 5.0),
//!         Point3::new(0.0, 1.0, 5.0),
//!     ),
//!     Triangle::new(
//!         Point3::new(-1.0, -1.0, 20.0),
//!         Point3::new(1.0, -1.0, 20.0),
//!         Point3::new(0.0, 1.0, 20.0),
//!     ),
//! ];
//!
//! let bvh = Bvh::build(&triangles, &BuildConfig::default());
//!
//! let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
//! let hit = bvh.nearest_hit(&ray, &triangles);
//! assert!(hit.hit);
//! assert!((hit.distance - 5.0).abs() < 1e-4);
//! ```
//!
//! ## Features
//!
//! - `serde` (default **disabled**) - adds `Serialize` and `Deserialize`
//!   implementations for some types

/// Point math type used by this crate. Type alias for [`nalgebra::Point3`].
pub type Point3 = nalgebra::Point3<f32>;

/// Vector math type used by this crate. Type alias for [`nalgebra::Vector3`].
pub type Vector3 = nalgebra::Vector3<f32>;

/// Float type used by this crate.
pub type Real = f32;

/// A minimal floating value used as a lower bound for intersection distances
/// and as a degeneracy threshold for clipped geometry.
pub const EPSILON: Real = 0.00001;

pub mod aabb;
pub mod axis;
pub mod bvh;
pub mod ray;
pub mod render;
pub mod sah;
pub mod triangle;

#[cfg(test)]
mod testbase;
