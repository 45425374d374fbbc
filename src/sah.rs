//! The surface area heuristic cost function.

use crate::Real;

/// Inputs for one SAH evaluation of a candidate split.
#[derive(Debug, Clone, Copy)]
pub struct SahInfo {
    /// Number of primitives ending up in the left child.
    pub left_primitive_count: Real,

    /// Number of primitives ending up in the right child.
    pub right_primitive_count: Real,

    /// Surface area of the left child's bounding box.
    pub left_aabb_area: Real,

    /// Surface area of the right child's bounding box.
    pub right_aabb_area: Real,

    /// Surface area of the parent's bounding box.
    pub parent_aabb_area: Real,

    /// Cost of one ray/box intersection test.
    pub ray_aabb_test_cost: Real,

    /// Cost of one ray/triangle intersection test.
    pub ray_triangle_test_cost: Real,
}

/// Evaluates the surface area heuristic:
///
/// ```text
/// cost = 2 * T_aabb +
///        (A(S_l) / A(S)) * N(S_l) * T_tri +
///        (A(S_r) / A(S)) * N(S_r) * T_tri
/// ```
///
/// # Panics
/// Panics when `parent_aabb_area` is not positive. A zero-area parent means
/// the scene has no usable geometry, which is a caller contract violation,
/// not a recoverable condition.
pub fn surface_area_heuristic(info: &SahInfo) -> Real {
    assert!(
        info.parent_aabb_area > 0.0,
        "SAH evaluated against a zero-area parent box"
    );
    2.0 * info.ray_aabb_test_cost
        + (info.left_aabb_area / info.parent_aabb_area)
            * info.left_primitive_count
            * info.ray_triangle_test_cost
        + (info.right_aabb_area / info.parent_aabb_area)
            * info.right_primitive_count
            * info.ray_triangle_test_cost
}

#[cfg(test)]
mod tests {
    use crate::sah::{surface_area_heuristic, SahInfo};
    use float_eq::assert_float_eq;

    fn base_info() -> SahInfo {
        SahInfo {
            left_primitive_count: 4.0,
            right_primitive_count: 4.0,
            left_aabb_area: 3.0,
            right_aabb_area: 3.0,
            parent_aabb_area: 6.0,
            ray_aabb_test_cost: 3.0,
            ray_triangle_test_cost: 2.0,
        }
    }

    #[test]
    fn test_symmetric_split_cost() {
        // 2*3 + 0.5*4*2 + 0.5*4*2 = 14
        assert_float_eq!(surface_area_heuristic(&base_info()), 14.0, abs <= 1e-6);
    }

    #[test]
    fn test_smaller_children_are_cheaper() {
        let balanced = surface_area_heuristic(&base_info());

        let mut tight = base_info();
        tight.left_aabb_area = 1.0;
        tight.right_aabb_area = 1.0;
        assert!(surface_area_heuristic(&tight) < balanced);
    }

    #[test]
    #[should_panic(expected = "zero-area parent")]
    fn test_zero_parent_area_panics() {
        let mut info = base_info();
        info.parent_aabb_area = 0.0;
        surface_area_heuristic(&info);
    }
}
