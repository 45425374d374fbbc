//! Flat-array node and leaf records of the BVH.

use crate::aabb::Aabb;

/// Sentinel stored in [`BvhNode::left_index`] to tag a leaf.
pub const LEAF_SENTINEL: i32 = -1;

/// One node of the flat binary tree.
///
/// Interior nodes carry two positive indices into the node array. A leaf is
/// tagged by `left_index == LEAF_SENTINEL`, with `right_index` pointing into
/// the separate leaf array instead. The root is always node 0, so a valid
/// child index is never 0 and freshly created nodes can use it as a
/// "not yet linked" state during construction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BvhNode {
    /// Bounds of everything below this node.
    pub bounding_box: Aabb,

    /// Index of the left child, or [`LEAF_SENTINEL`].
    pub left_index: i32,

    /// Index of the right child, or an index into the leaf array.
    pub right_index: i32,
}

impl BvhNode {
    /// Creates an unlinked node with the given bounds.
    pub fn new(bounding_box: Aabb) -> BvhNode {
        BvhNode {
            bounding_box,
            left_index: 0,
            right_index: 0,
        }
    }

    /// Returns true if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.left_index == LEAF_SENTINEL
    }

    /// Returns true if this node has been linked to two children.
    pub fn is_interior(&self) -> bool {
        self.left_index > 0
    }

    /// Returns the index of the left child node.
    ///
    /// # Panics
    /// Panics when called on a leaf node.
    pub fn left(&self) -> usize {
        assert!(self.is_interior(), "tried to get the left child of a leaf node");
        self.left_index as usize
    }

    /// Returns the index of the right child node.
    ///
    /// # Panics
    /// Panics when called on a leaf node.
    pub fn right(&self) -> usize {
        assert!(self.is_interior(), "tried to get the right child of a leaf node");
        self.right_index as usize
    }

    /// Returns the index into the leaf array for a leaf node.
    ///
    /// # Panics
    /// Panics when called on an interior node.
    pub fn leaf_index(&self) -> usize {
        assert!(self.is_leaf(), "tried to get the leaf record of an interior node");
        self.right_index as usize
    }
}

/// The primitive list of one terminal node.
///
/// Spatial splits may route the same triangle into several leaves, but each
/// leaf references a given triangle at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BvhLeaf {
    /// Indices into the scene's triangle slice.
    pub triangles: Vec<usize>,
}

/// The working unit of construction: a (possibly clipped) bounding box plus
/// the triangle it derives from.
///
/// Distinct from the triangle's own box because a spatial split clips copies
/// of the same triangle into shrunk boxes for the left and right child. All
/// `PrimitiveAabb`s of one build live in a single contiguous, reorderable
/// buffer; nodes reference `(start, len)` spans of it, never copies.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveAabb {
    /// Bounds of this (fragment of a) triangle.
    pub aabb: Aabb,

    /// Index of the originating triangle in the scene's slice.
    pub triangle: usize,
}

/// A contiguous `(start, len)` window of the shared primitive buffer owned
/// by one node during construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// First primitive of the window.
    pub start: usize,

    /// Number of primitives in the window.
    pub len: usize,
}

impl Span {
    /// Index one past the last primitive of the window.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

#[cfg(test)]
mod tests {
    use crate::aabb::Aabb;
    use crate::bvh::node::{BvhNode, LEAF_SENTINEL};

    #[test]
    fn test_fresh_node_is_neither_leaf_nor_interior() {
        let node = BvhNode::new(Aabb::empty());
        assert!(!node.is_leaf());
        assert!(!node.is_interior());
    }

    #[test]
    fn test_leaf_tagging() {
        let mut node = BvhNode::new(Aabb::empty());
        node.left_index = LEAF_SENTINEL;
        node.right_index = 7;
        assert!(node.is_leaf());
        assert_eq!(node.leaf_index(), 7);
    }

    #[test]
    #[should_panic(expected = "left child of a leaf")]
    fn test_leaf_has_no_children() {
        let mut node = BvhNode::new(Aabb::empty());
        node.left_index = LEAF_SENTINEL;
        node.left();
    }
}
