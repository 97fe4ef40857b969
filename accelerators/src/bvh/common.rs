//! BVH Common

use wavefront_core::geometry::*;

/// Splitting method to use to subdivide primitives.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SplitMethod {
    /// Surface Area Heuristic.
    SAH,

    /// Linear Bounding Volume Hierarchy using splitting planes that are midpoint of each region of space.
    #[default]
    Middle,

    /// Partition primitives into equally sized subsets such that the first half of the primitives have smallest
    /// centroid coordinate values along the chosen axis, and second have have the largest centroid coordinate values.
    EqualCounts,
}

/// A single primitive of an instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PrimitiveRef {
    /// Instance the primitive belongs to.
    pub instance_id: u32,

    /// Primitive index within the instance's shape.
    pub prim_id: u32,
}

/// SAH bucket information.
#[derive(Copy, Clone, Debug)]
pub struct BucketInfo {
    /// Count of primitives.
    pub count: usize,

    /// Bounding box for the bucket.
    pub bounds: Bounds3f,
}

impl Default for BucketInfo {
    fn default() -> Self {
        Self {
            count: 0,
            bounds: Bounds3f::empty(),
        }
    }
}

/// Stores information about a primitive.
#[derive(Copy, Clone, Debug)]
pub struct BVHPrimitiveInfo {
    /// The primitive.
    pub primitive: PrimitiveRef,

    /// The bounding box of primitive.
    pub bounds: Bounds3f,

    /// The centroid of bounding box of primitive.
    pub centroid: Point3f,
}

impl BVHPrimitiveInfo {
    /// Create a `BVHPrimitiveInfo`.
    ///
    /// * `primitive` - The primitive.
    /// * `bounds`    - The bounding box of primitive.
    pub fn new(primitive: PrimitiveRef, bounds: Bounds3f) -> Self {
        Self {
            primitive,
            bounds,
            centroid: bounds.centroid(),
        }
    }
}

/// BVHBuildNode represents a node of the Bound Volume Hierarchy while it is
/// being built.
#[derive(Debug)]
pub struct BVHBuildNode {
    /// Bounding box of all children beneath this node.
    pub bounds: Bounds3f,

    /// Children of this node.
    pub children: Option<[Box<BVHBuildNode>; 2]>,

    /// Coordinate axis along which primitives are partitioned between the
    /// two children.
    pub split_axis: Axis,

    /// Index of first primitive in `BVHAccel::primitives` stored at this node.
    pub first_prim_offset: usize,

    /// Number of primitives stored at this node starting at `first_prim_offset`.
    pub n_primitives: usize,
}

impl BVHBuildNode {
    /// Create a leaf BVH node.
    ///
    /// * `first`  - Index of first primitive stored at this node.
    /// * `n`      - Number of primitives stored at this node.
    /// * `bounds` - Bounding box.
    pub fn new_leaf_node(first: usize, n: usize, bounds: Bounds3f) -> Self {
        Self {
            first_prim_offset: first,
            n_primitives: n,
            bounds,
            children: None,
            split_axis: Axis::default(),
        }
    }

    /// Allocates an interior BVH node.
    ///
    /// * `axis` - Axis used for partitioning children.
    /// * `c0`   - First child.
    /// * `c1`   - Second child.
    pub fn new_interior_node(axis: Axis, c0: Box<BVHBuildNode>, c1: Box<BVHBuildNode>) -> Self {
        Self {
            first_prim_offset: 0,
            n_primitives: 0,
            bounds: c0.bounds.union(&c1.bounds),
            children: Some([c0, c1]),
            split_axis: axis,
        }
    }
}

/// Stores information needed to traverse the BVH.
#[derive(Copy, Clone, Debug)]
pub struct LinearBVHNode {
    /// Bounding box for the node.
    pub bounds: Bounds3f,

    /// For leaf nodes, offset for the primitives in the node. For interior nodes, offset to the second child.
    pub offset: u32,

    /// For leaf nodes, the number of primitives in the node. For interior nodes, 0.
    pub n_primitives: u16,

    /// For interior nodes, which coordinate axis was used for partitioning.
    pub axis: u8,
}

impl Default for LinearBVHNode {
    fn default() -> Self {
        Self {
            bounds: Bounds3f::empty(),
            offset: 0,
            n_primitives: 0,
            axis: 0,
        }
    }
}

impl LinearBVHNode {
    /// Creates a leaf linear bvh node.
    ///
    /// * `bounds`       - Bounding box for the node.
    /// * `offset`       - Offset for primitives in the node.
    /// * `n_primitives` - Number of primitives in the node.
    pub fn new_leaf_node(bounds: Bounds3f, offset: u32, n_primitives: u16) -> Self {
        Self {
            bounds,
            offset,
            n_primitives,
            axis: 0,
        }
    }

    /// Creates an interior linear bvh node.
    ///
    /// * `bounds` - Bounding box for the node.
    /// * `offset` - Offset to the second child.
    /// * `axis`   - Axis used for partitioning.
    pub fn new_interior_node(bounds: Bounds3f, offset: u32, axis: u8) -> Self {
        Self {
            bounds,
            offset,
            axis,
            n_primitives: 0,
        }
    }
}
