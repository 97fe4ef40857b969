//! Bounding Volume Hierarchy.

use std::sync::Arc;
use wavefront_core::geometry::*;
use wavefront_core::scene::Instance;
use wavefront_core::traversal::*;

mod common;
mod split;

pub use common::*;

/// Bounding Volume Hierarchy Accelerator over the primitives of every
/// instance in a scene.
#[derive(Clone)]
pub struct BVHAccel {
    /// The instances whose primitives are indexed.
    instances: Vec<Instance>,

    /// Primitives ordered so that each leaf references a contiguous range.
    pub primitives: Vec<PrimitiveRef>,

    /// Maximum number of primitives in a node. **NOTE**: `u8` limits maximum number to 255.
    pub max_prims_in_node: u8,

    /// Spliting method.
    pub split_method: SplitMethod,

    /// The list of nodes.
    pub nodes: Vec<LinearBVHNode>,
}

impl BVHAccel {
    /// Create a new Bounding Volume Hierarchy Accelerator.
    ///
    /// * `instances`         - The instances.
    /// * `max_prims_in_node` - Maximum number of primitives in a node.
    /// * `split_method`      - The splitting method.
    pub fn new(instances: &[Instance], max_prims_in_node: u8, split_method: SplitMethod) -> Self {
        let max_prims_in_node = max_prims_in_node.max(1);

        // Initializes primitive_info array for every primitive of every instance.
        let mut primitive_info: Vec<BVHPrimitiveInfo> = instances
            .iter()
            .enumerate()
            .flat_map(|(instance_id, instance)| {
                (0..instance.shape.prim_count() as u32).map(move |prim_id| {
                    BVHPrimitiveInfo::new(
                        PrimitiveRef {
                            instance_id: instance_id as u32,
                            prim_id,
                        },
                        instance.prim_bounds(prim_id),
                    )
                })
            })
            .collect();

        let n_primitives = primitive_info.len();
        if n_primitives == 0 {
            warn!("BVH created without primitives");
            return Self {
                instances: instances.to_vec(),
                primitives: vec![],
                max_prims_in_node,
                split_method,
                nodes: vec![],
            };
        }

        let mut total_nodes = 0;
        let mut ordered_prims = Vec::with_capacity(n_primitives);
        let root = split::build(
            split_method,
            max_prims_in_node,
            &mut primitive_info,
            0,
            n_primitives,
            &mut total_nodes,
            &mut ordered_prims,
        );

        info!(
            "BVH created with {} nodes for {} primitives ({:.2} MB)",
            total_nodes,
            n_primitives,
            (total_nodes * std::mem::size_of::<LinearBVHNode>()) as f32 / (1024.0 * 1024.0),
        );

        // Compute representation of depth-first traversal of BVH tree.
        let mut nodes = vec![LinearBVHNode::default(); total_nodes];
        let mut offset = 0_u32;
        Self::flatten_bvh_tree(&root, &mut nodes, &mut offset);
        debug_assert!(total_nodes == offset as usize);

        Self {
            instances: instances.to_vec(),
            primitives: ordered_prims,
            max_prims_in_node,
            split_method,
            nodes,
        }
    }

    /// Builds the BVH and returns it as a shared `Traversal`.
    ///
    /// * `instances`         - The instances.
    /// * `max_prims_in_node` - Maximum number of primitives in a node.
    /// * `split_method`      - The splitting method.
    pub fn build(instances: &[Instance], max_prims_in_node: u8, split_method: SplitMethod) -> ArcTraversal {
        Arc::new(Self::new(instances, max_prims_in_node, split_method))
    }

    /// Flatten the tree to the linear representation.
    ///
    /// * `node`   - The node.
    /// * `nodes`  - The linear nodes.
    /// * `offset` - Tracks current offset into `nodes`.
    fn flatten_bvh_tree(node: &BVHBuildNode, nodes: &mut Vec<LinearBVHNode>, offset: &mut u32) -> u32 {
        let my_offset = *offset;
        *offset += 1;

        match &node.children {
            None => {
                nodes[my_offset as usize] = LinearBVHNode::new_leaf_node(
                    node.bounds,
                    node.first_prim_offset as u32,
                    node.n_primitives as u16,
                );
            }
            Some([c0, c1]) => {
                // The first child immediately follows its parent.
                Self::flatten_bvh_tree(c0, nodes, offset);
                let second_child_offset = Self::flatten_bvh_tree(c1, nodes, offset);
                nodes[my_offset as usize] = LinearBVHNode::new_interior_node(
                    node.bounds,
                    second_child_offset,
                    usize::from(node.split_axis) as u8,
                );
            }
        }

        my_offset
    }

    /// Walks the nodes the ray passes through and calls `visit` for each
    /// primitive in them. The walk stops when `visit` returns true.
    ///
    /// * `r`     - The ray. `visit` may narrow its `t_max`.
    /// * `visit` - Called with the ray and a primitive.
    fn traverse<F>(&self, r: &mut Ray, mut visit: F)
    where
        F: FnMut(&mut Ray, &Instance, PrimitiveRef) -> bool,
    {
        if self.nodes.is_empty() {
            return;
        }

        let inv_dir = Vector3f::new(1.0 / r.d.x, 1.0 / r.d.y, 1.0 / r.d.z);
        let dir_is_neg = [
            (inv_dir.x < 0.0) as usize,
            (inv_dir.y < 0.0) as usize,
            (inv_dir.z < 0.0) as usize,
        ];

        // Follow ray through BVH nodes to find primitive intersections.
        let (mut to_visit_offset, mut current_node_index) = (0, 0);
        let mut nodes_to_visit = [0_usize; 64];

        loop {
            let node = &self.nodes[current_node_index];
            if node.bounds.intersect_p_inv(r, &inv_dir, dir_is_neg) {
                if node.n_primitives > 0 {
                    // Intersect ray with primitives in leaf BVH node.
                    for i in 0..node.n_primitives as usize {
                        let prim = self.primitives[node.offset as usize + i];
                        let instance = &self.instances[prim.instance_id as usize];
                        if instance.mask & r.mask == 0 {
                            continue;
                        }
                        if visit(r, instance, prim) {
                            return;
                        }
                    }
                    if to_visit_offset == 0 {
                        break;
                    }
                    to_visit_offset -= 1;
                    current_node_index = nodes_to_visit[to_visit_offset];
                } else if dir_is_neg[node.axis as usize] == 1 {
                    // Put far BVH node on nodes_to_visit stack, advance to near node.
                    nodes_to_visit[to_visit_offset] = current_node_index + 1;
                    to_visit_offset += 1;
                    current_node_index = node.offset as usize;
                } else {
                    nodes_to_visit[to_visit_offset] = node.offset as usize;
                    to_visit_offset += 1;
                    current_node_index += 1;
                }
            } else {
                if to_visit_offset == 0 {
                    break;
                }
                to_visit_offset -= 1;
                current_node_index = nodes_to_visit[to_visit_offset];
            }
        }
    }
}

impl Traversal for BVHAccel {
    fn trace(&self, ray: &Ray) -> Option<TraversalHit> {
        let mut r = *ray;
        let mut hit = None;
        self.traverse(&mut r, |r, instance, prim| {
            if let Some((t, uv)) = instance.intersect_prim(prim.prim_id, r) {
                r.t_max = t;
                hit = Some(TraversalHit {
                    t,
                    uv,
                    instance_id: prim.instance_id,
                    prim_id: prim.prim_id,
                });
            }
            false
        });
        hit
    }

    fn occluded(&self, ray: &Ray) -> bool {
        let mut r = *ray;
        let mut occluded = false;
        self.traverse(&mut r, |r, instance, prim| {
            occluded = instance.intersect_prim(prim.prim_id, r).is_some();
            occluded
        });
        occluded
    }

    fn world_bound(&self) -> Bounds3f {
        self.nodes.first().map_or_else(Bounds3f::empty, |n| n.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shapes::*;

    fn spheres() -> Vec<Instance> {
        (0..8)
            .map(|i| {
                let shape = Sphere::new(Point3f::new(3.0 * i as Float, 0.0, 0.0), 1.0).into_arc();
                Instance::new(shape, 0)
            })
            .collect()
    }

    fn brute_force(instances: &[Instance], ray: &Ray) -> Option<(u32, Float)> {
        let mut best: Option<(u32, Float)> = None;
        for (i, instance) in instances.iter().enumerate() {
            if instance.mask & ray.mask == 0 {
                continue;
            }
            if let Some((t, _)) = instance.intersect_prim(0, ray) {
                if best.map_or(true, |(_, bt)| t < bt) {
                    best = Some((i as u32, t));
                }
            }
        }
        best
    }

    #[test]
    fn empty_bvh_misses() {
        let bvh = BVHAccel::new(&[], 4, SplitMethod::Middle);
        let ray = Ray::new(Point3f::zero(), Vector3f::new(0.0, 0.0, 1.0));
        assert!(bvh.trace(&ray).is_none());
        assert!(!bvh.occluded(&ray));
        assert!(bvh.world_bound().is_empty());
    }

    #[test]
    fn closest_hit_along_row_of_spheres() {
        let bvh = BVHAccel::new(&spheres(), 1, SplitMethod::EqualCounts);
        let ray = Ray::new(Point3f::new(-10.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        let hit = bvh.trace(&ray).unwrap();
        assert_eq!(hit.instance_id, 0);
        assert!((hit.t - 9.0).abs() < 1e-3);

        let reverse = Ray::new(Point3f::new(40.0, 0.0, 0.0), Vector3f::new(-1.0, 0.0, 0.0));
        assert_eq!(bvh.trace(&reverse).unwrap().instance_id, 7);
    }

    #[test]
    fn t_max_and_mask_are_honoured() {
        let mut instances = spheres();
        instances[0] = instances[0].clone().with_mask(0b10);
        let bvh = BVHAccel::new(&instances, 2, SplitMethod::SAH);

        let ray = Ray::new(Point3f::new(-10.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0)).with_mask(0b01);
        assert_eq!(bvh.trace(&ray).unwrap().instance_id, 1);

        let short = Ray::new(Point3f::new(-10.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0)).with_t_max(5.0);
        assert!(bvh.trace(&short).is_none());
        assert!(!bvh.occluded(&short));
    }

    #[test]
    fn middle_split_is_the_default() {
        assert_eq!(SplitMethod::default(), SplitMethod::Middle);
    }

    #[test]
    fn transformed_instances_are_bounded_and_hit_in_world_space() {
        let unit = Sphere::new(Point3f::zero(), 1.0).into_arc();
        let moved = Transform::translate(&Vector3f::new(10.0, 0.0, 0.0)) * Transform::scale(3.0);
        let instances = vec![
            Instance::new(unit.clone(), 0),
            Instance::new(unit, 0).with_transform(moved),
        ];
        let bvh = BVHAccel::new(&instances, 1, SplitMethod::SAH);

        let wb = bvh.world_bound();
        assert!((wb.p_max.x - 13.0).abs() < 1e-4);
        assert!((wb.p_max.y - 3.0).abs() < 1e-4);

        let ray = Ray::new(Point3f::new(10.0, 0.0, 10.0), Vector3f::new(0.0, 0.0, -1.0));
        let hit = bvh.trace(&ray).unwrap();
        assert_eq!(hit.instance_id, 1);
        assert!((hit.t - 7.0).abs() < 1e-3);

        let past = Ray::new(Point3f::new(10.0, 2.5, 10.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(bvh.occluded(&past));
        let outside = Ray::new(Point3f::new(10.0, 3.5, 10.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(!bvh.occluded(&outside));
    }

    proptest! {
        #[test]
        fn matches_brute_force(
            ox in -5.0..30.0f32,
            oy in -5.0..5.0f32,
            dx in -1.0..1.0f32,
            dy in -1.0..1.0f32,
            dz in -1.0..1.0f32,
        ) {
            let d = Vector3f::new(dx, dy, dz);
            prop_assume!(d.length() > 0.1);
            let instances = spheres();
            let ray = Ray::new(Point3f::new(ox, oy, 4.0), d.normalize());
            for method in [SplitMethod::Middle, SplitMethod::EqualCounts, SplitMethod::SAH] {
                let bvh = BVHAccel::new(&instances, 2, method);
                let expected = brute_force(&instances, &ray);
                let hit = bvh.trace(&ray);
                prop_assert_eq!(hit.map(|h| h.instance_id), expected.map(|e| e.0));
                prop_assert_eq!(bvh.occluded(&ray), expected.is_some());
            }
        }
    }
}
