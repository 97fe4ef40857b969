//! BVH Construction

use super::common::*;
use order_stat::kth_by;
use std::cmp::Ordering;
use wavefront_core::geometry::*;

const N_BUCKETS: usize = 12;

/// Recursively build the BVH structure.
///
/// * `split_method`      - Middle|EqualCounts|SAH
/// * `max_prims_in_node` - Maximum number of primitives in the node.
/// * `primitive_info`    - Primitive information.
/// * `start`             - Starting index. For first call it should be 0.
/// * `end`               - Ending index + 1. For first call it should be number
///                         of primitives.
/// * `total_nodes`       - Used to return total number of nodes.
/// * `ordered_prims`     - Used to return a list of primitives ordered such that
///                         primitives in leaf nodes occupy contiguous ranges in
///                         the vector.
pub fn build(
    split_method: SplitMethod,
    max_prims_in_node: u8,
    primitive_info: &mut [BVHPrimitiveInfo],
    start: usize,
    end: usize,
    total_nodes: &mut usize,
    ordered_prims: &mut Vec<PrimitiveRef>,
) -> Box<BVHBuildNode> {
    // Compute bounds of all primitives in BVH node.
    let bounds = primitive_info[start..end]
        .iter()
        .fold(Bounds3f::empty(), |b, info| b.union(&info.bounds));

    let mut dim = Axis::default();
    let n_primitives = end - start;

    let interior_midpoint = if n_primitives == 1 {
        None
    } else {
        // Compute bound of primitive centroids, choose split dimension dim.
        let centroid_bounds = primitive_info[start..end]
            .iter()
            .fold(Bounds3f::empty(), |b, info| b.union(&info.centroid));
        dim = centroid_bounds.maximum_extent();

        if centroid_bounds.p_max[dim] == centroid_bounds.p_min[dim] {
            // Every centroid coincides; no split separates them.
            None
        } else {
            match split_method {
                SplitMethod::Middle => Some(split_middle(primitive_info, start, end, dim, &centroid_bounds)),
                SplitMethod::EqualCounts => Some(split_equal_counts(primitive_info, start, end, dim)),
                SplitMethod::SAH => split_sah(
                    primitive_info,
                    start,
                    end,
                    dim,
                    &centroid_bounds,
                    &bounds,
                    max_prims_in_node,
                ),
            }
        }
    };

    *total_nodes += 1;
    match interior_midpoint {
        Some(mid) => {
            let c0 = build(
                split_method,
                max_prims_in_node,
                primitive_info,
                start,
                mid,
                total_nodes,
                ordered_prims,
            );
            let c1 = build(
                split_method,
                max_prims_in_node,
                primitive_info,
                mid,
                end,
                total_nodes,
                ordered_prims,
            );
            Box::new(BVHBuildNode::new_interior_node(dim, c0, c1))
        }
        None => {
            let first_prim_offset = ordered_prims.len();
            ordered_prims.extend(primitive_info[start..end].iter().map(|info| info.primitive));
            Box::new(BVHBuildNode::new_leaf_node(first_prim_offset, n_primitives, bounds))
        }
    }
}

/// Partitions primitives around the midpoint of the centroid bounds.
///
/// * `primitive_info`  - All primitive info.
/// * `start`           - Starting index in primitive_info.
/// * `end`             - Ending index + 1 in primitive_info.
/// * `dim`             - Axis used to partition primitives.
/// * `centroid_bounds` - Bounding box of primitive centroids from start to end.
fn split_middle(
    primitive_info: &mut [BVHPrimitiveInfo],
    start: usize,
    end: usize,
    dim: Axis,
    centroid_bounds: &Bounds3f,
) -> usize {
    let pmid = (centroid_bounds.p_min[dim] + centroid_bounds.p_max[dim]) / 2.0;
    let infos = primitive_info[start..end].iter_mut();
    let mid = start + itertools::partition(infos, |pi| pi.centroid[dim] < pmid);

    if mid != start && mid != end {
        mid
    } else {
        // Heavily overlapping bounds can defeat the midpoint split.
        split_equal_counts(primitive_info, start, end, dim)
    }
}

/// Partitions primitives into two halves around the median centroid.
///
/// * `primitive_info`  - All primitive info.
/// * `start`           - Starting index in primitive_info.
/// * `end`             - Ending index + 1 in primitive_info.
/// * `dim`             - Axis used to partition primitives.
fn split_equal_counts(primitive_info: &mut [BVHPrimitiveInfo], start: usize, end: usize, dim: Axis) -> usize {
    let mid = (start + end) / 2;
    kth_by(&mut primitive_info[start..end], mid - start, |a, b| {
        a.centroid[dim]
            .partial_cmp(&b.centroid[dim])
            .unwrap_or(Ordering::Equal)
    });
    mid
}

/// Returns the SAH bucket of a centroid.
fn bucket_of(centroid_bounds: &Bounds3f, centroid: &Point3f, dim: Axis) -> usize {
    let b = (N_BUCKETS as Float * centroid_bounds.offset(centroid)[dim]) as usize;
    b.min(N_BUCKETS - 1)
}

/// Partitions primitives using the Surface Area Heuristic. Returns `None` if
/// a leaf is cheaper than any split.
///
/// * `primitive_info`    - All primitive info.
/// * `start`             - Start index in primitive_info.
/// * `end`               - End index in primitive_info.
/// * `dim`               - Axis used to partition primitives.
/// * `centroid_bounds`   - Bounding box of primitive centroids from start to end.
/// * `bounds`            - Bounding box of all primitives in the node.
/// * `max_prims_in_node` - Maximum primitives allowed in node.
fn split_sah(
    primitive_info: &mut [BVHPrimitiveInfo],
    start: usize,
    end: usize,
    dim: Axis,
    centroid_bounds: &Bounds3f,
    bounds: &Bounds3f,
    max_prims_in_node: u8,
) -> Option<usize> {
    let n_primitives = end - start;
    if n_primitives <= 2 {
        return Some(split_equal_counts(primitive_info, start, end, dim));
    }

    let mut buckets = [BucketInfo::default(); N_BUCKETS];
    for info in primitive_info[start..end].iter() {
        let b = bucket_of(centroid_bounds, &info.centroid, dim);
        buckets[b].count += 1;
        buckets[b].bounds = buckets[b].bounds.union(&info.bounds);
    }

    // Compute costs for splitting after each bucket.
    let mut cost = [0.0 as Float; N_BUCKETS - 1];
    for (i, cost_i) in cost.iter_mut().enumerate() {
        let (b0, count0) = buckets[..=i]
            .iter()
            .fold((Bounds3f::empty(), 0), |(b, c), bucket| (b.union(&bucket.bounds), c + bucket.count));
        let (b1, count1) = buckets[i + 1..]
            .iter()
            .fold((Bounds3f::empty(), 0), |(b, c), bucket| (b.union(&bucket.bounds), c + bucket.count));

        *cost_i = 0.125
            + (count0 as Float * b0.surface_area() + count1 as Float * b1.surface_area()) / bounds.surface_area();
    }

    let (min_cost_split_bucket, min_cost) = cost
        .iter()
        .enumerate()
        .fold((0, cost[0]), |(bi, bc), (i, &c)| if c < bc { (i, c) } else { (bi, bc) });

    let leaf_cost = n_primitives as Float;
    if n_primitives > max_prims_in_node as usize || min_cost < leaf_cost {
        let infos = primitive_info[start..end].iter_mut();
        let split = itertools::partition(infos, |pi| {
            bucket_of(centroid_bounds, &pi.centroid, dim) <= min_cost_split_bucket
        });
        let mid = start + split;
        if mid == start || mid == end {
            Some(split_equal_counts(primitive_info, start, end, dim))
        } else {
            Some(mid)
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infos(xs: &[Float]) -> Vec<BVHPrimitiveInfo> {
        xs.iter()
            .enumerate()
            .map(|(i, &x)| {
                let p = Point3f::new(x, 0.0, 0.0);
                BVHPrimitiveInfo::new(
                    PrimitiveRef {
                        instance_id: 0,
                        prim_id: i as u32,
                    },
                    Bounds3f::new(p - Vector3f::new(0.1, 0.1, 0.1), p + Vector3f::new(0.1, 0.1, 0.1)),
                )
            })
            .collect()
    }

    #[test]
    fn equal_counts_splits_at_median() {
        let mut info = infos(&[5.0, 1.0, 4.0, 2.0, 3.0, 0.0]);
        let mid = split_equal_counts(&mut info, 0, 6, Axis::X);
        assert_eq!(mid, 3);
        assert!(info[..3].iter().all(|i| i.centroid.x < 3.0));
        assert!(info[3..].iter().all(|i| i.centroid.x >= 3.0));
    }

    #[test]
    fn build_places_every_primitive_in_a_leaf() {
        for method in [SplitMethod::Middle, SplitMethod::EqualCounts, SplitMethod::SAH] {
            let mut info = infos(&[0.0, 9.0, 1.0, 8.0, 2.0, 7.0, 3.0]);
            let mut total_nodes = 0;
            let mut ordered = Vec::new();
            let root = build(method, 1, &mut info, 0, 7, &mut total_nodes, &mut ordered);

            assert_eq!(ordered.len(), 7);
            let mut ids: Vec<u32> = ordered.iter().map(|p| p.prim_id).collect();
            ids.sort_unstable();
            assert_eq!(ids, (0..7).collect::<Vec<_>>());
            assert!(total_nodes >= 7);
            assert_eq!(root.bounds.p_min.x, -0.1);
        }
    }
}
