//! Triangle Meshes

use std::mem::size_of;
use std::sync::Arc;
use wavefront_core::error::*;
use wavefront_core::geometry::*;
use wavefront_core::interaction::*;
use wavefront_core::sampling::*;
use wavefront_core::shape::*;

/// A mesh of triangles. Each triangle is one primitive; its parametric
/// coordinates are the barycentric weights of the second and third vertex.
/// Surface points carry the interpolated texture coordinates when the mesh
/// has them and the barycentric weights otherwise.
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub p: Vec<Point3f>,

    /// Per vertex shading normals; empty if the mesh has none.
    pub n: Vec<Normal3f>,

    /// Per vertex texture coordinates; empty if the mesh has none.
    pub uv: Vec<Point2f>,

    /// Vertex indices of each triangle.
    pub indices: Vec<[u32; 3]>,

    /// Running sum of triangle areas used to sample triangles by area.
    area_cdf: Vec<Float>,
}

impl TriangleMesh {
    /// Create a new `TriangleMesh`.
    ///
    /// * `p`       - Vertex positions.
    /// * `n`       - Per vertex shading normals or an empty list.
    /// * `indices` - Vertex indices of each triangle, counter-clockwise
    ///               around the front face.
    pub fn new(p: Vec<Point3f>, n: Vec<Normal3f>, indices: Vec<[u32; 3]>) -> Result<Self> {
        if indices.is_empty() {
            return Err(Error::Scene("triangle mesh has no triangles".to_string()));
        }
        if !n.is_empty() && n.len() != p.len() {
            return Err(Error::Scene(format!(
                "triangle mesh has {} normals for {} vertices",
                n.len(),
                p.len()
            )));
        }
        if let Some(bad) = indices.iter().flatten().find(|&&i| i as usize >= p.len()) {
            return Err(Error::Scene(format!(
                "triangle mesh vertex index {} out of range [0, {})",
                bad,
                p.len()
            )));
        }

        let mut mesh = Self {
            p,
            n,
            uv: vec![],
            indices,
            area_cdf: vec![],
        };
        let mut sum = 0.0;
        mesh.area_cdf = (0..mesh.indices.len())
            .map(|i| {
                sum += mesh.triangle_area(i);
                sum
            })
            .collect();

        debug!(
            "Triangle mesh with {} vertices and {} triangles",
            mesh.p.len(),
            mesh.indices.len()
        );
        Ok(mesh)
    }

    /// Create a quad from 4 corners given counter-clockwise around the front
    /// face.
    ///
    /// * `p0` - First corner.
    /// * `p1` - Second corner.
    /// * `p2` - Third corner.
    /// * `p3` - Fourth corner.
    /// Texture coordinates run from (0, 0) at `p0` to (1, 1) at `p2`.
    pub fn quad(p0: Point3f, p1: Point3f, p2: Point3f, p3: Point3f) -> Result<Self> {
        Self::new(vec![p0, p1, p2, p3], vec![], vec![[0, 1, 2], [0, 2, 3]])?.with_uv(vec![
            Point2f::new(0.0, 0.0),
            Point2f::new(1.0, 0.0),
            Point2f::new(1.0, 1.0),
            Point2f::new(0.0, 1.0),
        ])
    }

    /// Sets per vertex texture coordinates.
    ///
    /// * `uv` - One texture coordinate per vertex.
    pub fn with_uv(self, uv: Vec<Point2f>) -> Result<Self> {
        if uv.len() != self.p.len() {
            return Err(Error::Scene(format!(
                "triangle mesh has {} texture coordinates for {} vertices",
                uv.len(),
                self.p.len()
            )));
        }
        Ok(Self { uv, ..self })
    }

    /// Returns the mesh as a shared `Shape`.
    pub fn into_arc(self) -> ArcShape {
        Arc::new(self)
    }

    /// Returns the vertices of a triangle.
    ///
    /// * `prim` - Triangle index.
    #[inline]
    fn vertices(&self, prim: usize) -> [Point3f; 3] {
        let [i0, i1, i2] = self.indices[prim];
        [
            self.p[i0 as usize],
            self.p[i1 as usize],
            self.p[i2 as usize],
        ]
    }

    /// Returns the area of a triangle.
    ///
    /// * `prim` - Triangle index.
    fn triangle_area(&self, prim: usize) -> Float {
        let [p0, p1, p2] = self.vertices(prim);
        0.5 * (p1 - p0).cross(&(p2 - p0)).length()
    }

    /// Returns the geometric and shading normal at barycentric coordinates.
    ///
    /// * `prim` - Triangle index.
    /// * `b1`   - Weight of the second vertex.
    /// * `b2`   - Weight of the third vertex.
    fn normals(&self, prim: usize, b1: Float, b2: Float) -> (Normal3f, Normal3f) {
        let [p0, p1, p2] = self.vertices(prim);
        let ng = (p1 - p0).cross(&(p2 - p0)).normalize();
        if self.n.is_empty() {
            return (ng, ng);
        }

        let [i0, i1, i2] = self.indices[prim];
        let b0 = 1.0 - b1 - b2;
        let ns = self.n[i0 as usize] * b0 + self.n[i1 as usize] * b1 + self.n[i2 as usize] * b2;
        if ns.length_squared() > 0.0 {
            (ng, ns.normalize())
        } else {
            (ng, ng)
        }
    }
}

impl Shape for TriangleMesh {
    fn prim_count(&self) -> usize {
        self.indices.len()
    }

    fn prim_bounds(&self, prim: u32) -> Bounds3f {
        let [p0, p1, p2] = self.vertices(prim as usize);
        Bounds3f::new(p0, p1).union(&p2)
    }

    /// Watertight ray-triangle intersection.
    fn intersect_prim(&self, prim: u32, ray: &Ray) -> Option<(Float, Point2f)> {
        let [p0, p1, p2] = self.vertices(prim as usize);

        // Translate vertices based on ray origin.
        let mut p0t = p0 - ray.o;
        let mut p1t = p1 - ray.o;
        let mut p2t = p2 - ray.o;

        // Permute components of triangle vertices and ray direction.
        let kz = ray.d.abs().max_dimension();
        let kx = kz + 1;
        let ky = kx + 1;
        let d = ray.d.permute(kx, ky, kz);
        p0t = p0t.permute(kx, ky, kz);
        p1t = p1t.permute(kx, ky, kz);
        p2t = p2t.permute(kx, ky, kz);

        // Apply shear transformation to translated vertex positions.
        let sx = -d.x / d.z;
        let sy = -d.y / d.z;
        let sz = 1.0 / d.z;
        p0t.x += sx * p0t.z;
        p0t.y += sy * p0t.z;
        p1t.x += sx * p1t.z;
        p1t.y += sy * p1t.z;
        p2t.x += sx * p2t.z;
        p2t.y += sy * p2t.z;

        // Compute edge function coefficients e0, e1, e2.
        let mut e0 = p1t.x * p2t.y - p1t.y * p2t.x;
        let mut e1 = p2t.x * p0t.y - p2t.y * p0t.x;
        let mut e2 = p0t.x * p1t.y - p0t.y * p1t.x;

        // Fallback to double-precision test at triangle edges.
        if size_of::<Float>() == size_of::<f32>() && (e0 == 0.0 || e1 == 0.0 || e2 == 0.0) {
            e0 = ((p1t.x as f64) * (p2t.y as f64) - (p1t.y as f64) * (p2t.x as f64)) as Float;
            e1 = ((p2t.x as f64) * (p0t.y as f64) - (p2t.y as f64) * (p0t.x as f64)) as Float;
            e2 = ((p0t.x as f64) * (p1t.y as f64) - (p0t.y as f64) * (p1t.x as f64)) as Float;
        }

        // Perform triangle edge and determinant tests.
        if (e0 < 0.0 || e1 < 0.0 || e2 < 0.0) && (e0 > 0.0 || e1 > 0.0 || e2 > 0.0) {
            return None;
        }
        let det = e0 + e1 + e2;
        if det == 0.0 {
            return None;
        }

        // Compute scaled hit distance and test against the ray's range.
        p0t.z *= sz;
        p1t.z *= sz;
        p2t.z *= sz;
        let t_scaled = e0 * p0t.z + e1 * p1t.z + e2 * p2t.z;
        if det < 0.0 && (t_scaled >= ray.t_min * det || t_scaled < ray.t_max * det) {
            return None;
        } else if det > 0.0 && (t_scaled <= ray.t_min * det || t_scaled > ray.t_max * det) {
            return None;
        }

        let inv_det = 1.0 / det;
        let b1 = e1 * inv_det;
        let b2 = e2 * inv_det;
        let t = t_scaled * inv_det;

        // Ensure that computed triangle `t` is conservatively greater than zero.
        let max_z_t = Vector3f::new(p0t.z, p1t.z, p2t.z).abs().max_component();
        let delta_z = gamma(3) * max_z_t;
        let max_x_t = Vector3f::new(p0t.x, p1t.x, p2t.x).abs().max_component();
        let max_y_t = Vector3f::new(p0t.y, p1t.y, p2t.y).abs().max_component();
        let delta_x = gamma(5) * (max_x_t + max_z_t);
        let delta_y = gamma(5) * (max_y_t + max_z_t);
        let delta_e = 2.0 * (gamma(2) * max_x_t * max_y_t + delta_y * max_x_t + delta_x * max_y_t);
        let max_e = Vector3f::new(e0, e1, e2).abs().max_component();
        let delta_t = 3.0
            * (gamma(3) * max_e * max_z_t + delta_e * max_z_t + delta_z * max_e)
            * inv_det.abs();
        if t <= delta_t {
            return None;
        }

        Some((t, Point2f::new(b1, b2)))
    }

    fn surface_point(&self, prim: u32, uv: &Point2f) -> SurfacePoint {
        let [p0, p1, p2] = self.vertices(prim as usize);
        let (b1, b2) = (uv.x, uv.y);
        let p = p0 * (1.0 - b1 - b2) + p1 * b1 + p2 * b2;
        let (ng, n) = self.normals(prim as usize, b1, b2);
        let tex = if self.uv.is_empty() {
            *uv
        } else {
            let [i0, i1, i2] = self.indices[prim as usize];
            self.uv[i0 as usize] * (1.0 - b1 - b2) + self.uv[i1 as usize] * b1 + self.uv[i2 as usize] * b2
        };
        SurfacePoint {
            p,
            ng,
            n,
            uv: tex,
            ..Default::default()
        }
    }

    fn area(&self) -> Float {
        self.area_cdf.last().copied().unwrap_or(0.0)
    }

    fn sample(&self, u_prim: Float, u: &Point2f) -> ShapeSample {
        let target = u_prim * self.area();
        let prim = self
            .area_cdf
            .partition_point(|&c| c <= target)
            .min(self.indices.len() - 1);

        let b = uniform_sample_triangle(u);
        let uv = Point2f::new(b.y, 1.0 - b.x - b.y);
        let sp = self.surface_point(prim as u32, &uv);
        ShapeSample {
            p: sp.p,
            n: sp.ng,
            pdf: 1.0 / self.area(),
        }
    }

    fn is_triangle_mesh(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn unit_quad() -> TriangleMesh {
        TriangleMesh::quad(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        )
        .unwrap()
    }

    fn first_hit(mesh: &TriangleMesh, ray: &Ray) -> Option<(u32, Float, Point2f)> {
        (0..mesh.prim_count() as u32)
            .filter_map(|prim| mesh.intersect_prim(prim, ray).map(|(t, uv)| (prim, t, uv)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    #[test]
    fn quad_has_unit_area_and_faces_up() {
        let quad = unit_quad();
        assert!(approx_eq!(f32, quad.area(), 1.0, epsilon = 1e-6));
        let sp = quad.surface_point(0, &Point2f::new(0.2, 0.2));
        assert_eq!(sp.ng, Normal3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn bad_indices_are_rejected() {
        let p = vec![Point3f::zero(); 3];
        assert!(TriangleMesh::new(p.clone(), vec![], vec![[0, 1, 3]]).is_err());
        assert!(TriangleMesh::new(p.clone(), vec![], vec![]).is_err());
        let mesh = TriangleMesh::new(p, vec![], vec![[0, 1, 2]]).unwrap();
        assert!(mesh.with_uv(vec![Point2f::new(0.0, 0.0)]).is_err());
    }

    #[test]
    fn ray_behind_quad_misses() {
        let ray = Ray::new(Point3f::new(0.5, 0.5, 1.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(first_hit(&unit_quad(), &ray).is_none());
    }

    proptest! {
        #[test]
        fn hit_point_matches_surface_point(x in 0.01f32..0.99, y in 0.01f32..0.99) {
            let quad = unit_quad();
            let ray = Ray::new(Point3f::new(x, y, 2.0), Vector3f::new(0.0, 0.0, -1.0));
            let (prim, t, uv) = first_hit(&quad, &ray).unwrap();
            prop_assert!((t - 2.0).abs() < 1e-5);
            let sp = quad.surface_point(prim, &uv);
            prop_assert!((sp.p - Point3f::new(x, y, 0.0)).length() < 1e-5);

            // The unit quad's texture coordinates match its positions.
            prop_assert!((sp.uv.x - x).abs() < 1e-5 && (sp.uv.y - y).abs() < 1e-5);
        }

        #[test]
        fn samples_lie_on_quad(w in 0.0f32..1.0, u in 0.0f32..1.0, v in 0.0f32..1.0) {
            let s = unit_quad().sample(w, &Point2f::new(u, v));
            prop_assert!(s.p.z.abs() < 1e-6);
            prop_assert!(s.p.x >= -1e-6 && s.p.x <= 1.0 + 1e-6);
            prop_assert!(s.p.y >= -1e-6 && s.p.y <= 1.0 + 1e-6);
        }
    }
}
