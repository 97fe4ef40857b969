//! Scene

use crate::camera::*;
use crate::error::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::material::*;
use crate::medium::*;
use crate::shape::*;
use crate::traversal::*;
use std::sync::Arc;

/// A shape placed in the scene together with its shading bindings.
#[derive(Clone)]
pub struct Instance {
    /// The geometry.
    pub shape: ArcShape,

    /// Id of the material.
    pub material_id: u32,

    /// Id of the area light bound to the surface, if any.
    pub light_id: Option<u32>,

    /// Id of the medium inside the shape.
    pub inner_medium: u32,

    /// Id of the medium outside the shape.
    pub outer_medium: u32,

    /// Visibility mask tested against the ray mask.
    pub mask: u32,

    /// Maps the shape's object space to world space.
    pub transform: Transform,
}

impl Instance {
    /// Create a new `Instance` surrounded by vacuum and visible to every ray.
    ///
    /// * `shape`       - The geometry.
    /// * `material_id` - Id of the material.
    pub fn new(shape: ArcShape, material_id: u32) -> Self {
        Self {
            shape,
            material_id,
            light_id: None,
            inner_medium: VOID_MEDIUM,
            outer_medium: VOID_MEDIUM,
            mask: RAY_MASK_ALL,
            transform: Transform::identity(),
        }
    }

    /// Binds an area light to the instance.
    ///
    /// * `light_id` - Id of the area light.
    pub fn with_light(self, light_id: u32) -> Self {
        Self {
            light_id: Some(light_id),
            ..self
        }
    }

    /// Sets the media on both sides of the surface.
    ///
    /// * `inner` - Id of the medium inside.
    /// * `outer` - Id of the medium outside.
    pub fn with_media(self, inner: u32, outer: u32) -> Self {
        Self {
            inner_medium: inner,
            outer_medium: outer,
            ..self
        }
    }

    /// Sets the visibility mask.
    ///
    /// * `mask` - The mask.
    pub fn with_mask(self, mask: u32) -> Self {
        Self { mask, ..self }
    }

    /// Places the shape in the world.
    ///
    /// * `transform` - Object to world transformation.
    pub fn with_transform(self, transform: Transform) -> Self {
        Self { transform, ..self }
    }

    /// Returns the world space bounds of a primitive.
    ///
    /// * `prim` - Primitive index.
    pub fn prim_bounds(&self, prim: u32) -> Bounds3f {
        let b = self.shape.prim_bounds(prim);
        if self.transform.is_identity() {
            b
        } else {
            self.transform.transform_bounds(&b)
        }
    }

    /// Intersects a primitive with a world space ray. The hit distance is
    /// measured along the world space ray.
    ///
    /// * `prim` - Primitive index.
    /// * `ray`  - The ray.
    pub fn intersect_prim(&self, prim: u32, ray: &Ray) -> Option<(Float, Point2f)> {
        if self.transform.is_identity() {
            self.shape.intersect_prim(prim, ray)
        } else {
            let local = self.transform.inverse().transform_ray(ray);
            self.shape.intersect_prim(prim, &local)
        }
    }

    /// Reconstructs the world space surface point of a primitive.
    ///
    /// * `prim` - Primitive index.
    /// * `uv`   - Parametric coordinates returned by `intersect_prim`.
    pub fn surface_point(&self, prim: u32, uv: &Point2f) -> SurfacePoint {
        let sp = self.shape.surface_point(prim, uv);
        if self.transform.is_identity() {
            sp
        } else {
            SurfacePoint {
                p: self.transform.transform_point(&sp.p),
                ng: self.transform.transform_normal(&sp.ng),
                n: self.transform.transform_normal(&sp.n),
                ..sp
            }
        }
    }

    /// Returns the medium a direction leaving the surface travels into.
    ///
    /// * `sp` - Point on the surface.
    /// * `w`  - Direction pointing away from the surface.
    pub fn medium_towards(&self, sp: &SurfacePoint, w: &Vector3f) -> u32 {
        if sp.is_outside(w) {
            self.outer_medium
        } else {
            self.inner_medium
        }
    }
}

/// Everything the pipeline stages read while rendering.
pub struct Scene {
    /// The camera.
    pub camera: ArcCamera,

    /// Acceleration structure over the instances.
    pub traversal: ArcTraversal,

    /// Instances indexed by instance id.
    pub instances: Vec<Instance>,

    /// Materials indexed by material id.
    pub materials: Vec<ArcMaterial>,

    /// Area lights indexed by light id.
    pub area_lights: Vec<ArcAreaLight>,

    /// The environment light.
    pub envir_light: Option<ArcEnvirLight>,

    /// Media indexed by medium id.
    pub media: Vec<ArcMedium>,

    /// Chooses lights for next-event estimation.
    pub light_sampler: ArcLightSampler,

    /// Whether ray times must be sampled.
    pub has_motion_blur: bool,

    /// The bounding box of the scene geometry.
    pub world_bound: Bounds3f,
}

impl Scene {
    /// Returns true if every instance is a triangle mesh.
    pub fn is_triangle_only(&self) -> bool {
        self.instances.iter().all(|i| i.shape.is_triangle_mesh())
    }

    /// Returns an instance by id.
    ///
    /// * `id` - Instance id.
    pub fn instance(&self, id: u32) -> Result<&Instance> {
        self.instances
            .get(id as usize)
            .ok_or_else(|| Error::UnreachableDispatch {
                switch: "instance".to_string(),
                id,
                cases: self.instances.len(),
            })
    }

    /// Rebuilds the surface point of a traversal hit.
    ///
    /// * `instance_id` - Instance that was hit.
    /// * `prim_id`     - Primitive that was hit.
    /// * `uv`          - Parametric coordinates of the hit.
    /// * `time`        - Time of the ray.
    pub fn surface_point(
        &self,
        instance_id: u32,
        prim_id: u32,
        uv: &Point2f,
        time: Float,
    ) -> Result<SurfacePoint> {
        let instance = self.instance(instance_id)?;
        let sp = instance.surface_point(prim_id, uv);
        Ok(SurfacePoint {
            instance_id,
            prim_id,
            time,
            ..sp
        })
    }

    /// Returns the length of the world bounds diagonal; used as the segment
    /// length of rays that never hit anything.
    pub fn world_diagonal(&self) -> Float {
        self.world_bound.diagonal().length()
    }
}

/// Builds a `Scene` and checks that every id it references exists.
#[derive(Default)]
pub struct SceneBuilder {
    camera: Option<ArcCamera>,
    instances: Vec<Instance>,
    materials: Vec<ArcMaterial>,
    area_lights: Vec<ArcAreaLight>,
    envir_light: Option<ArcEnvirLight>,
    media: Vec<ArcMedium>,
    motion_blur: bool,
}

impl SceneBuilder {
    /// Create a new empty `SceneBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the camera.
    ///
    /// * `camera` - The camera.
    pub fn camera(&mut self, camera: ArcCamera) -> &mut Self {
        self.camera = Some(camera);
        self
    }

    /// Adds a material and returns its id.
    ///
    /// * `material` - The material.
    pub fn add_material(&mut self, material: ArcMaterial) -> u32 {
        self.materials.push(material);
        (self.materials.len() - 1) as u32
    }

    /// Adds an area light and returns its id.
    ///
    /// * `light` - The light.
    pub fn add_area_light(&mut self, light: ArcAreaLight) -> u32 {
        self.area_lights.push(light);
        (self.area_lights.len() - 1) as u32
    }

    /// Sets the environment light.
    ///
    /// * `light` - The light.
    pub fn envir_light(&mut self, light: ArcEnvirLight) -> &mut Self {
        self.envir_light = Some(light);
        self
    }

    /// Adds a medium and returns its id.
    ///
    /// * `medium` - The medium.
    pub fn add_medium(&mut self, medium: ArcMedium) -> u32 {
        self.media.push(medium);
        (self.media.len() - 1) as u32
    }

    /// Adds an instance and returns its id.
    ///
    /// * `instance` - The instance.
    pub fn add_instance(&mut self, instance: Instance) -> u32 {
        self.instances.push(instance);
        (self.instances.len() - 1) as u32
    }

    /// Enables sampling of ray times.
    ///
    /// * `enabled` - Whether the scene has motion blur.
    pub fn motion_blur(&mut self, enabled: bool) -> &mut Self {
        self.motion_blur = enabled;
        self
    }

    /// Validates the bindings and builds the scene.
    ///
    /// * `accel` - Builds the acceleration structure over the instances.
    pub fn build<F>(self, accel: F) -> Result<Scene>
    where
        F: FnOnce(&[Instance]) -> ArcTraversal,
    {
        let camera = self
            .camera
            .ok_or_else(|| Error::Scene("scene has no camera".to_string()))?;

        let check_medium = |id: u32, what: &str| -> Result<()> {
            if id != VOID_MEDIUM && id as usize >= self.media.len() {
                Err(Error::Scene(format!("{what} medium id {id} does not exist")))
            } else {
                Ok(())
            }
        };
        check_medium(camera.medium_id(), "camera")?;

        for (i, instance) in self.instances.iter().enumerate() {
            if instance.material_id as usize >= self.materials.len() {
                return Err(Error::Scene(format!(
                    "instance {i} references material {} which does not exist",
                    instance.material_id
                )));
            }
            if let Some(light_id) = instance.light_id {
                if light_id as usize >= self.area_lights.len() {
                    return Err(Error::Scene(format!(
                        "instance {i} references area light {light_id} which does not exist"
                    )));
                }
            }
            check_medium(instance.inner_medium, "inner")?;
            check_medium(instance.outer_medium, "outer")?;
        }

        let traversal = accel(&self.instances);
        let world_bound = traversal.world_bound();
        let light_sampler = Arc::new(UniformLightSampler::new(
            self.area_lights.len(),
            self.envir_light.is_some(),
        ));

        info!(
            "Built scene with {} instances, {} materials, {} area lights, {} media",
            self.instances.len(),
            self.materials.len(),
            self.area_lights.len(),
            self.media.len()
        );

        Ok(Scene {
            camera,
            traversal,
            instances: self.instances,
            materials: self.materials,
            area_lights: self.area_lights,
            envir_light: self.envir_light,
            media: self.media,
            light_sampler,
            has_motion_blur: self.motion_blur,
            world_bound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeSample;

    /// The unit square in the z = 0 plane.
    struct Tile;

    impl Shape for Tile {
        fn prim_count(&self) -> usize {
            1
        }

        fn prim_bounds(&self, _prim: u32) -> Bounds3f {
            Bounds3f::new(Point3f::zero(), Point3f::new(1.0, 1.0, 0.0))
        }

        fn intersect_prim(&self, _prim: u32, ray: &Ray) -> Option<(Float, Point2f)> {
            if ray.d.z == 0.0 {
                return None;
            }
            let t = -ray.o.z / ray.d.z;
            let p = ray.at(t);
            let inside = (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y);
            (t > ray.t_min && t < ray.t_max && inside).then(|| (t, Point2f::new(p.x, p.y)))
        }

        fn surface_point(&self, _prim: u32, uv: &Point2f) -> SurfacePoint {
            SurfacePoint {
                p: Point3f::new(uv.x, uv.y, 0.0),
                ng: Normal3f::new(0.0, 0.0, 1.0),
                n: Normal3f::new(0.0, 0.0, 1.0),
                uv: *uv,
                ..Default::default()
            }
        }

        fn area(&self) -> Float {
            1.0
        }

        fn sample(&self, _u_prim: Float, u: &Point2f) -> ShapeSample {
            ShapeSample {
                p: Point3f::new(u.x, u.y, 0.0),
                n: Normal3f::new(0.0, 0.0, 1.0),
                pdf: 1.0,
            }
        }
    }

    fn placed() -> Instance {
        let transform = Transform::translate(&Vector3f::new(0.0, 0.0, -2.0))
            * Transform::rotate(180.0, &Vector3f::new(1.0, 0.0, 0.0))
            * Transform::scale(2.0);
        Instance::new(Arc::new(Tile), 0).with_transform(transform)
    }

    fn close(a: &Vector3f, b: &Vector3f) -> bool {
        (*a - *b).length() < 1e-4
    }

    #[test]
    fn surface_points_are_in_world_space() {
        let sp = placed().surface_point(0, &Point2f::new(0.5, 0.5));
        assert!(close(&sp.p, &Point3f::new(1.0, -1.0, -2.0)));
        assert!(close(&sp.ng, &Normal3f::new(0.0, 0.0, -1.0)));
        assert!(close(&sp.n, &Normal3f::new(0.0, 0.0, -1.0)));
        assert_eq!(sp.uv, Point2f::new(0.5, 0.5));
    }

    #[test]
    fn hits_are_measured_along_the_world_ray() {
        let instance = placed();
        let ray = Ray::new(Point3f::new(1.0, -1.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        let (t, uv) = instance.intersect_prim(0, &ray).unwrap();
        assert!((t - 2.0).abs() < 1e-4);
        assert!(close(&Vector3f::new(uv.x, uv.y, 0.0), &Vector3f::new(0.5, 0.5, 0.0)));
        assert!(instance.intersect_prim(0, &ray.with_t_max(1.5)).is_none());

        let untransformed = Instance::new(Arc::new(Tile), 0);
        assert!(untransformed.intersect_prim(0, &ray).is_none());
    }

    #[test]
    fn prim_bounds_follow_the_transform() {
        let b = placed().prim_bounds(0);
        assert!(close(&b.p_min, &Point3f::new(0.0, -2.0, -2.0)));
        assert!(close(&b.p_max, &Point3f::new(2.0, 0.0, -2.0)));
        assert_eq!(Instance::new(Arc::new(Tile), 0).prim_bounds(0), Tile.prim_bounds(0));
    }
}
