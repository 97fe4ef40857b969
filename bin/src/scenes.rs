//! Built-in scenes

use crate::options::SceneName;
use accelerators::{BVHAccel, SplitMethod};
use cameras::PinholeCamera;
use lights::{DiffuseAreaLight, GradientSky};
use materials::{Diffuse, Glass, Mirror};
use media::HomogeneousMedium;
use shapes::{Sphere, TriangleMesh};
use std::sync::Arc;
use textures::{ImageTexture, ImageWrap};
use wavefront_core::error::*;
use wavefront_core::geometry::*;
use wavefront_core::medium::VOID_MEDIUM;
use wavefront_core::scene::*;
use wavefront_core::shape::ArcShape;
use wavefront_core::spectrum::Spectrum;

/// Maximum primitives in a BVH leaf.
const MAX_PRIMS_IN_NODE: u8 = 4;

/// Builds a built-in scene.
///
/// * `name`   - The scene.
/// * `aspect` - Aspect ratio of the image.
pub fn build_scene(name: SceneName, aspect: Float) -> Result<Arc<Scene>> {
    let builder = match name {
        SceneName::Cornell => cornell(aspect)?,
        SceneName::Sky => sky(aspect)?,
        SceneName::Area => area(aspect)?,
    };
    let scene = builder
        .build(|instances| BVHAccel::build(instances, MAX_PRIMS_IN_NODE, SplitMethod::SAH))
        .with_context(|| format!("building scene {name:?}"))?;
    Ok(Arc::new(scene))
}

/// Returns a checkerboard texture with `n` x `n` squares.
///
/// * `n`    - Squares along each side.
/// * `even` - Color of squares with an even index sum.
/// * `odd`  - Color of the others.
fn checkerboard(n: usize, even: Spectrum, odd: Spectrum) -> Result<ImageTexture> {
    let texels = (0..n * n)
        .map(|i| if (i / n + i % n) % 2 == 0 { even } else { odd })
        .collect();
    ImageTexture::new(n, n, texels, ImageWrap::Repeat)
}

fn quad(p0: Point3f, p1: Point3f, p2: Point3f, p3: Point3f) -> Result<ArcShape> {
    Ok(TriangleMesh::quad(p0, p1, p2, p3)?.into_arc())
}

fn cornell(aspect: Float) -> Result<SceneBuilder> {
    let mut builder = SceneBuilder::new();
    builder.camera(
        PinholeCamera::new(
            Point3f::new(0.0, 0.0, 3.5),
            Point3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            40.0,
            aspect,
        )
        .into_arc(),
    );

    let white = builder.add_material(Arc::new(Diffuse::new(Spectrum::new(0.73))));
    let red = builder.add_material(Arc::new(Diffuse::new(Spectrum::from_rgb(0.65, 0.05, 0.05))));
    let green = builder.add_material(Arc::new(Diffuse::new(Spectrum::from_rgb(0.12, 0.45, 0.15))));
    let mirror = builder.add_material(Arc::new(Mirror::new(Spectrum::new(0.95))));
    let glass = builder.add_material(Arc::new(Glass::new(Spectrum::one(), 1.5)));

    let p = Point3f::new;
    let walls = [
        // Floor, ceiling and back.
        (quad(p(-1.0, -1.0, 1.0), p(1.0, -1.0, 1.0), p(1.0, -1.0, -1.0), p(-1.0, -1.0, -1.0))?, white),
        (quad(p(-1.0, 1.0, -1.0), p(1.0, 1.0, -1.0), p(1.0, 1.0, 1.0), p(-1.0, 1.0, 1.0))?, white),
        (quad(p(-1.0, -1.0, -1.0), p(1.0, -1.0, -1.0), p(1.0, 1.0, -1.0), p(-1.0, 1.0, -1.0))?, white),
        (quad(p(-1.0, -1.0, 1.0), p(-1.0, -1.0, -1.0), p(-1.0, 1.0, -1.0), p(-1.0, 1.0, 1.0))?, red),
        (quad(p(1.0, -1.0, -1.0), p(1.0, -1.0, 1.0), p(1.0, 1.0, 1.0), p(1.0, 1.0, -1.0))?, green),
    ];
    for (shape, material) in walls {
        builder.add_instance(Instance::new(shape, material));
    }

    let a = 0.25;
    let h = 0.99;
    let lamp = quad(p(-a, h, -a), p(a, h, -a), p(a, h, a), p(-a, h, a))?;
    let light = builder.add_area_light(Arc::new(DiffuseAreaLight::new(lamp.clone(), Spectrum::new(17.0), false)));
    builder.add_instance(Instance::new(lamp, white).with_light(light));

    builder.add_instance(Instance::new(Sphere::new(p(-0.45, -0.65, -0.3), 0.35).into_arc(), mirror));
    builder.add_instance(Instance::new(Sphere::new(p(0.45, -0.65, 0.25), 0.35).into_arc(), glass));
    Ok(builder)
}

fn sky(aspect: Float) -> Result<SceneBuilder> {
    let mut builder = SceneBuilder::new();
    builder.camera(
        PinholeCamera::new(
            Point3f::new(0.0, -6.0, 1.5),
            Point3f::new(0.0, 0.0, 0.8),
            Vector3f::new(0.0, 0.0, 1.0),
            35.0,
            aspect,
        )
        .into_arc(),
    );
    builder.envir_light(Arc::new(GradientSky::new(
        Spectrum::from_rgb(0.3, 0.25, 0.2),
        Spectrum::from_rgb(0.5, 0.7, 1.0),
        Vector3f::new(0.0, 0.0, 1.0),
    )));

    let tiles = checkerboard(16, Spectrum::new(0.6), Spectrum::new(0.2))?;
    let ground = builder.add_material(Arc::new(Diffuse::from_texture(tiles.into_arc())));
    let ball = builder.add_material(Arc::new(Diffuse::new(Spectrum::from_rgb(0.8, 0.3, 0.2))));

    let p = Point3f::new;
    let s = 20.0;
    builder.add_instance(Instance::new(
        quad(p(-s, -s, 0.0), p(s, -s, 0.0), p(s, s, 0.0), p(-s, s, 0.0))?,
        ground,
    ));
    let unit = Sphere::new(Point3f::zero(), 1.0).into_arc();
    builder.add_instance(
        Instance::new(unit, ball).with_transform(Transform::translate(&Vector3f::new(0.0, 0.0, 1.0))),
    );
    Ok(builder)
}

fn area(aspect: Float) -> Result<SceneBuilder> {
    let mut builder = SceneBuilder::new();
    builder.camera(
        PinholeCamera::new(
            Point3f::new(0.0, -5.0, 2.0),
            Point3f::new(0.0, 0.0, 0.5),
            Vector3f::new(0.0, 0.0, 1.0),
            40.0,
            aspect,
        )
        .into_arc(),
    );

    let floor = builder.add_material(Arc::new(Diffuse::new(Spectrum::new(0.6))));
    let glass = builder.add_material(Arc::new(Glass::new(Spectrum::one(), 1.33)));
    let black = builder.add_material(Arc::new(materials::Black));
    let ink = builder.add_medium(Arc::new(HomogeneousMedium::absorbing(Spectrum::from_rgb(
        0.1, 0.6, 1.2,
    ))));

    let p = Point3f::new;
    let s = 5.0;
    builder.add_instance(Instance::new(
        quad(p(-s, -s, 0.0), p(s, -s, 0.0), p(s, s, 0.0), p(-s, s, 0.0))?,
        floor,
    ));
    builder.add_instance(
        Instance::new(Sphere::new(p(0.0, 0.0, 0.75), 0.75).into_arc(), glass)
            .with_media(ink, VOID_MEDIUM),
    );

    let bulb = Sphere::new(Point3f::zero(), 1.0).into_arc();
    let placed = Transform::translate(&Vector3f::new(1.5, 1.0, 3.0)) * Transform::scale(0.4);
    let light = builder.add_area_light(Arc::new(
        DiffuseAreaLight::new(bulb.clone(), Spectrum::new(30.0), false).with_transform(placed),
    ));
    builder.add_instance(Instance::new(bulb, black).with_light(light).with_transform(placed));
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scene_builds() {
        for name in [SceneName::Cornell, SceneName::Sky, SceneName::Area] {
            let scene = build_scene(name, 1.0).unwrap();
            assert!(!scene.instances.is_empty());
        }
    }

    #[test]
    fn cornell_has_one_area_light_and_no_sky() {
        let scene = build_scene(SceneName::Cornell, 1.0).unwrap();
        assert_eq!(scene.area_lights.len(), 1);
        assert!(scene.envir_light.is_none());
        assert!(!scene.is_triangle_only());
    }

    #[test]
    fn checkerboard_alternates() {
        let board = checkerboard(2, Spectrum::one(), Spectrum::zero()).unwrap();
        use wavefront_core::texture::Texture2D;
        assert_eq!(board.sample_float(&Point2f::new(0.25, 0.25)), 1.0);
        assert_eq!(board.sample_float(&Point2f::new(0.75, 0.25)), 0.0);
        assert_eq!(board.sample_float(&Point2f::new(0.75, 0.75)), 1.0);
    }

    #[test]
    fn area_bulb_is_placed_by_its_transform() {
        let scene = build_scene(SceneName::Area, 1.0).unwrap();
        let bulb = scene.instances.iter().find(|i| i.light_id.is_some()).unwrap();
        let b = bulb.prim_bounds(0);
        assert!((b.p_max.z - 3.4).abs() < 1e-4);
        assert!((b.p_min.x - 1.1).abs() < 1e-4);
    }
}
