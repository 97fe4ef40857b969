use accelerators::{BVHAccel, SplitMethod};
use cameras::PinholeCamera;
use float_cmp::approx_eq;
use integrators::*;
use lights::{DiffuseAreaLight, UniformSky};
use materials::{Black, Diffuse};
use media::HomogeneousMedium;
use proptest::prelude::*;
use shapes::{Sphere, TriangleMesh};
use std::sync::Arc;
use wavefront_core::device::Device;
use wavefront_core::error::Error;
use wavefront_core::film::Film;
use wavefront_core::geometry::*;
use wavefront_core::material::ArcMaterial;
use wavefront_core::renderer::*;
use wavefront_core::scene::*;
use wavefront_core::spectrum::Spectrum;

fn camera() -> PinholeCamera {
    PinholeCamera::new(
        Point3f::new(0.0, 0.0, 0.0),
        Point3f::new(0.0, 0.0, -1.0),
        Vector3f::new(0.0, 1.0, 0.0),
        60.0,
        1.0,
    )
}

fn build(builder: SceneBuilder) -> Arc<Scene> {
    Arc::new(
        builder
            .build(|instances| BVHAccel::build(instances, 4, SplitMethod::SAH))
            .unwrap(),
    )
}

/// A two-sided emissive quad that fills the view.
fn quad_scene(material: ArcMaterial, le: Spectrum) -> Arc<Scene> {
    let quad = TriangleMesh::quad(
        Point3f::new(-10.0, -10.0, -1.0),
        Point3f::new(10.0, -10.0, -1.0),
        Point3f::new(10.0, 10.0, -1.0),
        Point3f::new(-10.0, 10.0, -1.0),
    )
    .unwrap()
    .into_arc();

    let mut builder = SceneBuilder::new();
    builder.camera(camera().into_arc());
    let material_id = builder.add_material(material);
    let light_id = builder.add_area_light(Arc::new(DiffuseAreaLight::new(quad.clone(), le, true)));
    builder.add_instance(Instance::new(quad, material_id).with_light(light_id));
    build(builder)
}

/// A diffuse sphere that fills the view under a uniform sky.
fn furnace_scene(albedo: Float) -> Arc<Scene> {
    let mut builder = SceneBuilder::new();
    builder.camera(camera().into_arc());
    builder.envir_light(Arc::new(UniformSky::new(Spectrum::one())));
    let material_id = builder.add_material(Arc::new(Diffuse::new(Spectrum::new(albedo))));
    builder.add_instance(Instance::new(
        Sphere::new(Point3f::new(0.0, 0.0, -3.0), 2.0).into_arc(),
        material_id,
    ));
    build(builder)
}

fn params(width: u32, height: u32, spp: u32, state_count: u32) -> RendererParams {
    RendererParams {
        width,
        height,
        spp,
        state_count,
        ..Default::default()
    }
}

#[test]
fn emissive_black_quad_returns_le() {
    let le = Spectrum::from_rgb(1.0, 2.0, 3.0);
    let scene = quad_scene(Arc::new(Black), le);
    let tracer = WavefrontPathTracer::new(params(1, 1, 8, 8), scene).unwrap();

    let mut pipeline = tracer.build_pipeline().unwrap();
    let stats = pipeline.iterate().unwrap();
    assert_eq!(stats.spawned, 8);
    assert_eq!(stats.shadow_rays, 0);
    assert_eq!(stats.active_after, 0);
    assert_eq!(stats.terminated, 8);
    assert!(pipeline.is_done());
    assert_eq!(pipeline.film().total_weight(), 8.0);

    let result = pipeline.result(true);
    let l = result.radiance.get(0, 0);
    for c in 0..3 {
        assert!(approx_eq!(f32, l[c], le[c], epsilon = 1e-5));
    }
}

#[test]
fn single_sample_at_depth_limit_sees_emission_once() {
    let le = Spectrum::from_rgb(3.0, 0.5, 0.0);
    let scene = quad_scene(Arc::new(Diffuse::new(Spectrum::new(0.5))), le);
    let p = RendererParams {
        min_depth: 1,
        max_depth: 1,
        ..params(1, 1, 1, 1)
    };
    let tracer = WavefrontPathTracer::new(p, scene).unwrap();
    let mut pipeline = tracer.build_pipeline().unwrap();
    while !pipeline.is_done() {
        pipeline.iterate().unwrap();
    }
    assert_eq!(pipeline.film().weight(&Point2u::new(0, 0)), 1.0);

    // The light is the only surface, so every bounce leaves the scene.
    let l = pipeline.result(true).radiance.get(0, 0);
    for c in 0..3 {
        assert!(approx_eq!(f32, l[c], le[c], epsilon = 1e-5));
    }
}

#[test]
fn render_loop_matches_single_iteration() {
    let le = Spectrum::from_rgb(0.5, 0.25, 4.0);
    let scene = quad_scene(Arc::new(Black), le);
    let tracer = WavefrontPathTracer::new(params(3, 2, 2, 5), scene).unwrap();
    let result = tracer.render(&StopToken::new()).unwrap();
    assert!(result.complete);
    assert!(result.albedo.is_none());
    for y in 0..2 {
        for x in 0..3 {
            let l = result.radiance.get(x, y);
            assert!(approx_eq!(f32, l[2], 4.0, epsilon = 1e-5));
        }
    }
}

#[test]
fn weight_plus_active_equals_spawned() {
    let scene = furnace_scene(0.8);
    let tracer = WavefrontPathTracer::new(params(4, 4, 4, 16), scene).unwrap();
    let mut pipeline = tracer.build_pipeline().unwrap();

    while !pipeline.is_done() {
        let stats = pipeline.iterate().unwrap();
        assert!(stats.active_before + stats.spawned <= 16);
        assert_eq!(
            pipeline.film().total_weight() as u64 + pipeline.active_state_count() as u64,
            pipeline.spawned()
        );
        assert_eq!(pipeline.finished() + pipeline.active_state_count() as u64, pipeline.spawned());
        assert!(pipeline.iteration() < 1000);
    }
    assert_eq!(pipeline.spawned(), 64);
    assert_eq!(pipeline.film().total_weight(), 64.0);
}

#[test]
fn single_state_renders_every_sample() {
    let scene = furnace_scene(0.5);
    let tracer = WavefrontPathTracer::new(params(1, 1, 4, 1), scene).unwrap();
    let mut pipeline = tracer.build_pipeline().unwrap();

    while !pipeline.is_done() {
        let stats = pipeline.iterate().unwrap();
        assert!(stats.spawned <= 1);
        assert!(stats.active_after <= 1);
    }
    assert_eq!(pipeline.finished(), 4);
    assert_eq!(pipeline.film().weight(&Point2u::new(0, 0)), 4.0);
}

#[test]
fn sky_seen_directly_is_exact() {
    let mut builder = SceneBuilder::new();
    builder.camera(camera().into_arc());
    builder.envir_light(Arc::new(UniformSky::new(Spectrum::from_rgb(0.1, 0.2, 0.3))));
    let scene = build(builder);

    let tracer = WavefrontPathTracer::new(params(2, 2, 3, 4), scene).unwrap();
    let result = tracer.render(&StopToken::new()).unwrap();
    for y in 0..2 {
        for x in 0..2 {
            let l = result.radiance.get(x, y);
            assert!(approx_eq!(f32, l[0], 0.1, epsilon = 1e-5));
            assert!(approx_eq!(f32, l[1], 0.2, epsilon = 1e-5));
            assert!(approx_eq!(f32, l[2], 0.3, epsilon = 1e-5));
        }
    }
}

#[test]
fn convex_diffuse_under_uniform_sky_reflects_albedo() {
    let scene = furnace_scene(0.5);
    let p = RendererParams {
        min_depth: 10,
        ..params(1, 1, 4096, 512)
    };
    let tracer = WavefrontPathTracer::new(p, scene).unwrap();
    let result = tracer.render(&StopToken::new()).unwrap();
    let l = result.radiance.get(0, 0);
    assert!((l[0] - 0.5).abs() < 0.05, "radiance {:?}", l);
}

#[test]
fn absorbing_medium_attenuates_the_sky() {
    let mut builder = SceneBuilder::new();
    let medium = builder.add_medium(Arc::new(HomogeneousMedium::absorbing(Spectrum::new(0.5))));
    builder.camera(camera().with_medium(medium).into_arc());
    builder.envir_light(Arc::new(UniformSky::new(Spectrum::one())));
    // Something must bound the world for escaped rays to travel through.
    let material_id = builder.add_material(Arc::new(Black));
    builder.add_instance(Instance::new(
        Sphere::new(Point3f::new(0.0, 0.0, 10.0), 1.0).into_arc(),
        material_id,
    ));
    let scene = build(builder);
    let diagonal = scene.world_diagonal();

    let tracer = WavefrontPathTracer::new(params(1, 1, 1, 1), scene).unwrap();
    let result = tracer.render(&StopToken::new()).unwrap();
    let l = result.radiance.get(0, 0);
    assert!(approx_eq!(f32, l[0], (-0.5 * diagonal).exp(), epsilon = 1e-4));
}

#[test]
fn albedo_and_normal_channels_are_filled_at_first_hit() {
    let color = Spectrum::from_rgb(0.25, 0.5, 0.75);
    let scene = quad_scene(Arc::new(Diffuse::new(color)), Spectrum::zero());
    let p = RendererParams {
        albedo: true,
        normal: true,
        ..params(2, 2, 2, 8)
    };
    let tracer = WavefrontPathTracer::new(p, scene).unwrap();
    let result = tracer.render(&StopToken::new()).unwrap();

    let albedo = result.albedo.unwrap();
    let a = albedo.get(1, 1);
    for c in 0..3 {
        assert!(approx_eq!(f32, a[c], color[c], epsilon = 1e-5));
    }

    let normal = result.normal.unwrap();
    let n = normal.get(0, 0);
    assert!(approx_eq!(f32, n[0], 0.5, epsilon = 1e-5));
    assert!(approx_eq!(f32, n[1], 0.5, epsilon = 1e-5));
    assert!((n[2] - 0.5).abs() > 0.49);
}

#[test]
fn unknown_instance_id_fails_the_shade_launch() {
    let scene = quad_scene(Arc::new(Black), Spectrum::one());
    let film = Arc::new(Film::new(1, 1, false, false));
    let device = Device::new();

    let mut soa = PathState::new();
    soa.initialize(4);
    let mut generate = GeneratePipeline::new(scene.camera.clone(), Point2u::new(1, 1), 4, 4, false);
    let trace = TracePipeline::new(scene.traversal.clone(), false, scene.is_triangle_only());
    let shade = ShadePipeline::new(
        film,
        scene.clone(),
        ShadeParams {
            min_depth: 5,
            max_depth: 10,
            rr_threshold: 0.2,
            rr_cont_prob: 0.6,
        },
    )
    .unwrap();

    let active = generate.generate(&device, 0, &mut soa).unwrap();
    trace.trace(&device, active, &mut soa).unwrap();
    for id in soa.inct_uv_id.iter_mut() {
        id[2] = 99;
    }

    match shade.shade(&device, active, &mut soa) {
        Err(Error::KernelLaunch { kernel, source }) => {
            assert_eq!(kernel, "shade");
            assert!(matches!(
                *source,
                Error::UnreachableDispatch { ref switch, id: 99, cases: 1 } if switch == "instance"
            ));
        }
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }
}

#[test]
fn stopped_render_is_incomplete() {
    let scene = furnace_scene(0.5);
    let tracer = WavefrontPathTracer::new(params(2, 2, 4, 4), scene).unwrap();
    let stop = StopToken::new();
    stop.stop();
    let result = tracer.render(&stop).unwrap();
    assert!(!result.complete);
    assert_eq!(result.radiance.get(0, 0), Spectrum::zero());
}

#[test]
fn invalid_params_are_rejected_before_building() {
    let scene = furnace_scene(0.5);
    assert!(matches!(
        WavefrontPathTracer::new(params(1, 1, 0, 4), scene),
        Err(Error::Config(_))
    ));
}

#[test]
fn async_render_delivers_result() {
    let le = Spectrum::new(2.0);
    let scene = quad_scene(Arc::new(Black), le);
    let tracer = WavefrontPathTracer::new(params(2, 2, 2, 4), scene).unwrap();
    let renderer = AsyncRenderer::new(Arc::new(tracer));
    renderer.render_async().unwrap();
    let result = renderer.wait_async().unwrap();
    assert!(result.complete);
    assert!(approx_eq!(f32, result.radiance.get(1, 0)[0], 2.0, epsilon = 1e-5));
}

#[test]
fn transformed_light_is_seen_in_place() {
    let le = Spectrum::from_rgb(1.0, 0.5, 0.25);
    let tile = TriangleMesh::quad(
        Point3f::new(-1.0, -1.0, 0.0),
        Point3f::new(1.0, -1.0, 0.0),
        Point3f::new(1.0, 1.0, 0.0),
        Point3f::new(-1.0, 1.0, 0.0),
    )
    .unwrap()
    .into_arc();
    let placed = Transform::translate(&Vector3f::new(0.0, 0.0, -1.0)) * Transform::scale(10.0);

    let mut builder = SceneBuilder::new();
    builder.camera(camera().into_arc());
    let material_id = builder.add_material(Arc::new(Black));
    let light_id = builder.add_area_light(Arc::new(
        DiffuseAreaLight::new(tile.clone(), le, true).with_transform(placed),
    ));
    builder.add_instance(Instance::new(tile, material_id).with_light(light_id).with_transform(placed));
    let scene = build(builder);

    let tracer = WavefrontPathTracer::new(params(2, 2, 2, 4), scene).unwrap();
    let result = tracer.render(&StopToken::new()).unwrap();
    let l = result.radiance.get(1, 1);
    for c in 0..3 {
        assert!(approx_eq!(f32, l[c], le[c], epsilon = 1e-5));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_sample_is_splatted_once(state_count in 1u32..24, spp in 1u32..5) {
        let tracer = WavefrontPathTracer::new(params(2, 2, spp, state_count), furnace_scene(0.8)).unwrap();
        let mut pipeline = tracer.build_pipeline().unwrap();

        while !pipeline.is_done() {
            let stats = pipeline.iterate().unwrap();
            prop_assert!(stats.active_before + stats.spawned <= state_count as usize);
            prop_assert_eq!(
                pipeline.film().total_weight() as u64 + pipeline.active_state_count() as u64,
                pipeline.spawned()
            );
        }
        prop_assert_eq!(pipeline.spawned(), 4 * spp as u64);
        prop_assert_eq!(pipeline.film().total_weight(), (4 * spp) as Float);
    }
}
