use accelerators::{BVHAccel, SplitMethod};
use cameras::PinholeCamera;
use float_cmp::approx_eq;
use integrators::*;
use lights::UniformSky;
use materials::{Black, Diffuse};
use shapes::{Sphere, TriangleMesh};
use std::sync::Arc;
use wavefront_core::device::Device;
use wavefront_core::film::Film;
use wavefront_core::geometry::*;
use wavefront_core::medium::VOID_MEDIUM;
use wavefront_core::rng::RNG;
use wavefront_core::scene::*;
use wavefront_core::spectrum::Spectrum;

const STATES: usize = 64;

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
            .build(|instances| BVHAccel::build(instances, 4, SplitMethod::Middle))
            .unwrap(),
    )
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

/// A black wall at z = -1.
fn wall_scene() -> Arc<Scene> {
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
    let material_id = builder.add_material(Arc::new(Black));
    builder.add_instance(Instance::new(quad, material_id));
    build(builder)
}

/// Generates and traces one full pool of camera paths for a 1x1 film, then
/// shades them.
fn shade_once(scene: Arc<Scene>, film: Arc<Film>, params: ShadeParams) -> (PathState, ShadeCounters, usize) {
    let device = Device::new();
    let mut soa = PathState::new();
    soa.initialize(STATES);

    let mut generate = GeneratePipeline::new(scene.camera.clone(), Point2u::new(1, 1), STATES as u32, STATES, false);
    let trace = TracePipeline::new(scene.traversal.clone(), false, scene.is_triangle_only());
    let shade = ShadePipeline::new(film, scene, params).unwrap();

    let active = generate.generate(&device, 0, &mut soa).unwrap();
    trace.trace(&device, active, &mut soa).unwrap();
    let counters = shade.shade(&device, active, &mut soa).unwrap();
    (soa, counters, active)
}

fn shadow_record(pixel: Point2u, d: Vector3f, beta_li: Spectrum) -> ShadowRecord {
    ShadowRecord {
        pixel_coord: pixel,
        ray_o: Point3f::zero(),
        ray_d: d,
        ray_time: 0.0,
        ray_t1: 5.0,
        ray_mask: RAY_MASK_ALL,
        medium_id: VOID_MEDIUM,
        beta_li,
        rng: RNG::new(1),
    }
}

#[test]
fn zero_throughput_terminates_every_path() {
    let film = Arc::new(Film::new(1, 1, false, false));
    let params = ShadeParams {
        min_depth: 5,
        max_depth: 10,
        rr_threshold: 0.2,
        rr_cont_prob: 0.6,
    };
    let (_, counters, active) = shade_once(furnace_scene(0.0), film.clone(), params);

    assert_eq!(active, STATES);
    assert_eq!(counters, ShadeCounters::default());
    assert_eq!(film.total_weight(), active as Float);
    assert_eq!(film.radiance_image().get(0, 0), Spectrum::zero());
}

#[test]
fn russian_roulette_reweights_survivors() {
    let film = Arc::new(Film::new(1, 1, false, false));
    let params = ShadeParams {
        min_depth: 0,
        max_depth: 10,
        rr_threshold: 1e9,
        rr_cont_prob: 0.5,
    };
    let (soa, counters, active) = shade_once(furnace_scene(0.5), film.clone(), params);

    let survivors = counters.active_state_counter;
    assert!(survivors > 0 && survivors < active, "{} survivors", survivors);
    assert_eq!(film.total_weight() as usize + survivors, active);

    // Cosine sampling a Lambertian surface scales throughput by its albedo.
    for slot in 0..survivors {
        let path = soa.next.read(slot);
        assert_eq!(path.depth, 1);
        for c in 0..3 {
            assert!(approx_eq!(f32, path.beta[c], 0.5 / 0.5, epsilon = 1e-4));
        }
    }
}

#[test]
fn paths_below_min_depth_skip_russian_roulette() {
    let film = Arc::new(Film::new(1, 1, false, false));
    let params = ShadeParams {
        min_depth: 10,
        max_depth: 10,
        rr_threshold: 1e9,
        rr_cont_prob: 0.5,
    };
    let (soa, counters, active) = shade_once(furnace_scene(0.5), film.clone(), params);

    assert_eq!(counters.active_state_counter, active);
    assert_eq!(film.total_weight(), 0.0);
    assert!(approx_eq!(f32, soa.next.read(0).beta[1], 0.5, epsilon = 1e-4));
}

#[test]
fn shade_leaves_light_samples_to_the_shadow_stage() {
    let film = Arc::new(Film::new(1, 1, false, false));
    let params = ShadeParams {
        min_depth: 10,
        max_depth: 10,
        rr_threshold: 0.2,
        rr_cont_prob: 0.6,
    };
    let scene = furnace_scene(0.5);
    let (soa, counters, _) = shade_once(scene.clone(), film.clone(), params);
    assert!(counters.shadow_ray_counter > 0);
    assert_eq!(soa.shadow_ray_count, counters.shadow_ray_counter);

    // Nothing terminated, so the film only changes once shadow rays land.
    film.splat_weight(&Point2u::new(0, 0), 1.0);
    assert_eq!(film.radiance_image().get(0, 0), Spectrum::zero());

    let before = soa.clone();
    let shadow = ShadowPipeline::new(film.clone(), scene).unwrap();
    shadow.test(&Device::new(), soa.shadow_ray_count, &soa).unwrap();
    assert_eq!(soa, before);
    assert!(film.radiance_image().get(0, 0)[0] > 0.0);
}

#[test]
fn occluded_shadow_rays_add_nothing() {
    let film = Arc::new(Film::new(2, 1, false, false));
    let mut soa = PathState::new();
    soa.initialize(2);
    let beta_li = Spectrum::from_rgb(0.5, 1.0, 2.0);
    soa.shadow.write(0, &shadow_record(Point2u::new(0, 0), Vector3f::new(0.0, 0.0, -1.0), beta_li));
    soa.shadow.write(1, &shadow_record(Point2u::new(1, 0), Vector3f::new(0.0, 0.0, 1.0), beta_li));
    soa.shadow_ray_count = 2;
    let before = soa.clone();

    let shadow = ShadowPipeline::new(film.clone(), wall_scene()).unwrap();
    shadow.test(&Device::new(), soa.shadow_ray_count, &soa).unwrap();
    assert_eq!(soa, before);

    film.splat_weight(&Point2u::new(0, 0), 1.0);
    film.splat_weight(&Point2u::new(1, 0), 1.0);
    let image = film.radiance_image();
    assert_eq!(image.get(0, 0), Spectrum::zero());
    assert_eq!(image.get(1, 0), beta_li);
}

#[test]
fn shadow_rays_stop_short_of_t1() {
    let film = Arc::new(Film::new(1, 1, false, false));
    let mut soa = PathState::new();
    soa.initialize(1);
    let record = ShadowRecord {
        ray_t1: 0.5,
        ..shadow_record(Point2u::new(0, 0), Vector3f::new(0.0, 0.0, -1.0), Spectrum::one())
    };
    soa.shadow.write(0, &record);

    let shadow = ShadowPipeline::new(film.clone(), wall_scene()).unwrap();
    shadow.test(&Device::new(), 1, &soa).unwrap();
    film.splat_weight(&Point2u::new(0, 0), 1.0);
    assert_eq!(film.radiance_image().get(0, 0), Spectrum::one());
}

#[test]
fn trace_reports_scene_flags() {
    let scene = wall_scene();
    let trace = TracePipeline::new(scene.traversal.clone(), false, scene.is_triangle_only());
    assert!(!trace.has_motion_blur());
    assert!(trace.triangle_only());

    let furnace = furnace_scene(0.5);
    let trace = TracePipeline::new(furnace.traversal.clone(), true, furnace.is_triangle_only());
    assert!(trace.has_motion_blur());
    assert!(!trace.triangle_only());
}
