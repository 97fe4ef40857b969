//! Generate Pipeline

use super::path_state::*;
use wavefront_core::camera::*;
use wavefront_core::device::*;
use wavefront_core::error::*;
use wavefront_core::geometry::*;
use wavefront_core::rng::RNG;
use wavefront_core::spectrum::*;

/// Spawns camera paths into free slots until every pixel received `spp`
/// samples.
pub struct GeneratePipeline {
    /// The camera.
    camera: ArcCamera,

    /// Film resolution.
    film_res: Point2u,

    /// Samples per pixel.
    spp: u32,

    /// Maximum number of paths in flight.
    state_count: usize,

    /// Draw a ray time per path.
    has_motion_blur: bool,

    /// Index of the next sample to spawn. Samples are ordered sample index
    /// major, then pixels row by row.
    cursor: u64,
}

impl GeneratePipeline {
    /// Create a new `GeneratePipeline`.
    ///
    /// * `camera`          - The camera.
    /// * `film_res`        - Film resolution.
    /// * `spp`             - Samples per pixel.
    /// * `state_count`     - Maximum number of paths in flight.
    /// * `has_motion_blur` - Draw a ray time per path.
    pub fn new(camera: ArcCamera, film_res: Point2u, spp: u32, state_count: usize, has_motion_blur: bool) -> Self {
        Self {
            camera,
            film_res,
            spp,
            state_count,
            has_motion_blur,
            cursor: 0,
        }
    }

    /// Returns the number of samples of the whole image.
    pub fn total_samples(&self) -> u64 {
        self.film_res.x as u64 * self.film_res.y as u64 * self.spp as u64
    }

    /// Returns the number of samples spawned so far.
    pub fn spawned(&self) -> u64 {
        self.cursor
    }

    /// Returns true once every sample has been spawned.
    pub fn is_done(&self) -> bool {
        self.cursor >= self.total_samples()
    }

    /// Rewinds to the first sample.
    pub fn clear(&mut self) {
        self.cursor = 0;
    }

    /// Fills the free slots after `active_state_count` with new paths and
    /// appends them to the active list. Returns the number of new paths.
    ///
    /// * `device`             - Device to launch on.
    /// * `active_state_count` - Number of paths in flight.
    /// * `soa`                - Path state.
    pub fn generate(&mut self, device: &Device, active_state_count: usize, soa: &mut PathState) -> Result<usize> {
        if active_state_count > self.state_count || self.state_count > soa.capacity() {
            return Err(Error::ResourceExhausted {
                requested: active_state_count.max(self.state_count),
                capacity: soa.capacity().min(self.state_count),
            });
        }

        let free = (self.state_count - active_state_count) as u64;
        let remaining = self.total_samples() - self.cursor;
        let n = free.min(remaining) as usize;
        if n == 0 {
            return Ok(0);
        }

        let start = self.cursor;
        let records = device.launch("generate", n, |i| Ok(self.spawn(start + i as u64)))?;

        for (i, record) in records.iter().enumerate() {
            let slot = active_state_count + i;
            soa.current.write(slot, record);
            soa.active_state_indices.push(slot as u32);
        }
        self.cursor += n as u64;

        trace!("Spawned {} paths, {} of {} samples", n, self.cursor, self.total_samples());
        Ok(n)
    }

    /// Creates the camera path of a sample.
    ///
    /// * `index` - Global sample index.
    fn spawn(&self, index: u64) -> PathRecord {
        let pixel_count = self.film_res.x as u64 * self.film_res.y as u64;
        let pixel = index % pixel_count;
        let pixel_coord = Point2u::new((pixel % self.film_res.x as u64) as u32, (pixel / self.film_res.x as u64) as u32);

        let mut rng = RNG::new(index);
        let u = rng.uniform_2d();
        let film_coord = Point2f::new(
            (pixel_coord.x as Float + u.x) / self.film_res.x as Float,
            (pixel_coord.y as Float + u.y) / self.film_res.y as Float,
        );
        let time = if self.has_motion_blur { rng.uniform_float() } else { 0.0 };
        let ray = self.camera.generate_ray(&film_coord, time);

        PathRecord {
            pixel_coord,
            ray_o: ray.o,
            ray_d: ray.d,
            ray_time: ray.time,
            ray_t1: ray.t_max,
            ray_mask: ray.mask,
            medium_id: self.camera.medium_id(),
            beta: Spectrum::one(),
            beta_le: Spectrum::one(),
            bsdf_pdf: -1.0,
            depth: 0,
            rng,
            path_radiance: Spectrum::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Fixed;

    impl Camera for Fixed {
        fn generate_ray(&self, film_coord: &Point2f, time: Float) -> Ray {
            Ray::new(Point3f::new(film_coord.x, film_coord.y, 0.0), Vector3f::new(0.0, 0.0, 1.0)).with_time(time)
        }
    }

    fn pipeline(state_count: usize) -> GeneratePipeline {
        GeneratePipeline::new(Arc::new(Fixed), Point2u::new(3, 2), 2, state_count, false)
    }

    #[test]
    fn spawns_into_free_slots_only() {
        let device = Device::new();
        let mut soa = PathState::new();
        soa.initialize(4);
        let mut gen = pipeline(4);

        assert_eq!(gen.generate(&device, 0, &mut soa).unwrap(), 4);
        assert_eq!(soa.active_state_indices, vec![0, 1, 2, 3]);
        assert_eq!(gen.generate(&device, 4, &mut soa).unwrap(), 0);

        soa.next_iteration(1);
        assert_eq!(gen.generate(&device, 1, &mut soa).unwrap(), 3);
        assert_eq!(soa.active_state_indices, vec![0, 1, 2, 3]);

        soa.next_iteration(0);
        assert_eq!(gen.generate(&device, 0, &mut soa).unwrap(), 4);
        assert_eq!(gen.spawned(), 11);
        soa.next_iteration(0);
        assert_eq!(gen.generate(&device, 0, &mut soa).unwrap(), 1);
        assert!(gen.is_done());

        gen.clear();
        assert!(!gen.is_done());
    }

    #[test]
    fn cursor_is_sample_major() {
        let device = Device::new();
        let mut soa = PathState::new();
        soa.initialize(8);
        let mut gen = pipeline(8);
        gen.generate(&device, 0, &mut soa).unwrap();

        let pixels: Vec<(u32, u32)> = (0..8)
            .map(|s| {
                let p = soa.current.pixel_coord[s];
                (p.x, p.y)
            })
            .collect();
        assert_eq!(pixels, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1), (0, 0), (1, 0)]);

        let r = soa.current.read(4);
        assert_eq!(r.bsdf_pdf, -1.0);
        assert_eq!(r.depth, 0);
        assert_eq!(r.beta, Spectrum::one());
        assert_eq!(r.rng, {
            let mut rng = RNG::new(4);
            rng.uniform_2d();
            rng
        });
        assert!(r.ray_o.x > 1.0 / 3.0 && r.ray_o.x < 2.0 / 3.0);
    }

    #[test]
    fn seeding_does_not_depend_on_state_count() {
        let device = Device::new();
        let mut small = PathState::new();
        small.initialize(2);
        let mut large = PathState::new();
        large.initialize(12);

        let mut gen_small = pipeline(2);
        let mut gen_large = pipeline(12);
        gen_large.generate(&device, 0, &mut large).unwrap();

        gen_small.generate(&device, 0, &mut small).unwrap();
        small.next_iteration(0);
        gen_small.generate(&device, 0, &mut small).unwrap();
        assert_eq!(small.current.read(1), large.current.read(3));
    }

    #[test]
    fn overfull_state_is_rejected() {
        let device = Device::new();
        let mut soa = PathState::new();
        soa.initialize(2);
        let mut gen = pipeline(4);
        assert!(matches!(
            gen.generate(&device, 0, &mut soa),
            Err(Error::ResourceExhausted { .. })
        ));
    }
}
