//! Frame driver.
//!
//! Implements the full-frame render:
//! - One primary ray per pixel through the pinhole camera
//! - A fixed worker pool over disjoint contiguous pixel spans
//! - Per-worker seeded random streams for reproducible output
//! - Gamma tone mapping and 8-bit output

use std::path::Path;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use sdf_core::Scene;
use sdf_math::{Color, Interval, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::Camera;
use crate::integrator::{DirectLighting, Integrator, IntegratorKind, PathTracer, SampleAccumulation};
use crate::march::Marcher;
use crate::partition::{partition_pixels, PixelSpan};

/// Display gamma used by tone mapping.
pub const GAMMA: f32 = 2.2;

/// Errors that can occur while rendering or writing a frame.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Light transport model
    pub integrator: IntegratorKind,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Worker thread count
    pub threads: u32,
    /// Path samples per pixel (path integrator only)
    pub samples_per_pixel: u32,
    /// Maximum bounce depth (path integrator only)
    pub max_depth: u32,
    /// Base random seed; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Sphere-tracing budget
    pub march: Marcher,
    /// Per-pixel sample accumulation (path integrator only)
    pub accumulation: SampleAccumulation,
    /// Point light position (direct integrator only)
    pub light: Vec3,
    /// Specular exponent (direct integrator only)
    pub shininess: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::path_traced()
    }
}

impl RenderConfig {
    /// 1024x1024 path-traced frame, 30 spp, depth 10, 8 workers.
    pub fn path_traced() -> Self {
        let direct = DirectLighting::default();
        Self {
            integrator: IntegratorKind::Path,
            width: 1024,
            height: 1024,
            threads: 8,
            samples_per_pixel: 30,
            max_depth: 10,
            seed: None,
            march: Marcher::default(),
            accumulation: SampleAccumulation::Blend,
            light: direct.light,
            shininess: direct.shininess,
        }
    }

    /// 2048x2048 direct-lit frame, 8 workers.
    pub fn direct() -> Self {
        Self {
            integrator: IntegratorKind::Direct,
            width: 2048,
            height: 2048,
            ..Self::path_traced()
        }
    }

    /// Defaults for the given integrator.
    pub fn for_integrator(kind: IntegratorKind) -> Self {
        match kind {
            IntegratorKind::Path => Self::path_traced(),
            IntegratorKind::Direct => Self::direct(),
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set worker count.
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    /// Fix the random seed for reproducible output.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check that the configuration can produce an image.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: &str| Err(RenderError::InvalidConfig(msg.to_string()));

        if self.width == 0 || self.height == 0 {
            return invalid("resolution must be non-zero");
        }
        if self.threads == 0 {
            return invalid("thread count must be non-zero");
        }
        if self.integrator == IntegratorKind::Path && self.samples_per_pixel == 0 {
            return invalid("samples per pixel must be non-zero");
        }
        if !(self.march.epsilon > 0.0) || !(self.march.max_distance > 0.0) {
            return invalid("march epsilon and max distance must be positive");
        }
        if !self.light.is_finite() {
            return invalid("light position must be finite");
        }
        Ok(())
    }

    pub fn path_tracer(&self) -> PathTracer {
        PathTracer {
            marcher: self.march,
            max_depth: self.max_depth,
            samples_per_pixel: self.samples_per_pixel,
            accumulation: self.accumulation,
        }
    }

    pub fn direct_lighting(&self) -> DirectLighting {
        DirectLighting {
            marcher: self.march,
            light: self.light,
            shininess: self.shininess,
            ..Default::default()
        }
    }

    /// Build the integrator selected by this configuration.
    pub fn build_integrator(&self) -> Box<dyn Integrator> {
        match self.integrator {
            IntegratorKind::Path => Box::new(self.path_tracer()),
            IntegratorKind::Direct => Box::new(self.direct_lighting()),
        }
    }
}

/// Apply gamma correction and clamp to [0, 1].
#[inline]
pub fn tone_map(color: Color) -> Color {
    let c = color.powf(1.0 / GAMMA);
    Color::new(
        Interval::UNIT.clamp(c.x),
        Interval::UNIT.clamp(c.y),
        Interval::UNIT.clamp(c.z),
    )
}

/// Convert a [0, 1] color to 8-bit RGB. Truncates.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [
        (color.x * 255.0) as u8,
        (color.y * 255.0) as u8,
        (color.z * 255.0) as u8,
    ]
}

/// Derive a worker's RNG seed from the frame seed and its span index.
///
/// Uses fixed SplitMix64 steps so seeds are stable across toolchains.
pub fn worker_seed(seed: u64, span_index: usize) -> u64 {
    splitmix64(splitmix64(seed) ^ span_index as u64)
}

#[inline]
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Owned 8-bit RGB frame, row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 3]>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 3]; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let index = self.index(x, y);
        self.pixels[index] = rgb;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Flatten to width * height * 3 bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    /// Encode to an image file. The format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        image::save_buffer(
            path,
            &self.to_rgb_bytes(),
            self.width,
            self.height,
            image::ColorType::Rgb8,
        )?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Render the scene to an image buffer.
///
/// The frame is split into one contiguous span per worker. Each worker owns a
/// disjoint slice of the buffer and its own seeded RNG, so no locking is
/// needed, and the same config and seed always produce the same bytes. Returns
/// once every worker has finished.
pub fn render(
    scene: &Scene,
    integrator: &dyn Integrator,
    config: &RenderConfig,
) -> RenderResult<ImageBuffer> {
    config.validate()?;

    let camera = Camera::new(config.width, config.height);
    let spans = partition_pixels(config.pixel_count(), config.threads as usize);
    let seed = config.seed.unwrap_or_else(|| {
        let seed = rand::random();
        log::info!("No seed given, using {}", seed);
        seed
    });

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(spans.len())
        .thread_name(|i| format!("sdf-worker-{}", i))
        .build()?;

    log::info!(
        "Rendering {}x{} with {} integrator on {} workers",
        config.width,
        config.height,
        integrator.name(),
        spans.len()
    );
    let start = Instant::now();

    let mut image = ImageBuffer::new(config.width, config.height);
    pool.scope(|scope| {
        let mut rest: &mut [[u8; 3]] = &mut image.pixels;
        for &span in &spans {
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(span.len());
            rest = tail;
            let camera = &camera;
            scope.spawn(move |_| render_span(span, chunk, camera, scene, integrator, seed));
        }
    });

    log::info!("Rendered in {:?}", start.elapsed());
    Ok(image)
}

/// Render one worker's span into its slice of the frame.
fn render_span(
    span: PixelSpan,
    pixels: &mut [[u8; 3]],
    camera: &Camera,
    scene: &Scene,
    integrator: &dyn Integrator,
    seed: u64,
) {
    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(worker_seed(seed, span.index));
    let width = camera.image_width as usize;

    for (pixel, index) in pixels.iter_mut().zip(span.range()) {
        let x = (index % width) as u32;
        let y = (index / width) as u32;
        let ray = camera.get_ray(x, y);
        *pixel = integrator.shade(scene, &ray, &mut rng);
    }

    log::debug!(
        "Span {} ({} pixels) done in {:?}",
        span.index,
        span.len(),
        start.elapsed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;
    use sdf_core::ScenePreset;
    use sdf_math::Ray;

    /// Encodes the pixel coordinate recovered from the primary ray.
    struct CoordIntegrator {
        width: u32,
        height: u32,
    }

    impl Integrator for CoordIntegrator {
        fn name(&self) -> &'static str {
            "coord"
        }

        fn shade(&self, _scene: &Scene, ray: &Ray, _rng: &mut dyn RngCore) -> [u8; 3] {
            let x = ((ray.origin.x + 1.0) * self.width as f32 / 2.0).round() as u8;
            let y = ((1.0 - ray.origin.y) * self.height as f32 / 2.0).round() as u8;
            [x, y, 7]
        }
    }

    #[test]
    fn test_tone_map() {
        assert_eq!(tone_map(Color::ZERO), Color::ZERO);
        assert_eq!(tone_map(Color::splat(4.0)), Color::ONE);

        let mid = tone_map(Color::splat(0.5));
        assert!((mid.x - 0.5f32.powf(1.0 / 2.2)).abs() < 1e-6);
    }

    #[test]
    fn test_color_to_rgb_truncates() {
        assert_eq!(color_to_rgb(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb(Color::ZERO), [0, 0, 0]);
        // 0.999 * 255 = 254.745
        assert_eq!(color_to_rgb(Color::splat(0.999)), [254, 254, 254]);
    }

    #[test]
    fn test_config_defaults() {
        let path = RenderConfig::default();
        assert_eq!(path.integrator, IntegratorKind::Path);
        assert_eq!((path.width, path.height), (1024, 1024));
        assert_eq!(path.threads, 8);
        assert_eq!(path.samples_per_pixel, 30);
        assert_eq!(path.max_depth, 10);
        assert_eq!(path.accumulation, SampleAccumulation::Blend);

        let direct = RenderConfig::for_integrator(IntegratorKind::Direct);
        assert_eq!((direct.width, direct.height), (2048, 2048));
        assert_eq!(direct.build_integrator().name(), "direct");
    }

    #[test]
    fn test_config_validation() {
        assert!(RenderConfig::default().validate().is_ok());

        let bad = [
            RenderConfig::default().with_resolution(0, 10),
            RenderConfig::default().with_threads(0),
            RenderConfig::default().with_quality(0, 10),
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(RenderError::InvalidConfig(_))));
        }

        // Direct lighting does not need samples
        assert!(RenderConfig::direct().with_quality(0, 0).validate().is_ok());
    }

    #[test]
    fn test_config_json() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "integrator": "direct", "width": 32, "seed": 5 }"#).unwrap();
        assert_eq!(config.integrator, IntegratorKind::Direct);
        assert_eq!(config.width, 32);
        // Missing fields fall back to defaults
        assert_eq!(config.height, 1024);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.march, Marcher::default());
    }

    #[test]
    fn test_every_pixel_written_by_its_span() {
        let scene = Scene::preset(ScenePreset::SingleSphere);
        let (width, height) = (20, 13);
        let integrator = CoordIntegrator { width, height };

        for threads in [1, 3, 8, 300] {
            let config = RenderConfig::default()
                .with_resolution(width, height)
                .with_threads(threads)
                .with_seed(0);
            let image = render(&scene, &integrator, &config).unwrap();

            for y in 0..height {
                for x in 0..width {
                    assert_eq!(image.get(x, y), [x as u8, y as u8, 7], "threads {threads}");
                }
            }
        }
    }

    #[test]
    fn test_direct_single_sphere_frame() {
        let scene = Scene::preset(ScenePreset::SingleSphere);
        let config = RenderConfig::direct()
            .with_resolution(64, 64)
            .with_threads(4);
        let integrator = config.build_integrator();

        let image = render(&scene, integrator.as_ref(), &config).unwrap();

        // Camera ray through the image plane center hits the sphere and is lit
        let center = image.get(32, 32);
        assert!(center[0] > 5, "center pixel {center:?}");
        assert_eq!(center[0], center[1]);
        assert_eq!(center[1], center[2]);

        // Corners miss the sphere entirely
        assert_eq!(image.get(0, 0), [0, 0, 0]);
        assert_eq!(image.get(63, 63), [0, 0, 0]);

        // The default light sits in front of the sphere, so most of the
        // visible surface is lit rather than shadowed
        let lighting = config.direct_lighting();
        let shadowed = lighting.luminance_to_byte(lighting.ambient);
        let hits: Vec<u8> = image.pixels.iter().map(|p| p[0]).filter(|&v| v > 0).collect();
        let in_shadow = hits.iter().filter(|&&v| v == shadowed).count();
        assert!(hits.len() - in_shadow > in_shadow, "{in_shadow} of {} hits shadowed", hits.len());
    }

    #[test]
    fn test_seeded_path_render_is_reproducible() {
        let scene = Scene::preset(ScenePreset::Room);
        let config = RenderConfig::path_traced()
            .with_resolution(12, 12)
            .with_quality(2, 3)
            .with_threads(3)
            .with_seed(1234);
        let integrator = config.path_tracer();

        let first = render(&scene, &integrator, &config).unwrap();
        let second = render(&scene, &integrator, &config).unwrap();
        assert_eq!(first, second);

        // Something in the room is lit
        assert!(first.pixels.iter().any(|p| p.iter().any(|&c| c > 0)));
    }

    #[test]
    fn test_worker_seeds_differ() {
        assert_ne!(worker_seed(1, 0), worker_seed(1, 1));
        assert_ne!(worker_seed(1, 0), worker_seed(2, 0));
        assert_eq!(worker_seed(3, 4), worker_seed(3, 4));
    }

    #[test]
    fn test_worker_seed_is_fixed() {
        // Reference SplitMix64 output for state 0
        assert_eq!(splitmix64(0), 0xE220_A839_7B1D_CDAF);
        assert_eq!(worker_seed(0, 0), splitmix64(splitmix64(0)));
        assert_eq!(worker_seed(7, 3), splitmix64(splitmix64(7) ^ 3));
    }

    #[test]
    fn test_image_buffer_bytes() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(1, 0, [1, 2, 3]);
        assert_eq!(image.to_rgb_bytes(), vec![0, 0, 0, 1, 2, 3]);
    }
}
