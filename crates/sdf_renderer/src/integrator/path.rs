//! Stochastic path tracing.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive diffuse bounces with a hard depth cutoff
//! - Uniform hemisphere sampling by rejection
//! - Per-pixel sample accumulation and gamma tone mapping

use rand::RngCore;
use sdf_core::Scene;
use sdf_math::{Color, Ray, Vec3};
use serde::{Deserialize, Serialize};

use super::Integrator;
use crate::march::Marcher;
use crate::normal::estimate_normal;
use crate::renderer::{color_to_rgb, tone_map};
use crate::gen_f32;

/// How successive path samples are folded into one pixel estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleAccumulation {
    /// `running = (running + sample) / 2`, starting from black.
    ///
    /// Weights recent samples exponentially, so it is not the sample mean.
    /// This is the reference look and the default.
    #[default]
    Blend,
    /// Arithmetic mean of all samples.
    Mean,
}

impl SampleAccumulation {
    /// Fold `samples` into one estimate.
    pub fn accumulate(self, samples: impl IntoIterator<Item = Color>) -> Color {
        match self {
            SampleAccumulation::Blend => samples
                .into_iter()
                .fold(Color::ZERO, |running, sample| (running + sample) * 0.5),
            SampleAccumulation::Mean => {
                let (sum, count) = samples
                    .into_iter()
                    .fold((Color::ZERO, 0u32), |(sum, count), sample| {
                        (sum + sample, count + 1)
                    });
                if count == 0 {
                    Color::ZERO
                } else {
                    sum / count as f32
                }
            }
        }
    }
}

/// Path tracer over the implicit scene.
#[derive(Debug, Clone)]
pub struct PathTracer {
    pub marcher: Marcher,
    /// Bounces at or beyond this depth contribute nothing
    pub max_depth: u32,
    pub samples_per_pixel: u32,
    pub accumulation: SampleAccumulation,
}

impl Default for PathTracer {
    fn default() -> Self {
        Self {
            marcher: Marcher::default(),
            max_depth: 10,
            samples_per_pixel: 30,
            accumulation: SampleAccumulation::Blend,
        }
    }
}

impl PathTracer {
    /// Compute the radiance arriving along `ray`.
    ///
    /// Misses see a black background. Each hit adds its emittance plus one
    /// uniformly sampled diffuse bounce, weighted by `2 * reflectance * cos`.
    pub fn trace(&self, scene: &Scene, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        if depth >= self.max_depth {
            return Color::ZERO;
        }

        let Some(hit) = self.marcher.march(scene, ray).hit() else {
            return Color::ZERO;
        };

        let material = hit.sample.material;
        let normal = estimate_normal(scene, hit.point);
        let direction = sample_hemisphere(normal, rng);

        // Offset off the surface so the bounce does not re-hit it immediately
        let bounce = Ray::new(hit.point + normal * self.marcher.epsilon, direction);
        let cos_theta = normal.dot(direction);
        let brdf = 2.0 * material.reflectance * cos_theta;
        let incoming = self.trace(scene, &bounce, depth + 1, rng);

        material.emittance + brdf * incoming
    }

    /// Estimate the display color for a primary ray: accumulate
    /// `samples_per_pixel` paths, then tone map.
    pub fn estimate(&self, scene: &Scene, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        let samples = (0..self.samples_per_pixel).map(|_| self.trace(scene, ray, 0, rng));
        tone_map(self.accumulation.accumulate(samples))
    }
}

impl Integrator for PathTracer {
    fn name(&self) -> &'static str {
        "path"
    }

    fn shade(&self, scene: &Scene, ray: &Ray, rng: &mut dyn RngCore) -> [u8; 3] {
        color_to_rgb(self.estimate(scene, ray, rng))
    }
}

/// Sample a uniformly distributed unit direction in the hemisphere around
/// `normal`.
///
/// Draws points in the [-1, 1] cube and keeps those inside the unit ball
/// (degenerate near-zero points are rejected too), then rejects directions
/// below the surface.
pub fn sample_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq <= 1e-6 || len_sq > 1.0 {
            continue;
        }
        let dir = v / len_sq.sqrt();
        if dir.dot(normal) >= 0.0 {
            return dir;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sdf_core::{MaterialId, Primitive, ScenePreset, Shape};

    #[test]
    fn test_blend_accumulation_rule() {
        let samples = [Color::ONE, Color::ZERO];
        // ((0 + 1) / 2 + 0) / 2
        let blended = SampleAccumulation::Blend.accumulate(samples);
        assert_eq!(blended, Color::splat(0.25));

        // Later samples dominate
        let samples = [Color::ZERO, Color::ONE];
        assert_eq!(SampleAccumulation::Blend.accumulate(samples), Color::splat(0.5));
    }

    #[test]
    fn test_blend_converges_below_constant() {
        // N identical samples of c give c * (1 - 2^-N), not c
        let samples = std::iter::repeat(Color::ONE).take(3);
        let blended = SampleAccumulation::Blend.accumulate(samples);
        assert!((blended.x - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_mean_accumulation() {
        let samples = [Color::ONE, Color::ZERO, Color::splat(0.5)];
        let mean = SampleAccumulation::Mean.accumulate(samples);
        assert!((mean - Color::splat(0.5)).length() < 1e-6);
        assert_eq!(SampleAccumulation::Mean.accumulate(std::iter::empty()), Color::ZERO);
    }

    #[test]
    fn test_hemisphere_samples() {
        let mut rng = StdRng::seed_from_u64(42);
        let normals = [
            Vec3::Y,
            Vec3::NEG_X,
            Vec3::new(1.0, -2.0, 0.5).normalize(),
        ];

        for normal in normals {
            for _ in 0..500 {
                let dir = sample_hemisphere(normal, &mut rng);
                assert!((dir.length() - 1.0).abs() < 1e-5);
                assert!(dir.dot(normal) >= 0.0);
            }
        }
    }

    #[test]
    fn test_hemisphere_covers_both_sides_of_tangent_plane() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut positive_x = 0;
        for _ in 0..1000 {
            if sample_hemisphere(Vec3::Y, &mut rng).x > 0.0 {
                positive_x += 1;
            }
        }
        // Roughly symmetric around the normal
        assert!(positive_x > 400 && positive_x < 600);
    }

    #[test]
    fn test_light_emittance_at_last_bounce() {
        let scene = Scene::preset(ScenePreset::Room);
        let tracer = PathTracer {
            max_depth: 1,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        // Straight up into the light; the bounce is beyond the depth budget
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let radiance = tracer.trace(&scene, &ray, 0, &mut rng);
        assert_eq!(radiance, MaterialId::Light.material().emittance);
    }

    #[test]
    fn test_exhausted_depth_is_black() {
        let scene = Scene::preset(ScenePreset::Room);
        let tracer = PathTracer::default();
        let mut rng = StdRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(tracer.trace(&scene, &ray, tracer.max_depth, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_miss_is_black() {
        let scene = Scene::new(vec![Primitive::new(
            Shape::sphere(Vec3::new(0.0, 0.0, -3.0), 1.0),
            MaterialId::Light,
        )])
        .unwrap();
        let tracer = PathTracer::default();
        let mut rng = StdRng::seed_from_u64(3);

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(tracer.trace(&scene, &ray, 0, &mut rng), Color::ZERO);
        assert_eq!(tracer.shade(&scene, &ray, &mut rng), [0, 0, 0]);
    }

    #[test]
    fn test_room_is_lit() {
        let scene = Scene::preset(ScenePreset::Room);
        let tracer = PathTracer {
            samples_per_pixel: 16,
            max_depth: 4,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(11);

        // Looking at the back wall under the light
        let ray = Ray::new(Vec3::new(0.0, 0.6, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let color = tracer.estimate(&scene, &ray, &mut rng);
        assert!(color.max_element() > 0.0);
        assert!(color.max_element() <= 1.0);
    }

    #[test]
    fn test_seeded_trace_is_reproducible() {
        let scene = Scene::preset(ScenePreset::Room);
        let tracer = PathTracer {
            samples_per_pixel: 4,
            ..Default::default()
        };
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.2, -0.3, -1.0));

        let a = tracer.estimate(&scene, &ray, &mut StdRng::seed_from_u64(99));
        let b = tracer.estimate(&scene, &ray, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
