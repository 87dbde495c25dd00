//! SDF Renderer - CPU Ray Marching
//!
//! Sphere traces an implicit scene from a fixed pinhole camera and shades
//! each pixel with one of two integrators:
//! - A stochastic path tracer with diffuse bounces
//! - Direct illumination from a single point light
//!
//! Rendering fans out over a fixed pool of workers, one contiguous pixel
//! span each.

mod camera;
mod integrator;
mod march;
mod normal;
mod partition;
mod renderer;

pub use camera::Camera;
pub use integrator::{
    sample_hemisphere, DirectLighting, Integrator, IntegratorKind, PathTracer, SampleAccumulation,
};
pub use march::{
    MarchHit, MarchResult, Marcher, DEFAULT_MAX_DISTANCE, DEFAULT_MAX_STEPS, SURFACE_EPSILON,
};
pub use normal::{estimate_normal, FALLBACK_NORMAL, NORMAL_EPSILON};
pub use partition::{partition_pixels, PixelSpan};
pub use renderer::{
    color_to_rgb, render, tone_map, worker_seed, ImageBuffer, RenderConfig, RenderError,
    RenderResult, GAMMA,
};

/// Re-export Vec3 and common math types from sdf_math
pub use sdf_math::{Color, Interval, Ray, Vec3};

use rand::{Rng, RngCore};

/// Uniform f32 in [0, 1) from a type-erased RNG.
#[inline]
pub(crate) fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}
