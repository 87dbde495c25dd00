//! Light transport strategies.
//!
//! Both integrators turn a primary camera ray into a final display pixel;
//! the frame driver only sees the [`Integrator`] trait.

mod direct;
mod path;

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use sdf_core::Scene;
use sdf_math::Ray;
use serde::{Deserialize, Serialize};

pub use direct::DirectLighting;
pub use path::{sample_hemisphere, PathTracer, SampleAccumulation};

/// Trait for light transport models that shade one pixel per primary ray.
pub trait Integrator: Send + Sync {
    /// Short human-readable name, for logs.
    fn name(&self) -> &'static str;

    /// Shade the pixel seen along `ray` to 8-bit RGB.
    ///
    /// `rng` belongs to the calling worker; deterministic integrators ignore it.
    fn shade(&self, scene: &Scene, ray: &Ray, rng: &mut dyn RngCore) -> [u8; 3];
}

/// Which integrator to render with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    /// Stochastic path tracing with diffuse bounces
    #[default]
    Path,
    /// Single point light, shadow ray and Phong-like highlight
    Direct,
}

impl IntegratorKind {
    pub fn name(self) -> &'static str {
        match self {
            IntegratorKind::Path => "path",
            IntegratorKind::Direct => "direct",
        }
    }
}

impl fmt::Display for IntegratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntegratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "path" => Ok(IntegratorKind::Path),
            "direct" => Ok(IntegratorKind::Direct),
            other => Err(format!("unknown integrator '{other}' (expected 'path' or 'direct')")),
        }
    }
}
