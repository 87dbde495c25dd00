//! Sphere tracing through the scene field.

use sdf_core::{SampleResult, Scene};
use sdf_math::{Interval, Ray, Vec3};
use serde::{Deserialize, Serialize};

/// Surface tolerance shared by marching, normal offsets and bounce offsets.
pub const SURFACE_EPSILON: f32 = 0.001;

/// Default step budget per ray.
pub const DEFAULT_MAX_STEPS: u32 = 512;

/// Default travel bound; anything further has left the scene.
pub const DEFAULT_MAX_DISTANCE: f32 = 30.0;

/// Sphere-tracing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Marcher {
    /// A sample closer than this to a surface counts as a hit
    pub epsilon: f32,
    /// Maximum number of field evaluations per ray
    pub max_steps: u32,
    /// Maximum distance travelled along the ray
    pub max_distance: f32,
}

impl Default for Marcher {
    fn default() -> Self {
        Self {
            epsilon: SURFACE_EPSILON,
            max_steps: DEFAULT_MAX_STEPS,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }
}

/// A surface intersection found by the marcher.
#[derive(Debug, Clone, Copy)]
pub struct MarchHit {
    /// Point where the field dropped below epsilon
    pub point: Vec3,
    /// Distance travelled from the ray origin
    pub t: f32,
    /// Field sample at `point`
    pub sample: SampleResult,
    /// Number of field evaluations taken
    pub steps: u32,
}

#[derive(Debug, Clone, Copy)]
pub enum MarchResult {
    Hit(MarchHit),
    Miss,
}

impl MarchResult {
    pub fn is_hit(&self) -> bool {
        matches!(self, MarchResult::Hit(_))
    }

    pub fn hit(self) -> Option<MarchHit> {
        match self {
            MarchResult::Hit(hit) => Some(hit),
            MarchResult::Miss => None,
        }
    }
}

impl Marcher {
    /// Find the first surface along `ray`.
    ///
    /// Steps by the absolute field value, so a ray that starts slightly inside
    /// a volume still walks out to the surface instead of stalling. Running out
    /// of steps or travel is a miss.
    pub fn march(&self, scene: &Scene, ray: &Ray) -> MarchResult {
        let travel = Interval::new(0.0, self.max_distance);
        let mut t = 0.0;
        let mut point = ray.origin();

        for step in 0..self.max_steps {
            let sample = scene.sample(point);
            let distance = sample.distance.abs();

            if distance < self.epsilon {
                return MarchResult::Hit(MarchHit {
                    point,
                    t,
                    sample,
                    steps: step + 1,
                });
            }

            t += distance;
            // Also catches NaN distances
            if !travel.contains(t) {
                break;
            }
            point = ray.at(t);
        }

        MarchResult::Miss
    }
}
