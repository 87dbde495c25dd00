//! Direct illumination from a single point light.

use rand::RngCore;
use sdf_core::Scene;
use sdf_math::{Interval, Ray, Vec3};

use super::Integrator;
use crate::march::Marcher;
use crate::normal::estimate_normal;

/// Local illumination: diffuse plus a Blinn-Phong highlight from one point
/// light, with a hard shadow ray. Output is grey luminance.
#[derive(Debug, Clone)]
pub struct DirectLighting {
    pub marcher: Marcher,
    /// Point light position
    pub light: Vec3,
    /// Specular exponent
    pub shininess: f32,
    /// Luminance of shadowed points
    pub ambient: f32,
    /// Lowest byte value for a hit, so unlit surfaces stay distinct from misses
    pub floor: u8,
    /// Shadow ray origin offset, in multiples of the marcher epsilon
    pub shadow_offset_scale: f32,
}

impl Default for DirectLighting {
    fn default() -> Self {
        Self {
            marcher: Marcher::default(),
            light: Vec3::new(1.0, -1.0, 0.0),
            shininess: 32.0,
            ambient: 0.02,
            floor: 5,
            shadow_offset_scale: 100.0,
        }
    }
}

impl DirectLighting {
    /// Luminance in [0, 1] seen along `ray`, or `None` on a miss.
    pub fn luminance(&self, scene: &Scene, ray: &Ray) -> Option<f32> {
        let hit = self.marcher.march(scene, ray).hit()?;

        let to_light = self.light - hit.point;
        let dist_sq = to_light.length_squared();
        if dist_sq <= self.marcher.epsilon * self.marcher.epsilon {
            // Surface touches the light
            return Some(1.0);
        }
        let l = to_light / dist_sq.sqrt();

        // The larger offset clears the surface the shadow ray starts on
        let offset = self.marcher.epsilon * self.shadow_offset_scale;
        let shadow = Ray::new(hit.point + l * offset, l);
        if self.marcher.march(scene, &shadow).is_hit() {
            return Some(self.ambient);
        }

        let normal = estimate_normal(scene, hit.point);
        let diffuse = normal.dot(l).max(0.0);
        let half = (l - ray.direction()).normalize_or_zero();
        let specular = normal.dot(half).max(0.0).powf(self.shininess);

        Some(Interval::UNIT.clamp((diffuse + specular) / dist_sq))
    }

    /// Map a luminance to a byte above the floor.
    pub fn luminance_to_byte(&self, luminance: f32) -> u8 {
        let floor = self.floor as f32;
        let value = floor + Interval::UNIT.clamp(luminance) * (255.0 - floor);
        value as u8
    }
}

impl Integrator for DirectLighting {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn shade(&self, scene: &Scene, ray: &Ray, _rng: &mut dyn RngCore) -> [u8; 3] {
        match self.luminance(scene, ray) {
            Some(luminance) => [self.luminance_to_byte(luminance); 3],
            None => [0, 0, 0],
        }
    }
}
