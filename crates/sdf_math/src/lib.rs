// Re-export glam for convenience
pub use glam::*;

// SDF math types
mod interval;
mod ray;
pub use interval::Interval;
pub use ray::Ray;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Largest of the three components.
#[inline]
pub fn max_component(v: Vec3) -> f32 {
    v.x.max(v.y).max(v.z)
}
