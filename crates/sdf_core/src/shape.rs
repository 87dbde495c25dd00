//! Primitive signed-distance volumes.

use sdf_math::{max_component, Vec3};
use serde::{Deserialize, Serialize};

use crate::{MaterialId, SampleResult};

/// A primitive volume described by its signed distance function.
///
/// Distances are negative inside, positive outside and zero on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Sphere { center: Vec3, radius: f32 },
    /// Axis-aligned box. `half_extents` is the distance from the center to
    /// each face.
    Box { center: Vec3, half_extents: Vec3 },
}

impl Shape {
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Shape::Sphere { center, radius }
    }

    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Shape::Box {
            center,
            half_extents,
        }
    }

    /// Signed distance from `p` to the surface.
    ///
    /// The box uses the per-axis maximum, which is exact inside and in front
    /// of the faces but underestimates near edges and corners. That is still
    /// a valid lower bound, which is all sphere tracing needs.
    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        match *self {
            Shape::Sphere { center, radius } => p.distance(center) - radius,
            Shape::Box {
                center,
                half_extents,
            } => max_component((p - center).abs() - half_extents),
        }
    }

    /// Whether the shape parameters describe a non-degenerate volume.
    pub fn is_valid(&self) -> bool {
        match *self {
            Shape::Sphere { center, radius } => center.is_finite() && radius > 0.0,
            Shape::Box {
                center,
                half_extents,
            } => center.is_finite() && half_extents.is_finite() && half_extents.min_element() > 0.0,
        }
    }
}

/// A shape tagged with a palette material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub shape: Shape,
    pub material: MaterialId,
}

impl Primitive {
    pub fn new(shape: Shape, material: MaterialId) -> Self {
        Self { shape, material }
    }

    /// Evaluate this primitive's field at `p`.
    #[inline]
    pub fn sample(&self, p: Vec3) -> SampleResult {
        SampleResult {
            material: self.material.material(),
            distance: self.shape.distance(p),
        }
    }
}
