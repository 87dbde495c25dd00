//! Fixed pinhole camera for primary ray generation.

use sdf_math::{Ray, Vec3};

/// Pinhole camera looking down -Z.
///
/// The eye sits at (0, 0, 1) and the image plane is z = 0, spanning
/// [-1, 1] on both axes. Pixel (0, 0) is the top-left corner.
#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    eye: Vec3,

    // Cached computed values
    inv_width2: f32,
    inv_height2: f32,
}

impl Camera {
    /// Default eye position.
    pub const EYE: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    /// Create a camera for an image of the given resolution.
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Self {
            image_width,
            image_height,
            eye: Self::EYE,
            inv_width2: 2.0 / image_width.max(1) as f32,
            inv_height2: 2.0 / image_height.max(1) as f32,
        }
    }

    /// Set eye position.
    pub fn with_eye(mut self, eye: Vec3) -> Self {
        self.eye = eye;
        self
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Generate the ray through pixel (i, j).
    pub fn get_ray(&self, i: u32, j: u32) -> Ray {
        let xf = i as f32 * self.inv_width2 - 1.0;
        let yf = -(j as f32 * self.inv_height2 - 1.0);
        self.ray_through(xf, yf)
    }

    /// Generate the ray through image plane coordinates (xf, yf) in [-1, 1].
    pub fn ray_through(&self, xf: f32, yf: f32) -> Ray {
        let origin = Vec3::new(xf, yf, 0.0);
        Ray::new(origin, origin - self.eye)
    }
}
