//! Surface normals from the field gradient.

use sdf_core::Scene;
use sdf_math::Vec3;

/// Finite-difference step. Small against scene features, large enough to
/// stay clear of f32 cancellation.
pub const NORMAL_EPSILON: f32 = 0.001;

/// Returned when the gradient vanishes, e.g. at the exact center of a sphere.
pub const FALLBACK_NORMAL: Vec3 = Vec3::Y;

/// Estimate the unit surface normal at `p` with central differences.
pub fn estimate_normal(scene: &Scene, p: Vec3) -> Vec3 {
    let dx = Vec3::new(NORMAL_EPSILON, 0.0, 0.0);
    let dy = Vec3::new(0.0, NORMAL_EPSILON, 0.0);
    let dz = Vec3::new(0.0, 0.0, NORMAL_EPSILON);

    let gradient = Vec3::new(
        scene.distance(p + dx) - scene.distance(p - dx),
        scene.distance(p + dy) - scene.distance(p - dy),
        scene.distance(p + dz) - scene.distance(p - dz),
    );

    gradient.try_normalize().unwrap_or(FALLBACK_NORMAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::march::{Marcher, SURFACE_EPSILON};
    use sdf_core::{MaterialId, Primitive, ScenePreset, Shape};
    use sdf_math::Ray;

    #[test]
    fn test_sphere_normal_matches_analytic() {
        let scene = Scene::preset(ScenePreset::SingleSphere);
        let center = Vec3::new(0.0, 0.0, -1.0);

        for dir in [
            Vec3::X,
            Vec3::NEG_Y,
            Vec3::Z,
            Vec3::new(1.0, 1.0, 1.0).normalize(),
            Vec3::new(-0.3, 0.8, 0.2).normalize(),
        ] {
            let p = center + dir * 0.75;
            let n = estimate_normal(&scene, p);
            assert!(n.dot(dir) > 0.999, "normal {n:?} for direction {dir:?}");
        }
    }

    #[test]
    fn test_box_face_normal() {
        let scene = Scene::preset(ScenePreset::Room);
        // Top of the floor slab
        let n = estimate_normal(&scene, Vec3::new(1.0, -1.99, 1.0));
        assert!((n - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn test_unit_length_near_surfaces() {
        let scene = Scene::preset(ScenePreset::Room);
        let marcher = Marcher::default();
        let eye = Vec3::new(0.0, 0.0, 1.0);

        for i in 0..8 {
            for j in 0..8 {
                let target = Vec3::new(i as f32 / 3.5 - 1.0, j as f32 / 3.5 - 1.0, 0.0);
                let ray = Ray::new(eye, target - eye);
                let Some(hit) = marcher.march(&scene, &ray).hit() else {
                    continue;
                };

                let n = estimate_normal(&scene, hit.point);
                assert!(
                    (n.length() - 1.0).abs() < SURFACE_EPSILON,
                    "normal {n:?} at {:?}",
                    hit.point
                );
            }
        }
    }

    #[test]
    fn test_degenerate_gradient_falls_back() {
        let scene = Scene::new(vec![Primitive::new(
            Shape::sphere(Vec3::ZERO, 1.0),
            MaterialId::White,
        )])
        .unwrap();

        assert_eq!(estimate_normal(&scene, Vec3::ZERO), FALLBACK_NORMAL);
    }
}
