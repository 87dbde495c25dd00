//! SDF Core - the implicit scene field.
//!
//! This crate provides:
//!
//! - **Materials**: a fixed static palette addressed by [`MaterialId`]
//! - **Primitives**: sphere and axis-aligned box signed distance functions
//! - **Scene field**: minimum-distance union of primitives, built-in presets
//!   and JSON scene loading
//!
//! # Example
//!
//! ```
//! use sdf_core::{Scene, ScenePreset};
//! use sdf_math::Vec3;
//!
//! let scene = Scene::preset(ScenePreset::SingleSphere);
//! let sample = scene.sample(Vec3::new(0.0, 0.0, 1.0));
//! assert!(sample.distance > 0.0);
//! ```

pub mod material;
pub mod sample;
pub mod scene;
pub mod shape;

// Re-export commonly used types
pub use material::{Material, MaterialId, PALETTE};
pub use sample::SampleResult;
pub use scene::{Scene, SceneError, ScenePreset, SceneResult};
pub use shape::{Primitive, Shape};
