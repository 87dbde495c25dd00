//! The implicit scene: an immutable union of primitive volumes.
//!
//! A [`Scene`] is a pure function from a point to the nearest surface
//! ([`Scene::sample`]). It is built once before rendering, validated, and then
//! shared read-only between workers.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use sdf_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MaterialId, Primitive, SampleResult, Shape};

/// Errors that can occur while building or loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Scene has no primitives")]
    Empty,

    #[error("Primitive {index} is degenerate: {shape:?}")]
    InvalidPrimitive { index: usize, shape: Shape },

    #[error("Unknown scene preset: {0}")]
    UnknownPreset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// A fixed composition of primitives combined by minimum-distance union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SceneDescription")]
pub struct Scene {
    primitives: Vec<Primitive>,
}

/// Unvalidated on-disk form of a [`Scene`].
#[derive(Deserialize)]
struct SceneDescription {
    primitives: Vec<Primitive>,
}

impl TryFrom<SceneDescription> for Scene {
    type Error = SceneError;

    fn try_from(desc: SceneDescription) -> SceneResult<Self> {
        Scene::new(desc.primitives)
    }
}

impl Scene {
    /// Create a scene from a list of primitives.
    ///
    /// Fails if the list is empty or any primitive is degenerate, so a built
    /// scene always yields a finite sample with a palette material.
    pub fn new(primitives: Vec<Primitive>) -> SceneResult<Self> {
        if primitives.is_empty() {
            return Err(SceneError::Empty);
        }
        if let Some((index, prim)) = primitives
            .iter()
            .enumerate()
            .find(|(_, prim)| !prim.shape.is_valid())
        {
            return Err(SceneError::InvalidPrimitive {
                index,
                shape: prim.shape,
            });
        }
        Ok(Self { primitives })
    }

    /// Build one of the built-in scenes.
    pub fn preset(preset: ScenePreset) -> Self {
        let primitives = match preset {
            ScenePreset::Room => room_primitives(),
            ScenePreset::ClosedRoom => {
                let mut prims = room_primitives();
                // front
                prims.push(Primitive::new(
                    Shape::cuboid(Vec3::new(0.0, 0.0, 2.0), Vec3::new(2.0, 2.0, 0.01)),
                    MaterialId::Red,
                ));
                prims
            }
            ScenePreset::SingleSphere => vec![Primitive::new(
                Shape::sphere(Vec3::new(0.0, 0.0, -1.0), 0.75),
                MaterialId::White,
            )],
        };
        Self { primitives }
    }

    /// Parse and validate a scene from JSON.
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        let desc: SceneDescription = serde_json::from_str(json)?;
        Scene::try_from(desc)
    }

    /// Load a scene from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let scene = Self::from_json_str(&json)?;
        log::debug!(
            "Loaded scene from {} ({} primitives)",
            path.display(),
            scene.len()
        );
        Ok(scene)
    }

    /// Serialize the scene to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Evaluate the scene field at `p`: the nearest surface wins.
    #[inline]
    pub fn sample(&self, p: Vec3) -> SampleResult {
        self.primitives
            .iter()
            .fold(SampleResult::far(), |nearest, prim| nearest.nearest(prim.sample(p)))
    }

    /// Signed distance from `p` to the nearest surface.
    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        self.sample(p).distance
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Always false for a constructed scene; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

/// The path-traced room: two spheres, an area light and five walls.
fn room_primitives() -> Vec<Primitive> {
    let wall = |center: Vec3, half_extents: Vec3, material| {
        Primitive::new(Shape::cuboid(center, half_extents), material)
    };

    vec![
        Primitive::new(Shape::sphere(Vec3::new(0.5, 0.0, -1.0), 0.5), MaterialId::Red),
        Primitive::new(Shape::sphere(Vec3::new(-0.5, 0.0, -1.0), 0.5), MaterialId::Green),
        // light
        wall(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.5, 0.01, 0.5), MaterialId::Light),
        // left
        wall(Vec3::new(-2.0, 0.0, 0.0), Vec3::new(0.01, 2.0, 2.0), MaterialId::White),
        // right
        wall(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.01, 2.0, 2.0), MaterialId::Red),
        // ceiling
        wall(Vec3::new(0.0, 2.0, 0.0), Vec3::new(2.0, 0.01, 2.0), MaterialId::Green),
        // floor
        wall(Vec3::new(0.0, -2.0, 0.0), Vec3::new(2.0, 0.01, 2.0), MaterialId::Blue),
        // back
        wall(Vec3::new(0.0, 0.0, -2.0), Vec3::new(2.0, 2.0, 0.01), MaterialId::White),
    ]
}

/// Built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenePreset {
    /// Two spheres under an area light, in a room open towards the camera.
    Room,
    /// [`ScenePreset::Room`] with the wall behind the camera closed.
    ClosedRoom,
    /// A single white sphere, used with direct lighting.
    SingleSphere,
}

impl ScenePreset {
    pub const ALL: [ScenePreset; 3] = [
        ScenePreset::Room,
        ScenePreset::ClosedRoom,
        ScenePreset::SingleSphere,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScenePreset::Room => "room",
            ScenePreset::ClosedRoom => "closed-room",
            ScenePreset::SingleSphere => "single-sphere",
        }
    }
}

impl fmt::Display for ScenePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenePreset {
    type Err = SceneError;

    fn from_str(s: &str) -> SceneResult<Self> {
        ScenePreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SceneError::UnknownPreset(s.to_string()))
    }
}
