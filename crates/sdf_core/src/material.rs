//! The fixed material palette.
//!
//! Materials are plain reflectance/emittance pairs stored in a process-wide
//! static table. Primitives refer to them through [`MaterialId`], so every
//! [`SampleResult`](crate::SampleResult) can hold a `&'static Material`
//! that is shared read-only by all render workers.

use sdf_math::Color;
use serde::{Deserialize, Serialize};

/// Surface response: how much incoming light is reflected, and how much
/// light the surface emits on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Fraction of incoming light reflected per channel (RGB, 0-1)
    pub reflectance: Color,

    /// Light emitted per channel (RGB)
    pub emittance: Color,
}

impl Material {
    pub const fn new(reflectance: Color, emittance: Color) -> Self {
        Self {
            reflectance,
            emittance,
        }
    }

    /// Check if this material emits light.
    pub fn is_emissive(&self) -> bool {
        self.emittance.length_squared() > 0.0
    }
}

/// Index into the static material palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialId {
    White,
    Red,
    Green,
    Blue,
    Light,
}

impl MaterialId {
    /// Every palette entry, in table order.
    pub const ALL: [MaterialId; 5] = [
        MaterialId::White,
        MaterialId::Red,
        MaterialId::Green,
        MaterialId::Blue,
        MaterialId::Light,
    ];

    /// Look up the palette entry for this id.
    #[inline]
    pub fn material(self) -> &'static Material {
        &PALETTE[self as usize]
    }
}

/// The material table. Never mutated after program start.
///
/// Non-emissive entries carry a faint emittance in their own hue so that
/// walls far from the light are not pitch black.
pub static PALETTE: [Material; 5] = [
    // white
    Material::new(Color::new(0.5, 0.5, 0.5), Color::new(0.001, 0.001, 0.001)),
    // red
    Material::new(Color::new(0.5, 0.0, 0.0), Color::new(0.001, 0.0, 0.0)),
    // green
    Material::new(Color::new(0.0, 0.5, 0.0), Color::new(0.0, 0.001, 0.0)),
    // blue
    Material::new(Color::new(0.0, 0.0, 0.5), Color::new(0.0, 0.0, 0.001)),
    // white light
    Material::new(Color::ZERO, Color::new(0.5, 0.5, 0.5)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_lookup() {
        for id in MaterialId::ALL {
            assert!(std::ptr::eq(id.material(), &PALETTE[id as usize]));
        }
    }

    #[test]
    fn test_only_light_is_bright() {
        let light = MaterialId::Light.material();
        assert_eq!(light.reflectance, Color::ZERO);
        assert_eq!(light.emittance, Color::splat(0.5));

        for id in [MaterialId::White, MaterialId::Red, MaterialId::Green, MaterialId::Blue] {
            assert!(id.material().emittance.max_element() < 0.01);
        }
    }

    #[test]
    fn test_material_id_serde_names() {
        let json = serde_json::to_string(&MaterialId::Light).unwrap();
        assert_eq!(json, "\"light\"");

        let id: MaterialId = serde_json::from_str("\"green\"").unwrap();
        assert_eq!(id, MaterialId::Green);
    }
}
