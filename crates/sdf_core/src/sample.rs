use std::cmp::Ordering;

use crate::{Material, MaterialId};

/// One evaluation of the scene field: the signed distance to the nearest
/// surface, and that surface's material.
#[derive(Debug, Clone, Copy)]
pub struct SampleResult {
    pub material: &'static Material,
    pub distance: f32,
}

impl SampleResult {
    /// A sample infinitely far from any surface. Identity for [`nearest`](Self::nearest).
    pub fn far() -> Self {
        Self {
            material: MaterialId::White.material(),
            distance: f32::INFINITY,
        }
    }

    /// Union of two fields: keep whichever surface is closer.
    ///
    /// On a tie `other` wins, so folding left to right keeps the last
    /// primitive among equals.
    #[inline]
    pub fn nearest(self, other: Self) -> Self {
        if self.distance < other.distance {
            self
        } else {
            other
        }
    }
}

// Samples compare by distance only; the material rides along.
impl PartialEq for SampleResult {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl PartialOrd for SampleResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.distance.partial_cmp(&other.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: MaterialId, distance: f32) -> SampleResult {
        SampleResult {
            material: id.material(),
            distance,
        }
    }

    #[test]
    fn test_nearest_keeps_closer_material() {
        let red = sample(MaterialId::Red, 0.25);
        let blue = sample(MaterialId::Blue, -0.5);

        let a = red.nearest(blue);
        let b = blue.nearest(red);
        assert!(std::ptr::eq(a.material, MaterialId::Blue.material()));
        assert!(std::ptr::eq(b.material, MaterialId::Blue.material()));
        assert_eq!(a.distance, -0.5);
    }

    #[test]
    fn test_far_is_identity() {
        let green = sample(MaterialId::Green, 3.0);
        let merged = SampleResult::far().nearest(green);
        assert!(std::ptr::eq(merged.material, green.material));
    }

    #[test]
    fn test_ordering_by_distance() {
        assert!(sample(MaterialId::Light, 0.1) < sample(MaterialId::White, 0.2));
        assert!(sample(MaterialId::Light, 0.1) == sample(MaterialId::White, 0.1));
    }
}
