//! Axis-aligned bounding boxes over flat position streams.

use crate::Vec3;

/// Axis-aligned bounding box in object space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Extents of a flat `x, y, z, x, y, z, ...` slice.
    /// Returns `None` when the slice holds no complete triple.
    pub fn from_positions(positions: &[f32]) -> Option<Self> {
        let mut points = positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]));
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |aabb, p| aabb.include(p)))
    }

    /// Grow to contain `point`.
    #[inline]
    pub fn include(self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Component-wise union of two boxes.
    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[inline]
    pub fn range(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.min + self.range() * 0.5
    }

    /// Length of the box diagonal.
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        self.range().length()
    }
}
