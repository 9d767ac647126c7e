//! Camera framing derived from mesh extents: centering offset, viewing
//! distance, clip planes and zoom limits.

use crate::{Mat4, Vec3, bounds::Aabb};

/// Multipliers applied to the bounding radius. They are tuning knobs, but
/// must keep `z_near < radius < z_far` and the zoom range around `radius`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramingPolicy {
    pub radius_scale: f32,
    pub near_divisor: f32,
    pub far_scale: f32,
    pub min_zoom_scale: f32,
    pub max_zoom_scale: f32,
}

impl Default for FramingPolicy {
    fn default() -> Self {
        Self {
            radius_scale: 1.2,
            near_divisor: 100.0,
            far_scale: 3.0,
            min_zoom_scale: 0.3,
            max_zoom_scale: 3.0,
        }
    }
}

/// Parameters consumed by the camera/interaction layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFraming {
    /// Translation that moves the mesh center to the origin.
    pub object_offset: Vec3,
    pub bounding_radius: f32,
    /// Default orbit distance.
    pub radius: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// `(min, max)` orbit distance.
    pub zoom_bounds: (f32, f32),
}

impl CameraFraming {
    pub fn from_extents(extents: &Aabb, policy: &FramingPolicy) -> Self {
        let mut bounding_radius = extents.bounding_radius();
        if !bounding_radius.is_finite() || bounding_radius == 0.0 {
            log::debug!(
                "Degenerate extents (radius={}), framing with unit radius",
                bounding_radius
            );
            bounding_radius = 1.0;
        }

        let radius = bounding_radius * policy.radius_scale;
        Self {
            object_offset: -extents.center(),
            bounding_radius,
            radius,
            z_near: radius / policy.near_divisor,
            z_far: radius * policy.far_scale,
            zoom_bounds: (
                bounding_radius * policy.min_zoom_scale,
                bounding_radius * policy.max_zoom_scale,
            ),
        }
    }

    /// World matrix placing the mesh center at the origin.
    #[inline]
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.object_offset)
    }
}
