use std::f32::consts::PI;

use crate::{Mat4, Vec3, framing::CameraFraming};

/// Simple perspective camera (right-handed).
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl Camera {
    #[allow(clippy::too_many_arguments)]
    pub fn new_perspective(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_rad: f32,
        z_near: f32,
        z_far: f32,
        aspect: f32,
    ) -> Self {
        Self {
            eye,
            target,
            up,
            fov_y_rad,
            z_near,
            z_far,
            aspect,
        }
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// OpenGL-style projection (z in [-1, 1]).
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }
}

/// Radians of orbit per pixel of drag.
pub const ROTATE_SPEED: f32 = 0.01;
/// Pitch limit, just short of the poles so `look_at` keeps a valid up vector.
pub const MAX_PITCH: f32 = PI / 2.1;
/// Radius multiplier per wheel step away from / toward the target.
pub const ZOOM_OUT_STEP: f32 = 1.1;
pub const ZOOM_IN_STEP: f32 = 0.9;

/// Orbit camera circling the origin, where the framed mesh is centered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub radius: f32,
    /// Pitch in radians, clamped to `±MAX_PITCH`.
    pub angle_x: f32,
    /// Yaw in radians.
    pub angle_y: f32,
    default_radius: f32,
    zoom_bounds: (f32, f32),
    z_near: f32,
    z_far: f32,
}

impl OrbitCamera {
    pub fn from_framing(framing: &CameraFraming) -> Self {
        Self {
            radius: framing.radius,
            angle_x: 0.0,
            angle_y: 0.0,
            default_radius: framing.radius,
            zoom_bounds: framing.zoom_bounds,
            z_near: framing.z_near,
            z_far: framing.z_far,
        }
    }

    /// Apply a drag of `(dx, dy)` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.angle_y -= dx * ROTATE_SPEED;
        self.angle_x = (self.angle_x + dy * ROTATE_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Apply one wheel step. Positive `delta` zooms out.
    pub fn zoom(&mut self, delta: f32) {
        if delta == 0.0 {
            return;
        }
        let step = if delta > 0.0 { ZOOM_OUT_STEP } else { ZOOM_IN_STEP };
        let (min, max) = self.zoom_bounds;
        self.radius = (self.radius * step).clamp(min, max);
    }

    pub fn reset(&mut self) {
        self.radius = self.default_radius;
        self.angle_x = 0.0;
        self.angle_y = 0.0;
    }

    #[inline]
    pub fn zoom_bounds(&self) -> (f32, f32) {
        self.zoom_bounds
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_x, cos_x) = self.angle_x.sin_cos();
        let (sin_y, cos_y) = self.angle_y.sin_cos();
        Vec3::new(
            self.radius * sin_y * cos_x,
            self.radius * sin_x,
            self.radius * cos_y * cos_x,
        )
    }

    pub fn camera(&self, fov_y_rad: f32, aspect: f32) -> Camera {
        Camera::new_perspective(
            self.eye(),
            Vec3::ZERO,
            Vec3::Y,
            fov_y_rad,
            self.z_near,
            self.z_far,
            aspect,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bounds::Aabb, framing::FramingPolicy, vec3};

    fn orbit() -> OrbitCamera {
        let aabb = Aabb::new(vec3(0.0, 0.0, 0.0), vec3(3.0, 4.0, 0.0));
        OrbitCamera::from_framing(&CameraFraming::from_extents(&aabb, &FramingPolicy::default()))
    }

    #[test]
    fn default_eye_looks_down_negative_z() {
        let o = orbit();
        let eye = o.eye();
        assert!(eye.x.abs() < 1e-6 && eye.y.abs() < 1e-6);
        assert!((eye.z - o.radius).abs() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut o = orbit();
        o.rotate(0.0, 10_000.0);
        assert_eq!(o.angle_x, MAX_PITCH);
        o.rotate(0.0, -20_000.0);
        assert_eq!(o.angle_x, -MAX_PITCH);
    }

    #[test]
    fn zoom_respects_bounds() {
        let mut o = orbit();
        for _ in 0..100 {
            o.zoom(1.0);
        }
        assert_eq!(o.radius, o.zoom_bounds().1);
        for _ in 0..100 {
            o.zoom(-1.0);
        }
        assert_eq!(o.radius, o.zoom_bounds().0);
    }

    #[test]
    fn reset_restores_default_state() {
        let mut o = orbit();
        let initial = o;
        o.rotate(25.0, -12.0);
        o.zoom(1.0);
        o.reset();
        assert_eq!(o, initial);
    }

    #[test]
    fn eye_distance_matches_radius() {
        let mut o = orbit();
        o.rotate(40.0, 30.0);
        assert!((o.eye().length() - o.radius).abs() < 1e-4);
    }
}
