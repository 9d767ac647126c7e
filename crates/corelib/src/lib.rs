//! Core types: math re-exports, bounding boxes, camera framing, orbit camera.

pub use glam::{Mat4, Vec3, vec3};

pub mod bounds;
pub mod camera;
pub mod framing;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framed_orbit_camera_pv_is_finite() {
        let aabb = bounds::Aabb::new(vec3(-1.0, -2.0, 0.0), vec3(3.0, 2.0, 1.0));
        let framing = framing::CameraFraming::from_extents(&aabb, &framing::FramingPolicy::default());
        let orbit = camera::OrbitCamera::from_framing(&framing);
        let cam = orbit.camera(60f32.to_radians(), 16.0 / 9.0);
        let pv = cam.proj_view() * framing.model_matrix();
        let a = pv.to_cols_array();
        assert!(a.iter().all(|f| f.is_finite()));
    }

    #[test]
    fn model_matrix_moves_center_to_origin() {
        let aabb = bounds::Aabb::new(vec3(2.0, 2.0, 2.0), vec3(4.0, 6.0, 8.0));
        let framing = framing::CameraFraming::from_extents(&aabb, &framing::FramingPolicy::default());
        let moved = framing.model_matrix().transform_point3(aabb.center());
        assert!(moved.length() < 1e-6);
    }
}
