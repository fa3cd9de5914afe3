use glam::{Mat4, Vec3, Vec4};
use super::*;

// ============================================================================
// Camera
// ============================================================================

#[test]
fn test_default_camera_looks_down_negative_z() {
    let camera = Camera::default();
    assert_eq!(camera.view_matrix(), Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y));
    assert_eq!(camera.distance(), 10.0);
}

#[test]
fn test_view_matrix_moves_target_in_front_of_eye() {
    let camera = Camera::new(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, Vec3::Y);
    let target_in_view = camera.view_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert!((target_in_view.z + 3.0).abs() < 1e-5);
    assert!(target_in_view.x.abs() < 1e-5);
}

#[test]
fn test_rotation_ignores_translation() {
    let near = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    let far = Camera::new(Vec3::new(0.0, 0.0, 500.0), Vec3::ZERO, Vec3::Y);
    assert!(near.rotation().abs_diff_eq(far.rotation(), 1e-5));
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn test_projection_matrix_matches_glam() {
    let projection = Projection { fov_y_radians: 1.0, near: 0.5, far: 100.0 };
    assert_eq!(projection.matrix(2.0), Mat4::perspective_rh(1.0, 2.0, 0.5, 100.0));
}

#[test]
fn test_projection_depends_on_aspect_ratio() {
    let projection = Projection::default();
    assert_ne!(projection.matrix(16.0 / 9.0), projection.matrix(4.0 / 3.0));
}
