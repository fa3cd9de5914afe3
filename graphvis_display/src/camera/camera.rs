/// Camera - passive view and projection parameters for the graph display
///
/// The camera computes only matrices. Where it sits is decided by the
/// interaction layer and read through [`VisualAccess`](crate::visual::VisualAccess);
/// the projection parameters come from the display configuration.

use glam::{Mat4, Quat, Vec3};

/// Look-at camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Camera {
    pub fn new(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self { eye, target, up }
    }

    /// View (model-view) matrix, right-handed
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Orientation of the view with the translation removed
    ///
    /// Used by the axes gizmo, which turns with the camera but never moves.
    pub fn rotation(&self) -> Quat {
        let (_, rotation, _) = self.view_matrix().to_scale_rotation_translation();
        rotation
    }

    /// Distance from eye to target
    pub fn distance(&self) -> f32 {
        self.eye.distance(self.target)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view, in radians
    pub fov_y_radians: f32,
    /// Near clip plane distance
    pub near: f32,
    /// Far clip plane distance
    pub far: f32,
}

impl Projection {
    /// Projection matrix for the given aspect ratio (width / height)
    pub fn matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, aspect_ratio, self.near, self.far)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_radians: 35f32.to_radians(),
            near: 1.0,
            far: 500_000.0,
        }
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
