use glam::{Mat4, Vec3};
use roadster_kernel::CameraPose;
use roadster_render::Lens;

/// Perspective projection for the chase camera. Position and aim come from
/// the simulation's [`CameraPose`]; this only tracks the lens and viewport.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveCamera {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn from_lens(lens: &Lens, width: u32, height: u32) -> Self {
        let mut cam = Self {
            fov: lens.fov_degrees.to_radians(),
            near: lens.near,
            far: lens.far,
            ..Self::default()
        };
        cam.resize(width, height);
        cam
    }

    /// Track the viewport size. Zero sizes (minimized windows) are treated as 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self, pose: &CameraPose) -> Mat4 {
        Mat4::look_at_rh(pose.position, pose.look_at, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self, pose: &CameraPose) -> Mat4 {
        self.projection_matrix() * self.view_matrix(pose)
    }
}
