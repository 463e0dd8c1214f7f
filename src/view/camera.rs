use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::geometry::Ray;

/// Perspective camera used to turn pointer positions into throw rays.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(-14.0, 8.0, 16.0),
            target: Vec3::new(0.0, 2.0, 0.0),
            up: Vec3::Y,
            fov: 60.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.2,
            far: 2000.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(width: u32, height: u32) -> Self {
        let mut camera = Self::default();
        camera.resize(width, height);
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Zero-sized viewports keep the previous aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Pixel coordinates (origin top-left) to normalized device coordinates.
    pub fn pixel_to_ndc(x: f32, y: f32, width: u32, height: u32) -> Vec2 {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        Vec2::new(x / w * 2.0 - 1.0, -(y / h) * 2.0 + 1.0)
    }

    /// Ray from the near plane through the pointer at `ndc`.
    pub fn screen_to_ray(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let inv_view_proj = self.view_projection().inverse();

        let near_point = inv_view_proj * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far_point = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);

        let near = near_point.truncate() / near_point.w;
        let far = far_point.truncate() / far_point.w;

        Ray::between_points(near, far)
    }
}
