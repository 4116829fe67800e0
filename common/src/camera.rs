//! Orthographic camera for 2D field views

use glam::{Mat4, Vec2, Vec3};

/// 2D orthographic camera; `zoom` is the half height of the visible region
#[derive(Debug, Clone)]
pub struct Camera2D {
    pub position: Vec3,
    pub zoom: f32,
    pub aspect_ratio: f32,
}

impl Camera2D {
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            zoom: 1.0,
            aspect_ratio,
        }
    }

    /// Center on the rectangle `[min, max]` and zoom until it fits with `padding`
    pub fn fit(&mut self, min: Vec2, max: Vec2, padding: f32) {
        let center = (min + max) * 0.5;
        let half = (max - min) * 0.5 * (1.0 + padding);
        self.position = Vec3::new(center.x, center.y, 0.0);
        self.zoom = half.y.max(half.x / self.aspect_ratio.max(f32::EPSILON));
    }

    /// Get the view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        let half_width = self.zoom * self.aspect_ratio;
        let half_height = self.zoom;

        let projection = Mat4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            -1.0,
            1.0,
        );

        let view = Mat4::from_translation(-self.position);

        projection * view
    }

    /// Visible world rectangle as `(min, max)`
    pub fn visible_bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::new(self.zoom * self.aspect_ratio, self.zoom);
        let center = self.position.truncate();
        (center - half, center + half)
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera_2d(camera: &Camera2D) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_wide_extent() {
        let mut camera = Camera2D::new(2.0);
        camera.fit(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 5.0), 0.0);
        assert_eq!(camera.position, Vec3::new(0.0, 2.5, 0.0));
        // Width limits: half width 10 at aspect 2 needs half height 5
        assert!((camera.zoom - 5.0).abs() < 1e-6);
        let (min, max) = camera.visible_bounds();
        assert!((min.x + 10.0).abs() < 1e-5 && (max.x - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_fit_tall_extent() {
        let mut camera = Camera2D::new(1.0);
        camera.fit(Vec2::new(0.0, 0.0), Vec2::new(2.0, 8.0), 0.0);
        assert!((camera.zoom - 4.0).abs() < 1e-6);
    }
}
