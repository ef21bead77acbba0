//! Camera for ray generation.

use lumen_math::{Mat4, Vec2, Vec3, Vec4};

/// What the renderer needs from a camera: an eye position and one ray
/// direction per pixel, row-major with row 0 at the top.
pub trait CameraView: Sync {
    fn position(&self) -> Vec3;

    fn ray_directions(&self) -> &[Vec3];
}

/// Perspective pinhole camera with a cached ray-direction table.
///
/// The table is rebuilt whenever the viewport size or the view changes,
/// so the render loop only does lookups.
#[derive(Debug, Clone)]
pub struct Camera {
    vertical_fov: f32,
    near_clip: f32,
    far_clip: f32,

    position: Vec3,
    forward: Vec3,

    inverse_projection: Mat4,
    inverse_view: Mat4,

    width: u32,
    height: u32,
    ray_directions: Vec<Vec3>,
}

impl Camera {
    /// Create a new camera.
    ///
    /// - `vertical_fov`: field of view in degrees
    /// - `near_clip`, `far_clip`: projection clip distances
    ///
    /// Starts at `(0, 0, 6)` looking down `-Z` with an empty viewport; call
    /// [`Camera::on_resize`] before rendering.
    pub fn new(vertical_fov: f32, near_clip: f32, far_clip: f32) -> Self {
        let mut camera = Self {
            vertical_fov,
            near_clip,
            far_clip,
            position: Vec3::new(0.0, 0.0, 6.0),
            forward: Vec3::NEG_Z,
            inverse_projection: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
            width: 0,
            height: 0,
            ray_directions: Vec::new(),
        };
        camera.recalculate_view();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_view(position, self.forward);
        self
    }

    /// Move and re-aim the camera. A zero `forward` keeps the current aim.
    pub fn set_view(&mut self, position: Vec3, forward: Vec3) {
        self.position = position;
        self.forward = forward.try_normalize().unwrap_or(self.forward);
        self.recalculate_view();
        self.recalculate_ray_directions();
    }

    /// Resize the viewport.
    ///
    /// Returns true if the direction table was rebuilt. Zero-sized or
    /// unchanged viewports are ignored.
    pub fn on_resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return false;
        }

        self.width = width;
        self.height = height;
        self.recalculate_projection();
        self.recalculate_ray_directions();
        true
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn vertical_fov(&self) -> f32 {
        self.vertical_fov
    }

    /// Ray direction through pixel `(x, y)`, if it lies in the viewport.
    pub fn ray_direction(&self, x: u32, y: u32) -> Option<Vec3> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.ray_directions
            .get(x as usize + y as usize * self.width as usize)
            .copied()
    }

    fn recalculate_projection(&mut self) {
        let aspect = self.width as f32 / self.height as f32;
        let projection = Mat4::perspective_rh(
            self.vertical_fov.to_radians(),
            aspect,
            self.near_clip,
            self.far_clip,
        );
        self.inverse_projection = projection.inverse();
    }

    fn recalculate_view(&mut self) {
        // Looking straight up or down needs a different reference axis
        let up = if self.forward.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.position, self.position + self.forward, up);
        self.inverse_view = view.inverse();
    }

    fn recalculate_ray_directions(&mut self) {
        let (width, height) = (self.width as usize, self.height as usize);
        self.ray_directions.clear();
        self.ray_directions.reserve(width * height);

        for y in 0..height {
            for x in 0..width {
                // Pixel centers, NDC y = +1 at the top row
                let coord = Vec2::new(
                    (x as f32 + 0.5) / width as f32 * 2.0 - 1.0,
                    1.0 - (y as f32 + 0.5) / height as f32 * 2.0,
                );

                let target = self.inverse_projection * Vec4::new(coord.x, coord.y, 1.0, 1.0);
                let local = (target.truncate() / target.w).normalize();
                let world = self.inverse_view * local.extend(0.0);
                self.ray_directions.push(world.truncate());
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(45.0, 0.1, 100.0)
    }
}

impl CameraView for Camera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn ray_directions(&self) -> &[Vec3] {
        &self.ray_directions
    }
}
