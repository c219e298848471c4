//! Pinhole camera.

use ember_math::{Mat4, Ray, Vec3, Vec4};

/// Maps image-plane coordinates to world-space rays.
///
/// The camera looks down -z in its own space; `view` stores the inverse
/// of a right-handed look-at transform and rotates ray directions into
/// the world.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    view: Mat4,
    fov_scale: f32,
    width: u32,
    height: u32,
    /// Pixel footprint in the `[-1, 1]` image plane.
    dx: f32,
    dy: f32,
    aspect: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32, fov_y_deg: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            view: Mat4::IDENTITY,
            fov_scale: (fov_y_deg.to_radians() / 2.0).tan(),
            width,
            height,
            dx: 2.0 / width as f32,
            dy: 2.0 / height as f32,
            aspect: width as f32 / height as f32,
        }
    }

    /// Place the camera at `eye` looking at `target`.
    pub fn set_view(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.position = eye;
        self.view = Mat4::look_at_rh(eye, target, up).inverse();
    }

    /// Build the world-space ray through image coordinates `(x, y)`.
    ///
    /// Coordinates may be fractional for sub-pixel jitter; `(0, 0)` is the
    /// top-left corner of the top-left pixel.
    pub fn pixel_ray(&self, x: f32, y: f32) -> Ray {
        let mut direction = Vec3::new(-1.0 + x * self.dx, 1.0 - y * self.dy, -1.0);

        // Match the field of view and non-square output.
        direction.x *= self.fov_scale * self.aspect;
        direction.y *= self.fov_scale;

        // Rotate into the world (w = 0: direction, not point).
        let world = self.view * Vec4::new(direction.x, direction.y, direction.z, 0.0);

        Ray::new(self.position, world.truncate())
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The stored transform (inverse look-at); tests invert it to recover
    /// the forward view.
    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }
}
