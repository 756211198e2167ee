/// Camera and projection utilities
use nalgebra::{Matrix4, Point3};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    Orthographic,
    #[default]
    Perspective,
}

/// Fixed camera looking down -Z from `position`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 30.0),
            fov: 65.0_f32.to_radians(),
            aspect: aspect_ratio(width, height),
            near: 1.0,
            far: 40.0,
            mode: ProjectionMode::Perspective,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = self.position.coords.norm().max(self.near);
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

/// Width over height; an empty viewport dimension counts as one pixel
fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// A projected point: pixel coordinates plus normalized depth in `[-1, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

/// Project a point through `mvp` onto a `width` x `height` viewport.
///
/// Returns `None` for points behind the eye or outside the near/far
/// range. Points beyond the left/right/top/bottom edges are kept so
/// callers can clip whole segments.
pub fn project_to_screen(
    mvp: &Matrix4<f32>,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<ScreenPoint> {
    let clip = mvp * point.to_homogeneous();

    // Prevent division by near-zero depth values
    if clip.w < 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let ndc_z = clip.z / clip.w;

    if !(-1.0..=1.0).contains(&ndc_z) {
        return None;
    }

    Some(ScreenPoint {
        x: (ndc_x + 1.0) * 0.5 * width as f32,
        y: (1.0 - ndc_y) * 0.5 * height as f32,
        depth: ndc_z,
    })
}
