/// Model-view transforms and the accumulating scene rotation
use nalgebra::{Matrix4, Point3, Vector3};

/// Rotation applied to the whole scene about the vertical axis, in degrees.
///
/// Advances by a fixed step every frame. The angle is wrapped into
/// `[0, 360)`, which renders identically to an ever-growing angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneRotation {
    angle: f32,
    step: f32,
}

impl SceneRotation {
    pub fn new(step: f32) -> Self {
        Self { angle: 0.0, step }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Move to the next frame's angle and return it
    pub fn advance(&mut self) -> f32 {
        self.angle = (self.angle + self.step).rem_euclid(360.0);
        self.angle
    }
}

impl Default for SceneRotation {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation about +Y by `degrees`
    pub fn rotation_y(degrees: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(0.0, degrees.to_radians(), 0.0))
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Move the world opposite to the camera, then spin the scene.
    ///
    /// Same composition order as translate-then-rotate on a
    /// fixed-function model-view stack: `T(-camera) * Ry(angle)`.
    pub fn model_view(camera: &Point3<f32>, rotation: &SceneRotation) -> Matrix4<f32> {
        Self::translation_matrix(-camera.x, -camera.y, -camera.z)
            * Self::rotation_y(rotation.angle())
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(model_view: &Matrix4<f32>, projection: &Matrix4<f32>) -> Matrix4<f32> {
        projection * model_view
    }
}
