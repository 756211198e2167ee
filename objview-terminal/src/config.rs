//! Configuration loading for the objview viewer.

use anyhow::{bail, Context, Result};
use nalgebra::Point3;
use objview_core::{Camera, Limits, ProjectionMode};
use serde::Deserialize;
use std::path::Path;

/// Default rotation step in degrees per frame
pub const DEFAULT_ROTATE_SPEED: f32 = 1.0;

/// Default frame rate cap; 0 means uncapped
pub const DEFAULT_TARGET_FPS: u32 = 60;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    pub camera: Option<CameraConfig>,
    pub animation: Option<AnimationConfig>,
    pub limits: Option<LimitsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CameraConfig {
    pub position: Option<[f32; 3]>,
    pub fov_degrees: Option<f32>,
    pub near: Option<f32>,
    pub far: Option<f32>,
    pub projection: Option<Projection>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    Perspective,
    Orthographic,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AnimationConfig {
    pub rotate_speed: Option<f32>,
    pub target_fps: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LimitsConfig {
    pub max_objects: Option<usize>,
    pub max_vertices: Option<usize>,
    pub max_texture_vertices: Option<usize>,
    pub max_faces_per_object: Option<usize>,
    pub max_face_vertices: Option<usize>,
    pub max_name_length: Option<usize>,
    pub max_line_length: Option<usize>,
}

impl Config {
    /// Camera for a viewport of `width` x `height`, with configured overrides
    pub fn camera(&self, width: u32, height: u32) -> Camera {
        let mut camera = Camera::new(width, height);
        if let Some(cfg) = &self.camera {
            if let Some([x, y, z]) = cfg.position {
                camera.position = Point3::new(x, y, z);
            }
            if let Some(fov) = cfg.fov_degrees {
                camera.fov = fov.to_radians();
            }
            if let Some(near) = cfg.near {
                camera.near = near;
            }
            if let Some(far) = cfg.far {
                camera.far = far;
            }
            if let Some(projection) = cfg.projection {
                camera.mode = match projection {
                    Projection::Perspective => ProjectionMode::Perspective,
                    Projection::Orthographic => ProjectionMode::Orthographic,
                };
            }
        }
        camera
    }

    pub fn rotate_speed(&self) -> f32 {
        self.animation
            .as_ref()
            .and_then(|a| a.rotate_speed)
            .unwrap_or(DEFAULT_ROTATE_SPEED)
    }

    pub fn target_fps(&self) -> u32 {
        self.animation
            .as_ref()
            .and_then(|a| a.target_fps)
            .unwrap_or(DEFAULT_TARGET_FPS)
    }

    /// Override the frame rate cap, e.g. from the command line
    pub fn with_target_fps(mut self, fps: Option<u32>) -> Self {
        if let Some(fps) = fps {
            self.animation.get_or_insert_with(Default::default).target_fps = Some(fps);
        }
        self
    }

    /// Scene capacity limits; unset fields keep their defaults
    pub fn limits(&self) -> Limits {
        let mut limits = Limits::default();
        if let Some(cfg) = &self.limits {
            let fields = [
                (cfg.max_objects, &mut limits.max_objects),
                (cfg.max_vertices, &mut limits.max_vertices),
                (cfg.max_texture_vertices, &mut limits.max_texture_vertices),
                (cfg.max_faces_per_object, &mut limits.max_faces_per_object),
                (cfg.max_face_vertices, &mut limits.max_face_vertices),
                (cfg.max_name_length, &mut limits.max_name_length),
                (cfg.max_line_length, &mut limits.max_line_length),
            ];
            for (value, slot) in fields {
                if let Some(value) = value {
                    *slot = value;
                }
            }
        }
        limits
    }

    fn validate(&self) -> Result<()> {
        let camera = self.camera(1, 1);
        if !(camera.fov > 0.0 && camera.fov < std::f32::consts::PI) {
            bail!("camera.fov_degrees must be between 0 and 180");
        }
        if camera.near <= 0.0 || camera.far <= camera.near {
            bail!(
                "camera clip range must satisfy 0 < near < far (near = {}, far = {})",
                camera.near,
                camera.far
            );
        }
        if !self.rotate_speed().is_finite() {
            bail!("animation.rotate_speed must be a finite number");
        }
        if self.limits().max_face_vertices < 3 {
            bail!("limits.max_face_vertices must be at least 3");
        }
        Ok(())
    }
}

/// Parse and validate a configuration document
pub fn parse_config(text: &str) -> Result<Config> {
    let config: Config = toml::from_str(text).context("Invalid configuration")?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a configuration file
pub fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("Failed to load config {}", path.display()))
}
