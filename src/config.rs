// bodypaint.toml: camera, paint engine and demo settings.
// Every field has a default, so an empty (or missing) file gives the stock demo.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub paint: PaintConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    /// Use the webcam for color frames (false = synthetic test pattern)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Device index (0 = default webcam)
    #[serde(default)]
    pub index: u32,
    /// Color frame size the engine works in; camera frames are resized to it
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaintConfig {
    /// Alpha lost by every joint color each update
    #[serde(default = "default_fade_step")]
    pub fade_step: u8,
    /// Updates between bucket recolors (0 = never)
    #[serde(default = "default_rotation_period")]
    pub rotation_period: u32,
    /// Joints closer than this (pixels) pass paint to each other
    #[serde(default = "default_diffusion_radius")]
    pub diffusion_radius: f32,
    /// Joints farther than this (pixels) do not tint a pixel
    #[serde(default = "default_blend_radius")]
    pub blend_radius: f32,
    /// Alpha of the random starting joint colors
    #[serde(default = "default_initial_alpha")]
    pub initial_alpha: u8,
    /// Fixed RNG seed; random per run when absent
    #[serde(default)]
    pub seed: Option<u32>,
    #[serde(default = "default_buckets")]
    pub buckets: Vec<BucketConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BucketConfig {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Starting color as [r, g, b]
    pub color: [u8; 3],
}

#[derive(Debug, Deserialize, Clone)]
pub struct DemoConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Simulated people, one per slot
    #[serde(default = "default_puppets")]
    pub puppets: usize,
    #[serde(default = "default_true")]
    pub show_skeleton: bool,
    #[serde(default = "default_target_fps")]
    pub target_fps: usize,
}

fn default_true() -> bool { true }
fn default_width() -> u32 { 640 }
fn default_height() -> u32 { 480 }
fn default_fps() -> u32 { 30 }
fn default_fade_step() -> u8 { 1 }
fn default_rotation_period() -> u32 { 60 }
fn default_diffusion_radius() -> f32 { 20.0 }
fn default_blend_radius() -> f32 { 150.0 }
fn default_initial_alpha() -> u8 { 255 }
fn default_title() -> String { "Body Paint".to_string() }
fn default_puppets() -> usize { 2 }
fn default_target_fps() -> usize { 60 }

/// Blue on the left, green on the right, both at shoulder height.
fn default_buckets() -> Vec<BucketConfig> {
    vec![
        BucketConfig { x: 10, y: 100, width: 100, height: 100, color: [0, 0, 255] },
        BucketConfig { x: 530, y: 100, width: 100, height: 100, color: [0, 255, 0] },
    ]
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            index: 0,
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
        }
    }
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            fade_step: default_fade_step(),
            rotation_period: default_rotation_period(),
            diffusion_radius: default_diffusion_radius(),
            blend_radius: default_blend_radius(),
            initial_alpha: default_initial_alpha(),
            seed: None,
            buckets: default_buckets(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            puppets: default_puppets(),
            show_skeleton: default_true(),
            target_fps: default_target_fps(),
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load the file if present; fall back to defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.camera.enabled);
        assert_eq!((config.camera.width, config.camera.height), (640, 480));
        assert_eq!(config.paint.fade_step, 1);
        assert_eq!(config.paint.rotation_period, 60);
        assert_eq!(config.paint.buckets.len(), 2);
        assert_eq!(config.paint.buckets[0].color, [0, 0, 255]);
        assert_eq!(config.demo.puppets, 2);
    }

    #[test]
    fn test_bucketless_variant() {
        let config = Config::parse(
            r#"
            [paint]
            buckets = []
            seed = 7
            initial_alpha = 100
            "#,
        )
        .unwrap();
        assert!(config.paint.buckets.is_empty());
        assert_eq!(config.paint.seed, Some(7));
        assert_eq!(config.paint.initial_alpha, 100);
        assert_eq!(config.paint.blend_radius, 150.0);
    }

    #[test]
    fn test_custom_bucket() {
        let config = Config::parse(
            r#"
            [[paint.buckets]]
            x = 0
            y = 0
            width = 50
            height = 60
            color = [255, 128, 0]
            "#,
        )
        .unwrap();
        assert_eq!(
            config.paint.buckets,
            vec![BucketConfig { x: 0, y: 0, width: 50, height: 60, color: [255, 128, 0] }]
        );
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(Config::parse("[paint]\nfade_step = \"fast\"").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::load_or_default("definitely/not/here/bodypaint.toml");
        assert_eq!(config.paint.diffusion_radius, 20.0);
    }
}
