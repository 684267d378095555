//! Game configuration.
//!
//! Loaded once at startup from an optional TOML file and never mutated
//! afterwards. Every key is optional; missing keys fall back to the tuning
//! the game ships with.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::render::Rgb;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub physics: PhysicsConfig,
    pub pipes: PipeConfig,
    pub screen: ScreenConfig,
    pub colors: ColorConfig,
    pub gesture: GestureConfig,
    pub sim: SimConfig,
    pub webcam: WebcamConfig,
    pub assets: AssetConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    /// Added to the bird's velocity every tick (positive = down).
    pub gravity: f64,
    /// Velocity the bird is set to while the pinch is held.
    pub jump_strength: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.3,
            jump_strength: -6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipeConfig {
    pub gap: f64,
    pub speed: f64,
    pub width: f64,
    /// A new pipe spawns once the rightmost one is this far from the right edge.
    pub spawn_distance: f64,
    pub gap_top_min: u32,
    pub gap_top_max: u32,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            gap: 180.0,
            speed: 1.5,
            width: 55.0,
            spawn_distance: 200.0,
            gap_top_min: 100,
            gap_top_max: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenConfig {
    pub width: f64,
    pub height: f64,
    pub tick_rate_hz: u32,
    /// Fixed horizontal position of the bird.
    pub bird_x: f64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 600.0,
            tick_rate_hz: 60,
            bird_x: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub background: Rgb,
    pub bird: Rgb,
    pub pipe_top: Rgb,
    pub pipe_bottom: Rgb,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: Rgb(50, 50, 50),
            bird: Rgb(255, 255, 0),
            pipe_top: Rgb(153, 50, 204),
            pipe_bottom: Rgb(153, 50, 204),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    /// Thumb-to-index distance, in frame pixels, below which the hand counts
    /// as pinched.
    pub pinch_threshold_px: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold_px: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub frame_interval_ms: u64,
    /// How long one flap key event keeps the hand pinched. Longer than the
    /// usual terminal key-repeat delay, so a held key reads as one pinch.
    pub pinch_hold_ms: u64,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 33,
            pinch_hold_ms: 650,
            frame_width: 640,
            frame_height: 480,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebcamConfig {
    pub device_index: i32,
    pub model: PathBuf,
    pub input_size: u32,
    pub presence_threshold: f32,
}

impl Default for WebcamConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            model: PathBuf::from("models/hand_landmark.onnx"),
            input_size: 224,
            presence_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    pub dir: PathBuf,
    pub background: String,
    pub bird: String,
    pub logo: String,
    /// Logical edge length the logo is drawn at.
    pub logo_size: f64,
    pub logo_alpha: u8,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            background: "background_space.jpg".to_string(),
            bird: "duck.jpg".to_string(),
            logo: "logo.png".to_string(),
            logo_size: 150.0,
            logo_alpha: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    pub enabled: bool,
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.15,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let screen = &self.screen;
        if screen.width <= 0.0 || screen.height <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "screen size must be positive, got {}x{}",
                screen.width, screen.height
            )));
        }
        if screen.tick_rate_hz == 0 {
            return Err(Error::InvalidConfig("tick_rate_hz must be non-zero".into()));
        }
        if self.pipes.gap_top_min > self.pipes.gap_top_max {
            return Err(Error::InvalidConfig(format!(
                "gap_top_min ({}) exceeds gap_top_max ({})",
                self.pipes.gap_top_min, self.pipes.gap_top_max
            )));
        }
        if self.pipes.width <= 0.0 {
            return Err(Error::InvalidConfig("pipe width must be positive".into()));
        }
        if self.pipes.speed <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "pipe speed must be positive, got {}",
                self.pipes.speed
            )));
        }
        // Outside this range a pipe can spawn on every tick without ever
        // scrolling away.
        if !(0.0..screen.width).contains(&self.pipes.spawn_distance) {
            return Err(Error::InvalidConfig(format!(
                "spawn_distance must be in 0..{}, got {}",
                screen.width, self.pipes.spawn_distance
            )));
        }
        Ok(())
    }

    pub fn tick_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.screen.tick_rate_hz as f64)
    }

    pub fn asset_path(&self, name: &str) -> PathBuf {
        self.assets.dir.join(name)
    }
}
