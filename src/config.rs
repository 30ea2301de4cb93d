// src/config.rs
//! Configuration for the gesture pipeline and the desktop front-end

use crate::audio::DEFAULT_TRACK;
use crate::classifier::DEFAULT_PINCH_THRESHOLD;
use crate::fingers::ThumbRule;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ROTATION_INCREMENT: f64 = 0.01;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub classifier: ClassifierConfig,
    pub smoothing: SmoothingConfig,
    pub output: OutputConfig,
    pub session: SessionConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Hands classified per frame; the first one drives the outputs
    pub max_hands: usize,

    /// Frame rate the landmark feed is paced at
    pub target_fps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Thumb-tip to index-tip distance (normalized) below which a pinch is reported
    pub pinch_threshold: f64,

    pub thumb_rule: ThumbRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Off by default so labels match single-frame classification
    pub enabled: bool,

    pub min_stable_frames: usize,
}

/// Pixel rectangle on the 640x480 output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Radians added to both rotation axes on every pinch frame
    pub rotation_increment: f64,

    pub jordano_box: BoundingBox,

    pub piolin_box: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Record every processed frame for CSV export
    pub record: bool,

    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Track played on Fist / ThumbsUp, stopped on PeaceSign
    pub track_path: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            track_path: PathBuf::from(DEFAULT_TRACK),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            max_hands: 1,
            target_fps: 30,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            thumb_rule: ThumbRule::Fixed,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_stable_frames: 3,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            rotation_increment: DEFAULT_ROTATION_INCREMENT,
            jordano_box: BoundingBox::new(10, 10, 300, 300),
            piolin_box: BoundingBox::new(10, 10, 200, 200),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            record: true,
            output_directory: directories::UserDirs::new()
                .and_then(|dirs| dirs.document_dir().map(|p| p.join("GestureControl")))
                .unwrap_or_else(|| PathBuf::from("./output")),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tracking.max_hands == 0 {
            return Err(Error::Config("max_hands must be at least 1".to_string()));
        }
        if self.tracking.target_fps == 0 {
            return Err(Error::Config("Target FPS must be greater than 0".to_string()));
        }

        let threshold = self.classifier.pinch_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Error::Config(format!(
                "Pinch threshold must be in (0, 1], got {}",
                threshold
            )));
        }

        if self.smoothing.min_stable_frames == 0 {
            return Err(Error::Config(
                "min_stable_frames must be at least 1".to_string(),
            ));
        }

        let increment = self.output.rotation_increment;
        if !increment.is_finite() || increment < 0.0 {
            return Err(Error::Config(format!(
                "Rotation increment must be finite and non-negative, got {}",
                increment
            )));
        }

        if self.audio.track_path.as_os_str().is_empty() {
            return Err(Error::Config("audio.track_path must not be empty".to_string()));
        }

        for (name, bbox) in [("jordano_box", self.output.jordano_box), ("piolin_box", self.output.piolin_box)] {
            if bbox.width == 0 || bbox.height == 0 {
                return Err(Error::Config(format!("{} must have a non-zero size", name)));
            }
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"{
  "tracking": { "max_hands": 1, "target_fps": 30 },
  "classifier": { "pinch_threshold": 0.05, "thumb_rule": "fixed" },
  "smoothing": { "enabled": false, "min_stable_frames": 3 },
  "output": {
    "rotation_increment": 0.01,
    "jordano_box": { "x": 10, "y": 10, "width": 300, "height": 300 },
    "piolin_box": { "x": 10, "y": 10, "width": 200, "height": 200 }
  },
  "session": { "record": true, "output_directory": "./output" },
  "audio": { "track_path": "assets/musica.mp3" }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = Config::default();
        assert_eq!(config.tracking.max_hands, 1);
        assert_eq!(config.classifier.pinch_threshold, 0.05);
        assert_eq!(config.output.rotation_increment, 0.01);
        assert!(!config.smoothing.enabled);
        assert_eq!(config.classifier.thumb_rule, ThumbRule::Fixed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = serde_json::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.piolin_box, BoundingBox::new(10, 10, 200, 200));
        assert_eq!(config.audio, AudioConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "classifier": { "thumb_rule": "handedness" } }"#).unwrap();
        assert_eq!(config.classifier.thumb_rule, ThumbRule::Handedness);
        assert_eq!(config.classifier.pinch_threshold, 0.05);
        assert_eq!(config.tracking.target_fps, 30);
        assert_eq!(config.audio.track_path, PathBuf::from(DEFAULT_TRACK));
    }

    #[test]
    fn test_audio_track_path_configurable() {
        let config: Config =
            serde_json::from_str(r#"{ "audio": { "track_path": "/srv/music/loop.ogg" } }"#).unwrap();
        assert_eq!(config.audio.track_path, PathBuf::from("/srv/music/loop.ogg"));
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.audio.track_path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.tracking.max_hands = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.classifier.pinch_threshold = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.rotation_increment = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.piolin_box.width = 0;
        assert!(config.validate().is_err());
    }
}
