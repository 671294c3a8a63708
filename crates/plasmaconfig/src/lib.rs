use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialise configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionSetting {
    Forward,
    Reverse,
    #[serde(alias = "ping-pong", alias = "ping_pong")]
    Pingpong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSetting {
    Low,
    High,
}

/// On-disk plasma configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlasmaFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub plasma: PlasmaSection,
    #[serde(default)]
    pub window: WindowSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlasmaSection {
    /// `#rrggbb` tint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_custom_color: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<DirectionSetting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse_interactive: Option<bool>,
    /// Fixed downscale factor; unset means area-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_downscale: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WindowSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparent: Option<bool>,
    /// Frame rate cap; `0` means uncapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fps: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerSetting>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

impl Default for PlasmaFile {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            plasma: PlasmaSection::default(),
            window: WindowSection::default(),
        }
    }
}

impl PlasmaFile {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: PlasmaFile = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values no renderer could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CURRENT_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CURRENT_VERSION}",
                self.version
            )));
        }

        if let Some(speed) = self.plasma.speed {
            if !speed.is_finite() {
                return Err(ConfigError::Invalid("plasma.speed must be a finite number".into()));
            }
        }

        if let Some(downscale) = self.plasma.quality_downscale {
            if !(downscale.is_finite() && downscale > 0.0) {
                return Err(ConfigError::Invalid(
                    "plasma.quality_downscale must be greater than zero".into(),
                ));
            }
        }

        if self.window.width == Some(0) || self.window.height == Some(0) {
            return Err(ConfigError::Invalid(
                "window width and height must be greater than zero".into(),
            ));
        }

        if let Some(fps) = self.window.max_fps {
            if fps < 0.0 || !fps.is_finite() {
                return Err(ConfigError::Invalid("window.max_fps must be >= 0".into()));
            }
        }

        Ok(())
    }

    /// Values that are accepted but will not behave as the user likely expects.
    pub fn warnings(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let Some(color) = &self.plasma.color {
            if !is_hex_color(color) {
                issues.push(format!(
                    "plasma.color '{color}' is not a #rrggbb value; the fallback tint will be used"
                ));
            }
        }

        if let Some(opacity) = self.plasma.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                issues.push(format!("plasma.opacity {opacity} is outside [0, 1]"));
            }
        }

        if let Some(scale) = self.plasma.scale {
            if !(scale.is_finite() && scale > 0.0) {
                issues.push(format!("plasma.scale {scale} is not positive; 1.0 will be used"));
            }
        }

        issues
    }
}

/// Six hex digits with an optional leading `#`.
pub fn is_hex_color(value: &str) -> bool {
    let digits = value.strip_prefix('#').unwrap_or(value);
    digits.len() == 6 && digits.chars().all(|ch| ch.is_ascii_hexdigit())
}
