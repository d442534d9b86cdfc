//! Configuration persistence
//!
//! Settings are stored as JSON or TOML, chosen by file extension, under
//! the platform configuration directory by default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Maximum number of recent pattern files kept
pub const DEFAULT_RECENT_FILES: usize = 10;

/// Stepper acceleration limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccelerationLimits {
    pub x: u32,
    pub y: u32,
    pub z_max: u32,
}

/// Machine speed and acceleration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Feed rate for jumps
    pub jump_speed: u32,
    /// Feed rate for stitches
    pub stitch_speed: u32,
    /// Needle speed while anchoring a thread
    pub z_low_speed: u32,
    /// Needle speed once anchored
    pub z_high_speed: u32,
    /// Acceleration limits, omitted to leave the firmware defaults alone
    pub acceleration: Option<AccelerationLimits>,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            jump_speed: 3000,
            stitch_speed: 800,
            z_low_speed: 200,
            z_high_speed: 600,
            acceleration: Some(AccelerationLimits {
                x: 300,
                y: 500,
                z_max: 2000,
            }),
        }
    }
}

/// Pattern conversion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Pattern units per millimetre
    pub scaling_factor: f64,
    /// Minimum stitch spacing in millimetres
    pub clearance: Option<f64>,
    /// Trace the hoop extent before sewing
    pub visit_corners: bool,
    /// Progress reporting granularity in percent
    pub progress_step: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            scaling_factor: 10.0,
            clearance: None,
            visit_corners: false,
            progress_step: 1,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Recently converted patterns, most recent first
    pub recent_files: Vec<PathBuf>,
    /// Machine settings
    pub machine: MachineSettings,
    /// Generation settings
    pub generation: GenerationSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("stitchkit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::LoadError {
            path: path.display().to_string(),
            source,
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load config from file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        let save_error = |source| SettingsError::SaveError {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(save_error)?;
        }
        std::fs::write(path, content).map_err(save_error)?;

        tracing::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let m = &self.machine;
        for (key, value) in [
            ("machine.jump_speed", m.jump_speed),
            ("machine.stitch_speed", m.stitch_speed),
            ("machine.z_low_speed", m.z_low_speed),
            ("machine.z_high_speed", m.z_high_speed),
        ] {
            if value == 0 {
                return Err(ConfigError::out_of_range(key, value));
            }
        }

        if let Some(acc) = &m.acceleration {
            for (key, value) in [
                ("machine.acceleration.x", acc.x),
                ("machine.acceleration.y", acc.y),
                ("machine.acceleration.z_max", acc.z_max),
            ] {
                if value == 0 {
                    return Err(ConfigError::out_of_range(key, value));
                }
            }
        }

        let g = &self.generation;
        if !g.scaling_factor.is_finite() || g.scaling_factor <= 0.0 {
            return Err(ConfigError::out_of_range(
                "generation.scaling_factor",
                g.scaling_factor,
            ));
        }

        if let Some(clearance) = g.clearance {
            if !clearance.is_finite() || clearance < 0.0 {
                return Err(ConfigError::out_of_range("generation.clearance", clearance));
            }
        }

        if g.progress_step == 0 || g.progress_step > 100 {
            return Err(ConfigError::out_of_range(
                "generation.progress_step",
                g.progress_step,
            ));
        }

        Ok(())
    }

    /// Add file to recent files list
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|f| f != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(DEFAULT_RECENT_FILES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_speed() {
        let mut config = Config::default();
        config.machine.z_low_speed = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::out_of_range("machine.z_low_speed", 0))
        );
    }

    #[test]
    fn test_rejects_bad_scaling() {
        let mut config = Config::default();
        config.generation.scaling_factor = -2.0;
        assert!(config.validate().is_err());
        config.generation.scaling_factor = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_clearance() {
        let mut config = Config::default();
        config.generation.clearance = Some(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_recent_files_most_recent_first() {
        let mut config = Config::default();
        config.add_recent_file(PathBuf::from("a.json"));
        config.add_recent_file(PathBuf::from("b.json"));
        config.add_recent_file(PathBuf::from("a.json"));
        assert_eq!(
            config.recent_files,
            vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
        );

        for i in 0..20 {
            config.add_recent_file(PathBuf::from(format!("{}.json", i)));
        }
        assert_eq!(config.recent_files.len(), DEFAULT_RECENT_FILES);
        assert_eq!(config.recent_files[0], PathBuf::from("19.json"));
    }

    #[test]
    fn test_unknown_extension() {
        let err = Config::default()
            .save_to_file(Path::new("config.yaml"))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Config(ConfigError::UnsupportedFormat(_))
        ));
    }
}
