//! # StitchKit Settings
//!
//! Persisted machine and generation settings, stored as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{
    AccelerationLimits, Config, GenerationSettings, MachineSettings, DEFAULT_RECENT_FILES,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
