//! # StitchKit
//!
//! Converts embroidery stitch patterns into G-code for a custom
//! embroidery machine, and decodes that G-code back into per-colour
//! point groups for preview.
//!
//! ## Architecture
//!
//! StitchKit is organized as a workspace with multiple crates:
//!
//! 1. **stitchkit-core** - Stitch data model, instruction model, unit mapping
//! 2. **stitchkit-camtools** - Stitch pattern to G-code generator
//! 3. **stitchkit-visualizer** - G-code decoder and colour palette
//! 4. **stitchkit-settings** - Persisted configuration
//! 5. **stitchkit** - Artifact lifecycle, generation session and CLI

pub mod artifact;
pub mod session;

pub use artifact::{FinishedArtifact, GcodeArtifact};
pub use session::{GenerationSession, SessionError, SessionResult};

pub use stitchkit_core::{
    GcodeError, Instruction, LineSink, SourceError, StitchEvent, StitchKind, StitchPattern,
    StitchSource,
};

pub use stitchkit_camtools::{
    AccelerationSettings, CamToolError, EmbroideryGenerator, EmbroideryParameters,
    GenerationSummary, MachineContext, ParameterError,
};

pub use stitchkit_visualizer::{
    decode_file, ColorGroup, GcodeDecoder, HueCyclePalette, Palette, Preview, Rgb,
};

pub use stitchkit_settings::{Config, GenerationSettings, MachineSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Generator parameters described by a configuration
pub fn parameters_from_config(config: &Config) -> EmbroideryParameters {
    let machine = &config.machine;
    let generation = &config.generation;

    EmbroideryParameters {
        jump_speed: machine.jump_speed,
        stitch_speed: machine.stitch_speed,
        z_low_speed: machine.z_low_speed,
        z_high_speed: machine.z_high_speed,
        acceleration: machine.acceleration.map(|acc| AccelerationSettings {
            x: acc.x,
            y: acc.y,
            z_max: acc.z_max,
        }),
        clearance: generation.clearance,
        scaling_factor: generation.scaling_factor,
        visit_corners: generation.visit_corners,
        progress_step: generation.progress_step,
    }
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, keeping stdout for command results
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_from_default_config() {
        let config = Config::default();
        let params = parameters_from_config(&config);
        assert!(params.validate().is_ok());
        assert_eq!(params.jump_speed, config.machine.jump_speed);
        assert_eq!(params.progress_step, config.generation.progress_step);
        assert_eq!(params.acceleration.map(|a| a.z_max), Some(2000));
    }

    #[test]
    fn test_build_metadata() {
        assert!(!VERSION.is_empty());
        assert!(!BUILD_DATE.is_empty());
    }
}
