//! # StitchKit CAM Tools
//!
//! This crate turns an ordered stitch pattern into the G-code program
//! understood by the embroidery machine.
//!
//! ## Included
//!
//! - **Embroidery Generator**: two-pass emitter driven by an explicit
//!   machine context, one step per stitch event
//! - **Parameters**: speeds, acceleration profile, clearance, scaling and
//!   progress reporting, validated before any line is written

pub mod embroidery;
pub mod error;

pub use embroidery::{
    AccelerationSettings, EmbroideryGenerator, EmbroideryParameters, GenerationSummary,
    MachineContext, Survey,
};
pub use error::{CamToolError, CamToolResult, ParameterError, ParameterResult};
