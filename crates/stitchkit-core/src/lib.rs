//! # StitchKit Core
//!
//! Core types, traits, and utilities for StitchKit.
//! Provides the stitch data model, the machine instruction model,
//! unit mapping helpers, and the line sink abstraction shared by the
//! generator and the previewer.

pub mod bounds;
pub mod data;
pub mod error;
pub mod gcode;
pub mod sink;
pub mod units;

pub use bounds::Bounds;

pub use data::{StitchEvent, StitchKind, StitchPattern, StitchSource};

pub use error::{GcodeError, SourceError};

pub use gcode::{Instruction, Move, PauseCode, MAX_COLOR_CODE, THREAD_INSERTED_CODE, TRIM_CODE};

pub use sink::{LineSink, WriteSink};
