//! Data models for stitch patterns
//!
//! This module provides:
//! - Stitch event kinds and the immutable stitch event record
//! - The `StitchSource` contract consumed by the G-code emitter
//! - A JSON-backed `StitchPattern` implementation

pub mod pattern;

pub use pattern::StitchPattern;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a stitch event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StitchKind {
    /// Non-stitching relocation move
    Jump,
    /// Needle penetration at the target position
    Stitch,
    /// Boundary between thread colour segments
    ColorChange,
    /// Cut the thread, ending a stitch run
    Trim,
    /// Final relocation at the end of the pattern
    End,
}

impl fmt::Display for StitchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StitchKind::Jump => write!(f, "JUMP"),
            StitchKind::Stitch => write!(f, "STITCH"),
            StitchKind::ColorChange => write!(f, "COLOR_CHANGE"),
            StitchKind::Trim => write!(f, "TRIM"),
            StitchKind::End => write!(f, "END"),
        }
    }
}

/// A single stitch event in source units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StitchEvent {
    /// Position of the event in the pattern sequence
    pub index: u64,
    /// Raw X coordinate in source units
    pub x: f64,
    /// Raw Y coordinate in source units
    pub y: f64,
    /// Event kind
    pub kind: StitchKind,
}

impl StitchEvent {
    /// Create a new stitch event
    pub fn new(index: u64, x: f64, y: f64, kind: StitchKind) -> Self {
        Self { index, x, y, kind }
    }
}

/// Ordered, index-stable supply of stitch events
///
/// Ordering is the sole source of truth for machine behaviour; consumers
/// walk the events front to back and never seek.
pub trait StitchSource {
    /// All events in sequence order
    fn stitches(&self) -> &[StitchEvent];

    /// Total stitch count used to compute progress
    fn total_count(&self) -> u64 {
        self.stitches().len() as u64
    }

    /// Optional human readable pattern name
    fn name(&self) -> Option<&str> {
        None
    }
}

impl StitchSource for [StitchEvent] {
    fn stitches(&self) -> &[StitchEvent] {
        self
    }
}

impl StitchSource for Vec<StitchEvent> {
    fn stitches(&self) -> &[StitchEvent] {
        self
    }
}
