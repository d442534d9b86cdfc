//! JSON-backed stitch pattern
//!
//! Native embroidery container formats are decoded elsewhere; this type
//! holds an already flattened stitch list:
//!
//! ```json
//! { "name": "flower", "stitches": [ { "index": 0, "x": 0, "y": 0, "kind": "JUMP" } ] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{StitchEvent, StitchSource};
use crate::error::SourceError;

/// An ordered list of stitch events with an optional name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StitchPattern {
    /// Pattern name, written as a header comment
    #[serde(default)]
    pub name: Option<String>,
    /// Events in sequence order
    pub stitches: Vec<StitchEvent>,
}

impl StitchPattern {
    /// Create a validated pattern from events
    pub fn new(name: Option<String>, stitches: Vec<StitchEvent>) -> Result<Self, SourceError> {
        let pattern = Self { name, stitches };
        pattern.validate()?;
        Ok(pattern)
    }

    /// Load a pattern from a JSON file
    ///
    /// When the document has no name, the file stem is used.
    pub fn load_from_file(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut pattern = Self::from_json(&content)?;
        if pattern.name.is_none() {
            pattern.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string());
        }

        tracing::debug!(
            "Loaded pattern {:?} with {} stitches from {}",
            pattern.name,
            pattern.stitches.len(),
            path.display()
        );
        Ok(pattern)
    }

    /// Parse and validate a pattern from a JSON string
    pub fn from_json(content: &str) -> Result<Self, SourceError> {
        let pattern: Self = serde_json::from_str(content)?;
        pattern.validate()?;
        Ok(pattern)
    }

    /// Check index ordering and coordinate sanity
    pub fn validate(&self) -> Result<(), SourceError> {
        let mut previous: Option<u64> = None;
        for stitch in &self.stitches {
            if !stitch.x.is_finite() || !stitch.y.is_finite() {
                return Err(SourceError::NonFiniteCoordinate {
                    index: stitch.index,
                });
            }
            if let Some(prev) = previous {
                if stitch.index <= prev {
                    return Err(SourceError::OutOfOrder {
                        index: stitch.index,
                        previous: prev,
                    });
                }
            }
            previous = Some(stitch.index);
        }
        Ok(())
    }
}

impl StitchSource for StitchPattern {
    fn stitches(&self) -> &[StitchEvent] {
        &self.stitches
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
