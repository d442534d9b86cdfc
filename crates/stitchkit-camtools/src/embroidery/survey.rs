use serde::{Deserialize, Serialize};
use stitchkit_core::units::scale_coordinate;
use stitchkit_core::{Bounds, StitchKind, StitchSource};

/// Result of the first pass over a pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    /// Extent of every event in machine units, `None` for an empty pattern
    pub bounds: Option<Bounds>,
    /// Colour count: one plus the number of colour changes
    pub color_count: u32,
    /// Number of STITCH events
    pub stitch_count: u64,
}

impl Survey {
    /// Scan the pattern once
    pub fn scan<S: StitchSource + ?Sized>(source: &S, scaling_factor: f64) -> Self {
        let mut survey = Self {
            bounds: None,
            color_count: 1,
            stitch_count: 0,
        };

        for event in source.stitches() {
            match event.kind {
                StitchKind::ColorChange => survey.color_count += 1,
                StitchKind::Stitch => survey.stitch_count += 1,
                _ => {}
            }

            let x = scale_coordinate(event.x, scaling_factor);
            let y = scale_coordinate(event.y, scaling_factor);
            survey.bounds = Some(Bounds::extend(survey.bounds, x, y));
        }

        survey
    }
}
