//! Unit mapping utilities
//!
//! Converts raw pattern coordinates into machine units and formats values
//! for instruction lines. All positions are rounded to
//! [`COORDINATE_DECIMALS`] fractional digits before they are compared or
//! written, so repeated identical stitches never drift.

/// Number of fractional digits kept for machine coordinates
pub const COORDINATE_DECIMALS: i32 = 2;

/// Round a value to `decimals` fractional digits
///
/// Negative zero is normalised to positive zero so that formatting never
/// produces `-0.00`.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Map a raw pattern coordinate into machine units
///
/// * `raw` - Coordinate in source units
/// * `scaling_factor` - Source units per machine unit (must be > 0)
pub fn scale_coordinate(raw: f64, scaling_factor: f64) -> f64 {
    round_to(raw / scaling_factor, COORDINATE_DECIMALS)
}

/// Format a machine coordinate for an instruction line
pub fn format_coordinate(value: f64) -> String {
    format!(
        "{:.prec$}",
        round_to(value, COORDINATE_DECIMALS),
        prec = COORDINATE_DECIMALS as usize
    )
}

/// Re-map a number from one range to another, truncating toward zero
///
/// A degenerate input range maps everything to `out_min`.
pub fn map_range(x: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> i64 {
    if in_max == in_min {
        return out_min as i64;
    }
    ((x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min) as i64
}

/// Euclidean distance between two points
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}
