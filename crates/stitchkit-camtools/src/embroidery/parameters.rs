use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, ParameterResult};

/// Stepper acceleration profile
///
/// The Z axis drives the needle. Its acceleration is scaled down for the
/// low-speed stitches that anchor a fresh thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccelerationSettings {
    /// X axis acceleration
    pub x: u32,
    /// Y axis acceleration
    pub y: u32,
    /// Z axis acceleration used at high needle speed
    pub z_max: u32,
}

impl Default for AccelerationSettings {
    fn default() -> Self {
        Self {
            x: 300,
            y: 500,
            z_max: 2000,
        }
    }
}

/// Parameters for the embroidery generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbroideryParameters {
    /// Feed rate for rapid relocation moves
    pub jump_speed: u32,
    /// Feed rate for needle synchronised moves
    pub stitch_speed: u32,
    /// Needle speed for the first stitches of a thread run
    pub z_low_speed: u32,
    /// Needle speed once the thread is anchored
    pub z_high_speed: u32,
    /// Acceleration profile; no `M201` lines are written when absent
    pub acceleration: Option<AccelerationSettings>,
    /// Minimum distance between sewn stitches; closer ones are skipped
    pub clearance: Option<f64>,
    /// Source units per machine unit
    pub scaling_factor: f64,
    /// Trace the pattern bounding box before sewing
    pub visit_corners: bool,
    /// Minimum progress change, in percent, between progress lines
    pub progress_step: u32,
}

impl Default for EmbroideryParameters {
    fn default() -> Self {
        Self {
            jump_speed: 3000,
            stitch_speed: 800,
            z_low_speed: 200,
            z_high_speed: 600,
            acceleration: None,
            clearance: None,
            scaling_factor: 10.0,
            visit_corners: false,
            progress_step: 5,
        }
    }
}

impl EmbroideryParameters {
    /// Preset with acceleration control and fine progress reporting
    pub fn detailed() -> Self {
        Self {
            acceleration: Some(AccelerationSettings::default()),
            progress_step: 1,
            ..Self::default()
        }
    }

    /// Validate parameters before generation
    pub fn validate(&self) -> ParameterResult<()> {
        if !self.scaling_factor.is_finite() {
            return Err(ParameterError::NotFinite {
                name: "scaling_factor".to_string(),
            });
        }
        if self.scaling_factor <= 0.0 {
            return Err(ParameterError::not_positive(
                "scaling_factor",
                self.scaling_factor,
            ));
        }

        for (name, value) in [
            ("jump_speed", self.jump_speed),
            ("stitch_speed", self.stitch_speed),
            ("z_low_speed", self.z_low_speed),
            ("z_high_speed", self.z_high_speed),
        ] {
            if value == 0 {
                return Err(ParameterError::not_positive(name, 0.0));
            }
        }

        if let Some(acc) = &self.acceleration {
            for (name, value) in [
                ("acceleration.x", acc.x),
                ("acceleration.y", acc.y),
                ("acceleration.z_max", acc.z_max),
            ] {
                if value == 0 {
                    return Err(ParameterError::not_positive(name, 0.0));
                }
            }
            if self.z_low_acceleration() == Some(0) {
                return Err(ParameterError::InvalidValue {
                    name: "acceleration.z_max".to_string(),
                    reason: format!(
                        "{} is too small for speeds {}/{}, low-speed Z acceleration rounds to 0",
                        acc.z_max, self.z_low_speed, self.z_high_speed
                    ),
                });
            }
        }

        if let Some(clearance) = self.clearance {
            if !clearance.is_finite() {
                return Err(ParameterError::NotFinite {
                    name: "clearance".to_string(),
                });
            }
            if clearance < 0.0 {
                return Err(ParameterError::InvalidValue {
                    name: "clearance".to_string(),
                    reason: format!("must not be negative, got {}", clearance),
                });
            }
        }

        if self.progress_step == 0 {
            return Err(ParameterError::not_positive("progress_step", 0.0));
        }

        Ok(())
    }

    /// Clearance distance, zero when disabled
    pub fn effective_clearance(&self) -> f64 {
        self.clearance.unwrap_or(0.0)
    }

    /// Z acceleration for the low-speed stitches
    ///
    /// Scaled by the square of the speed ratio so both speeds reach full
    /// speed over a similar needle travel.
    pub fn z_low_acceleration(&self) -> Option<u32> {
        self.acceleration.map(|acc| {
            let ratio = f64::from(self.z_high_speed) / f64::from(self.z_low_speed);
            (f64::from(acc.z_max) / ratio.powi(2)) as u32
        })
    }

    /// Z acceleration for the high-speed stitches
    pub fn z_high_acceleration(&self) -> Option<u32> {
        self.acceleration.map(|acc| acc.z_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EmbroideryParameters::default().validate().is_ok());
        assert!(EmbroideryParameters::detailed().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_scaling() {
        let params = EmbroideryParameters {
            scaling_factor: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParameterError::NotPositive { .. })
        ));

        let params = EmbroideryParameters {
            scaling_factor: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParameterError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_speed() {
        let params = EmbroideryParameters {
            stitch_speed: 0,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert_eq!(err, ParameterError::not_positive("stitch_speed", 0.0));
    }

    #[test]
    fn test_rejects_zero_acceleration() {
        let params = EmbroideryParameters {
            acceleration: Some(AccelerationSettings {
                x: 300,
                y: 0,
                z_max: 2000,
            }),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_clearance() {
        let params = EmbroideryParameters {
            clearance: Some(-0.5),
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParameterError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_z_accelerations() {
        let params = EmbroideryParameters {
            z_low_speed: 200,
            z_high_speed: 600,
            acceleration: Some(AccelerationSettings {
                x: 300,
                y: 500,
                z_max: 1800,
            }),
            ..Default::default()
        };
        assert_eq!(params.z_low_acceleration(), Some(200));
        assert_eq!(params.z_high_acceleration(), Some(1800));

        let params = EmbroideryParameters::default();
        assert_eq!(params.z_low_acceleration(), None);
    }

    #[test]
    fn test_rejects_z_max_that_truncates_to_zero() {
        let params = EmbroideryParameters {
            acceleration: Some(AccelerationSettings {
                x: 300,
                y: 500,
                z_max: 8,
            }),
            ..EmbroideryParameters::default()
        };
        assert_eq!(params.z_low_acceleration(), Some(0));
        assert!(matches!(
            params.validate(),
            Err(ParameterError::InvalidValue { ref name, .. }) if name == "acceleration.z_max"
        ));

        // 9 / (600 / 200)^2 == 1
        let params = EmbroideryParameters {
            acceleration: Some(AccelerationSettings {
                x: 300,
                y: 500,
                z_max: 9,
            }),
            ..EmbroideryParameters::default()
        };
        assert_eq!(params.z_low_acceleration(), Some(1));
        assert!(params.validate().is_ok());
    }
}
