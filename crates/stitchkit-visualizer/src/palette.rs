//! Preview colours
//!
//! Colours are a presentation concern. The decoder only asks a
//! [`Palette`] for the colour of a group ordinal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert from HSV with all components in `[0, 1]`
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let h = h.rem_euclid(1.0) * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - f * s);
        let t = v * (1.0 - (1.0 - f) * s);

        let (r, g, b) = match sector as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Maps a colour group ordinal to a display colour
pub trait Palette {
    fn color(&self, ordinal: u32) -> Rgb;
}

impl<F> Palette for F
where
    F: Fn(u32) -> Rgb,
{
    fn color(&self, ordinal: u32) -> Rgb {
        self(ordinal)
    }
}

/// Fully saturated hues spread over the colour wheel, walked downwards
///
/// Ordinal 0 takes the top of the cycle; ordinals wrap after `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HueCyclePalette {
    total: u32,
}

impl HueCyclePalette {
    /// Palette for `total` expected colours (at least one)
    pub fn new(total: u32) -> Self {
        Self {
            total: total.max(1),
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}

impl Palette for HueCyclePalette {
    fn color(&self, ordinal: u32) -> Rgb {
        let hue = 1.0 - f64::from(ordinal) / f64::from(self.total);
        Rgb::from_hsv(hue, 1.0, 1.0)
    }
}
