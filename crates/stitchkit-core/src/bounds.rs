//! Axis-aligned bounding box in machine units

use serde::{Deserialize, Serialize};

/// Extent of a set of points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Degenerate box containing a single point
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Grow the box to contain `(x, y)`
    pub fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Bounds of an optional box extended by a point
    pub fn extend(bounds: Option<Self>, x: f64, y: f64) -> Self {
        match bounds {
            Some(mut b) => {
                b.include(x, y);
                b
            }
            None => Self::at(x, y),
        }
    }

    /// Smallest box containing every point, `None` when there are none
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points
            .into_iter()
            .fold(None, |acc, (x, y)| Some(Self::extend(acc, x, y)))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Corners in visiting order: lower-left, upper-left, upper-right, lower-right
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.min_y),
            (self.min_x, self.max_y),
            (self.max_x, self.max_y),
            (self.max_x, self.min_y),
        ]
    }
}
