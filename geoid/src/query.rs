//! Interpolation method selection, batch queries and grid statistics.

use std::fmt;
use std::str::FromStr;

use crate::grid::GeoidGrid;

/// Interpolation method used to turn grid samples into a height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Interpolation {
    /// 4-node bilinear blend.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "bilinear"))]
    Linear,
    /// 12-node least-squares cubic fit.
    #[cfg(feature = "cubic")]
    #[cfg_attr(feature = "serde", serde(alias = "bicubic"))]
    Cubic,
}

impl Interpolation {
    /// Every method compiled into this build.
    pub fn all() -> &'static [Interpolation] {
        &[
            Interpolation::Linear,
            #[cfg(feature = "cubic")]
            Interpolation::Cubic,
        ]
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Interpolation::Linear => "linear",
            #[cfg(feature = "cubic")]
            Interpolation::Cubic => "cubic",
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown interpolation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseInterpolationError(String);

impl fmt::Display for ParseInterpolationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Interpolation::all().iter().map(|m| m.as_str()).collect();
        write!(
            f,
            "unknown interpolation method '{}' (expected one of: {})",
            self.0,
            names.join(", ")
        )
    }
}

impl std::error::Error for ParseInterpolationError {}

impl FromStr for Interpolation {
    type Err = ParseInterpolationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" | "bilinear" => Ok(Interpolation::Linear),
            #[cfg(feature = "cubic")]
            "cubic" | "bicubic" => Ok(Interpolation::Cubic),
            _ => Err(ParseInterpolationError(s.to_string())),
        }
    }
}

/// Extremes of a grid's samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSummary {
    /// Smallest raw sample.
    pub min_raw: u16,
    /// Largest raw sample.
    pub max_raw: u16,
    /// Lowest geoid height (`offset + scale * sample`) in the grid.
    pub min_height: f64,
    /// Highest geoid height in the grid.
    pub max_height: f64,
}

impl GeoidGrid {
    /// Geoid height at `lat`, `lon` using the given method.
    pub fn height_at(&self, lat: f64, lon: f64, method: Interpolation) -> f64 {
        match method {
            Interpolation::Linear => self.height_linear(lat, lon),
            #[cfg(feature = "cubic")]
            Interpolation::Cubic => self.height_cubic(lat, lon),
        }
    }

    /// Geoid heights for a batch of `(lat, lon)` pairs, in input order.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let coords = vec![(35.3606, 138.7274), (27.9881, 86.9250)];
    /// let heights = grid.heights(&coords, Interpolation::Linear);
    /// ```
    pub fn heights(&self, coords: &[(f64, f64)], method: Interpolation) -> Vec<f64> {
        coords
            .iter()
            .map(|&(lat, lon)| self.height_at(lat, lon, method))
            .collect()
    }

    /// Scan every sample and report the extremes.
    pub fn summary(&self) -> GridSummary {
        let (min_raw, max_raw) = self
            .samples()
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .fold((u16::MAX, u16::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));

        // A negative scale swaps which raw extreme gives the lowest height.
        let a = self.apply_affine(min_raw as f64);
        let b = self.apply_affine(max_raw as f64);

        GridSummary {
            min_raw,
            max_raw,
            min_height: a.min(b),
            max_height: a.max(b),
        }
    }
}
