//! # geoid - Geoid Height Library
//!
//! Memory-mapped access to global geoid undulation grids stored as 16-bit
//! binary PGM files (the format GeographicLib ships EGM84/EGM96/EGM2008 in),
//! with bilinear and bicubic interpolation.
//!
//! ## Features
//!
//! - **Fast**: Memory-mapped I/O, no decoding step at load time
//! - **Strict**: The header is validated byte by byte before any query runs
//! - **Fallbacks**: Load from the first of several candidate paths
//! - **Thread-safe**: A loaded grid is immutable and can be shared freely
//!
//! ## Quick Start
//!
//! ```ignore
//! use geoid::{GeoidGrid, Interpolation};
//!
//! let grid = GeoidGrid::load(&[
//!     "/usr/local/share/GeographicLib/geoids/egm96-5.pgm",
//!     "/usr/share/GeographicLib/geoids/egm96-5.pgm",
//! ])?;
//!
//! let n = grid.height_linear(35.3606, 138.7274);
//! let n_cubic = grid.height_at(35.3606, 138.7274, Interpolation::Cubic);
//! println!("Geoid height: {:.3}m ({:.3}m cubic)", n, n_cubic);
//! ```
//!
//! ## Grid Format
//!
//! - `P5` magic line, then optional `# Offset <f>` / `# Scale <f>` comments
//! - `width height` line, then a `65535` depth line
//! - `width * height` big-endian u16 samples, row 0 at the north pole
//!
//! Columns cover longitude `[0°, 360°)`; rows cover latitude `[90°, -90°]`
//! with both poles included. Geoid height is `offset + scale * sample`.
//!
//! ## Cargo Features
//!
//! - `cubic` (default): [`GeoidGrid::height_cubic`] and [`Interpolation::Cubic`]
//! - `geojson`: add geoid heights to GeoJSON geometries
//! - `serde`: (de)serialize [`Interpolation`]
//!
//! ## Data Sources
//!
//! Geoid grids can be downloaded from:
//! - <https://geographiclib.sourceforge.io/C++/doc/geoid.html>

pub mod error;
pub mod header;
pub mod grid;
pub mod query;

mod bilinear;

#[cfg(feature = "cubic")]
mod bicubic;

#[cfg(feature = "geojson")]
pub mod geojson;

// Re-export main types at crate root for convenience
pub use error::{GeoidError, Result};
pub use grid::GeoidGrid;
pub use query::{GridSummary, Interpolation, ParseInterpolationError};
