//! Geoid grid loading and raw sample access.
//!
//! This module provides the [`GeoidGrid`] struct, a read-only view over a
//! memory-mapped 16-bit PGM geoid model such as GeographicLib's
//! `egm96-5.pgm`.

use std::fs::File;
use std::io::ErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::{GeoidError, Result};
use crate::header::{self, Header, MIN_FILE_SIZE};

/// Backing bytes of a grid: a read-only file mapping or an owned buffer.
enum Storage {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for Storage {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Storage::Mapped(mmap) => &mmap[..],
            Storage::Owned(bytes) => &bytes[..],
        }
    }
}

/// Integer cell and fractional offsets of a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CellPosition {
    pub ix: i64,
    pub iy: i64,
    pub fx: f64,
    pub fy: f64,
}

/// A geoid undulation grid covering the whole globe.
///
/// Columns span longitude `[0°, 360°)`, rows span latitude from `+90°`
/// (row 0) down to `-90°` (row `height - 1`). Each sample is an unsigned
/// 16-bit value; the geoid height is `offset + scale * sample`.
///
/// The grid is immutable once loaded, so it can be shared between threads
/// and queried concurrently. Dropping it unmaps the file.
///
/// # Example
///
/// ```ignore
/// use geoid::GeoidGrid;
///
/// let grid = GeoidGrid::load(&[
///     "/usr/local/share/GeographicLib/geoids/egm96-5.pgm",
///     "/usr/share/GeographicLib/geoids/egm96-5.pgm",
/// ])?;
/// let n = grid.height_linear(27.9881, 86.9250);
/// println!("Geoid height: {:.3}m", n);
/// ```
pub struct GeoidGrid {
    /// File mapping or owned buffer, header included
    data: Storage,
    /// Byte index where samples start
    data_start: usize,
    /// Number of columns
    width: usize,
    /// Number of rows
    height: usize,
    /// Columns per degree of longitude
    lon_resolution: f64,
    /// Rows per degree of latitude
    lat_resolution: f64,
    offset: f64,
    scale: f64,
    /// Path the grid was loaded from
    source: Option<PathBuf>,
}

impl std::fmt::Debug for GeoidGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoidGrid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("offset", &self.offset)
            .field("scale", &self.scale)
            .field("source", &self.source)
            .finish()
    }
}

impl GeoidGrid {
    /// Load a grid from the first candidate path that exists.
    ///
    /// Candidates are tried in order. A candidate that does not exist is
    /// skipped silently; the first one that does exist is used exclusively,
    /// and any error on it is returned without trying the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `paths` is empty ([`GeoidError::NoCandidates`])
    /// - no candidate exists ([`GeoidError::NotFound`], holding the last path)
    /// - the chosen file cannot be opened, stat'ed or mapped
    /// - the header or payload is malformed
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut last = None;

        for path in paths {
            let path = path.as_ref();
            match File::open(path) {
                Ok(file) => return Self::from_file(file, path),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "Geoid grid candidate not found");
                    last = Some(path);
                }
                Err(source) => {
                    return Err(GeoidError::Io {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            }
        }

        match last {
            Some(path) => Err(GeoidError::NotFound {
                path: path.to_path_buf(),
            }),
            None => Err(GeoidError::NoCandidates),
        }
    }

    /// Load a grid from a single path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(&[path])
    }

    /// Build a grid from an in-memory copy of a PGM file.
    ///
    /// The same header and size checks as [`Self::load`] apply.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let header = header::parse(&bytes, Path::new("<memory>"))?;
        Ok(Self::new(Storage::Owned(bytes), header, None))
    }

    fn from_file(file: File, path: &Path) -> Result<Self> {
        let io_error = |source: std::io::Error| GeoidError::Io {
            path: path.to_path_buf(),
            source,
        };

        let size = file.metadata().map_err(io_error)?.len();
        if size < MIN_FILE_SIZE {
            return Err(GeoidError::TooSmall {
                path: path.to_path_buf(),
                size,
            });
        }

        // SAFETY: The mapping is read-only and private to this grid. Geoid
        // model files are static data and are not modified while mapped.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| GeoidError::Map {
            path: path.to_path_buf(),
            source,
        })?;

        // On error the mapping is dropped here, before returning.
        let header = header::parse(&mmap, path)?;

        let grid = Self::new(Storage::Mapped(mmap), header, Some(path.to_path_buf()));
        tracing::info!(
            path = %path.display(),
            width = grid.width,
            height = grid.height,
            offset = grid.offset,
            scale = grid.scale,
            "Loaded geoid grid"
        );
        Ok(grid)
    }

    fn new(data: Storage, header: Header, source: Option<PathBuf>) -> Self {
        Self {
            data,
            data_start: header.data_start,
            width: header.width,
            height: header.height,
            lon_resolution: header.width as f64 / 360.0,
            lat_resolution: (header.height - 1) as f64 / 180.0,
            offset: header.offset,
            scale: header.scale,
            source,
        }
    }

    /// Release the grid and its backing storage.
    ///
    /// Equivalent to dropping it.
    pub fn release(self) {
        drop(self);
    }

    /// Raw sample at `column`, `row` (row 0 = north pole).
    ///
    /// # Panics
    ///
    /// Panics if `column >= width` or `row >= height`. The interpolators
    /// never do this; they go through a seam-aware accessor instead.
    pub fn raw_value(&self, column: usize, row: usize) -> u16 {
        assert!(
            column < self.width && row < self.height,
            "grid index ({}, {}) out of range for {}x{} grid",
            column,
            row,
            self.width,
            self.height
        );
        self.sample_at(column, row)
    }

    /// Raw sample at a stencil position that may sit just outside the grid.
    ///
    /// Columns wrap around the 0°/360° seam. A row past either pole is
    /// reflected back across it, and the wrapped column moves `width / 2`
    /// columns round the globe (east in the western half, west otherwise).
    pub(crate) fn stencil_value(&self, column: i64, row: i64) -> u16 {
        let width = self.width as i64;
        let half = width / 2;
        let last_row = self.height as i64 - 1;
        let column = column.rem_euclid(width);

        let (column, row) = if row < 0 || row > last_row {
            let reflected = if row < 0 { -row } else { 2 * last_row - row };
            let shifted = if column < half {
                column + half
            } else {
                column - half
            };
            (shifted, reflected.clamp(0, last_row))
        } else {
            (column, row)
        };

        self.sample_at(column as usize, row as usize)
    }

    /// Locate the grid cell containing `lat`, `lon`.
    ///
    /// Longitude is normalized into `[0, 360)`. On the south pole row the
    /// cell is moved one row up (with `fy = 1`) so a stencil reaching one
    /// row further south stays inside the grid.
    pub(crate) fn locate(&self, lat: f64, lon: f64) -> CellPosition {
        let lon = lon.rem_euclid(360.0);
        let ry = (90.0 - lat) * self.lat_resolution;
        let rx = lon * self.lon_resolution;

        let last_row = self.height as i64 - 1;
        let mut iy = (ry.floor() as i64).clamp(0, last_row);
        let ix = rx.floor() as i64;
        if iy == last_row {
            iy -= 1;
        }

        CellPosition {
            ix,
            iy,
            fx: rx - ix as f64,
            fy: ry - iy as f64,
        }
    }

    #[inline]
    fn sample_at(&self, column: usize, row: usize) -> u16 {
        let offset = self.data_start + (row * self.width + column) * 2;
        u16::from_be_bytes([self.data[offset], self.data[offset + 1]])
    }

    /// Apply the grid offset and scale to an interpolated raw value.
    #[inline]
    pub(crate) fn apply_affine(&self, value: f64) -> f64 {
        self.offset + self.scale * value
    }

    /// The sample payload (big-endian u16, row-major).
    pub fn samples(&self) -> &[u8] {
        &self.data[self.data_start..]
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Columns per degree of longitude (`width / 360`).
    pub fn lon_resolution(&self) -> f64 {
        self.lon_resolution
    }

    /// Rows per degree of latitude (`(height - 1) / 180`).
    pub fn lat_resolution(&self) -> f64 {
        self.lat_resolution
    }

    /// Offset added to every scaled sample.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Scale applied to every raw sample.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Path the grid was loaded from, if it came from a file.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
