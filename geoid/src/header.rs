//! Binary PGM header parsing.
//!
//! Geoid grids are stored as 16-bit binary PGM ("P5") files. The header is
//! read as a byte stream; no header line may exceed [`MAX_LINE_LEN`] bytes.
//!
//! ```text
//! P5
//! # Offset -108
//! # Scale 0.003
//! # any other comment
//! 4320 2161
//! 65535
//! <width * height big-endian u16 samples>
//! ```

use std::path::Path;

use crate::error::{GeoidError, Result};

/// Smallest file that can possibly hold a valid header.
pub const MIN_FILE_SIZE: u64 = 30;

/// Maximum header line length in bytes, line terminator excluded.
pub const MAX_LINE_LEN: usize = 149;

/// The only sample depth supported (unsigned 16-bit).
pub const SUPPORTED_DEPTH: u64 = 65535;

const OFFSET_PREFIX: &[u8] = b"# Offset ";
const SCALE_PREFIX: &[u8] = b"# Scale ";

/// Grid metadata parsed from a PGM header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
    /// Number of columns (longitude samples).
    pub width: usize,
    /// Number of rows (latitude samples, both poles included).
    pub height: usize,
    /// Affine offset applied to every raw sample.
    pub offset: f64,
    /// Affine scale applied to every raw sample.
    pub scale: f64,
    /// Byte index at which the sample payload starts.
    pub data_start: usize,
}

impl Header {
    /// Number of payload bytes the declared dimensions require.
    pub fn payload_len(&self) -> usize {
        self.width * self.height * 2
    }
}

/// Cursor over newline-terminated header lines.
struct HeaderLines<'a> {
    data: &'a [u8],
    pos: usize,
    /// 1-based number of the line most recently returned.
    line: usize,
}

impl<'a> HeaderLines<'a> {
    /// Returns the next line without its terminator (`\n` or `\r\n`).
    fn next_line(&mut self, path: &Path) -> Result<&'a [u8]> {
        self.line += 1;
        let start = self.pos;

        loop {
            match &self.data[self.pos..] {
                [] => {
                    return Err(GeoidError::UnterminatedLine {
                        path: path.to_path_buf(),
                        line: self.line,
                    })
                }
                [b'\r', b'\n', ..] => {
                    let line = &self.data[start..self.pos];
                    self.pos += 2;
                    return Ok(line);
                }
                [b'\n', ..] => {
                    let line = &self.data[start..self.pos];
                    self.pos += 1;
                    return Ok(line);
                }
                _ => {
                    if self.pos - start == MAX_LINE_LEN {
                        return Err(GeoidError::LineTooLong {
                            path: path.to_path_buf(),
                            line: self.line,
                        });
                    }
                    self.pos += 1;
                }
            }
        }
    }

    fn format_error(&self, path: &Path, expected: &'static str) -> GeoidError {
        GeoidError::Format {
            path: path.to_path_buf(),
            line: self.line,
            expected,
        }
    }
}

/// Parse the header at the start of `data`.
///
/// `path` is only used to label errors. On success the returned
/// [`Header::data_start`] points just past the depth line, and the payload
/// length has been checked against the declared dimensions.
///
/// # Errors
///
/// Returns the first structural violation found: [`GeoidError::TooSmall`],
/// [`GeoidError::BadMagic`], [`GeoidError::LineTooLong`],
/// [`GeoidError::UnterminatedLine`], [`GeoidError::Format`],
/// [`GeoidError::UnsupportedDepth`] or [`GeoidError::SizeMismatch`].
pub fn parse(data: &[u8], path: &Path) -> Result<Header> {
    if (data.len() as u64) < MIN_FILE_SIZE {
        return Err(GeoidError::TooSmall {
            path: path.to_path_buf(),
            size: data.len() as u64,
        });
    }

    let pos = match data {
        [b'P', b'5', b'\r', b'\n', ..] => 4,
        [b'P', b'5', b'\n', ..] => 3,
        _ => {
            return Err(GeoidError::BadMagic {
                path: path.to_path_buf(),
            })
        }
    };

    let mut lines = HeaderLines { data, pos, line: 1 };
    let mut offset = 0.0;
    let mut scale = 1.0;

    // Comments, then exactly one dimensions line.
    let (width, height) = loop {
        let line = lines.next_line(path)?;

        if let Some(arg) = line.strip_prefix(OFFSET_PREFIX) {
            offset = parse_float(arg).ok_or_else(|| lines.format_error(path, "offset (float)"))?;
        } else if let Some(arg) = line.strip_prefix(SCALE_PREFIX) {
            scale = parse_float(arg).ok_or_else(|| lines.format_error(path, "scale (float)"))?;
        } else if line.first() != Some(&b'#') {
            break parse_dimensions(line)
                .ok_or_else(|| lines.format_error(path, "\"width height\""))?;
        }
    };

    if width < 2 || height < 2 {
        return Err(lines.format_error(path, "width and height of at least 2"));
    }

    // The depth line follows the dimensions immediately.
    let line = lines.next_line(path)?;
    let depth = parse_unsigned(line)
        .ok_or_else(|| lines.format_error(path, "depth (single unsigned int)"))?;
    if depth != SUPPORTED_DEPTH {
        return Err(GeoidError::UnsupportedDepth {
            path: path.to_path_buf(),
            line: lines.line,
            depth,
        });
    }

    // Dimensions whose payload overflows can never match the file either.
    let remaining = data.len() - lines.pos;
    let payload_len = width.checked_mul(height).and_then(|n| n.checked_mul(2));
    if payload_len != Some(remaining) {
        return Err(GeoidError::SizeMismatch {
            path: path.to_path_buf(),
            expected: (width as u64).saturating_mul(height as u64).saturating_mul(2),
            actual: remaining as u64,
        });
    }

    Ok(Header {
        width,
        height,
        offset,
        scale,
        data_start: lines.pos,
    })
}

/// Strict unsigned integer: one or more ASCII digits and nothing else.
fn parse_unsigned(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

/// Float argument of an `Offset`/`Scale` comment. Leading whitespace is
/// allowed, trailing garbage is not.
fn parse_float(bytes: &[u8]) -> Option<f64> {
    std::str::from_utf8(bytes).ok()?.trim_start().parse().ok()
}

/// `width height`, separated by a single space.
fn parse_dimensions(line: &[u8]) -> Option<(usize, usize)> {
    let split = line.iter().position(|&b| b == b' ')?;
    let width = parse_unsigned(&line[..split])?;
    let height = parse_unsigned(&line[split + 1..])?;
    Some((usize::try_from(width).ok()?, usize::try_from(height).ok()?))
}
