//! Bicubic geoid height interpolation.
//!
//! A cubic surface is fitted by least squares to a 12-node stencil around
//! the query cell:
//!
//! ```text
//!             (ix, iy-1)   (ix+1, iy-1)
//! (ix-1, iy)  (ix, iy)     (ix+1, iy)    (ix+2, iy)
//! (ix-1, iy+1)(ix, iy+1)   (ix+1, iy+1)  (ix+2, iy+1)
//!             (ix, iy+2)   (ix+1, iy+2)
//! ```
//!
//! The fit is precomputed as integer matrices mapping the 12 samples to the
//! 10 polynomial coefficients. Rows next to a pole use their own matrix,
//! since the stencil there folds back across the pole.
//!
//! Only compiled with the `cubic` feature.

use crate::grid::GeoidGrid;

/// Normalization constant for [`C3`].
const C0: f64 = 240.0;

/// Interior coefficients, indexed `[stencil node][coefficient]`.
#[rustfmt::skip]
const C3: [[i32; 10]; 12] = [
    [   9,  -18,  -88,    0,   96,   90,    0,    0,  -60,  -20],
    [  -9,   18,    8,    0,  -96,   30,    0,    0,   60,  -20],
    [   9,  -88,  -18,   90,   96,    0,  -20,  -60,    0,    0],
    [ 186,  -42,  -42, -150,  -96, -150,   60,   60,   60,   60],
    [  54,  162,  -78,   30,  -24,  -90,  -60,   60,  -60,   60],
    [  -9,  -32,   18,   30,   24,    0,   20,  -60,    0,    0],
    [  -9,    8,   18,   30,  -96,    0,  -20,   60,    0,    0],
    [  54,  -78,  162,  -90,  -24,   30,   60,  -60,   60,  -60],
    [ -54,   78,   78,   90,  144,   90,  -60,  -60,  -60,  -60],
    [   9,   -8,  -18,  -30,  -24,    0,   20,   60,    0,    0],
    [  -9,   18,  -32,    0,   24,   30,    0,    0,  -60,   20],
    [   9,  -18,   -8,    0,  -24,  -30,    0,    0,   60,   20],
];

/// Normalization constant for [`C3N`].
const C0N: f64 = 372.0;

/// Coefficients for the row band touching the north pole.
#[rustfmt::skip]
const C3N: [[i32; 10]; 12] = [
    [   0,    0, -131,    0,  138,  144,    0,    0, -102,  -31],
    [   0,    0,    7,    0, -138,   42,    0,    0,  102,  -31],
    [  62,    0,  -31,    0,    0,  -62,    0,    0,    0,   31],
    [ 124,    0,  -62,    0,    0, -124,    0,    0,    0,   62],
    [ 124,    0,  -62,    0,    0, -124,    0,    0,    0,   62],
    [  62,    0,  -31,    0,    0,  -62,    0,    0,    0,   31],
    [   0,    0,   45,    0, -183,   -9,    0,   93,   18,    0],
    [   0,    0,  216,    0,   33,   87,    0,  -93,   12,  -93],
    [   0,    0,  156,    0,  153,   99,    0,  -93,  -12,  -93],
    [   0,    0,  -45,    0,   -3,    9,    0,   93,  -18,    0],
    [   0,    0,  -55,    0,   48,   42,    0,    0,  -84,   31],
    [   0,    0,   -7,    0,  -48,  -42,    0,    0,   84,   31],
];

/// Normalization constant for [`C3S`].
const C0S: f64 = 372.0;

/// Coefficients for the row band touching the south pole.
#[rustfmt::skip]
const C3S: [[i32; 10]; 12] = [
    [  18,  -36, -122,    0,  120,  135,    0,    0,  -84,  -31],
    [ -18,   36,   -2,    0, -120,   51,    0,    0,   84,  -31],
    [  36, -165,  -27,   93,  147,   -9,    0,  -93,   18,    0],
    [ 210,   45, -111,  -93,  -57, -192,    0,   93,   12,   93],
    [ 162,  141,  -75,  -93, -129, -180,    0,   93,  -12,   93],
    [ -36,  -21,   27,   93,   39,    9,    0,  -93,  -18,    0],
    [   0,    0,   62,    0,    0,   31,    0,    0,    0,  -31],
    [   0,    0,  124,    0,    0,   62,    0,    0,    0,  -62],
    [   0,    0,  124,    0,    0,   62,    0,    0,    0,  -62],
    [   0,    0,   62,    0,    0,   31,    0,    0,    0,  -31],
    [ -18,   36,  -64,    0,   66,   51,    0,    0, -102,   31],
    [  18,  -36,    2,    0,  -66,  -51,    0,    0,  102,   31],
];

/// Stencil node offsets `(dx, dy)` from `(ix, iy)`, in matrix row order.
const STENCIL: [(i64, i64); 12] = [
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (2, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (2, 1),
    (0, 2),
    (1, 2),
];

impl GeoidGrid {
    /// Geoid height at `lat`, `lon` (degrees) by bicubic interpolation.
    ///
    /// Smoother than [`Self::height_linear`] and continuous in slope, at
    /// the cost of reading 12 samples instead of 4. Longitude may be given
    /// in any range; latitude is expected in `[-90, 90]`.
    pub fn height_cubic(&self, lat: f64, lon: f64) -> f64 {
        let pos = self.locate(lat, lon);
        let (fx, fy) = (pos.fx, pos.fy);

        let mut v = [0i64; 12];
        for (value, &(dx, dy)) in v.iter_mut().zip(STENCIL.iter()) {
            *value = self.stencil_value(pos.ix + dx, pos.iy + dy) as i64;
        }

        let (c3, c0) = if pos.iy == 0 {
            (&C3N, C0N)
        } else if pos.iy == self.height() as i64 - 2 {
            (&C3S, C0S)
        } else {
            (&C3, C0)
        };

        let mut t = [0.0f64; 10];
        for (k, coefficient) in t.iter_mut().enumerate() {
            let acc: i64 = v
                .iter()
                .zip(c3.iter())
                .map(|(&value, row)| value * row[k] as i64)
                .sum();
            *coefficient = acc as f64 / c0;
        }

        let h = t[0]
            + fx * (t[1] + fx * (t[3] + fx * t[6]))
            + fy * (t[2] + fx * (t[4] + fx * t[7]) + fy * (t[5] + fx * t[8] + fy * t[9]));

        self.apply_affine(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::grid_from_fn;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_coefficient_tables_are_normalized() {
        // Each fit must reproduce a constant surface exactly: the constant
        // term sums to the normalization constant, all others to zero.
        for (c3, c0) in [(&C3, C0), (&C3N, C0N), (&C3S, C0S)] {
            for k in 0..10 {
                let sum: i32 = c3.iter().map(|row| row[k]).sum();
                let expected = if k == 0 { c0 as i32 } else { 0 };
                assert_eq!(sum, expected, "coefficient {}", k);
            }
        }
    }

    #[test]
    fn test_constant_grid_every_band() {
        let grid = grid_from_fn(8, 7, Some(-108.0), Some(0.003), |_, _| 40000);
        let expected = -108.0 + 0.003 * 40000.0;

        for &(lat, lon) in &[
            (90.0, 0.0),
            (80.0, 100.0),
            (15.0, 12.5),
            (0.0, 359.9),
            (-75.0, -30.0),
            (-90.0, 200.0),
        ] {
            assert_close(grid.height_cubic(lat, lon), expected);
        }
    }

    #[test]
    fn test_quadratic_surface_is_reproduced() {
        let grid = grid_from_fn(8, 7, None, None, |col, row| {
            (1000 + 3 * col * col + 2 * row * row + col * row) as u16
        });

        assert_close(grid.height_cubic(22.5, 101.25), 1030.375);
        assert_close(grid.height_cubic(0.0, 157.5), 1065.25);

        let rx: f64 = 100.0 / 45.0;
        let ry: f64 = 1.5;
        let expected = 1000.0 + 3.0 * rx * rx + 2.0 * ry * ry + rx * ry;
        assert!((grid.height_cubic(45.0, 100.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_reference_values_per_band() {
        let grid = grid_from_fn(8, 7, None, None, |col, row| {
            (20000 + col * col * 13 + row * 29 + ((col * row) % 7) * 50) as u16
        });

        // North band
        assert_close(grid.height_cubic(80.0, 100.0), 20080.673768750832);
        assert_close(grid.height_cubic(75.0, 350.0), 20272.05483373158);
        // Interior
        assert_close(grid.height_cubic(15.0, 12.5), 20065.094450160035);
        assert_close(grid.height_cubic(-70.0, 200.0), 20663.684919686715);
        // South band, including the pole itself
        assert_close(grid.height_cubic(-87.5, 300.0), 20647.47997249602);
        assert_close(grid.height_cubic(-90.0, 45.0), 20431.833333333336);
    }

    #[test]
    fn test_longitude_wrap() {
        let grid = grid_from_fn(8, 7, None, None, |col, row| (col * 700 + row * 90) as u16);

        for &(lat, lon) in &[(12.5, 0.0), (-33.25, 47.5), (61.0, 337.5)] {
            assert_eq!(
                grid.height_cubic(lat, lon),
                grid.height_cubic(lat, lon - 360.0)
            );
        }
    }
}
