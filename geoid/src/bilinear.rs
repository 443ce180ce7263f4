//! Bilinear geoid height interpolation.

use crate::grid::GeoidGrid;

impl GeoidGrid {
    /// Geoid height at `lat`, `lon` (degrees) by bilinear interpolation.
    ///
    /// Blends the four grid nodes around the query point. Longitude may be
    /// given in any range and is normalized internally. Latitude is expected
    /// in `[-90, 90]`; outside that range the result is unspecified (but the
    /// call never panics).
    ///
    /// # Example
    ///
    /// ```ignore
    /// let grid = GeoidGrid::open("egm96-5.pgm")?;
    /// let n = grid.height_linear(35.3606, 138.7274); // Mount Fuji
    /// ```
    pub fn height_linear(&self, lat: f64, lon: f64) -> f64 {
        let pos = self.locate(lat, lon);
        let (ix, iy, fx, fy) = (pos.ix, pos.iy, pos.fx, pos.fy);

        let v00 = self.stencil_value(ix, iy) as f64;
        let v01 = self.stencil_value(ix + 1, iy) as f64;
        let v10 = self.stencil_value(ix, iy + 1) as f64;
        let v11 = self.stencil_value(ix + 1, iy + 1) as f64;

        let v = (1.0 - fy) * ((1.0 - fx) * v00 + fx * v01) + fy * ((1.0 - fx) * v10 + fx * v11);

        self.apply_affine(v)
    }
}
