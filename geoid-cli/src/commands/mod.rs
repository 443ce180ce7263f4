pub mod batch;
pub mod info;
pub mod query;

use anyhow::{Context, Result};
use geoid::GeoidGrid;
use std::path::PathBuf;

/// Install locations tried when no `--geoid` path is given.
pub const DEFAULT_GEOID_PATHS: &[&str] = &[
    "/usr/local/share/GeographicLib/geoids/egm96-5.pgm",
    "/usr/share/GeographicLib/geoids/egm96-5.pgm",
];

/// Load the grid from the user's candidates, or the default locations.
pub fn load_grid(paths: Vec<PathBuf>) -> Result<GeoidGrid> {
    let candidates = if paths.is_empty() {
        DEFAULT_GEOID_PATHS.iter().map(PathBuf::from).collect()
    } else {
        paths
    };

    GeoidGrid::load(&candidates).context("Failed to load geoid grid. Use --geoid or set GEOID_PATH")
}
