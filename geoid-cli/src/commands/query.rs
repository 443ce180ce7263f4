use anyhow::Result;
use geoid::Interpolation;
use serde::Serialize;
use std::path::PathBuf;

use super::load_grid;

#[derive(Serialize)]
struct HeightResponse {
    lat: f64,
    lon: f64,
    height: f64,
    method: Interpolation,
}

pub fn run(
    geoid_paths: Vec<PathBuf>,
    method: Interpolation,
    lat: f64,
    lon: f64,
    json: bool,
) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) {
        anyhow::bail!("Latitude out of range: {} (valid: -90 to 90)", lat);
    }
    if !lon.is_finite() {
        anyhow::bail!("Longitude must be a finite number, got {}", lon);
    }

    let grid = load_grid(geoid_paths)?;
    let height = grid.height_at(lat, lon, method);

    if json {
        let response = HeightResponse {
            lat,
            lon,
            height,
            method,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{:.4}", height);
    }

    Ok(())
}
