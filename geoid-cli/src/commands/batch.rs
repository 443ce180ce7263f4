use anyhow::{bail, Context, Result};
use geoid::{geojson::add_heights_to_geometry, GeoidGrid, Interpolation};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::load_grid;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

pub fn run(
    geoid_paths: Vec<PathBuf>,
    method: Interpolation,
    input: PathBuf,
    output: Option<PathBuf>,
    lat_col: String,
    lon_col: String,
) -> Result<()> {
    let grid = load_grid(geoid_paths)?;

    // Detect file format
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let output_path = match extension.as_str() {
        "csv" => {
            let output = output.unwrap_or_else(|| default_output(&input, "csv"));
            process_csv(&grid, &input, &output, &lat_col, &lon_col, method)?;
            output
        }
        "geojson" | "json" => {
            let output = output.unwrap_or_else(|| default_output(&input, "geojson"));
            process_geojson(&grid, &input, &output, method)?;
            output
        }
        _ => bail!(
            "Unsupported file format: {}. Use .csv or .geojson",
            extension
        ),
    };

    println!("Output written to: {}", output_path.display());
    Ok(())
}

/// `<stem>_geoid.<extension>` next to the input.
fn default_output(input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_geoid.{}", stem, extension))
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn process_csv(
    grid: &GeoidGrid,
    input: &Path,
    output: &Path,
    lat_col: &str,
    lon_col: &str,
    method: Interpolation,
) -> Result<()> {
    let file = File::open(input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    // Find column indices
    let headers = reader.headers()?.clone();
    let lat_idx = headers
        .iter()
        .position(|h| h == lat_col)
        .with_context(|| format!("Column '{}' not found in CSV", lat_col))?;
    let lon_idx = headers
        .iter()
        .position(|h| h == lon_col)
        .with_context(|| format!("Column '{}' not found in CSV", lon_col))?;

    let records: Vec<_> = reader.records().collect::<Result<_, _>>()?;
    let pb = progress_bar(records.len() as u64)?;

    let output_file = File::create(output).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));

    let mut new_headers: Vec<&str> = headers.iter().collect();
    new_headers.push("geoid_height");
    writer.write_record(&new_headers)?;

    for (line, record) in records.iter().enumerate() {
        let lat: f64 = record
            .get(lat_idx)
            .context("Missing latitude")?
            .trim()
            .parse()
            .with_context(|| format!("Invalid latitude on record {}", line + 1))?;
        let lon: f64 = record
            .get(lon_idx)
            .context("Missing longitude")?
            .trim()
            .parse()
            .with_context(|| format!("Invalid longitude on record {}", line + 1))?;

        let height = if (-90.0..=90.0).contains(&lat) && lon.is_finite() {
            format!("{:.4}", grid.height_at(lat, lon, method))
        } else {
            tracing::warn!(
                record = line + 1,
                lat,
                lon,
                "Coordinate out of range, leaving height empty"
            );
            String::new()
        };

        let mut new_record: Vec<&str> = record.iter().collect();
        new_record.push(&height);
        writer.write_record(&new_record)?;

        pb.inc(1);
    }

    pb.finish_with_message("done");
    writer.flush()?;
    Ok(())
}

fn process_geojson(
    grid: &GeoidGrid,
    input: &Path,
    output: &Path,
    method: Interpolation,
) -> Result<()> {
    let file = File::open(input).context("Failed to open input file")?;
    let reader = BufReader::new(file);

    let geojson: geojson::GeoJson =
        serde_json::from_reader(reader).context("Failed to parse GeoJSON")?;

    let result = match geojson {
        geojson::GeoJson::Geometry(geometry) => {
            geojson::GeoJson::Geometry(add_heights_to_geometry(grid, geometry, method)?)
        }
        geojson::GeoJson::Feature(mut feature) => {
            if let Some(geometry) = feature.geometry.take() {
                feature.geometry = Some(add_heights_to_geometry(grid, geometry, method)?);
            }
            geojson::GeoJson::Feature(feature)
        }
        geojson::GeoJson::FeatureCollection(mut fc) => {
            let pb = progress_bar(fc.features.len() as u64)?;
            for feature in &mut fc.features {
                if let Some(geometry) = feature.geometry.take() {
                    feature.geometry = Some(add_heights_to_geometry(grid, geometry, method)?);
                }
                pb.inc(1);
            }
            pb.finish_with_message("done");
            geojson::GeoJson::FeatureCollection(fc)
        }
    };

    let output_file = File::create(output).context("Failed to create output file")?;
    let mut writer = BufWriter::new(output_file);
    serde_json::to_writer_pretty(&mut writer, &result)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// 8 columns of 45°, 7 rows of 30°, raw value = col * 100 + row.
    fn test_grid() -> GeoidGrid {
        let mut data = b"P5\n# Offset -10\n8 7\n65535\n".to_vec();
        for row in 0..7u16 {
            for col in 0..8u16 {
                data.extend_from_slice(&(col * 100 + row).to_be_bytes());
            }
        }
        GeoidGrid::from_bytes(data).unwrap()
    }

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("/data/points.csv"), "csv"),
            PathBuf::from("/data/points_geoid.csv")
        );
    }

    #[test]
    fn test_process_csv() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("points.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "name,lat,lon\na,60,90\nb,95,0\n").unwrap();

        process_csv(&test_grid(), &input, &output, "lat", "lon", Interpolation::Linear).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "name,lat,lon,geoid_height");
        assert_eq!(lines[1], "a,60,90,191.0000");
        assert_eq!(lines[2], "b,95,0,");
    }

    #[test]
    fn test_process_csv_missing_column() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("points.csv");
        std::fs::write(&input, "y,x\n1,2\n").unwrap();

        let result = process_csv(
            &test_grid(),
            &input,
            &dir.path().join("out.csv"),
            "lat",
            "lon",
            Interpolation::Linear,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_process_geojson() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("route.geojson");
        let output = dir.path().join("route_geoid.geojson");
        std::fs::write(
            &input,
            r#"{"type": "LineString", "coordinates": [[90.0, 60.0], [0.0, 90.0]]}"#,
        )
        .unwrap();

        process_geojson(&test_grid(), &input, &output, Interpolation::Linear).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["coordinates"][0][2], 191.0);
        assert_eq!(written["coordinates"][1][2], -10.0);
    }
}
