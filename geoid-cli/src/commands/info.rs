use anyhow::Result;
use geoid::GeoidGrid;
use std::path::PathBuf;

use super::load_grid;

pub fn run(geoid_paths: Vec<PathBuf>) -> Result<()> {
    let grid = load_grid(geoid_paths)?;

    if let Some(path) = grid.source() {
        println!("Path: {}", path.display());
        let file_size = std::fs::metadata(path)?.len();
        println!("File size: {}", format_size(file_size));
    }
    println!();

    println!(
        "Dimensions: {}x{} samples ({} bytes of data)",
        grid.width(),
        grid.height(),
        grid.samples().len()
    );
    println!(
        "Spacing: {} lon x {} lat",
        format_spacing(grid.lon_resolution()),
        format_spacing(grid.lat_resolution())
    );
    println!("Offset: {} m", grid.offset());
    println!("Scale: {} m", grid.scale());
    println!();

    print_summary(&grid);

    Ok(())
}

fn print_summary(grid: &GeoidGrid) {
    let summary = grid.summary();
    println!(
        "Min height: {:.3} m (raw {})",
        summary.min_height, summary.min_raw
    );
    println!(
        "Max height: {:.3} m (raw {})",
        summary.max_height, summary.max_raw
    );
}

/// Render a cells-per-degree resolution as node spacing.
fn format_spacing(cells_per_degree: f64) -> String {
    let minutes = 60.0 / cells_per_degree;
    if minutes >= 60.0 {
        format!("{:.2}°", minutes / 60.0)
    } else {
        format!("{:.2}'", minutes)
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_spacing() {
        // egm96-5: 4320 columns over 360°
        assert_eq!(format_spacing(12.0), "5.00'");
        assert_eq!(format_spacing(4.0), "15.00'");
        assert_eq!(format_spacing(1.0 / 45.0), "45.00°");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(18_671_377), "17.81 MB");
    }
}
