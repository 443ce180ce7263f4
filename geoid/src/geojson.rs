//! GeoJSON geoid height enrichment.
//!
//! This module provides functions to add geoid heights to GeoJSON geometries.
//! Enable the `geojson` feature to use this module.
//!
//! # Example
//!
//! ```ignore
//! use geoid::{GeoidGrid, Interpolation};
//! use geoid::geojson::add_heights_to_geometry;
//! use geojson::Geometry;
//!
//! let grid = GeoidGrid::open("/usr/share/GeographicLib/geoids/egm96-5.pgm")?;
//!
//! let geometry: Geometry = r#"{"type": "Point", "coordinates": [138.7274, 35.3606]}"#
//!     .parse()
//!     .unwrap();
//!
//! let enriched = add_heights_to_geometry(&grid, geometry, Interpolation::Linear)?;
//! // Result: {"type": "Point", "coordinates": [138.7274, 35.3606, 41.2]}
//! ```

use geojson::{Geometry, Value as GeoJsonValue};

use crate::error::{GeoidError, Result};
use crate::grid::GeoidGrid;
use crate::query::Interpolation;

/// Add geoid heights to all positions in a GeoJSON geometry.
///
/// Every position gets the geoid height as its Z coordinate. Input positions
/// are in GeoJSON order: `[longitude, latitude]` or
/// `[longitude, latitude, altitude]`; an existing altitude is replaced.
///
/// # Errors
///
/// Returns [`GeoidError::InvalidCoordinate`] if a position has fewer than 2
/// elements.
pub fn add_heights_to_geometry(
    grid: &GeoidGrid,
    geometry: Geometry,
    method: Interpolation,
) -> Result<Geometry> {
    let value = map_positions(geometry.value, &mut |coord: &[f64]| {
        add_height_to_coord(grid, coord, method)
    })?;

    Ok(Geometry::new(value))
}

/// Rebuild a geometry value with every position replaced by `f(position)`.
///
/// Nested geometries of a collection are rebuilt too. The first error
/// returned by `f` stops the walk.
pub fn map_positions<F, E>(value: GeoJsonValue, f: &mut F) -> std::result::Result<GeoJsonValue, E>
where
    F: FnMut(&[f64]) -> std::result::Result<Vec<f64>, E>,
{
    let value = match value {
        GeoJsonValue::Point(coord) => GeoJsonValue::Point(f(coord.as_slice())?),
        GeoJsonValue::MultiPoint(coords) => GeoJsonValue::MultiPoint(map_line(&coords, f)?),
        GeoJsonValue::LineString(coords) => GeoJsonValue::LineString(map_line(&coords, f)?),
        GeoJsonValue::MultiLineString(lines) => {
            GeoJsonValue::MultiLineString(map_lines(&lines, f)?)
        }
        GeoJsonValue::Polygon(rings) => GeoJsonValue::Polygon(map_lines(&rings, f)?),
        GeoJsonValue::MultiPolygon(polygons) => GeoJsonValue::MultiPolygon(
            polygons
                .iter()
                .map(|polygon| map_lines(polygon, f))
                .collect::<std::result::Result<_, E>>()?,
        ),
        GeoJsonValue::GeometryCollection(geometries) => GeoJsonValue::GeometryCollection(
            geometries
                .into_iter()
                .map(|g| map_positions(g.value, f).map(Geometry::new))
                .collect::<std::result::Result<_, E>>()?,
        ),
    };

    Ok(value)
}

/// Call `f` on every position of a geometry value, stopping at the first error.
pub fn try_for_each_position<F, E>(value: &GeoJsonValue, f: &mut F) -> std::result::Result<(), E>
where
    F: FnMut(&[f64]) -> std::result::Result<(), E>,
{
    match value {
        GeoJsonValue::Point(coord) => f(coord.as_slice()),
        GeoJsonValue::MultiPoint(coords) | GeoJsonValue::LineString(coords) => {
            coords.iter().try_for_each(|c| f(c.as_slice()))
        }
        GeoJsonValue::MultiLineString(lines) | GeoJsonValue::Polygon(lines) => lines
            .iter()
            .flatten()
            .try_for_each(|c| f(c.as_slice())),
        GeoJsonValue::MultiPolygon(polygons) => polygons
            .iter()
            .flatten()
            .flatten()
            .try_for_each(|c| f(c.as_slice())),
        GeoJsonValue::GeometryCollection(geometries) => geometries
            .iter()
            .try_for_each(|g| try_for_each_position(&g.value, f)),
    }
}

fn map_line<F, E>(line: &[Vec<f64>], f: &mut F) -> std::result::Result<Vec<Vec<f64>>, E>
where
    F: FnMut(&[f64]) -> std::result::Result<Vec<f64>, E>,
{
    line.iter().map(|coord| f(coord.as_slice())).collect()
}

fn map_lines<F, E>(lines: &[Vec<Vec<f64>>], f: &mut F) -> std::result::Result<Vec<Vec<Vec<f64>>>, E>
where
    F: FnMut(&[f64]) -> std::result::Result<Vec<f64>, E>,
{
    lines.iter().map(|line| map_line(line, f)).collect()
}

/// Add the geoid height to a single `[lon, lat, ...]` position.
///
/// Returns `[lon, lat, height]`.
pub fn add_height_to_coord(
    grid: &GeoidGrid,
    coord: &[f64],
    method: Interpolation,
) -> Result<Vec<f64>> {
    if coord.len() < 2 {
        return Err(GeoidError::InvalidCoordinate {
            message: "Coordinate must have at least 2 elements (lon, lat)".to_string(),
        });
    }

    let lon = coord[0];
    let lat = coord[1];

    Ok(vec![lon, lat, grid.height_at(lat, lon, method)])
}

/// Add geoid heights to a list of positions.
pub fn add_height_to_coords(
    grid: &GeoidGrid,
    coords: &[Vec<f64>],
    method: Interpolation,
) -> Result<Vec<Vec<f64>>> {
    coords
        .iter()
        .map(|coord| add_height_to_coord(grid, coord, method))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::grid_from_fn;

    /// 8 columns of 45°, 7 rows of 30°; raw value encodes the node.
    fn test_grid() -> GeoidGrid {
        grid_from_fn(8, 7, Some(-50.0), Some(0.1), |col, row| (col * 100 + row) as u16)
    }

    #[test]
    fn test_add_height_to_coord() {
        let grid = test_grid();

        // GeoJSON order: [lon, lat] on node (col 2, row 1)
        let result = add_height_to_coord(&grid, &[90.0, 60.0], Interpolation::Linear).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0], 90.0);
        assert_eq!(result[1], 60.0);
        assert_eq!(result[2], -50.0 + 0.1 * 201.0);
    }

    #[test]
    fn test_existing_altitude_is_replaced() {
        let grid = test_grid();
        let result =
            add_height_to_coord(&grid, &[90.0, 60.0, 1234.0], Interpolation::Linear).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result[2], grid.height_linear(60.0, 90.0));
    }

    #[test]
    fn test_add_height_to_coord_invalid() {
        let grid = test_grid();
        let result = add_height_to_coord(&grid, &[138.5], Interpolation::Linear);
        assert!(matches!(result, Err(GeoidError::InvalidCoordinate { .. })));
    }

    #[test]
    fn test_add_heights_to_linestring() {
        let grid = test_grid();
        let geometry = Geometry::new(GeoJsonValue::LineString(vec![
            vec![138.5, 35.5],
            vec![-120.25, -10.0],
        ]));

        let result = add_heights_to_geometry(&grid, geometry, Interpolation::Linear).unwrap();

        if let GeoJsonValue::LineString(coords) = result.value {
            assert_eq!(coords.len(), 2);
            assert_eq!(coords[0][2], grid.height_linear(35.5, 138.5));
            assert_eq!(coords[1][2], grid.height_linear(-10.0, -120.25));
        } else {
            panic!("Expected LineString geometry");
        }
    }

    #[test]
    fn test_add_heights_to_polygon() {
        let grid = test_grid();
        let geometry = Geometry::new(GeoJsonValue::Polygon(vec![vec![
            vec![138.5, 35.5],
            vec![138.6, 35.5],
            vec![138.55, 35.6],
            vec![138.5, 35.5],
        ]]));

        let result = add_heights_to_geometry(&grid, geometry, Interpolation::Linear).unwrap();

        if let GeoJsonValue::Polygon(rings) = result.value {
            assert_eq!(rings.len(), 1);
            assert_eq!(rings[0].len(), 4);
            assert!(rings[0].iter().all(|coord| coord.len() == 3));
        } else {
            panic!("Expected Polygon geometry");
        }
    }

    #[test]
    fn test_geometry_collection_propagates_errors() {
        let grid = test_grid();
        let geometry = Geometry::new(GeoJsonValue::GeometryCollection(vec![
            Geometry::new(GeoJsonValue::Point(vec![138.5, 35.5])),
            Geometry::new(GeoJsonValue::Point(vec![138.5])),
        ]));

        assert!(add_heights_to_geometry(&grid, geometry, Interpolation::Linear).is_err());
    }

    #[test]
    fn test_map_positions_multipolygon() {
        let value = GeoJsonValue::MultiPolygon(vec![
            vec![vec![vec![1.0, 2.0], vec![3.0, 4.0]]],
            vec![vec![vec![5.0, 6.0]], vec![vec![7.0, 8.0]]],
        ]);

        let mapped = map_positions(value, &mut |coord: &[f64]| {
            Ok::<_, ()>(vec![coord[1], coord[0]])
        })
        .unwrap();

        assert_eq!(
            mapped,
            GeoJsonValue::MultiPolygon(vec![
                vec![vec![vec![2.0, 1.0], vec![4.0, 3.0]]],
                vec![vec![vec![6.0, 5.0]], vec![vec![8.0, 7.0]]],
            ])
        );
    }

    #[test]
    fn test_try_for_each_position_visits_nested_geometries() {
        let value = GeoJsonValue::GeometryCollection(vec![
            Geometry::new(GeoJsonValue::Point(vec![0.0, 0.0])),
            Geometry::new(GeoJsonValue::Polygon(vec![
                vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 0.0]],
                vec![vec![0.5, 0.5]],
            ])),
            Geometry::new(GeoJsonValue::MultiPoint(vec![vec![2.0, 2.0]])),
        ]);

        let mut visited = Vec::new();
        try_for_each_position(&value, &mut |coord: &[f64]| {
            visited.push(coord[0]);
            Ok::<_, ()>(())
        })
        .unwrap();
        assert_eq!(visited, vec![0.0, 0.0, 1.0, 0.0, 0.5, 2.0]);

        // The first failure stops the walk.
        let mut seen = 0;
        let result = try_for_each_position(&value, &mut |_: &[f64]| {
            seen += 1;
            if seen == 2 {
                Err("stop")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(seen, 2);
    }

    #[cfg(feature = "cubic")]
    #[test]
    fn test_cubic_method_is_used() {
        let grid = test_grid();
        let geometry = Geometry::new(GeoJsonValue::Point(vec![100.0, 12.0]));

        let result = add_heights_to_geometry(&grid, geometry, Interpolation::Cubic).unwrap();

        if let GeoJsonValue::Point(coord) = result.value {
            assert_eq!(coord[2], grid.height_cubic(12.0, 100.0));
        } else {
            panic!("Expected Point geometry");
        }
    }
}
