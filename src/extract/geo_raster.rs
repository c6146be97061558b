//! GeoRaster extractor: geotransform, spatial reference, and band metadata
//! read through GDAL.
//!
//! Grounded in the teacher's `raster.rs` (`get_extent`,
//! `get_resolution_from_geotransform`) and `transform.rs`
//! (`transform_polygon`), generalized from "always present, panic on error"
//! catalog-building code into a fallible per-file extractor: any GDAL error
//! or missing geotransform degrades to `Ok(None)` rather than panicking.

use std::path::Path;

use gdal::{Dataset, GeoTransform};
use geo::algorithm::map_coords::MapCoords;
use geo_types::Polygon as GeoPolygon;
use proj::Proj;

use super::Extraction;
use crate::error::Result;
use crate::geometry::GeoPolygonValue;
use crate::types::{EntryType, Meta};

/// Returns `Ok(None)` when GDAL can't open the file or it lacks a usable
/// geotransform (the caller degrades to plain `Image`/`Generic`).
pub fn extract(path: &Path) -> Result<Option<Extraction>> {
    let Ok(dataset) = Dataset::open(path) else {
        return Ok(None);
    };

    let Ok(geo_transform) = dataset.geo_transform() else {
        return Ok(None);
    };

    let projection = dataset.projection();
    let srs = if projection.trim().is_empty() {
        None
    } else {
        Some(projection.clone())
    };

    let (width, height) = dataset.raster_size();
    let (width, height) = (width as u32, height as u32);
    let band_count = dataset.raster_count() as u16;
    let resolution = resolution_from_geotransform(&geo_transform);

    let extent = extent_polygon(&geo_transform, width, height);
    let extent_4326 = match &srs {
        Some(srs) => reproject_to_4326(srs, extent).unwrap_or(extent),
        None => extent,
    };

    let polygon_geom = GeoPolygonValue::new(
        extent_4326
            .exterior()
            .coords()
            .map(|c| (c.x, c.y))
            .collect(),
    )
    .ok();
    let point_geom = polygon_geom.as_ref().and_then(|p| p.centroid().ok());

    Ok(Some(Extraction {
        entry_type: EntryType::GeoRaster,
        meta: Meta::GeoRaster {
            width,
            height,
            band_count,
            srs,
            pixel_resolution_x: resolution.0,
            pixel_resolution_y: resolution.1,
        },
        point_geom,
        polygon_geom,
    }))
}

/// Pixel resolution (x, y) from a GDAL geotransform.
/// https://gdal.org/tutorials/geotransforms_tut.html
fn resolution_from_geotransform(gt: &GeoTransform) -> (f64, f64) {
    let x = (gt[1].powi(2) + gt[2].powi(2)).sqrt();
    let y = (gt[5].powi(2) + gt[4].powi(2)).sqrt();
    (x, y)
}

fn extent_polygon(gt: &GeoTransform, width: u32, height: u32) -> GeoPolygon<f64> {
    let [x_origin, x_size, _, y_origin, _, y_size] = gt;
    let xmin = *x_origin;
    let ymin = *y_origin;
    let xmax = xmin + width as f64 * x_size;
    let ymax = ymin + height as f64 * y_size;
    geo::polygon![
        (x: xmin, y: ymin),
        (x: xmax, y: ymin),
        (x: xmax, y: ymax),
        (x: xmin, y: ymax),
    ]
}

/// Reprojects a raster's extent from its native SRS to EPSG:4326. Returns
/// `None` (rather than erroring the whole extraction) if `proj` doesn't
/// recognize the source SRS string.
fn reproject_to_4326(srs: &str, poly: GeoPolygon<f64>) -> Option<GeoPolygon<f64>> {
    let to_4326 = Proj::new_known_crs(srs, "EPSG:4326", None).ok()?;
    Some(poly.map_coords(|&c| to_4326.convert(c).unwrap_or(c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_reads_pixel_size_from_geotransform() {
        let gt: GeoTransform = [400000.0, 10.0, 0.0, 5000000.0, 0.0, -10.0];
        let (x, y) = resolution_from_geotransform(&gt);
        assert!((x - 10.0).abs() < 1e-9);
        assert!((y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn extent_polygon_spans_raster_size() {
        let gt: GeoTransform = [0.0, 1.0, 0.0, 10.0, 0.0, -1.0];
        let poly = extent_polygon(&gt, 100, 10);
        let coords: Vec<_> = poly.exterior().coords().collect();
        assert_eq!(coords[0].x, 0.0);
        assert_eq!(coords[0].y, 10.0);
        assert_eq!(coords[2].x, 100.0);
        assert_eq!(coords[2].y, 0.0);
    }
}
