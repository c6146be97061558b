//! PointCloud extractor: point count, SRS, and extent read from a LAS/LAZ
//! header.
//!
//! Grounded in other_examples/8815b235_gadomski-las-rs__src-crs.rs.rs's
//! `get_wkt_crs` (scan the header's VLRs for the `LASF_Projection`/2112 WKT
//! record) and the `las` crate's own `Header::bounds()`/`number_of_points()`
//! for the extent and point count. The bounding rectangle is reprojected to
//! EPSG:4326 via `proj`, the same `Proj::new_known_crs` pattern
//! `geo_raster.rs` uses for raster corners.

use std::path::Path;

use las::Reader;
use proj::Proj;

use super::Extraction;
use crate::error::Result;
use crate::geometry::GeoPolygonValue;
use crate::types::{EntryType, Meta};

const WKT_PROJECTION_USER_ID: &str = "LASF_Projection";
const WKT_PROJECTION_RECORD_ID: u16 = 2112;

pub fn extract(path: &Path) -> Result<Option<Extraction>> {
    let reader = match Reader::from_path(path) {
        Ok(r) => r,
        Err(_) => return Ok(None),
    };

    let header = reader.header();
    let bounds = header.bounds();
    if !(bounds.max.x > bounds.min.x && bounds.max.y > bounds.min.y) {
        return Ok(None);
    }

    let srs = wkt_crs(header);

    let polygon_geom = srs
        .as_deref()
        .and_then(|srs| reprojected_extent(srs, &bounds));
    let point_geom = polygon_geom.as_ref().and_then(|p| p.centroid().ok());

    Ok(Some(Extraction {
        entry_type: EntryType::PointCloud,
        meta: Meta::PointCloud {
            point_count: header.number_of_points(),
            srs,
        },
        point_geom,
        polygon_geom,
    }))
}

/// Reprojects the header's axis-aligned bounding rectangle from `srs` to
/// EPSG:4326, per §4.2's "reproject the axis-aligned bounding rectangle to
/// EPSG:4326" contract. Returns `None` (geometry omitted, not guessed at)
/// when `proj` doesn't recognize `srs` — the same degrade `geo_raster.rs`
/// uses for an unrecognized raster SRS.
fn reprojected_extent(srs: &str, bounds: &las::Bounds) -> Option<GeoPolygonValue> {
    let to_4326 = Proj::new_known_crs(srs, "EPSG:4326", None).ok()?;
    let corners = [
        (bounds.min.x, bounds.min.y),
        (bounds.max.x, bounds.min.y),
        (bounds.max.x, bounds.max.y),
        (bounds.min.x, bounds.max.y),
    ];
    let reprojected: Vec<(f64, f64)> = corners
        .into_iter()
        .map(|c| to_4326.convert(c).unwrap_or(c))
        .collect();
    GeoPolygonValue::new(reprojected).ok()
}

/// Scans the header's (extended) variable-length records for the WKT CRS
/// block. LAS stores it verbatim as ASCII WKT under the `LASF_Projection`
/// user id, record 2112; GeoTIFF-encoded CRSes (older LAS versions) are left
/// unset here rather than decoded, since a plain point count + extent is
/// already useful without a spatial reference.
fn wkt_crs(header: &las::Header) -> Option<String> {
    header
        .vlrs()
        .iter()
        .find(|vlr| is_wkt_crs_vlr(&vlr.user_id, vlr.record_id))
        .map(|vlr| {
            String::from_utf8_lossy(&vlr.data)
                .trim_end_matches('\0')
                .to_owned()
        })
}

/// Pure predicate split out from `wkt_crs` so the matching rule is testable
/// without constructing a `las::Vlr`.
fn is_wkt_crs_vlr(user_id: &str, record_id: u16) -> bool {
    user_id.eq_ignore_ascii_case(WKT_PROJECTION_USER_ID) && record_id == WKT_PROJECTION_RECORD_ID
}
