//! Metadata extractors: per-type readers producing a metadata document plus
//! optional geometries, dispatched from the classifier's extension-class
//! decision and the entry parser's orchestration.

mod generic;
mod geo_image;
mod geo_raster;
mod point_cloud;
mod vector;

use std::path::Path;

use tracing::warn;

use crate::classify::ExtensionClass;
use crate::geometry::{GeoPointValue, GeoPolygonValue};
use crate::types::{EntryType, Meta};

/// The final classification (after escalation) plus whatever an extractor
/// could read from the file.
pub struct Extraction {
    pub entry_type: EntryType,
    pub meta: Meta,
    pub point_geom: Option<GeoPointValue>,
    pub polygon_geom: Option<GeoPolygonValue>,
}

impl Extraction {
    fn generic() -> Self {
        Extraction {
            entry_type: EntryType::Generic,
            meta: Meta::Generic,
            point_geom: None,
            polygon_geom: None,
        }
    }
}

/// Runs the extractor matching `ext_class` against `path`, applying the
/// escalation rules (Image -> GeoImage, Raster -> GeoRaster/Image) and the
/// graceful-degrade rule: extractors must not throw on unreadable files.
/// Extractors are side-effect free: they only ever read `path`.
pub fn extract(path: &Path, ext_class: ExtensionClass) -> Extraction {
    match ext_class {
        ExtensionClass::Image => extract_image_family(path),
        ExtensionClass::Raster => extract_raster_family(path),
        ExtensionClass::PointCloud => match point_cloud::extract(path) {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "point cloud extraction failed, degrading to Generic");
                Extraction::generic()
            }
        },
        ExtensionClass::Vector => match vector::extract(path) {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "vector extraction failed, degrading to Generic");
                Extraction::generic()
            }
        },
        ExtensionClass::Generic => generic::extract(path),
    }
}

/// Image extensions escalate to GeoImage if EXIF GPS is present and
/// parseable; otherwise Image.
fn extract_image_family(path: &Path) -> Extraction {
    match geo_image::extract(path) {
        Ok(Some(extraction)) => extraction,
        Ok(None) => generic::extract_image_dimensions(path),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "GeoImage extraction failed, degrading to Image");
            generic::extract_image_dimensions(path)
        }
    }
}

/// Raster extensions escalate to GeoRaster if the file carries a valid
/// geotransform and spatial reference; otherwise Image or Generic.
fn extract_raster_family(path: &Path) -> Extraction {
    match geo_raster::extract(path) {
        Ok(Some(extraction)) => extraction,
        Ok(None) => generic::extract_image_dimensions(path),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "GeoRaster extraction failed, degrading");
            generic::extract_image_dimensions(path)
        }
    }
}
