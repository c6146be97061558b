//! Image (plain) and Generic extractors: minimal metadata.

use std::path::Path;

use super::Extraction;
use crate::types::{EntryType, Meta};

/// Reads only the image header (no full decode) to get dimensions, matching
/// "minimal metadata (image dimensions for images; none for generic)".
pub fn extract_image_dimensions(path: &Path) -> Extraction {
    match image::image_dimensions(path) {
        Ok((width, height)) => Extraction {
            entry_type: EntryType::Image,
            meta: Meta::Image { width, height },
            point_geom: None,
            polygon_geom: None,
        },
        Err(_) => Extraction {
            entry_type: EntryType::Generic,
            meta: Meta::Generic,
            point_geom: None,
            polygon_geom: None,
        },
    }
}

/// Generic fallback: no metadata at all.
pub fn extract(_path: &Path) -> Extraction {
    Extraction {
        entry_type: EntryType::Generic,
        meta: Meta::Generic,
        point_geom: None,
        polygon_geom: None,
    }
}
