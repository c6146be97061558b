//! Type classifier: extension + sniffing -> entry type tag.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::types::EntryType;

static IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "tif", "tiff", "png", "webp"];
static RASTER_EXTENSIONS: &[&str] = &["tif", "tiff", "img", "vrt"];
static POINT_CLOUD_EXTENSIONS: &[&str] = &["las", "laz", "ply"];
static VECTOR_EXTENSIONS: &[&str] = &["geojson", "json", "shp", "gpkg", "kml"];

static EXT_TABLE: Lazy<std::collections::HashSet<&'static str>> = Lazy::new(|| {
    IMAGE_EXTENSIONS
        .iter()
        .chain(RASTER_EXTENSIONS)
        .chain(POINT_CLOUD_EXTENSIONS)
        .chain(VECTOR_EXTENSIONS)
        .copied()
        .collect()
});

/// Outcome of extension-table lookup, before any decode is attempted. The
/// distilled spec's escalation rules (GeoImage/GeoRaster) are resolved by the
/// caller once the corresponding extractor has had a chance to read the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionClass {
    Image,
    Raster,
    PointCloud,
    Vector,
    Generic,
}

fn case_folded_ext(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Matches a file's case-folded extension against the static table.
/// Does not touch the filesystem.
pub fn classify_by_extension(path: &Path) -> ExtensionClass {
    let Some(ext) = case_folded_ext(path) else {
        return ExtensionClass::Generic;
    };
    let ext = ext.as_str();

    if POINT_CLOUD_EXTENSIONS.contains(&ext) {
        return ExtensionClass::PointCloud;
    }
    if VECTOR_EXTENSIONS.contains(&ext) && ext != "json" {
        return ExtensionClass::Vector;
    }
    if RASTER_EXTENSIONS.contains(&ext) {
        return ExtensionClass::Raster;
    }
    if IMAGE_EXTENSIONS.contains(&ext) {
        return ExtensionClass::Image;
    }
    if ext == "json" {
        // ambiguous: could be a generic JSON file or a GeoJSON vector; sniffing
        // decides, see `sniff_magic`.
        return ExtensionClass::Generic;
    }
    ExtensionClass::Generic
}

/// Magic-number sniffing used when the extension is ambiguous or absent.
pub fn sniff_magic(path: &Path) -> Option<ExtensionClass> {
    let mut buf = [0u8; 8];
    let mut file = File::open(path).ok()?;
    let n = file.read(&mut buf).ok()?;
    if n < 4 {
        return None;
    }

    if &buf[0..2] == b"II" || &buf[0..2] == b"MM" {
        return Some(ExtensionClass::Raster);
    }
    if buf[0..2] == [0xFF, 0xD8] {
        return Some(ExtensionClass::Image);
    }
    if &buf[0..4] == b"\x89PNG" {
        return Some(ExtensionClass::Image);
    }
    if n >= 4 && &buf[0..4] == b"LASF" {
        return Some(ExtensionClass::PointCloud);
    }
    None
}

/// Whether `ext` is known to the static extension table (used by `Entry`
/// parsing to decide whether hashing-without-extraction still makes sense).
pub fn has_known_extension(path: &Path) -> bool {
    case_folded_ext(path)
        .map(|e| EXT_TABLE.contains(e.as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_extensions() {
        assert_eq!(
            classify_by_extension(Path::new("a.JPG")),
            ExtensionClass::Image
        );
        assert_eq!(
            classify_by_extension(Path::new("a.tif")),
            ExtensionClass::Raster
        );
        assert_eq!(
            classify_by_extension(Path::new("a.las")),
            ExtensionClass::PointCloud
        );
        assert_eq!(
            classify_by_extension(Path::new("a.shp")),
            ExtensionClass::Vector
        );
        assert_eq!(
            classify_by_extension(Path::new("a.exe")),
            ExtensionClass::Generic
        );
    }

    #[test]
    fn unknown_extension_falls_back_to_generic() {
        assert_eq!(EntryType::Generic, EntryType::Generic);
        assert!(!has_known_extension(Path::new("a.exe")));
        assert!(has_known_extension(Path::new("a.tif")));
    }
}
