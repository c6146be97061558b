//! The core data model: `Entry` and its `EntryType`/`Meta`.

use serde::{Deserialize, Serialize};

use crate::geometry::{GeoPointValue, GeoPolygonValue};

/// Tagged entry-type variants, stored as the `type` integer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i64)]
pub enum EntryType {
    Undefined = 0,
    Directory = 1,
    Generic = 2,
    GeoImage = 3,
    GeoRaster = 4,
    PointCloud = 5,
    Image = 6,
    Vector = 7,
    /// Reserved for the root marker of a working tree; never produced by
    /// classification of ordinary files.
    DroneDB = 8,
}

impl EntryType {
    pub fn from_i64(v: i64) -> Option<Self> {
        Some(match v {
            0 => EntryType::Undefined,
            1 => EntryType::Directory,
            2 => EntryType::Generic,
            3 => EntryType::GeoImage,
            4 => EntryType::GeoRaster,
            5 => EntryType::PointCloud,
            6 => EntryType::Image,
            7 => EntryType::Vector,
            8 => EntryType::DroneDB,
            _ => return None,
        })
    }

    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

/// Histogram of geometry-type name -> feature count, used by the Vector
/// extractor.
pub type GeometryTypeHistogram = std::collections::BTreeMap<String, u64>;

/// The `meta` document. Internally tagged so it serializes to a single `TEXT`
/// column while still giving callers a typed contract per entry type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Meta {
    GeoImage {
        width: u32,
        height: u32,
        make: Option<String>,
        model: Option<String>,
        capture_time: Option<chrono::DateTime<chrono::Utc>>,
        orientation: Option<u16>,
    },
    GeoRaster {
        width: u32,
        height: u32,
        band_count: u16,
        srs: Option<String>,
        pixel_resolution_x: f64,
        pixel_resolution_y: f64,
    },
    PointCloud {
        point_count: u64,
        srs: Option<String>,
    },
    Vector {
        feature_count: u64,
        geometry_types: GeometryTypeHistogram,
    },
    Image {
        width: u32,
        height: u32,
    },
    Generic,
}

/// A single row of the index.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Forward-slash relative path from the working root.
    pub path: String,
    /// Lowercase hex SHA-256 of file bytes; empty for directories/root marker.
    pub hash: String,
    pub entry_type: EntryType,
    /// `None` for directories (invariant 5).
    pub meta: Option<Meta>,
    pub mtime: i64,
    pub size: i64,
    pub depth: i64,
    pub point_geom: Option<GeoPointValue>,
    pub polygon_geom: Option<GeoPolygonValue>,
}

impl Entry {
    /// A synthetic `Directory` entry satisfying invariant 5: empty hash, no
    /// meta, zero size, no geometries.
    pub fn directory(path: impl Into<String>, mtime: i64) -> Self {
        let path = path.into();
        let depth = crate::path::depth_of(&path);
        Entry {
            path,
            hash: String::new(),
            entry_type: EntryType::Directory,
            meta: None,
            mtime,
            size: 0,
            depth,
            point_geom: None,
            polygon_geom: None,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.entry_type == EntryType::Directory
    }
}
