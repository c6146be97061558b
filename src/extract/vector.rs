//! Vector extractor: feature count, geometry-type histogram, and bounding
//! extent for GeoJSON, Shapefile, KML, and GeoPackage sources.
//!
//! - GeoJSON: `str::parse::<geojson::GeoJson>()`, the reading pattern shown in
//!   other_examples/16319073_georust-geojson__src-lib.rs.rs.
//! - Shapefile: `shapefile::Reader`, ring-to-polygon grouping grounded in
//!   Ben1152000-openmander-core's `common/polygon.rs::shp_to_geo` (exterior
//!   vs. hole decided by ring winding, not reimplemented fully here since only
//!   an extent + histogram are needed, not full geometry).
//! - KML: `kml::KmlReader`, walking `Kml::Document`/`Kml::Folder` children for
//!   `Placemark` geometries.
//! - GeoPackage: read directly through `rusqlite`, since the cached extent
//!   already lives in `gpkg_contents` (other_examples/ce5ebc9a_yutannihilation-rusqlite-gpkg__src-ogc_sql.rs.rs's
//!   schema) and doesn't need WKB decoding.

use std::fs;
use std::path::Path;

use geojson::GeoJson;

use super::Extraction;
use crate::error::Result;
use crate::geometry::GeoPolygonValue;
use crate::types::{EntryType, GeometryTypeHistogram, Meta};

struct Extent {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Extent {
    fn empty() -> Self {
        Extent {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn is_valid(&self) -> bool {
        self.min_x.is_finite() && self.min_y.is_finite() && self.max_x.is_finite() && self.max_y.is_finite()
    }
}

pub fn extract(path: &Path) -> Result<Option<Extraction>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "geojson" | "json" => extract_geojson(path),
        "shp" => extract_shapefile(path),
        "kml" => extract_kml(path),
        "gpkg" => extract_gpkg(path),
        _ => Ok(None),
    }
}

fn finish(extent: Extent, feature_count: u64, geometry_types: GeometryTypeHistogram) -> Result<Option<Extraction>> {
    if !extent.is_valid() || feature_count == 0 {
        return Ok(None);
    }
    let polygon_geom = GeoPolygonValue::from_bounds(extent.min_x, extent.min_y, extent.max_x, extent.max_y)?;
    let point_geom = polygon_geom.centroid().ok();
    Ok(Some(Extraction {
        entry_type: EntryType::Vector,
        meta: Meta::Vector {
            feature_count,
            geometry_types,
        },
        point_geom,
        polygon_geom: Some(polygon_geom),
    }))
}

fn extract_geojson(path: &Path) -> Result<Option<Extraction>> {
    let text = fs::read_to_string(path)?;
    let Ok(geojson) = text.parse::<GeoJson>() else {
        return Ok(None);
    };

    let mut extent = Extent::empty();
    let mut histogram = GeometryTypeHistogram::new();
    let mut feature_count = 0u64;

    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in fc.features {
                if let Some(geometry) = feature.geometry {
                    feature_count += 1;
                    record_geojson_geometry(&geometry, &mut extent, &mut histogram);
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = feature.geometry {
                feature_count += 1;
                record_geojson_geometry(&geometry, &mut extent, &mut histogram);
            }
        }
        GeoJson::Geometry(geometry) => {
            feature_count += 1;
            record_geojson_geometry(&geometry, &mut extent, &mut histogram);
        }
    }

    finish(extent, feature_count, histogram)
}

fn record_geojson_geometry(geometry: &geojson::Geometry, extent: &mut Extent, histogram: &mut GeometryTypeHistogram) {
    use geojson::Value;

    fn walk(value: &Value, extent: &mut Extent) {
        match value {
            Value::Point(c) => extent.include(c[0], c[1]),
            Value::MultiPoint(cs) | Value::LineString(cs) => {
                for c in cs {
                    extent.include(c[0], c[1]);
                }
            }
            Value::MultiLineString(rings) | Value::Polygon(rings) => {
                for ring in rings {
                    for c in ring {
                        extent.include(c[0], c[1]);
                    }
                }
            }
            Value::MultiPolygon(polys) => {
                for poly in polys {
                    for ring in poly {
                        for c in ring {
                            extent.include(c[0], c[1]);
                        }
                    }
                }
            }
            Value::GeometryCollection(geoms) => {
                for g in geoms {
                    walk(&g.value, extent);
                }
            }
        }
    }

    walk(&geometry.value, extent);
    let type_name = match &geometry.value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    };
    *histogram.entry(type_name.to_string()).or_insert(0) += 1;
}

fn extract_shapefile(path: &Path) -> Result<Option<Extraction>> {
    use shapefile::{dbase::Record, Shape};

    let Ok(mut reader) = shapefile::Reader::from_path(path) else {
        return Ok(None);
    };

    let mut extent = Extent::empty();
    let mut histogram = GeometryTypeHistogram::new();
    let mut feature_count = 0u64;

    for result in reader.iter_shapes_and_records() {
        let Ok((shape, _record)): std::result::Result<(Shape, Record), _> = result else {
            continue;
        };
        feature_count += 1;
        let type_name = shape_type_name(&shape);
        *histogram.entry(type_name.to_string()).or_insert(0) += 1;
        include_shape_bounds(&shape, &mut extent);
    }

    finish(extent, feature_count, histogram)
}

fn shape_type_name(shape: &shapefile::Shape) -> &'static str {
    match shape {
        shapefile::Shape::Point(_) | shapefile::Shape::PointZ(_) | shapefile::Shape::PointM(_) => "Point",
        shapefile::Shape::Multipoint(_)
        | shapefile::Shape::MultipointZ(_)
        | shapefile::Shape::MultipointM(_) => "MultiPoint",
        shapefile::Shape::Polyline(_) | shapefile::Shape::PolylineZ(_) | shapefile::Shape::PolylineM(_) => {
            "LineString"
        }
        shapefile::Shape::Polygon(_) | shapefile::Shape::PolygonZ(_) | shapefile::Shape::PolygonM(_) => {
            "Polygon"
        }
        shapefile::Shape::Multipatch(_) => "MultiPatch",
        shapefile::Shape::NullShape => "Null",
    }
}

fn include_shape_bounds(shape: &shapefile::Shape, extent: &mut Extent) {
    use shapefile::Shape;

    macro_rules! include_bbox {
        ($s:expr) => {{
            let bbox = $s.bbox();
            extent.include(bbox.min.x, bbox.min.y);
            extent.include(bbox.max.x, bbox.max.y);
        }};
    }

    match shape {
        Shape::Point(p) => extent.include(p.x, p.y),
        Shape::PointZ(p) => extent.include(p.x, p.y),
        Shape::PointM(p) => extent.include(p.x, p.y),
        Shape::Multipoint(s) => include_bbox!(s),
        Shape::MultipointZ(s) => include_bbox!(s),
        Shape::MultipointM(s) => include_bbox!(s),
        Shape::Polyline(s) => include_bbox!(s),
        Shape::PolylineZ(s) => include_bbox!(s),
        Shape::PolylineM(s) => include_bbox!(s),
        Shape::Polygon(s) => include_bbox!(s),
        Shape::PolygonZ(s) => include_bbox!(s),
        Shape::PolygonM(s) => include_bbox!(s),
        Shape::Multipatch(s) => include_bbox!(s),
        Shape::NullShape => {}
    }
}

fn extract_kml(path: &Path) -> Result<Option<Extraction>> {
    use kml::types::{Geometry as KmlGeometry, Kml};

    let Ok(mut reader) = kml::KmlReader::<_, f64>::from_path(path) else {
        return Ok(None);
    };
    let Ok(root) = reader.read() else {
        return Ok(None);
    };

    let mut extent = Extent::empty();
    let mut histogram = GeometryTypeHistogram::new();
    let mut feature_count = 0u64;

    fn walk(node: &Kml<f64>, extent: &mut Extent, histogram: &mut GeometryTypeHistogram, count: &mut u64) {
        match node {
            Kml::Placemark(p) => {
                if let Some(geometry) = &p.geometry {
                    *count += 1;
                    record_kml_geometry(geometry, extent, histogram);
                }
            }
            Kml::Document { elements, .. } => {
                for e in elements {
                    walk(e, extent, histogram, count);
                }
            }
            Kml::Folder(f) => {
                for e in &f.elements {
                    walk(e, extent, histogram, count);
                }
            }
            Kml::KmlDocument(d) => {
                for e in &d.elements {
                    walk(e, extent, histogram, count);
                }
            }
            _ => {}
        }
    }

    fn record_kml_geometry(geometry: &KmlGeometry<f64>, extent: &mut Extent, histogram: &mut GeometryTypeHistogram) {
        match geometry {
            KmlGeometry::Point(p) => {
                extent.include(p.coord.x, p.coord.y);
                *histogram.entry("Point".to_string()).or_insert(0) += 1;
            }
            KmlGeometry::LineString(l) => {
                for c in &l.coords {
                    extent.include(c.x, c.y);
                }
                *histogram.entry("LineString".to_string()).or_insert(0) += 1;
            }
            KmlGeometry::Polygon(poly) => {
                for c in &poly.outer.coords {
                    extent.include(c.x, c.y);
                }
                *histogram.entry("Polygon".to_string()).or_insert(0) += 1;
            }
            KmlGeometry::MultiGeometry(mg) => {
                for g in &mg.geometries {
                    record_kml_geometry(g, extent, histogram);
                }
            }
            _ => {}
        }
    }

    walk(&root, &mut extent, &mut histogram, &mut feature_count);
    finish(extent, feature_count, histogram)
}

fn extract_gpkg(path: &Path) -> Result<Option<Extraction>> {
    let conn = rusqlite::Connection::open(path)?;

    let mut stmt = conn.prepare(
        "SELECT gc.table_name, gc.geometry_type_name, c.min_x, c.min_y, c.max_x, c.max_y \
         FROM gpkg_geometry_columns gc JOIN gpkg_contents c ON c.table_name = gc.table_name",
    )?;

    let mut extent = Extent::empty();
    let mut histogram = GeometryTypeHistogram::new();
    let mut feature_count = 0u64;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<f64>>(2)?,
            row.get::<_, Option<f64>>(3)?,
            row.get::<_, Option<f64>>(4)?,
            row.get::<_, Option<f64>>(5)?,
        ))
    })?;

    for row in rows {
        let (table_name, geometry_type, min_x, min_y, max_x, max_y) = row?;
        if let (Some(min_x), Some(min_y), Some(max_x), Some(max_y)) = (min_x, min_y, max_x, max_y) {
            extent.include(min_x, min_y);
            extent.include(max_x, max_y);
        }
        let count: u64 = conn
            .query_row(&format!(r#"SELECT COUNT(*) FROM "{table_name}""#), [], |r| r.get(0))
            .unwrap_or(0);
        feature_count += count;
        *histogram.entry(geometry_type).or_insert(0) += count;
    }

    finish(extent, feature_count, histogram)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_starts_invalid_and_becomes_valid_after_include() {
        let mut extent = Extent::empty();
        assert!(!extent.is_valid());
        extent.include(1.0, 2.0);
        extent.include(3.0, 4.0);
        assert!(extent.is_valid());
        assert_eq!(extent.min_x, 1.0);
        assert_eq!(extent.max_y, 4.0);
    }

    #[test]
    fn unknown_extension_returns_none() {
        assert!(extract(Path::new("nonexistent.unknownvectorext")).unwrap().is_none());
    }
}
