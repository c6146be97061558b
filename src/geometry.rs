//! Geometry model: points and polygons in EPSG:4326, with WKT/GeoJSON/WKB
//! adapters.
//!
//! The store treats geometry columns as opaque BLOBs; this module is where
//! WKB (de)serialization and bounds checking actually happen, standing in for
//! a real SpatiaLite-style spatial extension that isn't linked.

use geo_types::{Coord, LineString, Point as GeoPoint, Polygon as GeoPolygon};
use wkt::ToWkt;

use crate::error::{IndexError, Result};

/// A 2D or 3D point in EPSG:4326 (lon, lat, optional altitude in meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPointValue {
    pub lon: f64,
    pub lat: f64,
    pub alt: Option<f64>,
}

impl GeoPointValue {
    pub fn new(lon: f64, lat: f64, alt: Option<f64>) -> Result<Self> {
        let p = GeoPointValue { lon, lat, alt };
        p.check_bounds()?;
        Ok(p)
    }

    /// Geometries must lie within `[-180,180] x [-90,90]`.
    fn check_bounds(&self) -> Result<()> {
        if !(-180.0..=180.0).contains(&self.lon) || !(-90.0..=90.0).contains(&self.lat) {
            return Err(IndexError::app(format!(
                "point ({}, {}) falls outside EPSG:4326 geographic bounds",
                self.lon, self.lat
            )));
        }
        Ok(())
    }

    pub fn as_geo(&self) -> GeoPoint<f64> {
        GeoPoint::new(self.lon, self.lat)
    }

    /// Well-Known Binary encoding (little-endian), 2D or 3D depending on `alt`.
    pub fn to_wkb(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(29);
        buf.push(1); // little-endian byte order marker
        let geom_type: u32 = if self.alt.is_some() { 1001 } else { 1 }; // Point / PointZ (WKB Z variant)
        buf.extend_from_slice(&geom_type.to_le_bytes());
        buf.extend_from_slice(&self.lon.to_le_bytes());
        buf.extend_from_slice(&self.lat.to_le_bytes());
        if let Some(alt) = self.alt {
            buf.extend_from_slice(&alt.to_le_bytes());
        }
        buf
    }

    pub fn from_wkb(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 21 {
            return Err(IndexError::app("truncated point WKB"));
        }
        let geom_type = u32::from_le_bytes(bytes[1..5].try_into().unwrap());
        let lon = f64::from_le_bytes(bytes[5..13].try_into().unwrap());
        let lat = f64::from_le_bytes(bytes[13..21].try_into().unwrap());
        let alt = if geom_type == 1001 {
            if bytes.len() < 29 {
                return Err(IndexError::app("truncated point-z WKB"));
            }
            Some(f64::from_le_bytes(bytes[21..29].try_into().unwrap()))
        } else {
            None
        };
        GeoPointValue::new(lon, lat, alt)
    }

    /// WKT via the `wkt` crate's `geo-types` adapter for the 2D case; 3D
    /// points fall back to hand-written `POINT Z (...)` text since geo-types
    /// (and therefore `wkt`'s `ToWkt` impl) has no Z-coordinate concept.
    pub fn to_wkt(&self) -> String {
        match self.alt {
            Some(alt) => format!("POINT Z ({} {} {})", self.lon, self.lat, alt),
            None => self.as_geo().wkt_string(),
        }
    }
}

/// A closed ring polygon in EPSG:4326 (no holes — a "footprint").
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPolygonValue {
    /// Exterior ring coordinates, first == last (closed).
    pub exterior: Vec<(f64, f64)>,
}

impl GeoPolygonValue {
    pub fn new(mut exterior: Vec<(f64, f64)>) -> Result<Self> {
        if exterior.len() < 3 {
            return Err(IndexError::app("polygon needs at least 3 distinct points"));
        }
        if exterior.first() != exterior.last() {
            exterior.push(exterior[0]);
        }
        let poly = GeoPolygonValue { exterior };
        poly.check_bounds()?;
        Ok(poly)
    }

    fn check_bounds(&self) -> Result<()> {
        for (lon, lat) in &self.exterior {
            if !(-180.0..=180.0).contains(lon) || !(-90.0..=90.0).contains(lat) {
                return Err(IndexError::app(format!(
                    "polygon vertex ({lon}, {lat}) falls outside EPSG:4326 geographic bounds"
                )));
            }
        }
        Ok(())
    }

    pub fn as_geo(&self) -> GeoPolygon<f64> {
        let coords: Vec<Coord<f64>> = self
            .exterior
            .iter()
            .map(|&(x, y)| Coord { x, y })
            .collect();
        GeoPolygon::new(LineString::new(coords), vec![])
    }

    /// The polygon's centroid, used as a fallback `point_geom` by extractors
    /// that only have an extent (GeoRaster, PointCloud, Vector).
    pub fn centroid(&self) -> Result<GeoPointValue> {
        use geo::algorithm::centroid::Centroid;
        let centroid = self
            .as_geo()
            .centroid()
            .ok_or_else(|| IndexError::app("could not compute polygon centroid"))?;
        GeoPointValue::new(centroid.x(), centroid.y(), None)
    }

    pub fn to_wkb(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.push(1);
        buf.extend_from_slice(&3u32.to_le_bytes()); // wkbPolygon
        buf.extend_from_slice(&1u32.to_le_bytes()); // one ring
        buf.extend_from_slice(&(self.exterior.len() as u32).to_le_bytes());
        for (x, y) in &self.exterior {
            buf.extend_from_slice(&x.to_le_bytes());
            buf.extend_from_slice(&y.to_le_bytes());
        }
        buf
    }

    pub fn from_wkb(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 13 {
            return Err(IndexError::app("truncated polygon WKB"));
        }
        let num_rings = u32::from_le_bytes(bytes[5..9].try_into().unwrap());
        if num_rings == 0 {
            return Err(IndexError::app("polygon WKB has no rings"));
        }
        let num_points = u32::from_le_bytes(bytes[9..13].try_into().unwrap()) as usize;
        let mut offset = 13;
        let mut exterior = Vec::with_capacity(num_points);
        for _ in 0..num_points {
            if bytes.len() < offset + 16 {
                return Err(IndexError::app("truncated polygon ring WKB"));
            }
            let x = f64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap());
            let y = f64::from_le_bytes(bytes[offset + 8..offset + 16].try_into().unwrap());
            exterior.push((x, y));
            offset += 16;
        }
        GeoPolygonValue::new(exterior)
    }

    pub fn to_wkt(&self) -> String {
        self.as_geo().wkt_string()
    }

    /// A GeoJSON geometry, for hosts/tools that want a portable representation.
    pub fn to_geojson(&self) -> geojson::Geometry {
        let ring: Vec<Vec<f64>> = self.exterior.iter().map(|&(x, y)| vec![x, y]).collect();
        geojson::Geometry::new(geojson::Value::Polygon(vec![ring]))
    }

    /// An axis-aligned bounding rectangle as a closed 4-vertex ring, the shape
    /// used by GeoRaster/PointCloud/Vector extractors for `polygon_geom`.
    pub fn from_bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        GeoPolygonValue::new(vec![
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_roundtrips_through_wkb() {
        let p = GeoPointValue::new(13.4, 52.5, Some(34.0)).unwrap();
        let bytes = p.to_wkb();
        let back = GeoPointValue::from_wkb(&bytes).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn point_2d_roundtrips_through_wkb() {
        let p = GeoPointValue::new(13.4, 52.5, None).unwrap();
        let back = GeoPointValue::from_wkb(&p.to_wkb()).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn point_out_of_bounds_is_rejected() {
        assert!(GeoPointValue::new(200.0, 10.0, None).is_err());
        assert!(GeoPointValue::new(10.0, 95.0, None).is_err());
    }

    #[test]
    fn polygon_roundtrips_through_wkb() {
        let poly = GeoPolygonValue::from_bounds(10.0, 20.0, 11.0, 21.0).unwrap();
        let back = GeoPolygonValue::from_wkb(&poly.to_wkb()).unwrap();
        assert_eq!(poly, back);
    }

    #[test]
    fn bounds_centroid_is_inside_the_rectangle() {
        let poly = GeoPolygonValue::from_bounds(0.0, 0.0, 2.0, 2.0).unwrap();
        let centroid = poly.centroid().unwrap();
        assert!((centroid.lon - 1.0).abs() < 1e-9);
        assert!((centroid.lat - 1.0).abs() < 1e-9);
    }

    #[test]
    fn point_2d_wkt_goes_through_the_wkt_crate() {
        let p = GeoPointValue::new(13.4, 52.5, None).unwrap();
        let wkt = p.to_wkt();
        assert!(wkt.starts_with("POINT"));
        assert!(wkt.contains("13.4"));
        assert!(wkt.contains("52.5"));
    }

    #[test]
    fn point_3d_wkt_is_hand_formatted_with_a_z_ordinate() {
        let p = GeoPointValue::new(13.4, 52.5, Some(34.0)).unwrap();
        assert_eq!(p.to_wkt(), "POINT Z (13.4 52.5 34)");
    }

    #[test]
    fn polygon_wkt_closes_the_ring() {
        let poly = GeoPolygonValue::from_bounds(0.0, 0.0, 1.0, 1.0).unwrap();
        let wkt = poly.to_wkt();
        assert!(wkt.starts_with("POLYGON"));
        assert!(wkt.contains("0 0"));
    }

    #[test]
    fn polygon_to_geojson_is_a_polygon_value() {
        let poly = GeoPolygonValue::from_bounds(0.0, 0.0, 1.0, 1.0).unwrap();
        let geojson = poly.to_geojson();
        assert!(matches!(geojson.value, geojson::Value::Polygon(_)));
    }
}
