//! GeoImage extractor: EXIF (+ drone XMP) GPS/camera metadata.
//!
//! Grounded in `rexif`'s `ExifTag`/`TagValue` model
//! (other_examples/36f282ab_gabi-250-rexif__src-types.rs.rs) for the DMS
//! rational -> decimal-degree conversion. Drone-manufacturer XMP fields
//! (`drone-dji:RelativeAltitude`, `drone-dji:CalibratedFOV`/`FOV`) are pulled
//! out of the raw XMP packet with a couple of small regexes rather than a
//! full XMP parser, since only a handful of numeric fields are ever needed.

use std::fs;
use std::path::Path;

use chrono::{NaiveDateTime, TimeZone, Utc};
use rexif::{ExifTag, TagValue};

use super::Extraction;
use crate::error::{IndexError, Result};
use crate::geometry::{GeoPointValue, GeoPolygonValue};
use crate::types::{EntryType, Meta};

/// Returns `Ok(None)` when the file has no parseable EXIF GPS fix (the caller
/// degrades to a plain `Image`), `Ok(Some(_))` on a successful GeoImage read,
/// and `Err` only on unexpected I/O failure.
pub fn extract(path: &Path) -> Result<Option<Extraction>> {
    let exif = match rexif::parse_file(&path.to_string_lossy()) {
        Ok(data) => data,
        Err(_) => return Ok(None),
    };

    let lat = find_dms_degrees(&exif.entries, ExifTag::GPSLatitude, ExifTag::GPSLatitudeRef);
    let lon = find_dms_degrees(&exif.entries, ExifTag::GPSLongitude, ExifTag::GPSLongitudeRef);

    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Ok(None);
    };

    let alt = find_altitude(&exif.entries);

    let point_geom = Some(GeoPointValue::new(lon, lat, alt)?);

    let make = find_ascii(&exif.entries, ExifTag::Make);
    let model = find_ascii(&exif.entries, ExifTag::Model);
    let orientation = find_u16(&exif.entries, ExifTag::Orientation);
    let capture_time = find_ascii(&exif.entries, ExifTag::DateTimeOriginal)
        .or_else(|| find_ascii(&exif.entries, ExifTag::DateTime))
        .and_then(|s| parse_exif_datetime(&s));

    let (width, height) = image::image_dimensions(path).unwrap_or((0, 0));

    let focal_length = find_f64(&exif.entries, ExifTag::FocalLength);
    let polygon_geom = focal_length
        .and_then(|focal_length| footprint_from_drone_xmp(path, lat, lon, focal_length).ok())
        .flatten();

    Ok(Some(Extraction {
        entry_type: EntryType::GeoImage,
        meta: Meta::GeoImage {
            width,
            height,
            make,
            model,
            capture_time,
            orientation,
        },
        point_geom,
        polygon_geom,
    }))
}

fn find_ascii(entries: &[rexif::ExifEntry], tag: ExifTag) -> Option<String> {
    entries.iter().find(|e| e.tag == tag).and_then(|e| match &e.value {
        TagValue::Ascii(s) => Some(s.trim_end_matches('\0').to_owned()),
        _ => None,
    })
}

fn find_u16(entries: &[rexif::ExifEntry], tag: ExifTag) -> Option<u16> {
    entries
        .iter()
        .find(|e| e.tag == tag)
        .and_then(|e| e.value.to_i64(0))
        .map(|v| v as u16)
}

fn find_f64(entries: &[rexif::ExifEntry], tag: ExifTag) -> Option<f64> {
    entries.iter().find(|e| e.tag == tag).and_then(|e| e.value.to_f64(0))
}

/// GPSLatitude/GPSLongitude are stored as a 3-item URational (degrees,
/// minutes, seconds); the companion Ref tag ("N"/"S"/"E"/"W") supplies sign.
fn find_dms_degrees(entries: &[rexif::ExifEntry], tag: ExifTag, ref_tag: ExifTag) -> Option<f64> {
    let dms = entries.iter().find(|e| e.tag == tag)?;
    let degrees = dms.value.to_f64(0)?;
    let minutes = dms.value.to_f64(1)?;
    let seconds = dms.value.to_f64(2)?;
    let reference = find_ascii(entries, ref_tag).unwrap_or_default();
    Some(dms_to_decimal_degrees(degrees, minutes, seconds, &reference))
}

/// Pure degrees/minutes/seconds + hemisphere-reference -> signed decimal
/// degrees conversion, split out from EXIF entry lookup so it's testable
/// without constructing `rexif` types.
fn dms_to_decimal_degrees(degrees: f64, minutes: f64, seconds: f64, reference: &str) -> f64 {
    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
    match reference {
        "S" | "W" => -decimal,
        _ => decimal,
    }
}

/// GPSAltitude (URational, meters) with GPSAltitudeRef (0 = above sea level,
/// 1 = below -> negate).
fn find_altitude(entries: &[rexif::ExifEntry]) -> Option<f64> {
    let alt = find_f64(entries, ExifTag::GPSAltitude)?;
    let below_sea_level = entries
        .iter()
        .find(|e| e.tag == ExifTag::GPSAltitudeRef)
        .and_then(|e| e.value.to_i64(0))
        .map(|v| v == 1)
        .unwrap_or(false);
    Some(signed_altitude(alt, below_sea_level))
}

fn signed_altitude(alt: f64, below_sea_level: bool) -> f64 {
    if below_sea_level {
        -alt
    } else {
        alt
    }
}

fn parse_exif_datetime(s: &str) -> Option<chrono::DateTime<Utc>> {
    // EXIF's canonical DateTime format: "YYYY:MM:DD HH:MM:SS", always naive
    // (no timezone) -- treated as UTC when the encoder didn't say otherwise.
    let naive = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Approximate ground footprint from a drone's XMP block, when a camera
/// field-of-view, focal length, sensor dimensions, and gimbal orientation are
/// all present. Conservatively returns `None` (no approximation) rather than
/// guess at missing fields -- this is an optional enhancement, not a required
/// one.
fn footprint_from_drone_xmp(
    path: &Path,
    lat: f64,
    lon: f64,
    _focal_length_mm: f64,
) -> Result<Option<GeoPolygonValue>> {
    let bytes = fs::read(path)?;
    let Some(packet) = extract_xmp_packet(&bytes) else {
        return Ok(None);
    };
    let text = String::from_utf8_lossy(&packet);

    let relative_altitude = xmp_number(&text, "RelativeAltitude");
    let fov_degrees = xmp_number(&text, "CalibratedFOV").or_else(|| xmp_number(&text, "FOV"));

    let (Some(altitude), Some(fov)) = (relative_altitude, fov_degrees) else {
        return Ok(None);
    };
    if altitude <= 0.0 || fov <= 0.0 {
        return Ok(None);
    }

    // half-width of the ground footprint, assuming a nadir shot: altitude *
    // tan(fov/2), converted from meters to approximate degrees of latitude.
    let half_width_m = altitude * (fov.to_radians() / 2.0).tan();
    let half_width_deg_lat = half_width_m / 111_320.0;
    let half_width_deg_lon = half_width_deg_lat / lat.to_radians().cos().max(0.01);

    Ok(Some(GeoPolygonValue::from_bounds(
        lon - half_width_deg_lon,
        lat - half_width_deg_lat,
        lon + half_width_deg_lon,
        lat + half_width_deg_lat,
    )?))
}

/// Looks up an XMP field by local name, accepting either the attribute form
/// (`drone-dji:Name="1.0"`) or the element form
/// (`<drone-dji:Name>1.0</drone-dji:Name>`) that different drone firmwares emit.
fn xmp_number(xmp_text: &str, name: &str) -> Option<f64> {
    let attr_pattern = regex::Regex::new(&format!(r#"[:\w-]*:{name}\s*=\s*"([^"]+)""#)).ok()?;
    if let Some(caps) = attr_pattern.captures(xmp_text) {
        if let Ok(v) = caps[1].trim().parse::<f64>() {
            return Some(v);
        }
    }
    let elem_pattern =
        regex::Regex::new(&format!(r#"<[:\w-]*:{name}>\s*([^<]+)\s*</[:\w-]*:{name}>"#)).ok()?;
    elem_pattern
        .captures(xmp_text)
        .and_then(|caps| caps[1].trim().parse::<f64>().ok())
}

fn extract_xmp_packet(data: &[u8]) -> Option<Vec<u8>> {
    const START: &[u8] = b"<?xpacket begin=";
    const END: &[u8] = b"<?xpacket end=";
    let start = find_subslice(data, START)?;
    let after_start = &data[start..];
    let end_rel = find_subslice(after_start, END)?;
    let tail = &after_start[end_rel..];
    let close = find_subslice(tail, b"?>")? + 2;
    Some(after_start[..end_rel + close].to_vec())
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
