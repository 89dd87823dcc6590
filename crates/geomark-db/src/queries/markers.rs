//! Marker database queries.
//!
//! Markers are append-only: this module provides insert, get, existence
//! check, and list operations. There is no update or delete surface.

use rusqlite::Connection;

use geomark_common::{Error, Result};

use crate::models::{Marker, NewMarker};

/// Parse a marker from a database row.
///
/// Expects columns in order: id, lat, lng, text, image_path, created_at.
fn parse_marker_row(row: &rusqlite::Row) -> rusqlite::Result<Marker> {
    Ok(Marker {
        id: row.get(0)?,
        lat: row.get(1)?,
        lng: row.get(2)?,
        text: row.get(3)?,
        image_path: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Insert a new marker and return its storage-assigned id.
pub fn insert_marker(conn: &Connection, marker: &NewMarker) -> Result<i64> {
    conn.execute(
        "INSERT INTO markers (lat, lng, text, image_path)
         VALUES (:lat, :lng, :text, :image_path)",
        rusqlite::named_params! {
            ":lat": marker.lat,
            ":lng": marker.lng,
            ":text": &marker.text,
            ":image_path": &marker.image_path,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(conn.last_insert_rowid())
}

/// Get a marker by id.
///
/// # Returns
///
/// * `Ok(Some(Marker))` - The marker if found
/// * `Ok(None)` - If the marker does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_marker(conn: &Connection, id: i64) -> Result<Option<Marker>> {
    let result = conn.query_row(
        "SELECT id, lat, lng, text, image_path, created_at
         FROM markers WHERE id = :id",
        rusqlite::named_params! { ":id": id },
        parse_marker_row,
    );

    match result {
        Ok(marker) => Ok(Some(marker)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Check whether a marker with the given id exists.
pub fn marker_exists(conn: &Connection, id: i64) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM markers WHERE id = :id",
            rusqlite::named_params! { ":id": id },
            |row| row.get(0),
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(count > 0)
}

/// List all markers in insertion order.
pub fn list_markers(conn: &Connection) -> Result<Vec<Marker>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, lat, lng, text, image_path, created_at
             FROM markers
             ORDER BY id ASC",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let markers = stmt
        .query_map([], parse_marker_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(markers)
}
