//! Marker update database queries.
//!
//! Updates form an append-only history per marker, read back oldest first.

use rusqlite::Connection;

use geomark_common::{Error, Result};

use crate::models::{MarkerUpdate, NewMarkerUpdate};

/// Parse a marker update from a database row.
///
/// Expects columns in order: id, marker_id, text, image_path, updated_at.
fn parse_update_row(row: &rusqlite::Row) -> rusqlite::Result<MarkerUpdate> {
    Ok(MarkerUpdate {
        id: row.get(0)?,
        marker_id: row.get(1)?,
        text: row.get(2)?,
        image_path: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Insert a new marker update and return its storage-assigned id.
///
/// The caller is responsible for checking that the parent marker exists and
/// that the update carries text and/or an image.
pub fn insert_update(conn: &Connection, update: &NewMarkerUpdate) -> Result<i64> {
    conn.execute(
        "INSERT INTO marker_updates (marker_id, text, image_path)
         VALUES (:marker_id, :text, :image_path)",
        rusqlite::named_params! {
            ":marker_id": update.marker_id,
            ":text": &update.text,
            ":image_path": &update.image_path,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(conn.last_insert_rowid())
}

/// List all updates for a marker, ordered by `updated_at` ascending.
///
/// Ties within one timestamp second break by insertion order. Returns an
/// empty list for an unknown marker id; no existence check is performed.
pub fn list_updates_for_marker(conn: &Connection, marker_id: i64) -> Result<Vec<MarkerUpdate>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, marker_id, text, image_path, updated_at
             FROM marker_updates
             WHERE marker_id = :marker_id
             ORDER BY updated_at ASC, id ASC",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let updates = stmt
        .query_map(
            rusqlite::named_params! { ":marker_id": marker_id },
            parse_update_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(updates)
}
