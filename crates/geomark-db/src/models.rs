//! Internal Rust models matching the database schema.

use serde::{Deserialize, Serialize};

/// A geo-tagged annotation: coordinates, description text, optional photo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Marker {
    pub id: i64,
    pub lat: f64,
    pub lng: f64,
    pub text: String,
    /// Stored upload filename, never a pre-joined URL.
    pub image_path: Option<String>,
    /// UTC timestamp in SQLite `datetime('now')` format.
    pub created_at: String,
}

/// An append-only follow-up entry attached to a marker.
///
/// Carries revised text and/or a new photo; at least one of the two is
/// present on every persisted row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkerUpdate {
    pub id: i64,
    pub marker_id: i64,
    pub text: Option<String>,
    pub image_path: Option<String>,
    pub updated_at: String,
}

/// Fields for inserting a new marker; id and created_at are storage-assigned.
#[derive(Debug, Clone)]
pub struct NewMarker {
    pub lat: f64,
    pub lng: f64,
    pub text: String,
    pub image_path: Option<String>,
}

/// Fields for inserting a new marker update.
#[derive(Debug, Clone)]
pub struct NewMarkerUpdate {
    pub marker_id: i64,
    pub text: Option<String>,
    pub image_path: Option<String>,
}
