//! Marker and marker-update API routes.
//!
//! Markers are created once and never edited; follow-ups land in an
//! append-only update log per marker. Both creation endpoints accept
//! multipart forms with an optional `image` file field; a file with a
//! disallowed extension is silently treated as "no image provided".

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use geomark_db::models::{NewMarker, NewMarkerUpdate};
use geomark_db::queries::{marker_updates, markers};

use super::AppContext;

/// Create marker-related routes.
pub fn marker_routes() -> Router<AppContext> {
    Router::new()
        .route("/markers", get(list_markers).post(create_marker))
        .route(
            "/markers/{marker_id}/updates",
            get(list_marker_updates).post(create_marker_update),
        )
}

// ============================================================================
// Request types
// ============================================================================

/// Fields collected from a multipart creation form.
#[derive(Debug, Default)]
struct MarkerForm {
    lat: Option<String>,
    lng: Option<String>,
    text: Option<String>,
    /// Original filename and raw bytes of the uploaded `image` field.
    image: Option<(String, Bytes)>,
}

/// Drain a multipart stream into a [`MarkerForm`].
///
/// Unknown fields are skipped. An `image` field without a filename is
/// ignored, matching what browsers send for an empty file input.
async fn read_form(mut multipart: Multipart) -> Result<MarkerForm, String> {
    let mut form = MarkerForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("lat") => form.lat = Some(field.text().await.map_err(|e| e.to_string())?),
            Some("lng") => form.lng = Some(field.text().await.map_err(|e| e.to_string())?),
            Some("text") => form.text = Some(field.text().await.map_err(|e| e.to_string())?),
            Some("image") => {
                let filename = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(|e| e.to_string())?;
                if let Some(name) = filename.filter(|n| !n.is_empty()) {
                    form.image = Some((name, data));
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

// ============================================================================
// Handlers
// ============================================================================

/// List all markers in insertion order.
async fn list_markers(State(ctx): State<AppContext>) -> impl IntoResponse {
    let conn = match geomark_db::pool::get_conn(&ctx.db) {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    match markers::list_markers(&conn) {
        Ok(all) => {
            let body: Vec<_> = all
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "id": m.id,
                        "lat": m.lat,
                        "lng": m.lng,
                        "text": m.text,
                        "image_url": image_url(&m.image_path),
                        "created_at": m.created_at,
                    })
                })
                .collect();
            Json(body).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Create a new marker from a multipart form.
///
/// Requires `lat` and `lng`; `text` defaults to empty. An accepted image is
/// written to the upload directory before the row insert.
async fn create_marker(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> impl IntoResponse {
    let form = match read_form(multipart).await {
        Ok(f) => f,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": e})),
            )
                .into_response()
        }
    };

    let (Some(lat_raw), Some(lng_raw)) = (form.lat, form.lng) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "lat or lng missing"})),
        )
            .into_response();
    };

    let (Ok(lat), Ok(lng)) = (lat_raw.parse::<f64>(), lng_raw.parse::<f64>()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "lat or lng not a number"})),
        )
            .into_response();
    };

    let text = form.text.unwrap_or_default();

    let image_path = match store_image(&ctx, form.image).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let conn = match geomark_db::pool::get_conn(&ctx.db) {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    let new_marker = NewMarker {
        lat,
        lng,
        text: text.clone(),
        image_path: image_path.clone(),
    };

    match markers::insert_marker(&conn, &new_marker) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "id": id,
                "lat": lat,
                "lng": lng,
                "text": text,
                "image_url": image_url(&image_path),
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// List the update history for a marker, oldest first.
///
/// Returns an empty array for an unknown marker id.
async fn list_marker_updates(
    State(ctx): State<AppContext>,
    Path(marker_id): Path<i64>,
) -> impl IntoResponse {
    let conn = match geomark_db::pool::get_conn(&ctx.db) {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    match marker_updates::list_updates_for_marker(&conn, marker_id) {
        Ok(updates) => {
            let body: Vec<_> = updates
                .iter()
                .map(|u| {
                    serde_json::json!({
                        "update_id": u.id,
                        "text": u.text,
                        "image_url": image_url(&u.image_path),
                        "updated_at": u.updated_at,
                    })
                })
                .collect();
            Json(body).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Append an update to an existing marker.
///
/// The marker must exist (404 otherwise). After image handling, an update
/// carrying neither text nor an image is rejected.
async fn create_marker_update(
    State(ctx): State<AppContext>,
    Path(marker_id): Path<i64>,
    multipart: Multipart,
) -> impl IntoResponse {
    // The connection is released before the form is drained and the image
    // written, so a slow upload never pins a pool slot. Markers are never
    // deleted, so the existence check stays valid afterwards.
    {
        let conn = match geomark_db::pool::get_conn(&ctx.db) {
            Ok(c) => c,
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": e.to_string()})),
                )
                    .into_response()
            }
        };

        match markers::marker_exists(&conn, marker_id) {
            Ok(true) => {}
            Ok(false) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({"error": "marker not found"})),
                )
                    .into_response()
            }
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": e.to_string()})),
                )
                    .into_response()
            }
        }
    }

    let form = match read_form(multipart).await {
        Ok(f) => f,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": e})),
            )
                .into_response()
        }
    };

    let image_path = match store_image(&ctx, form.image).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let text = form.text;
    let text_blank = text.as_deref().map_or(true, |t| t.trim().is_empty());
    if text_blank && image_path.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "nothing to update"})),
        )
            .into_response();
    }

    let new_update = NewMarkerUpdate {
        marker_id,
        text: text.clone(),
        image_path: image_path.clone(),
    };

    let conn = match geomark_db::pool::get_conn(&ctx.db) {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    match marker_updates::insert_update(&conn, &new_update) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "update_id": id,
                "marker_id": marker_id,
                "text": text,
                "image_url": image_url(&image_path),
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Write an uploaded image to the store, if one was provided and accepted.
///
/// `Ok(None)` covers both "no file in the form" and the silent drop of a
/// disallowed extension. A filesystem failure becomes a 500 response.
async fn store_image(
    ctx: &AppContext,
    image: Option<(String, Bytes)>,
) -> Result<Option<String>, axum::response::Response> {
    let Some((name, data)) = image else {
        return Ok(None);
    };

    ctx.uploads.save(&name, &data).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response()
    })
}

/// Derive a retrieval URL from a stored filename.
///
/// The filename alone is what persists; the `/uploads/` prefix is joined
/// here, never stored.
fn image_url(image_path: &Option<String>) -> Option<String> {
    image_path.as_ref().map(|p| format!("/uploads/{}", p))
}
