//! Serving stored upload files back to clients.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tokio_util::io::ReaderStream;

use super::AppContext;
use crate::uploads::content_type_for;

/// Create upload-serving routes.
pub fn upload_routes() -> Router<AppContext> {
    Router::new().route("/uploads/{filename}", get(serve_upload))
}

/// Stream a stored upload by filename.
///
/// Stored names are flat path segments; anything that would escape the
/// upload directory is treated as not found, like any other unknown name.
async fn serve_upload(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> impl IntoResponse {
    let Some(path) = ctx.uploads.path_for(&filename) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "file not found"})),
        )
            .into_response();
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "file not found"})),
            )
                .into_response()
        }
    };

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type_for(&filename))],
        body,
    )
        .into_response()
}
