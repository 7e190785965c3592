use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use dual_capture_core::{CaptureError, CaptureRecord, NewCapture};

use crate::storage::MemoryStorage;

pub const CAPTURES_PATH: &str = "/api/captures";

/// JSON error body. `field` is present only for validation failures that
/// can be attributed to one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }
}

fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, ErrorBody::new("Capture not found"))
}

/// Build the `/api/captures` router over `storage`.
pub fn router(storage: MemoryStorage) -> Router {
    Router::new()
        .route(CAPTURES_PATH, get(list_captures).post(create_capture))
        .route("/api/captures/{id}", get(get_capture))
        .with_state(storage)
}

async fn list_captures(State(storage): State<MemoryStorage>) -> Json<Vec<CaptureRecord>> {
    Json(storage.list_captures())
}

async fn get_capture(State(storage): State<MemoryStorage>, Path(id): Path<String>) -> Response {
    let Ok(id) = id.parse::<i64>() else {
        return not_found();
    };
    match storage.get_capture(id) {
        Some(record) => Json(record).into_response(),
        None => not_found(),
    }
}

async fn create_capture(State(storage): State<MemoryStorage>, body: Bytes) -> Response {
    let value: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorBody::new(format!("Invalid JSON body: {}", e)),
            );
        }
    };

    let result = NewCapture::from_json(&value).and_then(|capture| storage.create_capture(capture));
    match result {
        Ok(record) => {
            log::info!("Created capture {} \"{}\"", record.id, record.title);
            (StatusCode::CREATED, Json(record)).into_response()
        }
        Err(CaptureError::Validation { message, field }) => {
            log::debug!("Rejected capture: {} ({:?})", message, field);
            error_response(StatusCode::BAD_REQUEST, ErrorBody { message, field })
        }
        Err(e) => {
            log::error!("Creating capture failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new("Internal server error"))
        }
    }
}
