use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::storage::StoreError;

#[derive(Debug)]
pub enum ApiError {
    DocumentNotFound(String),
    ListFailed,
    ReadFailed,
    WriteFailed,
    CorruptedDocument(String),
}

impl ApiError {
    /// Maps a store failure raised while reading a record.
    pub fn on_read(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => Self::DocumentNotFound(id),
            StoreError::Parse(id, _) => Self::CorruptedDocument(id),
            StoreError::Storage(_) => Self::ReadFailed,
        }
    }

    /// Maps a store failure raised while writing a record.
    pub fn on_write(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => Self::DocumentNotFound(id),
            StoreError::Parse(..) | StoreError::Storage(_) => Self::WriteFailed,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::DocumentNotFound(id) => {
                tracing::debug!(%id, "document not found");
                (StatusCode::NOT_FOUND, "Document not found")
            }
            Self::ListFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read directory",
            ),
            Self::ReadFailed => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file"),
            Self::WriteFailed => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save file"),
            Self::CorruptedDocument(id) => {
                tracing::warn!(%id, "refusing to serve corrupted document");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to parse document",
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
