use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::{
    document::{Document, DocumentChanges, DocumentSummary},
    error::ApiError,
    storage::DocumentStore,
};

pub fn documents_router() -> Router<Arc<DocumentStore>> {
    Router::new()
        .route("/", get(list_documents).post(create_document))
        .route("/:document_id", get(get_document).put(update_document))
}

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

async fn list_documents(
    State(store): State<Arc<DocumentStore>>,
) -> Result<Json<Vec<DocumentSummary>>, ApiError> {
    let summaries = store.list().await.map_err(|_| ApiError::ListFailed)?;
    Ok(Json(summaries))
}

async fn get_document(
    State(store): State<Arc<DocumentStore>>,
    Path(document_id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let document = store.get(&document_id).await.map_err(ApiError::on_read)?;
    Ok(Json(document))
}

// The request body is accepted and ignored; new documents always start empty.
async fn create_document(
    State(store): State<Arc<DocumentStore>>,
) -> Result<Json<Document>, ApiError> {
    let document = store.create().await.map_err(ApiError::on_write)?;
    Ok(Json(document))
}

async fn update_document(
    State(store): State<Arc<DocumentStore>>,
    Path(document_id): Path<String>,
    Json(changes): Json<DocumentChanges>,
) -> Result<Json<Document>, ApiError> {
    let document = store
        .update(&document_id, changes)
        .await
        .map_err(ApiError::on_write)?;
    Ok(Json(document))
}
