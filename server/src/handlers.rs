//! HTTP handlers. Each one locks the shared store, performs a single store
//! operation and maps `StoreError` onto a status code.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::store::{ObjectView, SharedStore, StoreError, UsageView};

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::NotAContainer(_) | StoreError::KindMismatch(_) | StoreError::Reserved(_) => {
                StatusCode::CONFLICT
            }
        };
        tracing::debug!(error = %self, %status, "request refused");
        (status, self.to_string()).into_response()
    }
}

pub async fn health() -> &'static str {
    "OK"
}

// Lista dei dispositivi dell'account
pub async fn list_devices(State(store): State<SharedStore>) -> Json<Vec<String>> {
    Json(store.read().await.devices())
}

pub async fn get_meta(
    State(store): State<SharedStore>,
    Path(path): Path<String>,
) -> Result<Json<ObjectView>, StoreError> {
    store.read().await.meta(&path).map(Json)
}

// Lettura file
pub async fn get_file(
    State(store): State<SharedStore>,
    Path(path): Path<String>,
) -> Result<Bytes, StoreError> {
    store.read().await.read(&path)
}

// Scrittura file: crea o sostituisce l'intero contenuto
pub async fn put_file(
    State(store): State<SharedStore>,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<StatusCode, StoreError> {
    store.write().await.write(&path, body)?;
    Ok(StatusCode::OK)
}

// Creazione directory
pub async fn mkdir(
    State(store): State<SharedStore>,
    Path(path): Path<String>,
) -> Result<StatusCode, StoreError> {
    store.write().await.mkdir(&path)?;
    Ok(StatusCode::OK)
}

// Cancellazione file o directory (con tutto il sottoalbero)
pub async fn delete_file(
    State(store): State<SharedStore>,
    Path(path): Path<String>,
) -> Result<StatusCode, StoreError> {
    store.write().await.delete(&path)?;
    Ok(StatusCode::OK)
}

pub async fn usage(State(store): State<SharedStore>) -> Json<UsageView> {
    Json(store.read().await.usage())
}
