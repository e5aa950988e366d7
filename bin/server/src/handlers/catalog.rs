use crate::handlers::error::{handle_storage_error, ApiError};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::{CatalogEntry, CatalogResponse};
use tracing::info;

/// List every stored file with live size and modification time.
///
/// Recomputed from the backup directory on each request; order is whatever
/// the directory enumeration yields.
pub async fn list_files(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let stored = state
        .storage
        .list_files()
        .await
        .map_err(|e| handle_storage_error("Failed to list backup directory", e))?;

    let files: Vec<CatalogEntry> = stored
        .into_iter()
        .map(|file| CatalogEntry {
            url: file.retrieval_path(),
            filename: file.stored_name,
            size: file.size_bytes,
            modified: file.modified,
        })
        .collect();

    info!(count = files.len(), "GET catalog - Listed stored files");

    Ok(HttpResponse::Ok().json(CatalogResponse {
        count: files.len(),
        files,
    }))
}
