use crate::handlers::error::{handle_storage_error, ApiError};
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use tokio_util::io::ReaderStream;
use tracing::info;

/// Serve the raw bytes of a stored file
#[get("/files/{stored_name}")]
pub async fn download(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let stored_name = path.into_inner();

    let (file, stored) = state
        .storage
        .open_file(&stored_name)
        .await
        .map_err(|e| handle_storage_error("Failed to open stored file", e))?;

    let mime = mime_guess::from_path(&stored.stored_name).first_or_octet_stream();

    info!(
        stored_name = ?stored.stored_name,
        size_bytes = stored.size_bytes,
        "GET /files - Serving file"
    );

    Ok(HttpResponse::Ok()
        .content_type(mime.to_string())
        .no_chunking(stored.size_bytes)
        .streaming(ReaderStream::new(file)))
}
