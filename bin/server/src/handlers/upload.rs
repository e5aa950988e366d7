use crate::constants::UPLOAD_SUCCESS_MESSAGE;
use crate::handlers::error::{handle_multipart_error, handle_storage_error, ApiError};
use crate::state::{AppState, UploadLimits};
use actix_multipart::{Field, Multipart};
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{post, web, HttpRequest, HttpResponse};
use common::{ManifestEntry, UploadManifest};
use futures::TryStreamExt;
use storage::UploadSession;
use tracing::{debug, info, warn};

/// Handle multi-file upload (multipart/form-data).
///
/// Every file part is staged first; nothing becomes visible in the backup
/// directory unless the whole request passes the count and size limits.
#[post("/upload")]
pub async fn upload(
    req: HttpRequest,
    mut payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let limits = &state.limits;
    info!(
        field = %limits.field_name,
        max_file_count = limits.max_file_count,
        max_file_size = limits.max_file_size,
        "POST /upload - Request received"
    );

    let mut session = state
        .storage
        .begin_upload()
        .await
        .map_err(|e| handle_storage_error("Failed to start upload", e))?;

    let declared_form_data = is_form_data(&req);
    if let Err(e) = receive_files(&mut payload, declared_form_data, session.as_mut(), limits).await
    {
        session.abort().await;
        return Err(e);
    }

    if session.file_count() == 0 {
        session.abort().await;
        return Err(ApiError::NoFile);
    }

    let committed = session
        .commit()
        .await
        .map_err(|e| handle_storage_error("Failed to store uploaded files", e))?;

    let files: Vec<ManifestEntry> = committed
        .into_iter()
        .map(|file| ManifestEntry {
            url: file.retrieval_path(),
            filename: file.stored_name,
            originalname: file.original_name,
            size: file.size_bytes,
        })
        .collect();

    info!(count = files.len(), "POST /upload - Files uploaded");

    Ok(HttpResponse::Ok().json(UploadManifest {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        count: files.len(),
        files,
    }))
}

/// Stream every file part of the body into the session, enforcing limits as bytes arrive
async fn receive_files(
    payload: &mut Multipart,
    declared_form_data: bool,
    session: &mut dyn UploadSession,
    limits: &UploadLimits,
) -> Result<(), ApiError> {
    let mut parts_read: usize = 0;
    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            // A form-data body holding only the closing boundary has no parts
            Err(e) if parts_read == 0 && declared_form_data => {
                debug!("POST /upload - Body has no parts: {}", e);
                break;
            }
            Err(e) => return Err(handle_multipart_error(e)),
        };
        parts_read += 1;

        let Some(original_name) = file_part_name(&field, &limits.field_name) else {
            // Text fields and parts under other names carry nothing to store
            drain(&mut field).await?;
            continue;
        };

        if session.file_count() >= limits.max_file_count {
            warn!(
                limit = limits.max_file_count,
                "POST /upload - Rejected: too many files"
            );
            return Err(ApiError::TooManyFiles {
                limit: limits.max_file_count,
            });
        }

        session
            .start_file(&original_name)
            .await
            .map_err(|e| handle_storage_error("Failed to stage file", e))?;

        let mut received: u64 = 0;
        while let Some(chunk) = field.try_next().await.map_err(handle_multipart_error)? {
            received += chunk.len() as u64;
            if received > limits.max_file_size {
                warn!(
                    original_name = ?original_name,
                    limit = limits.max_file_size,
                    "POST /upload - Rejected: file too large"
                );
                return Err(ApiError::FileTooLarge {
                    limit: limits.max_file_size,
                });
            }
            session
                .write_chunk(&chunk)
                .await
                .map_err(|e| handle_storage_error("Failed to write staged file", e))?;
        }

        session
            .finish_file()
            .await
            .map_err(|e| handle_storage_error("Failed to finish staged file", e))?;
    }
    Ok(())
}

fn is_form_data(req: &HttpRequest) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
        .unwrap_or(false)
}

/// Client-supplied filename when `field` is a file part under the upload field name.
/// Parts without a filename are form text, not files.
fn file_part_name(field: &Field, field_name: &str) -> Option<String> {
    if field.name() != Some(field_name) {
        return None;
    }
    let disposition = field.content_disposition()?;
    let filename = match disposition.get_filename() {
        Some(name) => name.to_string(),
        None => {
            let ext = disposition.get_filename_ext()?;
            String::from_utf8_lossy(&ext.value).into_owned()
        }
    };
    (!filename.is_empty()).then_some(filename)
}

async fn drain(field: &mut Field) -> Result<(), ApiError> {
    while field
        .try_next()
        .await
        .map_err(handle_multipart_error)?
        .is_some()
    {}
    Ok(())
}
