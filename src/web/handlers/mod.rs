// src/web/handlers/mod.rs
pub mod context_handlers;
pub mod pitch_handlers;
pub mod system_handlers;

pub use context_handlers::*;
pub use pitch_handlers::*;
pub use system_handlers::*;

use crate::error::{PitchError, PitchResult};
use rocket::fs::TempFile;

const MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Read an uploaded file into memory through a temp path
pub(crate) async fn read_upload(file: &mut TempFile<'_>) -> PitchResult<Vec<u8>> {
    if file.len() > MAX_UPLOAD_SIZE {
        return Err(PitchError::Validation(
            "File size exceeds 10MB limit".to_string(),
        ));
    }

    let temp_path =
        std::env::temp_dir().join(format!("pitchbuddy_upload_{}", uuid::Uuid::new_v4()));

    file.persist_to(&temp_path)
        .await
        .map_err(|e| PitchError::storage(&temp_path, e))?;

    let bytes = tokio::fs::read(&temp_path)
        .await
        .map_err(|e| PitchError::storage(&temp_path, e));
    let _ = tokio::fs::remove_file(&temp_path).await;
    bytes
}

/// File name of an upload including an extension derived from its content type
pub(crate) fn upload_name(file: &TempFile<'_>, fallback: &str) -> String {
    let stem = file
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string());

    match file.content_type().and_then(|ct| ct.extension()) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}
