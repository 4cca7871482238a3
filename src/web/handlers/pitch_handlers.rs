// src/web/handlers/pitch_handlers.rs

use crate::generation::OutputFormat;
use crate::pitch::{PitchInput, PitchOutcome};
use crate::web::types::{error_response, ApiError, DataResponse, PitchForm, ServerState};
use rocket::form::Form;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

use super::read_upload;

pub async fn generate_pitch_handler(
    upload: Form<PitchForm<'_>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<PitchOutcome>>, ApiError> {
    let mut upload = upload.into_inner();

    let output_format: OutputFormat = upload
        .format
        .parse()
        .map_err(|e| error_response(&e, None))?;

    let service = state
        .pitch_service()
        .map_err(|e| error_response(&e, None))?;

    let profile_pdf = read_upload(&mut upload.profile)
        .await
        .map_err(|e| error_response(&e, None))?;

    info!(
        "Generating {} with context '{}'",
        output_format.label(),
        upload.context
    );

    let input = PitchInput {
        context_name: upload.context,
        profile_pdf,
        notes: upload.notes.unwrap_or_default(),
        output_format,
        instructions: upload.instructions,
        sender_name: upload.sender_name,
    };

    let outcome = service.run(input).await.map_err(|e| {
        error!("Pitch generation failed: {}", e);
        error_response(&e, None)
    })?;

    Ok(Json(DataResponse::success(
        format!("{} generated", output_format.label()),
        outcome,
        None,
    )))
}
