// src/web/handlers/system_handlers.rs

use crate::generation::OutputFormat;
use crate::web::types::{DataResponse, FormatInfo, ServerState, TextResponse};
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

pub async fn get_formats_handler() -> Json<DataResponse<Vec<FormatInfo>>> {
    let formats = OutputFormat::ALL
        .into_iter()
        .map(|format| FormatInfo {
            id: format.slug().to_string(),
            label: format.label().to_string(),
            instruction: format.task_instruction().to_string(),
        })
        .collect();

    Json(DataResponse::success(
        "Available output formats".to_string(),
        formats,
        None,
    ))
}

pub async fn health_handler(state: &State<ServerState>) -> Json<TextResponse> {
    info!("Health check");

    let message = if state.missing_keys.is_empty() {
        "OK".to_string()
    } else {
        format!(
            "OK (generation disabled, missing: {})",
            state.missing_keys.join(", ")
        )
    };

    Json(TextResponse::success(message, None))
}
