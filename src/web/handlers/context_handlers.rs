// src/web/handlers/context_handlers.rs
//! CRUD over company contexts

use crate::store::CompanyContext;
use crate::web::types::{
    error_response, ActionResponse, ApiError, ContextListData, ContextPayload, DataResponse,
    EnhanceForm, EnhancedDescription, ImportRequest, ServerState, StandardRequest,
    WithConversationId,
};
use rocket::form::Form;
use rocket::http::ContentType;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

use super::{read_upload, upload_name};

pub async fn list_contexts_handler(
    state: &State<ServerState>,
) -> Result<Json<DataResponse<ContextListData>>, ApiError> {
    let listing = state.store.list().map_err(|e| {
        error!("Failed to list contexts: {}", e);
        error_response(&e, None)
    })?;

    let message = if listing.is_clean() {
        format!("{} context(s)", listing.contexts.len())
    } else {
        format!(
            "{} context(s), {} unreadable record(s)",
            listing.contexts.len(),
            listing.issues.len()
        )
    };

    Ok(Json(DataResponse::success(
        message,
        ContextListData {
            names: listing.names(),
            contexts: listing.contexts,
            issues: listing.issues,
        },
        None,
    )))
}

pub async fn get_context_handler(
    name: String,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<CompanyContext>>, ApiError> {
    let context = state
        .store
        .get(&name)
        .map_err(|e| error_response(&e, None))?;

    Ok(Json(DataResponse::success(
        format!("Context '{}'", context.name),
        context,
        None,
    )))
}

pub async fn create_context_handler(
    request: Json<StandardRequest<ContextPayload>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<CompanyContext>>, ApiError> {
    let conversation_id = request.conversation_id();
    let context = CompanyContext::from(request.into_inner().data);

    let created = state.store.create(context).map_err(|e| {
        info!("Context creation rejected: {}", e);
        error_response(&e, conversation_id.clone())
    })?;

    Ok(Json(DataResponse::success(
        format!("Context '{}' created", created.name),
        created,
        conversation_id,
    )))
}

pub async fn update_context_handler(
    name: String,
    request: Json<StandardRequest<ContextPayload>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<CompanyContext>>, ApiError> {
    let conversation_id = request.conversation_id();
    let context = CompanyContext::from(request.into_inner().data);

    let updated = state
        .store
        .update(&name, context)
        .map_err(|e| error_response(&e, conversation_id.clone()))?;

    Ok(Json(DataResponse::success(
        format!("Context '{}' updated", updated.name),
        updated,
        conversation_id,
    )))
}

pub async fn delete_context_handler(
    name: String,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    state
        .store
        .delete(&name)
        .map_err(|e| error_response(&e, None))?;

    Ok(Json(
        ActionResponse::success(
            format!("Context '{}' deleted", name.trim()),
            "deleted".to_string(),
            None,
        )
        .with_next_actions(vec!["Create a new context".to_string()]),
    ))
}

pub async fn export_context_handler(
    name: String,
    state: &State<ServerState>,
) -> Result<(ContentType, String), ApiError> {
    let json = state
        .store
        .export(&name)
        .map_err(|e| error_response(&e, None))?;
    Ok((ContentType::JSON, json))
}

pub async fn import_context_handler(
    request: Json<StandardRequest<ImportRequest>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<CompanyContext>>, ApiError> {
    let conversation_id = request.conversation_id();
    let import = request.into_inner().data;

    let imported = state
        .store
        .import(&import.document, import.name.as_deref(), import.overwrite)
        .map_err(|e| error_response(&e, conversation_id.clone()))?;

    Ok(Json(DataResponse::success(
        format!("Context '{}' imported", imported.name),
        imported,
        conversation_id,
    )))
}

/// Suggest an improved description from uploaded company material. Nothing is saved.
pub async fn enhance_context_handler(
    upload: Form<EnhanceForm<'_>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<EnhancedDescription>>, ApiError> {
    let mut upload = upload.into_inner();

    let pitch = state
        .pitch_service()
        .map_err(|e| error_response(&e, None))?;

    let file_name = upload_name(&upload.document, "document");
    let bytes = read_upload(&mut upload.document)
        .await
        .map_err(|e| error_response(&e, None))?;

    let documents = crate::profile::extract_document(&file_name, &bytes)
        .map_err(|e| error_response(&e, None))?;

    let existing = upload.existing.unwrap_or_default();
    let description = pitch
        .generator()
        .enhance_description(&existing, &format!("From {}:\n{}", file_name, documents))
        .await
        .map_err(|e| {
            error!("Context enhancement failed: {}", e);
            error_response(&e, None)
        })?;

    Ok(Json(DataResponse::success(
        format!("Description enhanced from {}", file_name),
        EnhancedDescription { description },
        None,
    )))
}
