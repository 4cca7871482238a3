// src/web/types.rs

use crate::error::PitchError;
use crate::pitch::PitchService;
use crate::store::{CompanyContext, ContextStore, ListIssue};
use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything the handlers share
pub struct ServerState {
    pub store: Arc<ContextStore>,
    /// `None` when the external service keys are not configured
    pub pitch: Option<PitchService>,
    pub missing_keys: Vec<&'static str>,
}

impl ServerState {
    pub fn pitch_service(&self) -> Result<&PitchService, PitchError> {
        self.pitch.as_ref().ok_or_else(|| {
            PitchError::Config(format!("Missing API keys: {}", self.missing_keys.join(", ")))
        })
    }
}

pub type ApiError = (Status, Json<StandardErrorResponse>);

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_actions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Action,
    Error,
}

// Request types with conversation_id support
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

// Helper trait for extracting conversation_id
pub trait WithConversationId {
    fn conversation_id(&self) -> Option<String>;
}

impl<T> WithConversationId for StandardRequest<T> {
    fn conversation_id(&self) -> Option<String> {
        self.conversation_id.clone()
    }
}

/// Body of create and update requests. Timestamps are owned by the store.
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ContextPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technology: String,
    #[serde(default)]
    pub value_propositions: Vec<String>,
    #[serde(default)]
    pub positioning: String,
}

impl From<ContextPayload> for CompanyContext {
    fn from(payload: ContextPayload) -> Self {
        CompanyContext::new(payload.name)
            .with_description(payload.description)
            .with_technology(payload.technology)
            .with_value_propositions(payload.value_propositions)
            .with_positioning(payload.positioning)
    }
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ImportRequest {
    pub document: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ContextListData {
    pub names: Vec<String>,
    pub contexts: Vec<CompanyContext>,
    pub issues: Vec<ListIssue>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct FormatInfo {
    pub id: String,
    pub label: String,
    pub instruction: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct EnhancedDescription {
    pub description: String,
}

#[derive(FromForm)]
pub struct PitchForm<'f> {
    pub context: String,
    pub format: String,
    pub notes: Option<String>,
    pub instructions: Option<String>,
    pub sender_name: Option<String>,
    pub profile: TempFile<'f>,
}

#[derive(FromForm)]
pub struct EnhanceForm<'f> {
    pub existing: Option<String>,
    pub document: TempFile<'f>,
}

// Helper functions to create standard responses
impl TextResponse {
    pub fn success(message: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
            conversation_id,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            conversation_id,
        }
    }
}

impl ActionResponse {
    pub fn success(message: String, action: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
            next_actions: None,
            conversation_id,
        }
    }

    pub fn with_next_actions(mut self, next_actions: Vec<String>) -> Self {
        self.next_actions = Some(next_actions);
        self
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }
}

/// Map a domain error onto an HTTP status and the standard error body
pub fn error_response(err: &PitchError, conversation_id: Option<String>) -> ApiError {
    let (status, suggestions): (Status, Vec<&str>) = match err {
        PitchError::NotFound(_) => (Status::NotFound, vec!["List contexts to see available names"]),
        PitchError::DuplicateName(_) => (
            Status::Conflict,
            vec!["Choose another name", "Update the existing context instead"],
        ),
        PitchError::Validation(_) => (
            Status::BadRequest,
            vec!["Check your request JSON format", "Verify all required fields are present"],
        ),
        PitchError::Extraction(_) => (
            Status::UnprocessableEntity,
            vec!["Upload a text-based, unencrypted PDF", "Paste key details into the notes instead"],
        ),
        PitchError::UsageLimit(_) => (Status::TooManyRequests, vec!["Try again tomorrow"]),
        PitchError::Upstream { .. } => (
            Status::BadGateway,
            vec!["The external service failed; try again in a few moments"],
        ),
        PitchError::Storage { .. } | PitchError::Corrupt { .. } => (
            Status::InternalServerError,
            vec!["Check the contexts directory permissions and contents"],
        ),
        PitchError::Config(_) => (
            Status::InternalServerError,
            vec!["Set the missing environment variables and restart the server"],
        ),
    };

    (
        status,
        Json(StandardErrorResponse::new(
            err.to_string(),
            err.code().to_string(),
            suggestions.into_iter().map(String::from).collect(),
            conversation_id,
        )),
    )
}
