// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use crate::environment::{ApiKeys, EnvironmentConfig};
use crate::generation::Generator;
use crate::llm::OpenAiClient;
use crate::pitch::{PitchOutcome, PitchService};
use crate::research::GoogleSearchClient;
use crate::store::{CompanyContext, ContextStore};
use crate::usage::UsageMeter;
use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::form::Form;
use rocket::http::{ContentType, Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, put, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;
use tracing::{info, warn};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[get("/contexts")]
pub async fn list_contexts(
    state: &State<ServerState>,
) -> Result<Json<DataResponse<ContextListData>>, ApiError> {
    handlers::list_contexts_handler(state).await
}

#[get("/contexts/<name>")]
pub async fn get_context(
    name: String,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<CompanyContext>>, ApiError> {
    handlers::get_context_handler(name, state).await
}

#[post("/contexts", data = "<request>")]
pub async fn create_context(
    request: Json<StandardRequest<ContextPayload>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<CompanyContext>>, ApiError> {
    handlers::create_context_handler(request, state).await
}

#[put("/contexts/<name>", data = "<request>")]
pub async fn update_context(
    name: String,
    request: Json<StandardRequest<ContextPayload>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<CompanyContext>>, ApiError> {
    handlers::update_context_handler(name, request, state).await
}

#[delete("/contexts/<name>")]
pub async fn delete_context(
    name: String,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_context_handler(name, state).await
}

#[get("/contexts/<name>/export")]
pub async fn export_context(
    name: String,
    state: &State<ServerState>,
) -> Result<(ContentType, String), ApiError> {
    handlers::export_context_handler(name, state).await
}

#[post("/contexts/import", data = "<request>")]
pub async fn import_context(
    request: Json<StandardRequest<ImportRequest>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<CompanyContext>>, ApiError> {
    handlers::import_context_handler(request, state).await
}

#[post("/contexts/enhance", data = "<upload>")]
pub async fn enhance_context(
    upload: Form<EnhanceForm<'_>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<EnhancedDescription>>, ApiError> {
    handlers::enhance_context_handler(upload, state).await
}

#[post("/pitch", data = "<upload>")]
pub async fn generate_pitch(
    upload: Form<PitchForm<'_>>,
    state: &State<ServerState>,
) -> Result<Json<DataResponse<PitchOutcome>>, ApiError> {
    handlers::generate_pitch_handler(upload, state).await
}

#[get("/formats")]
pub async fn get_formats() -> Json<DataResponse<Vec<FormatInfo>>> {
    handlers::get_formats_handler().await
}

#[get("/health")]
pub async fn health(state: &State<ServerState>) -> Json<TextResponse> {
    handlers::health_handler(state).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Unknown endpoint".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the request path".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be parsed".to_string(),
        "UNPROCESSABLE".to_string(),
        vec!["Verify field names and types".to_string()],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

/// Open the store and wire the external services that have keys configured
pub fn server_state(config: &EnvironmentConfig, keys: &ApiKeys) -> Result<ServerState> {
    let store = Arc::new(ContextStore::open(config.store_config())?);
    let missing_keys = keys.missing();

    let pitch = if missing_keys.is_empty() {
        let llm = Arc::new(OpenAiClient::from_config(config, keys)?);
        let research = Arc::new(GoogleSearchClient::from_config(config, keys)?);
        let usage = Arc::new(UsageMeter::new(config.daily_limit));
        info!(
            "Generation enabled with model {} ({} requests per day)",
            llm.model(),
            usage.limit()
        );
        let generator = Generator::new(llm);
        Some(PitchService::new(store.clone(), generator, research, usage))
    } else {
        warn!(
            "Missing API keys: {}. Generation endpoints are disabled.",
            missing_keys.join(", ")
        );
        None
    };

    Ok(ServerState {
        store,
        pitch,
        missing_keys,
    })
}

/// Rocket figment with upload limits large enough for profile PDFs
pub fn figment(port: u16) -> Figment {
    let limits = Limits::default()
        .limit("file", 10.mebibytes())
        .limit("data-form", 12.mebibytes());

    rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", port))
        .merge(("limits", limits))
}

pub fn build_rocket(state: ServerState, figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(Cors)
        .manage(state)
        .register(
            "/api",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                list_contexts,
                get_context,
                create_context,
                update_context,
                delete_context,
                export_context,
                import_context,
                enhance_context,
                generate_pitch,
                get_formats,
                health,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: EnvironmentConfig, keys: ApiKeys, port: u16) -> Result<()> {
    let state = server_state(&config, &keys)?;

    info!("Starting PitchBuddy API server");
    info!("Contexts: {}", config.contexts_path.display());
    info!("Server: http://0.0.0.0:{}", port);

    let _rocket = build_rocket(state, figment(port))
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;

    Ok(())
}
