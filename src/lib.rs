//! PitchBuddy: company contexts plus AI-generated outreach from LinkedIn profiles.
//!
//! The context store is the only stateful part; generation, research and PDF
//! extraction are thin boundaries over external services.

pub mod cli;
pub mod core;
pub mod environment;
pub mod error;
pub mod generation;
pub mod llm;
pub mod pitch;
pub mod profile;
pub mod research;
pub mod store;
pub mod usage;
pub mod utils;
pub mod web;

pub use error::{PitchError, PitchResult};
pub use store::{CompanyContext, ContextListing, ContextStore, ListIssue, StoreConfig};
pub use web::start_web_server;
