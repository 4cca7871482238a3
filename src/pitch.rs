// src/pitch.rs
//! One end-to-end pitch run: profile PDF + notes + context -> generated message

use crate::error::PitchResult;
use crate::generation::{split_email, EmailParts, GenerationRequest, Generator, OutputFormat, ProfileSummary};
use crate::profile;
use crate::research::{format_results, is_unknown_company, ResearchService, SearchResult};
use crate::store::ContextStore;
use crate::usage::UsageMeter;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PitchInput {
    pub context_name: String,
    pub profile_pdf: Vec<u8>,
    pub notes: String,
    pub output_format: OutputFormat,
    pub instructions: Option<String>,
    pub sender_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PitchOutcome {
    pub prospect: ProfileSummary,
    pub research: Vec<SearchResult>,
    pub company_summary: String,
    pub output_format: OutputFormat,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailParts>,
    pub remaining_today: u32,
}

pub struct PitchService {
    store: Arc<ContextStore>,
    generator: Generator,
    research: Arc<dyn ResearchService>,
    usage: Arc<UsageMeter>,
}

impl PitchService {
    pub fn new(
        store: Arc<ContextStore>,
        generator: Generator,
        research: Arc<dyn ResearchService>,
        usage: Arc<UsageMeter>,
    ) -> Self {
        Self {
            store,
            generator,
            research,
            usage,
        }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub async fn run(&self, input: PitchInput) -> PitchResult<PitchOutcome> {
        let context = self.store.get(&input.context_name)?;
        let profile_text = profile::extract_text(&input.profile_pdf)?;
        let remaining_today = self.usage.check_and_record_now()?;
        if profile_text.trim().is_empty() && input.notes.trim().is_empty() {
            warn!("Generating without profile text or notes");
        }

        let prospect = self.generator.parse_profile(&profile_text).await?;
        info!(
            "Prospect: {} / {} / {}",
            prospect.name, prospect.title, prospect.company
        );

        let research = self.research.research(&prospect.company).await?;
        let company_summary = if is_unknown_company(&prospect.company) {
            String::new()
        } else {
            self.generator
                .summarize_company(&prospect.company, &format_results(&research), &profile_text)
                .await?
        };

        let mut request = GenerationRequest::new(
            context,
            profile_text,
            input.notes,
            input.output_format,
        )
        .with_company_research(company_summary.clone());
        if let Some(instructions) = input.instructions {
            request = request.with_instructions(instructions);
        }
        if let Some(sender_name) = input.sender_name {
            request = request.with_sender_name(sender_name);
        }

        let message = self.generator.generate(&request).await?;
        let email = if input.output_format.is_email() {
            split_email(&message)
        } else {
            None
        };

        Ok(PitchOutcome {
            prospect,
            research,
            company_summary,
            output_format: input.output_format,
            message,
            email,
            remaining_today,
        })
    }
}
