// src/generation.rs
//! Prompt construction and message generation on top of a `CompletionClient`

use crate::error::{PitchError, PitchResult};
use crate::llm::CompletionClient;
use crate::store::CompanyContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

pub const NOT_FOUND: &str = "Not found";

const GENERATION_TEMPERATURE: f32 = 0.7;
const SUMMARY_TEMPERATURE: f32 = 0.5;
const ENHANCE_TEMPERATURE: f32 = 0.3;
const PARSE_TEMPERATURE: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Outreach,
    LinkedinDm,
    Summary,
    Voicemail,
    MeetingPrep,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Outreach,
        OutputFormat::LinkedinDm,
        OutputFormat::Summary,
        OutputFormat::Voicemail,
        OutputFormat::MeetingPrep,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            OutputFormat::Outreach => "outreach",
            OutputFormat::LinkedinDm => "linkedin-dm",
            OutputFormat::Summary => "summary",
            OutputFormat::Voicemail => "voicemail",
            OutputFormat::MeetingPrep => "meeting-prep",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Outreach => "Email outreach",
            OutputFormat::LinkedinDm => "LinkedIn DM",
            OutputFormat::Summary => "Internal-fit summary",
            OutputFormat::Voicemail => "Cold-call voicemail",
            OutputFormat::MeetingPrep => "Long-form meeting prep",
        }
    }

    pub fn is_email(self) -> bool {
        matches!(self, OutputFormat::Outreach)
    }

    pub fn task_instruction(self) -> &'static str {
        match self {
            OutputFormat::Outreach => {
                "Write a professional outreach email of fewer than 150 words in a friendly, \
                 professional tone. Include a clear subject line and address the prospect \
                 specifically. Rely on their resume first and the external research second."
            }
            OutputFormat::LinkedinDm => {
                "Write a LinkedIn direct message of fewer than 100 words in a conversational, \
                 professional tone. Keep it concise and personal, reference their background, \
                 and aim to start a conversation rather than sell."
            }
            OutputFormat::Summary => {
                "In 150 words or fewer, explain why this organization is a strong fit for our \
                 product: the best use case and how it lines up with their innovation, goals or \
                 challenges. This is an internal note, not a message to the prospect."
            }
            OutputFormat::Voicemail => {
                "Write a single-sentence cold-call voicemail script of at most 35 words. Be \
                 direct and conversational, and leave a hook that makes the prospect call back."
            }
            OutputFormat::MeetingPrep => {
                "Write an internal briefing of 150 words or fewer as 2 to 6 bullet points. Cover \
                 how to introduce our product in a longer meeting with the prospect and which \
                 topics to expand on, tied to their background and company priorities. Use a \
                 neutral internal tone."
            }
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for OutputFormat {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['_', ' '], "-");
        let wanted = match wanted.as_str() {
            "email" | "email-outreach" => "outreach",
            "dm" | "linkedin" => "linkedin-dm",
            "internal-fit-summary" => "summary",
            "cold-call-voicemail" => "voicemail",
            "long-form-meeting-prep" => "meeting-prep",
            other => other,
        };

        OutputFormat::ALL
            .into_iter()
            .find(|f| f.slug() == wanted)
            .ok_or_else(|| PitchError::Validation(format!("unknown output format '{}'", s.trim())))
    }
}

/// Everything the model needs to write one message
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub context: CompanyContext,
    pub profile_text: String,
    pub notes: String,
    pub output_format: OutputFormat,
    pub instructions: Option<String>,
    pub sender_name: Option<String>,
    pub company_research: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        context: CompanyContext,
        profile_text: impl Into<String>,
        notes: impl Into<String>,
        output_format: OutputFormat,
    ) -> Self {
        Self {
            context,
            profile_text: profile_text.into(),
            notes: notes.into(),
            output_format,
            instructions: None,
            sender_name: None,
            company_research: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_sender_name(mut self, sender_name: impl Into<String>) -> Self {
        self.sender_name = Some(sender_name.into());
        self
    }

    pub fn with_company_research(mut self, research: impl Into<String>) -> Self {
        self.company_research = Some(research.into());
        self
    }

    pub fn prompt(&self) -> String {
        let mut task = self.output_format.task_instruction().to_string();

        if let Some(extra) = non_blank(&self.instructions) {
            task.push_str(&format!("\n\nSpecific instructions: {}", extra));
        }
        if self.output_format.is_email() {
            if let Some(sender) = non_blank(&self.sender_name) {
                task.push_str(&format!("\nSign the email with: Best regards,\n{}", sender));
            }
        }

        let mut profile = self.profile_text.trim().to_string();
        if !self.notes.trim().is_empty() {
            profile.push_str(&format!(
                "\n\nAdditional personal insights:\n{}",
                self.notes.trim()
            ));
        }

        let research = non_blank(&self.company_research).unwrap_or("No research available.");

        let email_format = if self.output_format.is_email() {
            "\nFormat the email as:\nSUBJECT: [subject line]\n\n[email body]\n"
        } else {
            ""
        };

        format!(
            r#"You are a business development assistant.
Your task: {task}

---
PROSPECT PROFILE:
{profile}

PROSPECT'S COMPANY RESEARCH:
{research}

YOUR COMPANY:
{company}
---

Write the requested content. Follow the task and any specific instructions on tone, length, style and key points.
{email_format}"#,
            task = task,
            profile = profile,
            research = research,
            company = describe_context(&self.context),
            email_format = email_format,
        )
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Render a context as the "your company" block of a prompt
pub fn describe_context(context: &CompanyContext) -> String {
    let or_none = |s: &str| {
        if s.trim().is_empty() {
            "Not provided".to_string()
        } else {
            s.trim().to_string()
        }
    };

    let propositions = if context.value_propositions.is_empty() {
        "Not provided".to_string()
    } else {
        context
            .value_propositions
            .iter()
            .map(|p| format!("- {}", p))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Company: {}\nDescription: {}\nTechnology: {}\nValue propositions:\n{}\nPositioning: {}",
        context.name,
        or_none(&context.description),
        or_none(&context.technology),
        propositions,
        or_none(&context.positioning),
    )
}

/// Name, title and company pulled out of a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    #[serde(default = "not_found")]
    pub name: String,
    #[serde(default = "not_found")]
    pub title: String,
    #[serde(default = "not_found")]
    pub company: String,
}

fn not_found() -> String {
    NOT_FOUND.to_string()
}

impl Default for ProfileSummary {
    fn default() -> Self {
        Self {
            name: not_found(),
            title: not_found(),
            company: not_found(),
        }
    }
}

impl ProfileSummary {
    /// Parse the model's JSON answer; code fences around it are tolerated
    pub fn from_model_output(output: &str) -> Option<Self> {
        let trimmed = output.trim();
        let start = trimmed.find('{')?;
        let end = trimmed.rfind('}')?;
        if end < start {
            return None;
        }

        let mut summary: ProfileSummary = serde_json::from_str(&trimmed[start..=end]).ok()?;
        for field in [&mut summary.name, &mut summary.title, &mut summary.company] {
            if field.trim().is_empty() {
                *field = not_found();
            }
        }
        Some(summary)
    }
}

/// Subject line and body of a generated email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailParts {
    pub subject: String,
    pub body: String,
}

/// Split `SUBJECT: ...` output into subject and body.
///
/// The body is every non-blank line after the subject line.
pub fn split_email(text: &str) -> Option<EmailParts> {
    let mut subject = None;
    let mut body = Vec::new();

    for line in text.lines() {
        if subject.is_none() {
            if let Some(rest) = line.trim_start().strip_prefix("SUBJECT:") {
                subject = Some(rest.trim().to_string());
            }
        } else if !line.trim().is_empty() {
            body.push(line);
        }
    }

    let subject = subject.filter(|s| !s.is_empty())?;
    let body = body.join("\n").trim().to_string();
    if body.is_empty() {
        return None;
    }

    Some(EmailParts { subject, body })
}

/// The generation service: every model-backed text operation goes through here
#[derive(Clone)]
pub struct Generator {
    client: Arc<dyn CompletionClient>,
}

impl Generator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> PitchResult<String> {
        info!(
            "Generating {} for context '{}'",
            request.output_format.label(),
            request.context.name
        );
        self.client
            .complete(&request.prompt(), GENERATION_TEMPERATURE)
            .await
    }

    /// Pull name, title and company out of profile text.
    ///
    /// Upstream failures propagate; an answer that is not the requested JSON
    /// degrades to "Not found" fields.
    pub async fn parse_profile(&self, profile_text: &str) -> PitchResult<ProfileSummary> {
        let prompt = format!(
            r#"Extract the following details from this LinkedIn profile text:

- Full Name
- Job Title
- Company Name

Return only valid JSON in exactly this format:
{{
  "name": "...",
  "title": "...",
  "company": "..."
}}

Use "{not_found}" for any field that is missing.

Profile text:
"""
{text}
""""#,
            not_found = NOT_FOUND,
            text = profile_text
        );

        let output = self.client.complete(&prompt, PARSE_TEMPERATURE).await?;
        Ok(ProfileSummary::from_model_output(&output).unwrap_or_else(|| {
            warn!("Model did not return profile JSON; using empty profile summary");
            ProfileSummary::default()
        }))
    }

    pub async fn summarize_company(
        &self,
        company_name: &str,
        web_data: &str,
        profile_text: &str,
    ) -> PitchResult<String> {
        let prompt = format!(
            r#"Summarize this information about {company} in 80 to 120 words, focusing on recent innovation projects or AI, cloud and cybersecurity efforts:

Company: {company}

Web data:
{web_data}

LinkedIn profile text:
{profile}
"#,
            company = company_name,
            web_data = web_data,
            profile = profile_text
        );

        self.client.complete(&prompt, SUMMARY_TEMPERATURE).await
    }

    /// Merge uploaded company material into an existing description
    pub async fn enhance_description(&self, existing: &str, documents: &str) -> PitchResult<String> {
        if documents.trim().is_empty() {
            return Ok(existing.to_string());
        }

        let prompt = format!(
            r#"You extract and organize company information from documents.

Existing company information:
{existing}

New document content:
{documents}

Write an updated company information summary that combines the existing information with new insights from the documents. Cover strengths and value propositions, technology and products, market positioning, background and achievements, location and key facts, and anything useful for sales outreach. Be comprehensive but concise, and build on the existing information instead of replacing it."#,
            existing = existing,
            documents = documents
        );

        self.client.complete(&prompt, ENHANCE_TEMPERATURE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingClient {
        reply: PitchResult<String>,
        prompts: Mutex<Vec<(String, f32)>>,
    }

    impl RecordingClient {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(PitchError::upstream("OpenAI", Some(401), "bad key")),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn last_prompt(&self) -> (String, f32) {
            self.prompts.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, prompt: &str, temperature: f32) -> PitchResult<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), temperature));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(PitchError::Upstream {
                    service,
                    status,
                    message,
                }) => Err(PitchError::upstream(*service, *status, message.clone())),
                Err(other) => Err(PitchError::Config(other.to_string())),
            }
        }
    }

    fn acme() -> CompanyContext {
        CompanyContext::new("Acme Corp")
            .with_description("Cloud infra")
            .with_technology("k8s tooling")
            .with_value_propositions(vec!["faster deploys", "lower cost"])
            .with_positioning("DevOps for mid-market")
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("outreach".parse::<OutputFormat>().unwrap(), OutputFormat::Outreach);
        assert_eq!("Email".parse::<OutputFormat>().unwrap(), OutputFormat::Outreach);
        assert_eq!("meeting_prep".parse::<OutputFormat>().unwrap(), OutputFormat::MeetingPrep);
        assert_eq!("LinkedIn DM".parse::<OutputFormat>().unwrap(), OutputFormat::LinkedinDm);
        assert!(matches!(
            "fax".parse::<OutputFormat>(),
            Err(PitchError::Validation(_))
        ));
        for format in OutputFormat::ALL {
            assert_eq!(format.slug().parse::<OutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_prompt_contains_context_profile_and_notes() {
        let request = GenerationRequest::new(acme(), "Jane Doe, CTO at Globex", "Met at KubeCon", OutputFormat::Summary)
            .with_instructions("Mention cost savings")
            .with_sender_name("Sam");
        let prompt = request.prompt();

        assert!(prompt.contains("Jane Doe, CTO at Globex"));
        assert!(prompt.contains("Additional personal insights:\nMet at KubeCon"));
        assert!(prompt.contains("Specific instructions: Mention cost savings"));
        assert!(prompt.contains("- faster deploys\n- lower cost"));
        assert!(prompt.contains("Positioning: DevOps for mid-market"));
        assert!(prompt.contains("No research available."));
        assert!(!prompt.contains("Sign the email"));
        assert!(!prompt.contains("SUBJECT:"));
    }

    #[test]
    fn test_email_prompt_has_sign_off_and_subject_format() {
        let request = GenerationRequest::new(acme(), "profile", "", OutputFormat::Outreach)
            .with_sender_name("  Sam Lee ")
            .with_company_research("- **Globex**: new cloud region");
        let prompt = request.prompt();

        assert!(prompt.contains("Best regards,\nSam Lee"));
        assert!(prompt.contains("SUBJECT: [subject line]"));
        assert!(prompt.contains("- **Globex**: new cloud region"));
        assert!(!prompt.contains("Additional personal insights"));
    }

    #[test]
    fn test_split_email() {
        let parts = split_email("SUBJECT: Faster deploys at Globex\n\nHi Jane,\n\nShort note.\nBest regards,\nSam").unwrap();
        assert_eq!(parts.subject, "Faster deploys at Globex");
        assert_eq!(parts.body, "Hi Jane,\nShort note.\nBest regards,\nSam");

        assert!(split_email("Hi Jane, no subject here").is_none());
        assert!(split_email("SUBJECT: Only a subject").is_none());
    }

    #[test]
    fn test_profile_summary_from_model_output() {
        let summary = ProfileSummary::from_model_output(
            "```json\n{\"name\": \"Jane Doe\", \"title\": \"CTO\", \"company\": \"\"}\n```",
        )
        .unwrap();
        assert_eq!(summary.name, "Jane Doe");
        assert_eq!(summary.title, "CTO");
        assert_eq!(summary.company, NOT_FOUND);

        assert!(ProfileSummary::from_model_output("I could not find anything").is_none());
    }

    #[tokio::test]
    async fn test_generate_uses_generation_temperature() {
        let client = RecordingClient::replying("Hello Jane");
        let generator = Generator::new(client.clone());

        let request = GenerationRequest::new(acme(), "profile", "notes", OutputFormat::Voicemail);
        assert_eq!(generator.generate(&request).await.unwrap(), "Hello Jane");

        let (prompt, temperature) = client.last_prompt();
        assert!(prompt.contains("at most 35 words"));
        assert!((temperature - GENERATION_TEMPERATURE).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_upstream_errors_pass_through() {
        let generator = Generator::new(RecordingClient::failing());
        let request = GenerationRequest::new(acme(), "profile", "", OutputFormat::Outreach);

        let err = generator.generate(&request).await.unwrap_err();
        assert!(err.is_upstream());

        let err = generator.parse_profile("text").await.unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_parse_profile_degrades_on_non_json() {
        let generator = Generator::new(RecordingClient::replying("Sorry, no idea."));
        let summary = generator.parse_profile("text").await.unwrap();
        assert_eq!(summary, ProfileSummary::default());
    }

    #[tokio::test]
    async fn test_enhance_without_documents_keeps_existing() {
        let client = RecordingClient::replying("unused");
        let generator = Generator::new(client.clone());

        let result = generator.enhance_description("We build tools", "   ").await.unwrap();
        assert_eq!(result, "We build tools");
        assert!(client.prompts.lock().unwrap().is_empty());
    }
}
