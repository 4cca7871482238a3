mod common;

use common::{acme, text_pdf, FakeResearch, ScriptedClient, GENERATED_EMAIL};
use pitch_buddy::generation::{Generator, OutputFormat};
use pitch_buddy::pitch::{PitchInput, PitchService};
use pitch_buddy::profile;
use pitch_buddy::usage::UsageMeter;
use pitch_buddy::{ContextStore, PitchError, StoreConfig};
use std::sync::Arc;
use tempfile::TempDir;

struct Harness {
    service: PitchService,
    llm: Arc<ScriptedClient>,
    research: Arc<FakeResearch>,
    _dir: TempDir,
}

fn harness(daily_limit: u32) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(ContextStore::open(StoreConfig::new(dir.path())).unwrap());
    store.create(acme()).unwrap();

    let llm = Arc::new(ScriptedClient::new());
    let research = Arc::new(FakeResearch::with_one_result());
    let service = PitchService::new(
        store,
        Generator::new(llm.clone()),
        research.clone(),
        Arc::new(UsageMeter::new(daily_limit)),
    );

    Harness {
        service,
        llm,
        research,
        _dir: dir,
    }
}

fn input(format: OutputFormat, pdf: Vec<u8>) -> PitchInput {
    PitchInput {
        context_name: "Acme Corp".to_string(),
        profile_pdf: pdf,
        notes: String::new(),
        output_format: format,
        instructions: None,
        sender_name: Some("Sam".to_string()),
    }
}

#[test]
fn test_text_is_extracted_from_generated_pdf() {
    let text = profile::extract_text(&text_pdf("Hello World")).unwrap();
    assert!(text.contains("Hello World"));
}

#[tokio::test]
async fn test_outreach_run_splits_email() {
    let h = harness(5);

    let outcome = h
        .service
        .run(input(OutputFormat::Outreach, text_pdf("Jane Doe")))
        .await
        .unwrap();

    assert_eq!(outcome.message, GENERATED_EMAIL);
    let email = outcome.email.unwrap();
    assert_eq!(email.subject, "Faster deploys at Globex");
    assert!(email.body.starts_with("Hi Jane,"));
    assert_eq!(outcome.company_summary, "Globex is moving its platform to the cloud.");
    assert_eq!(outcome.research.len(), 1);
    assert_eq!(h.research.call_count(), 1);
    // profile parse, company summary, generation
    assert_eq!(h.llm.prompt_count(), 3);
    assert!(h.llm.last_prompt().contains("Best regards,\nSam"));
}

#[tokio::test]
async fn test_non_email_formats_have_no_email_parts() {
    let h = harness(5);

    let outcome = h
        .service
        .run(input(OutputFormat::Voicemail, text_pdf("Jane Doe")))
        .await
        .unwrap();

    assert!(outcome.email.is_none());
    assert!(!h.llm.last_prompt().contains("SUBJECT:"));
}

#[tokio::test]
async fn test_missing_context_stops_before_any_service_call() {
    let h = harness(5);
    let mut request = input(OutputFormat::Summary, text_pdf("Jane"));
    request.context_name = "Globex".to_string();

    let err = h.service.run(request).await.unwrap_err();

    assert!(matches!(err, PitchError::NotFound(_)));
    assert_eq!(h.llm.prompt_count(), 0);
    assert_eq!(h.research.call_count(), 0);
}

#[tokio::test]
async fn test_unreadable_profile_does_not_use_quota() {
    let h = harness(1);

    let err = h
        .service
        .run(input(OutputFormat::Summary, b"not a pdf".to_vec()))
        .await
        .unwrap_err();
    assert!(matches!(err, PitchError::Extraction(_)));

    let outcome = h
        .service
        .run(input(OutputFormat::Summary, text_pdf("Jane")))
        .await
        .unwrap();
    assert_eq!(outcome.remaining_today, 0);
}
