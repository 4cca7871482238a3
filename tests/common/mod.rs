//! Shared fixtures: fake external services and a minimal text PDF

#![allow(dead_code)]

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pitch_buddy::llm::CompletionClient;
use pitch_buddy::research::{ResearchService, SearchResult};
use pitch_buddy::{CompanyContext, PitchError, PitchResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const GENERATED_EMAIL: &str =
    "SUBJECT: Faster deploys at Globex\n\nHi Jane,\n\nSaw your cloud migration work.\nBest regards,\nSam";

/// Answers each kind of prompt the pipeline sends with a canned reply
pub struct ScriptedClient {
    pub prompts: Mutex<Vec<String>>,
    pub fail_generation: bool,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail_generation: false,
        }
    }

    pub fn failing_generation() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail_generation: true,
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, prompt: &str, _temperature: f32) -> PitchResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if prompt.contains("Extract the following details") {
            return Ok(r#"{"name": "Jane Doe", "title": "CTO", "company": "Globex"}"#.to_string());
        }
        if prompt.contains("Summarize this information") {
            return Ok("Globex is moving its platform to the cloud.".to_string());
        }
        if prompt.contains("extract and organize company information") {
            return Ok("Acme builds k8s tooling for mid-market DevOps teams.".to_string());
        }
        if self.fail_generation {
            return Err(PitchError::upstream("OpenAI", Some(429), "Rate limit exceeded"));
        }
        Ok(GENERATED_EMAIL.to_string())
    }
}

pub struct FakeResearch {
    pub calls: AtomicUsize,
    pub results: Vec<SearchResult>,
}

impl FakeResearch {
    pub fn with_one_result() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            results: vec![SearchResult {
                title: "Globex cloud migration".to_string(),
                snippet: "Globex announced a move to the cloud.".to_string(),
                url: "https://example.com/globex".to_string(),
            }],
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResearchService for FakeResearch {
    async fn research(&self, _company_name: &str) -> PitchResult<Vec<SearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.clone())
    }
}

pub fn acme() -> CompanyContext {
    CompanyContext::new("Acme Corp")
        .with_description("Cloud infra")
        .with_technology("k8s tooling")
        .with_value_propositions(vec!["faster deploys", "lower cost"])
        .with_positioning("DevOps for mid-market")
}

/// A one-page PDF whose only text is `text`
pub fn text_pdf(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
