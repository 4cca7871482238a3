// src/store/mod.rs
//! Company context records and their file-backed store

pub mod context_store;

pub use context_store::ContextStore;

use crate::error::{PitchError, PitchResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A named description of the sender's own company, used as generation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyContext {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technology: String,
    #[serde(default)]
    pub value_propositions: Vec<String>,
    #[serde(default)]
    pub positioning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CompanyContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            technology: String::new(),
            value_propositions: Vec::new(),
            positioning: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = technology.into();
        self
    }

    pub fn with_value_propositions<I, S>(mut self, propositions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_propositions = propositions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_positioning(mut self, positioning: impl Into<String>) -> Self {
        self.positioning = positioning.into();
        self
    }

    /// Trim every text field, then validate
    pub fn normalized(mut self) -> PitchResult<Self> {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.technology = self.technology.trim().to_string();
        self.positioning = self.positioning.trim().to_string();
        self.value_propositions = self
            .value_propositions
            .into_iter()
            .map(|p| p.trim().to_string())
            .collect();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> PitchResult<()> {
        if self.name.trim().is_empty() {
            return Err(PitchError::Validation("name must not be empty".to_string()));
        }
        if self.name.chars().any(char::is_control) {
            return Err(PitchError::Validation(
                "name must not contain control characters".to_string(),
            ));
        }
        if let Some(index) = self
            .value_propositions
            .iter()
            .position(|p| p.trim().is_empty())
        {
            return Err(PitchError::Validation(format!(
                "value proposition #{} is blank",
                index + 1
            )));
        }
        crate::utils::storage_key(&self.name)?;
        Ok(())
    }
}

/// Where the store keeps its records
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub root: PathBuf,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// A stored file that could not be turned into a valid record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListIssue {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of enumerating the store: valid records sorted by name, plus per-file problems.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContextListing {
    pub contexts: Vec<CompanyContext>,
    pub issues: Vec<ListIssue>,
}

impl ContextListing {
    pub fn names(&self) -> Vec<String> {
        self.contexts.iter().map(|c| c.name.clone()).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Shape accepted by `ContextStore::import`.
///
/// Besides the native record, the older `{company_name, company_info}` export
/// format is still understood.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ImportedRecord {
    Native(CompanyContext),
    Legacy(LegacyContext),
}

#[derive(Debug, Deserialize)]
pub(crate) struct LegacyContext {
    company_name: String,
    #[serde(default)]
    company_info: String,
}

impl From<ImportedRecord> for CompanyContext {
    fn from(record: ImportedRecord) -> Self {
        match record {
            ImportedRecord::Native(context) => context,
            ImportedRecord::Legacy(legacy) => {
                CompanyContext::new(legacy.company_name).with_description(legacy.company_info)
            }
        }
    }
}
