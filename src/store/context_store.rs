// src/store/context_store.rs
//! One JSON file per company context under a dedicated directory.
//!
//! Records are addressed by `utils::storage_key(name)`, so two names that map
//! to the same key are the same context. Creation rejects duplicates; only
//! `update` and `import(.., overwrite = true)` replace an existing record.

use super::{CompanyContext, ContextListing, ImportedRecord, ListIssue, StoreConfig};
use crate::core::FsOps;
use crate::error::{PitchError, PitchResult};
use crate::utils::storage_key;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const RECORD_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct ContextStore {
    root: PathBuf,
}

impl ContextStore {
    /// Open the store, creating its directory when needed
    pub fn open(config: StoreConfig) -> PitchResult<Self> {
        FsOps::ensure_dir_exists(&config.root)?;
        Ok(Self { root: config.root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, name: &str) -> PitchResult<bool> {
        Ok(self.record_path(&storage_key(name)?).exists())
    }

    pub fn create(&self, context: CompanyContext) -> PitchResult<CompanyContext> {
        let mut context = context.normalized()?;
        let key = storage_key(&context.name)?;
        let path = self.record_path(&key);

        if path.exists() {
            return Err(PitchError::DuplicateName(context.name));
        }

        let now = Utc::now();
        context.created_at = Some(now);
        context.updated_at = Some(now);

        self.create_record(&path, &context)?;
        info!("Created company context '{}' ({})", context.name, key);
        Ok(context)
    }

    pub fn get(&self, name: &str) -> PitchResult<CompanyContext> {
        let key = storage_key(name)?;
        let path = self.record_path(&key);

        if !path.exists() {
            return Err(PitchError::NotFound(name.trim().to_string()));
        }

        Self::read_record(&path, &key)
    }

    /// Replace the record stored under `name` with `context`.
    ///
    /// When `context.name` maps to another key the record moves there; the
    /// target must be free. `created_at` is carried over from the stored record.
    pub fn update(&self, name: &str, context: CompanyContext) -> PitchResult<CompanyContext> {
        let old_key = storage_key(name)?;
        let old_path = self.record_path(&old_key);

        if !old_path.exists() {
            return Err(PitchError::NotFound(name.trim().to_string()));
        }

        let mut context = context.normalized()?;
        let new_key = storage_key(&context.name)?;
        let new_path = self.record_path(&new_key);

        if new_key != old_key && new_path.exists() {
            return Err(PitchError::DuplicateName(context.name));
        }

        let created_at = match Self::read_record(&old_path, &old_key) {
            Ok(existing) => existing.created_at,
            Err(e @ PitchError::Corrupt { .. }) => {
                warn!("Replacing unreadable context record: {}", e);
                None
            }
            Err(e) => return Err(e),
        };

        let now = Utc::now();
        context.created_at = created_at.or(Some(now));
        context.updated_at = Some(now);

        if new_key == old_key {
            self.write_record(&new_path, &context)?;
        } else {
            self.move_record(&old_path, &new_path, &context, FsOps::remove_file)?;
            info!(
                "Renamed company context '{}' to '{}'",
                name.trim(),
                context.name
            );
        }

        info!("Updated company context '{}' ({})", context.name, new_key);
        Ok(context)
    }

    pub fn delete(&self, name: &str) -> PitchResult<()> {
        let key = storage_key(name)?;
        let path = self.record_path(&key);

        if !path.exists() {
            return Err(PitchError::NotFound(name.trim().to_string()));
        }

        FsOps::remove_file(&path)?;
        info!("Deleted company context '{}' ({})", name.trim(), key);
        Ok(())
    }

    /// Enumerate every record. A bad file becomes a `ListIssue`; it never
    /// aborts the listing.
    pub fn list(&self) -> PitchResult<ContextListing> {
        let mut listing = ContextListing::default();

        for path in FsOps::list_files_with_extension(&self.root, RECORD_EXTENSION)? {
            let key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();

            match Self::read_record(&path, &key) {
                Ok(context) => listing.contexts.push(context),
                Err(e) => {
                    warn!("Skipping context record {}: {}", path.display(), e);
                    listing.issues.push(ListIssue {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        listing
            .contexts
            .sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(listing)
    }

    /// Pretty JSON of a single record, suitable for download and re-import
    pub fn export(&self, name: &str) -> PitchResult<String> {
        let context = self.get(name)?;
        Self::to_json(&context)
    }

    /// Store a record from exported JSON.
    ///
    /// `name_override` replaces the name inside the document. An existing
    /// record is only replaced when `overwrite` is set.
    pub fn import(
        &self,
        json: &str,
        name_override: Option<&str>,
        overwrite: bool,
    ) -> PitchResult<CompanyContext> {
        let record: ImportedRecord = serde_json::from_str(json)
            .map_err(|e| PitchError::Validation(format!("not a company context document: {}", e)))?;

        let mut context = CompanyContext::from(record);
        if let Some(name) = name_override.filter(|n| !n.trim().is_empty()) {
            context.name = name.to_string();
        }

        if self.contains(&context.name)? {
            if !overwrite {
                return Err(PitchError::DuplicateName(context.name.trim().to_string()));
            }
            let name = context.name.clone();
            return self.update(&name, context);
        }

        self.create(context)
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{}", key, RECORD_EXTENSION))
    }

    fn read_record(path: &Path, key: &str) -> PitchResult<CompanyContext> {
        let content = FsOps::read_file_safe(path)?;

        let context: CompanyContext =
            serde_json::from_str(&content).map_err(|e| PitchError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        context.validate().map_err(|e| PitchError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let record_key = storage_key(&context.name)?;
        if record_key != key {
            return Err(PitchError::Corrupt {
                path: path.to_path_buf(),
                reason: format!(
                    "record for '{}' belongs in {}.{}",
                    context.name, record_key, RECORD_EXTENSION
                ),
            });
        }

        Ok(context)
    }

    /// Write a record that must not exist yet. Losing a create race is `DuplicateName`.
    fn create_record(&self, path: &Path, context: &CompanyContext) -> PitchResult<()> {
        let json = Self::to_json(context)?;
        match FsOps::create_file_atomic(path, &json) {
            Err(PitchError::Storage { source, .. })
                if source.kind() == std::io::ErrorKind::AlreadyExists =>
            {
                Err(PitchError::DuplicateName(context.name.clone()))
            }
            other => other,
        }
    }

    /// Store `context` at `to` and drop the record at `from`.
    ///
    /// If `from` cannot be removed the new record is removed again, so a failed
    /// rename leaves only the original.
    fn move_record<F>(
        &self,
        from: &Path,
        to: &Path,
        context: &CompanyContext,
        remove: F,
    ) -> PitchResult<()>
    where
        F: FnOnce(&Path) -> PitchResult<()>,
    {
        self.create_record(to, context)?;

        if let Err(e) = remove(from) {
            warn!(
                "Rolling back rename of {} to {}: {}",
                from.display(),
                to.display(),
                e
            );
            if let Err(cleanup) = FsOps::remove_file(to) {
                warn!("Failed to roll back {}: {}", to.display(), cleanup);
            }
            return Err(e);
        }

        Ok(())
    }

    fn write_record(&self, path: &Path, context: &CompanyContext) -> PitchResult<()> {
        let json = Self::to_json(context)?;
        FsOps::write_file_atomic(path, &json)
    }

    fn to_json(context: &CompanyContext) -> PitchResult<String> {
        serde_json::to_string_pretty(context)
            .map_err(|e| PitchError::Validation(format!("cannot serialize '{}': {}", context.name, e)))
    }
}
