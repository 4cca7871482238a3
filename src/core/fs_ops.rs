// src/core/fs_ops.rs
//! File system operations used by the context store

use crate::error::{PitchError, PitchResult};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct FsOps;

impl FsOps {
    /// Ensure directory exists
    pub fn ensure_dir_exists(path: &Path) -> PitchResult<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| PitchError::storage(path, e))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    pub fn read_file_safe(path: &Path) -> PitchResult<String> {
        fs::read_to_string(path).map_err(|e| PitchError::storage(path, e))
    }

    /// Replace `path` with `content` without ever exposing a half-written file.
    ///
    /// The content goes to a hidden temp file in the same directory, is synced,
    /// then renamed over the target. Readers see either the old or the new file.
    pub fn write_file_atomic(path: &Path, content: &str) -> PitchResult<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::ensure_dir_exists(parent)?;

        let temp_path = Self::temp_path_for(path);
        if let Err(e) = Self::write_and_sync(&temp_path, content) {
            let _ = fs::remove_file(&temp_path);
            return Err(PitchError::storage(&temp_path, e));
        }

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(PitchError::storage(path, e));
        }

        Self::sync_dir(parent);
        debug!("Written file: {}", path.display());
        Ok(())
    }

    /// Like `write_file_atomic`, but fails with `io::ErrorKind::AlreadyExists`
    /// instead of replacing an existing `path`.
    ///
    /// The synced temp file is hard-linked into place; linking onto an existing
    /// path fails.
    pub fn create_file_atomic(path: &Path, content: &str) -> PitchResult<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::ensure_dir_exists(parent)?;

        let temp_path = Self::temp_path_for(path);
        if let Err(e) = Self::write_and_sync(&temp_path, content) {
            let _ = fs::remove_file(&temp_path);
            return Err(PitchError::storage(&temp_path, e));
        }

        let linked = fs::hard_link(&temp_path, path);
        let _ = fs::remove_file(&temp_path);
        linked.map_err(|e| PitchError::storage(path, e))?;

        Self::sync_dir(parent);
        debug!("Created file: {}", path.display());
        Ok(())
    }

    pub fn remove_file(path: &Path) -> PitchResult<()> {
        fs::remove_file(path).map_err(|e| PitchError::storage(path, e))?;
        debug!("Removed file: {}", path.display());
        Ok(())
    }

    /// List regular, non-hidden files in `dir` carrying the given extension, sorted by path
    pub fn list_files_with_extension(dir: &Path, extension: &str) -> PitchResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        if !dir.exists() {
            return Ok(files);
        }

        let entries = fs::read_dir(dir).map_err(|e| PitchError::storage(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| PitchError::storage(dir, e))?;
            let path = entry.path();

            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(true, |n| n.starts_with('.'));
            if hidden || !path.is_file() {
                continue;
            }

            if Self::get_extension(&path).as_deref() == Some(extension) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Get file extension safely
    pub fn get_extension(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    fn temp_path_for(path: &Path) -> PathBuf {
        let stem = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("record");
        path.with_file_name(format!(".{}.{}.tmp", stem, uuid::Uuid::new_v4()))
    }

    fn write_and_sync(path: &Path, content: &str) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()
    }

    #[cfg(unix)]
    fn sync_dir(dir: &Path) {
        if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
            warn!("Failed to sync directory {}: {}", dir.display(), e);
        }
    }

    #[cfg(not(unix))]
    fn sync_dir(_dir: &Path) {}
}
