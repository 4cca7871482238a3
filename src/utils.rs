// src/utils.rs
use crate::error::{PitchError, PitchResult};

const MAX_NAME_LEN: usize = 120;

/// Map a context name to the file-system key it is stored under.
///
/// Lowercases, keeps alphanumerics in any script and collapses every other run of
/// characters into a single `-`. The result can never contain a path
/// separator or `..`.
pub fn storage_key(name: &str) -> PitchResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PitchError::Validation("name must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(PitchError::Validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }

    let key = trimmed
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if key.is_empty() {
        return Err(PitchError::Validation(format!(
            "name '{}' has no letters or digits to build a storage key from",
            trimmed
        )));
    }

    Ok(key)
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key("Acme Corp").unwrap(), "acme-corp");
        assert_eq!(storage_key("  acme   corp ").unwrap(), "acme-corp");
        assert_eq!(storage_key("Marie@Company").unwrap(), "marie-company");
        assert_eq!(storage_key("../../etc/passwd").unwrap(), "etc-passwd");
        assert_eq!(storage_key("Café Noir").unwrap(), "café-noir");
        assert_eq!(storage_key("日本電気").unwrap(), "日本電気");
        assert_eq!(storage_key("Ёлка / Tree").unwrap(), "ёлка-tree");
    }

    #[test]
    fn test_storage_key_rejects_unusable_names() {
        assert!(matches!(storage_key(""), Err(PitchError::Validation(_))));
        assert!(matches!(storage_key("   "), Err(PitchError::Validation(_))));
        assert!(matches!(storage_key("!!!"), Err(PitchError::Validation(_))));
        assert!(matches!(storage_key("../.."), Err(PitchError::Validation(_))));
        assert!(matches!(
            storage_key(&"a".repeat(121)),
            Err(PitchError::Validation(_))
        ));
    }

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("profile.PDF"), Some("pdf".to_string()));
        assert_eq!(get_file_extension("deck.txt"), Some("txt".to_string()));
        assert_eq!(get_file_extension("noext"), None);
    }
}
