//! Internal helpers for input normalization.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trim and NFC-normalize a required free-text field.
///
/// Account names are grouping keys, so two spellings that only differ in
/// Unicode composition must end up as the same string.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidName(format!("{label} must not be empty")));
    }
    Ok(normalized)
}

/// Trim an optional free-text field, mapping blank values to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.nfc().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composed_and_decomposed_names_match() {
        let composed = normalize_required_text("Caf\u{e9}", "name").unwrap();
        let decomposed = normalize_required_text(" Cafe\u{301} ", "name").unwrap();
        assert_eq!(composed, decomposed);
    }

    #[test]
    fn blank_is_rejected() {
        assert!(normalize_required_text("   ", "name").is_err());
        assert_eq!(normalize_optional_text(Some("  ")), None);
    }
}
