//! Input normalization shared by profile and review validation.

use url::Url;

use crate::error::{DomainError, Result};

/// Maximum length of names (business and customer), in characters.
pub const MAX_NAME_CHARS: usize = 200;

/// Maximum length of a website or logo URL, in characters.
pub const MAX_URL_CHARS: usize = 2048;

/// Maximum length of a review comment, in characters.
pub const MAX_COMMENT_CHARS: usize = 5000;

/// Trim `value` and require it to be non-empty and at most `max_chars` long.
pub(crate) fn required_text(field: &'static str, value: &str, max_chars: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    bounded(field, trimmed, max_chars)?;
    Ok(trimmed.to_string())
}

/// Trim an optional URL, mapping missing or blank input to `None`.
///
/// Anything left must be an absolute `http` or `https` URL.
pub(crate) fn optional_url(field: &'static str, value: Option<&str>) -> Result<Option<String>> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    bounded(field, trimmed, MAX_URL_CHARS)?;

    let parsed = Url::parse(trimmed)
        .map_err(|e| DomainError::validation(field, format!("invalid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DomainError::validation(
            field,
            "URL must use http or https",
        ));
    }
    Ok(Some(trimmed.to_string()))
}

pub(crate) fn bounded(field: &'static str, value: &str, max_chars: usize) -> Result<()> {
    if value.chars().count() > max_chars {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims() {
        assert_eq!(required_text("name", "  Acme  ", 10).unwrap(), "Acme");
    }

    #[test]
    fn required_text_rejects_whitespace() {
        let err = required_text("name", " \t\n", 10).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "name", .. }));
    }

    #[test]
    fn required_text_counts_characters_not_bytes() {
        assert!(required_text("name", "ééééé", 5).is_ok());
        assert!(required_text("name", "éééééé", 5).is_err());
    }

    #[test]
    fn blank_url_becomes_none() {
        assert_eq!(optional_url("website", None).unwrap(), None);
        assert_eq!(optional_url("website", Some("")).unwrap(), None);
        assert_eq!(optional_url("website", Some("   ")).unwrap(), None);
    }

    #[test]
    fn url_must_be_http() {
        assert_eq!(
            optional_url("website", Some(" https://acme.test ")).unwrap(),
            Some("https://acme.test".to_string())
        );
        assert!(optional_url("website", Some("acme.test")).is_err());
        assert!(optional_url("logo_url", Some("ftp://acme.test/logo.png")).is_err());
    }
}
