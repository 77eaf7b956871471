use url::Url;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a URL")]
    EmptyInput,
    #[error("Please enter a valid URL (e.g., https://example.com)")]
    MalformedUrl,
    #[error("Unknown model '{0}'. Use lr, rf or dt.")]
    UnknownModel(String),
}

/// Checks that `input` is an absolute URL with a scheme and a host.
///
/// Returns the trimmed input as typed; the URL is never canonicalized.
pub fn validate_url(input: &str) -> Result<&str, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let parsed = Url::parse(trimmed).map_err(|_| ValidationError::MalformedUrl)?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(trimmed),
        _ => Err(ValidationError::MalformedUrl),
    }
}
