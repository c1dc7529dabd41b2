use super::error::ReferralError;

/// Accepts a description that still has content after trimming.
///
/// The returned slice is the caller's text untouched; normalisation is the
/// prompt builder's job.
pub fn validate(description: Option<&str>) -> Result<&str, ReferralError> {
    match description {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ReferralError::empty_input()),
    }
}
