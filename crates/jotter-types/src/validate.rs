/// Longest username accepted, in characters.
pub const MAX_USERNAME_LEN: usize = 50;

/// Longest post title accepted, in characters.
pub const MAX_TITLE_LEN: usize = 100;

/// Field-level checks run after a request body deserializes.
///
/// Deserialization already rejects missing fields; this catches values that
/// are present but unusable. The error is a human-readable message returned
/// to the client as-is.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

pub(crate) fn require_max_chars(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}
