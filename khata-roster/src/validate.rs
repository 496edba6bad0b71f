use crate::{RosterError, RosterResult};

/// Minimum length for organization and person names.
const MIN_NAME_LEN: usize = 2;

pub(crate) fn validate_name<'a>(raw: &'a str, what: &str) -> RosterResult<&'a str> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Err(RosterError::Invalid(format!(
            "{what} must be at least {MIN_NAME_LEN} characters"
        )));
    }
    Ok(trimmed)
}

/// Light shape check; real mail validation belongs to the delivery side.
pub(crate) fn validate_email(raw: &str) -> RosterResult<String> {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(RosterError::Invalid(format!("invalid email address: {raw}")));
    }
    Ok(trimmed.to_string())
}
