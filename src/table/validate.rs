use crate::model::User;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Local validation failures; `Display` is the text shown in the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingFields,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Email already in use")]
    DuplicateEmail,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Checked against the lowercased address.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(&email.to_lowercase())
}

fn has_missing_fields(user: &User) -> bool {
    [
        &user.first_name,
        &user.last_name,
        &user.phone,
        &user.position,
        &user.email,
    ]
    .iter()
    .any(|v| v.is_empty())
}

pub fn validate_new(draft: &User, existing: &[User]) -> Result<(), ValidationError> {
    if has_missing_fields(draft) {
        return Err(ValidationError::MissingFields);
    }
    if !is_valid_email(&draft.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if existing.iter().any(|u| u.email == draft.email) {
        return Err(ValidationError::DuplicateEmail);
    }
    Ok(())
}

/// The edited record itself (same id) never counts as a collision.
pub fn validate_edit(draft: &User, existing: &[User]) -> Result<(), ValidationError> {
    if !is_valid_email(&draft.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if existing
        .iter()
        .any(|u| u.email == draft.email && u.id != draft.id)
    {
        return Err(ValidationError::DuplicateEmail);
    }
    Ok(())
}
