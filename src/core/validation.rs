//! Field validation for registration and profile edits.

use crate::core::error::ValidationError;
use crate::models::account::Profile;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("Invalid regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Exactly ten ASCII digits.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    Ok(())
}

pub fn validate_password(password: &str, min_len: usize) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    if password.chars().count() < min_len {
        return Err(ValidationError::PasswordTooShort { min: min_len });
    }
    Ok(())
}

/// Email and contact-number checks shared by registration and edits.
pub fn validate_contact_fields(profile: &Profile) -> Result<(), ValidationError> {
    if !is_valid_email(&profile.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if !is_valid_phone(&profile.contact_number) {
        return Err(ValidationError::InvalidContactNumber);
    }
    Ok(())
}

/// Registration form check: every field except the picture must be filled in.
pub fn require_profile_fields(profile: &Profile) -> Result<(), ValidationError> {
    let required = [
        ("first name", &profile.first_name),
        ("last name", &profile.last_name),
        ("email", &profile.email),
        ("contact number", &profile.contact_number),
        ("address", &profile.address),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }
    Ok(())
}
