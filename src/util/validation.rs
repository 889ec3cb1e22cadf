use once_cell::sync::Lazy;
use regex::Regex;
use validator::{extras::validate_length, ValidateError};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$")
        .expect("compile email regex")
});

pub const EMAIL_MAX: usize = 254;
pub const NAME_MAX: usize = 150;
pub const PASSWORD_MIN: usize = 12;
pub const PASSWORD_MAX: usize = 128;

/// Host names in IP address form are rejected by the regex since
/// they have no label after the `@`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email) && email.len() <= EMAIL_MAX
}

/// Emails are the login handle so they're compared case-insensitively.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn check_email(email: &str) -> ValidateError {
    let mut error = ValidateError::msg_builder();
    if email.trim().is_empty() {
        error.insert("E-mail address is required");
    } else if !is_valid_email(email.trim()) {
        error.insert("Invalid e-mail address");
    }
    error.build()
}

pub fn check_name(name: &str) -> ValidateError {
    let mut error = ValidateError::msg_builder();
    if name.trim().is_empty() {
        error.insert("This field must not be blank");
    } else if !validate_length(name, None, Some(NAME_MAX)) {
        error.insert("This field is too long");
    }
    error.build()
}

pub fn check_password(password: &str) -> ValidateError {
    // All passwords must have no trailing or leading whitespaces
    let mut error = ValidateError::msg_builder();
    if password.trim().len() != password.len() {
        error.insert("Passwords must not have starting or ending with spaces");
    } else if password.len() > PASSWORD_MAX {
        error.insert("Passwords must not be too big");
    } else if password.len() < PASSWORD_MIN {
        error.insert("Passwords must not be too short");
    }
    error.build()
}
