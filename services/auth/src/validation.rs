//! Input validation for registration

use regex::Regex;
use std::sync::OnceLock;

const USERNAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=32;
const PASSWORD_LENGTH: std::ops::RangeInclusive<usize> = 8..=128;

fn username_regex() -> &'static Regex {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"))
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if !USERNAME_LENGTH.contains(&username.chars().count()) {
        return Err(format!(
            "Username must be between {} and {} characters long",
            USERNAME_LENGTH.start(),
            USERNAME_LENGTH.end()
        ));
    }

    if !username_regex().is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if !PASSWORD_LENGTH.contains(&password.chars().count()) {
        return Err(format!(
            "Password must be between {} and {} characters long",
            PASSWORD_LENGTH.start(),
            PASSWORD_LENGTH.end()
        ));
    }

    let rules: [(fn(char) -> bool, &str); 4] = [
        (|c| c.is_ascii_uppercase(), "one uppercase letter"),
        (|c| c.is_ascii_lowercase(), "one lowercase letter"),
        (|c| c.is_ascii_digit(), "one digit"),
        (|c| !c.is_alphanumeric(), "one special character"),
    ];

    for (matches, requirement) in rules {
        if !password.chars().any(matches) {
            return Err(format!("Password must contain at least {}", requirement));
        }
    }

    Ok(())
}
