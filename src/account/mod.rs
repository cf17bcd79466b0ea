use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sign-in mock
// ---------------------------------------------------------------------------

/// A signed-in operator profile.
///
/// The demo has no real authentication: any non-empty email and password
/// signs in. The profile only drives display (greeting, avatar initial).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    /// Uppercase first letter of the display name, for the avatar badge.
    pub initial: String,
}

/// Sign-in rejection: a required field was blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInError {
    MissingEmail,
    MissingPassword,
}

impl fmt::Display for SignInError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignInError::MissingEmail => write!(f, "email is required"),
            SignInError::MissingPassword => write!(f, "password is required"),
        }
    }
}

impl std::error::Error for SignInError {}

/// Validate a sign-in attempt and build the resulting profile.
///
/// The password is checked for presence only and never stored. When `name`
/// is blank the local part of the email address is used as the display name.
pub fn sign_in(name: &str, email: &str, password: &str) -> Result<Profile, SignInError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(SignInError::MissingEmail);
    }
    if password.trim().is_empty() {
        return Err(SignInError::MissingPassword);
    }

    let name = display_name(name, email);
    let initial = name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string());

    Ok(Profile {
        name,
        email: email.to_string(),
        initial,
    })
}

/// Resolve the display name: the given name, or the email local part.
fn display_name(name: &str, email: &str) -> String {
    let name = name.trim();
    if !name.is_empty() {
        return name.to_string();
    }
    email
        .split('@')
        .next()
        .unwrap_or(email)
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
