//! Client-side form validation
//!
//! Validation runs before any request is sent. Each form reports errors per
//! field with the texts shown next to the inputs; the first failing rule of a
//! field wins.

use crate::types::ApiError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub const SIGN_IN_MIN_PASSWORD: usize = 6;
pub const STRONG_MIN_PASSWORD: usize = 8;
pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
    Token,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm password",
            Field::Token => "token",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// All field errors of one submission, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(Vec<FieldError>);

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for FormErrors {}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    fn push(&mut self, error: Option<FieldError>) {
        self.0.extend(error);
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn check_email(email: &str) -> Option<FieldError> {
    if email.trim().is_empty() {
        Some(FieldError::new(Field::Email, "Email is required"))
    } else if !is_valid_email(email.trim()) {
        Some(FieldError::new(
            Field::Email,
            "Please enter a valid email address",
        ))
    } else {
        None
    }
}

/// Which strength rules a password meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    pub has_upper_case: bool,
    pub has_lower_case: bool,
    pub has_number: bool,
    pub has_min_length: bool,
}

impl PasswordStrength {
    pub fn of(password: &str) -> Self {
        Self {
            has_upper_case: password.chars().any(|c| c.is_ascii_uppercase()),
            has_lower_case: password.chars().any(|c| c.is_ascii_lowercase()),
            has_number: password.chars().any(|c| c.is_ascii_digit()),
            has_min_length: password.chars().count() >= STRONG_MIN_PASSWORD,
        }
    }

    pub fn is_strong(&self) -> bool {
        self.has_upper_case && self.has_lower_case && self.has_number && self.has_min_length
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.push(check_email(&self.email));

        if self.password.is_empty() {
            errors.push(Some(FieldError::new(Field::Password, "Password is required")));
        } else if self.password.chars().count() < SIGN_IN_MIN_PASSWORD {
            errors.push(Some(FieldError::new(
                Field::Password,
                "Password must be at least 6 characters",
            )));
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            errors.push(Some(FieldError::new(Field::Name, "Name is required")));
        } else if name_len < NAME_MIN {
            errors.push(Some(FieldError::new(
                Field::Name,
                "Name must be at least 2 characters",
            )));
        } else if name_len > NAME_MAX {
            errors.push(Some(FieldError::new(
                Field::Name,
                "Name must be less than 50 characters",
            )));
        }

        errors.push(check_email(&self.email));

        if self.password.is_empty() {
            errors.push(Some(FieldError::new(Field::Password, "Password is required")));
        } else {
            let strength = PasswordStrength::of(&self.password);
            let message = if !strength.has_min_length {
                Some("Password must be at least 8 characters")
            } else if !strength.has_upper_case {
                Some("Password must contain at least one uppercase letter")
            } else if !strength.has_lower_case {
                Some("Password must contain at least one lowercase letter")
            } else if !strength.has_number {
                Some("Password must contain at least one number")
            } else {
                None
            };
            errors.push(message.map(|m| FieldError::new(Field::Password, m)));
        }

        if self.confirm_password.is_empty() {
            errors.push(Some(FieldError::new(
                Field::ConfirmPassword,
                "Please confirm your password",
            )));
        } else if self.password != self.confirm_password {
            errors.push(Some(FieldError::new(
                Field::ConfirmPassword,
                "Passwords do not match",
            )));
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.push(check_email(&self.email));
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        if self.password.chars().count() < STRONG_MIN_PASSWORD {
            errors.push(Some(FieldError::new(
                Field::Password,
                "Password must be at least 8 characters long.",
            )));
        }
        if self.password != self.confirm_password {
            errors.push(Some(FieldError::new(
                Field::ConfirmPassword,
                "Passwords do not match.",
            )));
        }
        if self.token.trim().is_empty() {
            errors.push(Some(FieldError::new(
                Field::Token,
                "Cannot reset password without a valid token.",
            )));
        }

        errors.into_result()
    }
}

/// Map a failed registration onto the form field it concerns.
pub fn register_error_field(error: &ApiError) -> Option<FieldError> {
    let duplicate = error.is_conflict() || error.to_string().contains("already exists");
    duplicate.then(|| FieldError::new(Field::Email, "This email is already registered."))
}
