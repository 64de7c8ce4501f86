//! Admin input validation
//!
//! Every write to the document store goes through [`validate_entry`].
//! Rules mirror the admin form: required fields, identifier slug format,
//! safe URLs, bare image filenames, and length caps.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::entry::AppEntry;

pub const MAX_ID_LEN: usize = 50;
pub const MAX_URL_LEN: usize = 200;
pub const MAX_IMAGE_LEN: usize = 100;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("invalid id regex"));

static DANGEROUS_SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(javascript|data|vbscript):").expect("invalid scheme regex"));

/// Relative path or absolute http(s) URL
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(https?://[^\s<>"']+|[a-zA-Z0-9_\-./]+)$"#).expect("invalid url regex")
});

/// Bare filename, no directories (blocks path traversal)
static IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-zA-Z0-9_\-]+\.(png|jpg|jpeg|gif|webp|svg)$").expect("invalid image regex")
});

/// Validation error for admin input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format
    InvalidFormat { field: &'static str, reason: &'static str },

    /// URL uses a scheme that could execute script
    UnsafeUrl,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} must be {} characters or less", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::UnsafeUrl => write!(f, "url: invalid URL format (security restriction)"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a (trimmed) entry before it is written.
///
/// Checks run in a fixed order so the first failure reported is stable:
/// required fields, then id, url, image, name and description.
pub fn validate_entry(entry: &AppEntry) -> Result<(), ValidationError> {
    for (field, value) in [
        ("id", &entry.id),
        ("name", &entry.name),
        ("url", &entry.url),
        ("image", &entry.image),
        ("description", &entry.description),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field });
        }
    }

    validate_id(&entry.id)?;
    validate_url(&entry.url)?;
    validate_image(&entry.image)?;

    check_len("name", &entry.name, MAX_NAME_LEN)?;
    check_len("description", &entry.description, MAX_DESCRIPTION_LEN)?;

    Ok(())
}

/// Identifier: letters, digits, hyphens and underscores only.
pub fn validate_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::Empty { field: "id" });
    }
    if !ID_RE.is_match(id) {
        return Err(ValidationError::InvalidFormat {
            field: "id",
            reason: "must contain only letters, numbers, hyphens, and underscores",
        });
    }
    check_len("id", id, MAX_ID_LEN)
}

fn validate_url(url: &str) -> Result<(), ValidationError> {
    if DANGEROUS_SCHEME_RE.is_match(url) {
        return Err(ValidationError::UnsafeUrl);
    }
    if !URL_RE.is_match(url) {
        return Err(ValidationError::InvalidFormat {
            field: "url",
            reason: "must be a relative path or an http(s) URL",
        });
    }
    check_len("url", url, MAX_URL_LEN)
}

fn validate_image(image: &str) -> Result<(), ValidationError> {
    if !IMAGE_RE.is_match(image) {
        return Err(ValidationError::InvalidFormat {
            field: "image",
            reason: "must be a valid filename (e.g., my-icon.png)",
        });
    }
    check_len("image", image, MAX_IMAGE_LEN)
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
