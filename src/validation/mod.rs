//! Declarative input validation.
//!
//! Validators collect the first failure per field into a [`FieldErrors`] map and never
//! touch the store. A form either validates completely or is rejected as a whole.

mod catalog;
mod leads;
mod site;

pub use catalog::*;
pub use leads::*;
pub use site::*;

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-() ]{7,20}$").expect("phone regex"));

pub const MAX_SLUG_LEN: usize = 100;

/// Field name to first error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. Only the first message per field is kept.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Accumulates rule failures for one input.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure when `ok` is false.
    pub fn check(&mut self, field: &str, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.add(field, message);
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str, label: &str) -> &mut Self {
        self.check(
            field,
            !value.trim().is_empty(),
            format!("{} is required", label),
        )
    }

    /// Required text between `min` and `max` characters.
    pub fn text(&mut self, field: &str, value: &str, label: &str, min: usize, max: usize) -> &mut Self {
        let len = value.trim().chars().count();
        if len == 0 {
            return self.required(field, value, label);
        }
        self.check(
            field,
            len >= min,
            format!("{} must be at least {} characters", label, min),
        )
        .check(
            field,
            len <= max,
            format!("{} must be at most {} characters", label, max),
        )
    }

    /// Optional text capped at `max` characters.
    pub fn max_len(&mut self, field: &str, value: Option<&str>, label: &str, max: usize) -> &mut Self {
        let len = value.map(|v| v.trim().chars().count()).unwrap_or(0);
        self.check(
            field,
            len <= max,
            format!("{} must be at most {} characters", label, max),
        )
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            return self.required(field, value, "Email");
        }
        self.check(
            field,
            is_valid_email(value.trim()),
            "Please enter a valid email address",
        )
    }

    pub fn slug(&mut self, field: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            return self.required(field, value, "Slug");
        }
        self.check(
            field,
            is_valid_slug(value),
            "Slug may only contain lowercase letters, numbers and single hyphens",
        )
    }

    pub fn phone(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(phone) => self.check(
                field,
                PHONE_RE.is_match(phone) && phone.chars().any(|c| c.is_ascii_digit()),
                "Please enter a valid phone number",
            ),
            None => self,
        }
    }

    pub fn url(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(url) => self.check(field, is_valid_url(url), "Please enter a valid URL"),
            None => self,
        }
    }

    pub fn range<T>(&mut self, field: &str, value: T, label: &str, min: T, max: T) -> &mut Self
    where
        T: PartialOrd + fmt::Display + Copy,
    {
        self.check(
            field,
            value >= min && value <= max,
            format!("{} must be between {} and {}", label, min, max),
        )
    }

    #[cfg(test)]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Turn collected failures into a validation error.
    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= MAX_SLUG_LEN && SLUG_RE.is_match(slug)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_url(url: &str) -> bool {
    (url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/'))
        && !url.chars().any(char::is_whitespace)
}

/// Derive a URL-safe slug from a display name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    slug.chars().take(MAX_SLUG_LEN).collect::<String>().trim_end_matches('-').to_string()
}

/// Trim a string, mapping blank to `None`.
pub(crate) fn clean_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim every entry and drop blanks.
pub(crate) fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
