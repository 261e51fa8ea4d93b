//! Form-level validation shared by the HTTP handlers and the admin editor.
//!
//! Create and patch payloads derive [`validator::Validate`]. The editor runs
//! it before any network request; the server runs it again before touching
//! the database. The custom rules below are plugged in through
//! `#[validate(custom(function = ...))]`.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use url::Url;
use validator::{ValidationError, ValidationErrors};

/// One entry of the `fields` array in a 400 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Flatten validator output into `FieldError`s, sorted by field name.
/// Field names are reported in the camelCase used on the wire.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = camel_case(&field);
            errs.iter().map(move |e| FieldError {
                field: field.clone(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Checks the Rust field name, e.g. `image_url`.
pub fn has_field(errors: &ValidationErrors, field: &str) -> bool {
    errors.field_errors().contains_key(field)
}

/// A single failed field, for checks made outside a derived payload.
pub fn single(field: &'static str, error: ValidationError) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    errors
}

fn failed(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Required text: whitespace alone does not count.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(failed("required", "is required"));
    }
    Ok(())
}

pub fn image_location(value: &str) -> Result<(), ValidationError> {
    if !is_image_location(value) {
        return Err(failed(
            "image_location",
            "must be an absolute URL or a site path",
        ));
    }
    Ok(())
}

/// Like [`image_location`], but an empty value is allowed and clears the image.
pub fn optional_image_location(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    image_location(value)
}

/// Absolute http(s) URLs and site-relative paths (`/uploads/...`) are both
/// accepted, since uploaded images are served by this same host.
pub fn is_image_location(value: &str) -> bool {
    let value = value.trim();
    if value.starts_with('/') && !value.starts_with("//") {
        return value.len() > 1 && !value.contains(char::is_whitespace);
    }
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}
