// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Validation for names and references that end up on a command line.
//!
//! Rejects shell metacharacters, path traversal and names Azure or
//! Kubernetes would refuse anyway, before any external call is made.

use std::path::Path;

/// Maximum allowed length for string fields.
pub const MAX_FIELD_LENGTH: usize = 256;

/// Maximum allowed length for path fields.
const MAX_PATH_LENGTH: usize = 1024;

/// Kubernetes DNS-1123 label limit.
const MAX_LABEL_LENGTH: usize = 63;

/// Azure resource group name limit.
const MAX_RESOURCE_GROUP_LENGTH: usize = 90;

/// Validation error types.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Path contains traversal sequences.
    PathTraversal(String),
    /// Path is malformed.
    InvalidPath(String),
    /// Image reference is invalid.
    InvalidImage(String),
    /// Name violates the naming rules of the target resource.
    InvalidName { field: String, reason: String },
    /// Field exceeds maximum length.
    MaxLengthExceeded { field: String, max: usize },
    /// Field is empty but required.
    EmptyField(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PathTraversal(p) => write!(f, "Path traversal detected: {}", p),
            Self::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            Self::InvalidImage(img) => write!(f, "Invalid image reference: {}", img),
            Self::InvalidName { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::MaxLengthExceeded { field, max } => {
                write!(f, "Field '{}' exceeds maximum length of {}", field, max)
            }
            Self::EmptyField(field) => write!(f, "Field '{}' cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

fn check_length(value: &str, field_name: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field_name.to_string()));
    }
    if value.len() > max {
        return Err(ValidationError::MaxLengthExceeded {
            field: field_name.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validate a path for security issues.
///
/// Checks for null bytes and length limits. Parent-directory components
/// are only rejected when `allow_parent` is false.
pub fn validate_path(path: &str, field_name: &str, allow_parent: bool) -> Result<(), ValidationError> {
    check_length(path, field_name, MAX_PATH_LENGTH)?;

    if path.contains('\0') {
        return Err(ValidationError::InvalidPath(format!(
            "{}: contains null byte",
            field_name
        )));
    }

    if !allow_parent {
        let path_obj = Path::new(path);
        for component in path_obj.components() {
            if let std::path::Component::ParentDir = component {
                return Err(ValidationError::PathTraversal(format!(
                    "{}: contains '..' sequence",
                    field_name
                )));
            }
        }
    }

    Ok(())
}

/// Validate a container image reference.
///
/// Rejects shell metacharacters, whitespace and invalid name formats.
pub fn validate_image(image: &str) -> Result<(), ValidationError> {
    check_length(image, "image", MAX_FIELD_LENGTH)?;

    let forbidden_chars = [
        ';', '&', '|', '`', '$', '(', ')', '{', '}', '<', '>', '\n', '\r', '\0', ' ', '\t', '"',
        '\'',
    ];
    for ch in forbidden_chars {
        if image.contains(ch) {
            return Err(ValidationError::InvalidImage(format!(
                "contains forbidden character: {:?}",
                ch
            )));
        }
    }

    let parts: Vec<&str> = image.rsplitn(2, ':').collect();
    let name_part = parts.last().unwrap_or(&image);

    if name_part.starts_with('-') || name_part.starts_with('.') {
        return Err(ValidationError::InvalidImage(
            "name cannot start with dash or dot".to_string(),
        ));
    }

    Ok(())
}

/// Validate an image tag: `[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}`.
pub fn validate_image_tag(tag: &str) -> Result<(), ValidationError> {
    check_length(tag, "image_tag", 128)?;

    let mut chars = tag.chars();
    let first_ok = chars
        .next()
        .map(|c| c.is_ascii_alphanumeric() || c == '_')
        .unwrap_or(false);
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-');
    if !first_ok || !rest_ok {
        return Err(ValidationError::InvalidName {
            field: "image_tag".to_string(),
            reason: "must start with a letter, digit or '_' and contain only letters, digits, '_', '.' and '-'".to_string(),
        });
    }
    Ok(())
}

/// Validate a Kubernetes DNS-1123 label (namespaces, deployment names).
pub fn validate_dns_label(value: &str, field_name: &str) -> Result<(), ValidationError> {
    check_length(value, field_name, MAX_LABEL_LENGTH)?;

    let valid_chars = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-';
    if !value.chars().all(valid_chars) {
        return Err(ValidationError::InvalidName {
            field: field_name.to_string(),
            reason: "must contain only lowercase letters, digits and dashes".to_string(),
        });
    }

    if value.starts_with('-') || value.ends_with('-') {
        return Err(ValidationError::InvalidName {
            field: field_name.to_string(),
            reason: "must start and end with a letter or digit".to_string(),
        });
    }

    Ok(())
}

/// Validate an Azure Container Registry name: 5-50 alphanumerics.
pub fn validate_registry_name(name: &str) -> Result<(), ValidationError> {
    check_length(name, "registry_name", 50)?;

    if name.len() < 5 || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidName {
            field: "registry_name".to_string(),
            reason: "must be 5-50 alphanumeric characters".to_string(),
        });
    }

    Ok(())
}

/// Validate an Azure resource group or AKS cluster name.
///
/// Letters, digits, `-`, `_`, `.` and parentheses; no trailing dot.
pub fn validate_azure_name(name: &str, field_name: &str) -> Result<(), ValidationError> {
    check_length(name, field_name, MAX_RESOURCE_GROUP_LENGTH)?;

    let valid_chars =
        |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')');
    if !name.chars().all(valid_chars) {
        return Err(ValidationError::InvalidName {
            field: field_name.to_string(),
            reason: "must contain only letters, digits, '-', '_', '.', '(' and ')'".to_string(),
        });
    }

    if name.ends_with('.') {
        return Err(ValidationError::InvalidName {
            field: field_name.to_string(),
            reason: "cannot end with a period".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
