// Copyright 2024-2026 Aldar Deploy Contributors
// SPDX-License-Identifier: Apache-2.0

//! Image reference rewriting for component manifests.
//!
//! The manifest on disk is left untouched; the rewritten text is piped to
//! `kubectl apply -f -`.

use regex::{Captures, Regex};
use thiserror::Error;

use super::validation::{validate_image, ValidationError};

/// Matches `image:` lines, plain or as a list item, quoted or not.
const IMAGE_LINE: &str =
    r#"(?m)^(?P<lead>[ \t]*(?:-[ \t]+)?image:[ \t]*)(?P<open>["']?)(?P<image>[^\s"'#]+)(?P<close>["']?)(?P<rest>.*)$"#;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("No 'image:' entry for '{image_name}' found in {manifest}")]
    ImageNotFound { image_name: String, manifest: String },

    #[error("Refusing to render image reference: {0}")]
    InvalidReference(#[from] ValidationError),

    #[error("Invalid image pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Repository name of an image reference: last path segment without tag or digest.
///
/// `aldaracr.azurecr.io/aldar-worker:v1` and `localhost:5000/aldar-worker`
/// both yield `aldar-worker`.
pub fn repository_name(image: &str) -> &str {
    let without_digest = image.split('@').next().unwrap_or(image);
    let last_segment = without_digest.rsplit('/').next().unwrap_or(without_digest);
    last_segment.split(':').next().unwrap_or(last_segment)
}

/// Full registry reference for a pushed image.
pub fn registry_reference(login_server: &str, image_name: &str, tag: &str) -> String {
    format!("{}/{}:{}", login_server.trim_end_matches('/'), image_name, tag)
}

/// Replace every image whose repository is `image_name` with `new_reference`.
///
/// `manifest_label` only names the manifest in errors. Other containers
/// (sidecars, init containers from other images) are left as they are.
pub fn render_image(
    manifest: &str,
    manifest_label: &str,
    image_name: &str,
    new_reference: &str,
) -> Result<String, ManifestError> {
    validate_image(new_reference)?;

    let pattern = Regex::new(IMAGE_LINE)?;
    let mut replaced = 0usize;

    let rendered = pattern.replace_all(manifest, |caps: &Captures| {
        let current = &caps["image"];
        if repository_name(current) == image_name {
            replaced += 1;
            format!(
                "{}{}{}{}{}",
                &caps["lead"], &caps["open"], new_reference, &caps["close"], &caps["rest"]
            )
        } else {
            caps[0].to_string()
        }
    });

    if replaced == 0 {
        return Err(ManifestError::ImageNotFound {
            image_name: image_name.to_string(),
            manifest: manifest_label.to_string(),
        });
    }

    tracing::debug!(manifest = manifest_label, replaced, image = new_reference, "rendered manifest");
    Ok(rendered.into_owned())
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
