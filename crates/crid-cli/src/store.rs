//! # Agreement File Store
//!
//! One agreement per JSON file. Loading goes through the agreement's own
//! deserializer, so a hand-edited file that breaks a record invariant is
//! rejected. Saving writes a sibling temp file and renames it over the
//! target, so a crash never leaves a half-written agreement.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crid_state::Agreement;

/// Read an agreement file.
pub fn load_agreement(path: &Path) -> Result<Agreement> {
    if !path.exists() {
        bail!("agreement file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read agreement: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse agreement: {}", path.display()))
}

/// Write an agreement file, replacing any previous content.
pub fn save_agreement(path: &Path, agreement: &Agreement) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(agreement).context("failed to serialize agreement")?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json + "\n")
        .with_context(|| format!("failed to write agreement: {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace agreement: {}", path.display()))?;
    tracing::debug!(path = %path.display(), agreement = %agreement.id(), "agreement saved");
    Ok(())
}
