//! `bigiron-virt create` command

use std::path::Path;

use anyhow::{Context, Result};

/// Create every resource in a manifest file.
pub fn create(manifest: &Path) -> Result<()> {
    let data = std::fs::read_to_string(manifest)
        .with_context(|| format!("failed to read manifest {:?}", manifest))?;

    bigiron_core::api::create_from_yaml(&data)?;

    Ok(())
}
