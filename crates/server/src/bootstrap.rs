//! Schema creation and default stage seeding.

use anyhow::{Context, Result};
use hitos_core::DEFAULT_STAGES;
use hitos_metadata::MetadataStore;

/// Create tables if absent and seed the default stages into an empty store.
///
/// Safe to run on every start. Returns the number of stages inserted.
pub async fn ensure_schema(metadata: &dyn MetadataStore) -> Result<u64> {
    metadata
        .migrate()
        .await
        .context("failed to create schema")?;

    let seeded = metadata
        .seed_default_stages(&DEFAULT_STAGES)
        .await
        .context("failed to seed default stages")?;

    if seeded > 0 {
        tracing::info!(count = seeded, "Default stages seeded");
    } else {
        tracing::debug!("Stages already present, skipping seed");
    }

    Ok(seeded)
}
