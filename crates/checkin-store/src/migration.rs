//! One-shot copy of a ledger document from its legacy location.
//!
//! Runs on every [`JsonStore::open`](crate::JsonStore::open) call but only
//! acts when the primary document is absent, so it copies at most once.

use std::path::Path;

use tracing::info;

use crate::document::{read_document, JsonStore};
use crate::error::Result;
use crate::models::Dataset;

/// Copy the legacy document into the primary location.
///
/// Returns the migrated dataset, or `None` when there was nothing to do.
pub async fn migrate_legacy(store: &JsonStore, legacy: &Path) -> Result<Option<Dataset>> {
    if store.exists().await {
        return Ok(None);
    }

    let Some(data) = read_document(legacy).await? else {
        return Ok(None);
    };

    info!(
        from = %legacy.display(),
        to = %store.path().display(),
        contexts = data.len(),
        "migrating legacy ledger document"
    );
    store.save(&data).await?;
    Ok(Some(data))
}
