//! Collaborator seam for populating the raw dataset directory

use std::path::Path;

use anyhow::Result;

/// Populates a directory with per-station observation files.
///
/// Invoked by the ingestion engine when the data directory is missing;
/// a failure here is a setup failure, not an ingestion bug.
#[async_trait::async_trait]
pub trait DatasetProvider: Send + Sync {
    async fn provide(&self, dest: &Path) -> Result<()>;
}
