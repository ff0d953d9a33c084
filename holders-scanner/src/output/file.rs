//! JSON file output handler.

use super::{sorted_holdings, to_json, OutputHandler};
use async_trait::async_trait;
use holders::{AssetHolding, HoldingsByCollection};
use std::path::{Path, PathBuf};

/// Handler that writes results to a JSON file.
///
/// Uses atomic write (write to temp file, then rename) so readers never see
/// a half-written file.
pub struct JsonFileHandler {
    path: PathBuf,
}

impl JsonFileHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, content: &str) -> anyhow::Result<()> {
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.path)?;

        tracing::debug!("Wrote {} bytes to {:?}", content.len(), self.path);
        Ok(())
    }
}

#[async_trait]
impl OutputHandler for JsonFileHandler {
    async fn handle_holdings(&self, holdings: &HoldingsByCollection) -> anyhow::Result<()> {
        self.write(&to_json(&sorted_holdings(holdings), true)?)
    }

    async fn handle_winners(&self, winners: &[AssetHolding]) -> anyhow::Result<()> {
        self.write(&to_json(winners, true)?)
    }
}
