use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

/// Last processed row index, persisted as plain text.
///
/// Writes go to a sibling temp file and are renamed into place so an
/// interrupt never leaves a half-written index behind.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn load(&self) -> Result<Option<usize>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let index = raw.trim().parse::<usize>().with_context(|| {
                    format!("Checkpoint {} does not hold a row index", self.path.display())
                })?;
                Ok(Some(index))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read checkpoint {}", self.path.display())),
        }
    }

    /// Row to start from: one past the checkpoint, or the first row.
    pub async fn resume_index(&self) -> Result<usize> {
        Ok(self.load().await?.map_or(0, |last| last + 1))
    }

    pub async fn save(&self, index: usize) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, index.to_string())
            .await
            .with_context(|| format!("Failed to write checkpoint {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to move checkpoint into {}", self.path.display()))?;
        debug!("Checkpoint saved at row {index}");
        Ok(())
    }
}
