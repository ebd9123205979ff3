//! Episode-indexed snapshot persistence

use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use qlink_core::Result;

/// Metadata written alongside each persisted snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Episode index the snapshot was taken after
    pub episode: usize,
    /// Uncompressed parameter blob length in bytes
    pub params_len: usize,
    /// When the snapshot was persisted
    pub created_at: DateTime<Utc>,
}

/// Filesystem store for model snapshots
///
/// The directory is cleared and recreated at run start; each dispatched
/// snapshot lands as a gzip blob plus a JSON metadata file, both named
/// by episode index.
#[derive(Debug)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Clear any prior run's directory and recreate it
    pub async fn prepare(dir: &Path) -> Result<Self> {
        if fs::metadata(dir).await.is_ok() {
            fs::remove_dir_all(dir).await?;
        }
        fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Persist one snapshot blob under an episode-indexed name
    pub async fn save(&self, episode: usize, params: &[u8]) -> Result<PathBuf> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(params)?;
        let compressed = encoder.finish()?;

        let blob_path = self.dir.join(format!("snapshot-episode_{episode}.bin.gz"));
        fs::write(&blob_path, compressed).await?;

        let metadata = SnapshotMetadata {
            episode,
            params_len: params.len(),
            created_at: Utc::now(),
        };
        let metadata_path = self.dir.join(format!("snapshot-episode_{episode}.json"));
        fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?).await?;

        info!(episode, path = %blob_path.display(), "persisted snapshot");
        Ok(blob_path)
    }
}
