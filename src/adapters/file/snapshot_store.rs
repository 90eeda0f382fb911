use crate::domain::Snapshot;
use crate::ports::snapshot_store::{Result, SnapshotStore as SnapshotStoreTrait};
use async_trait::async_trait;
use std::io::ErrorKind;
use tokio::io::AsyncWriteExt;
use std::path::{Path, PathBuf};

/// JSON file implementation of SnapshotStore
///
/// The whole library state lives in a single JSON document.
/// Saves go to a sibling temp file, which is synced to disk and then
/// renamed over the target, so the target is always a complete snapshot.
/// The temp file is removed if any step fails.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "library.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStoreTrait for SnapshotStore {
    /// Read and decode the snapshot file
    ///
    /// A missing file means nothing has been saved yet.
    async fn load(&self) -> Result<Option<Snapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No snapshot file, starting empty");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            books = snapshot.books.len(),
            members = snapshot.members.len(),
            loans = snapshot.loans.len(),
            "Snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    /// Encode the snapshot and replace the file atomically
    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let temp = self.temp_path();

        let write_result = async {
            let mut file = tokio::fs::File::create(&temp).await?;
            file.write_all(&bytes).await?;
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&temp, &self.path).await?;
            Ok::<(), std::io::Error>(())
        }
        .await;

        if let Err(e) = write_result {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                tracing::debug!(path = %temp.display(), error = %cleanup, "Temp file not removed");
            }
            return Err(e.into());
        }

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Snapshot saved");
        Ok(())
    }
}
