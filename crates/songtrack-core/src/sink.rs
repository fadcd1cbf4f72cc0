use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const EXTENSION: &str = "txt";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to list {}: {source}", .path.display())]
    List {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Title files, one `<station>.txt` per station under a single directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, station: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", station, EXTENSION))
    }

    pub async fn ensure_directory(&self) -> Result<(), SinkError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SinkError::CreateDir {
                path: self.dir.clone(),
                source,
            })
    }

    /// Replace the station's file content with `title`.
    pub async fn write(&self, station: &str, title: &str) -> Result<(), SinkError> {
        let path = self.path_for(station);
        overwrite(&path, title.as_bytes())
            .await
            .map_err(|source| SinkError::Write { path, source })
    }

    /// Truncate every file in the directory, stray ones included.
    /// Returns how many files were cleared.
    pub async fn clear_all(&self) -> Result<usize, SinkError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Output directory {:?} is absent, nothing to clear", self.dir);
                return Ok(0);
            }
            Err(source) => {
                return Err(SinkError::List {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let list_err = |source| SinkError::List {
            path: self.dir.clone(),
            source,
        };
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            let path = entry.path();
            // Follows symlinks; dangling links are skipped
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if is_file {
                files.push(path);
            }
        }

        let results = join_all(files.into_iter().map(|path| async move {
            overwrite(&path, b"")
                .await
                .map_err(|source| SinkError::Write { path, source })
        }))
        .await;

        let cleared = results.len();
        results.into_iter().collect::<Result<Vec<_>, _>>()?;
        info!("Song names are cleared ({} files)", cleared);
        Ok(cleared)
    }
}

async fn overwrite(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_data().await?;
    Ok(())
}
