use std::path::{Path, PathBuf};

use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::errors::AppResult;

/// A client upload sitting in the staging directory, waiting for the asset host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: u64,
}

/// Local directory that holds uploads between the client and the asset host.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

fn sanitize(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_exists(&self) -> AppResult<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Unique destination path for an incoming upload.
    pub fn reserve(&self, original_name: &str) -> PathBuf {
        self.dir
            .join(format!("{}-{}", Uuid::new_v4().simple(), sanitize(original_name)))
    }

    /// Creates an empty staged file for streaming writes. The caller owns
    /// keeping `size` in step with what it writes.
    pub async fn create(
        &self,
        original_name: &str,
        content_type: Option<String>,
    ) -> AppResult<(fs::File, StagedFile)> {
        self.ensure_exists().await?;
        let path = self.reserve(original_name);
        let file = fs::File::create(&path).await?;

        Ok((
            file,
            StagedFile {
                path,
                file_name: sanitize(original_name),
                content_type,
                size: 0,
            },
        ))
    }

    pub async fn write(
        &self,
        original_name: &str,
        content_type: Option<String>,
        bytes: &[u8],
    ) -> AppResult<StagedFile> {
        let (mut file, mut staged) = self.create(original_name, content_type).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        staged.size = bytes.len() as u64;
        Ok(staged)
    }

    /// Removes a single staged file. Failures are logged, not returned.
    pub async fn discard(&self, file: &StagedFile) {
        if let Err(e) = fs::remove_file(&file.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Could not remove staged file {:?}: {}", file.path, e);
            }
        }
    }

    /// Empties the whole staging directory, not just one upload.
    /// Returns how many entries were removed.
    pub async fn purge_all(&self) -> AppResult<usize> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                fs::remove_dir_all(&path).await?;
            } else {
                fs::remove_file(&path).await?;
            }
            removed += 1;
        }
        Ok(removed)
    }
}
