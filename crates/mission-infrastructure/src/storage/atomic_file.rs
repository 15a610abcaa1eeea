//! Atomic file replacement via a sibling temporary file and rename.
//!
//! Readers never observe a partially written file: the new contents are
//! written and synced to `.<name>.tmp` in the same directory, then renamed
//! over the target.

use std::fs::{self, File};
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

/// Gets the temporary path used while replacing `path`.
pub fn temp_path_for(path: &Path) -> io::Result<PathBuf> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory")
    })?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no file name"))?;

    Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
}

/// Replaces `path` with `contents`, creating parent directories as needed.
pub fn write_atomic_sync(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path)?;
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(contents)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path)
}

/// Async variant of [`write_atomic_sync`] for use inside repositories.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp_path = temp_path_for(path)?;
    let mut tmp_file = tokio::fs::File::create(&tmp_path).await?;
    tmp_file.write_all(contents).await?;
    tmp_file.sync_all().await?;
    drop(tmp_file);

    tokio::fs::rename(&tmp_path, path).await
}
