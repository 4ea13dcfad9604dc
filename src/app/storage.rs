//! Destination files and folders
//!
//! Downloads are written to a uniquely named `<name>.<random>.part` file next
//! to the destination and renamed into place only after the body decoded
//! successfully, so a failed transfer never leaves a file under its final
//! name. Concurrent downloads of the same name each get their own temporary
//! file.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::constants::PARTIAL_FILE_SUFFIX;

/// Create `root/name` for a folder download.
///
/// Falls back to `root` when the directory cannot be created.
pub async fn prepare_folder(root: &Path, name: &str) -> PathBuf {
    let folder = root.join(name);
    match fs::create_dir_all(&folder).await {
        Ok(()) => {
            debug!("Using folder {}", folder.display());
            folder
        }
        Err(e) => {
            warn!(
                "Could not create folder {}: {}. Writing into {} instead",
                folder.display(),
                e,
                root.display()
            );
            root.to_path_buf()
        }
    }
}

/// A file being downloaded
///
/// Dropping it without `commit` removes the temporary file.
#[derive(Debug)]
pub struct PartialFile {
    destination: PathBuf,
    temp_path: TempPath,
    file: File,
}

impl PartialFile {
    /// Create a fresh temporary file in the directory of `destination`.
    pub async fn create(destination: &Path) -> io::Result<Self> {
        let dir = destination
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let mut prefix: OsString = destination
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        prefix.push(".");

        let named = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(PARTIAL_FILE_SUFFIX)
                .tempfile_in(&dir)
        })
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

        let (file, temp_path) = named.into_parts();
        debug!("Writing {}", temp_path.display());

        Ok(Self {
            destination: destination.to_path_buf(),
            temp_path,
            file: File::from_std(file),
        })
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    /// Flush and move the file to its final name, replacing any file there.
    pub async fn commit(mut self) -> io::Result<PathBuf> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        drop(self.file);
        self.temp_path
            .persist(&self.destination)
            .map_err(|e| e.error)?;
        Ok(self.destination)
    }

    /// Close and delete the partial file.
    pub async fn abandon(self) {
        drop(self.file);
        let temp_path = self.temp_path.to_path_buf();
        if let Err(e) = self.temp_path.close() {
            warn!(
                "Failed to remove partial file {}: {}",
                temp_path.display(),
                e
            );
        }
    }
}
