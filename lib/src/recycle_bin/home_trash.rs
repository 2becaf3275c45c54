use std::{
    fs,
    io,
    path::{
        Path,
        PathBuf,
    },
};

use super::RecycleBin;
use crate::{
    fs::directory_size,
    BinError,
    CancelToken,
    FaultOperation,
};

/// Directories inside the trash holding deleted items and their metadata.
const TRASH_CONTENT_DIRS: [&str; 3] = ["files", "info", "expunged"];

/// The users home trash directory.
///
/// On Linux this is the freedesktop.org trash at `$XDG_DATA_HOME/Trash`,
/// on macOS `~/.Trash`.
#[derive(Debug, Clone)]
pub struct HomeTrash {
    root: PathBuf,
}

impl HomeTrash {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[cfg(target_os = "macos")]
    pub fn locate() -> Option<Self> {
        dirs::home_dir().map(|home| Self::new(home.join(".Trash")))
    }

    #[cfg(not(target_os = "macos"))]
    pub fn locate() -> Option<Self> {
        dirs::data_dir().map(|data| Self::new(data.join("Trash")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn content_dirs(&self) -> Vec<PathBuf> {
        if cfg!(target_os = "macos") {
            vec![self.root.clone()]
        } else {
            TRASH_CONTENT_DIRS
                .iter()
                .map(|name| self.root.join(name))
                .collect()
        }
    }
}

impl RecycleBin for HomeTrash {
    fn name(&self) -> &str {
        "home trash"
    }

    fn size(&self) -> Result<u64, BinError> {
        let cancel = CancelToken::new();
        let mut bytes = 0;
        for directory in self.content_dirs() {
            if !directory.exists() {
                continue;
            }

            let report = directory_size(&directory, &cancel);
            if let Some(fault) = report
                .faults
                .iter()
                .find(|fault| fault.path == directory && fault.operation == FaultOperation::ReadDir)
            {
                return Err(io::Error::new(fault.kind, fault.message.clone()).into());
            }
            bytes += report.bytes;
        }

        Ok(bytes)
    }

    fn empty(&self) -> Result<(), BinError> {
        let mut first_error = None;
        for directory in self.content_dirs() {
            let entries = match fs::read_dir(&directory) {
                Ok(entries) => entries,
                Err(error) if error.kind() == io::ErrorKind::NotFound => continue,
                Err(error) => {
                    log::warn!("Failed to read {}: {}", directory.display(), error);
                    first_error.get_or_insert(error);
                    continue;
                }
            };

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(error) => {
                        log::warn!("Failed to list {}: {}", directory.display(), error);
                        first_error.get_or_insert(error);
                        continue;
                    }
                };

                let path = entry.path();
                let is_dir = entry
                    .file_type()
                    .map_or(false, |file_type| file_type.is_dir());

                let result = if is_dir {
                    fs::remove_dir_all(&path)
                } else {
                    fs::remove_file(&path)
                };

                if let Err(error) = result {
                    log::warn!("Failed to delete trashed item {}: {}", path.display(), error);
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}
