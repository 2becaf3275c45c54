use std::{
    fmt,
    io,
    path::{
        Path,
        PathBuf,
    },
};

use thiserror::Error;

/// The operation which was being performed when a fault occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultOperation {
    /// Listing the entries of a directory
    ReadDir,
    /// Reading an entries metadata
    Stat,
    /// Removing a file
    Remove,
}

impl fmt::Display for FaultOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadDir => write!(f, "read dir"),
            Self::Stat => write!(f, "stat"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// A recoverable failure encountered while scanning or purging.
/// The affected entry has been skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub path: PathBuf,
    pub operation: FaultOperation,
    pub kind: io::ErrorKind,
    pub message: String,
}

impl Fault {
    pub fn new(path: &Path, operation: FaultOperation, error: &io::Error) -> Self {
        Self {
            path: path.to_owned(),
            operation,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.operation,
            self.path.display(),
            self.message
        )
    }
}

/// Failure of the platforms deleted items store.
#[derive(Error, Debug)]
pub enum BinError {
    #[error("io: {0}")]
    IoError(#[from] io::Error),

    #[error("{operation} failed with status {status:#010x}")]
    Os {
        operation: &'static str,
        status: i32,
    },

    #[error("deleted items store is not available on this platform")]
    Unsupported,
}

/// Failure to sample the primary volume.
#[derive(Error, Debug)]
pub enum CapacityError {
    #[error("no volume contains {0}")]
    VolumeNotFound(PathBuf),

    #[error("volume {0} reports a total capacity of zero")]
    ZeroCapacity(PathBuf),
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("failed to sample volume capacity: {0}")]
    Capacity(#[from] CapacityError),

    #[error("failed to spawn monitor thread: {0}")]
    Spawn(#[from] io::Error),
}
