use crate::BinError;

/// The platforms store for deleted items (recycle bin, trash can).
pub trait RecycleBin: Send + Sync {
    /// Name of the store used in log messages
    fn name(&self) -> &str;

    /// Total size of all items currently held by the store, in bytes.
    fn size(&self) -> Result<u64, BinError>;

    /// Irreversibly delete everything held by the store without any user interaction.
    fn empty(&self) -> Result<(), BinError>;
}

/// A store which does not exist on this system.
/// Every query fails with [BinError::Unsupported].
#[derive(Debug, Default)]
pub struct UnavailableRecycleBin;

impl RecycleBin for UnavailableRecycleBin {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn size(&self) -> Result<u64, BinError> {
        Err(BinError::Unsupported)
    }

    fn empty(&self) -> Result<(), BinError> {
        Err(BinError::Unsupported)
    }
}

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::*;

#[cfg(not(windows))]
mod home_trash;
#[cfg(not(windows))]
pub use home_trash::*;

/// The deleted items store of the current platform.
#[cfg(windows)]
pub fn platform_recycle_bin() -> Box<dyn RecycleBin> {
    Box::new(ShellRecycleBin::new())
}

/// The deleted items store of the current platform.
#[cfg(not(windows))]
pub fn platform_recycle_bin() -> Box<dyn RecycleBin> {
    match HomeTrash::locate() {
        Some(trash) => Box::new(trash),
        None => {
            log::warn!("Could not locate the home trash directory");
            Box::new(UnavailableRecycleBin)
        }
    }
}
