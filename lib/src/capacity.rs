use std::path::{
    Path,
    PathBuf,
};

use sysinfo::Disks;

use crate::{
    utils::format_file_size,
    CapacityError,
};

/// Percentage of the total volume capacity at which the trash gets cleaned.
pub const THRESHOLD_PERCENT: u64 = 1;

/// Size information of a volume, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeCapacity {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl VolumeCapacity {
    pub fn threshold(&self) -> Threshold {
        let bytes = u128::from(self.total_bytes) * u128::from(THRESHOLD_PERCENT) / 100;
        Threshold { bytes: bytes as u64 }
    }
}

/// Trash size at which a cleanup gets triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    bytes: u64,
}

impl Threshold {
    pub fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn is_exceeded_by(&self, trash_bytes: u64) -> bool {
        trash_bytes >= self.bytes
    }
}

/// Source of the primary volumes capacity.
pub trait CapacityProbe: Send + Sync {
    fn sample(&self) -> Result<VolumeCapacity, CapacityError>;
}

/// Samples the capacity of the volume containing `probe_path` using the
/// disks known to the operating system.
#[derive(Debug, Clone)]
pub struct SystemVolume {
    probe_path: PathBuf,
}

impl SystemVolume {
    pub fn new(probe_path: PathBuf) -> Self {
        Self { probe_path }
    }

    /// The volume holding the operating system.
    pub fn primary() -> Self {
        Self::new(primary_volume_path())
    }

    pub fn probe_path(&self) -> &Path {
        &self.probe_path
    }
}

impl CapacityProbe for SystemVolume {
    fn sample(&self) -> Result<VolumeCapacity, CapacityError> {
        let disks = Disks::new_with_refreshed_list();
        let volumes = disks.list().iter().map(|disk| {
            (
                disk.mount_point().to_owned(),
                VolumeCapacity {
                    total_bytes: disk.total_space(),
                    free_bytes: disk.available_space(),
                },
            )
        });

        select_volume(&self.probe_path, volumes)
    }
}

/// Select the volume with the longest mount point containing `path`.
fn select_volume<I>(path: &Path, volumes: I) -> Result<VolumeCapacity, CapacityError>
where
    I: IntoIterator<Item = (PathBuf, VolumeCapacity)>,
{
    let (mount_point, capacity) = volumes
        .into_iter()
        .filter(|(mount_point, _)| path.starts_with(mount_point))
        .max_by_key(|(mount_point, _)| mount_point.components().count())
        .ok_or_else(|| CapacityError::VolumeNotFound(path.to_owned()))?;

    if capacity.total_bytes == 0 {
        return Err(CapacityError::ZeroCapacity(mount_point));
    }

    log::debug!(
        "Selected volume {} for {}",
        mount_point.display(),
        path.display()
    );
    Ok(capacity)
}

/// Sample the volume once and derive the cleanup threshold from it.
pub fn sample_threshold(
    probe: &dyn CapacityProbe,
) -> Result<(VolumeCapacity, Threshold), CapacityError> {
    let capacity = match probe.sample() {
        Ok(capacity) => capacity,
        Err(error) => {
            log::error!("Failed to get disk usage: {:#}", error);
            return Err(error);
        }
    };

    let threshold = capacity.threshold();
    log::info!(
        "Volume capacity {} ({} free), cleanup threshold {}",
        format_file_size(capacity.total_bytes),
        format_file_size(capacity.free_bytes),
        format_file_size(threshold.bytes())
    );
    Ok((capacity, threshold))
}

#[cfg(windows)]
fn primary_volume_path() -> PathBuf {
    let drive = std::env::var("SystemDrive")
        .ok()
        .filter(|drive| !drive.is_empty())
        .unwrap_or_else(|| "C:".to_string());
    PathBuf::from(format!("{}\\", drive))
}

#[cfg(not(windows))]
fn primary_volume_path() -> PathBuf {
    PathBuf::from("/")
}
