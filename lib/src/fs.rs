use std::{
    fs::{
        self,
        DirEntry,
        ReadDir,
    },
    io,
    path::{
        Path,
        PathBuf,
    },
};

use crate::{
    CancelToken,
    Fault,
    FaultOperation,
};

/// An item produced by the [DirWalker].
#[derive(Debug)]
pub enum WalkEntry {
    /// A regular file. Symbolic links are never reported.
    File(DirEntry),
    /// An entry or directory which could not be accessed and has been skipped.
    Fault(Fault),
}

enum WalkStep {
    Yield(WalkEntry),
    Descend(PathBuf),
    Skip,
    Exhausted,
}

/// Iterative directory walker.
///
/// Pending directories are kept on an explicit stack and only one directory
/// handle is open at a time, so neither the call stack nor the number of open
/// handles grows with the tree depth. Directories are only descended into if
/// they are real directories, symbolic links are not followed.
pub struct DirWalker {
    pending_dirs: Vec<PathBuf>,
    current: Option<(PathBuf, ReadDir)>,
    cancel: CancelToken,
    cancelled: bool,
}

impl DirWalker {
    pub fn new(root: &Path, cancel: CancelToken) -> Self {
        let mut pending_dirs = Vec::with_capacity(64);
        pending_dirs.push(root.to_owned());

        Self {
            pending_dirs,
            current: None,
            cancel,
            cancelled: false,
        }
    }

    /// Whether the walk stopped early because the cancel token fired.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    fn step_current(&mut self) -> WalkStep {
        let Some((directory, entries)) = self.current.as_mut() else {
            return WalkStep::Exhausted;
        };

        let entry = match entries.next() {
            Some(Ok(entry)) => entry,
            Some(Err(error)) => {
                return WalkStep::Yield(WalkEntry::Fault(Fault::new(
                    directory,
                    FaultOperation::ReadDir,
                    &error,
                )))
            }
            None => return WalkStep::Exhausted,
        };

        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => WalkStep::Descend(entry.path()),
            Ok(file_type) if file_type.is_file() => WalkStep::Yield(WalkEntry::File(entry)),
            /* symbolic links, sockets, pipes etc */
            Ok(_) => WalkStep::Skip,
            Err(error) => WalkStep::Yield(WalkEntry::Fault(Fault::new(
                &entry.path(),
                FaultOperation::Stat,
                &error,
            ))),
        }
    }
}

impl Iterator for DirWalker {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_some() {
                match self.step_current() {
                    WalkStep::Yield(entry) => return Some(entry),
                    WalkStep::Descend(path) => self.pending_dirs.push(path),
                    WalkStep::Skip => {}
                    WalkStep::Exhausted => self.current = None,
                }
                continue;
            }

            if self.pending_dirs.is_empty() {
                return None;
            }

            if self.cancel.is_cancelled() {
                log::debug!(
                    "Walk cancelled with {} pending directories",
                    self.pending_dirs.len()
                );
                self.cancelled = true;
                self.pending_dirs.clear();
                return None;
            }

            let directory = self.pending_dirs.pop()?;
            match fs::read_dir(&directory) {
                Ok(entries) => self.current = Some((directory, entries)),
                Err(error) => {
                    return Some(WalkEntry::Fault(Fault::new(
                        &directory,
                        FaultOperation::ReadDir,
                        &error,
                    )))
                }
            }
        }
    }
}

/// Outcome of summing up a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeReport {
    pub bytes: u64,
    pub files: u64,
    pub faults: Vec<Fault>,
    pub cancelled: bool,
}

impl SizeReport {
    pub fn merge(&mut self, other: SizeReport) {
        self.bytes += other.bytes;
        self.files += other.files;
        self.faults.extend(other.faults);
        self.cancelled |= other.cancelled;
    }
}

/// Sum up the size of every regular file below `root`.
///
/// Entries which can not be accessed contribute zero and are recorded as
/// faults. A root which can not be opened yields an empty report with a
/// single fault.
pub fn directory_size(root: &Path, cancel: &CancelToken) -> SizeReport {
    let mut report = SizeReport::default();
    let mut walker = DirWalker::new(root, cancel.clone());

    for entry in walker.by_ref() {
        match entry {
            WalkEntry::File(entry) => match entry.metadata() {
                Ok(metadata) => {
                    report.bytes += metadata.len();
                    report.files += 1;
                }
                Err(error) => {
                    let fault = Fault::new(&entry.path(), FaultOperation::Stat, &error);
                    log::debug!("Skipping entry: {}", fault);
                    report.faults.push(fault);
                }
            },
            WalkEntry::Fault(fault) => {
                log::debug!("Skipping entry: {}", fault);
                report.faults.push(fault);
            }
        }
    }

    report.cancelled = walker.was_cancelled();
    report
}

/// Outcome of purging the files of a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub files_removed: u64,
    pub bytes_removed: u64,
    pub faults: Vec<Fault>,
    pub cancelled: bool,
}

impl PurgeReport {
    pub fn merge(&mut self, other: PurgeReport) {
        self.files_removed += other.files_removed;
        self.bytes_removed += other.bytes_removed;
        self.faults.extend(other.faults);
        self.cancelled |= other.cancelled;
    }
}

/// Remove every regular file below `root`.
/// Directories are left in place, even if they end up empty.
pub fn purge_files(root: &Path, dry_run: bool, cancel: &CancelToken) -> PurgeReport {
    if dry_run {
        purge_files_with(root, cancel, |_| Ok(()))
    } else {
        purge_files_with(root, cancel, |path| fs::remove_file(path))
    }
}

pub(crate) fn purge_files_with<F>(root: &Path, cancel: &CancelToken, mut remove: F) -> PurgeReport
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut report = PurgeReport::default();
    let mut walker = DirWalker::new(root, cancel.clone());

    for entry in walker.by_ref() {
        let entry = match entry {
            WalkEntry::File(entry) => entry,
            WalkEntry::Fault(fault) => {
                log::debug!("Skipping entry: {}", fault);
                report.faults.push(fault);
                continue;
            }
        };

        let path = entry.path();
        let file_size = entry.metadata().map_or(0, |metadata| metadata.len());
        match remove(&path) {
            Ok(()) => {
                log::trace!("Removed {}", path.display());
                report.files_removed += 1;
                report.bytes_removed += file_size;
            }
            Err(error) => {
                let fault = Fault::new(&path, FaultOperation::Remove, &error);
                log::warn!("Failed to delete {}: {}", path.display(), error);
                report.faults.push(fault);
            }
        }
    }

    report.cancelled = walker.was_cancelled();
    report
}
