use crate::{
    fs::{
        purge_files,
        PurgeReport,
    },
    recycle_bin::RecycleBin,
    utils::format_file_size,
    CancelToken,
    TempRoots,
};

/// Outcome of a cleanup run.
/// Partial completion is a regular outcome and not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// `true` if the deleted items store has been emptied
    pub recycle_bin_emptied: bool,
    pub recycle_bin_error: Option<String>,

    pub temp: PurgeReport,
    pub dry_run: bool,
}

/// Irreversibly deletes the trash.
///
/// Emptying the deleted items store and purging the temp roots are
/// independent of each other, a failure of one does not prevent the other.
pub struct CleanupExecutor<'a> {
    roots: &'a TempRoots,
    recycle_bin: &'a dyn RecycleBin,
    dry_run: bool,
}

impl<'a> CleanupExecutor<'a> {
    pub fn new(roots: &'a TempRoots, recycle_bin: &'a dyn RecycleBin, dry_run: bool) -> Self {
        Self {
            roots,
            recycle_bin,
            dry_run,
        }
    }

    pub fn execute(&self, cancel: &CancelToken) -> CleanupReport {
        let mut report = CleanupReport {
            dry_run: self.dry_run,
            ..Default::default()
        };

        self.empty_recycle_bin(&mut report);
        report.temp = self.purge_temp_roots(cancel);

        log::info!(
            "Temporary files cleaned: {} files ({}) removed, {} failures{}",
            report.temp.files_removed,
            format_file_size(report.temp.bytes_removed),
            report.temp.faults.len(),
            if self.dry_run { " (dry run)" } else { "" }
        );
        report
    }

    fn empty_recycle_bin(&self, report: &mut CleanupReport) {
        if self.dry_run {
            log::info!("Dry run, not emptying the {}", self.recycle_bin.name());
            return;
        }

        match self.recycle_bin.empty() {
            Ok(()) => {
                log::info!("The {} has been emptied successfully", self.recycle_bin.name());
                report.recycle_bin_emptied = true;
            }
            Err(error) => {
                log::warn!("Failed to empty the {}: {:#}", self.recycle_bin.name(), error);
                report.recycle_bin_error = Some(error.to_string());
            }
        }
    }

    fn purge_temp_roots(&self, cancel: &CancelToken) -> PurgeReport {
        let mut total = PurgeReport::default();
        for root in self.roots.existing() {
            if cancel.is_cancelled() {
                total.cancelled = true;
                break;
            }

            log::debug!("Purging temp root {}", root.display());
            total.merge(purge_files(root, self.dry_run, cancel));
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::atomic::{
            AtomicUsize,
            Ordering,
        },
    };

    use super::CleanupExecutor;
    use crate::{
        BinError,
        CancelToken,
        RecycleBin,
        TempRoots,
    };

    #[derive(Default)]
    struct CountingBin {
        fail: bool,
        empty_calls: AtomicUsize,
    }

    impl RecycleBin for CountingBin {
        fn name(&self) -> &str {
            "counting bin"
        }

        fn size(&self) -> Result<u64, BinError> {
            Ok(0)
        }

        fn empty(&self) -> Result<(), BinError> {
            self.empty_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(BinError::Os {
                    operation: "empty",
                    status: -1,
                })
            } else {
                Ok(())
            }
        }
    }

    fn populated_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("one.tmp"), vec![0u8; 10]).unwrap();
        fs::write(dir.path().join("sub/two.tmp"), vec![0u8; 20]).unwrap();
        dir
    }

    #[test]
    fn empties_bin_and_purges_roots() {
        let root = populated_root();
        let roots = TempRoots::from_paths([root.path().to_owned(), root.path().join("missing")]);
        let bin = CountingBin::default();

        let report = CleanupExecutor::new(&roots, &bin, false).execute(&CancelToken::new());

        assert_eq!(bin.empty_calls.load(Ordering::SeqCst), 1);
        assert!(report.recycle_bin_emptied);
        assert_eq!(report.temp.files_removed, 2);
        assert_eq!(report.temp.bytes_removed, 30);
        assert!(!root.path().join("one.tmp").exists());
        assert!(root.path().join("sub").is_dir());
    }

    #[test]
    fn bin_failure_does_not_stop_purge() {
        let root = populated_root();
        let roots = TempRoots::from_paths([root.path().to_owned()]);
        let bin = CountingBin {
            fail: true,
            ..Default::default()
        };

        let report = CleanupExecutor::new(&roots, &bin, false).execute(&CancelToken::new());

        assert!(!report.recycle_bin_emptied);
        assert!(report.recycle_bin_error.is_some());
        assert_eq!(report.temp.files_removed, 2);
    }

    #[test]
    fn dry_run_deletes_nothing() {
        let root = populated_root();
        let roots = TempRoots::from_paths([root.path().to_owned()]);
        let bin = CountingBin::default();

        let report = CleanupExecutor::new(&roots, &bin, true).execute(&CancelToken::new());

        assert!(report.dry_run);
        assert_eq!(bin.empty_calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.temp.files_removed, 2);
        assert!(root.path().join("one.tmp").exists());
        assert!(root.path().join("sub/two.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn locked_file_is_reported_and_the_rest_is_deleted() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let locked = root.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(root.path().join("a.tmp"), vec![0u8; 10]).unwrap();
        fs::write(locked.join("b.tmp"), vec![0u8; 20]).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        if fs::File::create(locked.join("writable")).is_ok() {
            /* privileged user, modes are not enforced */
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let roots = TempRoots::from_paths([root.path().to_owned()]);
        let bin = CountingBin::default();
        let report = CleanupExecutor::new(&roots, &bin, false).execute(&CancelToken::new());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(!root.path().join("a.tmp").exists());
        assert!(locked.join("b.tmp").exists());
        assert!(report.recycle_bin_emptied);
        assert_eq!(report.temp.files_removed, 1);
        assert_eq!(report.temp.faults.len(), 1);
        assert!(report.temp.faults[0].path.ends_with("b.tmp"));
    }
}
