use crate::{
    cleanup::{
        CleanupExecutor,
        CleanupReport,
    },
    estimator::{
        TrashEstimate,
        TrashSizeEstimator,
    },
    recycle_bin::{
        platform_recycle_bin,
        RecycleBin,
    },
    CancelToken,
    TempRoots,
};

#[derive(Debug, Clone, Default)]
pub struct CleanerOptions {
    /// Report what would be deleted without deleting anything.
    pub dry_run: bool,

    /// Number of temp roots scanned in parallel.
    /// Defaults to the number of configured roots.
    pub max_parallel_roots: Option<usize>,
}

/// The trash cleaning service.
///
/// A single instance is shared (via `Arc`) between the monitor loop and
/// everything else which wants to trigger a cleanup manually.
/// Overlapping calls are tolerated and not serialized.
pub struct TrashCleaner {
    roots: TempRoots,
    recycle_bin: Box<dyn RecycleBin>,
    options: CleanerOptions,
}

impl TrashCleaner {
    pub fn new(roots: TempRoots, recycle_bin: Box<dyn RecycleBin>, options: CleanerOptions) -> Self {
        Self {
            roots,
            recycle_bin,
            options,
        }
    }

    /// Create a cleaner for the current platforms temp directories and deleted items store.
    pub fn for_platform(options: CleanerOptions) -> Self {
        Self::new(TempRoots::from_env(), platform_recycle_bin(), options)
    }

    pub fn roots(&self) -> &TempRoots {
        &self.roots
    }

    pub fn recycle_bin_name(&self) -> &str {
        self.recycle_bin.name()
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    pub fn estimate(&self, cancel: &CancelToken) -> TrashEstimate {
        let mut estimator = TrashSizeEstimator::new(&self.roots, self.recycle_bin.as_ref());
        if let Some(max_parallel_roots) = self.options.max_parallel_roots {
            estimator = estimator.with_max_parallel_roots(max_parallel_roots);
        }

        estimator.estimate(cancel)
    }

    /// Empty the deleted items store and purge all temp roots.
    pub fn start_cleaning(&self, cancel: &CancelToken) -> CleanupReport {
        CleanupExecutor::new(&self.roots, self.recycle_bin.as_ref(), self.options.dry_run)
            .execute(cancel)
    }
}
