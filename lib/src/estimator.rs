use std::{
    path::Path,
    thread,
};

use crate::{
    fs::{
        directory_size,
        SizeReport,
    },
    recycle_bin::RecycleBin,
    utils::format_file_size,
    CancelToken,
    Fault,
    TempRoots,
};

/// Best effort estimation of the current trash size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrashEstimate {
    pub temp_bytes: u64,
    pub recycle_bin_bytes: u64,

    /// Entries of the temp roots which could not be accounted for.
    pub faults: Vec<Fault>,

    /// Set if the size of the deleted items store could not be queried.
    pub recycle_bin_error: Option<String>,

    pub cancelled: bool,
}

impl TrashEstimate {
    pub fn total_bytes(&self) -> u64 {
        self.temp_bytes.saturating_add(self.recycle_bin_bytes)
    }
}

/// Sums up the temp roots in parallel and adds the size of the deleted items store.
pub struct TrashSizeEstimator<'a> {
    roots: &'a TempRoots,
    recycle_bin: &'a dyn RecycleBin,
    max_parallel_roots: usize,
}

impl<'a> TrashSizeEstimator<'a> {
    pub fn new(roots: &'a TempRoots, recycle_bin: &'a dyn RecycleBin) -> Self {
        Self {
            roots,
            recycle_bin,
            max_parallel_roots: roots.len().max(1),
        }
    }

    /// Limit the number of temp roots scanned at the same time.
    pub fn with_max_parallel_roots(mut self, max_parallel_roots: usize) -> Self {
        self.max_parallel_roots = max_parallel_roots.max(1);
        self
    }

    pub fn estimate(&self, cancel: &CancelToken) -> TrashEstimate {
        let temp = self.estimate_temp_roots(cancel);

        let mut estimate = TrashEstimate {
            temp_bytes: temp.bytes,
            faults: temp.faults,
            cancelled: temp.cancelled,
            ..Default::default()
        };

        if estimate.cancelled || cancel.is_cancelled() {
            estimate.cancelled = true;
            return estimate;
        }

        match self.recycle_bin.size() {
            Ok(size) => estimate.recycle_bin_bytes = size,
            Err(error) => {
                log::warn!("Failed to get {} size: {:#}", self.recycle_bin.name(), error);
                estimate.recycle_bin_error = Some(error.to_string());
            }
        }

        log::info!(
            "Total trash size: {} (temp files {}, {} {}, {} skipped entries)",
            format_file_size(estimate.total_bytes()),
            format_file_size(estimate.temp_bytes),
            self.recycle_bin.name(),
            format_file_size(estimate.recycle_bin_bytes),
            estimate.faults.len()
        );
        estimate
    }

    fn estimate_temp_roots(&self, cancel: &CancelToken) -> SizeReport {
        let roots = self.roots.existing().collect::<Vec<_>>();

        let mut total = SizeReport::default();
        for batch in roots.chunks(self.max_parallel_roots) {
            if cancel.is_cancelled() {
                total.cancelled = true;
                break;
            }

            for report in scan_batch(batch, cancel) {
                total.merge(report);
            }
        }

        total
    }
}

fn scan_batch(batch: &[&Path], cancel: &CancelToken) -> Vec<SizeReport> {
    thread::scope(|scope| {
        let handles = batch
            .iter()
            .map(|root| {
                scope.spawn(move || {
                    log::trace!("Estimating size of {}", root.display());
                    directory_size(root, cancel)
                })
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .filter_map(|handle| match handle.join() {
                Ok(report) => Some(report),
                Err(_) => {
                    log::error!("Size estimation thread panicked");
                    None
                }
            })
            .collect()
    })
}
