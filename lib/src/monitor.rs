use std::{
    sync::Arc,
    thread::{
        self,
        JoinHandle,
    },
    time::Duration,
};

use crate::{
    capacity::{
        sample_threshold,
        CapacityProbe,
        Threshold,
        VolumeCapacity,
    },
    cleanup::CleanupReport,
    estimator::TrashEstimate,
    utils::format_file_size,
    CancelToken,
    MonitorError,
    TrashCleaner,
};

/// Time between two monitoring cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Estimating the trash size and comparing it against the threshold
    Idle,
    /// The threshold has been exceeded and the trash is being deleted
    Cleaning,
    /// Waiting for the next cycle
    Sleeping,
    Stopped,
}

#[derive(Debug, Clone)]
pub enum MonitorReport {
    Started {
        capacity: VolumeCapacity,
        threshold: Threshold,
    },
    State(MonitorState),
    Estimated(TrashEstimate),
    Cleaned(CleanupReport),
}

pub trait MonitorReportConsumer {
    fn consume_report(&mut self, report: MonitorReport);
}

pub struct VoidMonitorReportConsumer;
impl MonitorReportConsumer for VoidMonitorReportConsumer {
    fn consume_report(&mut self, _report: MonitorReport) {}
}

pub struct MonitorOptions {
    pub interval: Duration,
    pub report_consumer: Box<dyn MonitorReportConsumer + Send>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            report_consumer: Box::new(VoidMonitorReportConsumer),
        }
    }
}

/// Result of a single estimate, compare and clean cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    BelowThreshold(TrashEstimate),
    Cleaned {
        estimate: TrashEstimate,
        report: CleanupReport,
    },
    Cancelled,
}

/// Periodically estimates the trash size and cleans it up once the
/// threshold has been reached.
pub struct MonitorLoop {
    cleaner: Arc<TrashCleaner>,
    capacity: VolumeCapacity,
    threshold: Threshold,
    options: MonitorOptions,
}

impl MonitorLoop {
    /// Create a monitor using the already sampled capacity.
    /// The threshold is derived once and never changes afterwards.
    pub fn new(cleaner: Arc<TrashCleaner>, capacity: VolumeCapacity, options: MonitorOptions) -> Self {
        Self {
            cleaner,
            capacity,
            threshold: capacity.threshold(),
            options,
        }
    }

    /// Sample the volume capacity and create the monitor.
    /// Without a valid capacity there is no threshold, hence this fails.
    pub fn start(
        cleaner: Arc<TrashCleaner>,
        probe: &dyn CapacityProbe,
        options: MonitorOptions,
    ) -> Result<Self, MonitorError> {
        let (capacity, _) = sample_threshold(probe)?;
        Ok(Self::new(cleaner, capacity, options))
    }

    pub fn capacity(&self) -> VolumeCapacity {
        self.capacity
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    fn report(&mut self, report: MonitorReport) {
        self.options.report_consumer.consume_report(report);
    }

    pub fn run_cycle(&mut self, cancel: &CancelToken) -> CycleOutcome {
        if cancel.is_cancelled() {
            return CycleOutcome::Cancelled;
        }

        self.report(MonitorReport::State(MonitorState::Idle));
        let estimate = self.cleaner.estimate(cancel);
        if estimate.cancelled {
            return CycleOutcome::Cancelled;
        }
        self.report(MonitorReport::Estimated(estimate.clone()));

        if !self.threshold.is_exceeded_by(estimate.total_bytes()) {
            log::info!(
                "Not yet! {} of {} reached",
                format_file_size(estimate.total_bytes()),
                format_file_size(self.threshold.bytes())
            );
            return CycleOutcome::BelowThreshold(estimate);
        }

        log::info!(
            "Trash size {} reached the threshold of {}, cleaning up",
            format_file_size(estimate.total_bytes()),
            format_file_size(self.threshold.bytes())
        );
        self.report(MonitorReport::State(MonitorState::Cleaning));
        let report = self.cleaner.start_cleaning(cancel);
        self.report(MonitorReport::Cleaned(report.clone()));

        CycleOutcome::Cleaned { estimate, report }
    }

    /// Run cycles until `cancel` gets cancelled.
    pub fn run(mut self, cancel: &CancelToken) {
        log::info!(
            "Monitoring trash size every {} seconds",
            self.options.interval.as_secs()
        );
        self.report(MonitorReport::Started {
            capacity: self.capacity,
            threshold: self.threshold,
        });

        loop {
            log::debug!("Monitoring sizes...");
            if let CycleOutcome::Cancelled = self.run_cycle(cancel) {
                break;
            }

            log::debug!("Sleeping for {} seconds...", self.options.interval.as_secs());
            self.report(MonitorReport::State(MonitorState::Sleeping));
            if cancel.wait(self.options.interval) {
                break;
            }
        }

        log::info!("Trash monitor stopped");
        self.report(MonitorReport::State(MonitorState::Stopped));
    }

    /// Run the monitor on a dedicated background thread.
    pub fn spawn(self) -> Result<MonitorHandle, MonitorError> {
        let cancel = CancelToken::new();
        let handle = thread::Builder::new().name("trash-monitor".to_string()).spawn({
            let cancel = cancel.clone();
            move || self.run(&cancel)
        })?;

        Ok(MonitorHandle { cancel, handle })
    }
}

/// Handle to a monitor running in the background.
pub struct MonitorHandle {
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Request the monitor to stop and wait until the current cycle observed it.
    pub fn stop(self) {
        self.cancel.cancel();
        if self.handle.join().is_err() {
            log::error!("Trash monitor thread panicked");
        }
    }
}
