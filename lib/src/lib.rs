//! Keeps the trash of a machine in check.
//!
//! The [MonitorLoop] periodically estimates the size of the temp directories
//! plus the platforms deleted items store and purges both once the estimate
//! reaches one percent of the primary volumes capacity.

mod cancel;
pub mod capacity;
mod cleaner;
pub mod cleanup;
pub mod estimator;
mod fault;
pub mod fs;
pub mod monitor;
pub mod recycle_bin;
mod roots;
pub mod utils;

pub use cancel::*;
pub use capacity::{
    CapacityProbe,
    SystemVolume,
    Threshold,
    VolumeCapacity,
};
pub use cleaner::*;
pub use cleanup::{
    CleanupExecutor,
    CleanupReport,
};
pub use estimator::{
    TrashEstimate,
    TrashSizeEstimator,
};
pub use fault::*;
pub use monitor::{
    CycleOutcome,
    MonitorHandle,
    MonitorLoop,
    MonitorOptions,
    MonitorReport,
    MonitorReportConsumer,
    MonitorState,
};
pub use recycle_bin::RecycleBin;
pub use roots::*;
