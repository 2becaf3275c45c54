use std::{
    fs,
    path::Path,
    sync::{
        atomic::{
            AtomicU64,
            AtomicUsize,
            Ordering,
        },
        Arc,
        Mutex,
    },
    thread,
    time::{
        Duration,
        Instant,
    },
};

use tclean::{
    BinError,
    CancelToken,
    CapacityError,
    CapacityProbe,
    CleanerOptions,
    CycleOutcome,
    MonitorError,
    MonitorLoop,
    MonitorOptions,
    MonitorReport,
    MonitorReportConsumer,
    MonitorState,
    RecycleBin,
    TempRoots,
    TrashCleaner,
    VolumeCapacity,
};
use tempfile::TempDir;

#[derive(Default)]
struct BinState {
    size: AtomicU64,
    empty_calls: AtomicUsize,
}

struct FakeBin(Arc<BinState>);

impl RecycleBin for FakeBin {
    fn name(&self) -> &str {
        "fake bin"
    }

    fn size(&self) -> Result<u64, BinError> {
        Ok(self.0.size.load(Ordering::SeqCst))
    }

    fn empty(&self) -> Result<(), BinError> {
        self.0.empty_calls.fetch_add(1, Ordering::SeqCst);
        self.0.size.store(0, Ordering::SeqCst);
        Ok(())
    }
}

/// Reports a growing volume on every sample.
struct GrowingVolume {
    samples: AtomicUsize,
}

impl CapacityProbe for GrowingVolume {
    fn sample(&self) -> Result<VolumeCapacity, CapacityError> {
        let sample = self.samples.fetch_add(1, Ordering::SeqCst) as u64;
        Ok(VolumeCapacity {
            total_bytes: 100_000 * (sample + 1),
            free_bytes: 50_000,
        })
    }
}

struct BrokenVolume;

impl CapacityProbe for BrokenVolume {
    fn sample(&self) -> Result<VolumeCapacity, CapacityError> {
        Err(CapacityError::VolumeNotFound("/".into()))
    }
}

#[derive(Clone, Default)]
struct RecordingConsumer(Arc<Mutex<Vec<MonitorReport>>>);

impl MonitorReportConsumer for RecordingConsumer {
    fn consume_report(&mut self, report: MonitorReport) {
        self.0.lock().unwrap().push(report);
    }
}

struct Fixture {
    temp: TempDir,
    bin: Arc<BinState>,
    cleaner: Arc<TrashCleaner>,
}

impl Fixture {
    fn new(temp_bytes: usize, bin_bytes: u64) -> Self {
        let temp = tempfile::tempdir().unwrap();
        write_file(&temp.path().join("user/cache.tmp"), temp_bytes / 2);
        write_file(
            &temp.path().join("system/nested/setup.log"),
            temp_bytes - temp_bytes / 2,
        );

        let bin = Arc::new(BinState::default());
        bin.size.store(bin_bytes, Ordering::SeqCst);

        let roots = TempRoots::from_paths([
            temp.path().join("user"),
            temp.path().join("system"),
            temp.path().join("not-there"),
        ]);
        let cleaner = Arc::new(TrashCleaner::new(
            roots,
            Box::new(FakeBin(bin.clone())),
            CleanerOptions::default(),
        ));

        Self { temp, bin, cleaner }
    }

    fn remaining_temp_files(&self) -> usize {
        ["user/cache.tmp", "system/nested/setup.log"]
            .iter()
            .filter(|path| self.temp.path().join(path).exists())
            .count()
    }
}

fn write_file(path: &Path, size: usize) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![0u8; size]).unwrap();
}

/// Total capacity of 100 000 bytes, hence a threshold of 1 000 bytes.
fn small_volume() -> VolumeCapacity {
    VolumeCapacity {
        total_bytes: 100_000,
        free_bytes: 40_000,
    }
}

#[test]
fn cleans_once_the_threshold_is_reached() {
    let fixture = Fixture::new(500, 600);
    let mut monitor = MonitorLoop::new(
        fixture.cleaner.clone(),
        small_volume(),
        MonitorOptions::default(),
    );
    assert_eq!(monitor.threshold().bytes(), 1_000);

    let (estimate, report) = match monitor.run_cycle(&CancelToken::new()) {
        CycleOutcome::Cleaned { estimate, report } => (estimate, report),
        other => panic!("expected a cleanup, got {:?}", other),
    };

    assert_eq!(estimate.temp_bytes, 500);
    assert_eq!(estimate.recycle_bin_bytes, 600);
    assert_eq!(fixture.bin.empty_calls.load(Ordering::SeqCst), 1);
    assert!(report.recycle_bin_emptied);
    assert_eq!(report.temp.files_removed, 2);
    assert_eq!(fixture.remaining_temp_files(), 0);

    let after = fixture.cleaner.estimate(&CancelToken::new());
    assert_eq!(after.total_bytes(), 0);
}

#[test]
fn does_nothing_below_the_threshold() {
    let fixture = Fixture::new(200, 100);
    let mut monitor = MonitorLoop::new(
        fixture.cleaner.clone(),
        small_volume(),
        MonitorOptions::default(),
    );

    for _ in 0..3 {
        let estimate = match monitor.run_cycle(&CancelToken::new()) {
            CycleOutcome::BelowThreshold(estimate) => estimate,
            other => panic!("expected no cleanup, got {:?}", other),
        };
        assert_eq!(estimate.total_bytes(), 300);
    }

    assert_eq!(fixture.bin.empty_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.remaining_temp_files(), 2);
}

#[test]
fn threshold_is_sampled_only_once() {
    let fixture = Fixture::new(200, 100);
    let probe = GrowingVolume {
        samples: AtomicUsize::new(0),
    };

    let mut monitor = MonitorLoop::start(fixture.cleaner.clone(), &probe, MonitorOptions::default())
        .unwrap();
    let threshold = monitor.threshold();

    for _ in 0..3 {
        monitor.run_cycle(&CancelToken::new());
        assert_eq!(monitor.threshold(), threshold);
    }
    assert_eq!(probe.samples.load(Ordering::SeqCst), 1);
}

#[test]
fn capacity_failure_prevents_start() {
    let fixture = Fixture::new(0, 0);
    let result = MonitorLoop::start(fixture.cleaner.clone(), &BrokenVolume, MonitorOptions::default());
    assert!(matches!(result, Err(MonitorError::Capacity(_))));
}

#[test]
fn background_monitor_stops_while_sleeping() {
    let fixture = Fixture::new(200, 100);
    let consumer = RecordingConsumer::default();
    let monitor = MonitorLoop::new(
        fixture.cleaner.clone(),
        small_volume(),
        MonitorOptions {
            interval: Duration::from_secs(3_600),
            report_consumer: Box::new(consumer.clone()),
        },
    );

    let handle = monitor.spawn().unwrap();

    let waiting_since = Instant::now();
    while !consumer
        .0
        .lock()
        .unwrap()
        .iter()
        .any(|report| matches!(report, MonitorReport::State(MonitorState::Sleeping)))
    {
        assert!(waiting_since.elapsed() < Duration::from_secs(10));
        thread::sleep(Duration::from_millis(5));
    }

    /* manual trigger while the monitor is running */
    let manual = fixture.cleaner.start_cleaning(&CancelToken::new());
    assert!(manual.recycle_bin_emptied);

    let stop_requested = Instant::now();
    handle.stop();
    assert!(stop_requested.elapsed() < Duration::from_secs(10));

    let reports = consumer.0.lock().unwrap();
    assert!(matches!(reports.first(), Some(MonitorReport::Started { .. })));
    assert!(matches!(
        reports.last(),
        Some(MonitorReport::State(MonitorState::Stopped))
    ));
    assert!(!reports
        .iter()
        .any(|report| matches!(report, MonitorReport::Cleaned(_))));
}
