use std::{
    sync::{
        Arc,
        Mutex,
    },
    time::Duration,
};

use args::Args;
use clap::Parser;
use crossterm::event::{
    self,
    Event,
};
use ratatui::layout::{
    Constraint,
    Layout,
};
use tclean::{
    CancelToken,
    CleanerOptions,
    CycleOutcome,
    MonitorLoop,
    MonitorOptions,
    SystemVolume,
    TempRoots,
    TrashCleaner,
};
use tui_logger::Drain;
use ui::{
    App,
    AppAction,
    DashboardInfo,
    LogPaneWidget,
    UiReportConsumer,
};

mod args;
mod term;
mod ui;
mod utils;

fn setup_logging(args: &Args) {
    if args.ui_logger && args.use_dashboard() {
        let tui_log_drain = Drain::new();
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format(move |_buf, record| Ok(tui_log_drain.log(record)))
            .init();
    } else if args.use_dashboard() {
        /* console output would draw over the dashboard */
        env_logger::init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }
}

fn create_cleaner(args: &Args) -> TrashCleaner {
    let options = CleanerOptions {
        dry_run: args.dry_run,
        ..Default::default()
    };

    if args.temp_roots.is_empty() {
        return TrashCleaner::for_platform(options);
    }

    let roots = TempRoots::from_paths(args.temp_roots.iter().cloned());
    for root in roots.configured() {
        if !root.is_dir() {
            log::warn!(
                "Temp root {} does not exist, it will be skipped until it does",
                root.display()
            );
        }
    }

    TrashCleaner::new(
        roots,
        tclean::recycle_bin::platform_recycle_bin(),
        options,
    )
}

fn run_dashboard(cleaner: Arc<TrashCleaner>, args: &Args) -> anyhow::Result<()> {
    let info = Arc::new(Mutex::new(DashboardInfo::default()));
    let monitor = MonitorLoop::start(
        cleaner.clone(),
        &SystemVolume::primary(),
        MonitorOptions {
            interval: Duration::from_secs(args.interval),
            report_consumer: Box::new(UiReportConsumer::new(info.clone())),
        },
    )?;

    let mut terminal = term::setup()?;
    let mut app = App::new(cleaner, monitor.spawn()?, info);

    loop {
        terminal.draw(|frame| {
            if args.ui_logger {
                let layout =
                    Layout::horizontal(&[Constraint::Percentage(50), Constraint::Percentage(50)])
                        .split(frame.size());

                frame.render_widget(&app, layout[0]);
                frame.render_widget(LogPaneWidget, layout[1]);
            } else {
                frame.render_widget(&app, frame.size());
            }
        })?;

        app.poll();

        if event::poll(Duration::from_millis(16))? {
            let event: Event = event::read()?;
            if let AppAction::Quit = app.handle_event(&event) {
                break;
            }
        }
    }

    app.shutdown();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(&args);

    let cleaner = Arc::new(create_cleaner(&args));
    for root in cleaner.roots().configured() {
        log::debug!("Temp root: {}", root.display());
    }

    if args.clean_now {
        let report = cleaner.start_cleaning(&CancelToken::new());
        log::info!(
            "Cleanup finished with {} failures",
            report.temp.faults.len() + usize::from(report.recycle_bin_error.is_some())
        );
        return Ok(());
    }

    if args.use_dashboard() {
        run_dashboard(cleaner, &args)?;
        return Ok(());
    }

    let mut monitor = MonitorLoop::start(
        cleaner,
        &SystemVolume::primary(),
        MonitorOptions {
            interval: Duration::from_secs(args.interval),
            ..Default::default()
        },
    )?;

    if args.once {
        match monitor.run_cycle(&CancelToken::new()) {
            CycleOutcome::Cleaned { .. } => log::info!("Threshold reached, trash cleaned"),
            CycleOutcome::BelowThreshold(_) => log::info!("Threshold not reached"),
            CycleOutcome::Cancelled => {}
        }
        return Ok(());
    }

    /* headless, runs until the process gets terminated */
    monitor.run(&CancelToken::new());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use clap::Parser;

    use super::create_cleaner;
    use crate::args::Args;

    #[test]
    fn missing_temp_root_is_kept_for_later_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present");
        std::fs::create_dir(&present).unwrap();
        let missing = dir.path().join("missing");

        let args = Args::try_parse_from([
            OsString::from("tclean"),
            OsString::from("--once"),
            OsString::from("-t"),
            present.into_os_string(),
            OsString::from("-t"),
            missing.into_os_string(),
        ])
        .unwrap();

        let cleaner = create_cleaner(&args);
        assert_eq!(cleaner.roots().configured().len(), 2);
        assert_eq!(cleaner.roots().existing().count(), 1);
    }
}
