use std::{
    sync::{
        Arc,
        Mutex,
    },
    thread::{
        self,
        JoinHandle,
    },
    time::Instant,
};

use crossterm::event::{
    Event,
    KeyCode,
    KeyEventKind,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Text,
    widgets::{
        Block,
        Borders,
        Clear,
        Paragraph,
        Widget,
        Wrap,
    },
};
use tclean::{
    CancelToken,
    CleanupReport,
    MonitorHandle,
    TrashCleaner,
};

use super::{
    DashboardInfo,
    DashboardWidget,
};
use crate::utils;

pub enum AppAction {
    None,
    Quit,
}

/// The interactive shell around the monitor: shows its progress and
/// provides the manual "clean now" trigger.
pub struct App {
    time_started: Instant,

    cleaner: Arc<TrashCleaner>,
    monitor: Option<MonitorHandle>,
    info: Arc<Mutex<DashboardInfo>>,

    manual_cleaning: Option<JoinHandle<CleanupReport>>,
    show_monitor_stopped: bool,
}

impl App {
    pub fn new(
        cleaner: Arc<TrashCleaner>,
        monitor: MonitorHandle,
        info: Arc<Mutex<DashboardInfo>>,
    ) -> Self {
        Self {
            time_started: Instant::now(),

            cleaner,
            monitor: Some(monitor),
            info,

            manual_cleaning: None,
            show_monitor_stopped: false,
        }
    }

    pub fn poll(&mut self) {
        if self
            .manual_cleaning
            .as_ref()
            .map_or(false, |handle| handle.is_finished())
        {
            if let Some(handle) = self.manual_cleaning.take() {
                match handle.join() {
                    Ok(report) => {
                        if let Ok(mut info) = self.info.lock() {
                            info.last_cleanup = Some((Instant::now(), report));
                        }
                    }
                    Err(_) => log::error!("Manual cleanup thread panicked"),
                }
            }
        }

        let monitor_finished = self
            .monitor
            .as_ref()
            .map_or(false, MonitorHandle::is_finished);
        if monitor_finished && !self.show_monitor_stopped {
            log::error!("Trash monitor stopped unexpectedly");
            self.show_monitor_stopped = true;
        }
    }

    pub fn handle_event(&mut self, event: &Event) -> AppAction {
        let Event::Key(key) = event else {
            return AppAction::None;
        };
        if key.kind != KeyEventKind::Press {
            return AppAction::None;
        }

        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Char('c') => self.clean_now(),
            KeyCode::Enter | KeyCode::Esc => self.show_monitor_stopped = false,
            _ => {}
        }

        AppAction::None
    }

    fn clean_now(&mut self) {
        if self.manual_cleaning.is_some() {
            log::info!("Manual cleanup already running");
            return;
        }

        log::info!("Manual cleanup requested");
        let cleaner = self.cleaner.clone();
        let result = thread::Builder::new()
            .name("manual-cleanup".to_string())
            .spawn(move || cleaner.start_cleaning(&CancelToken::new()));

        match result {
            Ok(handle) => self.manual_cleaning = Some(handle),
            Err(error) => log::error!("Failed to spawn manual cleanup: {:#}", error),
        }
    }

    /// Stop the monitor and wait for a running manual cleanup.
    pub fn shutdown(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            monitor.stop();
        }

        if let Some(handle) = self.manual_cleaning.take() {
            log::info!("Waiting for the manual cleanup to finish");
            let _ = handle.join();
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let Ok(info) = self.info.lock() else {
            return;
        };

        DashboardWidget {
            info: &info,
            temp_roots: self.cleaner.roots().configured(),
            recycle_bin: self.cleaner.recycle_bin_name(),
            dry_run: self.cleaner.is_dry_run(),
            manual_cleaning: self.manual_cleaning.is_some(),
            time_started: self.time_started,
        }
        .render(area, buf);

        if self.show_monitor_stopped {
            let block = Block::default()
                .title("Monitor stopped")
                .borders(Borders::ALL);
            let area = utils::centered_rect(60, 20, area);

            let popup = Paragraph::new(Text::raw(
                "The trash monitor is no longer running. Manual cleanups are still possible.",
            ))
            .wrap(Wrap { trim: true })
            .block(block);

            Clear::render(Clear, area, buf);
            popup.render(area, buf);
        }
    }
}
