use std::{
    path::PathBuf,
    sync::{
        Arc,
        Mutex,
    },
    time::Instant,
};

use ratatui::{
    buffer::Buffer,
    layout::{
        Constraint,
        Layout,
        Rect,
    },
    style::{
        Color,
        Style,
        Stylize,
    },
    text::{
        Line,
        Span,
    },
    widgets::{
        Block,
        Borders,
        Gauge,
        Paragraph,
        Widget,
    },
};
use tclean::{
    utils::format_file_size,
    CleanupReport,
    MonitorReport,
    MonitorReportConsumer,
    MonitorState,
    Threshold,
    TrashEstimate,
    VolumeCapacity,
};

use crate::utils::format_duration;

#[derive(Debug)]
pub struct DashboardInfo {
    pub capacity: Option<VolumeCapacity>,
    pub threshold: Option<Threshold>,
    pub state: MonitorState,
    pub cycles: u64,

    pub last_estimate: Option<(Instant, TrashEstimate)>,
    pub last_cleanup: Option<(Instant, CleanupReport)>,
}

impl Default for DashboardInfo {
    fn default() -> Self {
        Self {
            capacity: None,
            threshold: None,
            state: MonitorState::Idle,
            cycles: 0,
            last_estimate: None,
            last_cleanup: None,
        }
    }
}

/// Feeds the monitors progress into the dashboard.
pub struct UiReportConsumer {
    info: Arc<Mutex<DashboardInfo>>,
}

impl UiReportConsumer {
    pub fn new(info: Arc<Mutex<DashboardInfo>>) -> Self {
        Self { info }
    }
}

impl MonitorReportConsumer for UiReportConsumer {
    fn consume_report(&mut self, report: MonitorReport) {
        let Ok(mut info) = self.info.lock() else {
            return;
        };

        match report {
            MonitorReport::Started {
                capacity,
                threshold,
            } => {
                info.capacity = Some(capacity);
                info.threshold = Some(threshold);
            }
            MonitorReport::State(state) => info.state = state,
            MonitorReport::Estimated(estimate) => {
                info.cycles += 1;
                info.last_estimate = Some((Instant::now(), estimate));
            }
            MonitorReport::Cleaned(report) => info.last_cleanup = Some((Instant::now(), report)),
        }
    }
}

pub struct DashboardWidget<'a> {
    pub info: &'a DashboardInfo,
    pub temp_roots: &'a [PathBuf],
    pub recycle_bin: &'a str,
    pub dry_run: bool,
    pub manual_cleaning: bool,
    pub time_started: Instant,
}

impl DashboardWidget<'_> {
    fn state_line(&self) -> Line<'static> {
        let state = match self.info.state {
            MonitorState::Idle => "estimating".blue(),
            MonitorState::Cleaning => "cleaning".yellow().bold(),
            MonitorState::Sleeping => "sleeping".green(),
            MonitorState::Stopped => "stopped".red(),
        };

        let mut segments = vec![Span::raw("Monitor:     "), state];
        if self.manual_cleaning {
            segments.push(Span::raw(" (manual cleanup running)").yellow());
        }
        if self.dry_run {
            segments.push(Span::raw(" [dry run]").italic());
        }
        Line::from(segments)
    }

    fn summary_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::with_capacity(8);

        lines.push(match self.info.capacity {
            Some(capacity) => Line::raw(format!(
                "Volume:      {} total, {} free",
                format_file_size(capacity.total_bytes),
                format_file_size(capacity.free_bytes)
            )),
            None => Line::raw("Volume:      sampling..."),
        });
        lines.push(match self.info.threshold {
            Some(threshold) => Line::raw(format!(
                "Threshold:   {}",
                format_file_size(threshold.bytes())
            )),
            None => Line::raw("Threshold:   unknown"),
        });
        lines.push(self.state_line());

        lines.push(match &self.info.last_estimate {
            Some((timestamp, estimate)) => {
                let mut line = format!(
                    "Trash:       {} (temp {}, {} {}) {} ago",
                    format_file_size(estimate.total_bytes()),
                    format_file_size(estimate.temp_bytes),
                    self.recycle_bin,
                    format_file_size(estimate.recycle_bin_bytes),
                    format_duration(&timestamp.elapsed())
                );
                if !estimate.faults.is_empty() {
                    line.push_str(&format!(", {} entries skipped", estimate.faults.len()));
                }
                Line::raw(line)
            }
            None => Line::raw("Trash:       not estimated yet"),
        });

        lines.push(match &self.info.last_cleanup {
            Some((timestamp, report)) => {
                let line = Line::raw(format!(
                    "Last clean:  {} files ({}) removed, {} failures, {} ago",
                    report.temp.files_removed,
                    format_file_size(report.temp.bytes_removed),
                    report.temp.faults.len(),
                    format_duration(&timestamp.elapsed())
                ));
                if report.temp.faults.is_empty() && report.recycle_bin_error.is_none() {
                    line
                } else {
                    line.yellow()
                }
            }
            None => Line::raw("Last clean:  never"),
        });

        lines.push(Line::raw(""));
        lines.push(Line::raw("Temp roots:").bold());
        for root in self.temp_roots {
            lines.push(Line::raw(format!("  {}", root.display())));
        }

        lines
    }

    fn gauge(&self) -> Gauge<'static> {
        let trash_bytes = self
            .info
            .last_estimate
            .as_ref()
            .map_or(0, |(_, estimate)| estimate.total_bytes());

        let ratio = match self.info.threshold {
            Some(threshold) if threshold.bytes() > 0 => {
                (trash_bytes as f64 / threshold.bytes() as f64).clamp(0.0, 1.0)
            }
            _ => 0.0,
        };

        let color = if ratio >= 1.0 {
            Color::Red
        } else if ratio >= 0.75 {
            Color::Yellow
        } else {
            Color::Green
        };

        Gauge::default()
            .block(Block::new().title("Threshold usage").borders(Borders::TOP))
            .gauge_style(Style::default().fg(color))
            .ratio(ratio)
            .label(format!("{:.0}%", ratio * 100.0))
    }
}

impl Widget for DashboardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let layout = Layout::vertical(&[
            Constraint::Percentage(100),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(area);

        let block = Block::new().title("tclean").borders(Borders::ALL);
        Paragraph::new(self.summary_lines())
            .block(block)
            .render(layout[0], buf);

        self.gauge().render(layout[1], buf);

        let footer = Line::from(vec![
            Span::raw(format_duration(&self.time_started.elapsed())),
            Span::raw(format!(" {} cycles ", self.info.cycles)),
            "c".bold(),
            Span::raw(" clean now  "),
            "q".bold(),
            Span::raw(" quit"),
        ]);
        footer.blue().render(layout[2], buf);
    }
}
