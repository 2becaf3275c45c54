use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{
        Block,
        Borders,
        Widget,
    },
};
use tui_logger::{
    TuiLoggerLevelOutput,
    TuiLoggerWidget,
};

/// Split screen pane showing the log records captured by the tui drain.
pub struct LogPaneWidget;

impl Widget for LogPaneWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let block = Block::new().title("Log").borders(Borders::LEFT);
        TuiLoggerWidget::default()
            .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
            .output_target(false)
            .block(block)
            .render(area, buf);
    }
}
