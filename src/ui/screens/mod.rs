pub(crate) mod dashboard;
pub(crate) mod transactions;

use ratatui::{
    style::Style,
    text::Span,
    widgets::{Block, Borders},
};

use crate::ui::theme;

/// Bordered panel with a dim bold title, shared by every screen.
pub(crate) fn panel(title: impl Into<String>) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {} ", title.into()),
            theme::title_style(),
        ))
}
