//! Status badge: `● UP`, `○ DOWN`, `◌ UNKNOWN` with color mapping.

use apiwatch_core::Status;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::theme;

pub fn status_symbol(status: Status) -> &'static str {
    match status {
        Status::Up => "●",
        Status::Down => "○",
        Status::Unknown => "◌",
    }
}

/// Styled badge with symbol and label.
pub fn status_span(status: Status) -> Span<'static> {
    let mut style = Style::default().fg(theme::status_color(status));
    if status == Status::Down {
        style = style.add_modifier(Modifier::BOLD);
    }
    Span::styled(
        format!("{} {}", status_symbol(status), status.as_str()),
        style,
    )
}
