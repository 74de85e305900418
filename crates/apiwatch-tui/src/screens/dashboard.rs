//! Dashboard screen: overview counters, add/import form, endpoint table,
//! and the selected endpoint's logs.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState},
};

use apiwatch_core::{DashboardState, FormEdit, FormField, LogView, MonitoredEndpoint, Status};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;
use crate::widgets::{fmt, pulse, status_badge};

const COLUMN_SPACING: u16 = 1;

/// Table columns, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Status,
    Pulse,
    Name,
    Latency,
    LastCheck,
    Delete,
}

const COLUMNS: [Column; 6] = [
    Column::Status,
    Column::Pulse,
    Column::Name,
    Column::Latency,
    Column::LastCheck,
    Column::Delete,
];

impl Column {
    fn title(self) -> &'static str {
        match self {
            Self::Status => "Status",
            Self::Pulse => "Pulse",
            Self::Name => "Name",
            Self::Latency => "Latency",
            Self::LastCheck => "Checked",
            Self::Delete => "",
        }
    }

    fn width(self) -> Constraint {
        match self {
            Self::Status => Constraint::Length(11),
            #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
            Self::Pulse => Constraint::Length(pulse::PULSE_WIDTH as u16),
            Self::Name => Constraint::Min(12),
            Self::Latency => Constraint::Length(10),
            Self::LastCheck => Constraint::Length(11),
            Self::Delete => Constraint::Length(5),
        }
    }

    fn sort_key(self) -> Option<SortColumn> {
        match self {
            Self::Status => Some(SortColumn::Status),
            Self::Name => Some(SortColumn::Name),
            Self::Latency => Some(SortColumn::Latency),
            Self::LastCheck => Some(SortColumn::LastCheck),
            Self::Pulse | Self::Delete => None,
        }
    }
}

/// Sortable columns. Without one the table keeps server order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Status,
    Latency,
    LastCheck,
}

impl SortColumn {
    /// `s` cycles through the columns and back to server order.
    fn cycle(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::Name),
            Some(Self::Name) => Some(Self::Status),
            Some(Self::Status) => Some(Self::Latency),
            Some(Self::Latency) => Some(Self::LastCheck),
            Some(Self::LastCheck) => None,
        }
    }

    fn compare(self, a: &MonitoredEndpoint, b: &MonitoredEndpoint) -> Ordering {
        match self {
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::Status => status_rank(a.last_status).cmp(&status_rank(b.last_status)),
            Self::Latency => match (a.last_latency, b.last_latency) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            // Most recent first, never-checked last
            Self::LastCheck => b.last_checked_at.cmp(&a.last_checked_at),
        }
    }
}

/// Problems first.
fn status_rank(status: Status) -> u8 {
    match status {
        Status::Down => 0,
        Status::Unknown => 1,
        Status::Up => 2,
    }
}

/// Which part of the screen receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Table,
    Field(FormField),
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Table => Self::Field(FormField::Name),
            Self::Field(FormField::Name) => Self::Field(FormField::Url),
            Self::Field(FormField::Url) => Self::Field(FormField::ImportPath),
            Self::Field(FormField::ImportPath) => Self::Table,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Table => Self::Field(FormField::ImportPath),
            Self::Field(FormField::Name) => Self::Table,
            Self::Field(FormField::Url) => Self::Field(FormField::Name),
            Self::Field(FormField::ImportPath) => Self::Field(FormField::Url),
        }
    }
}

fn placeholder(field: FormField) -> &'static str {
    match field {
        FormField::Name => "payments-api",
        FormField::Url => "https://api.example.com/health",
        FormField::ImportPath => "path/to/apis.txt",
    }
}

fn confirm_delete(endpoint: &MonitoredEndpoint) -> Action {
    Action::ShowConfirm(ConfirmAction::DeleteEndpoint {
        id: endpoint.id,
        name: endpoint.name.clone(),
    })
}

pub struct DashboardScreen {
    focused: bool,
    state: Arc<DashboardState>,
    focus: Focus,
    sort: Option<SortColumn>,
    sort_desc: bool,
    log_scroll: u16,
    table_state: std::cell::Cell<TableState>,
    /// Layout from the last render, for mouse hit-testing.
    table_area: std::cell::Cell<Rect>,
    column_areas: std::cell::Cell<[Rect; COLUMNS.len()]>,
    field_areas: std::cell::Cell<[Rect; FormField::ALL.len()]>,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            state: Arc::new(DashboardState::default()),
            focus: Focus::Table,
            sort: None,
            sort_desc: false,
            log_scroll: 0,
            table_state: std::cell::Cell::new(TableState::default().with_selected(Some(0))),
            table_area: std::cell::Cell::new(Rect::default()),
            column_areas: std::cell::Cell::new([Rect::default(); COLUMNS.len()]),
            field_areas: std::cell::Cell::new([Rect::default(); FormField::ALL.len()]),
        }
    }

    /// Endpoints in display order.
    fn sorted_endpoints(&self) -> Vec<&MonitoredEndpoint> {
        let mut list: Vec<&MonitoredEndpoint> = self.state.endpoints.iter().collect();
        if let Some(column) = self.sort {
            list.sort_by(|a, b| {
                let ord = column.compare(a, b);
                if self.sort_desc { ord.reverse() } else { ord }
            });
        }
        list
    }

    fn cursor(&self) -> usize {
        self.table_state.get().selected().unwrap_or(0)
    }

    fn set_cursor(&self, idx: usize) {
        let len = self.state.endpoints.len();
        let mut state = self.table_state.get();
        state.select(if len == 0 { None } else { Some(idx.min(len - 1)) });
        self.table_state.set(state);
    }

    #[allow(clippy::cast_sign_loss, clippy::as_conversions)]
    fn move_cursor(&self, delta: isize) {
        let len = self.state.endpoints.len();
        if len == 0 {
            return;
        }
        #[allow(clippy::cast_possible_wrap)]
        let next = (self.cursor() as isize + delta).clamp(0, len as isize - 1);
        self.set_cursor(next as usize);
    }

    fn cursor_endpoint(&self) -> Option<&MonitoredEndpoint> {
        self.sorted_endpoints().get(self.cursor()).copied()
    }

    fn cycle_sort(&mut self) {
        self.sort = SortColumn::cycle(self.sort);
        self.sort_desc = false;
    }

    /// Header click: sort by `column`, or flip direction if already sorted by it.
    fn sort_by(&mut self, column: SortColumn) {
        if self.sort == Some(column) {
            self.sort_desc = !self.sort_desc;
        } else {
            self.sort = Some(column);
            self.sort_desc = false;
        }
    }

    fn column_at(&self, x: u16) -> Option<Column> {
        COLUMNS
            .iter()
            .zip(self.column_areas.get())
            .find(|(_, rect)| x >= rect.x && x < rect.x.saturating_add(rect.width))
            .map(|(column, _)| *column)
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_cursor(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_cursor(-1);
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.set_cursor(0);
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.set_cursor(usize::MAX);
                None
            }
            KeyCode::Enter => self.cursor_endpoint().map(|e| Action::SelectEndpoint(e.id)),
            KeyCode::Char('d') | KeyCode::Delete => self.cursor_endpoint().map(confirm_delete),
            KeyCode::Char('s') => {
                self.cycle_sort();
                None
            }
            KeyCode::Char('c') => self.state.last_error.as_ref().map(|_| Action::DismissError),
            KeyCode::PageDown => {
                self.log_scroll = self.log_scroll.saturating_add(10);
                None
            }
            KeyCode::PageUp => {
                self.log_scroll = self.log_scroll.saturating_sub(10);
                None
            }
            KeyCode::Char('a') | KeyCode::Tab => {
                self.focus = Focus::Field(FormField::Name);
                None
            }
            KeyCode::Char('i') => {
                self.focus = Focus::Field(FormField::ImportPath);
                None
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                None
            }
            KeyCode::Esc => self.state.selected_id.map(|_| Action::ClearSelection),
            _ => None,
        }
    }

    fn handle_field_key(&mut self, field: FormField, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.focus = Focus::Table;
                None
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                None
            }
            KeyCode::Enter => Some(match field {
                FormField::ImportPath => Action::ImportFile,
                FormField::Name | FormField::Url => Action::SubmitForm,
            }),
            KeyCode::Backspace => Some(Action::EditForm(field, FormEdit::Backspace)),
            KeyCode::Char('u') if ctrl => Some(Action::EditForm(field, FormEdit::Clear)),
            KeyCode::Char(c) if !ctrl => Some(Action::EditForm(field, FormEdit::Insert(c))),
            _ => None,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn panel(title: String, focused: bool) -> Block<'static> {
        Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if focused {
                theme::border_focused()
            } else {
                theme::border_default()
            })
    }

    fn render_overview(&self, frame: &mut Frame, area: Rect) {
        let block = Self::panel(" apiwatch ".into(), false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let overview = &self.state.overview;
        let value = |n: u64, color| {
            Span::styled(
                n.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )
        };
        let counters = Line::from(vec![
            Span::styled(" Total ", theme::key_hint()),
            value(overview.total, theme::NEON_CYAN),
            Span::styled("   UP ", theme::key_hint()),
            value(overview.up, theme::SUCCESS_GREEN),
            Span::styled("   DOWN ", theme::key_hint()),
            value(overview.down, theme::ERROR_RED),
            Span::styled("   UNKNOWN ", theme::key_hint()),
            value(overview.unknown(), theme::DIM_WHITE),
        ]);

        let refreshed = self.state.last_refreshed_at.map_or_else(
            || "waiting for first refresh ".to_owned(),
            |at| format!("refreshed {} ", fmt::fmt_ago(Some(at), Utc::now())),
        );

        let cols = Layout::horizontal([Constraint::Min(0), Constraint::Length(30)]).split(inner);
        frame.render_widget(Paragraph::new(counters), cols[0]);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(refreshed, theme::key_hint())).right_aligned()),
            cols[1],
        );
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let editing = matches!(self.focus, Focus::Field(_));
        let block = Self::panel(" Add endpoint · Import ".into(), self.focused && editing);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let cols = Layout::horizontal([
            Constraint::Percentage(28),
            Constraint::Percentage(42),
            Constraint::Percentage(30),
        ])
        .split(inner);

        let mut field_areas = [Rect::default(); FormField::ALL.len()];
        for ((slot, field), rect) in field_areas.iter_mut().zip(FormField::ALL).zip(cols.iter()) {
            *slot = *rect;
            let active = self.focus == Focus::Field(field);
            let label = format!(" {}: ", field.label());
            let room = usize::from(rect.width).saturating_sub(label.chars().count() + 1);
            let value = self.state.form.get(field);

            let mut spans = vec![Span::styled(
                label,
                if active {
                    theme::key_hint_key()
                } else {
                    theme::key_hint()
                },
            )];
            if value.is_empty() && !active {
                spans.push(Span::styled(
                    placeholder(field),
                    Style::default()
                        .fg(theme::BORDER_GRAY)
                        .add_modifier(Modifier::ITALIC),
                ));
            } else {
                spans.push(Span::styled(
                    tail(value, room),
                    Style::default().fg(theme::DIM_WHITE),
                ));
            }
            if active {
                spans.push(Span::styled("█", Style::default().fg(theme::NEON_CYAN)));
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), *rect);
        }
        self.field_areas.set(field_areas);
    }

    fn render_error_line(&self, frame: &mut Frame, area: Rect) {
        let Some(error) = &self.state.last_error else {
            return;
        };
        let line = Line::from(vec![
            Span::styled(" ✗ ", Style::default().fg(theme::ERROR_RED)),
            Span::styled(error.as_str(), Style::default().fg(theme::ERROR_RED)),
            Span::styled("   c ", theme::key_hint_key()),
            Span::styled("dismiss", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let endpoints = self.sorted_endpoints();
        let block = Self::panel(
            format!(" Endpoints ({}) ", endpoints.len()),
            self.focused && self.focus == Focus::Table,
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Min(1),    // table
            Constraint::Length(1), // hints
        ])
        .split(inner);
        let table_area = layout[0];
        self.table_area.set(table_area);

        let widths: Vec<Constraint> = COLUMNS.iter().map(|c| c.width()).collect();
        let columns = Layout::horizontal(widths.clone())
            .flex(Flex::Start)
            .spacing(COLUMN_SPACING)
            .split(table_area);
        let mut column_areas = [Rect::default(); COLUMNS.len()];
        for (slot, rect) in column_areas.iter_mut().zip(columns.iter()) {
            *slot = *rect;
        }
        self.column_areas.set(column_areas);

        let header = Row::new(COLUMNS.iter().map(|column| {
            let active = column.sort_key().is_some() && column.sort_key() == self.sort;
            if active {
                let arrow = if self.sort_desc { "▼" } else { "▲" };
                Cell::from(format!("{} {arrow}", column.title())).style(theme::table_header_sorted())
            } else {
                Cell::from(column.title()).style(theme::table_header())
            }
        }));

        let now = Utc::now();
        let now_ms = now.timestamp_millis();
        let rows: Vec<Row> = endpoints
            .iter()
            .map(|endpoint| {
                let selected = self.state.selected_id == Some(endpoint.id);
                let (marker, name_style) = if selected {
                    (
                        "▸ ",
                        Style::default()
                            .fg(theme::ELECTRIC_PURPLE)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    ("  ", theme::table_row())
                };
                Row::new(vec![
                    Cell::from(status_badge::status_span(endpoint.last_status)),
                    Cell::from(pulse::pulse_span(
                        endpoint.last_status,
                        endpoint.last_latency,
                        now_ms,
                    )),
                    Cell::from(Line::from(vec![
                        Span::styled(marker, name_style),
                        Span::styled(endpoint.name.clone(), name_style),
                    ])),
                    Cell::from(fmt::fmt_latency(endpoint.last_latency)),
                    Cell::from(fmt::fmt_ago(endpoint.last_checked_at, now)),
                    Cell::from(Span::styled("[del]", Style::default().fg(theme::CORAL))),
                ])
                .style(theme::table_row())
            })
            .collect();
        let empty = rows.is_empty();

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .flex(Flex::Start)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state.get();
        let cursor = state.selected().unwrap_or(0);
        state.select(if empty {
            None
        } else {
            Some(cursor.min(endpoints.len() - 1))
        });
        frame.render_stateful_widget(table, table_area, &mut state);
        self.table_state.set(state);

        if empty && table_area.height > 2 {
            let message = Rect {
                y: table_area.y + 2,
                height: 1,
                ..table_area
            };
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("  No endpoints yet. Press ", theme::key_hint()),
                    Span::styled("a", theme::key_hint_key()),
                    Span::styled(" to add one.", theme::key_hint()),
                ])),
                message,
            );
        }

        let hints = Line::from(vec![
            Span::styled(" j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("select  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("s ", theme::key_hint_key()),
            Span::styled("sort  ", theme::key_hint()),
            Span::styled("Tab ", theme::key_hint_key()),
            Span::styled("form  ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("deselect", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    fn render_logs(&self, frame: &mut Frame, area: Rect) {
        let block = Self::panel(" Logs ".into(), false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines: Vec<Line> = Vec::new();
        if let Some(endpoint) = self.state.selected_endpoint() {
            lines.push(Line::from(vec![
                Span::styled(format!(" {}  ", endpoint.name), theme::title_style()),
                status_badge::status_span(endpoint.last_status),
            ]));
            lines.push(Line::from(Span::styled(
                format!(" {}", endpoint.url),
                theme::key_hint(),
            )));
            lines.push(Line::from(""));
        }

        let placeholder = |text: &'static str| {
            Line::from(Span::styled(format!(" {text}"), theme::key_hint()))
        };
        match self.state.log_view() {
            LogView::NoSelection => lines.push(placeholder("Select an endpoint to view logs.")),
            LogView::Loading => lines.push(placeholder("Loading logs…")),
            LogView::Empty => lines.push(placeholder("No logs yet.")),
            LogView::Entries => {
                let width = usize::from(inner.width);
                for entry in self.state.logs.iter() {
                    let code = entry
                        .status_code
                        .map_or_else(|| fmt::MISSING.to_owned(), |c| c.to_string());
                    let mut spans = vec![
                        Span::styled(
                            format!(" {}  ", fmt::fmt_timestamp(entry.timestamp)),
                            theme::key_hint(),
                        ),
                        status_badge::status_span(entry.status),
                        Span::styled(
                            format!("  code={code}  lat={}", fmt::fmt_latency(entry.latency)),
                            theme::table_row(),
                        ),
                    ];
                    if let Some(response) = entry.response.as_deref().filter(|r| !r.is_empty()) {
                        let used: usize = spans.iter().map(Span::width).sum();
                        let room = width.saturating_sub(used + 2);
                        if room > 1 {
                            spans.push(Span::raw("  "));
                            spans.push(Span::styled(
                                fmt::clip(response, room),
                                Style::default().fg(theme::BORDER_GRAY),
                            ));
                        }
                    }
                    lines.push(Line::from(spans));
                }
            }
        }

        frame.render_widget(Paragraph::new(lines).scroll((self.log_scroll, 0)), inner);
    }
}

/// Last `max` characters of `text`, with `…` marking a cut.
fn tail(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_owned();
    }
    let mut clipped = String::from("…");
    clipped.extend(text.chars().skip(count + 1 - max.max(1)));
    clipped
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.focus {
            Focus::Table => self.handle_table_key(key),
            Focus::Field(field) => self.handle_field_key(field, key),
        })
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(None);
        }
        let pos = Position::new(mouse.column, mouse.row);

        let clicked_field = FormField::ALL
            .into_iter()
            .zip(self.field_areas.get())
            .find(|(_, rect)| rect.contains(pos))
            .map(|(field, _)| field);
        if let Some(field) = clicked_field {
            self.focus = Focus::Field(field);
            return Ok(None);
        }

        let table = self.table_area.get();
        if !table.contains(pos) {
            return Ok(None);
        }
        self.focus = Focus::Table;
        let Some(column) = self.column_at(mouse.column) else {
            return Ok(None);
        };

        if mouse.row == table.y {
            if let Some(sort) = column.sort_key() {
                self.sort_by(sort);
            }
            return Ok(None);
        }

        let idx = usize::from(mouse.row - table.y - 1) + self.table_state.get().offset();
        let Some(endpoint) = self.sorted_endpoints().get(idx).copied() else {
            return Ok(None);
        };
        if column == Column::Delete {
            // Deleting never changes the selection
            return Ok(Some(confirm_delete(endpoint)));
        }
        let action = Action::SelectEndpoint(endpoint.id);
        self.set_cursor(idx);
        Ok(Some(action))
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::StateUpdated(state) = action {
            if state.selected_id != self.state.selected_id {
                self.log_scroll = 0;
            }
            self.state = Arc::clone(state);
            self.set_cursor(self.cursor());
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Length(3), // overview
            Constraint::Length(3), // form
            Constraint::Length(1), // error line
            Constraint::Min(6),    // endpoints + logs
        ])
        .split(area);

        self.render_overview(frame, layout[0]);
        self.render_form(frame, layout[1]);
        self.render_error_line(frame, layout[2]);

        let body =
            Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).split(layout[3]);
        self.render_table(frame, body[0]);
        self.render_logs(frame, body[1]);
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_text(&self) -> bool {
        matches!(self.focus, Focus::Field(_))
    }

    fn id(&self) -> &str {
        "dashboard"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use apiwatch_core::EndpointId;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    fn endpoint(id: i64, name: &str, status: Status, latency: Option<f64>) -> MonitoredEndpoint {
        MonitoredEndpoint {
            id: EndpointId(id),
            name: name.into(),
            url: format!("https://{name}.example.com"),
            last_status: status,
            last_latency: latency,
            last_status_code: None,
            last_checked_at: None,
            last_alert_at: None,
            created_at: None,
        }
    }

    fn screen_with(state: DashboardState) -> DashboardScreen {
        let mut screen = DashboardScreen::new();
        screen
            .update(&Action::StateUpdated(Arc::new(state)))
            .unwrap();
        screen
    }

    fn sample_state() -> DashboardState {
        DashboardState {
            endpoints: Arc::new(vec![
                endpoint(1, "search", Status::Up, Some(0.4)),
                endpoint(2, "billing", Status::Down, None),
                endpoint(3, "auth", Status::Up, Some(0.1)),
            ]),
            ..DashboardState::default()
        }
    }

    fn draw(screen: &DashboardScreen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal
            .draw(|frame| screen.render(frame, frame.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn names(screen: &DashboardScreen) -> Vec<String> {
        screen
            .sorted_endpoints()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    #[test]
    fn log_pane_placeholders() {
        let screen = screen_with(sample_state());
        assert!(draw(&screen).contains("Select an endpoint to view logs."));

        let screen = screen_with(DashboardState {
            selected_id: Some(EndpointId(2)),
            ..sample_state()
        });
        assert!(draw(&screen).contains("Loading logs…"));

        let screen = screen_with(DashboardState {
            selected_id: Some(EndpointId(2)),
            logs_loaded: true,
            ..sample_state()
        });
        let text = draw(&screen);
        assert!(text.contains("No logs yet."));
        assert!(text.contains("https://billing.example.com"));
    }

    #[test]
    fn overview_counters_are_shown_verbatim() {
        let screen = screen_with(DashboardState {
            overview: apiwatch_core::OverviewSummary {
                total: 3,
                up: 2,
                down: 1,
            },
            ..sample_state()
        });
        let text = draw(&screen);
        assert!(text.contains("Total 3"));
        assert!(text.contains("UP 2"));
        assert!(text.contains("DOWN 1"));
    }

    #[test]
    fn sort_cycles_and_returns_to_server_order() {
        let mut screen = screen_with(sample_state());
        assert_eq!(names(&screen), ["search", "billing", "auth"]);

        let press = |screen: &mut DashboardScreen, c| {
            screen
                .handle_key_event(KeyEvent::from(KeyCode::Char(c)))
                .unwrap()
        };
        press(&mut screen, 's');
        assert_eq!(names(&screen), ["auth", "billing", "search"]);
        press(&mut screen, 's');
        assert_eq!(names(&screen), ["billing", "search", "auth"]);
        press(&mut screen, 's');
        assert_eq!(names(&screen), ["auth", "search", "billing"]);
        press(&mut screen, 's');
        press(&mut screen, 's');
        assert_eq!(names(&screen), ["search", "billing", "auth"]);
    }

    #[test]
    fn enter_selects_and_d_asks_for_confirmation() {
        let mut screen = screen_with(sample_state());
        screen
            .handle_key_event(KeyEvent::from(KeyCode::Char('j')))
            .unwrap();
        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Enter))
            .unwrap();
        assert!(matches!(action, Some(Action::SelectEndpoint(EndpointId(2)))));

        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Char('d')))
            .unwrap();
        assert!(matches!(
            action,
            Some(Action::ShowConfirm(ConfirmAction::DeleteEndpoint { id: EndpointId(2), .. }))
        ));
    }

    #[test]
    fn typing_goes_to_the_focused_field() {
        let mut screen = screen_with(sample_state());
        assert!(!screen.captures_text());
        screen
            .handle_key_event(KeyEvent::from(KeyCode::Tab))
            .unwrap();
        assert!(screen.captures_text());

        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Char('q')))
            .unwrap();
        assert!(matches!(
            action,
            Some(Action::EditForm(FormField::Name, FormEdit::Insert('q')))
        ));
        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Enter))
            .unwrap();
        assert!(matches!(action, Some(Action::SubmitForm)));

        screen
            .handle_key_event(KeyEvent::from(KeyCode::Esc))
            .unwrap();
        assert!(!screen.captures_text());
    }

    #[test]
    fn clicks_on_rows_select_and_delete_cell_only_confirms() {
        let mut screen = screen_with(sample_state());
        draw(&screen);
        let table = screen.table_area.get();
        let first_row = table.y + 1;

        let name_x = screen.column_areas.get()[2].x;
        let action = screen.handle_mouse_event(click(name_x, first_row + 2)).unwrap();
        assert!(matches!(action, Some(Action::SelectEndpoint(EndpointId(3)))));

        let cursor_before = screen.cursor();
        let delete_x = screen.column_areas.get()[5].x;
        let action = screen.handle_mouse_event(click(delete_x, first_row)).unwrap();
        assert!(matches!(
            action,
            Some(Action::ShowConfirm(ConfirmAction::DeleteEndpoint { id: EndpointId(1), .. }))
        ));
        assert_eq!(screen.cursor(), cursor_before);
    }

    #[test]
    fn header_click_sorts_and_flips() {
        let mut screen = screen_with(sample_state());
        draw(&screen);
        let header_row = screen.table_area.get().y;
        let name_x = screen.column_areas.get()[2].x;

        assert!(screen.handle_mouse_event(click(name_x, header_row)).unwrap().is_none());
        assert_eq!(names(&screen), ["auth", "billing", "search"]);
        screen.handle_mouse_event(click(name_x, header_row)).unwrap();
        assert_eq!(names(&screen), ["search", "billing", "auth"]);
    }
}
