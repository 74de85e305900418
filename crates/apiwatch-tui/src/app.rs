//! Application core: event loop, action dispatch, overlays.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use apiwatch_core::{Dashboard, DashboardState};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::screens::dashboard::DashboardScreen;
use crate::theme;
use crate::tui::{Event, Tui};

/// How long a toast stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Service reachability as seen by the health probe.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

/// Top-level application state and event loop.
pub struct App {
    dashboard: Dashboard,
    poll_interval: Duration,
    screen: DashboardScreen,
    running: bool,
    connection_status: ConnectionStatus,
    help_visible: bool,
    /// Latest snapshot from the data bridge.
    state: Arc<DashboardState>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Stops the data bridge and health probe.
    data_cancel: CancellationToken,
    /// Blocks other input while set.
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
    throbber_state: ThrobberState,
}

impl App {
    pub fn new(dashboard: Dashboard, poll_interval: Duration) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            dashboard,
            poll_interval,
            screen: DashboardScreen::new(),
            running: true,
            connection_status: ConnectionStatus::default(),
            help_visible: false,
            state: Arc::new(DashboardState::default()),
            action_tx,
            action_rx,
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            notification: None,
            throbber_state: ThrobberState::default(),
        }
    }

    /// Run the main event loop until quit.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.screen.init(self.action_tx.clone())?;
        self.screen.set_focused(true);

        // Polling lives exactly as long as the view
        let poll = self.dashboard.start_polling(self.poll_interval);

        tokio::spawn(crate::data_bridge::spawn_data_bridge(
            self.dashboard.clone(),
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));
        tokio::spawn(crate::data_bridge::spawn_health_probe(
            self.dashboard.clone(),
            self.poll_interval,
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        info!("TUI event loop started");

        while self.running {
            let Some(event) = tui.next_event().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Click(mouse) => {
                    if let Some(action) = self.handle_mouse_event(mouse)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        poll.stop().await;
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Priority: confirm dialog, help overlay, global keys, then the screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if !self.screen.captures_text() {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
                KeyCode::Char('r') => return Ok(Some(Action::Refresh)),
                _ => {}
            }
        }

        self.screen.handle_key_event(key)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.pending_confirm.is_some() || self.help_visible {
            return Ok(None);
        }
        self.screen.handle_mouse_event(mouse)
    }

    #[allow(clippy::too_many_lines)]
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Tick => {
                if self.state.is_refreshing() {
                    self.throbber_state.calc_next();
                }
                let expired = self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= NOTIFICATION_TTL);
                if expired {
                    self.notification = None;
                }
            }

            Action::StateUpdated(state) => {
                if let Some(notice) = &state.notice {
                    // The toast owns the message from here on
                    self.notification = Some((Notification::info(notice.clone()), Instant::now()));
                    self.dashboard.dismiss_notice();
                }
                self.state = Arc::clone(state);
            }

            Action::Connected => {
                if self.connection_status != ConnectionStatus::Connected {
                    info!("connected to {}", self.dashboard.config().api_base);
                }
                self.connection_status = ConnectionStatus::Connected;
            }

            Action::Disconnected(reason) => {
                if self.connection_status != ConnectionStatus::Disconnected {
                    info!(reason = %reason, "service unreachable");
                    self.notification = Some((
                        Notification::error(format!("Service unreachable: {reason}")),
                        Instant::now(),
                    ));
                }
                self.connection_status = ConnectionStatus::Disconnected;
            }

            Action::Refresh => {
                let dashboard = self.dashboard.clone();
                tokio::spawn(async move {
                    if let Err(e) = dashboard.refresh().await {
                        debug!(error = %e, "manual refresh failed");
                    }
                });
            }

            Action::SelectEndpoint(id) => {
                let (dashboard, id) = (self.dashboard.clone(), *id);
                tokio::spawn(async move {
                    if let Err(e) = dashboard.select_endpoint(id).await {
                        debug!(error = %e, %id, "loading logs failed");
                    }
                });
            }

            Action::ClearSelection => self.dashboard.clear_selection(),

            Action::SubmitForm => {
                let dashboard = self.dashboard.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match dashboard.submit_form().await {
                        Ok(()) => {
                            let _ = tx.send(Action::Notify(Notification::success("Endpoint added")));
                        }
                        Err(e) => debug!(error = %e, "add endpoint failed"),
                    }
                });
            }

            Action::ImportFile => {
                let dashboard = self.dashboard.clone();
                tokio::spawn(async move {
                    if let Err(e) = dashboard.import_from_form().await {
                        debug!(error = %e, "import failed");
                    }
                });
            }

            Action::EditForm(field, edit) => self.dashboard.edit_form(*field, *edit),

            Action::DismissError => self.dashboard.dismiss_error(),

            Action::ShowConfirm(confirm) => {
                self.pending_confirm = Some(confirm.clone());
            }

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute_confirm(confirm);
                }
            }

            Action::ConfirmNo => self.pending_confirm = None,

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            Action::Render | Action::Resize(..) => {}
        }

        if let Some(follow_up) = self.screen.update(action)? {
            self.action_tx.send(follow_up)?;
        }

        Ok(())
    }

    fn execute_confirm(&self, confirm: ConfirmAction) {
        let dashboard = self.dashboard.clone();
        let tx = self.action_tx.clone();
        match confirm {
            ConfirmAction::DeleteEndpoint { id, name } => {
                tokio::spawn(async move {
                    match dashboard.remove_endpoint(id).await {
                        Ok(()) => {
                            let _ = tx.send(Action::Notify(Notification::success(format!(
                                "Deleted {name}"
                            ))));
                        }
                        Err(e) => debug!(error = %e, %id, "delete failed"),
                    }
                });
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        self.screen.render(frame, layout[0]);
        self.render_status_bar(frame, layout[1]);

        // Overlays: last = topmost
        if let Some((ref notification, _)) = self.notification {
            Self::render_notification(frame, area, notification);
        }

        if let Some(ref confirm) = self.pending_confirm {
            Self::render_confirm_dialog(frame, area, confirm);
        }

        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let connection_indicator = match self.connection_status {
            ConnectionStatus::Connected => {
                Span::styled("● connected", Style::default().fg(theme::SUCCESS_GREEN))
            }
            ConnectionStatus::Disconnected => {
                Span::styled("○ unreachable", Style::default().fg(theme::ERROR_RED))
            }
            ConnectionStatus::Connecting => {
                Span::styled("◐ connecting", Style::default().fg(theme::ELECTRIC_YELLOW))
            }
        };

        let line = Line::from(vec![
            Span::raw(" "),
            connection_indicator,
            Span::styled(
                format!(
                    " │ {} │ every {}",
                    self.dashboard.config().api_base,
                    humantime::format_duration(self.poll_interval)
                ),
                theme::key_hint(),
            ),
            Span::styled(" │ r refresh  ? help  q quit", theme::key_hint()),
        ]);

        let cols = Layout::horizontal([Constraint::Min(0), Constraint::Length(16)]).split(area);
        frame.render_widget(Paragraph::new(line), cols[0]);

        if self.state.is_refreshing() {
            let throbber = Throbber::default()
                .label("refreshing")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, cols[1], &mut self.throbber_state.clone());
        }
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_width = 56u16.min(area.width.saturating_sub(4));
        let help_height = 24u16.min(area.height.saturating_sub(4));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let entry = |key: &'static str, text: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(text, theme::key_hint()),
            ])
        };
        let heading = |text: &'static str| {
            Line::from(Span::styled(
                format!("  {text}"),
                Style::default().fg(theme::NEON_CYAN),
            ))
        };

        let help_text = vec![
            Line::from(""),
            heading("Endpoints"),
            entry("j/k ↑/↓", "Move cursor"),
            entry("Enter", "Select, load logs"),
            entry("Esc", "Deselect"),
            entry("d", "Delete (asks first)"),
            entry("s", "Cycle sort column"),
            entry("PgUp/PgDn", "Scroll logs"),
            Line::from(""),
            heading("Forms"),
            entry("Tab", "Next field"),
            entry("a / i", "Jump to add / import"),
            entry("Enter", "Submit"),
            entry("Ctrl+u", "Clear field"),
            Line::from(""),
            heading("Global"),
            entry("r", "Refresh now"),
            entry("c", "Dismiss error"),
            entry("q", "Quit"),
            Line::from(Span::styled(
                "                       Esc or ? to close",
                theme::key_hint(),
            )),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }

    fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
        let width = 50u16.min(area.width.saturating_sub(4));
        let height = 5u16;

        let x = (area.width.saturating_sub(width)) / 2;
        let y = (area.height.saturating_sub(height)) / 2;
        let dialog_area = Rect::new(area.x + x, area.y + y, width, height);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            dialog_area,
        );

        let block = Block::default()
            .title(" Confirm ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ELECTRIC_YELLOW));

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let text = vec![
            Line::from(Span::styled(
                format!("  {confirm}"),
                Style::default().fg(theme::DIM_WHITE),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  y ", theme::key_hint_key()),
                Span::styled("confirm    ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text), inner);
    }

    /// Toast in the bottom-right corner, above the status bar.
    fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
        let msg_len = u16::try_from(notification.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len
            .saturating_add(6)
            .clamp(20, 60)
            .min(area.width.saturating_sub(2));
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2);
        let toast_area = Rect::new(area.x + x, area.y + y, width, height);

        let (border_color, icon) = match notification.level {
            NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
            NotificationLevel::Error => (theme::ERROR_RED, "✗"),
            NotificationLevel::Info => (theme::NEON_CYAN, "·"),
        };

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            toast_area,
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(notification.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}
