//! Terminal session for the dashboard: raw mode, alternate screen, and the
//! input/timer stream the event loop consumes.
//!
//! Input is read by a background task and merged with the animation tick
//! and the frame clock into one channel. Only the input the dashboard acts
//! on is forwarded, so pointer motion never wakes the loop.

use std::io::{Stdout, stdout};
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand, cursor,
    event::{
        DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, EventStream, KeyEvent,
        KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Drives the pulse animation, throbber, and toast expiry (4 Hz).
const TICK_RATE: Duration = Duration::from_millis(250);
/// Frame clock (~30 FPS).
const FRAME_RATE: Duration = Duration::from_millis(33);

#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Left-button press; the only pointer input the dashboard handles.
    Click(MouseEvent),
    /// (cols, rows)
    Resize(u16, u16),
    Tick,
    Render,
}

impl Event {
    /// Keep key presses, left clicks and resizes. Everything else is noise.
    fn from_terminal(event: CrosstermEvent) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Self::Key(key)),
            CrosstermEvent::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                Some(Self::Click(mouse))
            }
            CrosstermEvent::Resize(w, h) => Some(Self::Resize(w, h)),
            _ => None,
        }
    }
}

/// Owns the terminal and its event task for the lifetime of the view.
/// Dropping it stops the task and restores the shell.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    events: mpsc::UnboundedReceiver<Event>,
    events_tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        let (events_tx, events) = mpsc::unbounded_channel();
        Ok(Self {
            terminal,
            events,
            events_tx,
            cancel: CancellationToken::new(),
        })
    }

    /// Take over the screen and start reading input.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(EnableMouseCapture)?;
        stdout().execute(cursor::Hide)?;
        self.terminal.clear()?;

        tokio::spawn(read_events(self.events_tx.clone(), self.cancel.clone()));
        Ok(())
    }

    /// Stop reading input and give the screen back. Every restore step is
    /// attempted even if an earlier one fails.
    pub fn exit(&mut self) {
        self.cancel.cancel();
        restore_terminal();
    }

    /// `None` once the event task has stopped.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.exit();
    }
}

async fn read_events(tx: mpsc::UnboundedSender<Event>, cancel: CancellationToken) {
    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(TICK_RATE);
    let mut frame = tokio::time::interval(FRAME_RATE);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = tick.tick() => Event::Tick,
            _ = frame.tick() => Event::Render,
            Some(Ok(raw)) = input.next() => match Event::from_terminal(raw) {
                Some(event) => event,
                None => continue,
            },
        };

        if tx.send(event).is_err() {
            break;
        }
    }
    debug!("terminal event reader stopped");
}

fn restore_terminal() {
    let _ = stdout().execute(cursor::Show);
    let _ = stdout().execute(DisableMouseCapture);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// Install color-eyre's report hook and a panic hook that restores the
/// terminal before printing.
///
/// Must run before [`Tui::enter`].
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();

    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        panic_hook(info);
    }));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn mouse(kind: MouseEventKind) -> CrosstermEvent {
        CrosstermEvent::Mouse(MouseEvent {
            kind,
            column: 4,
            row: 2,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn only_key_presses_pass() {
        let press = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
        let release = KeyEvent {
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
            ..press
        };

        assert_eq!(
            Event::from_terminal(CrosstermEvent::Key(press)),
            Some(Event::Key(press))
        );
        assert_eq!(Event::from_terminal(CrosstermEvent::Key(release)), None);
    }

    #[test]
    fn pointer_noise_is_dropped() {
        assert!(matches!(
            Event::from_terminal(mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(Event::Click(m)) if (m.column, m.row) == (4, 2)
        ));
        assert_eq!(Event::from_terminal(mouse(MouseEventKind::Moved)), None);
        assert_eq!(
            Event::from_terminal(mouse(MouseEventKind::Down(MouseButton::Right))),
            None
        );
        assert_eq!(Event::from_terminal(mouse(MouseEventKind::ScrollDown)), None);
    }

    #[test]
    fn resize_and_focus() {
        assert_eq!(
            Event::from_terminal(CrosstermEvent::Resize(120, 40)),
            Some(Event::Resize(120, 40))
        );
        assert_eq!(Event::from_terminal(CrosstermEvent::FocusGained), None);
    }
}
