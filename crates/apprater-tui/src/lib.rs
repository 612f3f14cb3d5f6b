//! Terminal confirmation dialog for `apprater` prompts.
//!
//! [`TuiSurface`] implements [`ConfirmationSurface`] with a centered modal
//! (ratatui + crossterm): the title, the wrapped message, and the three
//! buttons. The terminal is switched to raw mode and the alternate screen for
//! the duration of the question and restored afterwards, even on error.
//!
//! Keys: `←`/`→` (or `h`/`l`, `Tab`) move, `Enter`/`Space` select, `1`–`3`
//! answer directly, `Esc`/`q`/`Ctrl+C` close without answering.
//!
//! ```ignore
//! use apprater::prelude::*;
//! use apprater_tui::TuiSurface;
//!
//! let mut surface = TuiSurface::new();
//! rater.on_application_start(&mut surface)?;
//! ```

use std::io;
use std::time::Duration;

use apprater::prompt::{ConfirmationSurface, PromptAction, PromptRequest};
use crossterm::event::{self, Event};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{cursor, execute};
use ratatui::prelude::*;
use tracing::debug;

mod app;
mod input;
mod render;

use app::DialogApp;
use input::handle_key_event;
use render::render;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Rating dialog on the controlling terminal.
pub struct TuiSurface {
    poll_interval: Duration,
}

impl Default for TuiSurface {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl TuiSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long to wait for input before redrawing (picks up resizes).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl ConfirmationSurface for TuiSurface {
    fn present(&mut self, request: &PromptRequest) -> Result<PromptAction, String> {
        let action = run_dialog(request, self.poll_interval)
            .map_err(|e| format!("failed to run rating dialog: {e}"))?;
        debug!(?action, "rating dialog answered");
        Ok(action)
    }
}

/// Restores the terminal when dropped.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        // From here on Drop undoes whatever succeeded.
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
    }
}

/// Show the dialog on the real terminal and block until it is answered.
pub fn run_dialog(request: &PromptRequest, poll_interval: Duration) -> io::Result<PromptAction> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    drive(&mut terminal, request, || {
        if event::poll(poll_interval)? {
            event::read().map(Some)
        } else {
            Ok(None)
        }
    })
}

/// Dialog loop over any backend: draw, wait for the next event, repeat until
/// the user answers.
///
/// `next_event` returns `Ok(None)` on a poll timeout.
pub fn drive<B: Backend>(
    terminal: &mut Terminal<B>,
    request: &PromptRequest,
    mut next_event: impl FnMut() -> io::Result<Option<Event>>,
) -> io::Result<PromptAction> {
    let mut app = DialogApp::new();
    loop {
        terminal.draw(|frame| render(frame, request, &app))?;
        if let Some(action) = app.result {
            return Ok(action);
        }
        if let Some(Event::Key(key)) = next_event()? {
            handle_key_event(key, &mut app, request);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::collections::VecDeque;

    fn scripted(keys: &[KeyCode]) -> impl FnMut() -> io::Result<Option<Event>> {
        let mut events: VecDeque<Event> = keys
            .iter()
            .map(|&code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .collect();
        move || {
            events
                .pop_front()
                .map(Some)
                .ok_or_else(|| io::Error::other("script exhausted"))
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn renders_title_message_and_buttons() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let request = PromptRequest::default().with_message("Short message.");
        let action = drive(&mut terminal, &request, scripted(&[KeyCode::Esc])).unwrap();
        assert_eq!(action, PromptAction::Cancelled);

        let text = screen_text(&terminal);
        assert!(text.contains("Rate this app"), "{text}");
        assert!(text.contains("Short message."), "{text}");
        assert!(text.contains("[ Rate now ]"), "{text}");
        assert!(text.contains("[ Remind me later ]"), "{text}");
        assert!(text.contains("[ No, thanks ]"), "{text}");
    }

    #[test]
    fn custom_labels_are_rendered() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let request = PromptRequest::default()
            .with_title("Enjoying Notes?")
            .with_rate_label("Sure")
            .with_remind_label("Later")
            .with_decline_label("Never");
        drive(&mut terminal, &request, scripted(&[KeyCode::Char('3')])).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Enjoying Notes?"), "{text}");
        assert!(text.contains("[ Sure ]  [ Later ]  [ Never ]"), "{text}");
    }

    #[test]
    fn navigation_then_enter_answers() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let request = PromptRequest::default();
        let action = drive(
            &mut terminal,
            &request,
            scripted(&[KeyCode::Right, KeyCode::Enter]),
        )
        .unwrap();
        assert_eq!(action, PromptAction::Defer);
    }

    #[test]
    fn timeouts_only_redraw() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let request = PromptRequest::default();
        let mut polls = 0;
        let action = drive(&mut terminal, &request, || {
            polls += 1;
            Ok(if polls < 3 {
                None
            } else {
                Some(Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
            })
        })
        .unwrap();
        assert_eq!(action, PromptAction::Accept);
        assert_eq!(polls, 3);
    }

    #[test]
    fn long_words_keep_last_line_visible() {
        // Each word takes a row of its own at the dialog's 60-column text width.
        let words: Vec<String> = (0..8).map(|i| format!("{i}{}", "w".repeat(30))).collect();
        let request = PromptRequest::default().with_message(words.join(" "));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        drive(&mut terminal, &request, scripted(&[KeyCode::Esc])).unwrap();

        let text = screen_text(&terminal);
        for word in &words {
            assert!(text.contains(word.as_str()), "missing {word}:\n{text}");
        }
        assert!(text.contains("[ Rate now ]"), "{text}");
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(10, 3)).unwrap();
        let request = PromptRequest::default();
        let action = drive(&mut terminal, &request, scripted(&[KeyCode::Char('1')])).unwrap();
        assert_eq!(action, PromptAction::Accept);
    }

    #[test]
    fn surface_poll_interval_override() {
        let surface = TuiSurface::new().with_poll_interval(Duration::from_millis(10));
        assert_eq!(surface.poll_interval, Duration::from_millis(10));
    }
}
