//! The rating prompt: what is shown, what the user can answer, and the
//! surface that shows it.
//!
//! A [`ConfirmationSurface`] is whatever renders the prompt: a terminal
//! dialog, a GUI modal, or a scripted fake in tests. It receives an
//! immutable [`PromptRequest`] and reports exactly one [`PromptAction`].

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Rate this app";
pub const DEFAULT_MESSAGE: &str = "If you enjoy using this app, would you mind taking a moment \
to rate it? It won't take more than a minute. Thanks for your support!";
pub const DEFAULT_RATE_LABEL: &str = "Rate now";
pub const DEFAULT_REMIND_LABEL: &str = "Remind me later";
pub const DEFAULT_DECLINE_LABEL: &str = "No, thanks";

/// Display strings for the prompt.
///
/// Built once with the `with_*` methods and passed by reference; surfaces
/// never mutate it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptRequest {
    pub title: String,
    pub message: String,
    /// Label of the accept button.
    pub rate_label: String,
    /// Label of the defer button.
    pub remind_label: String,
    /// Label of the decline-forever button.
    pub decline_label: String,
}

impl Default for PromptRequest {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            rate_label: DEFAULT_RATE_LABEL.to_string(),
            remind_label: DEFAULT_REMIND_LABEL.to_string(),
            decline_label: DEFAULT_DECLINE_LABEL.to_string(),
        }
    }
}

impl PromptRequest {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_rate_label(mut self, label: impl Into<String>) -> Self {
        self.rate_label = label.into();
        self
    }

    pub fn with_remind_label(mut self, label: impl Into<String>) -> Self {
        self.remind_label = label.into();
        self
    }

    pub fn with_decline_label(mut self, label: impl Into<String>) -> Self {
        self.decline_label = label.into();
        self
    }

    /// The three buttons in display order, paired with the action each one
    /// reports.
    pub fn buttons(&self) -> [(PromptAction, &str); 3] {
        [
            (PromptAction::Accept, self.rate_label.as_str()),
            (PromptAction::Defer, self.remind_label.as_str()),
            (PromptAction::Decline, self.decline_label.as_str()),
        ]
    }

    pub fn label(&self, action: PromptAction) -> Option<&str> {
        self.buttons()
            .into_iter()
            .find(|(a, _)| *a == action)
            .map(|(_, label)| label)
    }
}

/// The user's answer to the prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptAction {
    /// Rate now: hand off to the store listing, never ask again.
    Accept,
    /// Remind me later: restart the launch/day counters.
    Defer,
    /// No thanks: never ask again.
    Decline,
    /// The prompt was closed without pressing a button (Esc, back, click
    /// outside). Nothing changes; the prompt comes back on the next
    /// qualifying launch.
    Cancelled,
}

impl PromptAction {
    /// Whether the action ends the prompt cycle for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accept | Self::Decline)
    }
}

/// Something that can show the prompt and collect the answer.
pub trait ConfirmationSurface {
    /// Show `request` and block until the user answers.
    fn present(&mut self, request: &PromptRequest) -> Result<PromptAction, String>;
}

// ── Line-based surface ────────────────────────────────────────────────

/// Plain-text surface for terminals without raw mode or for piped input.
///
/// Prints the title, message, and numbered buttons, then reads one line:
/// `1`/`2`/`3` (or an unambiguous prefix of a label) selects a button, an empty
/// line or end of input cancels. Unrecognized input is asked again.
pub struct StdioSurface<R, W> {
    input: R,
    output: W,
}

impl StdioSurface<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl StdioSurface<io::StdinLock<'static>, io::Stderr> {
    /// Dialog on stderr, leaving stdout for machine-readable output.
    pub fn stderr() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> StdioSurface<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn render(&mut self, request: &PromptRequest) -> io::Result<()> {
        writeln!(self.output, "{}", request.title)?;
        writeln!(self.output)?;
        writeln!(self.output, "{}", request.message)?;
        writeln!(self.output)?;
        for (i, (_, label)) in request.buttons().iter().enumerate() {
            writeln!(self.output, "  [{}] {label}", i + 1)?;
        }
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> ConfirmationSurface for StdioSurface<R, W> {
    fn present(&mut self, request: &PromptRequest) -> Result<PromptAction, String> {
        self.render(request)
            .map_err(|e| format!("failed to write prompt: {e}"))?;

        loop {
            write!(self.output, "> ")
                .and_then(|_| self.output.flush())
                .map_err(|e| format!("failed to write prompt: {e}"))?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| format!("failed to read answer: {e}"))?;
            if read == 0 {
                return Ok(PromptAction::Cancelled);
            }

            let answer = line.trim();
            if answer.is_empty() {
                return Ok(PromptAction::Cancelled);
            }
            if let Some(action) = parse_answer(request, answer) {
                return Ok(action);
            }
            writeln!(self.output, "Please answer 1, 2 or 3.")
                .map_err(|e| format!("failed to write prompt: {e}"))?;
        }
    }
}

fn parse_answer(request: &PromptRequest, answer: &str) -> Option<PromptAction> {
    let buttons = request.buttons();
    if let Ok(n) = answer.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| buttons.get(i)).map(|(a, _)| *a);
    }

    // Otherwise match a label prefix, but only when it is unambiguous.
    let answer = answer.to_lowercase();
    let mut matches = buttons
        .iter()
        .filter(|(_, label)| label.to_lowercase().starts_with(&answer));
    let hit = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(hit.0)
}
