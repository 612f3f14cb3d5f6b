//! Host callbacks fired after the user answers the prompt.
//!
//! The orchestrator calls [`PromptListener::on_action`] once per answered
//! prompt, after the tracker state has been updated, so a listener always
//! observes the persisted result of the action it is told about.
//! Cancelled prompts are not reported.
//!
//! | Listener | Use case |
//! |----------|----------|
//! | [`NoopListener`] | No host reaction needed |
//! | [`LoggingListener`] | Structured logging via `tracing` |
//! | [`FnListener`] | Quick closures |
//! | Custom `impl PromptListener` | Full control (analytics hooks, UI updates) |

use tracing::info;

use crate::prompt::PromptAction;

pub trait PromptListener {
    fn on_action(&self, action: PromptAction) {
        let _ = action;
    }
}

pub struct NoopListener;
impl PromptListener for NoopListener {}

/// Wraps a closure as a listener.
///
/// ```
/// use apprater::listener::{FnListener, PromptListener};
/// use apprater::prompt::PromptAction;
///
/// let listener = FnListener::new(|action| println!("user chose {action:?}"));
/// listener.on_action(PromptAction::Defer);
/// ```
pub struct FnListener<F>(F)
where
    F: Fn(PromptAction);

impl<F> FnListener<F>
where
    F: Fn(PromptAction),
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> PromptListener for FnListener<F>
where
    F: Fn(PromptAction),
{
    fn on_action(&self, action: PromptAction) {
        (self.0)(action);
    }
}

pub struct LoggingListener;

impl PromptListener for LoggingListener {
    fn on_action(&self, action: PromptAction) {
        match action {
            PromptAction::Accept => info!("user chose to rate the app"),
            PromptAction::Defer => info!("user asked to be reminded later"),
            PromptAction::Decline => info!("user declined to rate the app"),
            PromptAction::Cancelled => info!("prompt closed without an answer"),
        }
    }
}
