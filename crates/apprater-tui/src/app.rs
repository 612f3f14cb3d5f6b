//! Dialog-local state.

use apprater::prompt::{PromptAction, PromptRequest};

/// Number of buttons on the rating dialog.
pub(crate) const BUTTON_COUNT: usize = 3;

pub(crate) struct DialogApp {
    /// Highlighted button, left to right.
    pub(crate) cursor: usize,
    /// Set once the user has answered; ends the event loop.
    pub(crate) result: Option<PromptAction>,
}

impl DialogApp {
    pub(crate) fn new() -> Self {
        Self {
            cursor: 0,
            result: None,
        }
    }

    pub(crate) fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub(crate) fn move_right(&mut self) {
        if self.cursor + 1 < BUTTON_COUNT {
            self.cursor += 1;
        }
    }

    /// Tab order wraps around; arrows stop at the edges.
    pub(crate) fn cycle(&mut self) {
        self.cursor = (self.cursor + 1) % BUTTON_COUNT;
    }

    /// Answer with the button at `index`, if there is one.
    pub(crate) fn select(&mut self, request: &PromptRequest, index: usize) {
        if let Some((action, _)) = request.buttons().get(index) {
            self.cursor = index;
            self.result = Some(*action);
        }
    }

    pub(crate) fn confirm(&mut self, request: &PromptRequest) {
        self.select(request, self.cursor);
    }

    pub(crate) fn cancel(&mut self) {
        self.result = Some(PromptAction::Cancelled);
    }
}
