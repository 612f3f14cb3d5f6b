//! Key handling for the rating dialog.

use apprater::prompt::PromptRequest;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::DialogApp;

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut DialogApp, request: &PromptRequest) {
    // Release/repeat events arrive on some platforms; act on presses only.
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Ctrl+C closes the dialog like Esc.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.cancel();
        return;
    }

    match key.code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => app.move_left(),
        KeyCode::Right | KeyCode::Char('l') => app.move_right(),
        KeyCode::Tab => app.cycle(),
        KeyCode::Enter | KeyCode::Char(' ') => app.confirm(request),
        KeyCode::Char(c @ '1'..='3') => {
            let index = c as usize - '1' as usize;
            app.select(request, index);
        }
        KeyCode::Esc | KeyCode::Char('q') => app.cancel(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apprater::prompt::PromptAction;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn run(keys: &[KeyCode]) -> DialogApp {
        let request = PromptRequest::default();
        let mut app = DialogApp::new();
        for &code in keys {
            handle_key_event(press(code), &mut app, &request);
        }
        app
    }

    #[test]
    fn enter_selects_highlighted_button() {
        assert_eq!(run(&[KeyCode::Enter]).result, Some(PromptAction::Accept));
        assert_eq!(
            run(&[KeyCode::Right, KeyCode::Enter]).result,
            Some(PromptAction::Defer)
        );
        assert_eq!(
            run(&[KeyCode::Right, KeyCode::Right, KeyCode::Right, KeyCode::Enter]).result,
            Some(PromptAction::Decline)
        );
    }

    #[test]
    fn left_stops_at_first_button() {
        let app = run(&[KeyCode::Left, KeyCode::Left]);
        assert_eq!(app.cursor, 0);
        assert!(app.result.is_none());
    }

    #[test]
    fn tab_wraps() {
        let app = run(&[KeyCode::Tab, KeyCode::Tab, KeyCode::Tab]);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn digits_answer_directly() {
        assert_eq!(run(&[KeyCode::Char('2')]).result, Some(PromptAction::Defer));
        assert_eq!(run(&[KeyCode::Char('3')]).result, Some(PromptAction::Decline));
        assert!(run(&[KeyCode::Char('4')]).result.is_none());
    }

    #[test]
    fn escape_and_ctrl_c_cancel() {
        assert_eq!(run(&[KeyCode::Esc]).result, Some(PromptAction::Cancelled));
        assert_eq!(run(&[KeyCode::Char('q')]).result, Some(PromptAction::Cancelled));

        let request = PromptRequest::default();
        let mut app = DialogApp::new();
        handle_key_event(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut app,
            &request,
        );
        assert_eq!(app.result, Some(PromptAction::Cancelled));
    }

    #[test]
    fn release_events_are_ignored() {
        let request = PromptRequest::default();
        let mut app = DialogApp::new();
        let mut key = press(KeyCode::Enter);
        key.kind = KeyEventKind::Release;
        handle_key_event(key, &mut app, &request);
        assert!(app.result.is_none());
    }
}
