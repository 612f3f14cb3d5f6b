//! Rendering for the rating dialog.

use apprater::prompt::PromptRequest;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::DialogApp;

const DIALOG_MAX_WIDTH: u16 = 64;
const HINT: &str = "[←/→] move  [Enter] select  [1-3] answer  [Esc] close";

pub(crate) fn render(frame: &mut Frame, request: &PromptRequest, app: &DialogApp) {
    let screen = frame.area();
    let width = DIALOG_MAX_WIDTH.min(screen.width);
    // Borders (2) + padding (2) on each axis.
    let text_width = width.saturating_sub(4).max(1);
    // Room for the buttons and hint rows below the message.
    let height = wrapped_height(&request.message, text_width).saturating_add(4 + 4);
    let area = centered_rect(screen, width, height);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {} ", request.title))
        .title_alignment(Alignment::Center)
        .padding(Padding::uniform(1));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let message = Paragraph::new(request.message.as_str()).wrap(Wrap { trim: true });
    frame.render_widget(message, chunks[0]);

    frame.render_widget(buttons_line(request, app.cursor), chunks[1]);

    let hint = Paragraph::new(HINT)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, chunks[2]);
}

fn buttons_line<'a>(request: &'a PromptRequest, cursor: usize) -> Paragraph<'a> {
    let mut spans = Vec::new();
    for (i, (_, label)) in request.buttons().into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if i == cursor {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::styled(format!("[ {label} ]"), style));
    }
    Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
}

/// Rows `text` needs when word-wrapped at `width` columns, the way
/// `Wrap { trim: true }` lays it out: words move to the next row whole, and
/// only a word longer than a row is split. Counts characters, not display
/// cells.
fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let mut rows = 0usize;
    for line in text.lines() {
        let mut line_rows = 1usize;
        let mut used = 0usize;
        for word in line.split_whitespace() {
            let len = word.chars().count();
            if used > 0 && used + 1 + len > width {
                line_rows += 1;
                used = 0;
            }
            let end = if used == 0 { len } else { used + 1 + len };
            line_rows += (end - 1) / width;
            used = match end % width {
                0 => width,
                rest => rest,
            };
        }
        rows += line_rows;
    }
    u16::try_from(rows.max(1)).unwrap_or(u16::MAX)
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
