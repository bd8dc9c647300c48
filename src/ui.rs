use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::theme;

const INPUT_PROMPT: &str = "┃ ";
const INPUT_PLACEHOLDER: &str = "...";

/// Rounded border whose top corners join the header above it.
const VIEWPORT_BORDER: border::Set = border::Set {
    top_left: "├",
    top_right: "┤",
    ..border::ROUNDED
};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Text width plus one column of padding and one of border on each side
    let width = (app.text_width + 4).min(area.width);
    let column = Rect { width, ..area };

    let [header_area, viewport_area, input_area, status_area, _] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(app.viewport.height() as u16 + 2),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(column);

    render_header(app, frame, header_area);
    render_viewport(app, frame, viewport_area);
    render_input(app, frame, input_area);
    render_status(app, frame, status_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
        .border_type(BorderType::Rounded)
        .border_style(theme::fg(theme::HEADER))
        .padding(Padding::horizontal(1));

    let inner_width = block.inner(area).width as usize;
    let header = Paragraph::new(app.header.view(inner_width)).block(block);
    frame.render_widget(header, area);
}

fn render_viewport(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(VIEWPORT_BORDER)
        .padding(Padding::left(1));

    // Lines are already wrapped; no further wrapping here
    let transcript = Paragraph::new(app.viewport.visible_lines()).block(block);
    frame.render_widget(transcript, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    // Inner width minus the prompt glyph
    let prompt_width = INPUT_PROMPT.chars().count();
    let inner_width = (area.width.saturating_sub(2) as usize).saturating_sub(prompt_width);
    let cursor_pos = app.cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let content = if app.input.is_empty() {
        Span::styled(INPUT_PLACEHOLDER, theme::dim())
    } else {
        let visible_text: String = app
            .input
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Span::raw(visible_text)
    };

    let line = Line::from(vec![
        Span::styled(INPUT_PROMPT, theme::fg(theme::PROMPT)),
        content,
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);

    let cursor_x = (prompt_width + cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1));
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let line = match &app.last_error {
        Some(error) => Line::from(Span::styled(format!(" {}", error), theme::error())),
        None if app.waiting => Line::from(Span::styled(" waiting for reply…", theme::dim())),
        None if app.transcript.is_empty() => Line::from(Span::styled(
            " type a message and press enter · esc quit",
            theme::dim(),
        )),
        None => Line::from(Span::styled(
            " enter send · ↑/↓ scroll · esc quit",
            theme::dim(),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}
