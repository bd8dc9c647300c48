use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tracing::{debug, info};

use crate::app::App;
use crate::dispatcher::Command;
use crate::tui::AppEvent;

const WHEEL_STEP: usize = 3;

/// Apply one event to the app and return the work it asks for.
pub fn handle_event(app: &mut App, event: AppEvent) -> Vec<Command> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => {
            handle_mouse(app, mouse);
            Vec::new()
        }
        AppEvent::Resize(width, height) => {
            debug!(width, height, "terminal resized");
            app.resize(height);
            Vec::new()
        }
        AppEvent::Tick(tick) => app.on_tick(tick),
        AppEvent::Status(result) => {
            app.on_status_result(result);
            Vec::new()
        }
        AppEvent::Chat(result) => {
            app.on_chat_result(result);
            Vec::new()
        }
        AppEvent::Error(message) => {
            app.on_error(message);
            Vec::new()
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    matches!(key.code, KeyCode::Esc)
        || (ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')))
}

fn handle_key(app: &mut App, key: KeyEvent) -> Vec<Command> {
    if is_quit(&key) {
        info!(input = %app.input, "quit requested");
        app.quit();
        return Vec::new();
    }

    match key.code {
        KeyCode::Enter => return app.submit(),

        // Transcript scrolling
        KeyCode::Up => app.viewport.scroll_up(1),
        KeyCode::Down => app.viewport.scroll_down(1),
        KeyCode::PageUp => {
            let step = app.viewport.half_page();
            app.viewport.scroll_up(step);
        }
        KeyCode::PageDown => {
            let step = app.viewport.half_page();
            app.viewport.scroll_down(step);
        }

        // Line editing
        KeyCode::Backspace => app.delete_before_cursor(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.move_cursor_home(),
        KeyCode::End => app.move_cursor_end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.insert_char(c)
        }
        _ => {}
    }
    Vec::new()
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.viewport.scroll_up(WHEEL_STEP),
        MouseEventKind::ScrollDown => app.viewport.scroll_down(WHEEL_STEP),
        _ => return,
    }
    debug!(offset = app.viewport.offset(), "transcript scrolled");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use crate::error::ChatError;
    use crate::header::HeaderStatus;
    use crate::state::ChatMessage;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(handle_event(app, key(KeyCode::Char(c))).is_empty());
        }
    }

    #[test]
    fn test_typing_and_enter_submits() {
        let mut app = test_app();
        type_text(&mut app, "hello");
        assert_eq!(app.input, "hello");

        let commands = handle_event(&mut app, key(KeyCode::Enter));
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[1], Command::Complete(_)));
        assert!(app.waiting);
    }

    #[test]
    fn test_quit_keys() {
        for event in [key(KeyCode::Esc), ctrl('c'), ctrl('q')] {
            let mut app = test_app();
            type_text(&mut app, "draft");
            assert!(handle_event(&mut app, event).is_empty());
            assert!(app.should_quit);
            assert_eq!(app.quit_output.as_deref(), Some("draft"));
        }
    }

    #[test]
    fn test_plain_q_is_typed() {
        let mut app = test_app();
        type_text(&mut app, "q");
        assert!(!app.should_quit);
        assert_eq!(app.input, "q");
    }

    #[test]
    fn test_control_chars_are_not_inserted() {
        let mut app = test_app();
        handle_event(&mut app, ctrl('x'));
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_result_events_route_to_app() {
        let mut app = test_app();
        type_text(&mut app, "hi");
        handle_event(&mut app, key(KeyCode::Enter));

        assert!(handle_event(&mut app, AppEvent::Status(Ok(()))).is_empty());
        assert_eq!(app.header.status(), HeaderStatus::Succeeded);

        let reply = AppEvent::Chat(Ok(ChatMessage::assistant("hello")));
        assert!(handle_event(&mut app, reply).is_empty());
        assert!(!app.waiting);
        assert_eq!(app.history.len(), 2);
    }

    #[test]
    fn test_error_event_fills_error_slot() {
        let mut app = test_app();
        handle_event(&mut app, AppEvent::Error("oops".into()));
        assert_eq!(app.last_error.as_deref(), Some("oops"));

        handle_event(
            &mut app,
            AppEvent::Status(Err(ChatError::Connectivity("no route".into()))),
        );
        assert_eq!(app.header.status(), HeaderStatus::Failed);
    }

    #[test]
    fn test_scroll_keys_move_viewport() {
        let mut app = test_app();
        app.resize(11); // 3 visible rows
        for n in 0..3 {
            type_text(&mut app, &format!("q{}", n));
            handle_event(&mut app, key(KeyCode::Enter));
            handle_event(&mut app, AppEvent::Chat(Ok(ChatMessage::assistant("a"))));
        }
        assert!(app.viewport.at_bottom());
        let bottom = app.viewport.offset();

        handle_event(&mut app, key(KeyCode::Up));
        assert_eq!(app.viewport.offset(), bottom - 1);
        handle_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.viewport.offset(), bottom);
    }

    #[test]
    fn test_mouse_wheel_scrolls() {
        let mut app = test_app();
        app.resize(11);
        for n in 0..3 {
            type_text(&mut app, &format!("q{}", n));
            handle_event(&mut app, key(KeyCode::Enter));
            handle_event(&mut app, AppEvent::Chat(Ok(ChatMessage::assistant("a"))));
        }
        let bottom = app.viewport.offset();
        let wheel = |kind| {
            AppEvent::Mouse(MouseEvent {
                kind,
                column: 0,
                row: 0,
                modifiers: KeyModifiers::NONE,
            })
        };

        handle_event(&mut app, wheel(MouseEventKind::ScrollUp));
        assert_eq!(app.viewport.offset(), bottom - WHEEL_STEP);
        handle_event(&mut app, wheel(MouseEventKind::Moved));
        assert_eq!(app.viewport.offset(), bottom - WHEEL_STEP);
        handle_event(&mut app, wheel(MouseEventKind::ScrollDown));
        assert!(app.viewport.at_bottom());
    }

    #[test]
    fn test_resize_event() {
        let mut app = test_app();
        assert!(handle_event(&mut app, AppEvent::Resize(120, 18)).is_empty());
        assert_eq!(app.viewport.height(), 10);
    }
}
