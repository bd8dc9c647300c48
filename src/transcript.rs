//! The displayed chat log and the pure pipeline that turns it into viewport
//! lines.
//!
//! Every [`Message`] is rendered once, when it is created: wrapped to the text
//! width, run through the markdown renderer and given its role prefix. The
//! only entry ever replaced is a trailing assistant placeholder.

use ratatui::text::{Line, Span};

use crate::markdown;
use crate::state::ChatRole;
use crate::theme;

/// Columns reserved for the border and prefix glyphs.
pub const WRAP_MARGIN: usize = 3;

/// Keeps the final separator line from being trimmed away.
pub const ZERO_WIDTH_MARKER: &str = "\u{200e}";

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    role: ChatRole,
    rendered: Vec<Line<'static>>,
    placeholder: bool,
}

impl Message {
    pub fn user(text: &str, text_width: usize) -> Self {
        Self::rendered(ChatRole::User, text, text_width)
    }

    pub fn assistant(text: &str, text_width: usize) -> Self {
        Self::rendered(ChatRole::Assistant, text, text_width)
    }

    /// The "assistant is typing" entry, showing one spinner frame.
    pub fn placeholder(frame: &str) -> Self {
        let line = Line::from(vec![
            Span::styled(theme::RESPONSE_PREFIX, theme::fg(theme::RESPONSE)),
            Span::styled(frame.to_string(), theme::fg(theme::SPINNER)),
        ]);
        Self {
            role: ChatRole::Assistant,
            rendered: vec![line],
            placeholder: true,
        }
    }

    fn rendered(role: ChatRole, text: &str, text_width: usize) -> Self {
        let (prefix, prefix_style, body_style) = match role {
            ChatRole::User => (
                theme::PROMPT_PREFIX,
                theme::fg(theme::PROMPT),
                theme::fg(theme::PROMPT_TEXT),
            ),
            ChatRole::Assistant => (
                theme::RESPONSE_PREFIX,
                theme::fg(theme::RESPONSE),
                theme::fg(theme::RESPONSE_TEXT),
            ),
        };

        let wrapped = wrap_for_markdown(text, wrap_width(text_width));
        let body = markdown::render(&wrapped, body_style);
        let indent = " ".repeat(prefix.chars().count());

        let mut rendered = Vec::with_capacity(body.len().max(1));
        if body.is_empty() {
            rendered.push(Line::from(Span::styled(prefix, prefix_style)));
        }
        for (i, line) in body.into_iter().enumerate() {
            let lead = if i == 0 {
                Span::styled(prefix, prefix_style)
            } else {
                Span::raw(indent.clone())
            };
            let mut spans = vec![lead];
            spans.extend(line.spans);
            rendered.push(Line::from(spans));
        }

        Self {
            role,
            rendered,
            placeholder: false,
        }
    }

    pub fn role(&self) -> ChatRole {
        self.role
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.rendered
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Append-only message list with at most one trailing placeholder.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn has_placeholder(&self) -> bool {
        self.last().is_some_and(Message::is_placeholder)
    }

    /// Start a turn: the user's message followed by a pending reply.
    pub fn begin_turn(&mut self, user: Message, placeholder: Message) {
        debug_assert!(!self.has_placeholder());
        debug_assert!(placeholder.is_placeholder());
        self.messages.push(user);
        self.messages.push(placeholder);
    }

    /// Swap the trailing placeholder for `message`. Returns false, leaving
    /// the transcript untouched, if there is no placeholder to replace.
    pub fn replace_placeholder(&mut self, message: Message) -> bool {
        debug_assert_eq!(message.role(), ChatRole::Assistant);
        match self.messages.last_mut() {
            Some(last) if last.is_placeholder() => {
                *last = message;
                true
            }
            _ => false,
        }
    }

    /// Keep the trailing placeholder on screen as it is, but stop treating it
    /// as pending. Used when a reply fails.
    pub fn settle_placeholder(&mut self) -> bool {
        match self.messages.last_mut() {
            Some(last) if last.is_placeholder() => {
                last.placeholder = false;
                true
            }
            _ => false,
        }
    }
}

/// Width available to message text inside the viewport.
pub fn wrap_width(text_width: usize) -> usize {
    text_width.saturating_sub(WRAP_MARGIN).max(1)
}

/// Word-wrap to `width` columns. Applying it twice changes nothing.
pub fn wrap_text(text: &str, width: usize) -> String {
    textwrap::fill(text, width.max(1))
}

/// Wrap each source line, escaping block markers at the start of lines the
/// wrap created so they stay in their paragraph. Fenced code is left alone.
fn wrap_for_markdown(text: &str, width: usize) -> String {
    let mut out = Vec::new();
    let mut in_fence = false;
    for source in text.lines() {
        let trimmed = source.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        }
        let wrapped = wrap_text(source, width);
        if wrapped.is_empty() {
            out.push(String::new());
        }
        for (i, line) in wrapped.lines().enumerate() {
            if i > 0 && !in_fence {
                out.push(escape_block_marker(line));
            } else {
                out.push(line.to_string());
            }
        }
    }
    out.join("\n")
}

fn escape_block_marker(line: &str) -> String {
    match line.chars().next() {
        Some('-' | '+' | '*' | '#' | '>' | '=' | '|') => format!("\\{}", line),
        Some(c) if c.is_ascii_digit() => {
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            match line[digits..].chars().next() {
                Some('.' | ')') => format!("{}\\{}", &line[..digits], &line[digits..]),
                _ => line.to_string(),
            }
        }
        _ => line.to_string(),
    }
}

/// Lay out the whole transcript for the viewport.
pub fn render_transcript(messages: &[Message]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.extend(message.lines().iter().cloned());
    }
    lines.push(Line::raw(ZERO_WIDTH_MARKER));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_user_message_has_prefix() {
        let msg = Message::user("hello", 80);
        assert_eq!(plain(msg.lines()), vec!["> hello"]);
        assert_eq!(msg.role(), ChatRole::User);
        assert!(!msg.is_placeholder());
    }

    #[test]
    fn test_long_message_wraps_and_indents() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let msg = Message::assistant(text, 23);
        let lines = plain(msg.lines());
        assert!(lines.len() > 1);
        assert!(lines[0].starts_with("> "));
        for line in &lines[1..] {
            assert!(line.starts_with("  "));
        }
        for line in &lines {
            assert!(line.chars().count() <= 20 + 2, "too wide: {:?}", line);
        }
    }

    #[test]
    fn test_wrap_is_stable() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(6);
        let once = wrap_text(text.trim(), 30);
        let twice = wrap_text(&once, 30);
        assert_eq!(once, twice);
        assert!(once.lines().all(|l| l.chars().count() <= 30));
    }

    #[test]
    fn test_wrapped_dash_stays_in_paragraph() {
        let text = format!("{} - 3 dollars", "x".repeat(76));
        let msg = Message::user(&text, 80);
        assert_eq!(
            plain(msg.lines()),
            vec![format!("> {}", "x".repeat(76)), "  - 3 dollars".to_string()]
        );
    }

    #[test]
    fn test_wrapped_number_is_not_a_list() {
        let text = format!("{} 3. ok", "x".repeat(76));
        let msg = Message::assistant(&text, 80);
        assert_eq!(plain(msg.lines())[1], "  3. ok");
    }

    #[test]
    fn test_written_list_still_renders_as_list() {
        let msg = Message::assistant("- one\n- two", 80);
        assert_eq!(plain(msg.lines()), vec!["> • one", "  • two"]);
    }

    #[test]
    fn test_escape_block_marker() {
        assert_eq!(escape_block_marker("- a"), "\\- a");
        assert_eq!(escape_block_marker("12) b"), "12\\) b");
        assert_eq!(escape_block_marker("12 apples"), "12 apples");
        assert_eq!(escape_block_marker("plain"), "plain");
    }

    #[test]
    fn test_wrap_width_leaves_margin() {
        assert_eq!(wrap_width(80), 77);
        assert_eq!(wrap_width(2), 1);
    }

    #[test]
    fn test_placeholder_shows_frame() {
        let msg = Message::placeholder("⠋");
        assert!(msg.is_placeholder());
        assert_eq!(plain(msg.lines()), vec!["> ⠋"]);
    }

    #[test]
    fn test_replace_placeholder_only_replaces_trailing_placeholder() {
        let mut transcript = Transcript::new();
        assert!(!transcript.replace_placeholder(Message::assistant("x", 80)));

        transcript.begin_turn(Message::user("hi", 80), Message::placeholder("|"));
        assert!(transcript.has_placeholder());
        assert!(transcript.replace_placeholder(Message::assistant("hello", 80)));
        assert!(!transcript.has_placeholder());
        assert_eq!(transcript.len(), 2);

        assert!(!transcript.replace_placeholder(Message::assistant("again", 80)));
        assert_eq!(
            transcript.last().map(|m| plain(m.lines())),
            Some(vec!["> hello".to_string()])
        );
    }

    #[test]
    fn test_settled_placeholder_keeps_its_lines() {
        let mut transcript = Transcript::new();
        transcript.begin_turn(Message::user("hi", 80), Message::placeholder("⠹"));
        let before = transcript.last().unwrap().lines().to_vec();

        assert!(transcript.settle_placeholder());
        assert!(!transcript.has_placeholder());
        assert_eq!(transcript.last().unwrap().lines(), before.as_slice());
        assert!(!transcript.settle_placeholder());

        transcript.begin_turn(Message::user("again", 80), Message::placeholder("⠋"));
        assert_eq!(transcript.len(), 4);
    }

    #[test]
    fn test_render_transcript_joins_and_marks_end() {
        let mut transcript = Transcript::new();
        transcript.begin_turn(Message::user("hello", 80), Message::placeholder("|"));

        let lines = render_transcript(transcript.messages());
        assert_eq!(plain(&lines), vec!["> hello", "", "> |", ZERO_WIDTH_MARKER]);
    }

    #[test]
    fn test_render_transcript_is_idempotent() {
        let mut transcript = Transcript::new();
        transcript.begin_turn(
            Message::user("what is **rust**?", 40),
            Message::placeholder("⠙"),
        );
        transcript.replace_placeholder(Message::assistant(
            "A systems language.\n\n- fast\n- safe",
            40,
        ));

        let first = render_transcript(transcript.messages());
        let second = render_transcript(transcript.messages());
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_transcript_renders_marker_only() {
        assert_eq!(plain(&render_transcript(&[])), vec![ZERO_WIDTH_MARKER]);
    }
}
