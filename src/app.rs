use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::dispatcher::Command;
use crate::error::ChatError;
use crate::header::Header;
use crate::spinner::{self, Spinner, SpinnerTick};
use crate::state::ChatMessage;
use crate::transcript::{render_transcript, Message, Transcript};
use crate::viewport::Viewport;

/// Rows taken by everything except the transcript: header (2), transcript
/// borders (2), input box (3) and the status line (1).
pub const CHROME_HEIGHT: u16 = 8;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub quit_output: Option<String>,

    // Conversation state
    pub transcript: Transcript,
    pub history: Vec<ChatMessage>,
    pub pending_prompt: Option<String>,
    pub waiting: bool,
    pub spinner: Spinner,
    pub last_error: Option<String>,

    // Header
    pub header: Header,

    // Viewport state
    pub viewport: Viewport,
    pub text_width: u16,
    pub max_viewport_height: u16,

    // Input state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars
    pub char_limit: usize,
}

impl App {
    pub fn new(settings: &Settings) -> Self {
        let mut app = Self {
            should_quit: false,
            quit_output: None,

            transcript: Transcript::new(),
            history: Vec::new(),
            pending_prompt: None,
            waiting: false,
            spinner: Spinner::new(spinner::MINI_DOT),
            last_error: None,

            header: Header::new(&settings.model),

            viewport: Viewport::new(settings.viewport_height),
            text_width: settings.text_width,
            max_viewport_height: settings.viewport_height,

            input: String::new(),
            cursor: 0,
            char_limit: settings.char_limit,
        };
        app.refresh_viewport();
        app
    }

    /// Work to start before the first event: the probe and its spinner.
    pub fn init_commands(&self) -> Vec<Command> {
        vec![Command::Probe, Command::Tick(self.header.spinner().tick())]
    }

    /// Re-derive the viewport content from the transcript.
    pub fn refresh_viewport(&mut self) {
        self.viewport
            .set_content(render_transcript(self.transcript.messages()));
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
        self.quit_output = Some(self.input.clone());
    }

    /// Send the input box contents as a new user turn.
    pub fn submit(&mut self) -> Vec<Command> {
        if self.waiting {
            debug!("ignoring submit while a reply is pending");
            return Vec::new();
        }

        let message = self.input.trim().to_string();
        if message.is_empty() {
            return Vec::new();
        }
        debug!(message = %message, turns = self.transcript.len() / 2, "submitting message");

        let width = self.text_width as usize;
        let tick = self.spinner.restart();
        self.transcript.begin_turn(
            Message::user(&message, width),
            Message::placeholder(self.spinner.view()),
        );
        self.refresh_viewport();
        debug!(lines = self.viewport.total_line_count(), "viewport updated");

        self.input.clear();
        self.cursor = 0;
        self.viewport.goto_bottom();
        self.waiting = true;

        let mut outgoing = self.history.clone();
        outgoing.push(ChatMessage::user(message.clone()));
        self.pending_prompt = Some(message);

        vec![Command::Tick(tick), Command::Complete(outgoing)]
    }

    /// Route a spinner tick to its owner; unknown and stale ticks are dropped.
    pub fn on_tick(&mut self, tick: SpinnerTick) -> Vec<Command> {
        if tick.id == self.spinner.id() {
            if !self.waiting || !self.spinner.advance(tick) {
                return Vec::new();
            }
            self.transcript
                .replace_placeholder(Message::placeholder(self.spinner.view()));
            self.refresh_viewport();
            self.viewport.goto_bottom();
            vec![Command::Tick(self.spinner.tick())]
        } else if tick.id == self.header.spinner().id() {
            self.header.on_tick(tick).map(Command::Tick).into_iter().collect()
        } else {
            debug!(?tick, "dropping tick for unknown spinner");
            Vec::new()
        }
    }

    pub fn on_chat_result(&mut self, result: Result<ChatMessage, ChatError>) {
        if !self.waiting {
            warn!("dropping chat result with no request outstanding");
            return;
        }
        self.waiting = false;
        let prompt = self.pending_prompt.take();

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "chat completion failed");
                self.transcript.settle_placeholder();
                self.last_error = Some(e.to_string());
                return;
            }
        };
        debug!(lines = reply.content.lines().count(), "reply received");

        let width = self.text_width as usize;
        self.transcript
            .replace_placeholder(Message::assistant(&reply.content, width));
        if let Some(prompt) = prompt {
            self.history.push(ChatMessage::user(prompt));
        }
        self.history.push(ChatMessage::assistant(reply.content));
        self.last_error = None;

        self.refresh_viewport();
        debug!(lines = self.viewport.total_line_count(), "viewport updated");
        self.viewport.goto_bottom();
    }

    pub fn on_status_result(&mut self, result: Result<(), ChatError>) {
        if !self.header.resolve(result.is_ok()) {
            debug!("ignoring repeated status result");
            return;
        }
        match result {
            Ok(()) => info!("backend reachable"),
            Err(e) => {
                warn!(error = %e, "backend unreachable");
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn on_error(&mut self, message: String) {
        warn!(error = %message, "error event");
        self.last_error = Some(message);
    }

    /// Fit the transcript window to the terminal, up to the configured height.
    pub fn resize(&mut self, height: u16) {
        let available = height.saturating_sub(CHROME_HEIGHT).max(1);
        self.viewport
            .set_height(available.min(self.max_viewport_height));
    }

    // Input editing helpers

    pub fn insert_char(&mut self, c: char) {
        if self.input.chars().count() >= self.char_limit {
            return;
        }
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
