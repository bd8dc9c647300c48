use ratatui::text::{Line, Span};

use crate::spinner::{self, Spinner, SpinnerTick};
use crate::theme;

/// Result of the one-shot connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStatus {
    Pending,
    Succeeded,
    Failed,
}

pub struct Header {
    model_name: String,
    spinner: Spinner,
    status: HeaderStatus,
}

impl Header {
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            spinner: Spinner::new(spinner::LINE),
            status: HeaderStatus::Pending,
        }
    }

    pub fn status(&self) -> HeaderStatus {
        self.status
    }

    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }

    /// Record the probe outcome. Only the first call has any effect.
    pub fn resolve(&mut self, ok: bool) -> bool {
        if self.status != HeaderStatus::Pending {
            return false;
        }
        self.status = if ok {
            HeaderStatus::Succeeded
        } else {
            HeaderStatus::Failed
        };
        true
    }

    /// Advance the spinner while the probe is outstanding. Returns the tick
    /// to schedule next, or `None` once the chain should stop.
    pub fn on_tick(&mut self, tick: SpinnerTick) -> Option<SpinnerTick> {
        if self.status != HeaderStatus::Pending || !self.spinner.advance(tick) {
            return None;
        }
        Some(self.spinner.tick())
    }

    /// Model name on the left, status glyph on the right, padded to `width`.
    pub fn view(&self, width: usize) -> Line<'static> {
        let (icon, style) = match self.status() {
            HeaderStatus::Pending => (self.spinner.view(), theme::fg(theme::HEADER)),
            HeaderStatus::Succeeded => ("✔", theme::fg(theme::RESPONSE)),
            HeaderStatus::Failed => ("✘", theme::error()),
        };
        let used = self.model_name.chars().count() + icon.chars().count();
        let padding = " ".repeat(width.saturating_sub(used));

        Line::from(vec![
            Span::styled(self.model_name.clone(), theme::fg(theme::HEADER)),
            Span::raw(padding),
            Span::styled(icon, style),
        ])
    }
}
