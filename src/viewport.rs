use ratatui::text::Line;

/// Scrollable window over the rendered transcript.
///
/// Content shorter than the window sits at the bottom, so a fresh chat grows
/// upward from the input box.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    lines: Vec<Line<'static>>,
    offset: usize,
    height: usize,
}

impl Viewport {
    pub fn new(height: u16) -> Self {
        Self {
            lines: Vec::new(),
            offset: 0,
            height: height as usize,
        }
    }

    pub fn set_content(&mut self, lines: Vec<Line<'static>>) {
        self.lines = lines;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn set_height(&mut self, height: u16) {
        let was_at_bottom = self.at_bottom();
        self.height = height as usize;
        self.offset = if was_at_bottom {
            self.max_offset()
        } else {
            self.offset.min(self.max_offset())
        };
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn total_line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.height)
    }

    pub fn at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    pub fn goto_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    pub fn half_page(&self) -> usize {
        (self.height / 2).max(1)
    }

    /// Exactly `height` lines (fewer only if the window is empty), padded at
    /// the top when the content is short.
    pub fn visible_lines(&self) -> Vec<Line<'static>> {
        let end = (self.offset + self.height).min(self.lines.len());
        let shown = &self.lines[self.offset.min(end)..end];
        let padding = self.height.saturating_sub(shown.len());

        let mut out = Vec::with_capacity(self.height);
        out.extend(std::iter::repeat(Line::default()).take(padding));
        out.extend(shown.iter().cloned());
        out
    }
}
