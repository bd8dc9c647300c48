use ratatui::style::{Color, Modifier, Style};

pub const PROMPT: Color = Color::Rgb(0xcd, 0xa9, 0xd6);
pub const PROMPT_TEXT: Color = Color::Rgb(0xfc, 0xfc, 0xfc);
pub const RESPONSE: Color = Color::Rgb(0xb7, 0xe4, 0xcf);
pub const RESPONSE_TEXT: Color = Color::Rgb(0xe2, 0xcd, 0xb5);
pub const SPINNER: Color = Color::Rgb(0xff, 0x00, 0xff);
pub const HEADER: Color = Color::Rgb(0x63, 0x63, 0x63);
pub const CODE: Color = Color::Rgb(0xe5, 0xc0, 0x7b);

pub const PROMPT_PREFIX: &str = "> ";
pub const RESPONSE_PREFIX: &str = "> ";

pub fn fg(color: Color) -> Style {
    Style::default().fg(color)
}

pub fn error() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

pub fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}
