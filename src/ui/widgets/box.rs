use std::borrow::Cow;

use crossterm::style::Stylize;
use unicode_width::UnicodeWidthStr;

use crate::ui::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxStyle {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl BoxStyle {
    fn paint(self, s: &str, supports_color: bool) -> String {
        if !supports_color {
            return s.to_string();
        }
        let color = match self {
            BoxStyle::Info => theme::colors::INFO,
            BoxStyle::Success => theme::colors::SUCCESS,
            BoxStyle::Warning => theme::colors::WARNING,
            BoxStyle::Error => theme::colors::ERROR,
        };
        s.with(color).to_string()
    }
}

/// Bordered block of lines; width follows the widest visible line
#[derive(Debug, Default, Clone)]
pub struct Box {
    title: Option<String>,
    content: Vec<String>,
    style: BoxStyle,
}

impl Box {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn style(mut self, style: BoxStyle) -> Self {
        self.style = style;
        self
    }

    pub fn add_line(&mut self, line: impl Into<String>) {
        self.content
            .extend(line.into().lines().map(str::to_string));
    }

    pub fn add_empty(&mut self) {
        self.content.push(String::new());
    }

    pub fn render(&self, supports_color: bool, supports_unicode: bool) -> String {
        let [tl, tr, bl, br, h, v] = if supports_unicode {
            theme::BORDERS
        } else {
            theme::BORDERS_ASCII
        };

        let rows: Vec<&str> = self
            .title
            .iter()
            .map(String::as_str)
            .chain(self.content.iter().map(String::as_str))
            .collect();
        let inner = rows.iter().map(|r| visible_width(r)).max().unwrap_or(0) + 2;

        let edge = self.style.paint(v, supports_color);
        let mut out = String::new();
        out.push_str(&self.style.paint(&format!("{tl}{}{tr}", h.repeat(inner)), supports_color));
        out.push('\n');
        for row in rows {
            let pad = inner - 1 - visible_width(row);
            out.push_str(&format!("{edge} {row}{}{edge}\n", " ".repeat(pad)));
        }
        out.push_str(&self.style.paint(&format!("{bl}{}{br}", h.repeat(inner)), supports_color));
        out.push('\n');
        out
    }
}

fn visible_width(s: &str) -> usize {
    strip_ansi(s).width()
}

/// Drop `ESC [ ... <letter>` sequences so colored text measures correctly
fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\u{1b}') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            out.push(c);
            continue;
        }
        for next in chars.by_ref() {
            if next.is_ascii_alphabetic() {
                break;
            }
        }
    }
    Cow::Owned(out)
}
