use rollout::domain::value_objects::HealthWarning;

use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use crate::ui::widgets::r#box::{Box, BoxStyle};

/// Advisory health warning, boxed in the warning color
#[derive(Debug, Clone)]
pub struct WarningBlock {
    title: String,
    lines: Vec<String>,
}

impl WarningBlock {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn from_health(target: &str, warning: &HealthWarning) -> Self {
        let mut block = Self::new(format!("{target} @ {}: {}", warning.host, warning.kind));
        block.add_line(warning.detail.as_str());
        if let Some(suggestion) = &warning.suggestion {
            block.add_line(format!("suggested: {suggestion}"));
        }
        block
    }

    pub fn add_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn render(&self, supports_color: bool, supports_unicode: bool) -> String {
        let header = format!(
            "{} {}",
            Icon::Warning.colored(supports_color, supports_unicode),
            ColoredText::warning(self.title.as_str()).render(supports_color)
        );
        let mut b = Box::with_title(header).style(BoxStyle::Warning);
        for line in &self.lines {
            b.add_line(line.as_str());
        }
        b.render(supports_color, supports_unicode)
    }
}
