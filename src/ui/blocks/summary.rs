use rollout::{Outcome, RunSummary};

use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use crate::ui::widgets::r#box::{Box, BoxStyle};

/// End-of-run table of per-target outcomes
#[derive(Debug, Clone)]
pub struct OutcomeSummary {
    title: String,
    rows: Vec<(String, OutcomeRow)>,
}

#[derive(Debug, Clone)]
enum OutcomeRow {
    Done,
    Aborted(String),
    Failed(String),
}

impl OutcomeSummary {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    pub fn from_outcomes<'a>(
        title: impl Into<String>,
        outcomes: impl IntoIterator<Item = &'a (String, Outcome)>,
    ) -> Self {
        let mut summary = Self::new(title);
        for (name, outcome) in outcomes {
            summary.add(name, outcome);
        }
        summary
    }

    pub fn from_run(title: impl Into<String>, run: &RunSummary) -> Self {
        Self::from_outcomes(title, &run.outcomes)
    }

    pub fn add(&mut self, name: &str, outcome: &Outcome) {
        let row = match outcome {
            Outcome::Done => OutcomeRow::Done,
            Outcome::Aborted { stage, reason } => OutcomeRow::Aborted(format!("{reason} ({stage})")),
            Outcome::Failed { stage, error } => OutcomeRow::Failed(format!("{stage}: {error}")),
        };
        self.rows.push((name.to_string(), row));
    }

    fn failed(&self) -> bool {
        self.rows.iter().any(|(_, r)| matches!(r, OutcomeRow::Failed(_)))
    }

    pub fn render(&self, supports_color: bool, supports_unicode: bool) -> String {
        let (style, icon, title) = if self.failed() {
            (
                BoxStyle::Error,
                Icon::Error,
                ColoredText::error(self.title.as_str()),
            )
        } else {
            (
                BoxStyle::Success,
                Icon::Success,
                ColoredText::success(self.title.as_str()),
            )
        };

        let mut b = Box::with_title(format!(
            "{} {}",
            icon.colored(supports_color, supports_unicode),
            title.bold().render(supports_color)
        ))
        .style(style);
        b.add_empty();

        for (name, row) in &self.rows {
            let line = match row {
                OutcomeRow::Done => format!(
                    "{} {name}",
                    Icon::Success.colored(supports_color, supports_unicode)
                ),
                OutcomeRow::Aborted(why) => format!(
                    "{} {name} {}",
                    Icon::Aborted.colored(supports_color, supports_unicode),
                    ColoredText::dim(why.as_str()).render(supports_color)
                ),
                OutcomeRow::Failed(why) => format!(
                    "{} {name} {}",
                    Icon::Error.colored(supports_color, supports_unicode),
                    ColoredText::error(why.as_str()).render(supports_color)
                ),
            };
            b.add_line(line);
        }

        b.render(supports_color, supports_unicode)
    }
}
