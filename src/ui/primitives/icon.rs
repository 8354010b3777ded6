use crossterm::style::Stylize;

use crate::ui::theme::{colors, icons, icons_ascii};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Success,
    Error,
    Warning,
    Aborted,
    Stage,
    Hint,
    Update,
    Restart,
    Check,
    Merge,
    Build,
    Exec,
    Report,
}

impl Icon {
    pub fn render(&self, supports_unicode: bool) -> &'static str {
        let (unicode, ascii) = match self {
            Icon::Success => (icons::SUCCESS, icons_ascii::SUCCESS),
            Icon::Error => (icons::ERROR, icons_ascii::ERROR),
            Icon::Warning => (icons::WARNING, icons_ascii::WARNING),
            Icon::Aborted => (icons::ABORTED, icons_ascii::ABORTED),
            Icon::Stage => (icons::STAGE, icons_ascii::STAGE),
            Icon::Hint => (icons::HINT, icons_ascii::HINT),
            Icon::Update => (icons::UPDATE, icons_ascii::UPDATE),
            Icon::Restart => (icons::RESTART, icons_ascii::RESTART),
            Icon::Check => (icons::CHECK, icons_ascii::CHECK),
            Icon::Merge => (icons::MERGE, icons_ascii::MERGE),
            Icon::Build => (icons::BUILD, icons_ascii::BUILD),
            Icon::Exec => (icons::EXEC, icons_ascii::EXEC),
            Icon::Report => (icons::REPORT, icons_ascii::REPORT),
        };
        if supports_unicode {
            unicode
        } else {
            ascii
        }
    }

    pub fn colored(&self, supports_color: bool, supports_unicode: bool) -> String {
        let s = self.render(supports_unicode);
        if !supports_color {
            return s.to_string();
        }
        let color = match self {
            Icon::Success => colors::SUCCESS,
            Icon::Error => colors::ERROR,
            Icon::Warning | Icon::Hint => colors::WARNING,
            Icon::Aborted | Icon::Stage => colors::DIM,
            Icon::Update
            | Icon::Restart
            | Icon::Check
            | Icon::Merge
            | Icon::Build
            | Icon::Exec
            | Icon::Report => colors::INFO,
        };
        s.with(color).to_string()
    }
}
