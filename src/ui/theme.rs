use crossterm::style::Color;

/// Design tokens for the rollout console.
///
/// Every color, icon and border character used by `ui` comes from here.
pub mod colors {
    use super::Color;

    pub const SUCCESS: Color = Color::Green;
    /// Fatal errors only
    pub const ERROR: Color = Color::Red;
    /// Advisory warnings and declined gates
    pub const WARNING: Color = Color::Yellow;
    pub const INFO: Color = Color::Cyan;
    pub const DIM: Color = Color::DarkGrey;
    /// Duplicate changelog lines in a diff
    pub const HIGHLIGHT: Color = Color::Magenta;
}

pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const ABORTED: &str = "○";
    pub const STAGE: &str = "●";
    pub const HINT: &str = "💡";

    pub const UPDATE: &str = "📦";
    pub const RESTART: &str = "⟳";
    pub const CHECK: &str = "🔍";
    pub const MERGE: &str = "⑂";
    pub const BUILD: &str = "📦";
    pub const EXEC: &str = "›";
    pub const REPORT: &str = "📣";
}

pub mod icons_ascii {
    pub const SUCCESS: &str = "[OK]";
    pub const ERROR: &str = "[FAIL]";
    pub const WARNING: &str = "[WARN]";
    pub const ABORTED: &str = "[SKIP]";
    pub const STAGE: &str = "*";
    pub const HINT: &str = "[HINT]";

    pub const UPDATE: &str = "[UPDATE]";
    pub const RESTART: &str = "[RESTART]";
    pub const CHECK: &str = "[CHECK]";
    pub const MERGE: &str = "[MERGE]";
    pub const BUILD: &str = "[BUILD]";
    pub const EXEC: &str = "[EXEC]";
    pub const REPORT: &str = "[REPORT]";
}

/// Box corners and edges: top-left, top-right, bottom-left, bottom-right,
/// horizontal, vertical
pub const BORDERS: [&str; 6] = ["╭", "╮", "╰", "╯", "─", "│"];
pub const BORDERS_ASCII: [&str; 6] = ["+", "+", "+", "+", "-", "|"];
