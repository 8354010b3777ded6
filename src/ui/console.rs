//! Console Event Sink
//!
//! Human-readable rendering of deploy events. Lines from concurrently
//! running targets are written under one lock and carry the target name.

use std::io::{self, Write};
use std::sync::Mutex;

use rollout::domain::ports::{DeployEvent, DeployEventSink};
use rollout::domain::services::changelog;
use rollout::OutcomeKind;

use crate::ui::blocks::header::CommandHeader;
use crate::ui::blocks::warning::WarningBlock;
use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

pub struct ConsoleEventSink {
    ui: UiContext,
    icon: Icon,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleEventSink {
    pub fn stdout(ui: UiContext, icon: Icon) -> Self {
        Self::with_writer(ui, icon, io::stdout())
    }

    pub fn with_writer<W: Write + Send + 'static>(ui: UiContext, icon: Icon, writer: W) -> Self {
        Self {
            ui,
            icon,
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write(&self, text: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.write_all(text.as_bytes());
            if !text.ends_with('\n') {
                let _ = writer.write_all(b"\n");
            }
            let _ = writer.flush();
        }
    }

    fn icon(&self, icon: Icon) -> String {
        icon.colored(self.ui.color, self.ui.unicode)
    }

    fn render(&self, event: DeployEvent) -> String {
        let color = self.ui.color;
        match event {
            DeployEvent::TargetStarted { target, hosts } => {
                let mut header = CommandHeader::new(self.icon, target);
                header.add("hosts", hosts.join(", "));
                format!("\n{}", header.render(color, self.ui.unicode))
            }

            DeployEvent::StageStarted { target, stage } => format!(
                "{} {}",
                self.icon(Icon::Stage),
                ColoredText::dim(format!("{target}: {stage}")).render(color)
            ),

            DeployEvent::Finding {
                target,
                name,
                result,
            } => {
                let mut out = format!(
                    "{} {}",
                    ColoredText::info(format!("[{target}] {name}:")).render(color),
                    result.title
                );
                for line in result.description.lines() {
                    out.push_str(&format!("\n    {line}"));
                }
                out
            }

            DeployEvent::UpdatePlan {
                target,
                tagline,
                local_tag,
                origin_tag,
                violations,
            } => {
                let mut out = format!(
                    "{} {}\n  {} {} {} {}",
                    ColoredText::info(format!("[{target}]")).render(color),
                    ColoredText::plain(tagline).bold().render(color),
                    ColoredText::dim("local:").render(color),
                    local_tag,
                    ColoredText::dim("origin:").render(color),
                    origin_tag
                );
                for violation in violations {
                    out.push_str(&format!(
                        "\n  {} {}",
                        self.icon(Icon::Error),
                        ColoredText::error(violation).render(color)
                    ));
                }
                out
            }

            DeployEvent::Hint { target, message } => format!(
                "{} {}",
                self.icon(Icon::Hint),
                ColoredText::warning(format!("[{target}] {message}")).render(color)
            ),

            DeployEvent::CommandOutput {
                target,
                host,
                title,
                output,
            } => {
                let dups = if title.contains("CHANGELOG.md") {
                    changelog::duplicates(&output)
                } else {
                    Vec::new()
                };
                let mut out = ColoredText::info(format!("[{target}] {title} ({host}):"))
                    .render(color);
                for line in output.lines() {
                    let line = if dups.iter().any(|d| d == line) {
                        ColoredText::highlight(line).render(color)
                    } else {
                        line.to_string()
                    };
                    out.push_str(&format!("\n  {line}"));
                }
                if !dups.is_empty() {
                    out.push_str(&format!(
                        "\n{} {}",
                        self.icon(Icon::Error),
                        ColoredText::error("duplicate entries are found!").render(color)
                    ));
                }
                out
            }

            DeployEvent::Warning { target, warning } => {
                WarningBlock::from_health(&target, &warning).render(color, self.ui.unicode)
            }

            DeployEvent::Declined { target, gate } => format!(
                "{} {}",
                self.icon(Icon::Aborted),
                ColoredText::dim(format!("[{target}] declined: {gate}")).render(color)
            ),

            DeployEvent::TargetFinished {
                target,
                outcome,
                stage,
                detail,
            } => {
                let stage = stage.map(|s| format!(" at {s}")).unwrap_or_default();
                let detail = detail.map(|d| format!(": {d}")).unwrap_or_default();
                match outcome {
                    OutcomeKind::Done => format!(
                        "{} {}",
                        self.icon(Icon::Success),
                        ColoredText::success(format!("[{target}] done")).render(color)
                    ),
                    OutcomeKind::Aborted => format!(
                        "{} {}",
                        self.icon(Icon::Aborted),
                        ColoredText::dim(format!("[{target}] aborted{stage}{detail}"))
                            .render(color)
                    ),
                    OutcomeKind::Failed => format!(
                        "{} {}",
                        self.icon(Icon::Error),
                        ColoredText::error(format!("[{target}] failed{stage}{detail}"))
                            .render(color)
                    ),
                }
            }

            DeployEvent::Report { text } => format!(
                "\n{} {}\n{}",
                self.icon(Icon::Report),
                ColoredText::info("Release report").bold().render(color),
                text
            ),
        }
    }
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        let text = self.render(event);
        self.write(&text);
    }

    fn wants_detailed_events(&self) -> bool {
        self.ui.verbose > 0
    }
}
