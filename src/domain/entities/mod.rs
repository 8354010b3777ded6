//! Domain Entities

mod release;
mod target;

pub use release::{render_report, ReleaseInfo, ReportEntry};
pub use target::{CommandSet, LocalConfig, NamedPaths, RemoteConfig, Target};
