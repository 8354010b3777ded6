//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `runner/` - Command runners (SSH, local shell, scripted)
//! - `fs/` - Files of a local checkout
//! - `confirm/` - Terminal confirmation prompts
//! - `events/` - NDJSON event sink
//! - `report/` - Release report destinations

pub mod confirm;
pub mod events;
pub mod fs;
pub mod report;
pub mod runner;

// Re-export for convenience
pub use confirm::InteractiveConfirm;
pub use events::JsonEventSink;
pub use fs::CheckoutDir;
pub use report::CommandReportSink;
pub use runner::{
    LocalConnector, LocalRunner, ScriptedConnector, ScriptedRunner, SshConnector, SshSession,
};
