//! Domain Services
//!
//! Pure parsers over command output. No I/O: each takes raw text and returns
//! findings, so every grammar is unit-testable apart from the command that
//! produced it.

pub mod changelog;
pub mod diff_checks;
pub mod process_scan;
pub mod release_tag;
pub mod version;

pub use process_scan::{StuckProcess, StuckRule};
pub use release_tag::exact_version;
pub use version::{set_manifest_version, Bump, Version};
