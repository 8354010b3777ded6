//! Workspace Port
//!
//! Files of a local checkout, addressed relative to its root.

use crate::error::RolloutResult;

pub trait Workspace {
    fn read(&self, file: &str) -> RolloutResult<String>;

    /// Replace the file's content; readers never see a partial write
    fn write(&self, file: &str, content: &str) -> RolloutResult<()>;

    fn exists(&self, file: &str) -> bool;
}
