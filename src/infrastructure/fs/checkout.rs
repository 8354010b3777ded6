//! Workspace over a checkout directory on disk

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::entities::Target;
use crate::domain::ports::Workspace;
use crate::error::RolloutResult;
use crate::infrastructure::runner::expand_home;

#[derive(Debug, Clone)]
pub struct CheckoutDir {
    root: PathBuf,
}

impl CheckoutDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The target's `local.path`, or the current directory when unset
    pub fn for_target(target: &Target) -> Self {
        match target.local.path.as_deref() {
            Some(path) => Self::new(expand_home(path)),
            None => Self::new("."),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Workspace for CheckoutDir {
    fn read(&self, file: &str) -> RolloutResult<String> {
        Ok(fs::read_to_string(self.root.join(file))?)
    }

    fn write(&self, file: &str, content: &str) -> RolloutResult<()> {
        let path = self.root.join(file);
        let dir = path.parent().unwrap_or(&self.root);
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        tracing::debug!(path = %path.display(), "wrote file");
        Ok(())
    }

    fn exists(&self, file: &str) -> bool {
        self.root.join(file).is_file()
    }
}
