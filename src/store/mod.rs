pub mod io;
pub mod loader;
pub mod paths;
pub mod phase_repo;
pub mod project_repo;
pub mod task_repo;

pub use loader::{LoadedTasks, PartialRead};

use std::path::{Path, PathBuf};

/// Handle to one entity store. Passed explicitly to every repository call.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
