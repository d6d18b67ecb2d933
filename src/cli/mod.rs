pub mod bind;
pub mod commands;
pub mod list;
pub mod next;
pub mod phase;
pub mod project;
pub mod status;
pub mod task;

pub use commands::*;

use std::path::PathBuf;

use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::output;
use crate::store::{paths, project_repo, Store};
use crate::validate;

/// Everything a command handler needs, resolved once per invocation.
pub struct Context {
    pub config: Config,
    pub store: Store,
    pub json: bool,
    pub project_flag: Option<String>,
    /// `--root` / `PROJTRACK_ROOT` as given, before binding fallback.
    pub root_flag: Option<PathBuf>,
    pub cwd: PathBuf,
}

impl Context {
    pub fn new(
        config: Config,
        json: bool,
        project_flag: Option<String>,
        root_flag: Option<PathBuf>,
        cwd: PathBuf,
    ) -> Self {
        let store = Store::open(config.store_root.clone());
        Self {
            config,
            store,
            json,
            project_flag,
            root_flag,
            cwd,
        }
    }

    /// The project this command targets: `--project`, else the binding.
    /// Validated, and required to exist in the store.
    pub fn project_id(&self) -> Result<String> {
        let id = self.config.project_id(self.project_flag.as_deref())?;
        self.require_project(&id)?;
        Ok(id)
    }

    pub fn require_project(&self, id: &str) -> Result<()> {
        validate::validate_project_id(id)?;
        if !paths::project_dir(self.store.root(), id).is_dir() {
            return Err(TrackerError::project_not_found(id));
        }
        Ok(())
    }

    /// Projects a report covers: the selected project if there is one,
    /// otherwise every project in the store.
    pub fn project_scope(&self) -> Result<Vec<String>> {
        match self.config.project_id(self.project_flag.as_deref()) {
            Ok(id) => {
                self.require_project(&id)?;
                Ok(vec![id])
            }
            Err(_) => project_repo::list_project_ids(&self.store),
        }
    }
}

/// Map a handler result to an exit code, printing the error the way the
/// caller asked for.
pub fn finish(result: Result<()>, json_output: bool) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            tracing::debug!(code = e.code.as_str(), "command failed");
            if json_output {
                output::json::emit(&output::json::error(&e));
            } else {
                eprintln!("Error: {}", e.message);
            }
            1
        }
    }
}
