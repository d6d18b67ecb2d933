//! Per-invocation configuration.
//!
//! Everything a command needs to reach the entity store is resolved once in
//! `main` and passed down explicitly. Nothing here is cached between runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::graph::UnresolvedPolicy;
use crate::lifecycle::Workflow;
use crate::store::io;

pub const BINDING_DIR: &str = ".projtrack";
pub const BINDING_FILE: &str = "config.json";
pub const ROOT_ENV: &str = "PROJTRACK_ROOT";

/// Store location used when neither `--root` nor a binding names one.
pub const DEFAULT_STORE_DIR: &[&str] = &["Dropbox", "project-management"];

/// Contents of `.projtrack/config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_root: Option<PathBuf>,
    #[serde(default)]
    pub require_review: bool,
    #[serde(default)]
    pub unresolved_dependencies: UnresolvedPolicy,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_root: PathBuf,
    pub default_project: Option<String>,
    pub workflow: Workflow,
    pub unresolved: UnresolvedPolicy,
}

impl Config {
    /// Resolve configuration for this run.
    ///
    /// Store root priority:
    /// 1. `--root` flag / `PROJTRACK_ROOT` (passed in as `explicit_root`)
    /// 2. `store_root` from the nearest `.projtrack/config.json` above `cwd`
    /// 3. `$HOME/Dropbox/project-management`
    pub fn resolve(explicit_root: Option<&Path>, cwd: &Path) -> Result<Self> {
        let binding = match find_binding(cwd) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using binding");
                load_binding(&path)?
            }
            None => Binding::default(),
        };

        let store_root = match (explicit_root, &binding.store_root) {
            (Some(root), _) => root.to_path_buf(),
            (None, Some(root)) => root.clone(),
            (None, None) => default_store_root()?,
        };
        tracing::debug!(root = %store_root.display(), "resolved store root");

        Ok(Self {
            store_root,
            default_project: binding.project_id,
            workflow: Workflow {
                require_review: binding.require_review,
            },
            unresolved: binding.unresolved_dependencies,
        })
    }

    /// The `--project` flag wins; otherwise the bound project.
    pub fn project_id(&self, flag: Option<&str>) -> Result<String> {
        flag.map(str::to_string)
            .or_else(|| self.default_project.clone())
            .ok_or_else(TrackerError::no_project)
    }
}

fn default_store_root() -> Result<PathBuf> {
    let home = home::home_dir().ok_or_else(|| {
        TrackerError::store("home directory not found: pass --root or set PROJTRACK_ROOT")
    })?;
    Ok(DEFAULT_STORE_DIR.iter().fold(home, |p, seg| p.join(seg)))
}

/// Walk upward from `start` looking for `.projtrack/config.json`.
pub fn find_binding(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(BINDING_DIR).join(BINDING_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

pub fn load_binding(path: &Path) -> Result<Binding> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        TrackerError::store(format!("invalid binding file {}: {e}", path.display()))
    })
}

/// Write `dir/.projtrack/config.json`, returning its path.
pub fn write_binding(dir: &Path, binding: &Binding) -> Result<PathBuf> {
    let path = dir.join(BINDING_DIR).join(BINDING_FILE);
    let data = serde_json::to_string_pretty(binding)?;
    io::atomic_write(&path, data.as_bytes())?;
    Ok(path)
}
