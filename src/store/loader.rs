//! Rebuilds a project's task set from the file tree.
//!
//! Runs on every invocation; there is no index. A record that cannot be read
//! or parsed is skipped and reported as a [`PartialRead`] instead of failing
//! the whole load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::models::{natural_cmp, Task};

use super::{io, paths, Store};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialRead {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedTasks {
    pub tasks: Vec<Task>,
    pub warnings: Vec<PartialRead>,
}

impl LoadedTasks {
    pub fn find(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    fn skip(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(path = %path.display(), %reason, "skipping task record");
        self.warnings.push(PartialRead {
            path: path.to_path_buf(),
            reason,
        });
    }
}

/// Load every task of `project_id`: nested phase tasks first (phases in
/// natural order), then legacy flat tasks. The result is sorted by id.
pub fn load_project_tasks(store: &Store, project_id: &str) -> LoadedTasks {
    let root = store.root();
    let mut loaded = LoadedTasks::default();

    let phases_dir = paths::phases_dir(root, project_id);
    match io::list_dirs(&phases_dir) {
        Ok(phase_ids) => {
            for phase_id in phase_ids {
                let dir = paths::phase_tasks_dir(root, project_id, &phase_id);
                load_dir(&mut loaded, &dir, project_id, Some(&phase_id));
            }
        }
        Err(e) => loaded.skip(&phases_dir, e.to_string()),
    }

    let flat_dir = paths::flat_tasks_dir(root, project_id);
    load_dir(&mut loaded, &flat_dir, project_id, None);

    drop_duplicates(&mut loaded);
    loaded.tasks.sort_by(|a, b| natural_cmp(&a.id, &b.id));
    tracing::debug!(
        project = %project_id,
        tasks = loaded.tasks.len(),
        skipped = loaded.warnings.len(),
        "loaded tasks"
    );
    loaded
}

fn load_dir(loaded: &mut LoadedTasks, dir: &Path, project_id: &str, phase_id: Option<&str>) {
    let files = match io::list_yaml_files(dir) {
        Ok(files) => files,
        Err(e) => {
            loaded.skip(dir, e.to_string());
            return;
        }
    };

    for name in files {
        let path = dir.join(&name);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                loaded.skip(&path, format!("unreadable: {e}"));
                continue;
            }
        };
        let mut task: Task = match serde_yaml::from_str(&content) {
            Ok(task) => task,
            Err(e) => {
                loaded.skip(&path, format!("malformed record: {e}"));
                continue;
            }
        };
        if task.id.trim().is_empty() {
            loaded.skip(&path, "record has an empty id");
            continue;
        }
        if task.project_id.is_empty() {
            task.project_id = project_id.to_string();
        }
        if task.phase_id.as_deref().map_or(true, str::is_empty) {
            task.phase_id = phase_id.map(str::to_string);
        }
        task.source = Some(path);
        loaded.tasks.push(task);
    }
}

/// First record in walk order wins; later copies of the same id are reported.
fn drop_duplicates(loaded: &mut LoadedTasks) {
    let mut first_seen: HashMap<String, PathBuf> = HashMap::new();
    let mut kept = Vec::with_capacity(loaded.tasks.len());
    let mut duplicates = Vec::new();

    for task in std::mem::take(&mut loaded.tasks) {
        let path = task.source.clone().unwrap_or_default();
        match first_seen.get(&task.id) {
            Some(original) => duplicates.push((
                path,
                format!(
                    "duplicate task id {} (already loaded from {})",
                    task.id,
                    original.display()
                ),
            )),
            None => {
                first_seen.insert(task.id.clone(), path);
                kept.push(task);
            }
        }
    }

    loaded.tasks = kept;
    for (path, reason) in duplicates {
        loaded.skip(&path, reason);
    }
}
