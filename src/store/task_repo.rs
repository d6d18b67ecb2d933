use crate::error::{Result, TrackerError};
use crate::models::Task;

use super::loader::{self, LoadedTasks};
use super::{io, paths, phase_repo, project_repo, Store};

/// Create a new task record. The project (and phase, when given) must exist
/// and no task in the project may already use the id.
pub fn create_task(store: &Store, task: &Task) -> Result<Task> {
    if !project_repo::project_exists(store, &task.project_id) {
        return Err(TrackerError::project_not_found(&task.project_id));
    }
    if let Some(phase_id) = task.phase_id.as_deref() {
        if !phase_repo::phase_exists(store, &task.project_id, phase_id) {
            return Err(TrackerError::phase_not_found(&task.project_id, phase_id));
        }
    }
    let existing = loader::load_project_tasks(store, &task.project_id);
    if existing.find(&task.id).is_some() {
        return Err(TrackerError::already_exists("Task", &task.id));
    }

    let path = paths::task_file(
        store.root(),
        &task.project_id,
        task.phase_id.as_deref(),
        &task.id,
    );
    io::write_yaml(&path, task)?;
    tracing::info!(project = %task.project_id, task = %task.id, "created task");

    let mut created = task.clone();
    created.source = Some(path);
    Ok(created)
}

/// Write a task back to the file it was loaded from, or to its canonical
/// location for records that were never on disk.
pub fn save_task(store: &Store, task: &Task) -> Result<()> {
    let path = match &task.source {
        Some(path) => path.clone(),
        None => paths::task_file(
            store.root(),
            &task.project_id,
            task.phase_id.as_deref(),
            &task.id,
        ),
    };
    io::write_yaml(&path, task)
}

pub fn get_task(loaded: &LoadedTasks, project_id: &str, task_id: &str) -> Result<Task> {
    loaded
        .find(task_id)
        .cloned()
        .ok_or_else(|| TrackerError::task_not_found(project_id, task_id))
}
