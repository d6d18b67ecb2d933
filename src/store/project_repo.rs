use crate::error::{Result, TrackerError};
use crate::models::Project;

use super::{io, paths, Store};

pub fn project_exists(store: &Store, id: &str) -> bool {
    paths::project_file(store.root(), id).is_file()
}

pub fn create_project(store: &Store, project: &Project) -> Result<Project> {
    if project_exists(store, &project.id) {
        return Err(TrackerError::already_exists("Project", &project.id));
    }
    let root = store.root();
    std::fs::create_dir_all(paths::phases_dir(root, &project.id))?;
    io::write_yaml(&paths::project_file(root, &project.id), project)?;
    tracing::info!(project = %project.id, "created project");
    Ok(project.clone())
}

pub fn get_project(store: &Store, id: &str) -> Result<Project> {
    let path = paths::project_file(store.root(), id);
    if !path.is_file() {
        return Err(TrackerError::project_not_found(id));
    }
    io::read_yaml(&path)
}

pub fn save_project(store: &Store, project: &Project) -> Result<()> {
    io::write_yaml(&paths::project_file(store.root(), &project.id), project)
}

/// Every project directory in the store, sorted. Directories are listed even
/// when their `project.yaml` is missing so reports still cover their tasks.
pub fn list_project_ids(store: &Store) -> Result<Vec<String>> {
    io::list_dirs(&paths::projects_dir(store.root()))
}

/// Projects whose `project.yaml` parses. Unreadable ones are logged and skipped.
pub fn list_projects(store: &Store) -> Result<Vec<Project>> {
    let mut projects = Vec::new();
    for id in list_project_ids(store)? {
        match get_project(store, &id) {
            Ok(project) => projects.push(project),
            Err(e) => tracing::warn!(project = %id, error = %e, "skipping unreadable project"),
        }
    }
    Ok(projects)
}
