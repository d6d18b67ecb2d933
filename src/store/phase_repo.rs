use crate::error::{Result, TrackerError};
use crate::models::Phase;

use super::{io, paths, project_repo, Store};

pub fn phase_exists(store: &Store, project_id: &str, phase_id: &str) -> bool {
    paths::phase_dir(store.root(), project_id, phase_id).is_dir()
}

pub fn create_phase(store: &Store, phase: &Phase) -> Result<Phase> {
    if !project_repo::project_exists(store, &phase.project_id) {
        return Err(TrackerError::project_not_found(&phase.project_id));
    }
    if phase_exists(store, &phase.project_id, &phase.id) {
        return Err(TrackerError::already_exists("Phase", &phase.id));
    }
    let root = store.root();
    std::fs::create_dir_all(paths::phase_tasks_dir(root, &phase.project_id, &phase.id))?;
    io::write_yaml(&paths::phase_file(root, &phase.project_id, &phase.id), phase)?;
    tracing::info!(project = %phase.project_id, phase = %phase.id, "created phase");
    Ok(phase.clone())
}

pub fn get_phase(store: &Store, project_id: &str, phase_id: &str) -> Result<Phase> {
    let path = paths::phase_file(store.root(), project_id, phase_id);
    if !path.is_file() {
        return Err(TrackerError::phase_not_found(project_id, phase_id));
    }
    let mut phase: Phase = io::read_yaml(&path)?;
    if phase.project_id.is_empty() {
        phase.project_id = project_id.to_string();
    }
    Ok(phase)
}

pub fn save_phase(store: &Store, phase: &Phase) -> Result<()> {
    io::write_yaml(
        &paths::phase_file(store.root(), &phase.project_id, &phase.id),
        phase,
    )
}

/// Phases of a project in natural order. Unreadable phase files are logged
/// and skipped.
pub fn list_phases(store: &Store, project_id: &str) -> Result<Vec<Phase>> {
    let mut phases = Vec::new();
    for id in io::list_dirs(&paths::phases_dir(store.root(), project_id))? {
        match get_phase(store, project_id, &id) {
            Ok(phase) => phases.push(phase),
            Err(e) => tracing::warn!(project = %project_id, phase = %id, error = %e, "skipping unreadable phase"),
        }
    }
    Ok(phases)
}
