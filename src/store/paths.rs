use std::path::{Path, PathBuf};

pub const PROJECTS_DIR: &str = "projects";
pub const PHASES_DIR: &str = "phases";
pub const TASKS_DIR: &str = "tasks";
pub const PROJECT_FILE: &str = "project.yaml";
pub const PHASE_FILE: &str = "phase.yaml";
pub const RECORD_EXT: &str = "yaml";

pub fn projects_dir(root: &Path) -> PathBuf {
    root.join(PROJECTS_DIR)
}

pub fn project_dir(root: &Path, project_id: &str) -> PathBuf {
    projects_dir(root).join(project_id)
}

pub fn project_file(root: &Path, project_id: &str) -> PathBuf {
    project_dir(root, project_id).join(PROJECT_FILE)
}

pub fn phases_dir(root: &Path, project_id: &str) -> PathBuf {
    project_dir(root, project_id).join(PHASES_DIR)
}

pub fn phase_dir(root: &Path, project_id: &str, phase_id: &str) -> PathBuf {
    phases_dir(root, project_id).join(phase_id)
}

pub fn phase_file(root: &Path, project_id: &str, phase_id: &str) -> PathBuf {
    phase_dir(root, project_id, phase_id).join(PHASE_FILE)
}

pub fn phase_tasks_dir(root: &Path, project_id: &str, phase_id: &str) -> PathBuf {
    phase_dir(root, project_id, phase_id).join(TASKS_DIR)
}

/// Tasks stored directly under the project (legacy flat mode).
pub fn flat_tasks_dir(root: &Path, project_id: &str) -> PathBuf {
    project_dir(root, project_id).join(TASKS_DIR)
}

pub fn task_file(root: &Path, project_id: &str, phase_id: Option<&str>, task_id: &str) -> PathBuf {
    let dir = match phase_id {
        Some(phase) => phase_tasks_dir(root, project_id, phase),
        None => flat_tasks_dir(root, project_id),
    };
    dir.join(format!("{task_id}.{RECORD_EXT}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_file_layouts() {
        let root = Path::new("/store");
        assert_eq!(
            task_file(root, "web", Some("P1"), "T1.1"),
            PathBuf::from("/store/projects/web/phases/P1/tasks/T1.1.yaml")
        );
        assert_eq!(
            task_file(root, "web", None, "T1.1"),
            PathBuf::from("/store/projects/web/tasks/T1.1.yaml")
        );
    }
}
