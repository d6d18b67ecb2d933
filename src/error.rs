use thiserror::Error;

use crate::lifecycle::TransitionError;
use crate::validate::IdError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoProject,
    ProjectNotFound,
    PhaseNotFound,
    TaskNotFound,
    AlreadyExists,
    AlreadyDone,
    SkipStage,
    StillBlocked,
    ValidationError,
    StoreError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoProject => "NO_PROJECT",
            Self::ProjectNotFound => "PROJECT_NOT_FOUND",
            Self::PhaseNotFound => "PHASE_NOT_FOUND",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::AlreadyDone => "ALREADY_DONE",
            Self::SkipStage => "SKIP_STAGE",
            Self::StillBlocked => "STILL_BLOCKED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::StoreError => "STORE_ERROR",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct TrackerError {
    pub code: ErrorCode,
    pub message: String,
}

impl TrackerError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn no_project() -> Self {
        Self::new(
            ErrorCode::NoProject,
            "No project given. Pass `--project <id>` or run `projtrack bind <project-id>` in this directory.",
        )
    }

    pub fn project_not_found(id: &str) -> Self {
        Self::new(
            ErrorCode::ProjectNotFound,
            format!("Project not found: {id}. Use `projtrack list projects` to see existing projects."),
        )
    }

    pub fn phase_not_found(project_id: &str, phase_id: &str) -> Self {
        Self::new(
            ErrorCode::PhaseNotFound,
            format!("Phase {phase_id} not found in project {project_id}"),
        )
    }

    pub fn task_not_found(project_id: &str, task_id: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task {task_id} not found in project {project_id}"),
        )
    }

    pub fn already_exists(kind: &str, id: &str) -> Self {
        Self::new(
            ErrorCode::AlreadyExists,
            format!("{kind} '{id}' already exists"),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreError, message)
    }
}

impl From<IdError> for TrackerError {
    fn from(e: IdError) -> Self {
        Self::validation(e.to_string())
    }
}

impl From<TransitionError> for TrackerError {
    fn from(e: TransitionError) -> Self {
        let code = match &e {
            TransitionError::AlreadyDone { .. } => ErrorCode::AlreadyDone,
            TransitionError::SkipStage { .. } => ErrorCode::SkipStage,
            TransitionError::StillBlocked { .. } => ErrorCode::StillBlocked,
            TransitionError::NotFound { .. } => ErrorCode::TaskNotFound,
        };
        Self::new(code, e.to_string())
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(e: std::io::Error) -> Self {
        Self::store(e.to_string())
    }
}

impl From<serde_yaml::Error> for TrackerError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::store(e.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        Self::store(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
