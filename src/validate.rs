//! Identifier and free-text validation.
//!
//! Identifiers become path segments under the store root, so every check here
//! runs before any file-system access and never touches the disk itself.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

pub const MAX_PROJECT_ID_LEN: usize = 50;
pub const MAX_TEXT_LEN: usize = 1000;
pub const BUGS_PHASE: &str = "BUGS";

const RESERVED_PROJECT_IDS: &[&str] = &[
    ".", "..", "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6",
    "COM7", "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8",
    "LPT9", "HELP", "VERSION", "LIST", "STATUS", "WIKI", "COLLAB", "BIND", "INIT",
];

const SHELL_METACHARS: &[char] = &[
    '|', '&', ';', '$', '`', '(', ')', '<', '>', '"', '\'', '*', '?', '!', '{', '}', '[', ']',
    ' ',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Phase,
    Task,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Phase => "phase",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("{kind} ID cannot be empty")]
    Empty { kind: EntityKind },

    #[error("{kind} ID is too long ({len} characters, max {max})")]
    TooLong {
        kind: EntityKind,
        len: usize,
        max: usize,
    },

    #[error("{kind} ID '{id}' contains path characters ('..', '/', '\\', ':' or a leading '~'); IDs are used as directory names")]
    PathTraversal { kind: EntityKind, id: String },

    #[error("{kind} ID '{id}' contains the shell metacharacter {ch:?}; use only letters, digits, '-' and '_'")]
    ShellMetachar {
        kind: EntityKind,
        id: String,
        ch: char,
    },

    #[error("{kind} ID contains a control character at byte {position}")]
    ControlChar { kind: EntityKind, position: usize },

    #[error("'{id}' is a reserved name and cannot be used as a {kind} ID")]
    Reserved { kind: EntityKind, id: String },

    #[error("{kind} ID '{id}' is malformed: expected {expected}")]
    BadFormat {
        kind: EntityKind,
        id: String,
        expected: &'static str,
    },

    #[error("task {task_id} does not belong to phase {phase_id} (should start with T{expected}.)")]
    PhaseMismatch {
        task_id: String,
        phase_id: String,
        expected: u32,
    },

    #[error("invalid phase context '{phase_id}' for task validation")]
    BadPhaseContext { phase_id: String },

    #[error("{field} is too long ({len} characters, max {max})")]
    TextTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{field} contains a control character at byte {position}")]
    TextControlChar { field: &'static str, position: usize },
}

const PROJECT_FORMAT: &str =
    "a letter or digit followed by letters, digits, '-' or '_' (e.g. web-app, api_server)";
const PHASE_FORMAT: &str = "P1, P2, P3... optionally with a suffix like P1-backend, or BUGS";
const TASK_FORMAT: &str =
    "T<phase>.<n> such as T1.1 (subtasks: T1.1.1, bugs: T1.1.B1, with suffix: T1.1-auth)";

fn project_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("valid regex"))
}

fn phase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^P([1-9][0-9]*)(-[A-Za-z0-9][A-Za-z0-9_-]*)?$").expect("valid regex")
    })
}

fn task_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^T([1-9][0-9]*)\.([1-9][0-9]*)(\.[1-9][0-9]*|\.B[1-9][0-9]*)?(-[A-Za-z0-9][A-Za-z0-9_-]*)?$",
        )
        .expect("valid regex")
    })
}

/// Checks shared by every identifier kind: emptiness, path traversal, shell
/// metacharacters and control characters.
fn check_safety(raw: &str, kind: EntityKind) -> Result<(), IdError> {
    if raw.is_empty() {
        return Err(IdError::Empty { kind });
    }
    if let Some((position, _)) = raw.char_indices().find(|(_, c)| c.is_control()) {
        return Err(IdError::ControlChar { kind, position });
    }
    if raw.contains("..")
        || raw.contains('/')
        || raw.contains('\\')
        || raw.contains(':')
        || raw.starts_with('~')
    {
        return Err(IdError::PathTraversal {
            kind,
            id: raw.to_string(),
        });
    }
    if let Some(ch) = raw.chars().find(|c| SHELL_METACHARS.contains(c)) {
        return Err(IdError::ShellMetachar {
            kind,
            id: raw.to_string(),
            ch,
        });
    }
    Ok(())
}

pub fn validate_project_id(raw: &str) -> Result<(), IdError> {
    let kind = EntityKind::Project;
    check_safety(raw, kind)?;
    if raw.len() > MAX_PROJECT_ID_LEN {
        return Err(IdError::TooLong {
            kind,
            len: raw.len(),
            max: MAX_PROJECT_ID_LEN,
        });
    }
    let upper = raw.to_ascii_uppercase();
    if RESERVED_PROJECT_IDS.contains(&upper.as_str()) {
        return Err(IdError::Reserved {
            kind,
            id: raw.to_string(),
        });
    }
    if !project_re().is_match(raw) {
        return Err(IdError::BadFormat {
            kind,
            id: raw.to_string(),
            expected: PROJECT_FORMAT,
        });
    }
    Ok(())
}

pub fn validate_phase_id(raw: &str) -> Result<(), IdError> {
    let kind = EntityKind::Phase;
    check_safety(raw, kind)?;
    if raw == BUGS_PHASE || phase_re().is_match(raw) {
        return Ok(());
    }
    Err(IdError::BadFormat {
        kind,
        id: raw.to_string(),
        expected: PHASE_FORMAT,
    })
}

/// Validate a task id. With a `P<n>` phase context the id's embedded phase
/// number must be `n`; a `BUGS` context accepts any well-formed task id.
pub fn validate_task_id(raw: &str, phase_context: Option<&str>) -> Result<(), IdError> {
    let kind = EntityKind::Task;
    check_safety(raw, kind)?;
    let caps = task_re().captures(raw).ok_or_else(|| IdError::BadFormat {
        kind,
        id: raw.to_string(),
        expected: TASK_FORMAT,
    })?;

    let Some(phase_id) = phase_context else {
        return Ok(());
    };
    if phase_id == BUGS_PHASE {
        return Ok(());
    }
    let expected = phase_number(phase_id).ok_or_else(|| IdError::BadPhaseContext {
        phase_id: phase_id.to_string(),
    })?;
    let actual: Option<u32> = caps.get(1).and_then(|m| m.as_str().parse().ok());
    if actual != Some(expected) {
        return Err(IdError::PhaseMismatch {
            task_id: raw.to_string(),
            phase_id: phase_id.to_string(),
            expected,
        });
    }
    Ok(())
}

pub fn validate_id(
    raw: &str,
    kind: EntityKind,
    phase_context: Option<&str>,
) -> Result<(), IdError> {
    match kind {
        EntityKind::Project => validate_project_id(raw),
        EntityKind::Phase => validate_phase_id(raw),
        EntityKind::Task => validate_task_id(raw, phase_context),
    }
}

/// Number embedded in a `P<n>[-suffix]` phase id. `BUGS` and malformed ids
/// have none.
pub fn phase_number(phase_id: &str) -> Option<u32> {
    phase_re()
        .captures(phase_id)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Titles, names and descriptions end up inside YAML scalars.
pub fn validate_text(field: &'static str, value: &str) -> Result<(), IdError> {
    let len = value.chars().count();
    if len > MAX_TEXT_LEN {
        return Err(IdError::TextTooLong {
            field,
            len,
            max: MAX_TEXT_LEN,
        });
    }
    if let Some((position, _)) = value
        .char_indices()
        .find(|(_, c)| c.is_control() && *c != '\n' && *c != '\t')
    {
        return Err(IdError::TextControlChar { field, position });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_project_ids() {
        for id in ["web-app", "api_server", "mobile2", "A1", "x"] {
            assert!(validate_project_id(id).is_ok(), "{id} should be valid");
        }
    }

    #[test]
    fn test_project_rejects_reserved_case_insensitive() {
        assert!(matches!(
            validate_project_id("con"),
            Err(IdError::Reserved { .. })
        ));
        assert!(matches!(
            validate_project_id("Status"),
            Err(IdError::Reserved { .. })
        ));
    }

    #[test]
    fn test_project_length_bound() {
        let long = "a".repeat(MAX_PROJECT_ID_LEN + 1);
        assert!(matches!(
            validate_project_id(&long),
            Err(IdError::TooLong { .. })
        ));
        assert!(validate_project_id(&"a".repeat(MAX_PROJECT_ID_LEN)).is_ok());
    }

    #[test]
    fn test_project_must_start_alphanumeric() {
        assert!(matches!(
            validate_project_id("-web"),
            Err(IdError::BadFormat { .. })
        ));
        assert!(matches!(
            validate_project_id("_web"),
            Err(IdError::BadFormat { .. })
        ));
    }

    #[test]
    fn test_traversal_rejected_for_every_kind() {
        for kind in [EntityKind::Project, EntityKind::Phase, EntityKind::Task] {
            let err = validate_id("../etc", kind, None).unwrap_err();
            assert!(
                matches!(err, IdError::PathTraversal { .. }),
                "{kind}: {err:?}"
            );
        }
    }

    #[test]
    fn test_shell_and_control_chars_rejected() {
        assert!(matches!(
            validate_project_id("web;rm"),
            Err(IdError::ShellMetachar { ch: ';', .. })
        ));
        assert!(matches!(
            validate_task_id("T1.1$x", None),
            Err(IdError::ShellMetachar { ch: '$', .. })
        ));
        assert!(matches!(
            validate_phase_id("P1\n"),
            Err(IdError::ControlChar { position: 2, .. })
        ));
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            validate_phase_id(""),
            Err(IdError::Empty {
                kind: EntityKind::Phase
            })
        );
    }

    #[test]
    fn test_phase_formats() {
        for id in ["P1", "P12", "P1-backend", "P2-ui_v2", "BUGS"] {
            assert!(validate_phase_id(id).is_ok(), "{id} should be valid");
        }
        for id in ["P0", "p1", "phase-1", "P1-", "bugs", "P01"] {
            assert!(validate_phase_id(id).is_err(), "{id} should be invalid");
        }
    }

    #[test]
    fn test_phase_number() {
        assert_eq!(phase_number("P3"), Some(3));
        assert_eq!(phase_number("P12-api"), Some(12));
        assert_eq!(phase_number("BUGS"), None);
        assert_eq!(phase_number("X1"), None);
    }

    #[test]
    fn test_task_formats() {
        for id in ["T1.1", "T2.10", "T1.1.1", "T1.1.B1", "T1.2-auth", "T1.1.B2-crash"] {
            assert!(validate_task_id(id, None).is_ok(), "{id} should be valid");
        }
        for id in ["T0.1", "T1.0", "T1", "t1.1", "T1.1.", "T1.1.b1", "bug-login"] {
            assert!(validate_task_id(id, None).is_err(), "{id} should be invalid");
        }
    }

    #[test]
    fn test_task_phase_context() {
        assert!(validate_task_id("T2.1", Some("P2")).is_ok());
        assert!(validate_task_id("T2.1", Some("P2-backend")).is_ok());
        assert_eq!(
            validate_task_id("T1.1", Some("P2")),
            Err(IdError::PhaseMismatch {
                task_id: "T1.1".into(),
                phase_id: "P2".into(),
                expected: 2,
            })
        );
        assert!(validate_task_id("T7.3.B1", Some("BUGS")).is_ok());
        assert!(matches!(
            validate_task_id("T1.1", Some("phase-1")),
            Err(IdError::BadPhaseContext { .. })
        ));
    }

    #[test]
    fn test_text_validation() {
        assert!(validate_text("title", "Line one\n\tindented").is_ok());
        assert!(matches!(
            validate_text("title", "bad\u{7}bell"),
            Err(IdError::TextControlChar { position: 3, .. })
        ));
        assert!(matches!(
            validate_text("description", &"x".repeat(MAX_TEXT_LEN + 1)),
            Err(IdError::TextTooLong { .. })
        ));
    }
}
