use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Persisted task status. "Blocked" is derived by the graph engine and is
/// never written; legacy records that stored it read back as `todo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[serde(alias = "pending", alias = "blocked")]
    Todo,
    InProgress,
    Review,
    #[serde(alias = "completed")]
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "review" => Some(Self::Review),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dependency_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    /// Components, issues, comments, time tracking and anything else this
    /// crate does not interpret. Round-trips untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
    /// File the record was loaded from; write-back goes to the same place.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Task {
    pub fn new(id: &str, project_id: &str, phase_id: Option<&str>, title: &str, now: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            project_id: project_id.to_string(),
            phase_id: phase_id.map(str::to_string),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            assignee: None,
            reporter: None,
            created: now.to_string(),
            updated: now.to_string(),
            description: String::new(),
            dependency_ids: Vec::new(),
            labels: Vec::new(),
            extra: BTreeMap::new(),
            source: None,
        }
    }

    /// Title for display, falling back to the id for untitled records.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_statuses_read_as_persisted_states() {
        let yaml = "id: T1.1\nstatus: blocked\n";
        let task: Task = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(task.status, TaskStatus::Todo);

        let yaml = "id: T1.2\nstatus: completed\n";
        let task: Task = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(task.status, TaskStatus::Done);
    }

    #[test]
    fn test_defaults_for_sparse_record() {
        let task: Task = serde_yaml::from_str("id: T1.1\nstatus: todo\n").unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.dependency_ids.is_empty());
        assert!(task.phase_id.is_none());
        assert_eq!(task.display_title(), "T1.1");
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let yaml = "\
id: T1.1
title: Login
status: in_progress
components:
  - id: c1
    title: Form
time_tracking:
  estimated_hours: 4
";
        let task: Task = serde_yaml::from_str(yaml).unwrap();
        assert!(task.extra.contains_key("components"));
        let out = serde_yaml::to_string(&task).unwrap();
        let back: Task = serde_yaml::from_str(&out).unwrap();
        assert_eq!(back.extra, task.extra);
        assert!(out.contains("estimated_hours: 4"));
    }

    #[test]
    fn test_status_never_serializes_as_blocked() {
        let task = Task::new("T1.1", "web", Some("P1"), "Login", "2026-01-01 00:00:00");
        let out = serde_yaml::to_string(&task).unwrap();
        assert!(out.contains("status: todo"));
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }
}
