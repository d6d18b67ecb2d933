//! Aggregated views over a computed [`DependencyGraph`].
//!
//! Builders here only filter and reshape what the engine already decided.
//! Each returns a serializable struct; `output::text` renders it for humans
//! and `--json` emits it as-is.

use serde::Serialize;

use crate::graph::cycle;
use crate::graph::{Blocker, Classification, Counts, DependencyGraph, TaskState, UnresolvedPolicy};
use crate::models::{Priority, Task, TaskStatus};
use crate::store::PartialRead;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRef {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub updated: String,
}

impl From<&Task> for TaskRef {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.display_title().to_string(),
            status: task.status,
            priority: task.priority,
            phase_id: task.phase_id.clone(),
            assignee: task.assignee.clone(),
            updated: task.updated.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockedEntry {
    #[serde(flatten)]
    pub task: TaskRef,
    pub blockers: Vec<Blocker>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedRef {
    pub task_id: String,
    pub dependency_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub counts: Counts,
    pub percent_done: f64,
    pub blocked: Vec<BlockedEntry>,
    pub ready: Vec<TaskRef>,
    pub in_progress: Vec<TaskRef>,
    pub review: Vec<TaskRef>,
    pub cycles: Vec<Vec<String>>,
    pub unresolved: Vec<UnresolvedRef>,
    pub warnings: Vec<PartialRead>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockedReport {
    pub project_id: String,
    pub blocked: Vec<BlockedEntry>,
}

/// One dependency of a task, resolved against the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyLink {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    pub satisfied: bool,
    pub missing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyEntry {
    #[serde(flatten)]
    pub task: TaskRef,
    pub classification: Classification,
    pub dependencies: Vec<DependencyLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyReport {
    pub project_id: String,
    pub tasks: Vec<DependencyEntry>,
    pub cycles: Vec<Vec<String>>,
}

/// Work that can be picked up or is underway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveReport {
    pub project_id: String,
    pub ready: Vec<TaskRef>,
    pub in_progress: Vec<TaskRef>,
}

fn in_scope(task: &Task, phase: Option<&str>) -> bool {
    match phase {
        Some(phase) => task.phase_id.as_deref() == Some(phase),
        None => true,
    }
}

fn scoped<'a, 'g>(
    graph: &'g DependencyGraph<'a>,
    phase: Option<&'g str>,
) -> impl Iterator<Item = (&'a Task, &'g TaskState)> + 'g {
    graph.entries().filter(move |(t, _)| in_scope(t, phase))
}

/// Cycles that pass through at least one task in scope.
fn scoped_cycles(graph: &DependencyGraph<'_>, phase: Option<&str>) -> Vec<Vec<String>> {
    let mut cycles = cycle::find_cycles(graph.tasks());
    cycles.retain(|c| c.iter().any(|id| graph.get(id).is_some_and(|t| in_scope(t, phase))));
    cycles
}

fn blocked_entries(graph: &DependencyGraph<'_>, phase: Option<&str>) -> Vec<BlockedEntry> {
    scoped(graph, phase)
        .filter(|(_, s)| s.classification == Classification::Blocked)
        .map(|(t, s)| BlockedEntry {
            task: TaskRef::from(t),
            blockers: s.blockers.clone(),
        })
        .collect()
}

fn ready_refs(graph: &DependencyGraph<'_>, phase: Option<&str>) -> Vec<TaskRef> {
    graph
        .ready_tasks()
        .into_iter()
        .filter(|t| in_scope(t, phase))
        .map(TaskRef::from)
        .collect()
}

fn refs_with(graph: &DependencyGraph<'_>, phase: Option<&str>, c: Classification) -> Vec<TaskRef> {
    scoped(graph, phase)
        .filter(|(_, s)| s.classification == c)
        .map(|(t, _)| TaskRef::from(t))
        .collect()
}

fn tally<'a>(states: impl Iterator<Item = &'a TaskState>) -> Counts {
    let mut counts = Counts::default();
    for state in states {
        counts.total += 1;
        match state.classification {
            Classification::Done => counts.done += 1,
            Classification::InProgress => counts.in_progress += 1,
            Classification::Review => counts.review += 1,
            Classification::Ready => counts.ready += 1,
            Classification::Blocked => counts.blocked += 1,
        }
    }
    counts
}

pub fn project_summary(
    project_id: &str,
    graph: &DependencyGraph<'_>,
    warnings: &[PartialRead],
    phase: Option<&str>,
) -> ProjectSummary {
    let counts = match phase {
        None => graph.counts(),
        Some(_) => tally(scoped(graph, phase).map(|(_, s)| s)),
    };
    let unresolved = scoped(graph, phase)
        .flat_map(|(t, s)| {
            s.unresolved.iter().map(move |dep| UnresolvedRef {
                task_id: t.id.clone(),
                dependency_id: dep.clone(),
            })
        })
        .collect();

    ProjectSummary {
        project_id: project_id.to_string(),
        percent_done: counts.percentage(),
        counts,
        blocked: blocked_entries(graph, phase),
        ready: ready_refs(graph, phase),
        in_progress: refs_with(graph, phase, Classification::InProgress),
        review: refs_with(graph, phase, Classification::Review),
        cycles: scoped_cycles(graph, phase),
        unresolved,
        warnings: warnings.to_vec(),
    }
}

pub fn blocked_report(project_id: &str, graph: &DependencyGraph<'_>, phase: Option<&str>) -> BlockedReport {
    BlockedReport {
        project_id: project_id.to_string(),
        blocked: blocked_entries(graph, phase),
    }
}

/// Every task that has dependencies, with each dependency's own status.
pub fn dependency_report(
    project_id: &str,
    graph: &DependencyGraph<'_>,
    phase: Option<&str>,
) -> DependencyReport {
    let tasks = scoped(graph, phase)
        .filter(|(t, _)| !t.dependency_ids.is_empty())
        .map(|(t, s)| DependencyEntry {
            task: TaskRef::from(t),
            classification: s.classification,
            dependencies: t
                .dependency_ids
                .iter()
                .map(|dep_id| match graph.get(dep_id) {
                    Some(dep) => DependencyLink {
                        id: dep.id.clone(),
                        title: Some(dep.display_title().to_string()),
                        status: Some(dep.status),
                        satisfied: dep.status == TaskStatus::Done,
                        missing: false,
                    },
                    None => DependencyLink {
                        id: dep_id.clone(),
                        title: None,
                        status: None,
                        satisfied: graph.policy() == UnresolvedPolicy::Satisfied,
                        missing: true,
                    },
                })
                .collect(),
        })
        .collect();

    DependencyReport {
        project_id: project_id.to_string(),
        tasks,
        cycles: scoped_cycles(graph, phase),
    }
}

pub fn active_report(project_id: &str, graph: &DependencyGraph<'_>, phase: Option<&str>) -> ActiveReport {
    ActiveReport {
        project_id: project_id.to_string(),
        ready: ready_refs(graph, phase),
        in_progress: refs_with(graph, phase, Classification::InProgress),
    }
}
