//! Task status transitions: todo → in_progress → (review) → done.
//!
//! Every status change goes through [`check_transition`], which consults one
//! table. A rejected request never reaches the store.

use thiserror::Error;

use crate::error::Result;
use crate::graph::next_tasks;
use crate::graph::{Blocker, DependencyGraph, UnresolvedPolicy};
use crate::models::{now_timestamp, Task, TaskStatus};
use crate::store::{loader, task_repo, Store};

/// Workflow variant. With `require_review` a task must pass through review
/// before it can be marked done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Workflow {
    pub require_review: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Task {task_id} is already done; done is terminal")]
    AlreadyDone { task_id: String },

    #[error("Cannot move task {task_id} from {from} to {to} directly. Set it to {via} first.")]
    SkipStage {
        task_id: String,
        from: TaskStatus,
        to: TaskStatus,
        via: TaskStatus,
    },

    #[error("Cannot start task {task_id}: blocked by {}", describe_blockers(.blockers))]
    StillBlocked {
        task_id: String,
        blockers: Vec<Blocker>,
    },

    #[error("Task {task_id} not found in project {project_id}")]
    NotFound { project_id: String, task_id: String },
}

fn describe_blockers(blockers: &[Blocker]) -> String {
    blockers
        .iter()
        .map(|b| match b {
            Blocker::Task { id, title, status } if title.is_empty() => format!("{id} ({status})"),
            Blocker::Task { id, title, status } => format!("{id} \"{title}\" ({status})"),
            Blocker::Missing { id } => format!("{id} (missing)"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// What the table says about a (from, to) pair, before the graph is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Allow,
    Unchanged,
    /// Allowed only while the task has no unmet dependencies.
    AllowIfUnblocked,
    Skip { via: TaskStatus },
    Terminal,
}

pub fn rule(from: TaskStatus, to: TaskStatus, workflow: Workflow) -> Rule {
    use TaskStatus::*;

    match (from, to) {
        (Done, _) => Rule::Terminal,
        (Todo, Todo) | (InProgress, InProgress) | (Review, Review) => Rule::Unchanged,
        (Todo, InProgress) => Rule::AllowIfUnblocked,
        (Todo, Review) | (Todo, Done) => Rule::Skip { via: InProgress },
        (InProgress, Todo) | (InProgress, Review) => Rule::Allow,
        (InProgress, Done) if workflow.require_review => Rule::Skip { via: Review },
        (InProgress, Done) => Rule::Allow,
        (Review, InProgress) | (Review, Done) => Rule::Allow,
        (Review, Todo) => Rule::Skip { via: InProgress },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Apply,
    Unchanged,
}

/// Decide whether `task_id` may move to `to` given the current graph.
pub fn check_transition(
    graph: &DependencyGraph<'_>,
    project_id: &str,
    task_id: &str,
    to: TaskStatus,
    workflow: Workflow,
) -> std::result::Result<Step, TransitionError> {
    let task = graph.get(task_id).ok_or_else(|| TransitionError::NotFound {
        project_id: project_id.to_string(),
        task_id: task_id.to_string(),
    })?;

    match rule(task.status, to, workflow) {
        Rule::Allow => Ok(Step::Apply),
        Rule::Unchanged => Ok(Step::Unchanged),
        Rule::AllowIfUnblocked => {
            let blockers = graph.blockers(task_id);
            if blockers.is_empty() {
                Ok(Step::Apply)
            } else {
                Err(TransitionError::StillBlocked {
                    task_id: task_id.to_string(),
                    blockers: blockers.to_vec(),
                })
            }
        }
        Rule::Skip { via } => Err(TransitionError::SkipStage {
            task_id: task_id.to_string(),
            from: task.status,
            to,
            via,
        }),
        Rule::Terminal => Err(TransitionError::AlreadyDone {
            task_id: task_id.to_string(),
        }),
    }
}

/// Set the new status and bump `updated`. Callers check first.
pub fn apply(task: &mut Task, to: TaskStatus, now: &str) {
    task.status = to;
    task.updated = now.to_string();
}

/// Dependents of `updated` that became ready because it is now done.
pub fn newly_ready_after(tasks: &[Task], updated: &Task, policy: UnresolvedPolicy) -> Vec<Task> {
    if updated.status != TaskStatus::Done {
        return Vec::new();
    }
    let after: Vec<Task> = tasks
        .iter()
        .map(|t| if t.id == updated.id { updated.clone() } else { t.clone() })
        .collect();
    let graph = DependencyGraph::build(&after, policy);
    next_tasks::newly_ready(&graph, &updated.id)
        .into_iter()
        .cloned()
        .collect()
}

#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub task: Task,
    pub from: TaskStatus,
    pub changed: bool,
    pub newly_ready: Vec<Task>,
}

/// Load, check, and persist a single status change.
pub fn request_transition(
    store: &Store,
    project_id: &str,
    task_id: &str,
    new_status: TaskStatus,
    workflow: Workflow,
    policy: UnresolvedPolicy,
) -> Result<TransitionOutcome> {
    let loaded = loader::load_project_tasks(store, project_id);
    let graph = DependencyGraph::build(&loaded.tasks, policy);
    let step = check_transition(&graph, project_id, task_id, new_status, workflow)?;

    let mut task = task_repo::get_task(&loaded, project_id, task_id)?;
    let from = task.status;
    if step == Step::Unchanged {
        return Ok(TransitionOutcome {
            task,
            from,
            changed: false,
            newly_ready: Vec::new(),
        });
    }

    apply(&mut task, new_status, &now_timestamp());
    task_repo::save_task(store, &task)?;
    tracing::info!(
        project = %project_id,
        task = %task_id,
        from = from.as_str(),
        to = new_status.as_str(),
        "status changed"
    );

    let newly_ready = newly_ready_after(&loaded.tasks, &task, policy);
    Ok(TransitionOutcome {
        task,
        from,
        changed: true,
        newly_ready,
    })
}
