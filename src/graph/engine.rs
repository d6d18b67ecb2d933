//! Classifies every task of a project as done / in progress / review /
//! ready / blocked.
//!
//! Only a task's immediate dependencies are inspected, so the pass is
//! O(tasks × dependencies) and terminates on cyclic graphs. Blocked is a
//! derived state and is never written back to a record.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{natural_cmp, Task, TaskStatus};

/// How a dependency id that matches no task in the project is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Dangling ids count as satisfied (historical behaviour).
    #[default]
    Satisfied,
    /// Dangling ids block the task until the reference is fixed.
    Blocking,
}

impl UnresolvedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Satisfied => "satisfied",
            Self::Blocking => "blocking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Done,
    InProgress,
    Review,
    Ready,
    Blocked,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Ready => "ready",
            Self::Blocked => "blocked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Blocker {
    /// A dependency that exists but is not done yet.
    Task {
        id: String,
        title: String,
        status: TaskStatus,
    },
    /// A dependency id with no matching task (only under
    /// [`UnresolvedPolicy::Blocking`]).
    Missing { id: String },
}

impl Blocker {
    pub fn id(&self) -> &str {
        match self {
            Self::Task { id, .. } | Self::Missing { id } => id,
        }
    }

    /// Human label: the title when known, the raw id otherwise.
    pub fn label(&self) -> String {
        match self {
            Self::Task { id, title, .. } if title.is_empty() => id.clone(),
            Self::Task { title, .. } => title.clone(),
            Self::Missing { id } => format!("{id} (missing)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskState {
    pub classification: Classification,
    /// Unmet dependencies in the order they are listed on the task. Empty
    /// unless the task is blocked.
    pub blockers: Vec<Blocker>,
    /// Dependency ids that match no task in the project.
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub review: usize,
    pub ready: usize,
    pub blocked: usize,
}

impl Counts {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.done as f64 * 100.0 / self.total as f64
    }
}

pub struct DependencyGraph<'a> {
    tasks: &'a [Task],
    index: HashMap<&'a str, usize>,
    states: Vec<TaskState>,
    policy: UnresolvedPolicy,
}

impl<'a> DependencyGraph<'a> {
    pub fn build(tasks: &'a [Task], policy: UnresolvedPolicy) -> Self {
        let mut index = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            index.entry(task.id.as_str()).or_insert(i);
        }
        let states = tasks
            .iter()
            .map(|task| classify(task, tasks, &index, policy))
            .collect();
        Self {
            tasks,
            index,
            states,
            policy,
        }
    }

    pub fn policy(&self) -> UnresolvedPolicy {
        self.policy
    }

    pub fn tasks(&self) -> &'a [Task] {
        self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&'a Task> {
        self.index.get(id).map(|&i| &self.tasks[i])
    }

    pub fn state(&self, id: &str) -> Option<&TaskState> {
        self.index.get(id).map(|&i| &self.states[i])
    }

    pub fn classification(&self, id: &str) -> Option<Classification> {
        self.state(id).map(|s| s.classification)
    }

    pub fn blockers(&self, id: &str) -> &[Blocker] {
        match self.state(id) {
            Some(state) => state.blockers.as_slice(),
            None => &[],
        }
    }

    pub fn is_blocked(&self, id: &str) -> bool {
        self.classification(id) == Some(Classification::Blocked)
    }

    /// Tasks paired with their computed state, in load order.
    pub fn entries(&self) -> impl Iterator<Item = (&'a Task, &TaskState)> + '_ {
        self.tasks.iter().zip(self.states.iter())
    }

    pub fn with_classification(&self, c: Classification) -> Vec<(&'a Task, &TaskState)> {
        self.entries()
            .filter(|(_, s)| s.classification == c)
            .collect()
    }

    /// Ready tasks, highest priority first, then natural id order.
    pub fn ready_tasks(&self) -> Vec<&'a Task> {
        let mut ready: Vec<&Task> = self
            .with_classification(Classification::Ready)
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        ready.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| natural_cmp(&a.id, &b.id))
        });
        ready
    }

    pub fn blocked_tasks(&self) -> Vec<(&'a Task, &TaskState)> {
        self.with_classification(Classification::Blocked)
    }

    /// Tasks that list `id` among their dependencies.
    pub fn dependents(&self, id: &str) -> Vec<&'a Task> {
        self.tasks
            .iter()
            .filter(|t| t.dependency_ids.iter().any(|d| d == id))
            .collect()
    }

    pub fn counts(&self) -> Counts {
        let mut counts = Counts {
            total: self.tasks.len(),
            ..Counts::default()
        };
        for state in &self.states {
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
}

fn classify(
    task: &Task,
    tasks: &[Task],
    index: &HashMap<&str, usize>,
    policy: UnresolvedPolicy,
) -> TaskState {
    let mut blockers = Vec::new();
    let mut unresolved = Vec::new();

    for dep_id in &task.dependency_ids {
        match index.get(dep_id.as_str()) {
            Some(&i) => {
                let dep = &tasks[i];
                if dep.status != TaskStatus::Done {
                    blockers.push(Blocker::Task {
                        id: dep.id.clone(),
                        title: dep.title.clone(),
                        status: dep.status,
                    });
                }
            }
            None => {
                unresolved.push(dep_id.clone());
                if policy == UnresolvedPolicy::Blocking {
                    blockers.push(Blocker::Missing { id: dep_id.clone() });
                }
            }
        }
    }

    let classification = match task.status {
        TaskStatus::Done => Classification::Done,
        TaskStatus::InProgress => Classification::InProgress,
        TaskStatus::Review => Classification::Review,
        TaskStatus::Todo if blockers.is_empty() => Classification::Ready,
        TaskStatus::Todo => Classification::Blocked,
    };
    if classification != Classification::Blocked {
        blockers.clear();
    }

    TaskState {
        classification,
        blockers,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn task(id: &str, status: TaskStatus, deps: &[&str]) -> Task {
        let mut t = Task::new(id, "web", Some("P1"), &format!("Task {id}"), "t");
        t.status = status;
        t.dependency_ids = deps.iter().map(|d| d.to_string()).collect();
        t
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    fn blocked_ids(graph: &DependencyGraph<'_>) -> Vec<String> {
        graph.blocked_tasks().iter().map(|(t, _)| t.id.clone()).collect()
    }

    #[test]
    fn test_no_dependencies_never_blocked() {
        let tasks = vec![
            task("A", TaskStatus::Todo, &[]),
            task("B", TaskStatus::InProgress, &[]),
            task("C", TaskStatus::Done, &[]),
        ];
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        for t in &tasks {
            assert!(!graph.is_blocked(&t.id));
        }
        assert_eq!(graph.classification("A"), Some(Classification::Ready));
    }

    #[test]
    fn test_blocker_list_is_exactly_unmet_deps_in_order() {
        let tasks = vec![
            task("A", TaskStatus::Done, &[]),
            task("B", TaskStatus::Todo, &[]),
            task("C", TaskStatus::InProgress, &[]),
            task("D", TaskStatus::Todo, &["C", "A", "B"]),
        ];
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        assert!(graph.is_blocked("D"));
        let blockers: Vec<_> = graph.blockers("D").iter().map(Blocker::id).collect();
        assert_eq!(blockers, vec!["C", "B"]);
    }

    #[test]
    fn test_partially_done_dependencies_still_block() {
        let tasks = vec![
            task("A", TaskStatus::Done, &[]),
            task("B", TaskStatus::Todo, &[]),
            task("X", TaskStatus::Todo, &["A", "B"]),
        ];
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        assert!(graph.is_blocked("X"));
        assert_eq!(
            graph.blockers("X"),
            &[Blocker::Task {
                id: "B".into(),
                title: "Task B".into(),
                status: TaskStatus::Todo,
            }]
        );
    }

    #[test]
    fn test_chain_progression() {
        let mut tasks = vec![
            task("A", TaskStatus::Todo, &[]),
            task("B", TaskStatus::Todo, &["A"]),
            task("C", TaskStatus::Todo, &["A", "B"]),
        ];
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        assert_eq!(ids(&graph.ready_tasks()), vec!["A"]);
        assert_eq!(blocked_ids(&graph), vec!["B", "C"]);

        tasks[0].status = TaskStatus::Done;
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        assert_eq!(ids(&graph.ready_tasks()), vec!["B"]);
        assert_eq!(blocked_ids(&graph), vec!["C"]);

        tasks[1].status = TaskStatus::Done;
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        assert_eq!(ids(&graph.ready_tasks()), vec!["C"]);
        assert!(blocked_ids(&graph).is_empty());
    }

    #[test]
    fn test_unresolved_dependency_satisfied_by_default() {
        let tasks = vec![task("A", TaskStatus::Todo, &["T9.9", "other-project:T1.1"])];
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        assert_eq!(graph.classification("A"), Some(Classification::Ready));
        assert_eq!(
            graph.state("A").unwrap().unresolved,
            vec!["T9.9".to_string(), "other-project:T1.1".to_string()]
        );
    }

    #[test]
    fn test_unresolved_dependency_blocks_under_blocking_policy() {
        let tasks = vec![task("A", TaskStatus::Todo, &["T9.9"])];
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Blocking);
        assert!(graph.is_blocked("A"));
        assert_eq!(graph.blockers("A"), &[Blocker::Missing { id: "T9.9".into() }]);
        assert_eq!(graph.blockers("A")[0].label(), "T9.9 (missing)");
    }

    #[test]
    fn test_cycle_does_not_hang_and_stays_blocked() {
        let tasks = vec![
            task("A", TaskStatus::Todo, &["B"]),
            task("B", TaskStatus::Todo, &["A"]),
        ];
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        assert!(graph.is_blocked("A"));
        assert!(graph.is_blocked("B"));
        assert!(graph.ready_tasks().is_empty());
    }

    #[test]
    fn test_non_todo_tasks_have_no_blockers() {
        let tasks = vec![
            task("A", TaskStatus::Todo, &[]),
            task("B", TaskStatus::InProgress, &["A"]),
        ];
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        assert_eq!(graph.classification("B"), Some(Classification::InProgress));
        assert!(graph.blockers("B").is_empty());
    }

    #[test]
    fn test_ready_ordered_by_priority_then_id() {
        let mut tasks = vec![
            task("T1.10", TaskStatus::Todo, &[]),
            task("T1.2", TaskStatus::Todo, &[]),
            task("T1.3", TaskStatus::Todo, &[]),
            task("T1.4", TaskStatus::Todo, &[]),
        ];
        tasks[0].priority = Priority::High;
        tasks[1].priority = Priority::Low;
        tasks[3].priority = Priority::Critical;
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        assert_eq!(ids(&graph.ready_tasks()), vec!["T1.4", "T1.10", "T1.3", "T1.2"]);
    }

    #[test]
    fn test_counts_and_dependents() {
        let tasks = vec![
            task("A", TaskStatus::Done, &[]),
            task("B", TaskStatus::Todo, &["A"]),
            task("C", TaskStatus::Todo, &["B"]),
            task("D", TaskStatus::Review, &[]),
            task("E", TaskStatus::InProgress, &["A"]),
        ];
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        let counts = graph.counts();
        assert_eq!(
            counts,
            Counts {
                total: 5,
                done: 1,
                in_progress: 1,
                review: 1,
                ready: 1,
                blocked: 1,
            }
        );
        assert_eq!(counts.percentage(), 20.0);
        assert_eq!(ids(&graph.dependents("A")), vec!["B", "E"]);
    }
}
