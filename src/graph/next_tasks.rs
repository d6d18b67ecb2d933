use crate::models::Task;

use super::engine::{Classification, DependencyGraph};

/// After `completed_id` reached done: its dependents that are now ready.
/// Nothing is stored; the caller rebuilt `graph` from the updated task set.
pub fn newly_ready<'a>(graph: &DependencyGraph<'a>, completed_id: &str) -> Vec<&'a Task> {
    graph
        .dependents(completed_id)
        .into_iter()
        .filter(|t| graph.classification(&t.id) == Some(Classification::Ready))
        .collect()
}

/// The ready task to pick up next: highest priority, then lowest id.
pub fn next_ready<'a>(graph: &DependencyGraph<'a>) -> Option<&'a Task> {
    graph.ready_tasks().into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::UnresolvedPolicy;
    use crate::models::{Priority, TaskStatus};

    fn task(id: &str, status: TaskStatus, deps: &[&str]) -> Task {
        let mut t = Task::new(id, "web", None, id, "t");
        t.status = status;
        t.dependency_ids = deps.iter().map(|d| d.to_string()).collect();
        t
    }

    #[test]
    fn test_newly_ready_requires_all_deps_done() {
        let tasks = vec![
            task("A", TaskStatus::Done, &[]),
            task("B", TaskStatus::Todo, &[]),
            task("C", TaskStatus::Todo, &["A"]),
            task("D", TaskStatus::Todo, &["A", "B"]),
        ];
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        let ready: Vec<_> = newly_ready(&graph, "A").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ready, vec!["C"]);
    }

    #[test]
    fn test_next_ready_prefers_priority() {
        let mut tasks = vec![task("T1.1", TaskStatus::Todo, &[]), task("T1.2", TaskStatus::Todo, &[])];
        tasks[1].priority = Priority::Critical;
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        assert_eq!(next_ready(&graph).unwrap().id, "T1.2");
    }

    #[test]
    fn test_next_ready_none_when_all_blocked() {
        let tasks = vec![task("A", TaskStatus::InProgress, &[]), task("B", TaskStatus::Todo, &["A"])];
        let graph = DependencyGraph::build(&tasks, UnresolvedPolicy::Satisfied);
        assert!(next_ready(&graph).is_none());
    }
}
