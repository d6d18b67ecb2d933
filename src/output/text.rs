use crate::graph::{Counts, TaskState};
use crate::models::{Phase, Project, Task};
use crate::report::{ActiveReport, BlockedEntry, BlockedReport, DependencyReport, ProjectSummary, TaskRef};
use crate::store::PartialRead;

pub fn print_project(p: &Project) {
    println!("Project: {} ({})", p.name, p.id);
    if !p.description.is_empty() {
        println!("  Description: {}", p.description);
    }
    println!("  Status: {}", p.status.as_str());
    if !p.owner.is_empty() {
        println!("  Owner: {}", p.owner);
    }
    if let Some(ref phase) = p.current_phase {
        println!("  Current phase: {phase}");
    }
    println!("  Created: {}", p.created);
    println!("  Updated: {}", p.updated);
}

pub fn print_project_list(projects: &[Project]) {
    if projects.is_empty() {
        println!("No projects found.");
        return;
    }
    for p in projects {
        println!("  {} [{}] - {}", p.id, p.status.as_str(), p.name);
    }
}

pub fn print_phase(p: &Phase) {
    println!("Phase: {} ({})", p.name, p.id);
    println!("  Project: {}", p.project_id);
    println!("  Status: {}", p.status.as_str());
    if let Some(ref goal) = p.goal {
        println!("  Goal: {goal}");
    }
    if let Some(ref start) = p.start_date {
        println!("  Start: {start}");
    }
    if let Some(ref end) = p.end_date {
        println!("  End: {end}");
    }
}

pub fn print_phase_list(phases: &[Phase]) {
    if phases.is_empty() {
        println!("No phases found.");
        return;
    }
    for p in phases {
        println!("  {} [{}] - {}", p.id, p.status.as_str(), p.name);
    }
}

pub fn print_task(t: &Task, state: Option<&TaskState>) {
    println!("Task: {} ({})", t.display_title(), t.id);
    if !t.description.is_empty() {
        println!("  Description: {}", t.description);
    }
    if let Some(ref phase) = t.phase_id {
        println!("  Phase: {phase}");
    }
    println!("  Status: {}", t.status.as_str());
    if let Some(state) = state {
        println!("  State: {}", state.classification.as_str());
    }
    println!("  Priority: {}", t.priority.as_str());
    if let Some(ref assignee) = t.assignee {
        println!("  Assignee: {assignee}");
    }
    println!("  Created: {}", t.created);
    println!("  Updated: {}", t.updated);
    if let Some(state) = state {
        if !state.blockers.is_empty() {
            let labels: Vec<_> = state.blockers.iter().map(|b| b.label()).collect();
            println!("  Blocked by: {}", labels.join(", "));
        }
    }
}

pub fn print_task_list(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    for t in tasks {
        let assignee = t.assignee.as_deref().unwrap_or("");
        println!(
            "  [{}] {} - {} p={} {}",
            t.status.as_str(),
            t.id,
            t.display_title(),
            t.priority.as_str(),
            if assignee.is_empty() { String::new() } else { format!("@{assignee}") }
        );
    }
}

pub fn print_counts(c: &Counts) {
    println!("Progress: {:.1}% ({}/{})", c.percentage(), c.done, c.total);
    println!(
        "  done={} in_progress={} review={} ready={} blocked={}",
        c.done, c.in_progress, c.review, c.ready, c.blocked
    );
}

fn print_ref(t: &TaskRef) {
    let assignee = t.assignee.as_deref().map(|a| format!(" @{a}")).unwrap_or_default();
    println!("  {} - {} ({} priority){}", t.id, t.title, t.priority.as_str(), assignee);
}

fn print_blocked_entry(entry: &BlockedEntry) {
    let labels: Vec<_> = entry.blockers.iter().map(|b| b.label()).collect();
    println!("  {} - {} (blocked by: {})", entry.task.id, entry.task.title, labels.join(", "));
}

fn print_cycles(cycles: &[Vec<String>]) {
    if cycles.is_empty() {
        return;
    }
    println!("\nDependency cycles (these tasks can never become ready):");
    for cycle in cycles {
        println!("  {} -> {}", cycle.join(" -> "), cycle[0]);
    }
}

/// Skipped records go to stderr so stdout stays a clean report.
pub fn print_warnings(warnings: &[PartialRead]) {
    for w in warnings {
        eprintln!("warning: skipped {}: {}", w.path.display(), w.reason);
    }
}

pub fn print_summary(s: &ProjectSummary) {
    println!("Project Status: {}", s.project_id);
    println!();
    print_counts(&s.counts);

    if !s.blocked.is_empty() {
        println!("\nBlocked:");
        s.blocked.iter().for_each(print_blocked_entry);
    }
    if !s.ready.is_empty() {
        println!("\nReady to work on:");
        s.ready.iter().for_each(print_ref);
    }
    if !s.in_progress.is_empty() {
        println!("\nIn progress:");
        s.in_progress.iter().for_each(print_ref);
    }
    if !s.review.is_empty() {
        println!("\nIn review:");
        s.review.iter().for_each(print_ref);
    }
    if !s.unresolved.is_empty() {
        println!("\nUnresolved dependencies:");
        for u in &s.unresolved {
            println!("  {} -> {} (no such task)", u.task_id, u.dependency_id);
        }
    }
    print_cycles(&s.cycles);
    print_warnings(&s.warnings);
}

pub fn print_blocked(r: &BlockedReport) {
    println!("Blocked tasks in {}:", r.project_id);
    if r.blocked.is_empty() {
        println!("  No blocked tasks.");
        return;
    }
    r.blocked.iter().for_each(print_blocked_entry);
}

pub fn print_dependencies(r: &DependencyReport) {
    println!("Dependency chain for {}:", r.project_id);
    if r.tasks.is_empty() {
        println!("  No task has dependencies.");
    }
    for entry in &r.tasks {
        println!(
            "  {} - {} [{}]",
            entry.task.id,
            entry.task.title,
            entry.classification.as_str()
        );
        for dep in &entry.dependencies {
            let mark = if dep.satisfied { "ok" } else { "waiting" };
            match (&dep.title, dep.status) {
                (Some(title), Some(status)) => {
                    println!("    [{mark}] {} - {} ({})", dep.id, title, status.as_str())
                }
                _ => println!("    [{mark}] {} (missing)", dep.id),
            }
        }
    }
    print_cycles(&r.cycles);
}

pub fn print_active(r: &ActiveReport) {
    println!("Active tasks in {}:", r.project_id);
    if r.ready.is_empty() && r.in_progress.is_empty() {
        println!("  No active tasks.");
        return;
    }
    if !r.in_progress.is_empty() {
        println!("In progress:");
        r.in_progress.iter().for_each(print_ref);
    }
    if !r.ready.is_empty() {
        println!("Ready:");
        r.ready.iter().for_each(print_ref);
    }
}
