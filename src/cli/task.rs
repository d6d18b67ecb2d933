use serde_json::json;

use crate::cli::commands::{DepCommands, TaskCommands};
use crate::cli::Context;
use crate::error::{Result, TrackerError};
use crate::graph::{cycle, DependencyGraph};
use crate::lifecycle::{self, Step};
use crate::models::{now_timestamp, Priority, Task, TaskStatus};
use crate::output;
use crate::store::{loader, task_repo};
use crate::validate;

pub fn run(cmd: TaskCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        TaskCommands::Create {
            id,
            phase,
            title,
            description,
            priority,
            assignee,
            after,
        } => run_create(
            ctx,
            NewTask {
                id,
                phase,
                title,
                description,
                priority,
                assignee,
                after,
            },
        ),
        TaskCommands::Show { id } => run_show(ctx, &id),
        TaskCommands::Update {
            id,
            status,
            priority,
            assignee,
            title,
            description,
        } => run_update(
            ctx,
            &id,
            TaskEdits {
                status,
                priority,
                assignee,
                title,
                description,
            },
        ),
        TaskCommands::Start { id } => run_transition(ctx, &id, TaskStatus::InProgress),
        TaskCommands::Done { id } => run_transition(ctx, &id, TaskStatus::Done),
        TaskCommands::Dep(dep_cmd) => run_dep(dep_cmd, ctx),
    };
    crate::cli::finish(result, ctx.json)
}

struct NewTask {
    id: String,
    phase: Option<String>,
    title: Option<String>,
    description: Option<String>,
    priority: String,
    assignee: Option<String>,
    after: Vec<String>,
}

struct TaskEdits {
    status: Option<String>,
    priority: Option<String>,
    assignee: Option<String>,
    title: Option<String>,
    description: Option<String>,
}

impl TaskEdits {
    fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.assignee.is_none()
            && self.title.is_none()
            && self.description.is_none()
    }
}

pub fn parse_status(s: &str) -> Result<TaskStatus> {
    TaskStatus::from_str(s).ok_or_else(|| {
        TrackerError::validation(format!(
            "Invalid task status '{s}'. Expected one of: todo, in_progress, review, done"
        ))
    })
}

pub fn parse_priority(s: &str) -> Result<Priority> {
    Priority::from_str(s).ok_or_else(|| {
        TrackerError::validation(format!(
            "Invalid priority '{s}'. Expected one of: low, medium, high, critical"
        ))
    })
}

fn self_dependency(id: &str) -> TrackerError {
    TrackerError::validation(format!("Task {id} cannot depend on itself"))
}

fn run_create(ctx: &Context, new: NewTask) -> Result<()> {
    if let Some(phase) = new.phase.as_deref() {
        validate::validate_phase_id(phase)?;
    }
    validate::validate_task_id(&new.id, new.phase.as_deref())?;
    let title = new.title.unwrap_or_else(|| new.id.clone());
    validate::validate_text("title", &title)?;
    if let Some(ref description) = new.description {
        validate::validate_text("description", description)?;
    }
    if let Some(ref assignee) = new.assignee {
        validate::validate_text("assignee", assignee)?;
    }
    let priority = parse_priority(&new.priority)?;

    // Resolve deps first (before any writes) to fail fast
    let mut deps: Vec<String> = Vec::new();
    for dep in &new.after {
        validate::validate_task_id(dep, None)?;
        if *dep == new.id {
            return Err(self_dependency(&new.id));
        }
        if !deps.contains(dep) {
            deps.push(dep.clone());
        }
    }
    let project_id = ctx.project_id()?;

    let mut task = Task::new(
        &new.id,
        &project_id,
        new.phase.as_deref(),
        &title,
        &now_timestamp(),
    );
    task.priority = priority;
    task.description = new.description.unwrap_or_default();
    task.assignee = new.assignee;
    task.dependency_ids = deps;
    let created = task_repo::create_task(&ctx.store, &task)?;

    let loaded = loader::load_project_tasks(&ctx.store, &project_id);
    let graph = DependencyGraph::build(&loaded.tasks, ctx.config.unresolved);
    let state = graph.state(&created.id);
    if let Some(state) = state {
        for dep in &state.unresolved {
            tracing::warn!(task = %created.id, dependency = %dep, "dependency matches no task in the project");
        }
    }

    if ctx.json {
        output::json::emit(&output::json::success(json!({
            "task": output::json::task_detail(&created, state)
        })));
    } else {
        println!("Created task: {} ({})", created.title, created.id);
        if let Some(state) = state {
            println!("  State: {}", state.classification.as_str());
            if !state.blockers.is_empty() {
                let labels: Vec<_> = state.blockers.iter().map(|b| b.label()).collect();
                println!("  Blocked by: {}", labels.join(", "));
            }
        }
    }
    Ok(())
}

fn run_show(ctx: &Context, id: &str) -> Result<()> {
    validate::validate_task_id(id, None)?;
    let project_id = ctx.project_id()?;
    let loaded = loader::load_project_tasks(&ctx.store, &project_id);
    let graph = DependencyGraph::build(&loaded.tasks, ctx.config.unresolved);
    let task = graph
        .get(id)
        .ok_or_else(|| TrackerError::task_not_found(&project_id, id))?;
    let state = graph.state(id);
    let dependents = graph.dependents(id);

    if ctx.json {
        let deps_json: Vec<_> = task
            .dependency_ids
            .iter()
            .map(|d| match graph.get(d) {
                Some(dep) => output::json::task_summary(dep),
                None => json!({ "id": d, "missing": true }),
            })
            .collect();
        let dependents_json: Vec<_> = dependents
            .iter()
            .map(|t| output::json::task_summary(t))
            .collect();
        output::json::emit(&output::json::success_with_warnings(
            json!({
                "task": output::json::task_detail(task, state),
                "dependencies": deps_json,
                "dependents": dependents_json
            }),
            &loaded.warnings,
        ));
    } else {
        output::text::print_task(task, state);
        if !task.dependency_ids.is_empty() {
            println!("\nDependencies:");
            for d in &task.dependency_ids {
                match graph.get(d) {
                    Some(dep) => println!("  [{}] {} - {}", dep.status.as_str(), dep.id, dep.display_title()),
                    None => println!("  [missing] {d}"),
                }
            }
        }
        if !dependents.is_empty() {
            println!("\nDependents:");
            for t in &dependents {
                println!("  [{}] {} - {}", t.status.as_str(), t.id, t.display_title());
            }
        }
        output::text::print_warnings(&loaded.warnings);
    }
    Ok(())
}

fn run_update(ctx: &Context, id: &str, edits: TaskEdits) -> Result<()> {
    validate::validate_task_id(id, None)?;
    if edits.is_empty() {
        return Err(TrackerError::validation(
            "Nothing to update. Pass at least one of --status, --priority, --assignee, --title, --description",
        ));
    }
    let status = edits.status.as_deref().map(parse_status).transpose()?;
    let priority = edits.priority.as_deref().map(parse_priority).transpose()?;
    for (field, value) in [
        ("title", &edits.title),
        ("description", &edits.description),
        ("assignee", &edits.assignee),
    ] {
        if let Some(value) = value {
            validate::validate_text(field, value)?;
        }
    }
    let project_id = ctx.project_id()?;

    let loaded = loader::load_project_tasks(&ctx.store, &project_id);
    let graph = DependencyGraph::build(&loaded.tasks, ctx.config.unresolved);
    let step = match status {
        Some(to) => lifecycle::check_transition(&graph, &project_id, id, to, ctx.config.workflow)?,
        None => Step::Unchanged,
    };

    let mut task = task_repo::get_task(&loaded, &project_id, id)?;
    let from = task.status;
    let mut changed = false;
    if let Some(priority) = priority {
        changed |= task.priority != priority;
        task.priority = priority;
    }
    if let Some(assignee) = edits.assignee {
        changed |= task.assignee.as_deref() != Some(assignee.as_str());
        task.assignee = Some(assignee);
    }
    if let Some(title) = edits.title {
        changed |= task.title != title;
        task.title = title;
    }
    if let Some(description) = edits.description {
        changed |= task.description != description;
        task.description = description;
    }

    let now = now_timestamp();
    if let (Step::Apply, Some(to)) = (step, status) {
        lifecycle::apply(&mut task, to, &now);
        changed = true;
    }
    if changed {
        task.updated = now;
        task_repo::save_task(&ctx.store, &task)?;
        tracing::info!(project = %project_id, task = %id, "updated task");
    }

    let newly_ready = if task.status != from {
        lifecycle::newly_ready_after(&loaded.tasks, &task, ctx.config.unresolved)
    } else {
        Vec::new()
    };
    print_outcome(ctx, &task, from, changed, &newly_ready);
    Ok(())
}

fn run_transition(ctx: &Context, id: &str, to: TaskStatus) -> Result<()> {
    validate::validate_task_id(id, None)?;
    let project_id = ctx.project_id()?;
    let outcome = lifecycle::request_transition(
        &ctx.store,
        &project_id,
        id,
        to,
        ctx.config.workflow,
        ctx.config.unresolved,
    )?;
    print_outcome(ctx, &outcome.task, outcome.from, outcome.changed, &outcome.newly_ready);
    Ok(())
}

fn print_outcome(ctx: &Context, task: &Task, from: TaskStatus, changed: bool, newly_ready: &[Task]) {
    if ctx.json {
        output::json::emit(&output::json::success(json!({
            "task": output::json::task_summary(task),
            "from": from.as_str(),
            "to": task.status.as_str(),
            "changed": changed,
            "newly_ready": newly_ready.iter().map(output::json::task_summary).collect::<Vec<_>>()
        })));
        return;
    }

    if task.status != from {
        println!("Task {} → {}", task.id, task.status.as_str());
    } else if changed {
        println!("Updated task: {} ({})", task.display_title(), task.id);
    } else {
        println!("Task {} unchanged ({})", task.id, task.status.as_str());
    }
    if !newly_ready.is_empty() {
        println!("Newly ready:");
        for t in newly_ready {
            println!("  {} - {}", t.id, t.display_title());
        }
    }
}

fn run_dep(cmd: DepCommands, ctx: &Context) -> Result<()> {
    match cmd {
        DepCommands::Add { id, dep_id } => {
            validate::validate_task_id(&id, None)?;
            validate::validate_task_id(&dep_id, None)?;
            if id == dep_id {
                return Err(self_dependency(&id));
            }
            let project_id = ctx.project_id()?;
            let loaded = loader::load_project_tasks(&ctx.store, &project_id);
            let mut task = task_repo::get_task(&loaded, &project_id, &id)?;
            let unresolved = loaded.find(&dep_id).is_none();
            if unresolved {
                tracing::warn!(task = %id, dependency = %dep_id, "dependency matches no task in the project");
            }
            if task.dependency_ids.contains(&dep_id) {
                return Err(TrackerError::already_exists(
                    "Dependency",
                    &format!("{id} -> {dep_id}"),
                ));
            }

            let closes = cycle::would_create_cycle(&loaded.tasks, &id, &dep_id);
            if let Some(ref path) = closes {
                tracing::warn!(cycle = %path.join(" -> "), "dependency closes a cycle");
            }

            task.dependency_ids.push(dep_id.clone());
            task.updated = now_timestamp();
            task_repo::save_task(&ctx.store, &task)?;

            if ctx.json {
                output::json::emit(&output::json::success(json!({
                    "added": { "task_id": id, "dependency_id": dep_id },
                    "unresolved": unresolved,
                    "cycle": closes
                })));
            } else {
                println!("Added dependency: {id} depends on {dep_id}");
                if unresolved {
                    eprintln!("Warning: no task {dep_id} in {project_id} yet; it is reported as unresolved");
                }
                if let Some(path) = closes {
                    eprintln!(
                        "Warning: this closes a dependency cycle ({} -> {}); these tasks can never become ready",
                        path.join(" -> "),
                        path[0]
                    );
                }
            }
            Ok(())
        }
        DepCommands::Remove { id, dep_id } => {
            validate::validate_task_id(&id, None)?;
            // Not format-checked: stale references from older data must stay removable.
            validate::validate_text("dependency id", &dep_id)?;
            let project_id = ctx.project_id()?;
            let loaded = loader::load_project_tasks(&ctx.store, &project_id);
            let mut task = task_repo::get_task(&loaded, &project_id, &id)?;

            let before = task.dependency_ids.len();
            task.dependency_ids.retain(|d| *d != dep_id);
            if task.dependency_ids.len() == before {
                return Err(TrackerError::validation(format!(
                    "Task {id} does not depend on {dep_id}"
                )));
            }
            task.updated = now_timestamp();
            task_repo::save_task(&ctx.store, &task)?;

            if ctx.json {
                output::json::emit(&output::json::success(json!({
                    "removed": { "task_id": id, "dependency_id": dep_id }
                })));
            } else {
                println!("Removed dependency: {id} no longer depends on {dep_id}");
            }
            Ok(())
        }
    }
}
