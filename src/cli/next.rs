use serde_json::json;

use crate::cli::Context;
use crate::error::Result;
use crate::graph::{next_tasks, Classification, Counts, DependencyGraph};
use crate::lifecycle::{self, Step};
use crate::models::{now_timestamp, Task, TaskStatus};
use crate::output;
use crate::report;
use crate::store::{loader, task_repo};
use crate::validate;

pub fn run(claim: bool, assignee: Option<&str>, ctx: &Context) -> i32 {
    let result = run_inner(claim, assignee, ctx);
    crate::cli::finish(result, ctx.json)
}

/// Why there is nothing to pick up.
fn idle_reason(counts: &Counts) -> &'static str {
    if counts.total == 0 {
        "NO_TASKS"
    } else if counts.done == counts.total {
        "ALL_DONE"
    } else if counts.blocked > 0 {
        "BLOCKED_REMAINING"
    } else if counts.in_progress == 0 && counts.review > 0 {
        "ALL_IN_REVIEW"
    } else {
        "ALL_IN_PROGRESS"
    }
}

fn run_inner(claim: bool, assignee: Option<&str>, ctx: &Context) -> Result<()> {
    if let Some(assignee) = assignee {
        validate::validate_text("assignee", assignee)?;
    }
    let project_id = ctx.project_id()?;
    let loaded = loader::load_project_tasks(&ctx.store, &project_id);
    let graph = DependencyGraph::build(&loaded.tasks, ctx.config.unresolved);
    let mut counts = graph.counts();

    let in_progress: Vec<&Task> = graph
        .with_classification(Classification::InProgress)
        .into_iter()
        .map(|(t, _)| t)
        .collect();
    let in_progress_json: Vec<_> = in_progress
        .iter()
        .map(|t| output::json::task_summary(t))
        .collect();

    let Some(next) = next_tasks::next_ready(&graph) else {
        let reason = idle_reason(&counts);
        if ctx.json {
            let blocked = report::blocked_report(&project_id, &graph, None);
            output::json::emit(&output::json::success_with_warnings(
                json!({
                    "task": null,
                    "reason": reason,
                    "blocked_tasks": output::json::to_value(&blocked.blocked)?,
                    "in_progress": in_progress_json,
                    "progress": output::json::counts_json(&counts)
                }),
                &loaded.warnings,
            ));
        } else {
            match reason {
                "NO_TASKS" => println!("No tasks in {project_id}."),
                "ALL_DONE" => println!("All {} tasks in {project_id} are done.", counts.total),
                _ => println!(
                    "No ready tasks. {} blocked, {} in progress, {} in review.",
                    counts.blocked, counts.in_progress, counts.review
                ),
            }
            if !in_progress.is_empty() {
                println!("In progress:");
                for t in &in_progress {
                    println!("  {} - {}", t.id, t.display_title());
                }
            }
            output::text::print_warnings(&loaded.warnings);
        }
        return Ok(());
    };

    let mut task = next.clone();
    let state = graph.state(&task.id).cloned();
    if claim {
        let step = lifecycle::check_transition(
            &graph,
            &project_id,
            &task.id,
            TaskStatus::InProgress,
            ctx.config.workflow,
        )?;
        let now = now_timestamp();
        if step == Step::Apply {
            lifecycle::apply(&mut task, TaskStatus::InProgress, &now);
        }
        if let Some(assignee) = assignee {
            task.assignee = Some(assignee.to_string());
            task.updated = now;
        }
        task_repo::save_task(&ctx.store, &task)?;
        counts.ready -= 1;
        counts.in_progress += 1;
        tracing::info!(project = %project_id, task = %task.id, "claimed task");
    }

    if ctx.json {
        let state = if claim { None } else { state.as_ref() };
        output::json::emit(&output::json::success_with_warnings(
            json!({
                "task": output::json::task_detail(&task, state),
                "claimed": claim,
                "in_progress": in_progress_json,
                "progress": output::json::counts_json(&counts)
            }),
            &loaded.warnings,
        ));
    } else {
        if claim {
            println!("Claimed task: {} ({})", task.display_title(), task.id);
        } else {
            println!("Next task: {} ({})", task.display_title(), task.id);
        }
        if !task.description.is_empty() {
            println!("  {}", task.description);
        }
        println!("  Status: {}", task.status.as_str());
        println!("  Priority: {}", task.priority.as_str());
        if let Some(ref phase) = task.phase_id {
            println!("  Phase: {phase}");
        }
        output::text::print_warnings(&loaded.warnings);
    }
    Ok(())
}
