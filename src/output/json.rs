use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{Result, TrackerError};
use crate::graph::{Counts, TaskState};
use crate::models::{Phase, Project, Task};
use crate::store::PartialRead;

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

/// Success envelope that also carries records the loader had to skip.
pub fn success_with_warnings(data: Value, warnings: &[PartialRead]) -> Value {
    let mut v = success(data);
    if !warnings.is_empty() {
        v["warnings"] = json!(warnings);
    }
    v
}

pub fn error(err: &TrackerError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message
        }
    })
}

pub fn emit(v: &Value) {
    println!("{v:#}");
}

pub fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

pub fn counts_json(c: &Counts) -> Value {
    json!({
        "total": c.total,
        "done": c.done,
        "in_progress": c.in_progress,
        "review": c.review,
        "ready": c.ready,
        "blocked": c.blocked,
        "percentage": (c.percentage() * 10.0).round() / 10.0
    })
}

pub fn project_json(p: &Project) -> Value {
    let mut v = json!({
        "id": p.id,
        "name": p.name,
        "description": p.description,
        "status": p.status.as_str(),
        "owner": p.owner,
        "created": p.created,
        "updated": p.updated
    });
    if let Some(ref phase) = p.current_phase {
        v["current_phase"] = json!(phase);
    }
    v
}

pub fn phase_json(p: &Phase) -> Value {
    json!({
        "id": p.id,
        "project_id": p.project_id,
        "name": p.name,
        "status": p.status.as_str(),
        "goal": p.goal,
        "start_date": p.start_date,
        "end_date": p.end_date,
        "created": p.created,
        "updated": p.updated
    })
}

pub fn task_summary(t: &Task) -> Value {
    let mut v = json!({
        "id": t.id,
        "title": t.title,
        "status": t.status.as_str(),
        "priority": t.priority.as_str()
    });
    if let Some(ref phase) = t.phase_id {
        v["phase_id"] = json!(phase);
    }
    if let Some(ref assignee) = t.assignee {
        v["assignee"] = json!(assignee);
    }
    v
}

/// Full task view. `state` adds the derived classification and blockers.
pub fn task_detail(t: &Task, state: Option<&TaskState>) -> Value {
    let mut v = json!({
        "id": t.id,
        "title": t.title,
        "project_id": t.project_id,
        "phase_id": t.phase_id,
        "description": t.description,
        "status": t.status.as_str(),
        "priority": t.priority.as_str(),
        "assignee": t.assignee,
        "reporter": t.reporter,
        "dependency_ids": t.dependency_ids,
        "labels": t.labels,
        "created": t.created,
        "updated": t.updated
    });
    if let Some(state) = state {
        v["classification"] = json!(state.classification.as_str());
        v["blockers"] = json!(state.blockers);
        if !state.unresolved.is_empty() {
            v["unresolved"] = json!(state.unresolved);
        }
    }
    v
}
