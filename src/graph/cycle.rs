//! Cycle diagnostics for the dependency graph.
//!
//! Storage never prevents cycles and the engine copes with them, so nothing
//! here rejects anything. Callers print the cycles as warnings.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::{natural_cmp, Task};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Cycles over resolvable dependency edges, found at DFS back edges.
/// Edge (task, dep) means task depends on dep. Every cyclic component
/// yields at least one cycle; not every elementary cycle is listed. Each
/// cycle is returned once, rotated so that its smallest id comes first.
pub fn find_cycles(tasks: &[Task]) -> Vec<Vec<String>> {
    let edges = task_edges(tasks);
    let nodes: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    cycles_in(&nodes, &edges)
}

/// The cycle that adding `task_id → dep_id` would close, if any.
///
/// The edge closes a cycle exactly when `dep_id` already reaches `task_id`.
/// The path comes from a BFS parent map, so it is a shortest one.
pub fn would_create_cycle(tasks: &[Task], task_id: &str, dep_id: &str) -> Option<Vec<String>> {
    if task_id == dep_id {
        return Some(vec![task_id.to_string()]);
    }
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, to) in task_edges(tasks) {
        adj.entry(from).or_default().push(to);
    }

    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut queue = VecDeque::from([dep_id]);
    let mut visited: HashSet<&str> = HashSet::from([dep_id]);
    while let Some(node) = queue.pop_front() {
        for &next in adj.get(node).into_iter().flatten() {
            if !visited.insert(next) {
                continue;
            }
            parent.insert(next, node);
            if next == task_id {
                // walk back from task_id to dep_id
                let mut path = vec![task_id];
                let mut cur = task_id;
                while let Some(&p) = parent.get(cur) {
                    path.push(p);
                    cur = p;
                }
                // path = task_id, ..., dep_id; the new edge runs task_id -> dep_id
                path.reverse();
                path.rotate_right(1);
                return Some(normalize(&path));
            }
            queue.push_back(next);
        }
    }
    None
}

fn task_edges(tasks: &[Task]) -> Vec<(&str, &str)> {
    let known: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    tasks
        .iter()
        .flat_map(|t| {
            t.dependency_ids
                .iter()
                .filter(|d| known.contains(d.as_str()))
                .map(move |d| (t.id.as_str(), d.as_str()))
        })
        .collect()
}

fn cycles_in<'a>(nodes: &[&'a str], edges: &[(&'a str, &'a str)]) -> Vec<Vec<String>> {
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for &node in nodes {
        adj.entry(node).or_default();
    }
    for &(task_id, dep_id) in edges {
        adj.entry(task_id).or_default().push(dep_id);
    }

    let mut color: HashMap<&str, Color> = adj.keys().map(|&n| (n, Color::White)).collect();
    let mut stack = Vec::new();
    let mut found = Vec::new();
    let mut seen = HashSet::new();

    for &node in nodes {
        if color.get(node) == Some(&Color::White) {
            dfs(node, &adj, &mut color, &mut stack, &mut found, &mut seen);
        }
    }
    found
}

fn dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    color: &mut HashMap<&'a str, Color>,
    stack: &mut Vec<&'a str>,
    found: &mut Vec<Vec<String>>,
    seen: &mut HashSet<Vec<String>>,
) {
    color.insert(node, Color::Gray);
    stack.push(node);
    if let Some(neighbors) = adj.get(node) {
        for &neighbor in neighbors {
            match color.get(neighbor).copied().unwrap_or(Color::White) {
                // back edge = cycle
                Color::Gray => {
                    if let Some(start) = stack.iter().position(|&n| n == neighbor) {
                        let cycle = normalize(&stack[start..]);
                        if seen.insert(cycle.clone()) {
                            found.push(cycle);
                        }
                    }
                }
                Color::White => dfs(neighbor, adj, color, stack, found, seen),
                Color::Black => {}
            }
        }
    }
    stack.pop();
    color.insert(node, Color::Black);
}

fn normalize(path: &[&str]) -> Vec<String> {
    let start = path
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| natural_cmp(a, b))
        .map_or(0, |(i, _)| i);
    path[start..]
        .iter()
        .chain(path[..start].iter())
        .map(|s| s.to_string())
        .collect()
}
