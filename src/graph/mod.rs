pub mod cycle;
pub mod engine;
pub mod next_tasks;

pub use engine::{Blocker, Classification, Counts, DependencyGraph, TaskState, UnresolvedPolicy};
