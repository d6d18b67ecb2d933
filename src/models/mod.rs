pub mod phase;
pub mod project;
pub mod task;

pub use phase::*;
pub use project::*;
pub use task::*;

use std::cmp::Ordering;

/// Timestamp format written to `created` / `updated` fields.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment<'a> {
    Num(u64),
    Text(&'a str),
}

fn segments(id: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = id.as_bytes();
    while start < bytes.len() {
        let digit = bytes[start].is_ascii_digit();
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() == digit {
            end += 1;
        }
        let part = &id[start..end];
        match part.parse::<u64>() {
            Ok(n) if digit => out.push(Segment::Num(n)),
            _ => out.push(Segment::Text(part)),
        }
        start = end;
    }
    out
}

/// Natural ordering for ids so that `T1.2` sorts before `T1.10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    segments(a).cmp(&segments(b)).then_with(|| a.cmp(b))
}
