pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod models;
pub mod output;
pub mod report;
pub mod store;
pub mod validate;
