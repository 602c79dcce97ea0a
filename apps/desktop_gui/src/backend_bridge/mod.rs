//! Backend worker: commands queued from the UI and the tokio runtime that serves them.

pub mod commands;
pub mod runtime;
