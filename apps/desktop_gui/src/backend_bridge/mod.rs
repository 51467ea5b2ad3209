//! Bridge between the egui thread and the tokio-backed portal client.

pub mod commands;
pub mod runtime;
