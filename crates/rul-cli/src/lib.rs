//! CLI library components for the `rul` tool.

pub mod logging;
pub mod pipeline;
