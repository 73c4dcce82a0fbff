//! Monthly indicator assembly and report rendering.

pub mod builder;
pub mod generator;

pub use builder::{assemble, MonthlyReportBuilder, StatsSettings};
pub use generator::{generate_json_report, generate_markdown_report, write_report};
