//! Output rendering for statistics.

pub mod generator;

pub use generator::{
    generate_json_report, generate_markdown_report, generate_recent_table, generate_text_summary,
};
