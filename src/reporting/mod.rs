//! Reporting and export of remediation runs.
//!
//! # Features
//!
//! - **Summaries**: Plain-text run summaries for logs and the CLI
//! - **Data Export**: JSON, JSONL and per-iteration CSV
//!
//! # Example
//!
//! ```rust,ignore
//! use seomend::reporting::{render_summary, ExportFormat, RunExporter};
//!
//! println!("{}", render_summary(&result));
//! let csv = RunExporter::export(&[result], ExportFormat::Csv)?;
//! ```

mod export;
mod summary;

pub use export::{ExportFormat, RunExporter};
pub use summary::{describe_stop, render_summary};
