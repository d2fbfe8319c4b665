//! Export of remediation results.
//!
//! Provides JSON, JSONL and CSV formats. CSV has one row per iteration so
//! score progressions can be charted directly.

use crate::remediation::RemediationResult;
use anyhow::{Context, Result};
use std::str::FromStr;

/// Export format for run data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON array format.
    Json,
    /// JSON Lines format (one JSON object per line).
    Jsonl,
    /// CSV format with headers, one row per iteration.
    Csv,
}

impl ExportFormat {
    /// Get the file extension for this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Jsonl => "jsonl",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "jsonl" | "ndjson" => Ok(ExportFormat::Jsonl),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(anyhow::anyhow!(
                "Invalid export format: {}. Valid formats: json, jsonl, csv",
                s
            )),
        }
    }
}

/// Exporter for remediation results.
///
/// # Example
///
/// ```rust,ignore
/// use seomend::reporting::{ExportFormat, RunExporter};
///
/// let runs = RunLog::new(path).load()?;
/// let csv = RunExporter::export(&runs, ExportFormat::Csv)?;
/// ```
pub struct RunExporter;

impl RunExporter {
    /// Export results to the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export(runs: &[RemediationResult], format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Json => Self::export_json(runs),
            ExportFormat::Jsonl => Self::export_jsonl(runs),
            ExportFormat::Csv => Ok(Self::export_csv(runs)),
        }
    }

    fn export_json(runs: &[RemediationResult]) -> Result<String> {
        serde_json::to_string_pretty(runs).context("Failed to serialize runs to JSON")
    }

    fn export_jsonl(runs: &[RemediationResult]) -> Result<String> {
        let lines: Result<Vec<String>, _> = runs.iter().map(serde_json::to_string).collect();
        Ok(lines.context("Failed to serialize runs to JSONL")?.join("\n"))
    }

    fn export_csv(runs: &[RemediationResult]) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str(
            "run_id,site_id,stopped_reason,target_score,iteration,timestamp,score_before,score_after,improvement,fixes_attempted,fixes_successful,analysis_seconds,fix_seconds\n",
        );

        // Runs without iterations still get a row so they are visible.
        for run in runs {
            if run.iterations.is_empty() {
                csv.push_str(&format!(
                    "{},{},{},{},0,{},{},{},0,0,0,0,0\n",
                    escape_csv(&run.run_id),
                    escape_csv(&run.site_id),
                    run.stopped_reason,
                    run.target_score,
                    run.finished_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                    run.initial_score,
                    run.final_score,
                ));
                continue;
            }

            for record in &run.iterations {
                csv.push_str(&format!(
                    "{},{},{},{},{},{},{},{},{},{},{},{:.3},{:.3}\n",
                    escape_csv(&run.run_id),
                    escape_csv(&run.site_id),
                    run.stopped_reason,
                    run.target_score,
                    record.iteration_number(),
                    record.timestamp().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                    record.score_before(),
                    record.score_after(),
                    record.improvement(),
                    record.fixes_attempted(),
                    record.fixes_successful(),
                    record.analysis_time_seconds(),
                    record.fix_time_seconds(),
                ));
            }
        }

        csv
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
