//! Plain-text run summaries for logs and the CLI.

use crate::remediation::{RemediationResult, StopReason};

/// Human-readable explanation of a stop reason.
#[must_use]
pub fn describe_stop(reason: StopReason) -> &'static str {
    match reason {
        StopReason::TargetReached => "target score reached",
        StopReason::MaxIterations => "iteration limit reached below target",
        StopReason::NoImprovement => "last iteration improved less than the threshold",
        StopReason::Error => "stopped by an analysis or fix failure",
    }
}

/// Multi-line summary of a run.
///
/// # Example output
///
/// ```text
/// Site example.com: 60.0 -> 90.0 (+30.0, target 85.0)
/// Stopped: target_reached (target score reached) after 3 iteration(s) in 4.2s
///   #1  60.0 -> 70.0  (+10.0)  fixes 2/2
/// ```
#[must_use]
pub fn render_summary(result: &RemediationResult) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Site {}: {:.1} -> {:.1} ({:+.1}, target {:.1})\n",
        result.site_id,
        result.initial_score,
        result.final_score,
        result.score_improvement,
        result.target_score
    ));
    out.push_str(&format!(
        "Stopped: {} ({}) after {} iteration(s) in {:.1}s\n",
        result.stopped_reason,
        describe_stop(result.stopped_reason),
        result.iterations_completed,
        result.duration_seconds()
    ));

    for record in &result.iterations {
        out.push_str(&format!(
            "  #{:<2} {:.1} -> {:.1}  ({:+.1})  fixes {}/{}\n",
            record.iteration_number(),
            record.score_before(),
            record.score_after(),
            record.improvement(),
            record.fixes_successful(),
            record.fixes_attempted()
        ));
    }

    if let Some(ref backup) = result.backup_id {
        out.push_str(&format!("Backup: {backup}\n"));
    }

    if !result.errors.is_empty() {
        out.push_str(&format!("Errors ({}):\n", result.errors.len()));
        for error in result.errors.iter().take(10) {
            out.push_str(&format!("  - {error}\n"));
        }
        if result.errors.len() > 10 {
            out.push_str(&format!("  ... and {} more\n", result.errors.len() - 10));
        }
    }

    out
}
