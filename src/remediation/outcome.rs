//! Tagged outcomes for collaborator calls.
//!
//! The controller continues on per-item failures and aborts on system
//! failures. Rather than use errors for that control flow, each call is
//! folded into a [`StepOutcome`] and matched on.

use super::types::{FixOutcome, SiteAnalysis};
use crate::error::SeoError;

/// Outcome of one collaborator call.
#[derive(Debug)]
pub enum StepOutcome<T> {
    /// Everything succeeded.
    Success(T),
    /// The call completed but some items failed; the run continues.
    Partial { value: T, failures: Vec<SeoError> },
    /// The call failed as a whole; the run stops.
    Fatal(SeoError),
}

impl<T> StepOutcome<T> {
    /// Splits into the value plus recoverable failures, or the fatal error.
    pub fn into_parts(self) -> Result<(T, Vec<SeoError>), SeoError> {
        match self {
            Self::Success(value) => Ok((value, Vec::new())),
            Self::Partial { value, failures } => Ok((value, failures)),
            Self::Fatal(err) => Err(err),
        }
    }
}

impl StepOutcome<SiteAnalysis> {
    /// Folds an analyzer call. Any analyzer error is fatal; errors that
    /// are not already fatal are reported as the site being unreachable.
    pub fn from_analysis(site_id: &str, result: crate::error::Result<SiteAnalysis>) -> Self {
        match result {
            Ok(analysis) => Self::Success(analysis),
            Err(err) if err.is_fatal() => Self::Fatal(err),
            Err(err) => Self::Fatal(SeoError::unreachable(site_id, err.to_string())),
        }
    }
}

impl StepOutcome<Vec<FixOutcome>> {
    /// Folds a fix-applier call.
    ///
    /// Unsuccessful outcomes inside a successful call become
    /// [`SeoError::FixApplication`] failures. A call that fails with a
    /// recoverable error counts as one failed fix; any other call error
    /// stops the run as a [`SeoError::FixApplier`] failure.
    pub fn from_fixes(site_id: &str, result: crate::error::Result<Vec<FixOutcome>>) -> Self {
        let outcomes = match result {
            Ok(outcomes) => outcomes,
            Err(err) if err.is_recoverable() => {
                return Self::Partial {
                    value: Vec::new(),
                    failures: vec![err],
                };
            }
            Err(err) if err.is_fatal() => return Self::Fatal(err),
            Err(err) => {
                return Self::Fatal(SeoError::FixApplier {
                    site_id: site_id.to_string(),
                    message: err.to_string(),
                });
            }
        };

        let failures: Vec<SeoError> = outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| {
                SeoError::fix(
                    o.fix_type.clone(),
                    o.error.clone().unwrap_or_else(|| "unknown failure".to_string()),
                )
            })
            .collect();

        if failures.is_empty() {
            Self::Success(outcomes)
        } else {
            Self::Partial {
                value: outcomes,
                failures,
            }
        }
    }
}
