//! Simulated sites for dry runs.
//!
//! A scenario file describes what the analyzer will report on successive
//! calls and how the fix applier behaves, so the controller can be
//! exercised end to end from the CLI without touching a real site.
//!
//! # Example scenario.toml
//!
//! ```toml
//! site_id = "example.com"
//! scores = [60, 70, 80, 90]
//! failing_fix_types = ["missing_h1"]
//!
//! [[issues]]
//! type = "missing_alt_text"
//! detail = "/about hero.jpg"
//! ```

use crate::error::{Result, SeoError};
use crate::remediation::{RemediationDependencies, SeoIssue};
use crate::testing::{MockAnalysisStore, MockFixApplier, MockSiteBackup, ScriptedAnalyzer};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A simulated site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Site identifier used for logging, locking and the run log.
    pub site_id: String,

    /// Scores returned by successive analyzer calls; the last repeats.
    pub scores: Vec<f64>,

    /// Issues reported with every analysis.
    #[serde(default)]
    pub issues: Vec<SeoIssue>,

    /// Whether a prior analysis exists (default: true).
    #[serde(default = "default_true")]
    pub has_prior_analysis: bool,

    /// Fix types whose fixes fail.
    #[serde(default)]
    pub failing_fix_types: Vec<String>,

    /// 1-based analyzer call that fails as unreachable.
    #[serde(default)]
    pub fail_analysis_on: Option<u32>,

    /// 1-based fix-applier call that fails as a whole.
    #[serde(default)]
    pub fail_fix_call_on: Option<u32>,

    /// Make the pre-fix backup fail with this message.
    #[serde(default)]
    pub backup_error: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Scenario {
    /// Parse a scenario from TOML.
    ///
    /// # Errors
    ///
    /// Returns a TOML error for malformed input, or
    /// [`SeoError::InvalidConfig`] if the scenario is unusable.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SeoError::config_with_path(
                format!("cannot read scenario: {e}"),
                path.to_path_buf(),
            )
        })?;
        Self::from_toml_str(&content)
    }

    /// Check the scenario can drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.site_id.trim().is_empty() {
            return Err(SeoError::invalid_config("site_id", "must not be empty"));
        }
        if self.scores.is_empty() {
            return Err(SeoError::invalid_config(
                "scores",
                "at least one score is required",
            ));
        }
        if self.fail_analysis_on == Some(0) || self.fail_fix_call_on == Some(0) {
            return Err(SeoError::invalid_config(
                "fail_*_on",
                "call numbers are 1-based",
            ));
        }
        Ok(())
    }

    /// Build the simulated collaborators.
    #[must_use]
    pub fn dependencies(&self) -> RemediationDependencies {
        let mut analyzer =
            ScriptedAnalyzer::from_scores(&self.scores).with_issues(self.issues.clone());
        if let Some(call) = self.fail_analysis_on {
            analyzer = analyzer.with_failure_on_call(call, "simulated outage");
        }

        let mut applier = MockFixApplier::new();
        for fix_type in &self.failing_fix_types {
            applier = applier.with_failing_type(fix_type);
        }
        if let Some(call) = self.fail_fix_call_on {
            applier = applier.with_failure_on_call(call, "simulated fix applier crash");
        }

        let store = if self.has_prior_analysis {
            MockAnalysisStore::new()
        } else {
            MockAnalysisStore::empty()
        };

        let mut backup = MockSiteBackup::new();
        if let Some(ref error) = self.backup_error {
            backup = backup.with_error(error);
        }

        RemediationDependencies {
            analyzer: Arc::new(analyzer),
            applier: Arc::new(applier),
            store: Arc::new(store),
            backup: Arc::new(backup),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemediationConfig;
    use crate::remediation::{RemediationController, StopReason};
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
site_id = "example.com"
scores = [60, 70, 80, 90]
failing_fix_types = ["missing_h1"]

[[issues]]
type = "missing_alt_text"
detail = "/about hero.jpg"

[[issues]]
type = "missing_h1"
detail = "/pricing"
"#;

    #[test]
    fn test_parse_sample() {
        let scenario = Scenario::from_toml_str(SAMPLE).unwrap();
        assert_eq!(scenario.site_id, "example.com");
        assert_eq!(scenario.scores, vec![60.0, 70.0, 80.0, 90.0]);
        assert_eq!(scenario.issues.len(), 2);
        assert!(scenario.has_prior_analysis);
        assert!(scenario.fail_analysis_on.is_none());
    }

    #[test]
    fn test_rejects_empty_scores() {
        let err = Scenario::from_toml_str("site_id = \"a\"\nscores = []\n").unwrap_err();
        assert!(matches!(err, SeoError::InvalidConfig { ref field, .. } if field == "scores"));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            Scenario::from_toml_str("site_id = "),
            Err(SeoError::Toml(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = Scenario::load(&temp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, SeoError::Config { path: Some(_), .. }));
    }

    #[tokio::test]
    async fn test_scenario_drives_controller() {
        let scenario = Scenario::from_toml_str(SAMPLE).unwrap();
        let controller = RemediationController::new(scenario.dependencies());
        let result = controller
            .run(&scenario.site_id, &RemediationConfig::default())
            .await
            .unwrap();

        assert_eq!(result.stopped_reason, StopReason::TargetReached);
        assert_eq!(result.iterations_completed, 3);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.successful_fixes(), 3);
    }

    #[tokio::test]
    async fn test_scenario_without_prior_analysis() {
        let scenario = Scenario::from_toml_str(
            "site_id = \"a\"\nscores = [60]\nhas_prior_analysis = false\n",
        )
        .unwrap();
        let controller = RemediationController::new(scenario.dependencies());
        let err = controller
            .run("a", &RemediationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SeoError::NoAnalysis { .. }));
    }
}
