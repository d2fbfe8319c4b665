//! Configuration management for seomend.
//!
//! Two layers exist:
//!
//! - [`RemediationConfig`] - the per-run knobs handed to the controller
//! - [`ProjectConfig`] - project-level settings loaded from
//!   `.seomend/settings.json`, holding the default remediation config and
//!   run-log settings

use crate::error::{IntoSeoError, Result, SeoError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Lowest accepted target score.
pub const MIN_TARGET_SCORE: f64 = 50.0;
/// Highest accepted target score.
pub const MAX_TARGET_SCORE: f64 = 100.0;
/// Lowest accepted iteration cap.
pub const MIN_ITERATIONS: u32 = 1;
/// Highest accepted iteration cap.
pub const MAX_ITERATIONS: u32 = 10;

fn fix_type_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").ok())
        .as_ref()
}

/// Knobs for a single remediation run.
///
/// # Example settings.json
///
/// ```json
/// {
///   "remediation": {
///     "targetScore": 90,
///     "maxIterations": 3,
///     "fixTypes": ["missing_alt_text", "missing_meta_description"]
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationConfig {
    /// Score at which the run stops successfully (default: 85, valid 50-100).
    #[serde(default = "default_target_score")]
    pub target_score: f64,

    /// Maximum analyze/fix/analyze cycles (default: 5, valid 1-10).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// An iteration improving less than this stops the run (default: 2).
    #[serde(default = "default_min_improvement")]
    pub min_improvement_threshold: f64,

    /// Restrict remediation to these fix types. `None` allows all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_types: Option<BTreeSet<String>>,

    /// Cap on changes the fix applier may make per iteration (default: 20).
    #[serde(default = "default_max_changes")]
    pub max_changes_per_iteration: usize,

    /// Skip the pre-remediation site backup.
    #[serde(default)]
    pub skip_backup: bool,
}

fn default_target_score() -> f64 {
    85.0
}

fn default_max_iterations() -> u32 {
    5
}

fn default_min_improvement() -> f64 {
    2.0
}

fn default_max_changes() -> usize {
    20
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            target_score: default_target_score(),
            max_iterations: default_max_iterations(),
            min_improvement_threshold: default_min_improvement(),
            fix_types: None,
            max_changes_per_iteration: default_max_changes(),
            skip_backup: false,
        }
    }
}

impl RemediationConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target score.
    #[must_use]
    pub fn with_target_score(mut self, score: f64) -> Self {
        self.target_score = score;
        self
    }

    /// Set the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the minimum per-iteration improvement.
    #[must_use]
    pub fn with_min_improvement(mut self, threshold: f64) -> Self {
        self.min_improvement_threshold = threshold;
        self
    }

    /// Restrict remediation to the given fix types.
    #[must_use]
    pub fn with_fix_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fix_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Set the per-iteration change cap.
    #[must_use]
    pub fn with_max_changes(mut self, max: usize) -> Self {
        self.max_changes_per_iteration = max;
        self
    }

    /// Skip or take the pre-remediation backup.
    #[must_use]
    pub fn with_skip_backup(mut self, skip: bool) -> Self {
        self.skip_backup = skip;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SeoError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !self.target_score.is_finite()
            || self.target_score < MIN_TARGET_SCORE
            || self.target_score > MAX_TARGET_SCORE
        {
            return Err(SeoError::invalid_config(
                "target_score",
                format!(
                    "{} is outside {}-{}",
                    self.target_score, MIN_TARGET_SCORE, MAX_TARGET_SCORE
                ),
            ));
        }

        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.max_iterations) {
            return Err(SeoError::invalid_config(
                "max_iterations",
                format!(
                    "{} is outside {}-{}",
                    self.max_iterations, MIN_ITERATIONS, MAX_ITERATIONS
                ),
            ));
        }

        if !self.min_improvement_threshold.is_finite() || self.min_improvement_threshold < 0.0 {
            return Err(SeoError::invalid_config(
                "min_improvement_threshold",
                format!(
                    "{} must be a non-negative number",
                    self.min_improvement_threshold
                ),
            ));
        }

        if self.max_changes_per_iteration == 0 {
            return Err(SeoError::invalid_config(
                "max_changes_per_iteration",
                "must be at least 1",
            ));
        }

        if let Some(ref types) = self.fix_types {
            if types.is_empty() {
                return Err(SeoError::invalid_config(
                    "fix_types",
                    "allowlist is empty; omit it to allow every fix type",
                ));
            }
            let pattern = fix_type_pattern()
                .ok_or_else(|| SeoError::config("fix-type pattern failed to compile"))?;
            if let Some(bad) = types.iter().find(|t| !pattern.is_match(t)) {
                return Err(SeoError::invalid_config(
                    "fix_types",
                    format!("'{bad}' is not a snake_case fix type"),
                ));
            }
        }

        Ok(())
    }
}

/// Run-log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Append each finished run to the run log.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Runs shown by `seomend history` when `--last` is not given.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_entries() -> usize {
    10
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_max_entries(),
        }
    }
}

/// Project configuration loaded from `.seomend/settings.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub remediation: RemediationConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

impl ProjectConfig {
    /// Load configuration from a project directory.
    ///
    /// Returns defaults when no settings file exists.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let settings_path = Self::settings_path(project_dir);

        if !settings_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&settings_path).into_seo_config()?;
        serde_json::from_str(&content).map_err(|e| {
            SeoError::config_with_path(format!("invalid settings: {e}"), settings_path.clone())
        })
    }

    /// Write configuration to the project directory.
    pub fn save(&self, project_dir: &Path) -> Result<()> {
        let path = Self::settings_path(project_dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.remediation.validate()?;
        if self.history.max_entries == 0 {
            return Err(SeoError::invalid_config(
                "history.max_entries",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Get the state directory for a project
    pub fn state_dir(project_dir: &Path) -> PathBuf {
        project_dir.join(".seomend")
    }

    /// Get the settings.json path for a project
    pub fn settings_path(project_dir: &Path) -> PathBuf {
        Self::state_dir(project_dir).join("settings.json")
    }

    /// Get the run log path
    pub fn runs_path(project_dir: &Path) -> PathBuf {
        Self::state_dir(project_dir).join("runs.jsonl")
    }

    /// Get the site lock directory
    pub fn locks_dir(project_dir: &Path) -> PathBuf {
        Self::state_dir(project_dir).join("locks")
    }
}
