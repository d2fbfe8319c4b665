//! seomend - Iterative SEO remediation
//!
//! Repeatedly analyzes a website, applies automated fixes and re-analyzes
//! until the SEO score reaches a target, an iteration limit is hit, or an
//! iteration stops paying off.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`remediation`] - The remediation controller, its records and stop rules
//! - [`config`] - Run configuration and project settings
//! - [`error`] - Custom error types and handling
//! - [`credentials`] - Owned OAuth credential store for provider clients
//! - [`lock`] - Advisory per-site run locks
//! - [`history`] - JSONL run log
//! - [`reporting`] - Summaries and JSON/CSV export
//! - [`scenario`] - Simulated sites for dry runs
//! - [`testing`] - Collaborator traits, mocks and assertions
//!
//! # Example
//!
//! ```rust,ignore
//! use seomend::{RemediationConfig, RemediationController};
//!
//! let controller = RemediationController::new(deps);
//! let config = RemediationConfig::new().with_target_score(90.0);
//! let result = controller.run("example.com", &config).await?;
//! println!("{}", seomend::reporting::render_summary(&result));
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod history;
pub mod lock;
pub mod remediation;
pub mod reporting;
pub mod scenario;
pub mod testing;

// Re-export commonly used types
pub use error::{IntoSeoError, Result, SeoError};

pub use config::{HistoryConfig, ProjectConfig, RemediationConfig};

pub use remediation::{
    FixOutcome, IterationRecord, RemediationController, RemediationDependencies,
    RemediationObserver, RemediationResult, SeoIssue, SiteAnalysis, StepOutcome, StopReason,
};

pub use testing::{AnalysisStore, FixApplier, SeoAnalyzer, SiteBackup};

pub use credentials::{Credential, CredentialStore, Provider, TokenRefresher};
pub use history::RunLog;
pub use lock::SiteLock;
pub use scenario::Scenario;
