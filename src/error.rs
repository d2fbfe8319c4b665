//! Custom error types for seomend.
//!
//! This module provides structured error types that separate configuration
//! and precondition failures (rejected before any work) from per-issue fix
//! failures (recorded, non-fatal) and analysis failures (fatal to a run).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for seomend operations
#[derive(Error, Debug)]
pub enum SeoError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    // =========================================================================
    // Remediation Errors
    // =========================================================================
    /// No prior SEO analysis exists for the site
    #[error("No prior SEO analysis found for site '{site_id}'")]
    NoAnalysis { site_id: String },

    /// The analyzer could not fetch or score the site
    #[error("Site '{site_id}' is unreachable: {message}")]
    SiteUnreachable { site_id: String, message: String },

    /// A single fix could not be applied
    #[error("Fix '{fix_type}' failed: {message}")]
    FixApplication { fix_type: String, message: String },

    /// The fix applier failed as a whole
    #[error("Fix applier failed for site '{site_id}': {message}")]
    FixApplier { site_id: String, message: String },

    /// Pre-remediation backup failed
    #[error("Backup of site '{site_id}' failed: {message}")]
    Backup { site_id: String, message: String },

    /// Another remediation run holds the site lock
    #[error("Site '{site_id}' is locked by another remediation run")]
    SiteLocked { site_id: String },

    // =========================================================================
    // Credential Errors
    // =========================================================================
    /// Missing or unrefreshable credential
    #[error("Credential error for {provider}: {message}")]
    Credential { provider: String, message: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML parse error wrapper
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SeoError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a site unreachable error
    pub fn unreachable(site_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SiteUnreachable {
            site_id: site_id.into(),
            message: message.into(),
        }
    }

    /// Create a per-issue fix error
    pub fn fix(fix_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FixApplication {
            fix_type: fix_type.into(),
            message: message.into(),
        }
    }

    /// Create a credential error
    pub fn credential(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Credential {
            provider: provider.into(),
            message: message.into(),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Check if this error is recoverable (the run continues)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::FixApplication { .. })
    }

    /// Check if this error is raised before any remediation work starts
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::InvalidConfig { .. }
                | Self::NoAnalysis { .. }
                | Self::SiteLocked { .. }
        )
    }

    /// Check if this error is fatal (should abort the loop)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SiteUnreachable { .. } | Self::FixApplier { .. } | Self::Backup { .. }
        )
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SiteUnreachable { .. } => 2,
            Self::NoAnalysis { .. } => 3,
            Self::SiteLocked { .. } => 4,
            Self::Backup { .. } | Self::FixApplier { .. } => 5,
            Self::Credential { .. } => 6,
            Self::Config { .. } | Self::InvalidConfig { .. } => 7,
            _ => 1,
        }
    }
}

/// Type alias for seomend results
pub type Result<T> = std::result::Result<T, SeoError>;

/// Extension trait for converting foreign errors to SeoError
pub trait IntoSeoError<T> {
    fn into_seo_config(self) -> Result<T>;
}

impl<T, E: Into<anyhow::Error>> IntoSeoError<T> for std::result::Result<T, E> {
    fn into_seo_config(self) -> Result<T> {
        self.map_err(|e| SeoError::config(e.into().to_string()))
    }
}
