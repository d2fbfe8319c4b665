//! Run log: finished remediation results, one JSON object per line.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::remediation::RemediationResult;

/// Append-only JSONL log of remediation results.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Create a log backed by `path`. Nothing is written until
    /// [`RunLog::append`].
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one result.
    pub fn append(&self, result: &RemediationResult) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(result)?;
        writeln!(file, "{line}")?;

        debug!(run_id = %result.run_id, path = %self.path.display(), "Run logged");
        Ok(())
    }

    /// All logged results, oldest first.
    ///
    /// Lines that fail to parse are skipped with a warning.
    pub fn load(&self) -> Result<Vec<RemediationResult>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut results = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(result) => results.push(result),
                Err(e) => warn!(
                    "Skipping corrupted run log line {} in {}: {}",
                    index + 1,
                    self.path.display(),
                    e
                ),
            }
        }
        Ok(results)
    }

    /// The newest `n` results, newest first.
    pub fn recent(&self, n: usize) -> Result<Vec<RemediationResult>> {
        let mut all = self.load()?;
        all.reverse();
        all.truncate(n);
        Ok(all)
    }

    /// Results for one site, oldest first.
    pub fn for_site(&self, site_id: &str) -> Result<Vec<RemediationResult>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| r.site_id == site_id)
            .collect())
    }

    /// Truncate the log, keeping the file in place.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .open(&self.path)?;
            debug!("Cleared run log {}", self.path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remediation::{IterationRecord, StopReason};
    use tempfile::TempDir;

    fn result(site: &str, final_score: f64) -> RemediationResult {
        let mut r = RemediationResult::start(site, 60.0, 85.0);
        r.push_iteration(IterationRecord::new(1, 60.0, final_score, &[], 0.1, 0.2));
        r.finish(StopReason::MaxIterations);
        r
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let log = RunLog::new(temp.path().join("runs.jsonl"));
        assert!(log.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_load_preserves_order() {
        let temp = TempDir::new().unwrap();
        let log = RunLog::new(temp.path().join("nested/runs.jsonl"));
        log.append(&result("a", 70.0)).unwrap();
        log.append(&result("b", 75.0)).unwrap();

        let loaded = log.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].site_id, "a");
        assert_eq!(loaded[1].final_score, 75.0);
        assert_eq!(loaded[1].iterations[0].score_after(), 75.0);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let temp = TempDir::new().unwrap();
        let log = RunLog::new(temp.path().join("runs.jsonl"));
        for (i, site) in ["a", "b", "c"].iter().enumerate() {
            log.append(&result(site, 70.0 + i as f64)).unwrap();
        }

        let recent = log.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].site_id, "c");
        assert_eq!(recent[1].site_id, "b");
    }

    #[test]
    fn test_corrupted_lines_are_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("runs.jsonl");
        let log = RunLog::new(&path);
        log.append(&result("a", 70.0)).unwrap();
        fs::write(
            &path,
            format!("{}\n{{broken\n\n", fs::read_to_string(&path).unwrap().trim()),
        )
        .unwrap();
        log.append(&result("b", 71.0)).unwrap();

        let loaded = log.load().unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_for_site_and_clear() {
        let temp = TempDir::new().unwrap();
        let log = RunLog::new(temp.path().join("runs.jsonl"));
        log.append(&result("a", 70.0)).unwrap();
        log.append(&result("b", 70.0)).unwrap();
        log.append(&result("a", 72.0)).unwrap();

        assert_eq!(log.for_site("a").unwrap().len(), 2);
        log.clear().unwrap();
        assert!(log.load().unwrap().is_empty());
    }

    #[test]
    fn test_clear_truncates_in_place() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("runs.jsonl");
        let log = RunLog::new(&path);
        log.append(&result("a", 70.0)).unwrap();

        log.clear().unwrap();
        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);

        log.append(&result("b", 71.0)).unwrap();
        assert_eq!(log.load().unwrap()[0].site_id, "b");
    }

    #[test]
    fn test_clear_missing_file_is_noop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("runs.jsonl");
        RunLog::new(&path).clear().unwrap();
        assert!(!path.exists());
    }
}
