//! Log file retention

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};

use super::LOG_FILE_PREFIX;

/// Delete Cadence log files not modified within `retention_days`
///
/// `keep` is never deleted, whatever its age. Returns the number of files
/// removed.
pub fn cleanup_old_logs(logs_dir: &Path, retention_days: u64, keep: Option<&Path>) -> Result<usize> {
    if !logs_dir.exists() {
        return Ok(0);
    }

    let retention = Duration::from_secs(retention_days * 24 * 60 * 60);
    let cutoff = SystemTime::now()
        .checked_sub(retention)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let entries = fs::read_dir(logs_dir)
        .with_context(|| format!("Failed to list {}", logs_dir.display()))?;

    let mut deleted = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if keep == Some(path.as_path()) || !is_log_file(&path) {
            continue;
        }

        let expired = entry
            .metadata()
            .and_then(|m| m.modified())
            .map(|modified| modified < cutoff)
            .unwrap_or(false);

        if expired {
            match fs::remove_file(&path) {
                Ok(()) => deleted += 1,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove old log"),
            }
        }
    }

    Ok(deleted)
}

fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) && name.ends_with(".log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_cleanup_nonexistent_dir() {
        let count = cleanup_old_logs(Path::new("/nonexistent/cadence/logs"), 7, None).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_zero_retention_removes_only_cadence_logs() {
        let temp_dir = TempDir::new().unwrap();
        let ours = temp_dir.path().join("cadence-2025-01-01_00-00-00.log");
        let foreign = temp_dir.path().join("other-2025-01-01_00-00-00.log");
        let notes = temp_dir.path().join("notes.txt");
        for path in [&ours, &foreign, &notes] {
            File::create(path).unwrap();
        }
        std::thread::sleep(Duration::from_millis(20));

        let count = cleanup_old_logs(temp_dir.path(), 0, None).unwrap();
        assert_eq!(count, 1);
        assert!(!ours.exists());
        assert!(foreign.exists());
        assert!(notes.exists());
    }

    #[test]
    fn test_current_log_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let current = temp_dir.path().join("cadence-2025-01-01_00-00-00.log");
        File::create(&current).unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let count = cleanup_old_logs(temp_dir.path(), 0, Some(&current)).unwrap();
        assert_eq!(count, 0);
        assert!(current.exists());
    }

    #[test]
    fn test_recent_files_survive() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("cadence-2025-01-01_00-00-00.log");
        File::create(&log_file).unwrap();

        assert_eq!(cleanup_old_logs(temp_dir.path(), 7, None).unwrap(), 0);
        assert!(log_file.exists());
    }
}
