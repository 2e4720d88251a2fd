//! Log file naming and retention
//!
//! The rotation channel decides which file the current record goes to and
//! which older files are removed. Only names with the exact shape the
//! channel produces are ever considered for deletion.

use crate::core::error::{LoggerError, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const EXTENSION: &str = ".log";
const SINGLE_FILE: &str = "output.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationChannel {
    /// One file, never cleaned up
    Single,
    /// `YYYY-MM-DD.log`
    #[default]
    Daily,
    /// `YYYY-Www.log` (ISO week)
    Weekly,
    /// `YYYY-MM.log`
    Monthly,
}

impl RotationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationChannel::Single => "single",
            RotationChannel::Daily => "daily",
            RotationChannel::Weekly => "weekly",
            RotationChannel::Monthly => "monthly",
        }
    }

    /// Active file name for `today`
    pub fn file_name(&self, today: NaiveDate) -> String {
        match self {
            RotationChannel::Single => SINGLE_FILE.to_string(),
            RotationChannel::Daily => format!("{}{}", today.format("%Y-%m-%d"), EXTENSION),
            RotationChannel::Weekly => format!("{}{}", week_bucket(today), EXTENSION),
            RotationChannel::Monthly => format!("{}{}", today.format("%Y-%m"), EXTENSION),
        }
    }
}

impl fmt::Display for RotationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RotationChannel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(RotationChannel::Single),
            "daily" => Ok(RotationChannel::Daily),
            "weekly" => Ok(RotationChannel::Weekly),
            "monthly" | "mensual" => Ok(RotationChannel::Monthly),
            _ => Err(format!("Invalid rotation channel: '{}'", s)),
        }
    }
}

fn week_bucket(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// Weekly buckets kept for a retention of `days` (rounded up, at least 1)
pub fn weeks_to_keep(days: u32) -> u32 {
    days.div_ceil(7).max(1)
}

/// Monthly buckets kept for a retention of `days` (rounded up, at least 1)
pub fn months_to_keep(days: u32) -> u32 {
    days.div_ceil(30).max(1)
}

fn is_daily_name(stem: &str) -> Option<NaiveDate> {
    if stem.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

fn is_weekly_name(stem: &str) -> bool {
    let bytes = stem.as_bytes();
    bytes.len() == 8
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && &bytes[4..6] == b"-W"
        && bytes[6..].iter().all(u8::is_ascii_digit)
}

fn is_monthly_name(stem: &str) -> bool {
    let bytes = stem.as_bytes();
    bytes.len() == 7
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..].iter().all(u8::is_ascii_digit)
}

/// Delete files in `dir` that fall outside the retention window.
///
/// Returns the paths that were removed. `days == 0` and the single channel
/// disable cleanup. Directories and names the channel would not produce are
/// left alone. A file that cannot be removed does not stop the sweep; the
/// first such failure is returned after every other candidate was tried.
pub fn cleanup(
    dir: &Path,
    channel: RotationChannel,
    days: u32,
    today: NaiveDate,
) -> Result<Vec<PathBuf>> {
    if channel == RotationChannel::Single || days == 0 {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|e| {
        LoggerError::io_operation(
            "scanning log directory",
            format!("{}: {}", dir.display(), e),
            e,
        )
    })?;

    let keep: HashSet<String> = match channel {
        RotationChannel::Weekly => (0..weeks_to_keep(days))
            .filter_map(|i| today.checked_sub_days(chrono::Days::new(7 * u64::from(i))))
            .map(week_bucket)
            .collect(),
        RotationChannel::Monthly => (0..months_to_keep(days))
            .filter_map(|i| today.checked_sub_months(Months::new(i)))
            .map(|d| d.format("%Y-%m").to_string())
            .collect(),
        _ => HashSet::new(),
    };
    let daily_cutoff = today.checked_sub_days(chrono::Days::new(u64::from(days)));

    let mut removed = Vec::new();
    let mut first_error = None;
    for entry in entries.flatten() {
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(true) {
            continue;
        }
        let name = entry.file_name();
        let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(EXTENSION)) else {
            continue;
        };

        let expired = match channel {
            RotationChannel::Daily => match (is_daily_name(stem), daily_cutoff) {
                (Some(date), Some(cutoff)) => date < cutoff,
                _ => false,
            },
            RotationChannel::Weekly => is_weekly_name(stem) && !keep.contains(stem),
            RotationChannel::Monthly => is_monthly_name(stem) && !keep.contains(stem),
            RotationChannel::Single => false,
        };

        if expired {
            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => removed.push(path),
                // Another worker may have removed it first
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                // Keep sweeping; one stuck file must not shield the rest
                Err(e) => {
                    first_error.get_or_insert(LoggerError::io_operation(
                        "removing expired log file",
                        format!("{}: {}", path.display(), e),
                        e,
                    ));
                }
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => {
            removed.sort();
            Ok(removed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "x\n").expect("write file");
    }

    #[test]
    fn test_file_names() {
        let today = date(2025, 1, 8);
        assert_eq!(RotationChannel::Single.file_name(today), "output.log");
        assert_eq!(RotationChannel::Daily.file_name(today), "2025-01-08.log");
        assert_eq!(RotationChannel::Weekly.file_name(today), "2025-W02.log");
        assert_eq!(RotationChannel::Monthly.file_name(today), "2025-01.log");
        // ISO week year differs from calendar year here
        assert_eq!(RotationChannel::Weekly.file_name(date(2024, 12, 30)), "2025-W01.log");
    }

    #[test]
    fn test_bucket_counts() {
        assert_eq!(weeks_to_keep(0), 1);
        assert_eq!(weeks_to_keep(7), 1);
        assert_eq!(weeks_to_keep(10), 2);
        assert_eq!(months_to_keep(1), 1);
        assert_eq!(months_to_keep(31), 2);
        assert_eq!(months_to_keep(90), 3);
    }

    #[test]
    fn test_parse_channel() {
        assert_eq!("Weekly".parse(), Ok(RotationChannel::Weekly));
        assert_eq!("mensual".parse(), Ok(RotationChannel::Monthly));
        assert!("hourly".parse::<RotationChannel>().is_err());
    }

    #[test]
    fn test_daily_cleanup_removes_files_older_than_window() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let today = date(2025, 3, 20);
        for age in 0..=20u64 {
            let day = today - chrono::Days::new(age);
            touch(dir.path(), &RotationChannel::Daily.file_name(day));
        }
        touch(dir.path(), "notes.log");
        touch(dir.path(), "2025-01-01.txt");

        let removed = cleanup(dir.path(), RotationChannel::Daily, 14, today).unwrap();
        assert_eq!(removed.len(), 6); // ages 15..=20

        assert!(dir.path().join("2025-03-06.log").exists()); // age 14
        assert!(!dir.path().join("2025-03-05.log").exists()); // age 15
        assert!(dir.path().join("notes.log").exists());
        assert!(dir.path().join("2025-01-01.txt").exists());
    }

    #[test]
    fn test_weekly_cleanup_keeps_recent_buckets() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let today = date(2025, 3, 20);
        let three_back = today - chrono::Days::new(21);
        for day in [today, today - chrono::Days::new(7), three_back] {
            touch(dir.path(), &RotationChannel::Weekly.file_name(day));
        }
        touch(dir.path(), "2025-03-20.log");

        let removed = cleanup(dir.path(), RotationChannel::Weekly, 10, today).unwrap();
        assert_eq!(removed, vec![dir.path().join(RotationChannel::Weekly.file_name(three_back))]);
        assert!(dir.path().join("2025-03-20.log").exists());
    }

    #[test]
    fn test_monthly_cleanup() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for name in ["2025-03.log", "2025-02.log", "2025-01.log", "2024-12.log", "2025-W10.log"] {
            touch(dir.path(), name);
        }
        let removed = cleanup(dir.path(), RotationChannel::Monthly, 45, date(2025, 3, 31)).unwrap();
        let names: Vec<_> = removed
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["2024-12.log", "2025-01.log"]);
        assert!(dir.path().join("2025-W10.log").exists());
    }

    #[test]
    fn test_single_and_zero_days_skip_cleanup() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        touch(dir.path(), "2000-01-01.log");
        let today = date(2025, 1, 1);
        assert!(cleanup(dir.path(), RotationChannel::Single, 1, today)
            .unwrap()
            .is_empty());
        assert!(cleanup(dir.path(), RotationChannel::Daily, 0, today)
            .unwrap()
            .is_empty());
        assert!(dir.path().join("2000-01-01.log").exists());
    }

    #[test]
    fn test_directories_are_ignored() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("2000-01-01.log")).unwrap();
        let removed = cleanup(dir.path(), RotationChannel::Daily, 1, date(2025, 1, 1)).unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn test_scan_error_carries_os_message() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let missing = dir.path().join("gone");
        let os_message = fs::read_dir(&missing).unwrap_err().to_string();

        let err = cleanup(&missing, RotationChannel::Daily, 1, date(2025, 1, 1)).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("scanning log directory"));
        assert!(text.contains(&missing.display().to_string()));
        assert!(text.contains(&os_message), "{}", text);
    }

    #[cfg(unix)]
    #[test]
    fn test_removal_error_is_reported_with_os_message() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("Failed to create temp dir");
        touch(dir.path(), "2000-01-01.log");
        touch(dir.path(), "2000-01-02.log");
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();

        let result = cleanup(dir.path(), RotationChannel::Daily, 1, date(2025, 1, 1));
        let stuck = dir.path().join("2000-01-01.log").exists();
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();

        // Privileged users can still unlink in a read-only directory
        if stuck {
            let text = result.unwrap_err().to_string();
            assert!(text.contains("removing expired log file"));
            assert!(text.contains("ermission denied"), "{}", text);
        } else {
            assert_eq!(result.unwrap().len(), 2);
        }
    }
}
