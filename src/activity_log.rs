//! Append-only JSON-lines activity log.
//!
//! Lines are only ever appended; every projection is derived by reading the
//! whole log back.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::Activity;

pub fn append_to_log(path: &Path, activity: &Activity) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut line = serde_json::to_string(activity)?;
    line.push('\n');

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;

    debug!(path = %path.display(), "Appended activity");
    Ok(())
}

/// Read every activity in log order. Unreadable lines are skipped.
pub fn read_log(path: &Path) -> Result<Vec<Activity>, AppError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut activities = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Activity>(&line) {
            Ok(activity) => activities.push(activity),
            Err(e) => warn!(line = idx + 1, error = %e, "Skipping malformed activity"),
        }
    }

    Ok(activities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn waste(category: &str) -> Activity {
        Activity {
            activity_type: "expFood".to_string(),
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_append_then_read() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        append_to_log(path, &waste("Dairy")).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("\"activityType\":\"expFood\""));

        let activities = read_log(path).unwrap();
        assert_eq!(activities, vec![waste("Dairy")]);
    }

    #[test]
    fn test_log_append_only() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        append_to_log(path, &waste("Dairy")).unwrap();
        append_to_log(path, &waste("Produce")).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let activities = read_log(path).unwrap();
        assert_eq!(activities[0].category.as_deref(), Some("Dairy"));
        assert_eq!(activities[1].category.as_deref(), Some("Produce"));
    }

    #[test]
    fn test_read_skips_blank_and_malformed_lines() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"{{"activityType":"expFood","category":"Dairy"}}"#).unwrap();
        writeln!(temp_file).unwrap();
        writeln!(temp_file, "START THEORY pandas").unwrap();
        writeln!(temp_file, r#"{{"activityType":"conFood","note":"fully consumed"}}"#).unwrap();

        let activities = read_log(temp_file.path()).unwrap();
        assert_eq!(activities.len(), 2);
        assert!(activities[1].is_full_save());
    }

    #[test]
    fn test_read_keeps_records_with_mistyped_fields() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"{{"activityType":"expFood","category":42,"createdAt":"2024-03-15T12:00:00Z"}}"#
        )
        .unwrap();
        writeln!(temp_file, r#"{{"activityType":"conFood","note":7}}"#).unwrap();

        let activities = read_log(temp_file.path()).unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].category_or_unknown(), "42");
        assert_eq!(activities[1].note.as_deref(), Some("7"));

        assert_eq!(
            crate::nudge::leaderboard_nudge(&activities),
            "Your current waste-to-save ratio is 1:1 (50% wasted). Try cutting down on 42 to climb the leaderboard."
        );
        let series = crate::charts::build_monthly_series(&activities);
        assert_eq!(series.waste, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_missing_log_is_empty() {
        let dir = TempDir::new().unwrap();
        let activities = read_log(&dir.path().join("nothing-yet.log")).unwrap();
        assert!(activities.is_empty());
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("activities.log");

        append_to_log(&path, &waste("Meat")).unwrap();
        assert_eq!(read_log(&path).unwrap().len(), 1);
    }
}
