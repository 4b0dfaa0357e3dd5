use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- focus recovery log: outlines that could not be saved normally.
     View with: fo recovery
     Safe to delete once you have restored what you need. -->

---
";

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// The outline could not be written
    Write,
    /// The outline on disk could not be parsed
    Parser,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Parser => write!(f, "parser"),
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

/// Return the path to the recovery log file.
pub fn recovery_log_path(focus_dir: &Path) -> PathBuf {
    focus_dir.join(".recovery.log")
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl RecoveryEntry {
    /// Format this entry as a markdown block for the recovery log.
    fn to_markdown(&self) -> String {
        format!(
            "## {}{}",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.untimed_markdown()
        )
    }

    /// Everything after the timestamp. Two entries that only differ in time
    /// render the same here.
    fn untimed_markdown(&self) -> String {
        let mut out = format!(" {}: {}\n\n", self.category, self.description);

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        if !self.body.is_empty() {
            out.push_str("\n```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }

        out.push_str("\n---\n");
        out
    }
}

/// Append a recovery entry to the log. Failures are logged, never returned.
///
/// An entry identical to the last one in the log (apart from its timestamp)
/// is skipped, so repeated failures on the same content are kept once.
pub fn log_recovery(focus_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = log_recovery_inner(focus_dir, &entry) {
        warn!(error = %e, "could not write to recovery log");
    }
}

fn log_recovery_inner(focus_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(focus_dir);
    let existing = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };
    if existing.ends_with(&entry.untimed_markdown()) {
        debug!(category = %entry.category, "same entry already last in recovery log");
        return Ok(());
    }

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if existing.is_empty() {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

/// Entry headers (timestamp and title line) in log order, oldest first.
pub fn recovery_headers(content: &str) -> Vec<(DateTime<Utc>, String)> {
    content
        .lines()
        .filter_map(|line| line.strip_prefix("## "))
        .filter_map(|header| {
            let (stamp, title) = header.split_once(' ')?;
            let timestamp = DateTime::parse_from_rfc3339(stamp).ok()?.with_timezone(&Utc);
            Some((timestamp, title.to_string()))
        })
        .collect()
}

/// Read the whole recovery log, if there is one.
pub fn read_recovery_log(focus_dir: &Path) -> Option<String> {
    std::fs::read_to_string(recovery_log_path(focus_dir)).ok()
}

/// Delete the recovery log. Returns whether a log existed.
pub fn clear_recovery_log(focus_dir: &Path) -> io::Result<bool> {
    match std::fs::remove_file(recovery_log_path(focus_dir)) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
