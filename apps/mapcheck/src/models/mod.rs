//! Shared data models for check outcomes, input files, and invocations.

pub mod invocation;

use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A test input handed to the target binary.
pub struct MapFile {
    /// Path relative to the maps directory; used for display and log naming.
    pub id: String,
    /// Path passed as the last argument to the target binary.
    pub path: PathBuf,
}

impl MapFile {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        MapFile {
            id: id.into(),
            path: path.into(),
        }
    }

    /// Location of the memcheck log relative to the logs directory. The
    /// id's directories are mirrored, so `walls/open.cub` logs to
    /// `walls/LOG_open.cub` and distinct ids never share a log.
    pub fn log_relpath(&self) -> PathBuf {
        let id = Path::new(&self.id);
        let name = id
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.id.clone());
        let log = format!("LOG_{}", name);
        match id.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(log),
            _ => PathBuf::from(log),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Parser,
    Leaks,
}

impl CheckKind {
    /// Fixed-width label used in front of status tags.
    pub fn label(self) -> &'static str {
        match self {
            CheckKind::Parser => "PARSER : ",
            CheckKind::Leaks => "LEAKS  : ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
/// Pass/fail tally for one check kind, with failing files in input order.
pub struct CheckCounter {
    pub passed: usize,
    pub failed: usize,
    pub files: Vec<String>,
}

impl CheckCounter {
    pub fn record(&mut self, file: &MapFile, verdict: Verdict) {
        match verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Fail => {
                self.failed += 1;
                self.files.push(file.id.clone());
            }
        }
    }

    pub fn has_failed(&self, file: &MapFile) -> bool {
        self.files.iter().any(|f| f == &file.id)
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
/// Aggregate of one run.
pub struct Report {
    pub parser: CheckCounter,
    pub leaks: CheckCounter,
    pub maps: usize,
}

impl Report {
    pub fn any_failed(&self) -> bool {
        self.parser.failed > 0 || self.leaks.failed > 0
    }
}
