//! Leak check: run the target under a memory checker and scan its log.
//!
//! The memory checker's own exit status is ignored; only the log it writes
//! matters. Logs of clean runs are deleted, logs of leaking runs are kept
//! under the logs directory as `LOG_<file>` (nested ids keep their
//! directories) for inspection.

use crate::exec::capture;
use crate::models::invocation::Invocation;
use crate::models::{CheckCounter, MapFile, Verdict};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Tools and locations needed to run one leak check.
pub struct LeakSettings<'a> {
    pub target: &'a Invocation,
    pub memcheck: &'a Invocation,
    /// Prefix for the log destination, e.g. `--log-file=`. A trailing space
    /// makes the path a separate argument.
    pub log_flag: &'a str,
    pub search: &'a Invocation,
    pub logs_dir: &'a Path,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of the memory-checker step.
pub enum LogState {
    Produced(PathBuf),
    Absent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Totals parsed from `definitely lost: N bytes in M blocks` lines.
pub struct LeakSummary {
    pub bytes: u64,
    pub blocks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeakOutcome {
    pub verdict: Verdict,
    /// Lines the search tool matched, trimmed.
    pub matches: String,
    pub summary: Option<LeakSummary>,
    /// Log left on disk; only set for failures.
    pub log: Option<PathBuf>,
    pub reason: Option<String>,
}

impl LeakOutcome {
    fn pass() -> Self {
        LeakOutcome {
            verdict: Verdict::Pass,
            matches: String::new(),
            summary: None,
            log: None,
            reason: None,
        }
    }
}

fn summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"definitely lost:\s+([\d,]+)\s+bytes\s+in\s+([\d,]+)\s+blocks")
            .expect("static regex")
    })
}

/// Sum every `definitely lost` record found in `text`.
pub fn parse_summary(text: &str) -> Option<LeakSummary> {
    let num = |s: &str| s.replace(',', "").parse::<u64>().unwrap_or(0);
    let mut found = None;
    for cap in summary_re().captures_iter(text) {
        let s = found.get_or_insert_with(LeakSummary::default);
        s.bytes += num(&cap[1]);
        s.blocks += num(&cap[2]);
    }
    found
}

pub fn log_path(logs_dir: &Path, file: &MapFile) -> PathBuf {
    logs_dir.join(file.log_relpath())
}

/// Run the target under the memory checker, writing its log for `file`.
pub fn run_memcheck(file: &MapFile, settings: &LeakSettings<'_>) -> LogState {
    let log = log_path(settings.logs_dir, file);
    let dir = log.parent().unwrap_or(settings.logs_dir);
    if let Err(e) = fs::create_dir_all(dir) {
        warn!(dir = %dir.display(), error = %e, "cannot create logs directory");
    }
    // A stale log from an earlier run must not be mistaken for this one.
    if log.exists() {
        if let Err(e) = fs::remove_file(&log) {
            warn!(log = %log.display(), error = %e, "cannot remove stale log; not scanning it");
            return LogState::Absent;
        }
    }

    let mut cmd = settings.memcheck.command();
    match settings.log_flag.strip_suffix(' ') {
        Some(flag) => {
            cmd.arg(flag.trim_end()).arg(&log);
        }
        None => {
            let mut arg = std::ffi::OsString::from(settings.log_flag);
            arg.push(log.as_os_str());
            cmd.arg(arg);
        }
    }
    cmd.args(settings.target.argv()).arg(&file.path);

    match capture(cmd) {
        Ok(c) => debug!(file = %file.id, code = ?c.code, "memcheck finished"),
        Err(e) => warn!(file = %file.id, error = %e, "memcheck did not start"),
    }

    if log.is_file() {
        LogState::Produced(log)
    } else {
        LogState::Absent
    }
}

/// Scan a produced log with the search tool and classify it.
pub fn scan_log(file: &MapFile, log: &Path, search: &Invocation) -> LeakOutcome {
    let mut cmd = search.command();
    cmd.arg(log);
    let c = match capture(cmd) {
        Ok(c) => c,
        Err(e) => {
            return LeakOutcome {
                verdict: Verdict::Fail,
                matches: String::new(),
                summary: None,
                log: Some(log.to_path_buf()),
                reason: Some(e.to_string()),
            }
        }
    };
    if c.success() {
        return LeakOutcome {
            verdict: Verdict::Fail,
            summary: parse_summary(&c.stdout),
            matches: c.stdout.trim().to_string(),
            log: Some(log.to_path_buf()),
            reason: None,
        };
    }
    if c.code != Some(1) {
        warn!(file = %file.id, code = ?c.code, stderr = %c.stderr.trim(), "search tool reported an error");
    }
    if let Err(e) = fs::remove_file(log) {
        warn!(log = %log.display(), error = %e, "cannot remove log");
    }
    LeakOutcome::pass()
}

/// Leak-check `file`. Returns `None` without running anything when the
/// parser check already failed for it.
pub fn evaluate_leaks(
    file: &MapFile,
    parser: &CheckCounter,
    settings: &LeakSettings<'_>,
) -> Option<LeakOutcome> {
    if parser.has_failed(file) {
        debug!(file = %file.id, "skipping leak check after parser failure");
        return None;
    }
    let outcome = match run_memcheck(file, settings) {
        LogState::Produced(log) => scan_log(file, &log, settings.search),
        LogState::Absent => {
            warn!(file = %file.id, "memcheck produced no log; nothing to scan");
            LeakOutcome::pass()
        }
    };
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_sums_records() {
        let log = "\
==42== LEAK SUMMARY:
==42==    definitely lost: 1,024 bytes in 2 blocks
==42==    indirectly lost: 0 bytes in 0 blocks
==43==    definitely lost: 8 bytes in 1 blocks
";
        let s = parse_summary(log).unwrap();
        assert_eq!(s.bytes, 1032);
        assert_eq!(s.blocks, 3);
        assert!(parse_summary("All heap blocks were freed").is_none());
    }

    #[cfg(unix)]
    mod with_tools {
        use super::super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::tempdir;

        /// Fake memcheck: writes `body` to the `--log-file=` path, then
        /// runs the wrapped command.
        fn fake_memcheck(dir: &Path, body: &str) -> Invocation {
            let path = dir.join("memcheck.sh");
            let script = format!(
                "#!/bin/sh\nlog=\"${{1#--log-file=}}\"\nshift\nprintf '%s\\n' '{}' > \"$log\"\n\"$@\" >/dev/null 2>&1\nexit 1\n",
                body
            );
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            Invocation::new(path.to_string_lossy(), &[])
        }

        fn settings<'a>(
            target: &'a Invocation,
            memcheck: &'a Invocation,
            search: &'a Invocation,
            logs: &'a Path,
        ) -> LeakSettings<'a> {
            LeakSettings {
                target,
                memcheck,
                log_flag: "--log-file=",
                search,
                logs_dir: logs,
            }
        }

        #[test]
        fn test_leak_found_keeps_log() {
            let dir = tempdir().unwrap();
            let logs = dir.path().join("logs");
            let target = Invocation::new("true", &[]);
            let memcheck = fake_memcheck(dir.path(), "==1==    definitely lost: 16 bytes in 1 blocks");
            let search = Invocation::new("grep", &["definitely lost"]);
            let file = MapFile::new("invalid_map.txt", dir.path().join("invalid_map.txt"));

            let out = evaluate_leaks(
                &file,
                &CheckCounter::default(),
                &settings(&target, &memcheck, &search, &logs),
            )
            .unwrap();
            assert_eq!(out.verdict, Verdict::Fail);
            assert!(out.matches.contains("definitely lost"));
            assert_eq!(out.summary, Some(LeakSummary { bytes: 16, blocks: 1 }));
            assert!(logs.join("LOG_invalid_map.txt").is_file());
            assert_eq!(out.log, Some(logs.join("LOG_invalid_map.txt")));
        }

        #[test]
        fn test_clean_run_removes_log() {
            let dir = tempdir().unwrap();
            let logs = dir.path().join("logs");
            let target = Invocation::new("true", &[]);
            let memcheck = fake_memcheck(dir.path(), "==1== All heap blocks were freed");
            let search = Invocation::new("grep", &["definitely lost"]);
            let file = MapFile::new("invalid_map.txt", dir.path().join("invalid_map.txt"));

            let out = evaluate_leaks(
                &file,
                &CheckCounter::default(),
                &settings(&target, &memcheck, &search, &logs),
            )
            .unwrap();
            assert_eq!(out.verdict, Verdict::Pass);
            assert!(!logs.join("LOG_invalid_map.txt").exists());
        }

        #[test]
        fn test_parser_failure_skips_everything() {
            let dir = tempdir().unwrap();
            let logs = dir.path().join("logs");
            let target = Invocation::new("true", &[]);
            let memcheck = fake_memcheck(dir.path(), "definitely lost: 1 bytes in 1 blocks");
            let search = Invocation::new("grep", &["definitely lost"]);
            let file = MapFile::new("broken.cub", dir.path().join("broken.cub"));
            let mut parser = CheckCounter::default();
            parser.record(&file, Verdict::Fail);

            let out = evaluate_leaks(&file, &parser, &settings(&target, &memcheck, &search, &logs));
            assert!(out.is_none());
            assert!(!logs.exists());
        }

        #[test]
        fn test_missing_memcheck_means_absent_log() {
            let dir = tempdir().unwrap();
            let logs = dir.path().join("logs");
            let target = Invocation::new("true", &[]);
            let memcheck = Invocation::new("/nonexistent/valgrind", &[]);
            let search = Invocation::new("grep", &["definitely lost"]);
            let file = MapFile::new("a.cub", dir.path().join("a.cub"));
            let s = settings(&target, &memcheck, &search, &logs);

            assert_eq!(run_memcheck(&file, &s), LogState::Absent);
            let out = evaluate_leaks(&file, &CheckCounter::default(), &s).unwrap();
            assert_eq!(out.verdict, Verdict::Pass);
        }

        #[test]
        fn test_unremovable_stale_log_is_not_scanned() {
            let dir = tempdir().unwrap();
            let logs = dir.path().join("logs");
            // A directory in the log's place cannot be removed with remove_file.
            fs::create_dir_all(logs.join("LOG_a.cub")).unwrap();
            fs::write(logs.join("LOG_a.cub/old"), "definitely lost: 4 bytes in 1 blocks\n").unwrap();
            let target = Invocation::new("true", &[]);
            let memcheck = fake_memcheck(dir.path(), "definitely lost: 8 bytes in 1 blocks");
            let search = Invocation::new("grep", &["definitely lost"]);
            let file = MapFile::new("a.cub", dir.path().join("a.cub"));

            let s = settings(&target, &memcheck, &search, &logs);
            assert_eq!(run_memcheck(&file, &s), LogState::Absent);
        }

        #[test]
        fn test_nested_id_logs_under_mirrored_dir() {
            let dir = tempdir().unwrap();
            let logs = dir.path().join("logs");
            let target = Invocation::new("true", &[]);
            let memcheck = fake_memcheck(dir.path(), "definitely lost: 8 bytes in 1 blocks");
            let search = Invocation::new("grep", &["definitely lost"]);
            let file = MapFile::new("walls/open.cub", dir.path().join("open.cub"));

            let out = evaluate_leaks(
                &file,
                &CheckCounter::default(),
                &settings(&target, &memcheck, &search, &logs),
            )
            .unwrap();
            assert_eq!(out.verdict, Verdict::Fail);
            assert!(logs.join("walls/LOG_open.cub").is_file());
        }

        #[test]
        fn test_stale_log_is_replaced() {
            let dir = tempdir().unwrap();
            let logs = dir.path().join("logs");
            fs::create_dir_all(&logs).unwrap();
            fs::write(logs.join("LOG_a.cub"), "definitely lost: 4 bytes in 1 blocks\n").unwrap();
            let target = Invocation::new("true", &[]);
            let memcheck = Invocation::new("/nonexistent/valgrind", &[]);
            let search = Invocation::new("grep", &["definitely lost"]);
            let file = MapFile::new("a.cub", dir.path().join("a.cub"));

            let out = evaluate_leaks(
                &file,
                &CheckCounter::default(),
                &settings(&target, &memcheck, &search, &logs),
            )
            .unwrap();
            assert_eq!(out.verdict, Verdict::Pass);
            assert!(!logs.join("LOG_a.cub").exists());
        }

        #[test]
        fn test_missing_search_tool_fails_and_keeps_log() {
            let dir = tempdir().unwrap();
            let logs = dir.path().join("logs");
            let target = Invocation::new("true", &[]);
            let memcheck = fake_memcheck(dir.path(), "clean");
            let search = Invocation::new("/nonexistent/grep", &[]);
            let file = MapFile::new("a.cub", dir.path().join("a.cub"));

            let out = evaluate_leaks(
                &file,
                &CheckCounter::default(),
                &settings(&target, &memcheck, &search, &logs),
            )
            .unwrap();
            assert_eq!(out.verdict, Verdict::Fail);
            assert!(out.reason.is_some());
            assert!(logs.join("LOG_a.cub").is_file());
        }
    }
}
