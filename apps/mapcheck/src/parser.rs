//! Parser check: the target must reject every input it is given.
//!
//! A run counts as a pass when the target either exits non-zero (for any
//! reason, crashes included) or exits zero after printing `Error\n` on
//! stdout. Exiting zero without the marker is a failure.

use crate::exec::{capture, Captured};
use crate::models::invocation::Invocation;
use crate::models::{MapFile, Verdict};
use tracing::warn;

/// Marker the target prints on stdout when it rejects an input.
pub const ERROR_MARKER: &str = "Error\n";

pub const EXPECTED_ERROR: &str = "expected an error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOutcome {
    pub verdict: Verdict,
    /// Captured output worth echoing, already trimmed.
    pub output: String,
    pub reason: Option<String>,
}

/// Classify a finished target run.
pub fn classify(c: &Captured) -> ParserOutcome {
    if !c.success() {
        // Any non-zero exit or signal counts as the target detecting the error.
        let output = if c.stdout.trim().is_empty() {
            c.stderr.trim()
        } else {
            c.stdout.trim()
        };
        return ParserOutcome {
            verdict: Verdict::Pass,
            output: output.to_string(),
            reason: None,
        };
    }
    if c.stdout.contains(ERROR_MARKER) {
        ParserOutcome {
            verdict: Verdict::Pass,
            output: c.stdout.trim().to_string(),
            reason: None,
        }
    } else {
        ParserOutcome {
            verdict: Verdict::Fail,
            output: c.stdout.trim().to_string(),
            reason: Some(EXPECTED_ERROR.to_string()),
        }
    }
}

/// Run the target against `file` and classify the result. A target that
/// cannot be launched counts like any other non-zero exit: a pass, with the
/// launch error echoed as output.
pub fn evaluate_parser(file: &MapFile, target: &Invocation) -> ParserOutcome {
    let mut cmd = target.command();
    cmd.arg(&file.path);
    match capture(cmd) {
        Ok(c) => classify(&c),
        Err(e) => {
            warn!(file = %file.id, error = %e, "target did not start; counting as non-zero exit");
            ParserOutcome {
                verdict: Verdict::Pass,
                output: e.to_string(),
                reason: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: Option<i32>, stdout: &str, stderr: &str) -> Captured {
        Captured {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    #[test]
    fn test_zero_exit_with_marker_passes() {
        let o = classify(&run(Some(0), "Error\nmissing texture\n", ""));
        assert_eq!(o.verdict, Verdict::Pass);
        assert_eq!(o.output, "Error\nmissing texture");
        assert!(o.reason.is_none());
    }

    #[test]
    fn test_zero_exit_without_marker_fails() {
        let o = classify(&run(Some(0), "Loaded OK\n", ""));
        assert_eq!(o.verdict, Verdict::Fail);
        assert_eq!(o.reason.as_deref(), Some(EXPECTED_ERROR));
    }

    #[test]
    fn test_marker_requires_trailing_newline() {
        let o = classify(&run(Some(0), "Error", ""));
        assert_eq!(o.verdict, Verdict::Fail);
    }

    #[test]
    fn test_non_zero_exit_always_passes() {
        let o = classify(&run(Some(1), "Loaded OK\n", ""));
        assert_eq!(o.verdict, Verdict::Pass);
        let o = classify(&run(Some(139), "", "Segmentation fault\n"));
        assert_eq!(o.verdict, Verdict::Pass);
        assert_eq!(o.output, "Segmentation fault");
        let o = classify(&run(None, "", ""));
        assert_eq!(o.verdict, Verdict::Pass);
    }

    #[cfg(unix)]
    #[test]
    fn test_unlaunchable_target_counts_as_non_zero_exit() {
        let target = Invocation::new("/nonexistent/cub3D", &[]);
        let file = MapFile::new("a.cub", "a.cub");
        let o = evaluate_parser(&file, &target);
        assert_eq!(o.verdict, Verdict::Pass);
        assert!(o.reason.is_none());
        assert!(o.output.contains("/nonexistent/cub3D"));
    }

    #[cfg(unix)]
    #[test]
    fn test_evaluate_passes_file_as_last_argument() {
        let target = Invocation::new("sh", &["-c", "case \"$0\" in *bad.cub) echo Error;; *) echo fine;; esac"]);
        let bad = MapFile::new("bad.cub", "maps/bad.cub");
        let good = MapFile::new("good.cub", "maps/good.cub");
        assert_eq!(evaluate_parser(&bad, &target).verdict, Verdict::Pass);
        assert_eq!(evaluate_parser(&good, &target).verdict, Verdict::Fail);
        // Same target behaviour, same classification.
        assert_eq!(evaluate_parser(&bad, &target), evaluate_parser(&bad, &target));
    }
}
