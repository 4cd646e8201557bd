//! Blocking subprocess execution with captured output.

use crate::error::{CheckError, Result};
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
/// What a finished child process left behind.
pub struct Captured {
    /// `None` when the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Run `cmd` to completion and collect its output. Only a failure to launch
/// the program is an error; any exit status is returned as-is.
pub fn capture(mut cmd: Command) -> Result<Captured> {
    let program = cmd.get_program().to_string_lossy().to_string();
    debug!(
        program = %program,
        args = ?cmd.get_args().collect::<Vec<_>>(),
        "spawning"
    );
    let out = cmd
        .output()
        .map_err(|source| CheckError::Spawn { program, source })?;
    let captured = Captured {
        code: out.status.code(),
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    };
    debug!(code = ?captured.code, "child exited");
    Ok(captured)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_capture_reports_exit_code_and_streams() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out; echo err >&2; exit 3"]);
        let c = capture(cmd).unwrap();
        assert_eq!(c.code, Some(3));
        assert!(!c.success());
        assert_eq!(c.stdout, "out\n");
        assert_eq!(c.stderr, "err\n");
    }

    #[test]
    fn test_capture_missing_program_is_spawn_error() {
        let cmd = Command::new("/nonexistent/mapcheck-target");
        let err = capture(cmd).unwrap_err();
        assert!(matches!(err, CheckError::Spawn { .. }));
    }
}
