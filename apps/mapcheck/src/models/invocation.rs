//! Structured command lines for the external tools.

use crate::error::{CheckError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// A program plus its leading arguments. Extra arguments (log flag, input
/// path) are appended per call; nothing ever passes through a shell.
pub struct Invocation {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Invocation {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Split an environment-style template (`"valgrind --leak-check=full"`)
    /// on whitespace into program and arguments.
    pub fn parse_template(template: &str, what: &'static str) -> Result<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(CheckError::EmptyTemplate(what))?;
        Ok(Invocation {
            program,
            args: parts.collect(),
        })
    }

    /// Anchor a program path containing a separator to `root`; bare names
    /// are left for `PATH` lookup.
    pub fn anchored(mut self, root: &Path) -> Self {
        let p = Path::new(&self.program);
        if p.is_relative() && self.program.contains('/') {
            self.program = root.join(p).to_string_lossy().to_string();
        }
        self
    }

    /// Program and arguments as a flat list, for nesting under another tool.
    pub fn argv(&self) -> Vec<String> {
        let mut v = Vec::with_capacity(self.args.len() + 1);
        v.push(self.program.clone());
        v.extend(self.args.iter().cloned());
        v
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    pub fn display(&self) -> String {
        self.argv().join(" ")
    }
}
