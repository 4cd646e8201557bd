//! CLI argument parsing via `clap`.

use crate::config::Overrides;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mapcheck",
    version,
    about = "Check that a map parser rejects invalid maps without leaking",
    long_about = "mapcheck runs a target binary against every map in a directory.\nEach map must be rejected (non-zero exit, or `Error` on stdout), and the\nrejecting run must not leak memory under valgrind.\n\nConfiguration precedence: CLI > MAPCHECK_* env > mapcheck.toml > defaults.",
    after_help = "Examples:\n  mapcheck run --exec ./cub3D --maps maps/invalid\n  mapcheck run --pattern '*.ber' --no-leaks\n  mapcheck ls --maps maps/invalid",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current mapcheck version.")]
    Version,
    /// Run parser and leak checks
    #[command(
        about = "Run parser and leak checks",
        long_about = "Check every matched map in order. Exits 1 if any check failed, 2 on configuration errors.",
        after_help = "Examples:\n  mapcheck run --exec ./cub3D\n  mapcheck run --output json"
    )]
    Run {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Maps directory relative to the root (default: maps)")]
        maps: Option<String>,
        #[arg(long = "pattern", help = "Glob pattern under the maps directory; repeatable (default: *)")]
        patterns: Vec<String>,
        #[arg(long, help = "Directory for memcheck logs (default: logs)")]
        logs: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human); anything else is rejected")]
        output: Option<String>,
        #[arg(long, help = "Target command, e.g. \"./cub3D\"")]
        exec: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Skip the leak check")]
        no_leaks: bool,
    },
    /// List the maps that would be checked
    #[command(about = "List maps", long_about = "Print the identifiers of every matched map, in check order.")]
    Ls {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Maps directory relative to the root (default: maps)")]
        maps: Option<String>,
        #[arg(long = "pattern", help = "Glob pattern under the maps directory; repeatable (default: *)")]
        patterns: Vec<String>,
    },
}

impl Commands {
    /// CLI values as config overrides.
    pub fn overrides(&self) -> Overrides {
        match self {
            Commands::Version => Overrides::default(),
            Commands::Run {
                repo_root,
                maps,
                patterns,
                logs,
                output,
                exec,
                no_leaks,
            } => Overrides {
                repo_root: repo_root.clone(),
                maps: maps.clone(),
                patterns: patterns.clone(),
                logs: logs.clone(),
                output: output.clone(),
                exec: exec.clone(),
                no_leaks: *no_leaks,
            },
            Commands::Ls {
                repo_root,
                maps,
                patterns,
            } => Overrides {
                repo_root: repo_root.clone(),
                maps: maps.clone(),
                patterns: patterns.clone(),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags_map_to_overrides() {
        let cli = Cli::try_parse_from([
            "mapcheck", "run", "--exec", "./cub3D", "--pattern", "*.cub", "--pattern", "*.ber",
            "--no-leaks", "--output", "json",
        ])
        .unwrap();
        let ov = cli.cmd.overrides();
        assert_eq!(ov.exec.as_deref(), Some("./cub3D"));
        assert_eq!(ov.patterns, vec!["*.cub", "*.ber"]);
        assert!(ov.no_leaks);
        assert_eq!(ov.output.as_deref(), Some("json"));
    }

    #[test]
    fn test_ls_has_no_target() {
        let cli = Cli::try_parse_from(["mapcheck", "ls", "--maps", "maps/invalid"]).unwrap();
        let ov = cli.cmd.overrides();
        assert_eq!(ov.maps.as_deref(), Some("maps/invalid"));
        assert!(ov.exec.is_none());
    }
}
