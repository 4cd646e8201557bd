//! Configuration discovery and effective settings resolution.
//!
//! mapcheck reads `mapcheck.toml|yaml|yml` from the repository root (or
//! closest ancestor), then applies `MAPCHECK_*` environment variables and
//! CLI flags to produce an `Effective` config.
//! Defaults:
//! - `maps`: `maps`
//! - `patterns`: `["*"]`
//! - `logs`: `logs`
//! - `output`: `human`
//! - `leaks.enabled`: true
//! - `leaks.memcheck`: `valgrind --leak-check=full`, log flag `--log-file=`
//! - `leaks.search`: `grep "definitely lost"`
//!
//! Overrides precedence: CLI > environment > config file > defaults.

use crate::error::{CheckError, Result};
use crate::models::invocation::Invocation;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_NAMES: [&str; 3] = ["mapcheck.toml", "mapcheck.yaml", "mapcheck.yml"];

pub const ENV_EXEC: &str = "MAPCHECK_EXEC";
pub const ENV_MEMCHECK: &str = "MAPCHECK_VALGRIND";
pub const ENV_SEARCH: &str = "MAPCHECK_GREP";
pub const ENV_SEARCH_PATTERN: &str = "MAPCHECK_GREP_PATTERN";
pub const ENV_MAPS: &str = "MAPCHECK_MAPS";
pub const ENV_LOGS: &str = "MAPCHECK_LOGS";

pub const OUTPUT_MODES: [&str; 2] = ["human", "json"];

pub const DEFAULT_LEAK_PHRASE: &str = "definitely lost";

#[derive(Debug, Default, Deserialize, Clone)]
/// Leak-check section under `[leaks]`.
pub struct LeaksCfg {
    pub enabled: Option<bool>,
    pub memcheck: Option<Invocation>,
    #[serde(rename = "logFlag")]
    pub log_flag: Option<String>,
    pub search: Option<Invocation>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `mapcheck.toml|yaml`.
pub struct MapcheckConfig {
    pub maps: Option<String>,
    pub patterns: Option<Vec<String>>,
    pub logs: Option<String>,
    pub output: Option<String>,
    pub target: Option<Invocation>,
    #[serde(default)]
    pub leaks: Option<LeaksCfg>,
}

#[derive(Debug, Default, Clone)]
/// Values supplied on the command line.
pub struct Overrides {
    pub repo_root: Option<String>,
    pub maps: Option<String>,
    pub patterns: Vec<String>,
    pub logs: Option<String>,
    pub output: Option<String>,
    pub exec: Option<String>,
    pub no_leaks: bool,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_found: bool,
    pub maps_dir: PathBuf,
    pub patterns: Vec<String>,
    pub logs_dir: PathBuf,
    pub output: String,
    pub target: Option<Invocation>,
    pub leaks_enabled: bool,
    pub memcheck: Invocation,
    pub log_flag: String,
    pub search: Invocation,
}

impl Effective {
    /// The target invocation, or a config error when none was given.
    pub fn require_target(&self) -> Result<&Invocation> {
        self.target.as_ref().ok_or(CheckError::MissingTarget)
    }
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `mapcheck.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `MapcheckConfig` from `mapcheck.toml` or `mapcheck.yaml|yml` if
/// present. A config that exists but cannot be read or parsed is an error.
pub fn load_config(root: &Path) -> Result<Option<MapcheckConfig>> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|source| CheckError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<MapcheckConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<MapcheckConfig>(&s).map_err(|e| e.to_string())
        };
        return parsed
            .map(Some)
            .map_err(|message| CheckError::ConfigParse { path, message });
    }
    Ok(None)
}

/// Resolve `Effective` from the process environment.
pub fn resolve_effective(cli: &Overrides) -> Result<Effective> {
    resolve_effective_with(cli, |key| std::env::var(key).ok())
}

/// Resolve `Effective` by merging CLI flags, environment lookups, the
/// discovered config, and defaults.
pub fn resolve_effective_with<F>(cli: &Overrides, env: F) -> Result<Effective>
where
    F: Fn(&str) -> Option<String>,
{
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let loaded = load_config(&repo_root)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();
    let leaks_cfg = cfg.leaks.unwrap_or_default();
    let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let maps = cli
        .maps
        .clone()
        .or_else(|| env(ENV_MAPS))
        .or(cfg.maps)
        .unwrap_or_else(|| "maps".to_string());
    let logs = cli
        .logs
        .clone()
        .or_else(|| env(ENV_LOGS))
        .or(cfg.logs)
        .unwrap_or_else(|| "logs".to_string());
    let patterns = if !cli.patterns.is_empty() {
        cli.patterns.clone()
    } else {
        cfg.patterns
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()])
    };
    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if !OUTPUT_MODES.contains(&output.as_str()) {
        return Err(CheckError::OutputMode(output));
    }

    let target = match cli.exec.clone().or_else(|| env(ENV_EXEC)) {
        Some(t) => Some(Invocation::parse_template(&t, "target")?),
        None => cfg.target,
    };

    let memcheck = match env(ENV_MEMCHECK) {
        Some(t) => Invocation::parse_template(&t, "memcheck")?,
        None => leaks_cfg
            .memcheck
            .unwrap_or_else(|| Invocation::new("valgrind", &["--leak-check=full"])),
    };
    let mut search = match env(ENV_SEARCH) {
        Some(t) => Invocation::parse_template(&t, "search")?,
        None => leaks_cfg
            .search
            .unwrap_or_else(|| Invocation::new("grep", &[DEFAULT_LEAK_PHRASE])),
    };
    // The phrase contains spaces, so it is taken whole rather than split.
    // It stands in for the default phrase, otherwise follows the flags.
    if let Some(pattern) = env(ENV_SEARCH_PATTERN) {
        match search.args.iter().position(|a| a == DEFAULT_LEAK_PHRASE) {
            Some(i) => search.args[i] = pattern,
            None => search.args.push(pattern),
        }
    }

    let leaks_enabled = !cli.no_leaks && leaks_cfg.enabled.unwrap_or(true);
    let log_flag = leaks_cfg
        .log_flag
        .unwrap_or_else(|| "--log-file=".to_string());

    Ok(Effective {
        maps_dir: repo_root.join(maps),
        logs_dir: repo_root.join(logs),
        patterns,
        output,
        target: target.map(|t| t.anchored(&repo_root)),
        leaks_enabled,
        memcheck: memcheck.anchored(&repo_root),
        log_flag,
        search: search.anchored(&repo_root),
        config_found,
        repo_root,
    })
}
