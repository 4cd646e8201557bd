//! mapcheck core library.
//!
//! Runs a target binary against a directory of intentionally invalid maps
//! and checks two things per map: the target rejects it, and the rejecting
//! run does not leak memory under a memory checker.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `discover`: Glob-based map enumeration.
//! - `exec`: Blocking subprocess execution with captured output.
//! - `parser`: Parser check and its classification policy.
//! - `leaks`: Memcheck run, log scan, and log cleanup.
//! - `runner`: Sequential loop producing the run report.
//! - `models`: Counters, report, input files, and tool invocations.
//! - `output`: Human/JSON printers.
//! - `error`: Tool-level error type.
pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod exec;
pub mod leaks;
pub mod models;
pub mod output;
pub mod parser;
pub mod runner;
pub mod utils;
