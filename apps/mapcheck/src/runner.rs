//! Sequential check loop over every discovered map.
//!
//! Each file gets its parser check and then, when enabled, its leak check.
//! One child process runs at a time. A failing file never stops the run.

use crate::config::Effective;
use crate::error::Result;
use crate::leaks::{evaluate_leaks, LeakSettings};
use crate::models::{MapFile, Report};
use crate::output;
use crate::parser::evaluate_parser;
use tracing::info;

/// Check `files` in order and return the aggregated report.
pub fn run_checks(files: &[MapFile], eff: &Effective) -> Result<Report> {
    let target = eff.require_target()?;
    let leak_settings = LeakSettings {
        target,
        memcheck: &eff.memcheck,
        log_flag: &eff.log_flag,
        search: &eff.search,
        logs_dir: &eff.logs_dir,
    };
    let human = eff.output != "json";

    let mut report = Report {
        maps: files.len(),
        ..Default::default()
    };
    for (i, file) in files.iter().enumerate() {
        if human {
            output::print_header(file, i, files.len(), &eff.output);
        }

        let parsed = evaluate_parser(file, target);
        report.parser.record(file, parsed.verdict);
        if human {
            output::print_parser(&parsed, &eff.output);
        }

        if !eff.leaks_enabled {
            continue;
        }
        if let Some(leaked) = evaluate_leaks(file, &report.parser, &leak_settings) {
            report.leaks.record(file, leaked.verdict);
            if human {
                output::print_leaks(&leaked, &eff.output);
            }
        }
    }
    info!(
        maps = report.maps,
        parser_failed = report.parser.failed,
        leaks_failed = report.leaks.failed,
        "run finished"
    );
    Ok(report)
}
