//! Terminal rendering for per-file progress, check tags, and the report.
//!
//! Supports `human` (default) and `json` outputs. In JSON mode nothing is
//! printed while checks run; the report is emitted once at the end.

use crate::leaks::LeakOutcome;
use crate::models::{CheckCounter, CheckKind, MapFile, Report, Verdict};
use crate::parser::ParserOutcome;
use crate::utils::use_colors;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

const BAR_WIDTH: usize = 30;

/// Render a progress bar for `current` out of `total`.
pub fn progress_bar(total: usize, current: usize, width: usize) -> String {
    let current = current.min(total);
    let filled = if total == 0 {
        width
    } else {
        current * width / total
    };
    format!(
        "[{}{}] {}/{}",
        "#".repeat(filled),
        "-".repeat(width - filled),
        current,
        total
    )
}

/// Title and progress line printed before a file's checks.
pub fn print_header(file: &MapFile, index: usize, total: usize, output: &str) {
    let color = use_colors(output);
    let bar = progress_bar(total, index + 1, BAR_WIDTH);
    if color {
        println!("\n{}", file.id.bold().underline());
        println!("{}\n", bar.cyan());
    } else {
        println!("\n{}", file.id);
        println!("{}\n", bar);
    }
}

fn tag(kind: CheckKind, verdict: Verdict, detail: Option<&str>, color: bool) -> String {
    let label = match verdict {
        Verdict::Pass => "[OK]",
        Verdict::Fail => "[FAILED]",
    };
    let label = match (color, verdict) {
        (true, Verdict::Pass) => label.green().bold().to_string(),
        (true, Verdict::Fail) => label.red().bold().to_string(),
        (false, _) => label.to_string(),
    };
    match detail {
        Some(d) if color && verdict == Verdict::Fail => format!("{}{} {}", kind.label(), label, d.red()),
        Some(d) => format!("{}{} {}", kind.label(), label, d),
        None => format!("{}{}", kind.label(), label),
    }
}

pub fn print_parser(outcome: &ParserOutcome, output: &str) {
    let color = use_colors(output);
    if !outcome.output.is_empty() {
        println!("{}", outcome.output);
    }
    println!(
        "{}",
        tag(CheckKind::Parser, outcome.verdict, outcome.reason.as_deref(), color)
    );
}

pub fn print_leaks(outcome: &LeakOutcome, output: &str) {
    let color = use_colors(output);
    if !outcome.matches.is_empty() {
        println!("{}", outcome.matches);
    }
    let detail = match (&outcome.reason, &outcome.summary, &outcome.log) {
        (Some(r), _, _) => Some(r.clone()),
        (None, Some(s), Some(log)) => Some(format!(
            "{} bytes in {} blocks (log: {})",
            s.bytes,
            s.blocks,
            log.display()
        )),
        (None, None, Some(log)) => Some(format!("(log: {})", log.display())),
        _ => None,
    };
    println!(
        "{}",
        tag(CheckKind::Leaks, outcome.verdict, detail.as_deref(), color)
    );
}

/// Plain-text summary lines for one check kind.
pub fn summary_lines(kind: CheckKind, counter: &CheckCounter) -> Vec<String> {
    let mut lines = vec![format!(
        "{}passed={} failed={} total={}",
        kind.label(),
        counter.passed,
        counter.failed,
        counter.total()
    )];
    for f in &counter.files {
        lines.push(format!("  - {}", f));
    }
    lines
}

/// Print the final report in the requested format.
pub fn print_report(report: &Report, output: &str, leaks_enabled: bool) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_report_json(report, leaks_enabled))
                .unwrap_or_default()
        ),
        _ => {
            let color = use_colors(output);
            let title = format!("— Summary — maps={}", report.maps);
            if color {
                println!("\n{}", title.bold());
            } else {
                println!("\n{}", title);
            }
            let mut kinds = vec![(CheckKind::Parser, &report.parser)];
            if leaks_enabled {
                kinds.push((CheckKind::Leaks, &report.leaks));
            }
            for (kind, counter) in kinds {
                for (i, line) in summary_lines(kind, counter).into_iter().enumerate() {
                    if !color {
                        println!("{}", line);
                    } else if i == 0 && counter.failed == 0 {
                        println!("{}", line.green());
                    } else if i == 0 {
                        println!("{}", line.red());
                    } else {
                        println!("{}", line.bright_black());
                    }
                }
            }
        }
    }
}

/// Compose the report JSON object (pure) for testing purposes.
pub fn compose_report_json(report: &Report, leaks_enabled: bool) -> JsonVal {
    let leaks = if leaks_enabled {
        serde_json::to_value(&report.leaks).unwrap_or(JsonVal::Null)
    } else {
        JsonVal::Null
    };
    json!({
        "maps": report.maps,
        "parser": serde_json::to_value(&report.parser).unwrap_or(JsonVal::Null),
        "leaks": leaks,
        "ok": !report.any_failed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(4, 1, 8), "[##------] 1/4");
        assert_eq!(progress_bar(4, 4, 8), "[########] 4/4");
        assert_eq!(progress_bar(3, 9, 3), "[###] 3/3");
        assert_eq!(progress_bar(0, 0, 2), "[##] 0/0");
    }

    #[test]
    fn test_plain_tags() {
        assert_eq!(tag(CheckKind::Parser, Verdict::Pass, None, false), "PARSER : [OK]");
        assert_eq!(
            tag(CheckKind::Parser, Verdict::Fail, Some("expected an error"), false),
            "PARSER : [FAILED] expected an error"
        );
        assert_eq!(tag(CheckKind::Leaks, Verdict::Fail, None, false), "LEAKS  : [FAILED]");
    }

    #[test]
    fn test_summary_lines_list_failures() {
        let mut c = CheckCounter::default();
        c.record(&MapFile::new("a.cub", "a.cub"), Verdict::Pass);
        c.record(&MapFile::new("b.cub", "b.cub"), Verdict::Fail);
        let lines = summary_lines(CheckKind::Leaks, &c);
        assert_eq!(lines[0], "LEAKS  : passed=1 failed=1 total=2");
        assert_eq!(lines[1], "  - b.cub");
    }

    #[test]
    fn test_compose_report_json_shape() {
        let mut r = Report {
            maps: 2,
            ..Default::default()
        };
        r.parser.record(&MapFile::new("a.cub", "a.cub"), Verdict::Pass);
        r.leaks.record(&MapFile::new("a.cub", "a.cub"), Verdict::Fail);
        let out = compose_report_json(&r, true);
        assert_eq!(out["maps"], 2);
        assert_eq!(out["parser"]["passed"], 1);
        assert_eq!(out["leaks"]["files"][0], "a.cub");
        assert_eq!(out["ok"], false);
        let out = compose_report_json(&r, false);
        assert!(out["leaks"].is_null());
    }
}
