//! mapcheck CLI binary entry point.
//! Resolves configuration, enumerates maps, runs checks, prints the report.

use clap::Parser;
use mapcheck::cli::{Cli, Commands};
use mapcheck::error::CheckError;
use mapcheck::{config, discover, output, runner, utils};

fn fail(err: &CheckError) -> ! {
    eprintln!("{} {}", utils::error_prefix(), err);
    std::process::exit(if err.is_config() { 2 } else { 1 });
}

fn main() {
    // Logs go to stderr so they never mix with the JSON report.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let cli = Cli::parse();
    if let Commands::Version = cli.cmd {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let eff = config::resolve_effective(&cli.cmd.overrides()).unwrap_or_else(|e| fail(&e));
    if !eff.config_found && eff.output != "json" {
        eprintln!(
            "{} No mapcheck.toml found; using defaults and MAPCHECK_* variables.",
            utils::note_prefix()
        );
    }
    let files = discover::discover_maps(&eff.maps_dir, &eff.patterns).unwrap_or_else(|e| fail(&e));

    match cli.cmd {
        Commands::Ls { .. } => {
            for f in &files {
                println!("{}", f.id);
            }
        }
        Commands::Run { .. } => {
            if files.is_empty() && eff.output != "json" {
                eprintln!(
                    "{} No maps matched [{}] under {}",
                    utils::info_prefix(),
                    eff.patterns.join(", "),
                    eff.maps_dir.display()
                );
            }
            let report = runner::run_checks(&files, &eff).unwrap_or_else(|e| fail(&e));
            output::print_report(&report, &eff.output, eff.leaks_enabled);
            if report.any_failed() {
                std::process::exit(1);
            }
        }
        Commands::Version => {}
    }
}
