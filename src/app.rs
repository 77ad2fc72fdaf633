//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - loads the rental dataset
//! - builds the dashboard view for the selected range
//! - prints the report or runs the TUI
//! - writes optional exports

use std::path::Path;

use clap::Parser;

use crate::cli::picker::resolve_data_path;
use crate::cli::{Command, DataArgs, ReportArgs, TuiArgs};
use crate::domain::DashboardConfig;
use crate::error::AppError;

pub mod pipeline;

/// File the TUI logs into (stderr belongs to the alternate screen).
const TUI_LOG_FILE: &str = "bikes.log";

/// Entry point for the `bikes` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may provide BIKES_DATA / BIKES_LOG; a missing file is fine.
    dotenvy::dotenv().ok();

    // We want `bikes` and `bikes -f day.csv` to behave like `bikes tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => {
            // Errors reach stderr once, through `main`.
            crate::logging::init_stderr()?;
            handle_report(args)
        }
        Command::Tui(args) => {
            // Held until the final error is logged, so the file gets it.
            let _log_guard = crate::logging::init_file(Path::new("."), TUI_LOG_FILE)?;
            handle_tui(args).inspect_err(|err| tracing::error!(exit_code = err.exit_code(), "{err}"))
        }
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = config_from_report_args(&args)?;

    let dataset = crate::io::ingest::load_dataset(&config.data_path, config.totals_policy)?;
    let range = pipeline::resolve_range(dataset.span(), config.start, config.end)?;
    let view = pipeline::build_view(&dataset, range);

    if config.json {
        let json = serde_json::to_string_pretty(&view)
            .map_err(|e| AppError::runtime(format!("Failed to serialize view: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_dashboard(&view, &dataset, &config));
    }

    // Status lines go to stderr so `--json` output stays machine-readable.
    if let Some(dir) = &config.export_dir {
        for path in crate::io::export::write_summaries(dir, &view)? {
            eprintln!("Wrote {}", path.display());
        }
    }
    if let Some(dir) = &config.charts_dir {
        for path in crate::plot::svg::write_charts(dir, &view)? {
            eprintln!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    // Resolve the file before the TUI takes over the terminal (the picker prompts on stdin).
    let config = config_from_tui_args(&args)?;
    crate::tui::run(config)
}

pub fn config_from_report_args(args: &ReportArgs) -> Result<DashboardConfig, AppError> {
    Ok(DashboardConfig {
        plot_width: args.width,
        plot_height: args.height,
        json: args.json,
        export_dir: args.export.clone(),
        charts_dir: args.charts.clone(),
        ..base_config(&args.data)?
    })
}

pub fn config_from_tui_args(args: &TuiArgs) -> Result<DashboardConfig, AppError> {
    base_config(&args.data)
}

fn base_config(data: &DataArgs) -> Result<DashboardConfig, AppError> {
    Ok(DashboardConfig {
        data_path: resolve_data_path(data.file.clone())?,
        start: data.start,
        end: data.end,
        totals_policy: data.totals,
        plot_width: 72,
        plot_height: 16,
        json: false,
        export_dir: None,
        charts_dir: None,
    })
}

/// Rewrite argv so `bikes` defaults to `bikes tui`.
///
/// Rules:
/// - `bikes`                       -> `bikes tui`
/// - `bikes -f day.csv ...`        -> `bikes tui -f day.csv ...`
/// - `bikes --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}
