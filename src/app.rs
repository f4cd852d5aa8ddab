//! Top-level application orchestration.
//!
//! This module is the "real main":
//! - loads `.env` and parses CLI arguments
//! - generates and filters the synthetic dataset
//! - prints reports/plots or renders charts
//! - writes optional exports

use clap::Parser;

use crate::cli::{AnalysisArgs, ChartsArgs, Command, ReportArgs};
use crate::domain::{AnalysisConfig, ChartKind};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env file is fine; everything has a default.
    match dotenvy::dotenv() {
        Err(err) if !err.not_found() => {
            return Err(AppError::config(format!("Failed to load .env: {err}")));
        }
        _ => {}
    }

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Charts(args) => handle_charts(args),
        Command::Tui(args) => crate::tui::run(config_from_args(&args)),
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = report_config_from_args(&args);
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_report(&run.report, &config));

    if config.plot {
        let series: Vec<_> = run.report.monthly.iter().map(|p| (p.date, p.value)).collect();
        let plot = crate::plot::render_ascii_trend(
            &series,
            config.measure,
            config.plot_width,
            config.plot_height,
            true,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export_rows {
        crate::io::write_rows_csv(path, &run.table)?;
    }
    if let Some(path) = &config.export_summary {
        crate::io::write_summary_json(path, &run.report)?;
    }

    Ok(())
}

fn handle_charts(args: ChartsArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.data);
    let run = pipeline::run_analysis(&config)?;

    let kinds: Vec<ChartKind> = if args.only.is_empty() {
        ChartKind::ALL.to_vec()
    } else {
        args.only.clone()
    };

    let written = crate::plot::render_charts(&run.table, &kinds, &args.out_dir, (args.width, args.height))?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

/// Generator and filter settings shared by every command.
pub fn config_from_args(args: &AnalysisArgs) -> AnalysisConfig {
    AnalysisConfig {
        seed: args.seed,
        year: args.year,
        sales_min: args.sales_min,
        sales_max: args.sales_max,
        cost_ratio_min: args.cost_ratio_min,
        cost_ratio_max: args.cost_ratio_max,
        seasonality: args.seasonality,
        filter_region: args.region,
        filter_product: args.product,
        month_from: args.from_month,
        month_to: args.to_month,
        measure: args.measure,
        ..AnalysisConfig::default()
    }
}

pub fn report_config_from_args(args: &ReportArgs) -> AnalysisConfig {
    AnalysisConfig {
        top_n: args.top,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_rows: args.export.clone(),
        export_summary: args.export_summary.clone(),
        ..config_from_args(&args.data)
    }
}

/// Rewrite argv so `sales` defaults to `sales report`.
///
/// Rules:
/// - `sales`                      -> `sales report`
/// - `sales --seed 7 ...`         -> `sales report --seed 7 ...`
/// - `sales --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "charts" | "tui");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    argv
}
