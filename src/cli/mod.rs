//! Command-line parsing for the synthetic sales analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data/analysis code.
//!
//! Generator settings can also be supplied through environment variables
//! (a `.env` file is loaded before parsing).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ChartKind, Measure, Product, Region};
use crate::plot::CHART_SIZE;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Synthetic sales dataset: aggregation, reports and charts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate the dataset and print summary tables (the default).
    Report(ReportArgs),
    /// Generate the dataset and render SVG charts.
    Charts(ChartsArgs),
    /// Launch the interactive terminal dashboard.
    Tui(AnalysisArgs),
}

/// Generator and filter options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct AnalysisArgs {
    /// Random seed for dataset generation.
    #[arg(long, env = "SALES_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Calendar year of the twelve monthly points.
    #[arg(long, env = "SALES_YEAR", default_value_t = 2023)]
    pub year: i32,

    /// Lower bound of per-row sales.
    #[arg(long, env = "SALES_MIN", default_value_t = 1000.0)]
    pub sales_min: f64,

    /// Upper bound (exclusive) of per-row sales.
    #[arg(long, env = "SALES_MAX", default_value_t = 5000.0)]
    pub sales_max: f64,

    /// Lower bound of cost as a fraction of sales.
    #[arg(long, env = "SALES_COST_RATIO_MIN", default_value_t = 0.5)]
    pub cost_ratio_min: f64,

    /// Upper bound (exclusive) of cost as a fraction of sales.
    #[arg(long, env = "SALES_COST_RATIO_MAX", default_value_t = 0.8)]
    pub cost_ratio_max: f64,

    /// Amplitude of the yearly seasonal swing in sales, in [0, 1).
    #[arg(long, env = "SALES_SEASONALITY", default_value_t = 0.0)]
    pub seasonality: f64,

    /// Only keep rows for this region.
    #[arg(short = 'r', long, value_enum)]
    pub region: Option<Region>,

    /// Only keep rows for this product (a, b, c).
    #[arg(short = 'p', long, value_enum)]
    pub product: Option<Product>,

    /// First month (1-12) to keep.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub from_month: u32,

    /// Last month (1-12) to keep.
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub to_month: u32,

    /// Measure used for the monthly trend and the top-N table.
    #[arg(short = 'm', long, value_enum, default_value_t = Measure::Sales)]
    pub measure: Measure,
}

/// Options for the `report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: AnalysisArgs,

    /// Show the top-N rows by the selected measure.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Disable the terminal trend plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Export the filtered rows to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the report (aggregates, pivot, trend, correlation) to JSON.
    #[arg(long = "export-summary")]
    pub export_summary: Option<PathBuf>,
}

/// Options for the `charts` command.
#[derive(Debug, Parser, Clone)]
pub struct ChartsArgs {
    #[command(flatten)]
    pub data: AnalysisArgs,

    /// Directory that receives one SVG per chart.
    #[arg(short = 'o', long, env = "SALES_OUT_DIR", default_value = "charts")]
    pub out_dir: PathBuf,

    /// Render only these charts (repeatable); all charts by default.
    #[arg(long, value_enum)]
    pub only: Vec<ChartKind>,

    /// Chart width (pixels).
    #[arg(long, default_value_t = CHART_SIZE.0)]
    pub width: u32,

    /// Chart height (pixels).
    #[arg(long, default_value_t = CHART_SIZE.1)]
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_report_filters() {
        let cli = Cli::parse_from([
            "sales", "report", "--seed", "7", "-r", "east", "-p", "b", "--from-month", "3", "-m", "profit",
        ]);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.data.seed, 7);
        assert_eq!(args.data.region, Some(Region::East));
        assert_eq!(args.data.product, Some(Product::ProductB));
        assert_eq!(args.data.from_month, 3);
        assert_eq!(args.data.to_month, 12);
        assert_eq!(args.data.measure, Measure::Profit);
    }

    #[test]
    fn parses_chart_selection() {
        let cli = Cli::parse_from([
            "sales", "charts", "--only", "product-share", "--only", "region-box", "-o", "out",
        ]);
        let Command::Charts(args) = cli.command else {
            panic!("expected charts");
        };
        assert_eq!(args.only, vec![ChartKind::ProductShare, ChartKind::RegionBox]);
        assert_eq!(args.out_dir, PathBuf::from("out"));
        assert_eq!((args.width, args.height), CHART_SIZE);
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!(Cli::try_parse_from(["sales", "report", "--to-month", "13"]).is_err());
    }
}
