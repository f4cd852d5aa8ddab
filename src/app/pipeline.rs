//! Shared analysis pipeline used by the CLI commands and the TUI.
//!
//! generate -> filter -> aggregate
//!
//! The front-ends then only deal with presentation (printing, SVG files, widgets).

use chrono::NaiveDate;

use crate::data::{SalesTable, generate_sample};
use crate::domain::AnalysisConfig;
use crate::error::AppError;
use crate::report::{Report, build_report};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Every generated row, before filtering.
    pub full: SalesTable,
    /// Rows left after the region/product/month filters.
    pub table: SalesTable,
    pub report: Report,
}

/// Generate the dataset, apply the configured filters and build the report.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let full = generate_sample(config)?;
    let table = apply_filters(&full, config)?;

    if table.is_empty() {
        log::warn!("filters removed every row; report will be empty");
    } else {
        log::info!("analysing {} of {} rows", table.len(), full.len());
    }

    let report = build_report(full.len(), &table, config);
    Ok(RunOutput { full, table, report })
}

/// Apply the region, product and month-window filters in that order.
pub fn apply_filters(full: &SalesTable, config: &AnalysisConfig) -> Result<SalesTable, AppError> {
    let (from, to) = month_window(config)?;

    let mut table = full.between(from, to);
    if let Some(region) = config.filter_region {
        table = table.for_region(region);
    }
    if let Some(product) = config.filter_product {
        table = table.for_product(product);
    }
    log::debug!(
        "filters: region={:?} product={:?} months={}..={} -> {} rows",
        config.filter_region,
        config.filter_product,
        config.month_from,
        config.month_to,
        table.len()
    );
    Ok(table)
}

fn month_window(config: &AnalysisConfig) -> Result<(NaiveDate, NaiveDate), AppError> {
    if !(1..=12).contains(&config.month_from)
        || !(1..=12).contains(&config.month_to)
        || config.month_from > config.month_to
    {
        return Err(AppError::config(format!(
            "Invalid month window {}-{}: need 1 <= from <= to <= 12.",
            config.month_from, config.month_to
        )));
    }

    let date = |m: u32| {
        NaiveDate::from_ymd_opt(config.year, m, 1)
            .ok_or_else(|| AppError::config(format!("Invalid year {}.", config.year)))
    };
    Ok((date(config.month_from)?, date(config.month_to)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Product, Region};

    #[test]
    fn unfiltered_run_keeps_every_row() {
        let run = run_analysis(&AnalysisConfig::default()).unwrap();
        assert_eq!(run.full.len(), 144);
        assert_eq!(run.table.len(), 144);
        assert_eq!(run.report.rows_generated, 144);
    }

    #[test]
    fn filters_combine() {
        let config = AnalysisConfig {
            filter_region: Some(Region::West),
            filter_product: Some(Product::ProductC),
            month_from: 4,
            month_to: 6,
            ..AnalysisConfig::default()
        };
        let run = run_analysis(&config).unwrap();
        assert_eq!(run.table.len(), 3);
        assert!(run.table.rows().iter().all(|r| {
            r.region() == Region::West && r.product() == Product::ProductC && (4..=6).contains(&r.month())
        }));
        assert_eq!(run.report.monthly.len(), 3);
    }

    #[test]
    fn filtering_does_not_change_generated_values() {
        let config = AnalysisConfig::default();
        let full = run_analysis(&config).unwrap().full;
        let east = run_analysis(&AnalysisConfig {
            filter_region: Some(Region::East),
            ..config
        })
        .unwrap();
        let expected: Vec<_> = full.for_region(Region::East).rows().to_vec();
        assert_eq!(east.table.rows(), expected.as_slice());
    }

    #[test]
    fn inverted_month_window_is_a_config_error() {
        let config = AnalysisConfig {
            month_from: 9,
            month_to: 3,
            ..AnalysisConfig::default()
        };
        let err = run_analysis(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
