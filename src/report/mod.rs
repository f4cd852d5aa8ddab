//! Reporting: collect the analysis steps into one `Report` and format it.

use serde::Serialize;

use crate::analysis::{
    CorrelationMatrix, Grouped, MonthlyPoint, PivotTable, best_group, correlation_matrix, group_by, monthly_trend, pivot,
};
use crate::data::table::{SalesTable, Summary};
use crate::domain::{Agg, AnalysisConfig, GroupKey, Measure, SalesRow};

pub mod format;

pub use format::*;

/// Window (months) of the trailing mean in the monthly table.
pub const ROLLING_WINDOW: usize = 3;

/// Headline numbers for the filtered table.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub rows: usize,
    pub total_sales: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    pub margin: f64,
    pub best_region: Option<String>,
    pub best_product: Option<String>,
    pub best_month: Option<String>,
}

/// Every analysis step of a `report` run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Rows generated before filtering.
    pub rows_generated: usize,
    pub overview: Overview,
    pub describe: Vec<(Measure, Summary)>,
    pub sales_by_region: Grouped,
    pub sales_by_product: Grouped,
    pub mean_profit_by_region: Grouped,
    pub margin_by_product: Grouped,
    pub pivot: PivotTable,
    pub monthly: Vec<MonthlyPoint>,
    pub correlation: CorrelationMatrix,
    pub top_rows: Vec<SalesRow>,
}

pub fn build_report(generated: usize, table: &SalesTable, config: &AnalysisConfig) -> Report {
    let sales_by_region = group_by(table, GroupKey::Region, Measure::Sales, Agg::Sum);
    let sales_by_product = group_by(table, GroupKey::Product, Measure::Sales, Agg::Sum);
    let by_month = group_by(table, GroupKey::Month, config.measure, Agg::Sum);

    let overview = Overview {
        rows: table.len(),
        total_sales: table.total(Measure::Sales),
        total_cost: table.total(Measure::Cost),
        total_profit: table.total(Measure::Profit),
        margin: table.total(Measure::Margin),
        best_region: best_group(&sales_by_region),
        best_product: best_group(&sales_by_product),
        best_month: best_group(&by_month),
    };

    Report {
        rows_generated: generated,
        overview,
        describe: [Measure::Sales, Measure::Cost, Measure::Profit]
            .iter()
            .map(|&m| (m, table.describe(m)))
            .collect(),
        sales_by_region,
        sales_by_product,
        mean_profit_by_region: group_by(table, GroupKey::Region, Measure::Profit, Agg::Mean),
        margin_by_product: group_by(table, GroupKey::Product, Measure::Margin, Agg::Mean),
        pivot: pivot(table, Measure::Sales, Agg::Sum),
        monthly: monthly_trend(table, config.measure, ROLLING_WINDOW),
        correlation: correlation_matrix(table, &Measure::ALL),
        top_rows: table.top(config.measure, config.top_n).rows().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_sample;

    #[test]
    fn report_totals_are_consistent() {
        let config = AnalysisConfig::default();
        let table = generate_sample(&config).unwrap();
        let report = build_report(table.len(), &table, &config);

        assert_eq!(report.rows_generated, 144);
        assert_eq!(report.overview.rows, 144);
        let o = &report.overview;
        assert!((o.total_sales - o.total_cost - o.total_profit).abs() < 1e-6);
        assert!((o.margin - o.total_profit / o.total_sales).abs() < 1e-12);

        let region_sum: f64 = report.sales_by_region.values().iter().sum();
        assert!((region_sum - o.total_sales).abs() < 1e-6);
        assert!((report.pivot.grand_total - o.total_sales).abs() < 1e-6);

        assert_eq!(report.monthly.len(), 12);
        let last = report.monthly.last().unwrap();
        assert!((last.cumulative - o.total_sales).abs() < 1e-6);

        assert_eq!(report.top_rows.len(), config.top_n);
        assert_eq!(report.describe.len(), 3);
        assert!(o.best_region.is_some() && o.best_month.is_some());
    }

    #[test]
    fn report_on_empty_table() {
        let config = AnalysisConfig::default();
        let report = build_report(144, &SalesTable::default(), &config);
        assert_eq!(report.overview.rows, 0);
        assert_eq!(report.overview.total_sales, 0.0);
        assert!(report.overview.best_region.is_none());
        assert!(report.monthly.is_empty());
        assert!(report.top_rows.is_empty());
    }
}
