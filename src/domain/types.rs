//! Shared domain types.
//!
//! These types are small and serializable; they are:
//!
//! - queried in-memory by the aggregation steps
//! - exported to CSV/JSON
//! - used as CLI values (via `clap::ValueEnum`)

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sales region.
///
/// The declaration order is the display order of every grouped table and chart.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum Region {
    North,
    South,
    East,
    West,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::North, Region::South, Region::East, Region::West];

    pub fn display_name(self) -> &'static str {
        match self {
            Region::North => "North",
            Region::South => "South",
            Region::East => "East",
            Region::West => "West",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Region::North => 0,
            Region::South => 1,
            Region::East => 2,
            Region::West => 3,
        }
    }
}

/// Product line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum Product {
    #[serde(rename = "Product A")]
    #[value(name = "a")]
    ProductA,
    #[serde(rename = "Product B")]
    #[value(name = "b")]
    ProductB,
    #[serde(rename = "Product C")]
    #[value(name = "c")]
    ProductC,
}

impl Product {
    pub const ALL: [Product; 3] = [Product::ProductA, Product::ProductB, Product::ProductC];

    pub fn display_name(self) -> &'static str {
        match self {
            Product::ProductA => "Product A",
            Product::ProductB => "Product B",
            Product::ProductC => "Product C",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Product::ProductA => 0,
            Product::ProductB => 1,
            Product::ProductC => 2,
        }
    }
}

/// One (date, region, product, sales, cost, profit) record.
///
/// `profit` is always `sales - cost`: `SalesRow::new` is the only constructor
/// and there are no setters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRow {
    date: NaiveDate,
    region: Region,
    product: Product,
    sales: f64,
    cost: f64,
    profit: f64,
}

impl SalesRow {
    pub fn new(date: NaiveDate, region: Region, product: Product, sales: f64, cost: f64) -> Self {
        Self {
            date,
            region,
            product,
            sales,
            cost,
            profit: sales - cost,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn sales(&self) -> f64 {
        self.sales
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn profit(&self) -> f64 {
        self.profit
    }

    /// Profit as a fraction of sales (0 when there were no sales).
    pub fn margin(&self) -> f64 {
        if self.sales == 0.0 {
            0.0
        } else {
            self.profit / self.sales
        }
    }

    /// Read the numeric column selected by `measure`.
    pub fn value(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Sales => self.sales,
            Measure::Cost => self.cost,
            Measure::Profit => self.profit,
            Measure::Margin => self.margin(),
        }
    }

    /// 1-based month number of the row's date.
    pub fn month(&self) -> u32 {
        self.date.month()
    }
}

/// Which numeric column a query or chart works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Sales,
    Cost,
    Profit,
    /// Profit / sales. Aggregated as a ratio of sums, never a sum of ratios.
    Margin,
}

impl Measure {
    pub const ALL: [Measure; 4] = [Measure::Sales, Measure::Cost, Measure::Profit, Measure::Margin];

    pub fn label(self) -> &'static str {
        match self {
            Measure::Sales => "sales",
            Measure::Cost => "cost",
            Measure::Profit => "profit",
            Measure::Margin => "margin",
        }
    }

    pub fn is_ratio(self) -> bool {
        matches!(self, Measure::Margin)
    }

    pub fn next(self) -> Self {
        match self {
            Measure::Sales => Measure::Cost,
            Measure::Cost => Measure::Profit,
            Measure::Profit => Measure::Margin,
            Measure::Margin => Measure::Sales,
        }
    }
}

/// Categorical key(s) used to partition rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKey {
    Region,
    Product,
    Month,
    RegionProduct,
}

impl GroupKey {
    pub fn label(self) -> &'static str {
        match self {
            GroupKey::Region => "region",
            GroupKey::Product => "product",
            GroupKey::Month => "month",
            GroupKey::RegionProduct => "region/product",
        }
    }
}

/// Aggregation applied to each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agg {
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

impl Agg {
    pub fn label(self) -> &'static str {
        match self {
            Agg::Sum => "sum",
            Agg::Mean => "mean",
            Agg::Count => "count",
            Agg::Min => "min",
            Agg::Max => "max",
        }
    }
}

/// One rendered chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    /// Bar: total sales by region.
    RegionSales,
    /// Grouped bar: sales by region and product.
    RegionProductSales,
    /// Bar: month-over-month sales growth (%).
    MonthlyGrowth,
    /// Line: monthly sales, cost and profit.
    MonthlyTrend,
    /// Line: monthly sales per region.
    RegionTrend,
    /// Pie: product share of total sales.
    ProductShare,
    /// Heatmap: region x product pivot of sales.
    PivotHeatmap,
    /// Heatmap: correlation between sales, cost, profit and margin.
    CorrelationHeatmap,
    /// Box: sales distribution per region.
    RegionBox,
    /// Scatter: sales vs profit, coloured by product.
    SalesVsProfit,
}

impl ChartKind {
    pub const ALL: [ChartKind; 10] = [
        ChartKind::RegionSales,
        ChartKind::RegionProductSales,
        ChartKind::MonthlyGrowth,
        ChartKind::MonthlyTrend,
        ChartKind::RegionTrend,
        ChartKind::ProductShare,
        ChartKind::PivotHeatmap,
        ChartKind::CorrelationHeatmap,
        ChartKind::RegionBox,
        ChartKind::SalesVsProfit,
    ];

    /// File name stem used for the rendered SVG.
    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::RegionSales => "region-sales",
            ChartKind::RegionProductSales => "region-product-sales",
            ChartKind::MonthlyGrowth => "monthly-growth",
            ChartKind::MonthlyTrend => "monthly-trend",
            ChartKind::RegionTrend => "region-trend",
            ChartKind::ProductShare => "product-share",
            ChartKind::PivotHeatmap => "pivot-heatmap",
            ChartKind::CorrelationHeatmap => "correlation-heatmap",
            ChartKind::RegionBox => "region-box",
            ChartKind::SalesVsProfit => "sales-vs-profit",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::RegionSales => "Total Sales by Region",
            ChartKind::RegionProductSales => "Sales by Region and Product",
            ChartKind::MonthlyGrowth => "Month-over-Month Sales Growth (%)",
            ChartKind::MonthlyTrend => "Monthly Sales, Cost and Profit",
            ChartKind::RegionTrend => "Monthly Sales by Region",
            ChartKind::ProductShare => "Product Share of Sales",
            ChartKind::PivotHeatmap => "Sales Pivot: Region x Product",
            ChartKind::CorrelationHeatmap => "Correlation Matrix",
            ChartKind::RegionBox => "Sales Distribution by Region",
            ChartKind::SalesVsProfit => "Sales vs Profit",
        }
    }
}

/// Short month label (`Jan`..`Dec`) for a date.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b").to_string()
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, environment variables and defaults.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Random seed for the generator.
    pub seed: u64,
    /// Calendar year of the 12 monthly points.
    pub year: i32,

    /// Per-row sales are drawn from `[sales_min, sales_max)` before seasonality.
    pub sales_min: f64,
    pub sales_max: f64,
    /// Cost is `sales × ratio` with ratio drawn from `[cost_ratio_min, cost_ratio_max)`.
    pub cost_ratio_min: f64,
    pub cost_ratio_max: f64,
    /// Amplitude of the yearly sine applied to sales (0 disables it).
    pub seasonality: f64,

    pub filter_region: Option<Region>,
    pub filter_product: Option<Product>,
    /// Inclusive 1-based month window.
    pub month_from: u32,
    pub month_to: u32,

    /// Measure used for the trend plot and the top-N table.
    pub measure: Measure,
    pub top_n: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_rows: Option<PathBuf>,
    pub export_summary: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            year: 2023,
            sales_min: 1000.0,
            sales_max: 5000.0,
            cost_ratio_min: 0.5,
            cost_ratio_max: 0.8,
            seasonality: 0.0,
            filter_region: None,
            filter_product: None,
            month_from: 1,
            month_to: 12,
            measure: Measure::Sales,
            top_n: 5,
            plot: true,
            plot_width: 72,
            plot_height: 16,
            export_rows: None,
            export_summary: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profit_is_derived_from_sales_and_cost() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        let row = SalesRow::new(date, Region::East, Product::ProductB, 2500.25, 1700.5);
        assert_eq!(row.profit(), 2500.25 - 1700.5);
        assert_eq!(row.value(Measure::Profit), row.sales() - row.cost());
        assert_eq!(row.month(), 3);
    }

    #[test]
    fn margin_handles_zero_sales() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let row = SalesRow::new(date, Region::North, Product::ProductA, 0.0, 0.0);
        assert_eq!(row.margin(), 0.0);

        let row = SalesRow::new(date, Region::North, Product::ProductA, 200.0, 150.0);
        assert!((row.margin() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn enum_orders_match_display_order() {
        let mut regions = vec![Region::West, Region::North, Region::East, Region::South];
        regions.sort();
        assert_eq!(regions, Region::ALL.to_vec());
        for (i, r) in Region::ALL.iter().enumerate() {
            assert_eq!(r.index(), i);
        }
        for (i, p) in Product::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }

    #[test]
    fn chart_file_stems_are_unique() {
        let mut stems: Vec<&str> = ChartKind::ALL.iter().map(|k| k.file_stem()).collect();
        stems.sort();
        stems.dedup();
        assert_eq!(stems.len(), ChartKind::ALL.len());
    }
}
