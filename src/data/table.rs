//! The single in-memory tabular structure.
//!
//! `SalesTable` is built once by the generator and then queried repeatedly.
//! Every query returns either a new table or a plain value; nothing mutates
//! the rows in place.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Agg, Measure, Product, Region, SalesRow};

/// An immutable collection of `SalesRow`s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesTable {
    rows: Vec<SalesRow>,
}

/// Descriptive statistics for one measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl SalesTable {
    pub fn new(rows: Vec<SalesRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[SalesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep rows matching `pred`.
    pub fn filter<F>(&self, pred: F) -> SalesTable
    where
        F: Fn(&SalesRow) -> bool,
    {
        SalesTable::new(self.rows.iter().filter(|r| pred(r)).cloned().collect())
    }

    pub fn for_region(&self, region: Region) -> SalesTable {
        self.filter(|r| r.region() == region)
    }

    pub fn for_product(&self, product: Product) -> SalesTable {
        self.filter(|r| r.product() == product)
    }

    /// Rows dated within `[from, to]`.
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> SalesTable {
        self.filter(|r| r.date() >= from && r.date() <= to)
    }

    /// Rows whose `measure` is strictly above `threshold`.
    pub fn with_min(&self, measure: Measure, threshold: f64) -> SalesTable {
        self.filter(|r| r.value(measure) > threshold)
    }

    pub fn column(&self, measure: Measure) -> Vec<f64> {
        self.rows.iter().map(|r| r.value(measure)).collect()
    }

    pub fn total(&self, measure: Measure) -> f64 {
        aggregate(self.rows.iter(), measure, Agg::Sum)
    }

    pub fn mean(&self, measure: Measure) -> f64 {
        aggregate(self.rows.iter(), measure, Agg::Mean)
    }

    /// Stable sort by `measure`.
    pub fn sorted_by(&self, measure: Measure, descending: bool) -> SalesTable {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| {
            let ord = a
                .value(measure)
                .partial_cmp(&b.value(measure))
                .unwrap_or(std::cmp::Ordering::Equal);
            if descending { ord.reverse() } else { ord }
        });
        SalesTable::new(rows)
    }

    /// The `n` rows with the largest `measure`.
    pub fn top(&self, measure: Measure, n: usize) -> SalesTable {
        self.sorted_by(measure, true).head(n)
    }

    pub fn head(&self, n: usize) -> SalesTable {
        SalesTable::new(self.rows.iter().take(n).cloned().collect())
    }

    /// Distinct dates, ascending.
    pub fn months(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.rows.iter().map(|r| r.date()).collect();
        dates.sort();
        dates.dedup();
        dates
    }

    pub fn describe(&self, measure: Measure) -> Summary {
        summarize(&self.column(measure))
    }
}

/// Aggregate `measure` over `rows`.
///
/// Empty input gives `0` for `Sum`/`Count` and NaN otherwise. `Margin` under
/// `Sum`/`Mean` is total profit over total sales.
pub fn aggregate<'a, I>(rows: I, measure: Measure, agg: Agg) -> f64
where
    I: IntoIterator<Item = &'a SalesRow>,
{
    let rows: Vec<&SalesRow> = rows.into_iter().collect();

    if measure.is_ratio() && matches!(agg, Agg::Sum | Agg::Mean) {
        if rows.is_empty() {
            return f64::NAN;
        }
        let sales: f64 = rows.iter().map(|r| r.sales()).sum();
        let profit: f64 = rows.iter().map(|r| r.profit()).sum();
        return if sales == 0.0 { 0.0 } else { profit / sales };
    }

    match agg {
        Agg::Count => rows.len() as f64,
        Agg::Sum => rows.iter().map(|r| r.value(measure)).sum(),
        Agg::Mean => {
            if rows.is_empty() {
                f64::NAN
            } else {
                rows.iter().map(|r| r.value(measure)).sum::<f64>() / rows.len() as f64
            }
        }
        Agg::Min => rows
            .iter()
            .map(|r| r.value(measure))
            .fold(f64::NAN, f64::min),
        Agg::Max => rows
            .iter()
            .map(|r| r.value(measure))
            .fold(f64::NAN, f64::max),
    }
}

/// Descriptive statistics of a sample. Empty input yields NaN everywhere.
pub fn summarize(values: &[f64]) -> Summary {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    if n == 0 {
        return Summary {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q1: f64::NAN,
            median: f64::NAN,
            q3: f64::NAN,
            max: f64::NAN,
        };
    }

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n < 2 {
        f64::NAN
    } else {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n as f64 - 1.0)).sqrt()
    };

    Summary {
        count: n,
        mean,
        std,
        min: sorted[0],
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        max: sorted[n - 1],
    }
}

/// Linearly interpolated quantile of an ascending slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() as f64 - 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, 1).unwrap()
    }

    fn table() -> SalesTable {
        SalesTable::new(vec![
            SalesRow::new(d(1), Region::North, Product::ProductA, 100.0, 60.0),
            SalesRow::new(d(1), Region::South, Product::ProductB, 300.0, 150.0),
            SalesRow::new(d(2), Region::North, Product::ProductB, 200.0, 180.0),
            SalesRow::new(d(3), Region::East, Product::ProductA, 400.0, 200.0),
        ])
    }

    #[test]
    fn filters_return_new_tables() {
        let t = table();
        assert_eq!(t.for_region(Region::North).len(), 2);
        assert_eq!(t.for_product(Product::ProductA).len(), 2);
        assert_eq!(t.between(d(1), d(2)).len(), 3);
        assert_eq!(t.with_min(Measure::Sales, 200.0).len(), 2);
        assert!(t.for_region(Region::West).is_empty());
        assert_eq!(t.len(), 4);
    }

    #[test]
    fn totals_and_margin_ratio_of_sums() {
        let t = table();
        assert_eq!(t.total(Measure::Sales), 1000.0);
        assert_eq!(t.total(Measure::Cost), 590.0);
        assert_eq!(t.total(Measure::Profit), 410.0);
        assert!((t.total(Measure::Margin) - 0.41).abs() < 1e-12);
        assert!((t.mean(Measure::Sales) - 250.0).abs() < 1e-12);
    }

    #[test]
    fn aggregate_empty_input() {
        let rows: Vec<SalesRow> = Vec::new();
        assert_eq!(aggregate(rows.iter(), Measure::Sales, Agg::Sum), 0.0);
        assert_eq!(aggregate(rows.iter(), Measure::Sales, Agg::Count), 0.0);
        assert!(aggregate(rows.iter(), Measure::Sales, Agg::Mean).is_nan());
        assert!(aggregate(rows.iter(), Measure::Sales, Agg::Max).is_nan());
        assert!(aggregate(rows.iter(), Measure::Margin, Agg::Sum).is_nan());
    }

    #[test]
    fn top_and_sort() {
        let t = table();
        let top = t.top(Measure::Profit, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top.rows()[0].sales(), 400.0);
        assert_eq!(top.rows()[1].sales(), 300.0);

        let asc = t.sorted_by(Measure::Sales, false);
        assert_eq!(asc.rows()[0].sales(), 100.0);
        assert_eq!(t.head(10).len(), 4);
    }

    #[test]
    fn months_are_distinct_and_sorted() {
        assert_eq!(table().months(), vec![d(1), d(2), d(3)]);
    }

    #[test]
    fn describe_uses_sample_std_and_linear_quantiles() {
        let s = table().describe(Measure::Sales);
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 250.0);
        // sqrt(50000 / 3)
        assert!((s.std - 129.09944487358058).abs() < 1e-9);
        assert_eq!(s.min, 100.0);
        assert_eq!(s.q1, 175.0);
        assert_eq!(s.median, 250.0);
        assert_eq!(s.q3, 325.0);
        assert_eq!(s.max, 400.0);
    }

    #[test]
    fn describe_single_value() {
        let s = summarize(&[7.0]);
        assert_eq!(s.count, 1);
        assert_eq!(s.median, 7.0);
        assert!(s.std.is_nan());
    }
}
