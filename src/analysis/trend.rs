//! Monthly series and their derived views.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::group::{GroupId, group_by};
use crate::data::table::SalesTable;
use crate::domain::{Agg, GroupKey, Measure};

/// One month of a series with its derived columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub date: NaiveDate,
    pub value: f64,
    /// Percent change vs the previous month.
    pub pct_change: Option<f64>,
    pub cumulative: f64,
    pub rolling_mean: Option<f64>,
}

/// Totals of `measure` per month, ascending by date.
pub fn monthly_totals(table: &SalesTable, measure: Measure) -> Vec<(NaiveDate, f64)> {
    group_by(table, GroupKey::Month, measure, Agg::Sum)
        .entries
        .into_iter()
        .filter_map(|e| match e.id {
            GroupId::Month(date) => Some((date, e.value)),
            _ => None,
        })
        .collect()
}

/// Fractional-to-percent change between consecutive values.
///
/// The first entry has no predecessor; a zero predecessor is undefined.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for (i, &v) in values.iter().enumerate() {
        if i == 0 {
            out.push(None);
            continue;
        }
        let prev = values[i - 1];
        if prev == 0.0 || !prev.is_finite() || !v.is_finite() {
            out.push(None);
        } else {
            out.push(Some((v - prev) / prev * 100.0));
        }
    }
    out
}

pub fn cumulative(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, &v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Trailing mean over `window` values; `None` until the window is full.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

/// Monthly totals with growth, running total and a trailing mean.
///
/// For a ratio measure the running and trailing columns are ratios of the
/// summed profit and sales over the covered months.
pub fn monthly_trend(table: &SalesTable, measure: Measure, window: usize) -> Vec<MonthlyPoint> {
    let totals = monthly_totals(table, measure);
    let values: Vec<f64> = totals.iter().map(|(_, v)| *v).collect();
    let changes = pct_change(&values);

    let (running, rolling) = if measure.is_ratio() {
        let profit: Vec<f64> = monthly_totals(table, Measure::Profit).into_iter().map(|(_, v)| v).collect();
        let sales: Vec<f64> = monthly_totals(table, Measure::Sales).into_iter().map(|(_, v)| v).collect();
        (
            ratio_series(&cumulative(&profit), &cumulative(&sales)),
            rolling_ratio(&profit, &sales, window),
        )
    } else {
        (cumulative(&values), rolling_mean(&values, window))
    };

    totals
        .into_iter()
        .enumerate()
        .map(|(i, (date, value))| MonthlyPoint {
            date,
            value,
            pct_change: changes[i],
            cumulative: running[i],
            rolling_mean: rolling[i],
        })
        .collect()
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

fn ratio_series(num: &[f64], den: &[f64]) -> Vec<f64> {
    num.iter().zip(den).map(|(&n, &d)| ratio(n, d)).collect()
}

/// Trailing `sum(num) / sum(den)`; `None` until the window is full.
fn rolling_ratio(num: &[f64], den: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; num.len()];
    }
    (0..num.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let lo = i + 1 - window;
                Some(ratio(num[lo..=i].iter().sum(), den[lo..=i].iter().sum()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Product, Region, SalesRow};

    #[test]
    fn pct_change_basic() {
        let out = pct_change(&[100.0, 110.0, 99.0, 0.0, 50.0]);
        assert_eq!(out[0], None);
        assert!((out[1].unwrap() - 10.0).abs() < 1e-9);
        assert!((out[2].unwrap() + 10.0).abs() < 1e-9);
        assert!((out[3].unwrap() + 100.0).abs() < 1e-9);
        assert_eq!(out[4], None);
        assert!(pct_change(&[]).is_empty());
    }

    #[test]
    fn cumulative_and_rolling() {
        assert_eq!(cumulative(&[1.0, 2.0, 3.0]), vec![1.0, 3.0, 6.0]);
        assert_eq!(
            rolling_mean(&[3.0, 6.0, 9.0, 12.0], 3),
            vec![None, None, Some(6.0), Some(9.0)]
        );
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
        assert_eq!(rolling_mean(&[1.0, 2.0], 5), vec![None, None]);
    }

    #[test]
    fn monthly_trend_sums_each_month() {
        let d1 = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        let table = SalesTable::new(vec![
            SalesRow::new(d2, Region::North, Product::ProductA, 150.0, 50.0),
            SalesRow::new(d1, Region::North, Product::ProductA, 60.0, 10.0),
            SalesRow::new(d1, Region::South, Product::ProductB, 40.0, 10.0),
            SalesRow::new(d2, Region::South, Product::ProductB, 50.0, 20.0),
        ]);

        let trend = monthly_trend(&table, Measure::Sales, 2);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, d1);
        assert_eq!(trend[0].value, 100.0);
        assert_eq!(trend[1].value, 200.0);
        assert_eq!(trend[1].pct_change, Some(100.0));
        assert_eq!(trend[1].cumulative, 300.0);
        assert_eq!(trend[0].rolling_mean, None);
        assert_eq!(trend[1].rolling_mean, Some(150.0));
    }

    #[test]
    fn margin_running_columns_are_ratios_of_sums() {
        let d1 = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        let table = SalesTable::new(vec![
            SalesRow::new(d1, Region::North, Product::ProductA, 100.0, 50.0),
            SalesRow::new(d2, Region::North, Product::ProductA, 300.0, 240.0),
        ]);

        let trend = monthly_trend(&table, Measure::Margin, 2);
        assert!((trend[0].value - 0.5).abs() < 1e-12);
        assert!((trend[1].value - 0.2).abs() < 1e-12);
        // (50 + 60) / (100 + 300)
        assert!((trend[1].cumulative - 0.275).abs() < 1e-12);
        assert!((trend[1].rolling_mean.unwrap() - 0.275).abs() < 1e-12);
        assert_eq!(trend[0].rolling_mean, None);
    }

    #[test]
    fn generated_margin_cumulative_ends_at_overall_margin() {
        let table = crate::data::generate_sample(&crate::domain::AnalysisConfig::default()).unwrap();
        let trend = monthly_trend(&table, Measure::Margin, 3);
        let last = trend.last().unwrap();
        assert!((last.cumulative - table.total(Measure::Margin)).abs() < 1e-12);
        assert!(trend.iter().all(|p| p.cumulative > 0.0 && p.cumulative < 1.0));
    }
}
