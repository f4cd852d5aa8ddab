//! Formatted terminal output.
//!
//! Every table is fixed-width and trailing whitespace is trimmed per line.

use crate::analysis::{CorrelationMatrix, Grouped, MonthlyPoint, PivotTable};
use crate::data::table::Summary;
use crate::domain::{AnalysisConfig, Measure, SalesRow, month_label};
use crate::report::{Overview, Report};

/// Format the whole report in notebook order.
pub fn format_report(report: &Report, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str(&format_overview(&report.overview, report.rows_generated, config));
    out.push('\n');

    out.push_str("Summary statistics:\n");
    out.push_str(&format_summary_table(&report.describe));
    out.push('\n');

    for grouped in [
        &report.sales_by_region,
        &report.sales_by_product,
        &report.mean_profit_by_region,
        &report.margin_by_product,
    ] {
        out.push_str(&format_grouped(grouped));
        out.push('\n');
    }

    out.push_str(&format_pivot(&report.pivot));
    out.push('\n');

    out.push_str(&format!("Monthly {}:\n", config.measure.label()));
    out.push_str(&format_monthly(&report.monthly, config.measure));
    out.push('\n');

    out.push_str("Correlation:\n");
    out.push_str(&format_correlation(&report.correlation));
    out.push('\n');

    out.push_str(&format!(
        "Top {} rows by {}:\n",
        report.top_rows.len(),
        config.measure.label()
    ));
    out.push_str(&format_rows(&report.top_rows));

    out
}

/// Header: generator settings, active filters and headline totals.
pub fn format_overview(overview: &Overview, generated: usize, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== sales - Synthetic Sales Analysis ===\n");
    out.push_str(&format!(
        "Year: {} | seed: {} | rows: {} of {}\n",
        config.year, config.seed, overview.rows, generated
    ));
    out.push_str(&format!(
        "Generator: sales=[{:.0}, {:.0}) | cost ratio=[{:.2}, {:.2}) | seasonality={:.2}\n",
        config.sales_min, config.sales_max, config.cost_ratio_min, config.cost_ratio_max, config.seasonality
    ));
    out.push_str(&format!(
        "Filters: region={} | product={} | months={}-{}\n",
        config.filter_region.map(|r| r.display_name()).unwrap_or("all"),
        config.filter_product.map(|p| p.display_name()).unwrap_or("all"),
        config.month_from,
        config.month_to,
    ));
    out.push_str(&format!(
        "Totals: sales={} | cost={} | profit={} | margin={}\n",
        fmt_num(overview.total_sales),
        fmt_num(overview.total_cost),
        fmt_num(overview.total_profit),
        fmt_pct(overview.margin),
    ));
    out.push_str(&format!(
        "Best: region={} | product={} | month={}\n",
        overview.best_region.as_deref().unwrap_or("-"),
        overview.best_product.as_deref().unwrap_or("-"),
        overview.best_month.as_deref().unwrap_or("-"),
    ));

    out
}

pub fn format_summary_table(rows: &[(Measure, Summary)]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<8} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "measure", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        ),
    );
    push_line(&mut out, rule(&[8, 6, 10, 10, 10, 10, 10, 10, 10]));
    for (measure, s) in rows {
        push_line(
            &mut out,
            format!(
                "{:<8} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
                measure.label(),
                s.count,
                fmt_num(s.mean),
                fmt_num(s.std),
                fmt_num(s.min),
                fmt_num(s.q1),
                fmt_num(s.median),
                fmt_num(s.q3),
                fmt_num(s.max),
            ),
        );
    }
    out
}

pub fn format_grouped(grouped: &Grouped) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} of {} by {}:\n",
        grouped.agg.label(),
        grouped.measure.label(),
        grouped.key.label()
    ));
    push_line(&mut out, format!("{:<24} {:>12}", grouped.key.label(), grouped.measure.label()));
    push_line(&mut out, rule(&[24, 12]));
    for e in &grouped.entries {
        push_line(
            &mut out,
            format!(
                "{:<24} {:>12}",
                truncate(&e.id.label(), 24),
                fmt_value(e.value, grouped.measure)
            ),
        );
    }
    out
}

pub fn format_pivot(p: &PivotTable) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Pivot ({} of {}): region x product\n",
        p.agg.label(),
        p.measure.label()
    ));

    let mut header = format!("{:<8}", "region");
    for product in &p.products {
        header.push_str(&format!(" {:>12}", product.display_name()));
    }
    header.push_str(&format!(" {:>12}", "All"));
    push_line(&mut out, header);

    let mut widths = vec![8];
    widths.extend(std::iter::repeat_n(12, p.products.len() + 1));
    push_line(&mut out, rule(&widths));

    for (i, region) in p.regions.iter().enumerate() {
        let mut line = format!("{:<8}", region.display_name());
        for v in &p.cells[i] {
            line.push_str(&format!(" {:>12}", fmt_value(*v, p.measure)));
        }
        line.push_str(&format!(" {:>12}", fmt_value(p.row_totals[i], p.measure)));
        push_line(&mut out, line);
    }

    let mut line = format!("{:<8}", "All");
    for v in &p.col_totals {
        line.push_str(&format!(" {:>12}", fmt_value(*v, p.measure)));
    }
    line.push_str(&format!(" {:>12}", fmt_value(p.grand_total, p.measure)));
    push_line(&mut out, line);

    out
}

pub fn format_monthly(points: &[MonthlyPoint], measure: Measure) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<6} {:>12} {:>9} {:>14} {:>12}",
            "month", measure.label(), "change", "cumulative", "rolling(3)"
        ),
    );
    push_line(&mut out, rule(&[6, 12, 9, 14, 12]));
    for p in points {
        push_line(
            &mut out,
            format!(
                "{:<6} {:>12} {:>9} {:>14} {:>12}",
                month_label(p.date),
                fmt_value(p.value, measure),
                p.pct_change.map(|c| format!("{c:+.1}%")).unwrap_or_else(|| "-".to_string()),
                fmt_value(p.cumulative, measure),
                p.rolling_mean
                    .map(|v| fmt_value(v, measure))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        );
    }
    out
}

pub fn format_correlation(m: &CorrelationMatrix) -> String {
    let mut out = String::new();
    let mut header = format!("{:<8}", "");
    for measure in &m.measures {
        header.push_str(&format!(" {:>8}", measure.label()));
    }
    push_line(&mut out, header);

    for (i, measure) in m.measures.iter().enumerate() {
        let mut line = format!("{:<8}", measure.label());
        for v in &m.values[i] {
            if v.is_finite() {
                line.push_str(&format!(" {v:>8.3}"));
            } else {
                line.push_str(&format!(" {:>8}", "-"));
            }
        }
        push_line(&mut out, line);
    }
    out
}

pub fn format_rows(rows: &[SalesRow]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<10} {:<6} {:<10} {:>10} {:>10} {:>10} {:>7}",
            "date", "region", "product", "sales", "cost", "profit", "margin"
        ),
    );
    push_line(&mut out, rule(&[10, 6, 10, 10, 10, 10, 7]));
    for r in rows {
        push_line(
            &mut out,
            format!(
                "{:<10} {:<6} {:<10} {:>10.2} {:>10.2} {:>10.2} {:>7}",
                r.date(),
                r.region().display_name(),
                r.product().display_name(),
                r.sales(),
                r.cost(),
                r.profit(),
                fmt_pct(r.margin()),
            ),
        );
    }
    out
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn rule(widths: &[usize]) -> String {
    widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join(" ")
}

fn fmt_value(v: f64, measure: Measure) -> String {
    if measure.is_ratio() { fmt_pct(v) } else { fmt_num(v) }
}

fn fmt_num(v: f64) -> String {
    if v.is_finite() { format!("{v:.2}") } else { "-".to_string() }
}

fn fmt_pct(v: f64) -> String {
    if v.is_finite() {
        format!("{:.1}%", v * 100.0)
    } else {
        "-".to_string()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::analysis::{group_by, pivot};
    use crate::data::table::SalesTable;
    use crate::domain::{Agg, GroupKey, Product, Region};

    fn table() -> SalesTable {
        let d1 = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        SalesTable::new(vec![
            SalesRow::new(d1, Region::North, Product::ProductA, 1000.0, 600.0),
            SalesRow::new(d1, Region::South, Product::ProductB, 500.0, 400.0),
        ])
    }

    #[test]
    fn grouped_table_snapshot() {
        let g = group_by(&table(), GroupKey::Region, Measure::Sales, Agg::Sum);
        let expected = concat!(
            "sum of sales by region:\n",
            "region                          sales\n",
            "------------------------ ------------\n",
            "North                         1000.00\n",
            "South                          500.00\n",
        );
        assert_eq!(format_grouped(&g), expected);
    }

    #[test]
    fn margin_groups_print_percentages() {
        let g = group_by(&table(), GroupKey::Product, Measure::Margin, Agg::Mean);
        let txt = format_grouped(&g);
        assert!(txt.contains("40.0%"));
        assert!(txt.contains("20.0%"));
    }

    #[test]
    fn pivot_has_margins_and_missing_cells() {
        let p = pivot(&table(), Measure::Sales, Agg::Mean);
        let txt = format_pivot(&p);
        let lines: Vec<&str> = txt.lines().collect();
        // title + header + rule + 4 regions + totals
        assert_eq!(lines.len(), 8);
        assert!(lines[1].ends_with("All"));
        assert!(lines[3].starts_with("North"));
        assert!(lines[7].starts_with("All"));
        assert!(lines[7].ends_with("750.00"));
        assert!(lines[5].contains(" -"));
    }

    #[test]
    fn rows_table_formats_margin() {
        let txt = format_rows(table().rows());
        assert!(txt.contains("2023-01-01 North  Product A"));
        assert!(txt.contains("40.0%"));
    }

    #[test]
    fn truncate_long_labels() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
