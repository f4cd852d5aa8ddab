//! Plotters-powered SVG charts.
//!
//! Every chart draws onto an SVG drawing area so the same code can write a
//! file (`render_charts`) or render into a string for tests.
//!
//! Categorical axes use an `f64` range of `-0.5..n-0.5` with one key point
//! per category; the label formatter maps integer positions back to names.

use std::error::Error;
use std::fs::{create_dir_all, write};
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::analysis::{correlation_matrix, group_by, monthly_totals, pct_change, pivot};
use crate::data::table::SalesTable;
use crate::domain::{Agg, ChartKind, GroupKey, Measure, Product, Region, month_label};
use crate::error::AppError;
use crate::plot::pad_range;

type DrawResult = Result<(), Box<dyn Error>>;

/// Default output size (pixels).
pub const CHART_SIZE: (u32, u32) = (960, 600);

/// Series colours (category order: region or product index).
const PALETTE: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

const MISSING: RGBColor = RGBColor(220, 220, 220);

fn color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

/// Render every chart in `kinds` to `<out_dir>/<kind>.svg`.
///
/// All charts are drawn in memory first; nothing is written unless every
/// chart rendered.
pub fn render_charts(
    table: &SalesTable,
    kinds: &[ChartKind],
    out_dir: &Path,
    size: (u32, u32),
) -> Result<Vec<PathBuf>, AppError> {
    if table.is_empty() {
        return Err(AppError::runtime("No rows to chart (check the filters)."));
    }

    let mut rendered = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        rendered.push((kind, render_chart_string(kind, table, size)?));
    }

    create_dir_all(out_dir).map_err(|e| {
        AppError::runtime(format!(
            "Failed to create chart directory '{}': {e}",
            out_dir.display()
        ))
    })?;

    let mut written = Vec::with_capacity(rendered.len());
    for (kind, svg) in rendered {
        let path = out_dir.join(format!("{}.svg", kind.file_stem()));
        write(&path, svg)
            .map_err(|e| AppError::runtime(format!("Failed to write chart '{}': {e}", path.display())))?;
        log::info!("wrote {} chart to {}", kind.file_stem(), path.display());
        written.push(path);
    }
    Ok(written)
}

/// Draw one chart into an SVG document.
pub fn render_chart_string(kind: ChartKind, table: &SalesTable, size: (u32, u32)) -> Result<String, AppError> {
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, size).into_drawing_area();
        render_chart(kind, table, &root)?;
    }
    Ok(buf)
}

/// Draw a single chart onto `root`.
pub fn render_chart(
    kind: ChartKind,
    table: &SalesTable,
    root: &DrawingArea<SVGBackend<'_>, Shift>,
) -> Result<(), AppError> {
    if table.is_empty() {
        return Err(AppError::runtime(format!(
            "No rows to chart for {} (check the filters).",
            kind.file_stem()
        )));
    }

    let result = match kind {
        ChartKind::RegionSales => draw_region_sales(root, table, kind.title()),
        ChartKind::RegionProductSales => draw_region_product_sales(root, table, kind.title()),
        ChartKind::MonthlyGrowth => draw_monthly_growth(root, table, kind.title()),
        ChartKind::MonthlyTrend => draw_monthly_trend(root, table, kind.title()),
        ChartKind::RegionTrend => draw_region_trend(root, table, kind.title()),
        ChartKind::ProductShare => draw_product_share(root, table, kind.title()),
        ChartKind::PivotHeatmap => draw_pivot_heatmap(root, table, kind.title()),
        ChartKind::CorrelationHeatmap => draw_correlation_heatmap(root, table, kind.title()),
        ChartKind::RegionBox => draw_region_box(root, table, kind.title()),
        ChartKind::SalesVsProfit => draw_sales_vs_profit(root, table, kind.title()),
    };

    result.map_err(|e| AppError::runtime(format!("Failed to render {}: {e}", kind.file_stem())))
}

fn draw_region_sales(root: &DrawingArea<SVGBackend<'_>, Shift>, table: &SalesTable, title: &str) -> DrawResult {
    let grouped = group_by(table, GroupKey::Region, Measure::Sales, Agg::Sum);
    draw_bars(root, title, &grouped.labels(), &grouped.values(), "total sales")
}

fn draw_monthly_growth(root: &DrawingArea<SVGBackend<'_>, Shift>, table: &SalesTable, title: &str) -> DrawResult {
    let totals = monthly_totals(table, Measure::Sales);
    let values: Vec<f64> = totals.iter().map(|(_, v)| *v).collect();
    let changes = pct_change(&values);

    // The first month has no predecessor and is left out.
    let mut labels = Vec::new();
    let mut growth = Vec::new();
    for ((date, _), change) in totals.iter().zip(changes) {
        if let Some(c) = change {
            labels.push(month_label(*date));
            growth.push(c);
        }
    }
    if growth.is_empty() {
        log::warn!("fewer than two months with sales; growth chart left empty");
        return draw_notice(root, title, "Growth needs at least two months of sales.");
    }
    draw_bars(root, title, &labels, &growth, "growth (%)")
}

/// Title plus a centred message, for charts without enough data.
fn draw_notice(root: &DrawingArea<SVGBackend<'_>, Shift>, title: &str, message: &str) -> DrawResult {
    root.fill(&WHITE)?;
    let area = root.titled(title, ("sans-serif", 22))?;
    let (w, h) = area.dim_in_pixel();
    area.draw(&Text::new(
        message.to_string(),
        (w as i32 / 2, h as i32 / 2),
        ("sans-serif", 18)
            .into_font()
            .color(&BLACK.mix(0.6))
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))?;
    root.present()?;
    Ok(())
}

fn draw_bars(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    labels: &[String],
    values: &[f64],
    y_desc: &str,
) -> DrawResult {
    root.fill(&WHITE)?;

    let (y0, y1) = bar_range(values);
    let n = labels.len();
    let fmt = category_formatter(labels);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y0..y1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&fmt)
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, &v)| {
        let x = i as f64;
        let fill = if v < 0.0 { color(3) } else { color(0) };
        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, v)], fill.filled())
    }))?;

    root.present()?;
    Ok(())
}

fn draw_region_product_sales(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    table: &SalesTable,
    title: &str,
) -> DrawResult {
    root.fill(&WHITE)?;

    let p = pivot(table, Measure::Sales, Agg::Sum);
    let labels: Vec<String> = p.regions.iter().map(|r| r.display_name().to_string()).collect();
    let all: Vec<f64> = p.cells.iter().flatten().copied().collect();
    let (y0, y1) = bar_range(&all);
    let fmt = category_formatter(&labels);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(labels.len() as f64 - 0.5), y0..y1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&fmt)
        .y_desc("sales")
        .draw()?;

    let group_width = 0.8;
    let bar_width = group_width / p.products.len() as f64;
    for (j, product) in p.products.iter().enumerate() {
        let c = color(j);
        let offset = -group_width / 2.0 + j as f64 * bar_width;
        chart
            .draw_series(p.regions.iter().enumerate().map(|(i, _)| {
                let x0 = i as f64 + offset;
                Rectangle::new([(x0, 0.0), (x0 + bar_width * 0.9, p.cells[i][j])], c.filled())
            }))?
            .label(product.display_name())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], c.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.25))
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_monthly_trend(root: &DrawingArea<SVGBackend<'_>, Shift>, table: &SalesTable, title: &str) -> DrawResult {
    let series: Vec<(&str, Vec<(chrono::NaiveDate, f64)>)> = [Measure::Sales, Measure::Cost, Measure::Profit]
        .iter()
        .map(|&m| (m.label(), monthly_totals(table, m)))
        .collect();
    draw_month_lines(root, title, "amount", &series)
}

fn draw_region_trend(root: &DrawingArea<SVGBackend<'_>, Shift>, table: &SalesTable, title: &str) -> DrawResult {
    let series: Vec<(&str, Vec<(chrono::NaiveDate, f64)>)> = Region::ALL
        .iter()
        .map(|&r| (r.display_name(), monthly_totals(&table.for_region(r), Measure::Sales)))
        .filter(|(_, points)| !points.is_empty())
        .collect();
    draw_month_lines(root, title, "sales", &series)
}

/// Line chart over months; every series shares the month axis of the table.
fn draw_month_lines(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    y_desc: &str,
    series: &[(&str, Vec<(chrono::NaiveDate, f64)>)],
) -> DrawResult {
    root.fill(&WHITE)?;

    let mut months: Vec<chrono::NaiveDate> = series
        .iter()
        .flat_map(|(_, points)| points.iter().map(|(d, _)| *d))
        .collect();
    months.sort();
    months.dedup();
    if months.is_empty() {
        return Err("no monthly data to plot".into());
    }
    let labels: Vec<String> = months.iter().map(|d| month_label(*d)).collect();
    let fmt = category_formatter(&labels);

    let (lo, hi) = value_range(series.iter().flat_map(|(_, p)| p.iter().map(|(_, v)| *v)));
    let (y0, y1) = pad_range(lo.min(0.0), hi, 0.08);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(labels.len() as f64 - 0.5), y0..y1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&fmt)
        .x_desc("month")
        .y_desc(y_desc)
        .draw()?;

    for (i, (name, points)) in series.iter().enumerate() {
        let c = color(i);
        let xy: Vec<(f64, f64)> = points
            .iter()
            .filter_map(|(d, v)| months.iter().position(|m| m == d).map(|x| (x as f64, *v)))
            .collect();
        chart
            .draw_series(LineSeries::new(xy.iter().copied(), c.stroke_width(2)))?
            .label(*name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], c.stroke_width(2)));
        chart.draw_series(xy.iter().map(|&(x, y)| Circle::new((x, y), 3, c.filled())))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.25))
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_product_share(root: &DrawingArea<SVGBackend<'_>, Shift>, table: &SalesTable, title: &str) -> DrawResult {
    root.fill(&WHITE)?;

    let grouped = group_by(table, GroupKey::Product, Measure::Sales, Agg::Sum);
    let sizes = grouped.values();
    let total: f64 = sizes.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err("product share needs positive total sales".into());
    }
    let labels = grouped.labels();
    let colors: Vec<RGBColor> = (0..sizes.len()).map(color).collect();

    let area = root.titled(title, ("sans-serif", 22))?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = w.min(h) as f64 * 0.35;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
    area.draw(&pie)?;

    root.present()?;
    Ok(())
}

fn draw_pivot_heatmap(root: &DrawingArea<SVGBackend<'_>, Shift>, table: &SalesTable, title: &str) -> DrawResult {
    let p = pivot(table, Measure::Sales, Agg::Sum);
    let (lo, hi) = p.cell_range().unwrap_or((0.0, 1.0));
    let span = (hi - lo).max(1e-12);

    let cols: Vec<String> = p.products.iter().map(|x| x.display_name().to_string()).collect();
    let rows: Vec<String> = p.regions.iter().map(|x| x.display_name().to_string()).collect();

    draw_heatmap(root, title, &rows, &cols, &p.cells, |v| {
        if v.is_finite() {
            let t = (v - lo) / span;
            (sequential(t), format!("{v:.0}"), t > 0.6)
        } else {
            (MISSING, "-".to_string(), false)
        }
    })
}

fn draw_correlation_heatmap(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    table: &SalesTable,
    title: &str,
) -> DrawResult {
    let m = correlation_matrix(table, &Measure::ALL);
    let labels: Vec<String> = m.measures.iter().map(|x| x.label().to_string()).collect();

    draw_heatmap(root, title, &labels, &labels, &m.values, |v| {
        if v.is_finite() {
            (diverging(v), format!("{v:.2}"), v.abs() > 0.6)
        } else {
            (MISSING, "n/a".to_string(), false)
        }
    })
}

/// Grid of coloured cells; row 0 is drawn at the top.
fn draw_heatmap<F>(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    row_labels: &[String],
    col_labels: &[String],
    cells: &[Vec<f64>],
    cell_style: F,
) -> DrawResult
where
    F: Fn(f64) -> (RGBColor, String, bool),
{
    root.fill(&WHITE)?;

    let n_rows = row_labels.len();
    let n_cols = col_labels.len();

    // Reverse the row axis so the first label sits on top.
    let flipped: Vec<String> = row_labels.iter().rev().cloned().collect();
    let x_fmt = category_formatter(col_labels);
    let y_fmt = category_formatter(&flipped);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(
            -0.5f64..(n_cols as f64 - 0.5),
            -0.5f64..(n_rows as f64 - 0.5),
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n_cols)
        .y_labels(n_rows)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .draw()?;

    for (i, row) in cells.iter().enumerate() {
        let y = (n_rows - 1 - i) as f64;
        for (j, &v) in row.iter().enumerate() {
            let x = j as f64;
            let (fill, text, dark) = cell_style(v);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                fill.filled(),
            )))?;
            let text_color = if dark { WHITE } else { BLACK };
            chart.draw_series(std::iter::once(Text::new(
                text,
                (x, y),
                ("sans-serif", 14)
                    .into_font()
                    .color(&text_color)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

fn draw_region_box(root: &DrawingArea<SVGBackend<'_>, Shift>, table: &SalesTable, title: &str) -> DrawResult {
    root.fill(&WHITE)?;

    let groups: Vec<(String, Vec<f64>)> = Region::ALL
        .iter()
        .map(|&r| (r.display_name().to_string(), table.for_region(r).column(Measure::Sales)))
        .filter(|(_, values)| !values.is_empty())
        .collect();
    let labels: Vec<String> = groups.iter().map(|(l, _)| l.clone()).collect();

    let (lo, hi) = value_range(groups.iter().flat_map(|(_, v)| v.iter().copied()));
    let (y0, y1) = pad_range(lo, hi, 0.08);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(labels[..].into_segmented(), (y0 as f32)..(y1 as f32))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(s) | SegmentValue::Exact(s) => s.to_string(),
            SegmentValue::Last => String::new(),
        })
        .y_desc("sales")
        .draw()?;

    chart.draw_series(groups.iter().enumerate().map(|(i, (_, values))| {
        let quartiles = Quartiles::new(values);
        Boxplot::new_vertical(SegmentValue::CenterOf(&labels[i]), &quartiles)
            .width(40)
            .whisker_width(0.5)
            .style(color(i))
    }))?;

    root.present()?;
    Ok(())
}

fn draw_sales_vs_profit(root: &DrawingArea<SVGBackend<'_>, Shift>, table: &SalesTable, title: &str) -> DrawResult {
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = value_range(table.column(Measure::Sales));
    let (y_lo, y_hi) = value_range(table.column(Measure::Profit));
    let (x0, x1) = pad_range(x_lo, x_hi, 0.05);
    let (y0, y1) = pad_range(y_lo, y_hi, 0.05);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("sales")
        .y_desc("profit")
        .draw()?;

    for product in Product::ALL {
        let c = color(product.index());
        let points: Vec<(f64, f64)> = table
            .for_product(product)
            .rows()
            .iter()
            .map(|r| (r.sales(), r.profit()))
            .collect();
        if points.is_empty() {
            continue;
        }
        chart
            .draw_series(points.iter().map(|&p| Circle::new(p, 4, c.mix(0.8).filled())))?
            .label(product.display_name())
            .legend(move |(x, y)| Circle::new((x + 6, y), 4, c.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.25))
        .draw()?;

    root.present()?;
    Ok(())
}

fn category_formatter(labels: &[String]) -> impl Fn(&f64) -> String + '_ {
    move |v: &f64| {
        let idx = v.round();
        if (v - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < labels.len() {
            labels[idx as usize].clone()
        } else {
            String::new()
        }
    }
}

/// Value axis for bars: always includes zero, padded away from it.
fn bar_range(values: &[f64]) -> (f64, f64) {
    if !values.iter().any(|v| v.is_finite()) {
        return (0.0, 1.0);
    }
    let (lo, hi) = value_range(values.iter().copied());
    let lo = lo.min(0.0);
    let hi = hi.max(0.0);
    if hi - lo < 1e-12 {
        return (0.0, 1.0);
    }
    let pad = (hi - lo) * 0.1;
    (if lo < 0.0 { lo - pad } else { 0.0 }, if hi > 0.0 { hi + pad } else { 0.0 })
}

fn value_range<I>(values: I) -> (f64, f64)
where
    I: IntoIterator<Item = f64>,
{
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    if hi - lo < 1e-12 {
        return (lo - 1.0, hi + 1.0);
    }
    (lo, hi)
}

/// White to blue.
fn sequential(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(mix(247, 8), mix(251, 48), mix(255, 107))
}

/// Blue (-1) through white (0) to red (+1).
fn diverging(v: f64) -> RGBColor {
    let t = v.clamp(-1.0, 1.0);
    let mix = |a: u8, b: u8, u: f64| (a as f64 + (b as f64 - a as f64) * u).round() as u8;
    if t >= 0.0 {
        RGBColor(mix(255, 178, t), mix(255, 24, t), mix(255, 43, t))
    } else {
        let u = -t;
        RGBColor(mix(255, 33, u), mix(255, 102, u), mix(255, 172, u))
    }
}
