//! Ratatui-based terminal dashboard.
//!
//! A settings panel cycles the region/product filters and the displayed
//! measure; the body shows the monthly trend per region (rendered through
//! Plotters) next to the region x product pivot table.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::analysis::monthly_totals;
use crate::app::pipeline::{RunOutput, run_analysis};
use crate::data::SalesTable;
use crate::domain::{AnalysisConfig, Measure, Product, Region};
use crate::error::AppError;
use crate::plot::pad_range;

mod plotters_chart;

use plotters_chart::{SalesPlottersChart, series_color};

const FIELD_COUNT: usize = 3;

/// Start the TUI.
pub fn run(config: AnalysisConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: AnalysisConfig,
    selected_field: usize,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(config: AnalysisConfig) -> Result<Self, AppError> {
        let mut app = Self {
            config,
            selected_field: 0,
            status: String::new(),
            run: None,
        };
        app.regenerate()?;
        app.status = format!("seed: {}", app.config.seed);
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1)?,
            KeyCode::Right => self.adjust_field(1)?,
            KeyCode::Char('r') => {
                self.config.seed = self.config.seed.wrapping_add(1);
                self.regenerate()?;
                self.status = format!("reseeded: {}", self.config.seed);
            }
            KeyCode::Char('m') => {
                self.config.measure = self.config.measure.next();
                self.regenerate()?;
                self.status = format!("measure: {}", self.config.measure.label());
            }
            _ => {}
        }
        Ok(false)
    }

    fn adjust_field(&mut self, delta: i32) -> Result<(), AppError> {
        match self.selected_field {
            0 => {
                self.config.filter_region = cycle(&Region::ALL, self.config.filter_region, delta);
                self.status = format!("region: {}", option_name(self.config.filter_region.map(Region::display_name)));
            }
            1 => {
                self.config.filter_product = cycle(&Product::ALL, self.config.filter_product, delta);
                self.status = format!(
                    "product: {}",
                    option_name(self.config.filter_product.map(Product::display_name))
                );
            }
            _ => {
                self.config.measure = step_measure(self.config.measure, delta);
                self.status = format!("measure: {}", self.config.measure.label());
            }
        }
        self.regenerate()
    }

    fn regenerate(&mut self) -> Result<(), AppError> {
        self.run = Some(run_analysis(&self.config)?);
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("sales", Style::default().fg(Color::Cyan)),
            Span::raw(" - synthetic sales dashboard"),
        ]));

        if let Some(run) = &self.run {
            let o = &run.report.overview;
            lines.push(Line::from(Span::styled(
                format!(
                    "year: {} | seed: {} | rows: {}/{} | sales={:.2} | profit={:.2} | margin={:.1}%",
                    self.config.year,
                    self.config.seed,
                    o.rows,
                    run.full.len(),
                    o.total_sales,
                    o.total_profit,
                    o.margin * 100.0,
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(5)])
            .split(area);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[0]);

        self.draw_chart(frame, cols[0]);
        self.draw_pivot(frame, cols[1]);
        self.draw_settings(frame, rows[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = format!("Monthly {} by region", self.config.measure.label());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            return;
        };

        let trend = chart_series(&run.table, self.config.measure);
        if trend.lines.is_empty() {
            let msg = Paragraph::new("No rows match the current filters.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let (chart_rect, insets) = chart_layout(inner);
        let lines: Vec<Vec<(f64, f64)>> = trend.lines.iter().map(|(_, l)| l.clone()).collect();
        let widget = SalesPlottersChart {
            series: &lines,
            x_bounds: trend.x_bounds,
            y_bounds: trend.y_bounds,
        };
        frame.render_widget(widget, chart_rect);

        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &trend, self.config.measure);
        }
    }

    fn draw_pivot(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Pivot: sales").borders(Borders::ALL);
        let text = match &self.run {
            Some(run) => crate::report::format_pivot(&run.report.pivot),
            None => String::new(),
        };
        // The title line is already in the block border.
        let body: Vec<Line> = text.lines().skip(1).map(|l| Line::from(l.to_string())).collect();
        frame.render_widget(Paragraph::new(Text::from(body)).block(block), area);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!(
                "Region: {}",
                option_name(self.config.filter_region.map(Region::display_name))
            )),
            ListItem::new(format!(
                "Product: {}",
                option_name(self.config.filter_product.map(Product::display_name))
            )),
            ListItem::new(format!("Measure: {}", self.config.measure.label())),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  m measure  r reseed  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Step through `None, Some(all[0]), .., Some(all[n-1])` with wrap-around.
fn cycle<T: Copy + PartialEq>(all: &[T], current: Option<T>, delta: i32) -> Option<T> {
    let len = all.len() as i32 + 1;
    let pos = match current {
        None => 0,
        Some(v) => all.iter().position(|&x| x == v).map_or(0, |i| i as i32 + 1),
    };
    let next = (pos + delta).rem_euclid(len);
    if next == 0 { None } else { Some(all[(next - 1) as usize]) }
}

fn step_measure(current: Measure, delta: i32) -> Measure {
    let len = Measure::ALL.len() as i32;
    let pos = Measure::ALL.iter().position(|&m| m == current).unwrap_or(0) as i32;
    Measure::ALL[(pos + delta).rem_euclid(len) as usize]
}

fn option_name(name: Option<&'static str>) -> &'static str {
    name.unwrap_or("all")
}

/// Monthly lines per region, with bounds for the chart.
struct TrendSeries {
    lines: Vec<(Region, Vec<(f64, f64)>)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(table: &SalesTable, measure: Measure) -> TrendSeries {
    use chrono::Datelike;

    let mut lines = Vec::new();
    for region in Region::ALL {
        let subset = table.for_region(region);
        if subset.is_empty() {
            continue;
        }
        let line: Vec<(f64, f64)> = monthly_totals(&subset, measure)
            .into_iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(d, v)| (d.month() as f64, v))
            .collect();
        lines.push((region, line));
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for (_, line) in &lines {
        for &(_, y) in line {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    TrendSeries {
        lines,
        x_bounds: [0.5, 12.5],
        y_bounds: [y_min, y_max],
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 10,
        right: 2,
        top: 1,
        bottom: 3,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    trend: &TrendSeries,
    measure: Measure,
) {
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = trend.x_bounds;
    let [y0, y1] = trend.y_bounds;

    // Month ticks every quarter.
    for month in [1u32, 4, 7, 10, 12] {
        let u = (month as f64 - x0) / (x1 - x0);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = month_abbrev(month);
        let start = x.saturating_sub(1);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: 3,
                height: 1,
            },
        );
    }

    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y0 + u * (y1 - y0);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = if measure.is_ratio() {
            format!("{:.1}%", y_val * 100.0)
        } else {
            format!("{y_val:.0}")
        };
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    // Legend: coloured region names on a single centred line under the x ticks.
    let mut spans = Vec::new();
    for (i, (region, _)) in trend.lines.iter().enumerate() {
        let c = series_color(i);
        spans.push(Span::styled(
            format!("■ {} ", region.display_name()),
            Style::default().fg(Color::Rgb(c.0, c.1, c.2)),
        ));
    }
    let legend_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if legend_rect.y < inner.y + inner.height {
        frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), legend_rect);
    }

    let y_label = Paragraph::new(measure.label()).style(style.add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

fn month_abbrev(month: u32) -> &'static str {
    const NAMES: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];
    NAMES[(month.clamp(1, 12) - 1) as usize]
}
