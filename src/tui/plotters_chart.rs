//! Plotters-powered monthly trend widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// High-contrast line colours, one per series.
const SERIES_COLORS: [RGBColor; 4] = [
    RGBColor(0, 255, 255),
    RGBColor(255, 200, 0),
    RGBColor(0, 255, 0),
    RGBColor(255, 80, 80),
];

pub fn series_color(i: usize) -> RGBColor {
    SERIES_COLORS[i % SERIES_COLORS.len()]
}

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct SalesPlottersChart<'a> {
    /// One line per series; x is the month number (1-12).
    pub series: &'a [Vec<(f64, f64)>],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for SalesPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Tick labels are drawn by the TUI around the chart; only axes here.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .axis_style(WHITE)
                .draw()?;

            for (i, line) in self.series.iter().enumerate() {
                let color = series_color(i);
                chart.draw_series(LineSeries::new(line.iter().copied(), color))?;
                // Circle radii are mapped incorrectly by the ratatui backend, so mark points with pixels.
                chart.draw_series(line.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
