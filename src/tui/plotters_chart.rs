//! Plotters-powered price chart widget for Ratatui.
//!
//! One line per tier, x is the row position in the table (so daily, monthly
//! and yearly tables all spread evenly across the width). Rendering goes
//! through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::Tier;

/// Line color for a tier: gold, orange, brown.
pub fn tier_color(tier: Tier) -> RGBColor {
    match tier {
        Tier::K24 => RGBColor(255, 215, 0),
        Tier::K22 => RGBColor(255, 165, 0),
        Tier::K18 => RGBColor(165, 42, 42),
    }
}

/// A render-only chart description. Series and bounds are computed by the caller.
pub struct PriceChart<'a> {
    /// `(row index, price)` points per tier.
    pub series: &'a [(Tier, Vec<(f64, f64)>)],
    /// Bucket label for each row index.
    pub labels: &'a [String],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
}

impl PriceChart<'_> {
    fn label_at(&self, x: f64) -> String {
        let idx = x.round();
        if idx < 0.0 || (x - idx).abs() > 1e-6 {
            return String::new();
        }
        self.labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

impl Widget for PriceChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        // Plotters may fail to build a chart in a tiny area.
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

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| self.label_at(*v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for (tier, points) in self.series {
                let color = tier_color(*tier);
                chart.draw_series(LineSeries::new(points.iter().copied(), &color))?;
                // A single row has no segment; mark it so it stays visible.
                if points.len() == 1 {
                    chart.draw_series(points.iter().map(|&p| Pixel::new(p, color)))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
