//! Plotters-powered path chart widget for Ratatui.
//!
//! Plotters gives us axis + mesh rendering with little manual work; its output
//! is drawn into the Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::render::PathDescriptor;

/// A lightweight, render-only chart description.
///
/// Bounds are computed outside the render call (see `chart_bounds`), so
/// `render()` only draws.
pub struct PathsPlottersChart<'a> {
    pub paths: &'a [PathDescriptor],
    /// X bounds (sale axis).
    pub x_bounds: [f64; 2],
    /// Y bounds (rent axis).
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for PathsPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
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
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.1}"))
                .y_label_formatter(&|v| format!("{v:.1}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for path in self.paths {
                let (r, g, b) = path.color.rgb();
                let color = RGBColor(r, g, b);

                chart.draw_series(LineSeries::new(path.vertices.iter().map(|v| (v.x, v.y)), &color))?;

                // Last step in white so the direction of travel stands out.
                if let Some(seg) = &path.direction {
                    chart.draw_series(LineSeries::new([(seg.from.x, seg.from.y), (seg.to.x, seg.to.y)], &WHITE))?;
                }

                // `Circle` radii come out far too large through this backend; pixels stay crisp.
                chart.draw_series(std::iter::once(Pixel::new((path.start.at.x, path.start.at.y), WHITE)))?;
                chart.draw_series(std::iter::once(Pixel::new((path.current.at.x, path.current.at.y), color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
