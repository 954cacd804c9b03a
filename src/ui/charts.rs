use std::f64::consts::TAU;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, PlotPoints, Polygon, Text};

use crate::charts::{BarChartSpec, Palette, PieChartSpec};
use crate::color::ColorMap;
use crate::data::model::CategoryValue;

/// Share of a slice below which its label is not drawn inside the pie.
const MIN_LABELLED_PERCENT: f64 = 3.0;

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

/// Render a bar chart spec. Without a colour series every category gets its
/// own legend entry; with one, bars of a category sit side by side.
pub fn bar_chart(ui: &mut Ui, spec: &BarChartSpec, id: &str) {
    if let Some(title) = &spec.title {
        ui.strong(title);
    }

    if let Some(title) = &spec.legend_title {
        ui.small(format!("Legend: {title}"));
    }

    let slot = |category: &CategoryValue| {
        spec.categories
            .iter()
            .position(|c| c == category)
            .unwrap_or_default() as f64
    };

    Plot::new(id)
        .legend(Legend::default())
        .height(320.0)
        .x_axis_label(spec.x_title.clone())
        .y_axis_label(spec.y_title.clone())
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            if spec.series.is_empty() {
                let colors = ColorMap::new(spec.palette, &spec.categories);
                for bar in &spec.bars {
                    let name = bar.category.to_string();
                    let chart = BarChart::new(vec![Bar::new(slot(&bar.category), bar.value)
                        .width(0.8)
                        .name(format!("{name} ({} listings)", bar.count))])
                    .name(name)
                    .color(colors.color_for(&bar.category));
                    plot_ui.bar_chart(chart);
                }
                return;
            }

            let colors = ColorMap::new(spec.palette, &spec.series);
            let width = 0.8 / spec.series.len() as f64;
            for (i, series) in spec.series.iter().enumerate() {
                let offset = -0.4 + width * (i as f64 + 0.5);
                let bars: Vec<Bar> = spec
                    .bars
                    .iter()
                    .filter(|b| b.series.as_ref() == Some(series))
                    .map(|b| {
                        Bar::new(slot(&b.category) + offset, b.value)
                            .width(width)
                            .name(format!("{} / {series}", b.category))
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(series.to_string())
                        .color(colors.color_for(series)),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

/// Points of a pie slice from `start` to `end` (fractions of a full turn),
/// starting at 12 o'clock and running clockwise.
fn slice_outline(start: f64, end: f64) -> Vec<[f64; 2]> {
    let steps = (((end - start) * 96.0).ceil() as usize).max(2);
    let mut points = vec![[0.0, 0.0]];
    for k in 0..=steps {
        let angle = TAU * (start + (end - start) * k as f64 / steps as f64);
        points.push([angle.sin(), angle.cos()]);
    }
    points
}

/// Render a pie chart spec with percentage labels inside the slices.
pub fn pie_chart(ui: &mut Ui, spec: &PieChartSpec, id: &str) {
    ui.strong(&spec.title);

    let names: Vec<_> = spec.slices.iter().map(|s| s.name.clone()).collect();
    let colors = ColorMap::new(Palette::Set2, &names);

    Plot::new(id)
        .legend(Legend::default())
        .height(320.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for slice in &spec.slices {
                let end = start + slice.percent / 100.0;
                let points: PlotPoints = slice_outline(start, end).into_iter().collect();
                plot_ui.polygon(
                    Polygon::new(points)
                        .name(slice.name.to_string())
                        .fill_color(colors.color_for(&slice.name))
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                );

                if slice.percent >= MIN_LABELLED_PERCENT {
                    let mid = TAU * (start + end) / 2.0;
                    let label = format!("{}\n{:.1}%", slice.name, slice.percent);
                    plot_ui.text(Text::new(
                        PlotPoint::new(0.6 * mid.sin(), 0.6 * mid.cos()),
                        RichText::new(label).color(Color32::BLACK).small(),
                    ));
                }
                start = end;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_outline_starts_at_center_and_top() {
        let points = slice_outline(0.0, 0.25);
        assert_eq!(points[0], [0.0, 0.0]);
        assert_eq!(points[1], [0.0, 1.0]);
        let last = points[points.len() - 1];
        assert!((last[0] - 1.0).abs() < 1e-9);
        assert!(last[1].abs() < 1e-9);
    }
}
