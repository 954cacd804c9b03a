use std::collections::BTreeMap;

use eframe::egui::{Color32, Id, RichText, Ui};
use egui_plot::{Plot, PlotPoint, PlotPoints, Points, Text};

use crate::charts::{Marker, MarkerMapSpec, ScatterMapSpec};
use crate::color::{continuous_color, normalize};

/// Hover labels further than this (in degrees) from every point fall back to
/// plain coordinates.
const HOVER_RADIUS_DEG: f64 = 2.0;

const MARKER_COLOR: Color32 = Color32::from_rgb(0x37, 0x7E, 0xB8);
const CLUSTER_COLOR: Color32 = Color32::from_rgb(0x6E, 0xCC, 0x39);

const COLOR_BINS: usize = 10;
const SIZE_BINS: usize = 4;

/// Label of the point (lon, lat) nearest to `at`, if one is close enough.
pub fn nearest_label<'a>(labelled: &'a [(f64, f64, String)], at: &PlotPoint) -> Option<&'a str> {
    labelled
        .iter()
        .map(|(x, y, label)| ((x - at.x).powi(2) + (y - at.y).powi(2), label))
        .filter(|(dist2, _)| *dist2 <= HOVER_RADIUS_DEG * HOVER_RADIUS_DEG)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, label)| label.as_str())
}

fn hover_label(labelled: Vec<(f64, f64, String)>) -> impl Fn(&str, &PlotPoint) -> String {
    move |_name, value| match nearest_label(&labelled, value) {
        Some(label) => label.to_string(),
        None => format!("lat {:.3}, lon {:.3}", value.y, value.x),
    }
}

// ---------------------------------------------------------------------------
// Listing marker map (Map Viz page)
// ---------------------------------------------------------------------------

/// Cells per axis of the visible area when clustering markers.
const CLUSTER_CELLS: f64 = 20.0;

const WORLD_MIN: [f64; 2] = [-180.0, -90.0];
const WORLD_MAX: [f64; 2] = [180.0, 90.0];

/// Markers sharing a grid cell, drawn at their mean position.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub lon: f64,
    pub lat: f64,
    pub count: usize,
    /// Popup of the listing when the cluster holds exactly one.
    pub popup: Option<String>,
}

impl Cluster {
    fn hover(&self) -> String {
        match &self.popup {
            Some(popup) => popup.clone(),
            None => format!("{} listings", self.count),
        }
    }
}

/// Group markers into a `CLUSTER_CELLS` x `CLUSTER_CELLS` grid laid over the
/// visible area `min..max` (lon, lat). Zooming in shrinks the cells and so
/// splits clusters apart.
pub fn cluster_markers(markers: &[Marker], min: [f64; 2], max: [f64; 2]) -> Vec<Cluster> {
    let cell_w = ((max[0] - min[0]) / CLUSTER_CELLS).max(1e-9);
    let cell_h = ((max[1] - min[1]) / CLUSTER_CELLS).max(1e-9);

    let mut cells: BTreeMap<(i64, i64), Vec<&Marker>> = BTreeMap::new();
    for m in markers {
        let key = (
            ((m.lon - min[0]) / cell_w).floor() as i64,
            ((m.lat - min[1]) / cell_h).floor() as i64,
        );
        cells.entry(key).or_default().push(m);
    }

    cells
        .into_values()
        .map(|members| {
            let n = members.len() as f64;
            Cluster {
                lon: members.iter().map(|m| m.lon).sum::<f64>() / n,
                lat: members.iter().map(|m| m.lat).sum::<f64>() / n,
                count: members.len(),
                popup: match members.as_slice() {
                    [only] => Some(only.popup.clone()),
                    _ => None,
                },
            }
        })
        .collect()
}

/// Render the visible listings as clustered markers. Clusters are sized by
/// their count and labelled with it; hovering a single listing shows its
/// popup.
pub fn marker_map(ui: &mut Ui, spec: &MarkerMapSpec) {
    let id = Id::new("world_map");
    // Cluster against the area shown in the previous frame.
    let (min, max) = ui
        .ctx()
        .data(|d| d.get_temp::<([f64; 2], [f64; 2])>(id))
        .unwrap_or((WORLD_MIN, WORLD_MAX));
    let clusters = cluster_markers(&spec.markers, min, max);

    let labelled: Vec<(f64, f64, String)> = clusters
        .iter()
        .map(|c| (c.lon, c.lat, c.hover()))
        .collect();

    let (center_lat, center_lon) = spec.center.unwrap_or((0.0, 0.0));

    let bounds = Plot::new(id)
        .height(600.0)
        .data_aspect(1.0)
        .include_x(WORLD_MIN[0])
        .include_x(WORLD_MAX[0])
        .include_y(WORLD_MIN[1])
        .include_y(WORLD_MAX[1])
        .include_x(center_lon)
        .include_y(center_lat)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(hover_label(labelled))
        .show(ui, |plot_ui| {
            let singles: PlotPoints = clusters
                .iter()
                .filter(|c| c.count == 1)
                .map(|c| [c.lon, c.lat])
                .collect();
            plot_ui.points(
                Points::new(singles)
                    .radius(3.0)
                    .color(MARKER_COLOR)
                    .name("Listings"),
            );

            for c in clusters.iter().filter(|c| c.count > 1) {
                let radius = 6.0 + 3.0 * (c.count as f32).log10();
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![[c.lon, c.lat]]))
                        .radius(radius)
                        .color(CLUSTER_COLOR),
                );
                plot_ui.text(Text::new(
                    PlotPoint::new(c.lon, c.lat),
                    RichText::new(c.count.to_string()).color(Color32::BLACK).small(),
                ));
            }
            plot_ui.plot_bounds()
        })
        .inner;

    ui.ctx()
        .data_mut(|d| d.insert_temp(id, (bounds.min(), bounds.max())));
}

// ---------------------------------------------------------------------------
// Scatter map (Data Insights page)
// ---------------------------------------------------------------------------

fn bin(t: f64, bins: usize) -> usize {
    ((t * bins as f64) as usize).min(bins - 1)
}

/// Render a scatter map. Points are bucketed by colour and size so each
/// bucket is drawn as one series.
pub fn scatter_map(ui: &mut Ui, spec: &ScatterMapSpec, id: &str) {
    if let Some(title) = &spec.title {
        ui.strong(title);
    }

    let labelled: Vec<(f64, f64, String)> = spec
        .points
        .iter()
        .filter_map(|p| Some((p.lon, p.lat, p.hover.clone()?)))
        .collect();

    let mut buckets: BTreeMap<(usize, usize), Vec<[f64; 2]>> = BTreeMap::new();
    for p in &spec.points {
        let color_bin = match (p.color, spec.color_range) {
            (Some(v), Some(range)) => bin(normalize(v, range), COLOR_BINS),
            _ => 0,
        };
        let size_bin = match (p.size, spec.size_range) {
            (Some(v), Some(range)) => bin(normalize(v, range), SIZE_BINS),
            _ => 0,
        };
        buckets
            .entry((color_bin, size_bin))
            .or_default()
            .push([p.lon, p.lat]);
    }

    Plot::new(id)
        .height(spec.height as f32 * 0.6)
        .data_aspect(1.0)
        .include_x(-180.0)
        .include_x(180.0)
        .include_y(-90.0)
        .include_y(90.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .label_formatter(hover_label(labelled))
        .show(ui, |plot_ui| {
            for ((color_bin, size_bin), coords) in buckets {
                let t = (color_bin as f64 + 0.5) / COLOR_BINS as f64;
                let radius = 1.5 + size_bin as f32 * 1.5;
                let points: PlotPoints = coords.into_iter().collect();
                plot_ui.points(
                    Points::new(points)
                        .radius(radius)
                        .color(continuous_color(spec.palette, t)),
                );
            }
        });

    if let (Some(field), Some((lo, hi))) = (spec.color_field, spec.color_range) {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(format!("{field}: {lo:.0}"));
            for i in 0..COLOR_BINS {
                let t = (i as f64 + 0.5) / COLOR_BINS as f64;
                ui.colored_label(continuous_color(spec.palette, t), "■");
            }
            ui.label(format!("{hi:.0}"));
        });
    }
}
