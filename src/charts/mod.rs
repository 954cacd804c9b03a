//! Declarative chart and map specifications.
//!
//! Builders here only select fields, aggregate bars and pass styling through.
//! The resulting specs are renderer-agnostic and serialisable; `ui::charts`
//! draws them with egui, and they can also be exported as JSON.

pub mod insights;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::aggregate::group_sum;
use crate::data::model::{CategoryField, CategoryValue, ListingRecord, NumericField};

/// Colour scheme a renderer should use for a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Qualitative, strong colours.
    Set1,
    /// Qualitative, pastel colours.
    Set2,
    /// Continuous dark-blue → yellow scale.
    Plasma,
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

/// Configuration of a bar chart. `x` is the category axis and `y` the value
/// axis; each bar shows the mean of `y` over the listings in its category.
#[derive(Debug, Clone)]
pub struct BarChartConfig {
    pub x: CategoryField,
    pub y: NumericField,
    /// Split every category into one bar per value of this field.
    pub color: Option<CategoryField>,
    pub title: Option<String>,
    /// Display labels keyed by field name.
    pub labels: BTreeMap<String, String>,
    /// Category axis order. Categories not listed follow in natural order.
    pub category_order: Option<Vec<CategoryValue>>,
    pub palette: Palette,
    pub xaxis_title: Option<String>,
    pub yaxis_title: Option<String>,
    pub legend_title: Option<String>,
}

impl BarChartConfig {
    pub fn new(x: CategoryField, y: NumericField) -> Self {
        BarChartConfig {
            x,
            y,
            color: None,
            title: None,
            labels: BTreeMap::new(),
            category_order: None,
            palette: Palette::Set1,
            xaxis_title: None,
            yaxis_title: None,
            legend_title: None,
        }
    }

    fn axis_title(&self, explicit: &Option<String>, field: &str) -> String {
        explicit
            .clone()
            .or_else(|| self.labels.get(field).cloned())
            .unwrap_or_else(|| field.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSpec {
    pub category: CategoryValue,
    pub series: Option<CategoryValue>,
    pub value: f64,
    /// Listings averaged into this bar.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartSpec {
    pub title: Option<String>,
    pub x_field: CategoryField,
    pub y_field: NumericField,
    pub color_field: Option<CategoryField>,
    pub x_title: String,
    pub y_title: String,
    pub legend_title: Option<String>,
    pub palette: Palette,
    /// Category axis, in display order.
    pub categories: Vec<CategoryValue>,
    /// Distinct colour series, in natural order.
    pub series: Vec<CategoryValue>,
    /// Bars in category-axis order, then series order.
    pub bars: Vec<BarSpec>,
}

/// Aggregate `listings` into a bar chart per `config`.
///
/// Listings missing the `x` or `y` value are not plotted.
pub fn bar_chart<'a, I>(listings: I, config: &BarChartConfig) -> BarChartSpec
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    let mut cells: BTreeMap<(CategoryValue, Option<CategoryValue>), (f64, usize)> =
        BTreeMap::new();
    for rec in listings {
        let (Some(category), Some(value)) = (config.x.value(rec), config.y.value(rec)) else {
            continue;
        };
        let series = config.color.and_then(|field| field.value(rec));
        let cell = cells.entry((category, series)).or_insert((0.0, 0));
        cell.0 += value;
        cell.1 += 1;
    }

    let mut categories: Vec<CategoryValue> = Vec::new();
    if let Some(order) = &config.category_order {
        for category in order {
            if !categories.contains(category)
                && cells.keys().any(|(observed, _)| observed == category)
            {
                categories.push(category.clone());
            }
        }
    }
    for (category, _) in cells.keys() {
        if !categories.contains(category) {
            categories.push(category.clone());
        }
    }

    let mut series: Vec<CategoryValue> = cells.keys().filter_map(|(_, s)| s.clone()).collect();
    series.sort();
    series.dedup();

    let mut bars: Vec<BarSpec> = cells
        .into_iter()
        .map(|((category, series), (sum, count))| BarSpec {
            category,
            series,
            value: sum / count as f64,
            count,
        })
        .collect();
    let position = |c: &CategoryValue| categories.iter().position(|o| o == c);
    bars.sort_by(|a, b| {
        position(&a.category)
            .cmp(&position(&b.category))
            .then_with(|| a.series.cmp(&b.series))
    });

    BarChartSpec {
        title: config.title.clone(),
        x_field: config.x,
        y_field: config.y,
        color_field: config.color,
        x_title: config.axis_title(&config.xaxis_title, config.x.name()),
        y_title: config.axis_title(&config.yaxis_title, config.y.name()),
        legend_title: config.legend_title.clone(),
        palette: config.palette,
        categories,
        series,
        bars,
    }
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: CategoryValue,
    pub value: f64,
    /// Share of the total, 0–100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChartSpec {
    pub title: String,
    pub values_field: NumericField,
    pub names_field: CategoryField,
    /// Slices, largest first.
    pub slices: Vec<PieSlice>,
}

/// One slice per distinct `names` value, sized by the sum of `values`.
pub fn pie_chart<'a, I>(
    listings: I,
    values: NumericField,
    names: CategoryField,
    title: &str,
) -> PieChartSpec
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    let sums = group_sum(listings, names, values);
    let total: f64 = sums.groups.iter().filter_map(|g| g.value).sum();
    let slices = sums
        .groups
        .into_iter()
        .map(|g| {
            let value = g.value.unwrap_or_default();
            PieSlice {
                percent: if total > 0.0 { value / total * 100.0 } else { 0.0 },
                name: g.category,
                value,
            }
        })
        .collect();

    PieChartSpec {
        title: title.to_string(),
        values_field: values,
        names_field: names,
        slices,
    }
}

// ---------------------------------------------------------------------------
// Scatter map
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ScatterMapConfig {
    pub lat: NumericField,
    pub lon: NumericField,
    /// Continuous colour scale driven by this field.
    pub color: Option<NumericField>,
    /// Marker size driven by this field.
    pub size: Option<NumericField>,
    pub hover_name: Option<CategoryField>,
    /// Basemap style name, e.g. `carto-positron`.
    pub style: String,
    pub title: Option<String>,
    pub palette: Palette,
    pub height: u32,
    pub width: u32,
    pub zoom: f64,
}

impl Default for ScatterMapConfig {
    fn default() -> Self {
        ScatterMapConfig {
            lat: NumericField::Latitude,
            lon: NumericField::Longitude,
            color: None,
            size: None,
            hover_name: None,
            style: "carto-positron".to_string(),
            title: None,
            palette: Palette::Plasma,
            height: 800,
            width: 1000,
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub lat: f64,
    pub lon: f64,
    pub color: Option<f64>,
    pub size: Option<f64>,
    pub hover: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterMapSpec {
    pub title: Option<String>,
    pub style: String,
    pub palette: Palette,
    pub height: u32,
    pub width: u32,
    pub zoom: f64,
    pub color_field: Option<NumericField>,
    pub size_field: Option<NumericField>,
    /// Observed (min, max) of the colour values.
    pub color_range: Option<(f64, f64)>,
    /// Observed (min, max) of the size values.
    pub size_range: Option<(f64, f64)>,
    pub points: Vec<ScatterPoint>,
}

fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// One point per listing that has both coordinates.
pub fn scatter_map<'a, I>(listings: I, config: &ScatterMapConfig) -> ScatterMapSpec
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    let points: Vec<ScatterPoint> = listings
        .into_iter()
        .filter_map(|rec| {
            Some(ScatterPoint {
                lat: config.lat.value(rec)?,
                lon: config.lon.value(rec)?,
                color: config.color.and_then(|f| f.value(rec)),
                size: config.size.and_then(|f| f.value(rec)),
                hover: config
                    .hover_name
                    .and_then(|f| f.value(rec))
                    .map(|v| v.to_string()),
            })
        })
        .collect();

    ScatterMapSpec {
        title: config.title.clone(),
        style: config.style.clone(),
        palette: config.palette,
        height: config.height,
        width: config.width,
        zoom: config.zoom,
        color_field: config.color,
        size_field: config.size,
        color_range: value_range(points.iter().filter_map(|p| p.color)),
        size_range: value_range(points.iter().filter_map(|p| p.size)),
        points,
    }
}

// ---------------------------------------------------------------------------
// World map of listing markers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerMapSpec {
    /// Mean (lat, lon) of the markers; `None` when there are none.
    pub center: Option<(f64, f64)>,
    pub zoom: u8,
    pub markers: Vec<Marker>,
}

/// Popup text of a listing marker. Numbers always carry a fractional part
/// (`100.0`), a missing one reads `nan`.
pub fn marker_popup(rec: &ListingRecord) -> String {
    let show = |v: Option<f64>| v.map_or_else(|| "nan".to_string(), |v| format!("{v:?}"));
    format!(
        "Price: {}$, Rating: {}",
        show(rec.price),
        show(rec.review_scores)
    )
}

/// One marker per listing with coordinates, centred on their mean position.
pub fn world_map<'a, I>(listings: I) -> MarkerMapSpec
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    let markers: Vec<Marker> = listings
        .into_iter()
        .filter_map(|rec| {
            let (lat, lon) = rec.coordinates()?;
            Some(Marker {
                lat,
                lon,
                popup: marker_popup(rec),
            })
        })
        .collect();

    let center = (!markers.is_empty()).then(|| {
        let n = markers.len() as f64;
        let lat = markers.iter().map(|m| m.lat).sum::<f64>() / n;
        let lon = markers.iter().map(|m| m.lon).sum::<f64>() / n;
        (lat, lon)
    });

    MarkerMapSpec {
        center,
        zoom: 1,
        markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(country: &str, market: Option<&str>, price: f64) -> ListingRecord {
        ListingRecord {
            name: format!("{country} listing"),
            price: Some(price),
            review_scores: Some(90.0),
            country: Some(country.to_string()),
            market: market.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn bar_axes_are_independent() {
        let data = vec![
            listing("US", None, 100.0),
            listing("US", None, 50.0),
            listing("FR", None, 200.0),
        ];
        let spec = bar_chart(
            &data,
            &BarChartConfig::new(CategoryField::Country, NumericField::Price),
        );
        assert_eq!(spec.x_field, CategoryField::Country);
        assert_eq!(spec.y_field, NumericField::Price);
        let values: Vec<_> = spec
            .bars
            .iter()
            .map(|b| (b.category.to_string(), b.value, b.count))
            .collect();
        assert_eq!(
            values,
            [("FR".to_string(), 200.0, 1), ("US".to_string(), 75.0, 2)]
        );
        assert_eq!(spec.x_title, "country");
    }

    #[test]
    fn bar_category_order_is_respected() {
        let data = vec![
            listing("Brazil", None, 100.0),
            listing("Spain", None, 300.0),
            listing("Turkey", None, 200.0),
        ];
        let mut config = BarChartConfig::new(CategoryField::Country, NumericField::Price);
        config.category_order = Some(vec![
            CategoryValue::from("Spain"),
            CategoryValue::from("Atlantis"),
            CategoryValue::from("Brazil"),
        ]);
        let spec = bar_chart(&data, &config);
        assert_eq!(
            spec.categories,
            vec![
                CategoryValue::from("Spain"),
                CategoryValue::from("Brazil"),
                CategoryValue::from("Turkey"),
            ]
        );
        let order: Vec<_> = spec.bars.iter().map(|b| b.category.clone()).collect();
        assert_eq!(order, spec.categories);
    }

    #[test]
    fn bar_series_split_categories() {
        let data = vec![
            listing("US", Some("New York"), 100.0),
            listing("US", Some("Kauai"), 300.0),
            listing("US", Some("New York"), 200.0),
        ];
        let mut config = BarChartConfig::new(CategoryField::Country, NumericField::Price);
        config.color = Some(CategoryField::Market);
        config.labels.insert("price".into(), "Average Price".into());
        let spec = bar_chart(&data, &config);

        assert_eq!(
            spec.series,
            vec![CategoryValue::from("Kauai"), CategoryValue::from("New York")]
        );
        assert_eq!(spec.bars.len(), 2);
        assert_eq!(spec.bars[0].value, 300.0);
        assert_eq!(spec.bars[1].value, 150.0);
        assert_eq!(spec.y_title, "Average Price");
    }

    #[test]
    fn pie_slices_sum_to_hundred_percent() {
        let mut data = vec![
            listing("US", None, 1.0),
            listing("US", None, 1.0),
            listing("US", None, 1.0),
        ];
        for (rec, (kind, days)) in data
            .iter_mut()
            .zip([("House", 300), ("Loft", 100), ("House", 0)])
        {
            rec.property_type = Some(kind.to_string());
            rec.availability_365 = Some(days);
        }
        let spec = pie_chart(
            &data,
            NumericField::Availability365,
            CategoryField::PropertyType,
            "Availability",
        );
        assert_eq!(spec.slices.len(), 2);
        assert_eq!(spec.slices[0].name, CategoryValue::from("House"));
        assert_eq!(spec.slices[0].percent, 75.0);
        let total: f64 = spec.slices.iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn markers_show_their_own_listing() {
        let mut data = vec![
            listing("US", None, 100.0),
            listing("FR", None, 250.5),
            listing("BR", None, 75.0),
        ];
        data[0].latitude = Some(10.0);
        data[0].longitude = Some(20.0);
        data[1].latitude = Some(30.0);
        data[1].longitude = Some(40.0);
        data[1].review_scores = Some(70.0);

        let spec = world_map(&data);
        assert_eq!(spec.markers.len(), 2);
        assert_eq!(spec.markers[1].popup, "Price: 250.5$, Rating: 70.0");
        assert_eq!(spec.markers[0].popup, "Price: 100.0$, Rating: 90.0");
        assert_eq!(spec.center, Some((20.0, 30.0)));
        assert_eq!(spec.zoom, 1);
    }

    #[test]
    fn popup_prints_whole_numbers_as_floats() {
        let rec = ListingRecord {
            price: Some(80.0),
            review_scores: None,
            ..Default::default()
        };
        assert_eq!(marker_popup(&rec), "Price: 80.0$, Rating: nan");
    }

    #[test]
    fn empty_world_map_has_no_center() {
        let spec = world_map(std::iter::empty());
        assert_eq!(spec.center, None);
        assert!(spec.markers.is_empty());
    }

    #[test]
    fn scatter_points_need_coordinates() {
        let mut data = vec![listing("US", None, 100.0), listing("FR", None, 200.0)];
        data[0].latitude = Some(1.0);
        data[0].longitude = Some(2.0);
        data[0].availability_365 = Some(120);
        let config = ScatterMapConfig {
            color: Some(NumericField::Availability365),
            size: Some(NumericField::Availability365),
            hover_name: Some(CategoryField::Name),
            ..Default::default()
        };
        let spec = scatter_map(&data, &config);
        assert_eq!(
            spec.points,
            [ScatterPoint {
                lat: 1.0,
                lon: 2.0,
                color: Some(120.0),
                size: Some(120.0),
                hover: Some("US listing".into()),
            }]
        );
        assert_eq!(spec.color_range, Some((120.0, 120.0)));
        assert_eq!(spec.style, "carto-positron");
    }

    #[test]
    fn specs_serialize_to_json() {
        let data = vec![listing("US", None, 100.0)];
        let spec = bar_chart(
            &data,
            &BarChartConfig::new(CategoryField::Country, NumericField::Price),
        );
        let json = serde_json::to_value(&spec).expect("serialize");
        assert_eq!(json["x_field"], "country");
        assert_eq!(json["palette"], "set1");
        assert_eq!(json["bars"][0]["category"], "US");
    }
}
