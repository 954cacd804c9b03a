use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::charts::insights::Insights;
use crate::charts::{world_map, MarkerMapSpec};
use crate::config::Config;
use crate::data::model::{Dataset, ListingRow};
use crate::data::query::{self, CountryFilter, FilterCriteria, SortSpec};

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    MapViz,
    DataInsights,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Home, Page::MapViz, Page::DataInsights];

    pub fn label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::MapViz => "Map Viz",
            Page::DataInsights => "Data Insights",
        }
    }
}

// ---------------------------------------------------------------------------
// Range selector
// ---------------------------------------------------------------------------

/// Two-handle integer range widget state. Keeps `low <= high` inside
/// `bounds` so the query engine never sees an inverted range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSelector {
    pub low: u32,
    pub high: u32,
    pub bounds: RangeInclusive<u32>,
    pub step: u32,
}

impl RangeSelector {
    /// A selector spanning its whole bounds.
    pub fn new(bounds: RangeInclusive<u32>, step: u32) -> Self {
        Self {
            low: *bounds.start(),
            high: *bounds.end(),
            bounds,
            step: step.max(1),
        }
    }

    /// Clamp both handles into bounds. When they cross, the handle the user
    /// did not move follows the one they did.
    pub fn normalize(&mut self, low_moved: bool) {
        let (lo, hi) = (*self.bounds.start(), *self.bounds.end());
        self.low = self.low.clamp(lo, hi);
        self.high = self.high.clamp(lo, hi);
        if self.low > self.high {
            if low_moved {
                self.high = self.low;
            } else {
                self.low = self.high;
            }
        }
    }

    pub fn as_range(&self) -> RangeInclusive<f64> {
        f64::from(self.low)..=f64::from(self.high)
    }
}

#[derive(Serialize)]
struct ChartExport<'a> {
    insights: &'a Insights,
    world_map: &'a MarkerMapSpec,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Page selected in the sidebar menu.
    pub page: Page,

    pub price_range: RangeSelector,
    pub rating_range: RangeSelector,
    pub country: CountryFilter,
    pub sort: SortSpec,

    /// Number of listings passing the current filters.
    pub visible_count: usize,

    /// Visible listings projected and sorted for the table (cached).
    pub sorted_rows: Vec<ListingRow>,

    /// Marker map of the visible listings (cached).
    pub world_map: MarkerMapSpec,

    /// Charts over the whole dataset, built once per load.
    pub insights: Option<Insights>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            price_range: RangeSelector::new(0..=config.price_max, config.price_step),
            rating_range: RangeSelector::new(0..=100, config.rating_step),
            config,
            dataset: None,
            page: Page::default(),
            country: CountryFilter::All,
            sort: SortSpec::default(),
            visible_count: 0,
            sorted_rows: Vec::new(),
            world_map: world_map(std::iter::empty()),
            insights: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset, reset the filters and rebuild every view.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.price_range = RangeSelector::new(0..=self.config.price_max, self.config.price_step);
        self.rating_range = RangeSelector::new(0..=100, self.config.rating_step);
        self.country = CountryFilter::All;
        self.insights = Some(Insights::build(&dataset));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// The sidebar selections as explicit query criteria.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            price_range: self.price_range.as_range(),
            rating_range: self.rating_range.as_range(),
            country: self.country.clone(),
        }
    }

    /// Recompute the visible listings, table rows and marker map after a
    /// filter change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let criteria = self.criteria();
        let visible = query::filter(ds.listings(), &criteria);
        self.visible_count = visible.len();
        self.world_map = world_map(visible.iter().copied());
        self.sorted_rows = query::sort(visible.iter().copied(), self.sort);
        log::debug!(
            "{criteria:?} sorted by {} matched {} of {} listings",
            self.sort,
            self.visible_count,
            ds.len()
        );
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        if self.sort != sort {
            self.sort = sort;
            self.refilter();
        }
    }

    pub fn set_country(&mut self, country: CountryFilter) {
        if self.country != country {
            self.country = country;
            self.refilter();
        }
    }

    /// Whether the current filters leave anything to show.
    pub fn has_results(&self) -> bool {
        self.visible_count > 0
    }

    /// Write every chart and the current marker map as pretty JSON.
    pub fn export_charts(&self, path: &Path) -> Result<()> {
        let insights = self
            .insights
            .as_ref()
            .context("no dataset loaded, nothing to export")?;
        let payload = ChartExport {
            insights,
            world_map: &self.world_map,
        };
        write_json(path, &payload)
    }
}

/// Serialise `value` in full before touching `path`, so a failure never
/// leaves a truncated file behind.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).context("serialising chart JSON")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
