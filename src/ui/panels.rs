use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::query::{CountryFilter, SortSpec, ALL_COUNTRIES};
use crate::state::{AppState, Page, RangeSelector};

// ---------------------------------------------------------------------------
// Left side panel – page menu and filter widgets
// ---------------------------------------------------------------------------

/// Two sliders acting as one range selector. Returns true when either
/// handle moved.
fn range_slider(ui: &mut Ui, label: &str, range: &mut RangeSelector) -> bool {
    ui.strong(label);
    let bounds = range.bounds.clone();
    let step = f64::from(range.step);

    let low_changed = ui
        .add(Slider::new(&mut range.low, bounds.clone()).step_by(step).text("min"))
        .changed();
    if low_changed {
        range.normalize(true);
    }

    let high_changed = ui
        .add(Slider::new(&mut range.high, bounds).step_by(step).text("max"))
        .changed();
    if high_changed {
        range.normalize(false);
    }

    low_changed || high_changed
}

/// Render the left panel: the page menu, then the filters when on Map Viz.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Menu");
    ui.separator();
    for page in Page::ALL {
        ui.selectable_value(&mut state.page, page, page.label());
    }

    if state.page != Page::MapViz {
        return;
    }

    ui.add_space(8.0);
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state below.
    let countries = dataset.countries().to_vec();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let mut changed = range_slider(ui, "Select a price range", &mut state.price_range);
            ui.add_space(6.0);
            changed |= range_slider(ui, "Select a rating range", &mut state.rating_range);
            if changed {
                state.refilter();
            }
            ui.separator();

            // ---- Country selector ----
            ui.strong("Select a country");
            let current = state.country.label().to_string();
            let mut picked = None;
            egui::ComboBox::from_id_salt("country")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    let labels = std::iter::once(ALL_COUNTRIES).chain(countries.iter().map(String::as_str));
                    for label in labels {
                        if ui.selectable_label(current == label, label).clicked() {
                            picked = Some(CountryFilter::from_label(label));
                        }
                    }
                });
            if let Some(country) = picked {
                state.set_country(country);
            }
            ui.separator();

            // ---- Sort selector ----
            ui.strong("Sort by");
            let mut sort = state.sort;
            egui::ComboBox::from_id_salt("sort_by")
                .selected_text(sort.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for spec in SortSpec::ALL {
                        ui.selectable_value(&mut sort, spec, spec.label());
                    }
                });
            state.set_sort(sort);
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.insights.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export charts…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            if ds.is_empty() {
                ui.label("Dataset is empty");
            } else {
                ui.label(format!(
                    "{} listings loaded, {} visible",
                    ds.len(),
                    state.visible_count
                ));
                if let Some((lo, hi)) = ds.price_bounds() {
                    ui.separator();
                    ui.label(format!("prices {lo:.0}$ – {hi:.0}$"));
                }
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open Airbnb listings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} listings from {} countries",
                    dataset.len(),
                    dataset.countries().len()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export charts")
        .add_filter("JSON", &["json"])
        .set_file_name("charts.json")
        .save_file();

    if let Some(path) = file {
        match state.export_charts(&path) {
            Ok(()) => {
                log::info!("Exported charts to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export charts: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
