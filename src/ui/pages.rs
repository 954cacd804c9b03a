use eframe::egui::{Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, Page};
use crate::ui::{charts, map, table};

/// Render the page selected in the sidebar menu.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    match state.page {
        Page::Home => home(ui),
        Page::MapViz => map_viz(ui, state),
        Page::DataInsights => data_insights(ui, state),
    }
}

fn no_dataset(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open a listings file to explore it  (File → Open…)");
    });
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

fn home(ui: &mut Ui) {
    ui.heading("Airbnb Analysis");
    ui.add_space(8.0);

    ui.strong("Technologies used:");
    ui.label("1. Rust\n2. egui / eframe\n3. egui_plot\n4. csv, serde, Arrow / Parquet");
    ui.add_space(8.0);

    ui.strong("Domain:");
    ui.label("Travel Industry, Property Management and Tourism");
    ui.add_space(8.0);

    ui.strong("About:");
    ui.label(
        "Explore Airbnb listings: filter them by price, rating and country, compare \
         listings in a sortable table, see where they are on a world map, and look at \
         pricing variations, availability patterns and location-based trends.",
    );
}

// ---------------------------------------------------------------------------
// Map Viz
// ---------------------------------------------------------------------------

fn map_viz(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        no_dataset(ui);
        return;
    }

    ui.heading("Airbnb Listings Distribution Map");
    ui.label(format!(
        "Displaying {} listings in the selected range",
        state.visible_count
    ));
    ui.add_space(4.0);
    ui.strong("Selected Listing:");

    if !state.has_results() {
        ui.label(RichText::new("No Data to Display").color(Color32::from_rgb(0xE0, 0x9F, 0x00)));
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.push_id("listings_table", |ui: &mut Ui| {
                table::listings_table(ui, &state.sorted_rows);
            });
            ui.separator();
            map::marker_map(ui, &state.world_map);
        });
}

// ---------------------------------------------------------------------------
// Data Insights
// ---------------------------------------------------------------------------

fn data_insights(ui: &mut Ui, state: &AppState) {
    let Some(insights) = &state.insights else {
        no_dataset(ui);
        return;
    };

    ui.heading("Data Insights");
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.columns(2, |cols: &mut [Ui]| {
                charts::bar_chart(&mut cols[0], &insights.country_prices, "country_prices");
                cols[0].add_space(12.0);
                charts::pie_chart(
                    &mut cols[0],
                    &insights.availability_by_property_type,
                    "availability_by_property_type",
                );

                charts::bar_chart(
                    &mut cols[1],
                    &insights.property_type_prices,
                    "property_type_prices",
                );
                cols[1].add_space(12.0);
                charts::bar_chart(
                    &mut cols[1],
                    &insights.availability_demand,
                    "availability_demand",
                );
            });
            ui.add_space(12.0);
            ui.separator();
            map::scatter_map(ui, &insights.occupancy_map, "occupancy_map");
        });
}
