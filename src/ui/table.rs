use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::ListingRow;

fn cell<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Render the sorted listing projection.
pub fn listings_table(ui: &mut Ui, rows: &[ListingRow]) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::initial(260.0).at_least(120.0).clip(true))
        .columns(Column::auto().at_least(60.0), ListingRow::COLUMNS.len() - 1)
        .max_scroll_height(320.0)
        .header(20.0, |mut header| {
            for title in ListingRow::COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let listing = &rows[row.index()];
                let cells = [
                    listing.name.clone(),
                    cell(&listing.price),
                    cell(&listing.review_scores),
                    cell(&listing.property_type),
                    cell(&listing.room_type),
                    cell(&listing.bedrooms),
                    cell(&listing.bathrooms),
                ];
                for text in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(text);
                    });
                }
            });
        });
}
