use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Listing;
use crate::state::AppState;

const COLUMNS: [&str; 16] = [
    "year",
    "id",
    "name",
    "host_id",
    "host_name",
    "city",
    "neighbourhood",
    "room_type",
    "price",
    "minimum_nights",
    "number_of_reviews",
    "last_review",
    "reviews_per_month",
    "availability_365",
    "latitude",
    "longitude",
];

fn optional<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(T::to_string).unwrap_or_default()
}

/// Cell texts for one listing, in [`COLUMNS`] order.
fn cells(listing: &Listing) -> [String; 16] {
    [
        listing.year.to_string(),
        listing.id.to_string(),
        listing.name.clone(),
        listing.host_id.to_string(),
        optional(&listing.host_name),
        listing.city.clone(),
        optional(&listing.neighbourhood),
        listing.room_type.clone(),
        optional(&listing.price),
        listing.minimum_nights.to_string(),
        listing.number_of_reviews.to_string(),
        optional(&listing.last_review),
        optional(&listing.reviews_per_month),
        optional(&listing.availability_365),
        format!("{:.5}", listing.latitude),
        format!("{:.5}", listing.longitude),
    ]
}

/// The listing shown in table row `row`.
fn raw_row(state: &AppState, row: usize) -> &Listing {
    &state.dataset.listings[state.dashboard.rows[row]]
}

/// Collapsible table of every filtered row. Only the visible rows are laid
/// out each frame.
pub fn raw_data(ui: &mut Ui, state: &AppState) {
    let total = state.dashboard.rows.len();

    egui::CollapsingHeader::new("View Raw Data")
        .id_salt("raw_data")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.label(format!("{total} rows"));

            egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .max_scroll_height(400.0)
                    .columns(Column::auto().resizable(true), COLUMNS.len())
                    .header(20.0, |mut header| {
                        for name in COLUMNS {
                            header.col(|ui: &mut Ui| {
                                ui.strong(name);
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(18.0, total, |mut row| {
                            for text in cells(raw_row(state, row.index())) {
                                row.col(|ui: &mut Ui| {
                                    ui.label(text);
                                });
                            }
                        });
                    });
            });
        });
}
