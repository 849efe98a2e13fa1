use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::export;
use crate::data::filter::{CitySelection, ALL_CITIES};
use crate::data::model::SnapshotYear;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // The dataset outlives every frame; hold our own handle so `state` can
    // be mutated while iterating its options.
    let dataset = Arc::clone(&state.dataset);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year ----
            ui.strong("Select Year");
            let mut year = state.params.year;
            egui::ComboBox::from_id_salt("year")
                .selected_text(year.as_str())
                .show_ui(ui, |ui: &mut Ui| {
                    for y in SnapshotYear::ALL {
                        ui.selectable_value(&mut year, y, y.as_str());
                    }
                });
            if year != state.params.year {
                state.set_year(year);
            }
            ui.add_space(6.0);

            // ---- City ----
            ui.strong("Select City");
            let mut city = state.params.city.clone();
            egui::ComboBox::from_id_salt("city")
                .selected_text(city.to_string())
                .height(400.0)
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut city, CitySelection::All, ALL_CITIES);
                    for name in &dataset.cities {
                        ui.selectable_value(&mut city, CitySelection::City(name.clone()), name);
                    }
                });
            if city != state.params.city {
                state.set_city(city);
            }
            ui.separator();

            // ---- Room type (collapsible) ----
            let n_selected = state.params.room_types.len();
            let n_total = dataset.room_types.len();
            egui::CollapsingHeader::new(
                RichText::new(format!("Room Type  ({n_selected}/{n_total})")).strong(),
            )
            .id_salt("room_type")
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        state.select_all_room_types();
                    }
                    if ui.small_button("None").clicked() {
                        state.select_no_room_types();
                    }
                });

                for room_type in &dataset.room_types {
                    let mut checked = state.params.room_types.contains(room_type);
                    let text = RichText::new(room_type).color(state.color_map.color_for(room_type));
                    if ui.checkbox(&mut checked, text).changed() {
                        state.toggle_room_type(room_type);
                    }
                }
            });
            ui.separator();

            // ---- Price range ----
            ui.strong("Price Range ($)");
            let bounds = dataset.price_bounds;
            let mut changed = false;
            changed |= ui
                .add(
                    Slider::new(&mut state.params.price_min, bounds.min..=bounds.max)
                        .integer()
                        .text("min"),
                )
                .changed();
            changed |= ui
                .add(
                    Slider::new(&mut state.params.price_max, bounds.min..=bounds.max)
                        .integer()
                        .text("max"),
                )
                .changed();
            if changed {
                state.refresh();
            }
            ui.separator();

            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export filtered rows as CSV…").clicked() {
                export_csv_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export dashboard as JSON…").clicked() {
                export_json_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        ui.label(format!(
            "{} listings loaded, {} visible",
            state.dataset.len(),
            state.dashboard.rows.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Export dialogs
// ---------------------------------------------------------------------------

pub fn export_csv_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered listings")
        .add_filter("CSV", &["csv"])
        .set_file_name(format!("listings_{}.csv", state.dashboard.params.year))
        .save_file();

    if let Some(path) = file {
        let view = state.dashboard.view(&state.dataset);
        match export::write_csv(&view, &path) {
            Ok(n) => {
                log::info!("Exported {n} listings to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export CSV: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_json_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export dashboard")
        .add_filter("JSON", &["json"])
        .set_file_name("dashboard.json")
        .save_file();

    if let Some(path) = file {
        match export::write_json(&state.dashboard, &path) {
            Ok(()) => {
                log::info!("Exported dashboard to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export JSON: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
