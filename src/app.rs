use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::error::DataSourceError;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

/// Either a working dashboard or the error screen shown when the snapshots
/// could not be loaded. A failed app never renders any dashboard widget.
pub enum ListingLensApp {
    Ready(Box<AppState>),
    Failed { message: String },
}

impl ListingLensApp {
    pub fn ready(state: AppState) -> Self {
        ListingLensApp::Ready(Box::new(state))
    }

    pub fn failed(error: &DataSourceError) -> Self {
        ListingLensApp::Failed {
            message: error.to_string(),
        }
    }
}

impl eframe::App for ListingLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = match self {
            ListingLensApp::Ready(state) => state,
            ListingLensApp::Failed { message } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    error_screen(ui, message);
                });
                return;
            }
        };

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, state);
            });

        // ---- Central panel: KPIs, charts, raw data ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard_panel(ui, state);
        });
    }
}

fn error_screen(ui: &mut Ui, message: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading("Could not load listing data");
            ui.add_space(8.0);
            ui.label(RichText::new(message).color(Color32::RED));
            ui.add_space(8.0);
            ui.label("Fix the data source (see --help for paths) and restart.");
        });
    });
}
