use anyhow::Result;
use clap::Parser;
use eframe::egui;

use listing_lens::app::ListingLensApp;
use listing_lens::cli::Args;
use listing_lens::config::Config;
use listing_lens::data::cache::DatasetCache;
use listing_lens::state::AppState;

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    config.merge_with_args(&args);
    log::debug!("Configuration: {config:?}");

    let cache = DatasetCache::new(config.sources());
    let app = match cache.get_or_load() {
        Ok(dataset) => ListingLensApp::ready(AppState::new(dataset, config.dashboard_options())),
        Err(e) => {
            log::error!("Failed to load listings: {e}");
            ListingLensApp::failed(&e)
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Listing Lens – U.S. Rentals 2020 vs 2023",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))
}
