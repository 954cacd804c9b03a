mod app;
mod charts;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::Context;
use app::AirbnbExplorerApp;
use config::Config;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    let mut state = AppState::new(config.clone());

    if let Some(path) = &config.data_path {
        let dataset = data::loader::load_file(path)
            .with_context(|| format!("loading start-up dataset {}", path.display()))?;
        log::info!("Loaded {} listings from {}", dataset.len(), path.display());
        state.set_dataset(dataset);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Airbnb Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(AirbnbExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run the UI: {e}"))
}
