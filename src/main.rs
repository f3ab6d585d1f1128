mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use eframe::egui;

use app::MovieDashboardApp;
use config::Config;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();

    // A dataset that fails to load at startup ends the process.
    let dashboard = state::run_pipeline(&config.data, config.clean_policy(), config.top)
        .with_context(|| format!("loading {}", config.data.display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    let state = AppState::new(config, dashboard);
    eframe::run_native(
        "Movie Analytics Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(MovieDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("running the dashboard window: {e}"))
}
