use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use imdb_dashboard::app::DashboardApp;
use imdb_dashboard::config::{Cli, DashboardConfig};
use imdb_dashboard::data::import;
use imdb_dashboard::state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = DashboardConfig::try_from(&cli)?;

    if let Some(path) = &cli.import {
        let n = import::import_file(path, &config.db_path, &config.table)
            .with_context(|| format!("importing {}", path.display()))?;
        log::info!("Imported {n} movies from {}", path.display());
    }

    let state = AppState::new(config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "IMDB 2024 Movie List",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
