mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::CrimeDashboardApp;
use clap::Parser;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

/// Interactive dashboard for the 2015 Austin crime incident dataset.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Incident CSV to open at startup (overrides the config file).
    #[arg(long)]
    data: Option<PathBuf>,

    /// JSON settings file (default: ./crime-dashboard.json if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cluster box half-width in degrees.
    #[arg(long)]
    radius: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = DashboardConfig::load(args.config.as_deref())?;
    if let Some(data) = args.data {
        config.data_path = data;
    }
    if let Some(radius) = args.radius {
        anyhow::ensure!(
            radius.is_finite() && radius >= 0.0,
            "--radius must be a non-negative number, got {radius}"
        );
        config.cluster_radius = radius;
    }

    let mut state = AppState::from_config(&config);
    state.load_from_path(&config.data_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Austin Crime Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CrimeDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
