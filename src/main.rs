use anyhow::Result;
use clap::Parser;
use eframe::egui;

use phase_viz::app::PhaseVizApp;
use phase_viz::config::{Args, ViewerConfig};

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = ViewerConfig::resolve(&args)?;
    log::debug!("Viewer config: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Phase Identification Data Visualiser",
        options,
        Box::new(move |_cc| Ok(Box::new(PhaseVizApp::new(&config)))),
    )
    .map_err(|e| anyhow::anyhow!("running viewer: {e}"))
}
