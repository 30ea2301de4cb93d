// src/main.rs
mod app;
mod ui;

use eframe::egui;
use gesture_control::Config;
use std::path::{Path, PathBuf};

/// Picked up from the working directory when present.
const CONFIG_FILE: &str = "gesture_control.json";

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Usage: gesture_control [replay.jsonl]
    let replay_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(Path::new(CONFIG_FILE))?;

    // Set up GUI options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 760.0])
            .with_min_inner_size([960.0, 600.0]),
        centered: true,
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Gesture Control",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(create_visuals());
            Box::new(app::GestureControlApp::new(cc, config, replay_path))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Error running application: {:?}", e))
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        tracing::info!("No {} found, using defaults", path.display());
        return Ok(Config::default());
    }

    let config = Config::from_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))?;
    tracing::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn create_visuals() -> egui::Visuals {
    let theme = ui::Theme::default();
    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = theme.background;
    visuals.window_fill = theme.surface;
    visuals.selection.bg_fill = theme.primary;
    visuals.widgets.inactive.bg_fill = egui::Color32::from_rgb(45, 45, 52);
    visuals.widgets.active.bg_fill = theme.primary;

    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.active,
    ] {
        widget.rounding = egui::Rounding::same(6.0);
    }
    visuals.window_rounding = egui::Rounding::same(10.0);

    visuals
}
