#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use inkpad::{CanvasConfig, PaintApp};

/// Optional path to a JSON canvas configuration
const CONFIG_ENV: &str = "INKPAD_CONFIG";

fn load_config() -> CanvasConfig {
    let Some(path) = std::env::var_os(CONFIG_ENV) else {
        return CanvasConfig::default();
    };
    match CanvasConfig::load(&path) {
        Ok(config) => {
            log::info!("loaded canvas config from {}", path.to_string_lossy());
            config
        }
        Err(err) => {
            log::error!(
                "failed to load {}: {err}, using defaults",
                path.to_string_lossy()
            );
            CanvasConfig::default()
        }
    }
}

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("inkpad")
            .with_inner_size([config.width as f32 + 32.0, config.height as f32 + 96.0]),
        ..Default::default()
    };
    eframe::run_native(
        "inkpad",
        native_options,
        Box::new(move |cc| Ok(Box::new(PaintApp::new(cc, config)?))),
    )
}
