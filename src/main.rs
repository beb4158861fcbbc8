mod app;
mod main_menu;

use eframe::egui;
use pixelique::config::{Settings, SETTINGS_FILE};

use app::PixeliqueApp;

const WINDOW_WIDTH: f32 = 1000.0;
const WINDOW_HEIGHT: f32 = 1000.0;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let settings = match Settings::load(SETTINGS_FILE) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("{e}, using default settings");
            Settings::default()
        }
    };

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(WINDOW_WIDTH, WINDOW_HEIGHT)),
        ..Default::default()
    };
    eframe::run_native(
        "Pixelique",
        native_options,
        Box::new(move |_cc| Box::new(PixeliqueApp::new(settings))),
    )
}
