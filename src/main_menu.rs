use eframe::egui;
use egui::Color32;

use pixelique::Settings;

pub const MAX_DIMENSION: u32 = 1024;

pub enum MenuAction {
    NewCanvas(u32, u32),
    OpenFile,
}

/// Start screen asking for the size of a new canvas.
pub struct MainMenu {
    width: u32,
    height: u32,
    pub error: Option<String>,
}

impl MainMenu {
    pub fn new(settings: &Settings) -> Self {
        Self {
            width: settings.default_width.clamp(1, MAX_DIMENSION),
            height: settings.default_height.clamp(1, MAX_DIMENSION),
            error: None,
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<MenuAction> {
        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.heading("Pixelique");
                ui.add_space(30.0);

                ui.group(|ui| {
                    ui.set_width(260.0);
                    ui.vertical_centered(|ui| {
                        ui.label("Create New Canvas");
                        ui.add_space(10.0);

                        ui.horizontal(|ui| {
                            ui.label("Width:");
                            let width = egui::DragValue::new(&mut self.width).speed(1);
                            ui.add(width.clamp_range(1..=MAX_DIMENSION));
                        });

                        ui.horizontal(|ui| {
                            ui.label("Height:");
                            let height = egui::DragValue::new(&mut self.height).speed(1);
                            ui.add(height.clamp_range(1..=MAX_DIMENSION));
                        });

                        ui.add_space(20.0);

                        if ui.button("Create Canvas").clicked() {
                            action = Some(MenuAction::NewCanvas(self.width, self.height));
                        }
                        if ui.button("Open Image...").clicked() {
                            action = Some(MenuAction::OpenFile);
                        }
                    });
                });

                if let Some(error) = &self.error {
                    ui.add_space(10.0);
                    ui.colored_label(Color32::LIGHT_RED, error);
                }
            });
        });

        action
    }
}
