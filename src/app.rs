use eframe::egui;
use egui::{Color32, PointerButton, Pos2, Rect, Stroke, TextureHandle, TextureOptions};
use image::Rgba;
use rayon::prelude::*;
use rfd::FileDialog;

use pixelique::file::{self, IMAGE_FILTERS};
use pixelique::printer::{self, PrinterTransport};
use pixelique::view::{MAX_ZOOM, MIN_ZOOM};
use pixelique::{Error, PaintEngine, Settings, Tool, Viewport};

use crate::main_menu::{MainMenu, MenuAction};

const ZOOM_SPEED: f32 = 0.002;
const MAX_BRUSH_RADIUS: u32 = 32;
const CHECKER_LIGHT: u32 = 255;
const CHECKER_DARK: u32 = 200;

enum AppState {
    MainMenu(MainMenu),
    Canvas(PaintApp),
}

enum PendingAction {
    ReturnToMenu,
}

/// Top-level eframe application switching between the start menu and the editor.
pub struct PixeliqueApp {
    state: AppState,
    settings: Settings,
}

impl PixeliqueApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::MainMenu(MainMenu::new(&settings)),
            settings,
        }
    }
}

impl eframe::App for PixeliqueApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match &mut self.state {
            AppState::MainMenu(menu) => match menu.show(ctx) {
                Some(MenuAction::NewCanvas(width, height)) => {
                    match PaintEngine::new(width, height, self.settings.undo_steps) {
                        Ok(engine) => {
                            self.state = AppState::Canvas(PaintApp::new(engine, &self.settings));
                        }
                        Err(e) => menu.error = Some(e.to_string()),
                    }
                }
                Some(MenuAction::OpenFile) => {
                    if let Some(path) = image_dialog().pick_file() {
                        match file::load_canvas(&path) {
                            Ok(canvas) => {
                                let undo_steps = self.settings.undo_steps;
                                let engine = PaintEngine::from_canvas(canvas, undo_steps);
                                let paint_app = PaintApp::new(engine, &self.settings);
                                self.state = AppState::Canvas(paint_app);
                            }
                            Err(e) => {
                                log::error!("{e}");
                                menu.error = Some(e.to_string());
                            }
                        }
                    }
                }
                None => {}
            },
            AppState::Canvas(paint_app) => {
                if let Some(PendingAction::ReturnToMenu) = paint_app.show(ctx, &self.settings) {
                    self.state = AppState::MainMenu(MainMenu::new(&self.settings));
                }
            }
        }
    }
}

fn image_dialog() -> FileDialog {
    IMAGE_FILTERS
        .iter()
        .fold(FileDialog::new(), |dialog, (name, extensions)| dialog.add_filter(*name, *extensions))
}

/// Editor screen. All drawing goes through the single `engine`; opening a file
/// swaps that engine out instead of rebuilding the screen.
pub struct PaintApp {
    engine: PaintEngine,
    viewport: Viewport,
    texture: Option<TextureHandle>,
    texture_dirty: bool,
    stroking: bool,
    color: Color32,
    brush_radius: u32,
    export_scale: u32,
    printer: Option<Box<dyn PrinterTransport>>,
    status: Option<String>,
    has_unsaved_changes: bool,
}

impl PaintApp {
    pub fn new(engine: PaintEngine, settings: &Settings) -> Self {
        let color = engine.color();
        Self {
            brush_radius: engine.brush_radius(),
            engine,
            viewport: Viewport::new(settings.initial_zoom),
            texture: None,
            texture_dirty: true,
            stroking: false,
            color: Color32::from_rgba_unmultiplied(color[0], color[1], color[2], color[3]),
            export_scale: settings.export_scale,
            printer: None,
            status: None,
            has_unsaved_changes: false,
        }
    }

    fn replace_engine(&mut self, mut engine: PaintEngine) {
        engine.set_tool(self.engine.tool());
        engine.set_color(self.engine.color());
        engine.set_brush_radius(self.engine.brush_radius());
        self.engine = engine;
        self.stroking = false;
        self.texture_dirty = true;
        self.has_unsaved_changes = false;
    }

    fn report(&mut self, error: Error) {
        log::error!("{error}");
        self.status = Some(error.to_string());
    }

    fn mark_changed(&mut self) {
        self.texture_dirty = true;
        self.has_unsaved_changes = true;
    }

    fn undo(&mut self) {
        if self.engine.undo() {
            self.mark_changed();
        }
    }

    fn open_file(&mut self, settings: &Settings) {
        let Some(path) = image_dialog().pick_file() else {
            return;
        };
        match file::load_canvas(&path) {
            Ok(canvas) => {
                self.replace_engine(PaintEngine::from_canvas(canvas, settings.undo_steps));
                self.status = Some(format!("Opened {}", path.display()));
            }
            Err(e) => self.report(e),
        }
    }

    fn save_file(&mut self) {
        let Some(path) = image_dialog().set_file_name("pixel-art.png").save_file() else {
            return;
        };
        let saved = self
            .engine
            .export_raster(self.export_scale)
            .and_then(|raster| file::save_raster(&path, &raster));
        match saved {
            Ok(saved) => {
                self.has_unsaved_changes = false;
                self.status = Some(format!("Saved {}", saved.display()));
            }
            Err(e) => self.report(e),
        }
    }

    fn print(&mut self, settings: &Settings) {
        match printer::print_canvas(&self.engine, self.printer.as_deref_mut(), settings) {
            Ok(()) => self.status = Some("Sent to printer".to_owned()),
            Err(e) => self.report(e),
        }
    }

    /// Rebuilds the display texture, showing a checkerboard through transparent pixels.
    fn update_texture(&mut self, ctx: &egui::Context, checker_size: u32) {
        if !self.texture_dirty {
            return;
        }
        let canvas = self.engine.canvas();
        let width = canvas.width() as usize;
        let height = canvas.height() as usize;
        let src = canvas.as_raw();
        let checker = checker_size.max(1) as usize;

        let mut image_data = vec![0_u8; width * height * 4];
        image_data
            .par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.chunks_exact_mut(4).enumerate() {
                    let idx = (y * width + x) * 4;
                    let pixel = &src[idx..idx + 4];
                    let background = if (x / checker + y / checker) % 2 == 0 {
                        CHECKER_LIGHT
                    } else {
                        CHECKER_DARK
                    };
                    let alpha = pixel[3] as u32;
                    for c in 0..3 {
                        let blended = pixel[c] as u32 * alpha + background * (255 - alpha);
                        out[c] = ((blended + 127) / 255) as u8;
                    }
                    out[3] = 255;
                }
            });

        let color_image = egui::ColorImage::from_rgba_unmultiplied([width, height], &image_data);
        match &mut self.texture {
            Some(texture) => texture.set(color_image, TextureOptions::NEAREST),
            None => {
                let texture = ctx.load_texture("canvas", color_image, TextureOptions::NEAREST);
                self.texture = Some(texture);
            }
        }
        self.texture_dirty = false;
    }

    fn show(&mut self, ctx: &egui::Context, settings: &Settings) -> Option<PendingAction> {
        let mut action = None;

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z)) {
            self.undo();
        }
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) {
            self.save_file();
        }

        self.update_texture(ctx, settings.checkerboard_size);

        egui::SidePanel::right("tools_panel").show(ctx, |ui| {
            ui.vertical(|ui| {
                ui.heading("Tools");
                for tool in Tool::ALL {
                    if ui.selectable_label(self.engine.tool() == tool, tool.label()).clicked() {
                        self.engine.set_tool(tool);
                        self.stroking = false;
                    }
                }

                ui.add_space(10.0);
                ui.label("Brush Size:");
                let radius = egui::DragValue::new(&mut self.brush_radius)
                    .speed(0.1)
                    .clamp_range(1..=MAX_BRUSH_RADIUS);
                if ui.add(radius).changed() {
                    self.engine.set_brush_radius(self.brush_radius);
                }

                ui.add_space(10.0);
                ui.label("Color:");
                if ui.color_edit_button_srgba(&mut self.color).changed() {
                    self.engine.set_color(Rgba(self.color.to_srgba_unmultiplied()));
                }

                ui.add_space(10.0);
                ui.label("Zoom:");
                let zoom = egui::Slider::new(&mut self.viewport.zoom, MIN_ZOOM..=MAX_ZOOM);
                ui.add(zoom.logarithmic(true));

                ui.separator();
                if ui.button("Undo").clicked() {
                    self.undo();
                }
                if ui.button("Clear").clicked() {
                    self.engine.clear();
                    self.mark_changed();
                }

                ui.separator();
                ui.label("File");
                if ui.button("Open...").clicked() {
                    self.open_file(settings);
                }
                ui.horizontal(|ui| {
                    ui.label("Export scale:");
                    let scale = egui::DragValue::new(&mut self.export_scale).speed(0.2);
                    ui.add(scale.clamp_range(1..=64));
                });
                if ui.button("Save...").clicked() {
                    self.save_file();
                }
                if ui.button("Print").clicked() {
                    self.print(settings);
                }
                if ui.button("New Canvas").clicked() {
                    if self.has_unsaved_changes {
                        log::warn!("discarding unsaved changes");
                    }
                    action = Some(PendingAction::ReturnToMenu);
                }

                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let area_center = ui.available_rect_before_wrap().center();
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

            let canvas_size = egui::vec2(self.engine.width() as f32, self.engine.height() as f32);
            let canvas_rect = self.viewport.canvas_rect(area_center, canvas_size);

            if let Some(texture) = &self.texture {
                painter.image(
                    texture.id(),
                    canvas_rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            painter.rect_stroke(canvas_rect, 0.0, Stroke::new(1.0, Color32::DARK_GRAY));

            self.handle_pointer(ui, &response, canvas_rect);

            let delta = ui.input(|i| i.scroll_delta.y);
            if delta != 0.0 && response.hovered() {
                if let Some(mouse_pos) = ui.input(|i| i.pointer.hover_pos()) {
                    let factor = (1.0 + delta * ZOOM_SPEED).clamp(0.5, 2.0);
                    self.viewport.zoom_by(factor, mouse_pos, area_center);
                }
            }
        });

        action
    }

    fn handle_pointer(&mut self, ui: &egui::Ui, response: &egui::Response, canvas_rect: Rect) {
        let panning = self.engine.tool() == Tool::Pan;
        let primary_drag = panning && response.dragged_by(PointerButton::Primary);
        if response.dragged_by(PointerButton::Middle) || primary_drag {
            self.viewport.pan_by(response.drag_delta());
        }
        if panning {
            return;
        }

        let (pressed, down, released, pos) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
            )
        });

        if pressed && response.hovered() {
            if let Some(pos) = pos {
                let (x, y) = self.viewport.to_canvas(pos, canvas_rect);
                self.stroking = true;
                if self.engine.pointer_down(x, y) {
                    self.mark_changed();
                }
            }
        } else if self.stroking && down {
            if let Some(pos) = pos {
                let (x, y) = self.viewport.to_canvas(pos, canvas_rect);
                if self.engine.pointer_move(x, y) {
                    self.mark_changed();
                }
            }
        }

        if self.stroking && (released || !down) {
            self.engine.pointer_up();
            self.stroking = false;
        }
    }
}
