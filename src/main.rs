//! Stardust Studio RS - preview application
//! Hosts the worker thread, forwards pointer/resize/theme events and blits
//! the frames it publishes.

use eframe::egui;
use log::{error, info};
use stardust_studio::{spawn_worker, EngineConfig, FrameSurface, SharedSurface, Theme, WorkerEvent};

struct StardustApp {
    events: crossbeam_channel::Sender<WorkerEvent>,
    surface: Option<SharedSurface>,
    texture: Option<egui::TextureHandle>,
    canvas_size: egui::Vec2,
    pointer_down: bool,
    themes: Vec<Theme>,
    selected_theme: usize,
    _worker: std::thread::JoinHandle<()>,
}

impl StardustApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = egui::Color32::from_rgb(12, 12, 20);
        cc.egui_ctx.set_visuals(visuals);

        let (events, worker) = spawn_worker(EngineConfig::default());

        Self {
            events,
            surface: None,
            texture: None,
            canvas_size: egui::Vec2::ZERO,
            pointer_down: false,
            themes: Theme::all_themes(),
            selected_theme: 0,
            _worker: worker,
        }
    }

    fn theme(&self) -> Theme {
        self.themes[self.selected_theme].clone()
    }

    /// Bind the surface on the first frame the canvas size is known, and
    /// forward resizes afterwards.
    fn sync_geometry(&mut self, rect: egui::Rect) {
        let size = rect.size();
        let (width, height) = (size.x.max(1.0) as u32, size.y.max(1.0) as u32);

        if self.surface.is_none() {
            let surface = FrameSurface::shared(width, height);
            let _ = self.events.send(WorkerEvent::Init {
                surface: surface.clone(),
                width,
                height,
                theme: self.theme(),
            });
            self.surface = Some(surface);
            self.canvas_size = size;
        } else if (size - self.canvas_size).length() > 1.0 {
            let _ = self.events.send(WorkerEvent::Resize { width, height });
            self.canvas_size = size;
        }
    }

    fn forward_pointer(&mut self, ui: &egui::Ui, rect: egui::Rect) {
        let (down, pos) = ui.input(|i| (i.pointer.primary_down(), i.pointer.interact_pos()));
        let local = pos
            .filter(|p| rect.contains(*p))
            .map(|p| egui::vec2(p.x - rect.min.x, p.y - rect.min.y));

        match (down, local) {
            (true, Some(p)) if !self.pointer_down => {
                self.pointer_down = true;
                let _ = self.events.send(WorkerEvent::PointerStart { pos: p });
            }
            (true, Some(p)) => {
                let _ = self.events.send(WorkerEvent::PointerMove { points: vec![p] });
            }
            _ => {
                if self.pointer_down && !down {
                    self.pointer_down = false;
                    let _ = self.events.send(WorkerEvent::PointerEnd);
                }
            }
        }
    }

    fn blit(&mut self, ctx: &egui::Context, painter: &egui::Painter, rect: egui::Rect) {
        let Some(surface) = &self.surface else { return };
        let (width, height, rgba) = {
            let frame = surface.lock().unwrap_or_else(|p| p.into_inner());
            (frame.width(), frame.height(), frame.rgba().to_vec())
        };
        if rgba.len() != (width * height * 4) as usize {
            return;
        }

        let frame_image =
            egui::ColorImage::from_rgba_unmultiplied([width as usize, height as usize], &rgba);
        match &mut self.texture {
            Some(texture) => texture.set(frame_image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture(
                    "stardust-frame",
                    frame_image,
                    egui::TextureOptions::LINEAR,
                ));
            }
        }

        if let Some(texture) = &self.texture {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
        }
    }

    fn save_snapshot(&self) {
        let Some(surface) = &self.surface else { return };
        let image = surface.lock().unwrap_or_else(|p| p.into_inner()).to_image();
        match image.save("stardust.png") {
            Ok(()) => info!("snapshot saved to stardust.png"),
            Err(e) => error!("snapshot failed: {e}"),
        }
    }
}

impl eframe::App for StardustApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("✨ Stardust Studio RS");
                ui.separator();

                let mut changed = false;
                egui::ComboBox::from_label("Theme")
                    .selected_text(self.themes[self.selected_theme].name.clone())
                    .show_ui(ui, |ui| {
                        for (i, theme) in self.themes.iter().enumerate() {
                            changed |= ui
                                .selectable_value(&mut self.selected_theme, i, theme.name.clone())
                                .clicked();
                        }
                    });
                if changed {
                    let _ = self.events.send(WorkerEvent::ThemeChange { theme: self.theme() });
                }

                ui.separator();
                if ui.button("📷 Snapshot").clicked() {
                    self.save_snapshot();
                }
                ui.label("drag on the canvas to draw a trail");
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                self.sync_geometry(rect);
                self.forward_pointer(ui, rect);
                let painter = ui.painter_at(rect);
                self.blit(ctx, &painter, rect);
            });

        if ctx.input(|i| i.key_pressed(egui::Key::S)) {
            self.save_snapshot();
        }

        // The worker renders continuously; keep the preview in lockstep.
        ctx.request_repaint();
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Stardust Studio RS")
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Stardust Studio RS",
        options,
        Box::new(|cc| Box::new(StardustApp::new(cc))),
    )
}
