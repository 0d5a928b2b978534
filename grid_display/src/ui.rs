// ui.rs - Draws the viewer and maps buttons to engine commands

use std::time::Duration;

use eframe::egui;
use egui::{Color32, Rect, Stroke, Vec2};

use conway::{Command, RunState};

use crate::Viewer;

impl eframe::App for Viewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Conway's Game of Life");

            // Controls
            ui.horizontal(|ui| {
                let running = !self.is_finished();
                let button_text = if self.state == RunState::Paused {
                    "▶ Resume"
                } else {
                    "⏸ Pause"
                };
                if ui.add_enabled(running, egui::Button::new(button_text)).clicked() {
                    self.send(Command::TogglePause);
                }

                if ui.add_enabled(running, egui::Button::new("💾 Save")).clicked() {
                    self.send(Command::Save);
                }

                if ui.add_enabled(running, egui::Button::new("⏹ Quit")).clicked() {
                    self.send(Command::Quit);
                }

                ui.separator();

                ui.label(format!("Turn: {}", self.turn));
                ui.label(format!("State: {}", self.state));
            });

            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Live:");
                ui.color_edit_button_srgba(&mut self.live_color);
                ui.label("Dead:");
                ui.color_edit_button_srgba(&mut self.dead_color);
            });

            if let Some(status) = &self.status {
                ui.label(status.as_str());
            }

            ui.separator();

            // Size cells to fit the space left, keeping them square
            let (width, height) = (self.grid.width(), self.grid.height());
            let available = ui.available_size() - Vec2::new(0.0, 30.0);
            let pitch = (available.x / width as f32).min(available.y / height as f32).max(1.0);
            let spacing = if pitch >= 4.0 { 0.5 } else { 0.0 };
            let box_size = pitch - spacing;

            let total_size = Vec2::new(pitch * width as f32, pitch * height as f32);
            let (response, painter) = ui.allocate_painter(total_size, egui::Sense::hover());
            let start_pos = response.rect.min;

            // Fill background
            painter.rect_filled(response.rect, 0.0, Color32::BLACK);

            for y in 0..height {
                for x in 0..width {
                    let rect = Rect::from_min_size(
                        start_pos + Vec2::new(x as f32 * pitch, y as f32 * pitch),
                        Vec2::splat(box_size),
                    );

                    let cell_color = if self.grid.get(x, y).is_alive() {
                        self.live_color
                    } else {
                        self.dead_color
                    };
                    painter.rect_filled(rect, 0.0, cell_color);

                    if spacing > 0.0 {
                        painter.rect_stroke(rect, 0.0, Stroke::new(0.2, Color32::from_gray(60)));
                    }
                }
            }

            ui.separator();

            // Live count from the local copy; the ticker's report only refreshes every interval
            let live_cells = self.grid.alive_count();
            let total = width * height;
            ui.horizontal(|ui| {
                ui.label(format!("Live cells: {}", live_cells));
                ui.label(format!("Last report: {}", self.alive_count));
                ui.label(format!("Population: {:.1}%", (live_cells as f32 / total as f32) * 100.0));
            });
        });

        // Keep pulling events while the run is alive
        if !self.is_finished() {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}
