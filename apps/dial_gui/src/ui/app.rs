//! The dial app shell: pumps backend events, renders the dial or the
//! selection prompt, and turns egui pointer input into controller
//! transitions.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::domain::Point;

use crate::backend_bridge::commands::BackendCommand;
use crate::config::Settings;
use crate::controller::events::{err_label, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::rotation::{DialController, DialEffect};

pub const PREFS_STORAGE_KEY: &str = "dial_prefs";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialPrefs {
    pub dial_diameter: f32,
    pub show_degree_readout: bool,
}

impl Default for DialPrefs {
    fn default() -> Self {
        Self {
            dial_diameter: 180.0,
            show_degree_readout: true,
        }
    }
}

pub struct DialApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    controller: DialController,
    scene_ready: bool,
    status: String,
    prefs: DialPrefs,
}

impl DialApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: Settings,
        prefs: Option<DialPrefs>,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            controller: DialController::new(settings.update_strategy, settings.debounce_window),
            scene_ready: false,
            status: "Waiting for scene".to_string(),
            prefs: prefs.unwrap_or_default(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::SceneReadyChanged { ready } => {
                    self.scene_ready = ready;
                    if ready {
                        self.status = "Scene ready".to_string();
                        dispatch_backend_command(
                            &self.cmd_tx,
                            BackendCommand::ReadSelection,
                            &mut self.status,
                        );
                    }
                }
                UiEvent::SelectionChanged { selection } => {
                    let needs_sync = self.controller.set_selection(selection.clone());
                    if needs_sync {
                        dispatch_backend_command(
                            &self.cmd_tx,
                            BackendCommand::SyncRotation {
                                item_id: selection[0],
                            },
                            &mut self.status,
                        );
                    }
                }
                UiEvent::RotationSynced { item_id, rotation } => {
                    tracing::debug!(item = %item_id.0, rotation, "adopted host rotation");
                    self.controller.sync_rotation(rotation);
                }
                UiEvent::ItemsChanged { items } => {
                    // Another participant may have turned the selected token;
                    // adopt its rotation unless a local drag is running.
                    if let [selected] = self.controller.selection() {
                        let selected = *selected;
                        if let Some(item) = items.iter().find(|item| item.id == selected) {
                            self.controller.sync_rotation(item.rotation);
                        }
                    }
                }
                UiEvent::InteractionStarted => self.controller.session_opened(),
                UiEvent::InteractionEnded => self.controller.session_closed(),
                UiEvent::Error(err) => {
                    self.status = if err.context() == UiErrorContext::BackendStartup {
                        format!("Backend startup failed: {}", err.message())
                    } else {
                        format!("{} error: {}", err_label(err.category()), err.message())
                    };
                }
            }
        }
    }

    fn apply_effect(&mut self, effect: Option<DialEffect>) {
        let Some(effect) = effect else { return };
        let cmd = match effect {
            DialEffect::OpenSession { items } => BackendCommand::StartInteraction { items },
            DialEffect::PushRotation {
                items,
                rotation,
                via_session,
            } => BackendCommand::PushRotation {
                items,
                rotation,
                via_session,
            },
            DialEffect::Commit {
                items,
                rotation,
                close_session,
            } => BackendCommand::CommitRotation {
                items,
                rotation,
                close_session,
            },
        };
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn show_dial(&mut self, ui: &mut egui::Ui) {
        let diameter = self.prefs.dial_diameter;
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(diameter, diameter), egui::Sense::drag());
        let center = rect.center();
        let radius = diameter / 2.0 - 4.0;

        let visuals = ui.visuals().clone();
        let painter = ui.painter_at(rect);
        painter.circle_filled(center, radius, visuals.extreme_bg_color);
        painter.circle_stroke(
            center,
            radius,
            egui::Stroke::new(2.0, visuals.widgets.inactive.fg_stroke.color),
        );

        // Handle drawn at the live rotation. Screen y grows downward, the
        // same orientation the controller's atan2 sees.
        let angle = self.controller.rotation().to_radians();
        let direction = egui::vec2(angle.cos() as f32, angle.sin() as f32);
        let handle = center + direction * (radius * 0.8);
        painter.line_segment(
            [center, handle],
            egui::Stroke::new(3.0, visuals.selection.bg_fill),
        );
        painter.circle_filled(handle, 6.0, visuals.selection.bg_fill);

        let center_point = Point::new(center.x as f64, center.y as f64);
        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                let effect = self
                    .controller
                    .pointer_down(Point::new(pos.x as f64, pos.y as f64), center_point);
                self.apply_effect(effect);
            }
        } else if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                let effect = self
                    .controller
                    .pointer_move(Point::new(pos.x as f64, pos.y as f64), Instant::now());
                self.apply_effect(effect);
            }
        }
        if response.drag_stopped() {
            let effect = self.controller.pointer_up();
            self.apply_effect(effect);
        }
    }
}

impl eframe::App for DialApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.small("Status:");
                ui.small(egui::RichText::new(&self.status).weak());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Token Dial");
            ui.small(format!(
                "Update strategy: {}",
                self.controller.strategy().label()
            ));
            ui.add_space(6.0);

            if !self.scene_ready {
                ui.label("Waiting for the scene to load...");
                return;
            }

            if self.controller.selection().is_empty() {
                ui.label("Select tokens");
                return;
            }

            let selected = self.controller.selection().len();
            if selected > 1 {
                ui.small(format!("{selected} tokens selected"));
            }

            ui.vertical_centered(|ui| {
                self.show_dial(ui);
                if self.prefs.show_degree_readout {
                    ui.label(format!("{:.1}°", self.controller.rotation()));
                }
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.add(
                    egui::Slider::new(&mut self.prefs.dial_diameter, 120.0..=280.0)
                        .text("Dial size"),
                );
                ui.checkbox(&mut self.prefs.show_degree_readout, "Degrees");
            });
        });

        // Host events arrive without user input; keep the pump turning.
        ctx.request_repaint_after(Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(raw) = serde_json::to_string(&self.prefs) {
            storage.set_string(PREFS_STORAGE_KEY, raw);
        }
    }
}
