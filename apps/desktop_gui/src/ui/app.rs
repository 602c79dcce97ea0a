//! The egui window: slot pickers with previews, the submit control, and the
//! outcome area.

use std::{collections::HashMap, fs};

use client_core::{ResultCard, IMAGE_EXTENSIONS};
use crossbeam_channel::{Receiver, Sender};
use shared::domain::{SlotId, SubmissionId};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{context_label, err_label, UiError, UiEvent},
        orchestration::dispatch_backend_command,
        reducer::{OutcomeView, ResultImage, ResultView, ShellState},
    },
    media::{copy_image_to_clipboard, PreviewImage},
};

const SLOT_PREVIEW_SIZE: f32 = 280.0;
const RESULT_CARD_SIZE: f32 = 220.0;

/// Values resolved before the window opens.
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub endpoint: String,
}

/// Result textures for the submission currently on screen. Switching to a
/// new submission drops the previous handles.
#[derive(Default)]
struct ResultTextures {
    submission: Option<SubmissionId>,
    textures: HashMap<String, egui::TextureHandle>,
}

impl ResultTextures {
    fn get(
        &mut self,
        ctx: &egui::Context,
        submission_id: SubmissionId,
        key: &str,
        image: &PreviewImage,
    ) -> egui::TextureHandle {
        if self.submission != Some(submission_id) {
            self.textures.clear();
            self.submission = Some(submission_id);
        }
        self.textures
            .entry(key.to_string())
            .or_insert_with(|| load_texture(ctx, &format!("result:{submission_id}:{key}"), image))
            .clone()
    }
}

struct SlotTexture {
    generation: u64,
    texture: egui::TextureHandle,
}

enum CardAction {
    SaveAs { file_name: String, bytes: Vec<u8> },
    Copy { label: String, bytes: Vec<u8> },
}

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: ShellState,
    startup: StartupConfig,
    slot_textures: HashMap<SlotId, SlotTexture>,
    result_textures: ResultTextures,
}

impl DesktopGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            state: ShellState::new(),
            startup,
            slot_textures: HashMap::new(),
            result_textures: ResultTextures::default(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            for cmd in self.state.apply(event) {
                self.queue_fetch(cmd);
            }
        }
    }

    fn queue_fetch(&mut self, cmd: BackendCommand) {
        if let Err(BackendCommand::FetchResultImage {
            submission_id, key, ..
        }) = dispatch_backend_command(&self.cmd_tx, cmd, &mut self.state.status)
        {
            self.state.result_image_not_queued(submission_id, &key);
        }
    }

    fn pick_file(&mut self, slot: SlotId) {
        let Some(path) = rfd::FileDialog::new()
            .set_title(format!("Select {}", slot.label()))
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        let cmd = self.state.pick_slot_file(slot, path);
        if let Err(BackendCommand::LoadSlotFile { slot, request, .. }) =
            dispatch_backend_command(&self.cmd_tx, cmd, &mut self.state.status)
        {
            self.state.slot_load_not_queued(slot, request);
        }
    }

    fn submit(&mut self) {
        let Some(cmd) = self.state.submit() else {
            return;
        };
        if let Err(BackendCommand::Combine(ticket)) =
            dispatch_backend_command(&self.cmd_tx, cmd, &mut self.state.status)
        {
            let reason = self.state.status.clone();
            self.state.combine_not_queued(ticket.id, &reason);
        }
    }

    /// Replaces the texture for `slot` when its generation moved on; the old
    /// handle is dropped with the map entry.
    fn slot_texture(&mut self, ctx: &egui::Context, slot: SlotId) -> Option<egui::TextureHandle> {
        let Some((generation, Ok(image))) = self
            .state
            .preview(slot)
            .map(|preview| (preview.generation, preview.image.as_ref()))
        else {
            self.slot_textures.remove(&slot);
            return None;
        };
        if let Some(cached) = self.slot_textures.get(&slot) {
            if cached.generation == generation {
                return Some(cached.texture.clone());
            }
        }
        let texture = load_texture(ctx, &format!("slot-preview:{}:{generation}", slot.index()), image);
        self.slot_textures.insert(
            slot,
            SlotTexture {
                generation,
                texture: texture.clone(),
            },
        );
        Some(texture)
    }

    fn show_slots(&mut self, ui: &mut egui::Ui) {
        ui.columns(2, |columns| {
            for (slot, ui) in SlotId::ALL.into_iter().zip(columns.iter_mut()) {
                self.show_slot(ui, slot);
            }
        });
    }

    fn show_slot(&mut self, ui: &mut egui::Ui, slot: SlotId) {
        ui.vertical_centered(|ui| {
            ui.heading(slot.label());
            if ui.button(format!("Choose {}", slot.label())).clicked() {
                self.pick_file(slot);
            }

            let texture = self.slot_texture(ui.ctx(), slot);
            let file_name = self
                .state
                .slots()
                .file(slot)
                .filter(|file| !file.is_empty())
                .map(|file| file.name().to_string());
            match (&texture, file_name) {
                (Some(texture), Some(name)) => {
                    ui.add(
                        egui::Image::new(texture)
                            .max_size(egui::vec2(SLOT_PREVIEW_SIZE, SLOT_PREVIEW_SIZE)),
                    );
                    ui.small(name);
                }
                (None, Some(name)) => {
                    ui.weak("Preview unavailable");
                    ui.small(name);
                }
                (_, None) => {
                    ui.add_space(SLOT_PREVIEW_SIZE / 3.0);
                    ui.weak("No image selected");
                }
            }
            if self.state.is_loading_slot(slot) {
                ui.spinner();
            }
        });
    }

    fn show_submit(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.horizontal(|ui| {
                let in_flight = self.state.submission().is_in_flight();
                let button = egui::Button::new(self.state.submit_label())
                    .min_size(egui::vec2(180.0, 32.0));
                if ui.add_enabled(self.state.can_submit(), button).clicked() {
                    self.submit();
                }
                if in_flight {
                    ui.spinner();
                }
                if ui.button("Reset").clicked() {
                    self.state.reset();
                    self.result_textures = ResultTextures::default();
                }
            });
        });
    }

    fn show_outcome(&mut self, ui: &mut egui::Ui) {
        let action = match self.state.outcome() {
            OutcomeView::Idle => {
                ui.vertical_centered(|ui| {
                    ui.weak("Select two images and press Combine Images to see the results.");
                });
                None
            }
            OutcomeView::Loading => {
                ui.vertical_centered(|ui| {
                    ui.spinner();
                    ui.label("Combining images...");
                });
                None
            }
            OutcomeView::Error(error) => {
                show_error_banner(ui, &error);
                None
            }
            OutcomeView::Results(view) => show_results(ui, view, &mut self.result_textures),
        };

        match action {
            Some(CardAction::SaveAs { file_name, bytes }) => {
                self.save_image_bytes_as(&bytes, &file_name)
            }
            Some(CardAction::Copy { label, bytes }) => match copy_image_to_clipboard(&bytes) {
                Ok(()) => self.state.status = format!("Copied {label} to clipboard"),
                Err(err) => self.state.status = format!("Failed to copy {label}: {err}"),
            },
            None => {}
        }
    }

    fn save_image_bytes_as(&mut self, bytes: &[u8], suggested_name: &str) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(suggested_name)
            .save_file()
        {
            match fs::write(&path, bytes) {
                Ok(()) => {
                    self.state.status = format!("Saved image to {}", path.display());
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), "failed to save image: {err}");
                    self.state.status = format!("Failed to save image: {err}");
                }
            }
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.state.banner.clone() else {
            return;
        };
        egui::Frame::NONE
            .fill(egui::Color32::from_rgb(111, 53, 53))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} ({}): {}",
                            context_label(banner.context()),
                            err_label(banner.category()),
                            banner.message()
                        ))
                        .color(egui::Color32::WHITE),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.state.banner = None;
                        }
                    });
                });
            });
    }
}

fn show_results(
    ui: &mut egui::Ui,
    view: &ResultView,
    textures: &mut ResultTextures,
) -> Option<CardAction> {
    if let Some(message) = view.empty_message() {
        ui.weak(message);
        return None;
    }
    let cards: Vec<&ResultCard> = view.visible().collect();

    let mut action = None;
    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            for card in cards {
                if let Some(chosen) = show_result_card(ui, view, card, textures) {
                    action = Some(chosen);
                }
            }
        });
    });
    action
}

fn show_result_card(
    ui: &mut egui::Ui,
    view: &ResultView,
    card: &ResultCard,
    textures: &mut ResultTextures,
) -> Option<CardAction> {
    let mut action = None;
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(RESULT_CARD_SIZE);
        ui.vertical_centered(|ui| {
            ui.strong(card.label.as_str());
            let Some(ResultImage::Loaded {
                image,
                original_bytes,
            }) = view.image(&card.key)
            else {
                ui.add_space(RESULT_CARD_SIZE / 3.0);
                ui.spinner();
                return;
            };

            let texture = textures.get(ui.ctx(), view.submission_id, &card.key, image);
            let response = ui
                .add(
                    egui::Image::new(&texture)
                        .max_size(egui::vec2(RESULT_CARD_SIZE, RESULT_CARD_SIZE))
                        .sense(egui::Sense::click()),
                )
                .on_hover_text("Right-click for image actions");
            response.context_menu(|ui| {
                if ui.button("Save image as…").clicked() {
                    action = Some(CardAction::SaveAs {
                        file_name: card.suggested_file_name(),
                        bytes: original_bytes.clone(),
                    });
                    ui.close();
                }
                if ui.button("Copy image").clicked() {
                    action = Some(CardAction::Copy {
                        label: card.label.clone(),
                        bytes: original_bytes.clone(),
                    });
                    ui.close();
                }
                ui.separator();
                if ui.button("Copy image URL").clicked() {
                    ui.ctx().copy_text(card.url.clone());
                    ui.close();
                }
            });
        });
    });
    action
}

fn load_texture(ctx: &egui::Context, name: &str, image: &PreviewImage) -> egui::TextureHandle {
    let color_image =
        egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba);
    ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR)
}

fn show_error_banner(ui: &mut egui::Ui, error: &UiError) {
    egui::Frame::NONE
        .fill(egui::Color32::from_rgb(111, 53, 53))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(error.message()).color(egui::Color32::WHITE))
                .on_hover_text(format!("{} error", err_label(error.category())));
        });
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.small(self.state.status.as_str());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.small(self.startup.endpoint.as_str());
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Image Combiner");
            self.show_status_banner(ui);
            ui.separator();
            self.show_slots(ui);
            ui.separator();
            self.show_submit(ui);
            ui.separator();
            self.show_outcome(ui);
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
