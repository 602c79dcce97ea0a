//! Shell state owned by the UI thread and the transitions driven by user
//! actions and backend events.

use std::{collections::HashMap, path::PathBuf};

use client_core::{
    is_image_filename, result_cards, visible_cards, BeginOutcome, CombineCompletion, CombineError, ImageLoadState,
    Phase, ResultCard, SubmissionState, UploadSlots,
};
use shared::domain::{SlotId, SubmissionId};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{UiError, UiErrorContext, UiEvent},
    media::PreviewImage,
};

/// Decoded preview for one accepted slot selection.
#[derive(Debug, Clone)]
pub struct SlotPreview {
    pub generation: u64,
    pub image: Result<PreviewImage, String>,
}

#[derive(Debug, Clone)]
pub enum ResultImage {
    Pending,
    Loaded {
        image: PreviewImage,
        original_bytes: Vec<u8>,
    },
    Failed,
}

impl ResultImage {
    pub fn load_state(&self) -> ImageLoadState {
        match self {
            ResultImage::Pending => ImageLoadState::Pending,
            ResultImage::Loaded { .. } => ImageLoadState::Loaded,
            ResultImage::Failed => ImageLoadState::Failed,
        }
    }
}

/// Cards and image loads for the submission whose results are on screen.
#[derive(Debug, Clone)]
pub struct ResultView {
    pub submission_id: SubmissionId,
    pub cards: Vec<ResultCard>,
    images: HashMap<String, ResultImage>,
}

impl ResultView {
    pub fn image(&self, key: &str) -> Option<&ResultImage> {
        self.images.get(key)
    }

    pub fn image_state(&self, key: &str) -> ImageLoadState {
        self.images
            .get(key)
            .map(ResultImage::load_state)
            .unwrap_or_default()
    }

    pub fn visible(&self) -> impl Iterator<Item = &ResultCard> {
        visible_cards(&self.cards, |card| self.image_state(&card.key))
    }

    /// Text shown in place of the grid when no card is visible.
    pub fn empty_message(&self) -> Option<&'static str> {
        if self.cards.is_empty() {
            Some("The server returned no results.")
        } else if self.visible().next().is_none() {
            Some("None of the result images could be loaded.")
        } else {
            None
        }
    }
}

/// What the outcome area shows; exactly one at a time.
#[derive(Debug)]
pub enum OutcomeView<'a> {
    Idle,
    Loading,
    Error(UiError),
    Results(&'a ResultView),
}

pub struct ShellState {
    slots: UploadSlots,
    submission: SubmissionState,
    previews: HashMap<SlotId, SlotPreview>,
    pending_loads: HashMap<SlotId, u64>,
    next_load_request: u64,
    results: Option<ResultView>,
    pub status: String,
    pub banner: Option<UiError>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellState {
    pub fn new() -> Self {
        Self {
            slots: UploadSlots::new(),
            submission: SubmissionState::new(),
            previews: HashMap::new(),
            pending_loads: HashMap::new(),
            next_load_request: 1,
            results: None,
            status: String::new(),
            banner: None,
        }
    }

    pub fn slots(&self) -> &UploadSlots {
        &self.slots
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn preview(&self, slot: SlotId) -> Option<&SlotPreview> {
        self.previews.get(&slot)
    }

    pub fn is_loading_slot(&self, slot: SlotId) -> bool {
        self.pending_loads.contains_key(&slot)
    }

    pub fn can_submit(&self) -> bool {
        self.submission.can_submit(&self.slots)
    }

    pub fn submit_label(&self) -> &'static str {
        if self.submission.is_in_flight() {
            "Processing..."
        } else {
            "Combine Images"
        }
    }

    pub fn outcome(&self) -> OutcomeView<'_> {
        match self.submission.phase() {
            Phase::Idle => OutcomeView::Idle,
            Phase::InFlight => OutcomeView::Loading,
            Phase::Failed => OutcomeView::Error(match self.submission.error() {
                Some(error) => UiError::from_combine(error),
                None => UiError::from_message(
                    UiErrorContext::Combine,
                    client_core::FALLBACK_ERROR_MESSAGE,
                ),
            }),
            Phase::Succeeded => match &self.results {
                Some(view) => OutcomeView::Results(view),
                None => OutcomeView::Idle,
            },
        }
    }

    /// Records a picked file and returns the command that reads it. Only the
    /// most recent pick per slot is applied when loads finish out of order.
    pub fn pick_slot_file(&mut self, slot: SlotId, path: PathBuf) -> BackendCommand {
        let request = self.next_load_request;
        self.next_load_request += 1;
        self.pending_loads.insert(slot, request);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_image_filename(&name) {
            tracing::warn!(slot = slot.label(), %name, "selected file has no image extension");
            self.status = format!("{name} does not look like an image; the server may reject it");
        }
        BackendCommand::LoadSlotFile {
            slot,
            request,
            path,
        }
    }

    /// Starts a combine when allowed. Returns the command to queue, if any.
    pub fn submit(&mut self) -> Option<BackendCommand> {
        match self.submission.begin(&self.slots) {
            BeginOutcome::Started(ticket) => {
                self.results = None;
                self.banner = None;
                self.status = "Combining images...".to_string();
                Some(BackendCommand::Combine(ticket))
            }
            BeginOutcome::AlreadyInFlight(_) => None,
            BeginOutcome::Rejected(error) => {
                self.status = error.user_message();
                None
            }
        }
    }

    /// The worker never received the load command; stop waiting for it.
    pub fn slot_load_not_queued(&mut self, slot: SlotId, request: u64) {
        if self.pending_loads.get(&slot) == Some(&request) {
            self.pending_loads.remove(&slot);
        }
    }

    /// The worker never received the combine command; fail it locally.
    pub fn combine_not_queued(&mut self, id: SubmissionId, reason: &str) {
        self.submission
            .resolve(id, Err(CombineError::Transport(reason.to_string())));
    }

    /// Returns to idle, discarding any in-flight submission and shown results.
    pub fn reset(&mut self) {
        self.submission.reset();
        self.results = None;
        self.banner = None;
        self.status = "Ready".to_string();
    }

    /// Applies one backend event. Returned commands should be queued in order.
    pub fn apply(&mut self, event: UiEvent) -> Vec<BackendCommand> {
        match event {
            UiEvent::Info(message) => self.status = message,
            UiEvent::Error(err) => {
                self.status = err.message().to_string();
                self.banner = Some(err);
            }
            UiEvent::SlotFileLoaded {
                slot,
                request,
                file,
                preview,
            } => {
                if !self.take_pending_load(slot, request) {
                    return Vec::new();
                }
                if file.is_empty() {
                    self.status = format!("{} is empty; choose another file", file.name());
                    self.slots.select_file(slot, Some(file));
                    self.previews.remove(&slot);
                    return Vec::new();
                }
                if let Err(reason) = &preview {
                    tracing::warn!(slot = slot.label(), name = file.name(), "preview unavailable: {reason}");
                }
                self.status = format!("{}: {}", slot.label(), file.name());
                self.slots.select_file(slot, Some(file));
                self.previews.insert(
                    slot,
                    SlotPreview {
                        generation: self.slots.slot(slot).generation(),
                        image: preview,
                    },
                );
            }
            UiEvent::SlotFileFailed {
                slot,
                request,
                path,
                reason,
            } => {
                if self.take_pending_load(slot, request) {
                    let err = UiError::from_message(
                        UiErrorContext::LoadImage,
                        format!("Could not read {}: {reason}", path.display()),
                    );
                    self.status = err.message().to_string();
                    self.banner = Some(err);
                }
            }
            UiEvent::CombineFinished(completion) => return self.finish_combine(completion),
            UiEvent::ResultImageLoaded {
                submission_id,
                key,
                image,
                original_bytes,
            } => {
                if let Some(slot) = self.result_image_slot(submission_id, &key) {
                    *slot = ResultImage::Loaded {
                        image,
                        original_bytes,
                    };
                }
            }
            UiEvent::ResultImageFailed {
                submission_id,
                key,
                url,
                reason,
            } => {
                if let Some(slot) = self.result_image_slot(submission_id, &key) {
                    tracing::error!(%reason, "Error loading image: {url}");
                    *slot = ResultImage::Failed;
                }
            }
        }
        Vec::new()
    }

    fn take_pending_load(&mut self, slot: SlotId, request: u64) -> bool {
        if self.pending_loads.get(&slot) == Some(&request) {
            self.pending_loads.remove(&slot);
            true
        } else {
            tracing::debug!(slot = slot.label(), request, "ignoring superseded file load");
            false
        }
    }

    fn finish_combine(&mut self, completion: CombineCompletion) -> Vec<BackendCommand> {
        let CombineCompletion { id, outcome } = completion;
        if !self.submission.resolve(id, outcome) {
            return Vec::new();
        }

        let Some(results) = self.submission.result_set() else {
            if let Some(message) = self.submission.error_message() {
                self.status = message.to_string();
            }
            return Vec::new();
        };

        let cards = result_cards(results);
        self.status = format!("Combined into {} results", cards.len());
        let commands = cards
            .iter()
            .map(|card| BackendCommand::FetchResultImage {
                submission_id: id,
                key: card.key.clone(),
                url: card.url.clone(),
            })
            .collect();
        let images = cards
            .iter()
            .map(|card| (card.key.clone(), ResultImage::Pending))
            .collect();
        self.results = Some(ResultView {
            submission_id: id,
            cards,
            images,
        });
        commands
    }

    fn result_image_slot(&mut self, submission_id: SubmissionId, key: &str) -> Option<&mut ResultImage> {
        let view = self
            .results
            .as_mut()
            .filter(|view| view.submission_id == submission_id)?;
        view.images.get_mut(key)
    }

    /// Marks a card's fetch as failed when its command could not be queued.
    pub fn result_image_not_queued(&mut self, submission_id: SubmissionId, key: &str) {
        if let Some(slot) = self.result_image_slot(submission_id, key) {
            *slot = ResultImage::Failed;
        }
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
